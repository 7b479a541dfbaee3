use std::sync::LazyLock;

use regex::Regex;
use tokio::time::sleep;
use tracing::{debug, info, warn};

use crate::config::Timings;
use crate::page::{Control, Page};

const EXPAND_PHRASES: &[&str] = &[
    "show all",
    "show more",
    "see more",
    "voir plus",
    "afficher tout",
    "mehr anzeigen",
    "ver más",
    "mostrar más",
];
const EXCLUDED_CONTEXT: &[&str] = &["post", "activity"];

static N_MORE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\d+\s*more").unwrap());

/// Expand intent in the text or label, and no feed/activity context in either.
pub fn is_expand_control(control: &Control) -> bool {
    let text = control.text.trim().to_lowercase();
    let label = control.aria_label.as_deref().unwrap_or_default().to_lowercase();

    let wants_expand = EXPAND_PHRASES
        .iter()
        .any(|p| text.contains(p) || label.contains(p))
        || N_MORE_RE.is_match(&text);
    let excluded = EXCLUDED_CONTEXT
        .iter()
        .any(|p| text.contains(p) || label.contains(p));

    wants_expand && !excluded
}

pub fn discover<P: Page>(page: &P) -> Vec<Control> {
    page.controls().into_iter().filter(is_expand_control).collect()
}

/// Bring one control into view and click it, with settling delays around the click.
/// A control that went stale since discovery is skipped, never retried.
pub async fn activate<P: Page>(page: &mut P, control: &Control, timings: &Timings) -> bool {
    if !page.is_live(control.id) {
        debug!(control = control.id, "Skipping stale expand control");
        return false;
    }
    if let Err(e) = page.scroll_into_view(control.id) {
        debug!(control = control.id, error = %e, "Skipping expand control");
        return false;
    }
    sleep(timings.pre_click()).await;
    if let Err(e) = page.click(control.id) {
        warn!(control = control.id, error = %e, "Expand click failed");
        return false;
    }
    let label: String = control.text.chars().take(50).collect();
    debug!(control = control.id, label = label.as_str(), "Clicked expand control");
    sleep(timings.post_click()).await;
    true
}

/// Click every expand control, one at a time. Returns how many were activated.
pub async fn expand_all<P: Page>(page: &mut P, timings: &Timings) -> usize {
    let controls = discover(page);
    info!(found = controls.len(), "Expanding sections");

    let mut clicked = 0;
    for control in &controls {
        if activate(page, control, timings).await {
            clicked += 1;
        }
    }

    info!(clicked, "Expand controls activated");
    sleep(timings.expand_settle()).await;
    clicked
}
