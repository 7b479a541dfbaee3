use tokio::time::sleep;
use tracing::{debug, warn};

use crate::config::Timings;
use crate::page::Page;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScrollOutcome {
    pub ticks: u32,
    pub final_height: u32,
}

/// Step down the page until the distance scrolled reaches the document height, then return
/// to the top. Height is re-read every tick since it grows as deferred content mounts.
pub async fn scroll_to_load_all<P: Page>(page: &mut P, timings: &Timings) -> ScrollOutcome {
    let step = timings.scroll_step_px.max(1);
    let mut scrolled: u64 = 0;
    let mut ticks = 0;
    let mut height;

    loop {
        sleep(timings.scroll_tick()).await;
        height = page.scroll_height();
        if let Err(e) = page.scroll_by(step) {
            warn!(error = %e, "Scroll failed, stopping early");
            break;
        }
        scrolled += u64::from(step);
        ticks += 1;

        if scrolled >= u64::from(height) {
            break;
        }
        if ticks >= timings.max_scroll_ticks {
            warn!(ticks, height, "Page keeps growing, giving up on lazy loading");
            break;
        }
    }

    match page.scroll_to_top() {
        Err(e) => warn!(error = %e, "Could not restore scroll position"),
        Ok(()) if page.scroll_y() != 0 => warn!(y = page.scroll_y(), "Scroll position not back at top"),
        Ok(()) => {}
    }
    debug!(ticks, height, "Scrolled through page");
    ScrollOutcome { ticks, final_height: height }
}
