use std::time::Duration;

use tokio::time::{sleep, timeout};
use tracing::debug;

use crate::config::Timings;
use crate::page::Page;

/// Poll until `selector` matches or `limit` elapses. Returns whether it appeared.
pub async fn wait_for_element<P: Page>(page: &P, selector: &str, limit: Duration, poll: Duration) -> bool {
    let appeared = timeout(limit, async {
        loop {
            if page.has_match(selector) {
                return;
            }
            sleep(poll).await;
        }
    })
    .await;
    appeared.is_ok()
}

/// Try each readiness indicator in turn, each with its own timeout.
/// Returns the first one that appeared, or `None` when all of them timed out.
pub async fn wait_for_any<'s, P: Page>(page: &P, indicators: &'s [String], timings: &Timings) -> Option<&'s str> {
    for selector in indicators {
        if wait_for_element(page, selector, timings.ready_timeout(), timings.ready_poll()).await {
            return Some(selector.as_str());
        }
        debug!(selector = selector.as_str(), "Readiness indicator timed out");
    }
    None
}
