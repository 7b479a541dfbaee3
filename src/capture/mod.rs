pub mod expand;
pub mod scroll;
pub mod wait;

use chrono::Utc;
use tokio::time::sleep;
use tracing::{debug, info};

use crate::config::{SelectorSettings, Settings, Timings};
use crate::extract::extract_profile;
use crate::model::ProfileRecord;
use crate::page::{Page, SnapshotPage};

/// Wait for the profile to render, expand every section, scroll through lazy content, then
/// extract. Each phase finishes before the next starts. `None` when no readiness indicator
/// ever appeared, which is not an error: the page is not a loaded profile.
pub async fn capture_current_profile<P: Page>(page: &mut P, settings: &Settings) -> Option<ProfileRecord> {
    let timings = &settings.timings;

    let Some(indicator) = wait::wait_for_any(&*page, &settings.selectors.ready, timings).await else {
        info!(url = page.url().as_str(), "Profile never finished loading, skipping capture");
        return None;
    };
    info!(indicator, "Profile loaded");

    let clicked = expand::expand_all(page, timings).await;
    let scrolled = scroll::scroll_to_load_all(page, timings).await;
    sleep(timings.post_scroll_settle()).await;

    let record = scrape_profile(&*page, &settings.selectors);
    info!(
        profile_id = ?record.profile_id,
        clicked,
        scroll_ticks = scrolled.ticks,
        final_height = scrolled.final_height,
        experience = record.experience.len(),
        education = record.education.len(),
        skills = record.skills.len(),
        "Captured profile"
    );
    Some(record)
}

/// Full capture over a saved page: same phases, no settling delays. Runs on its own
/// current-thread runtime, so it must be called from outside any runtime (e.g. a rayon worker).
pub fn capture_snapshot(mut page: SnapshotPage, settings: &Settings) -> anyhow::Result<Option<ProfileRecord>> {
    let settings = Settings { timings: Timings::immediate(), ..settings.clone() };
    let rt = tokio::runtime::Builder::new_current_thread().enable_time().build()?;
    let record = rt.block_on(capture_current_profile(&mut page, &settings));
    debug!(url = page.url().as_str(), clicked = page.clicked().len(), "Snapshot capture finished");
    Ok(record)
}

/// Extract from the document as it stands, without touching it.
pub fn scrape_profile<P: Page>(page: &P, selectors: &SelectorSettings) -> ProfileRecord {
    let doc = page.snapshot();
    extract_profile(&doc, &page.url(), selectors, Utc::now())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PageError;
    use crate::page::{Control, ControlId, SnapshotPage};
    use scraper::Html;

    const URL: &str = "https://www.linkedin.com/in/jane-doe-123/";

    fn fixture() -> String {
        std::fs::read_to_string("tests/fixtures/profile.html").unwrap()
    }

    #[tokio::test(start_paused = true)]
    async fn captures_fixture_end_to_end() {
        let mut page = SnapshotPage::new(URL, fixture()).with_height(2400);
        let record = capture_current_profile(&mut page, &Settings::default()).await.unwrap();
        assert_eq!(record.profile_id.as_deref(), Some("jane-doe-123"));
        assert_eq!(record.name.as_deref(), Some("Jane Doe"));
        assert_eq!(record.current_company.as_deref(), Some("Acme Corp"));
        assert_eq!(page.clicked().len(), 3);
        assert_eq!(page.scroll_y(), 0);
    }

    #[test]
    fn saved_page_runs_every_phase() {
        let page = SnapshotPage::new(URL, fixture());
        let record = capture_snapshot(page, &Settings::default()).unwrap().unwrap();
        assert_eq!(record.profile_id.as_deref(), Some("jane-doe-123"));
        assert_eq!(record.experience.len(), 2);
        assert_eq!(record.skills.len(), 3);
    }

    #[test]
    fn saved_non_profile_page_captures_nothing() {
        let page = SnapshotPage::new("https://www.linkedin.com/feed/", "<main><p>feed</p></main>");
        assert!(capture_snapshot(page, &Settings::default()).unwrap().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn non_profile_page_is_skipped() {
        let mut page = SnapshotPage::new("https://www.linkedin.com/feed/", "<main><p>feed</p></main>");
        assert!(capture_current_profile(&mut page, &Settings::default()).await.is_none());
        assert!(page.clicked().is_empty());
    }

    /// Sections only appear in the document after their expand control is clicked.
    struct CollapsedPage {
        expanded: bool,
        events: Vec<&'static str>,
    }

    const COLLAPSED: &str = r#"<h1>Jane Doe</h1><button>Show all 2 experiences</button>"#;
    const EXPANDED: &str = r#"<h1>Jane Doe</h1>
        <section><h2>Experience</h2><ul class="pvs-list">
          <li><span aria-hidden="true">Software Engineer</span><span aria-hidden="true">Acme Corp · Full-time</span><span aria-hidden="true">Jan 2020 - Present</span><span aria-hidden="true">Remote</span></li>
        </ul></section>"#;

    impl Page for CollapsedPage {
        fn url(&self) -> String {
            URL.into()
        }
        fn snapshot(&self) -> Html {
            Html::parse_document(if self.expanded { EXPANDED } else { COLLAPSED })
        }
        fn has_match(&self, selector: &str) -> bool {
            selector == "h1"
        }
        fn controls(&self) -> Vec<Control> {
            vec![Control { id: 0, text: "Show all 2 experiences".into(), aria_label: None }]
        }
        fn is_live(&self, _: ControlId) -> bool {
            !self.expanded
        }
        fn scroll_into_view(&mut self, _: ControlId) -> Result<(), PageError> {
            Ok(())
        }
        fn click(&mut self, _: ControlId) -> Result<(), PageError> {
            self.events.push("click");
            self.expanded = true;
            Ok(())
        }
        fn scroll_height(&self) -> u32 {
            900
        }
        fn scroll_y(&self) -> u32 {
            0
        }
        fn scroll_by(&mut self, _: u32) -> Result<(), PageError> {
            self.events.push("scroll");
            Ok(())
        }
        fn scroll_to_top(&mut self) -> Result<(), PageError> {
            self.events.push("top");
            Ok(())
        }
    }

    #[tokio::test(start_paused = true)]
    async fn extraction_runs_after_expansion_and_scrolling() {
        let mut page = CollapsedPage { expanded: false, events: Vec::new() };
        let record = capture_current_profile(&mut page, &Settings::default()).await.unwrap();
        assert_eq!(page.events, vec!["click", "scroll", "scroll", "scroll", "top"]);
        assert_eq!(record.experience.len(), 1);
        assert_eq!(record.current_position.as_deref(), Some("Software Engineer"));
    }

    #[tokio::test(start_paused = true)]
    async fn scrape_profile_does_not_touch_the_page() {
        let page = CollapsedPage { expanded: false, events: Vec::new() };
        let record = scrape_profile(&page, &SelectorSettings::default());
        assert!(record.experience.is_empty());
        assert!(page.events.is_empty());
    }
}
