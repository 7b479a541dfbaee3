use std::sync::LazyLock;

use scraper::{Html, Selector};

use super::{Control, ControlId, Page};
use crate::error::PageError;
use crate::extract::text::inner_text;

static CLICKABLE: LazyLock<Selector> = LazyLock::new(|| Selector::parse("button, a").unwrap());

/// A saved, already-rendered page. Nothing mounts asynchronously, so clicks are recorded
/// and otherwise ignored, and scrolling only moves the recorded offset.
#[derive(Debug, Clone)]
pub struct SnapshotPage {
    url: String,
    html: String,
    height: u32,
    scroll_y: u32,
    clicked: Vec<ControlId>,
}

impl SnapshotPage {
    pub fn new(url: impl Into<String>, html: impl Into<String>) -> Self {
        SnapshotPage {
            url: url.into(),
            html: html.into(),
            height: 0,
            scroll_y: 0,
            clicked: Vec::new(),
        }
    }

    #[cfg(test)]
    pub fn with_height(mut self, height: u32) -> Self {
        self.height = height;
        self
    }

    pub fn clicked(&self) -> &[ControlId] {
        &self.clicked
    }

    fn control_count(&self) -> usize {
        Html::parse_document(&self.html).select(&CLICKABLE).count()
    }
}

impl Page for SnapshotPage {
    fn url(&self) -> String {
        self.url.clone()
    }

    fn snapshot(&self) -> Html {
        Html::parse_document(&self.html)
    }

    fn has_match(&self, selector: &str) -> bool {
        match Selector::parse(selector) {
            Ok(sel) => self.snapshot().select(&sel).next().is_some(),
            Err(_) => false,
        }
    }

    fn controls(&self) -> Vec<Control> {
        self.snapshot()
            .select(&CLICKABLE)
            .enumerate()
            .map(|(id, el)| Control {
                id,
                text: inner_text(el),
                aria_label: el.value().attr("aria-label").map(String::from),
            })
            .collect()
    }

    fn is_live(&self, id: ControlId) -> bool {
        id < self.control_count()
    }

    fn scroll_into_view(&mut self, id: ControlId) -> Result<(), PageError> {
        if self.is_live(id) {
            Ok(())
        } else {
            Err(PageError::Detached(id))
        }
    }

    fn click(&mut self, id: ControlId) -> Result<(), PageError> {
        if !self.is_live(id) {
            return Err(PageError::Detached(id));
        }
        self.clicked.push(id);
        Ok(())
    }

    fn scroll_height(&self) -> u32 {
        self.height
    }

    fn scroll_y(&self) -> u32 {
        self.scroll_y
    }

    fn scroll_by(&mut self, dy: u32) -> Result<(), PageError> {
        self.scroll_y = self.scroll_y.saturating_add(dy).min(self.height);
        Ok(())
    }

    fn scroll_to_top(&mut self) -> Result<(), PageError> {
        self.scroll_y = 0;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lists_buttons_and_links_in_order() {
        let page = SnapshotPage::new(
            "https://www.linkedin.com/in/x/",
            r#"<a href="/feed">Home</a><button aria-label="Show all 5 experiences">Show all</button>"#,
        );
        let controls = page.controls();
        assert_eq!(controls.len(), 2);
        assert_eq!(controls[0].text, "Home");
        assert_eq!(controls[1].aria_label.as_deref(), Some("Show all 5 experiences"));
    }

    #[test]
    fn click_out_of_range_is_detached() {
        let mut page = SnapshotPage::new("u", "<button>ok</button>");
        assert!(page.click(0).is_ok());
        assert!(matches!(page.click(3), Err(PageError::Detached(3))));
        assert_eq!(page.clicked(), &[0]);
    }

    #[test]
    fn has_match_tolerates_bad_selector() {
        let page = SnapshotPage::new("u", "<h1>Jane</h1>");
        assert!(page.has_match("h1"));
        assert!(!page.has_match("h1[["));
    }
}
