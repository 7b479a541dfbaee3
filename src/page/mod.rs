//! The live document the capture pipeline drives.
//!
//! Extraction only ever reads a [`scraper::Html`] snapshot. Everything that mutates the page
//! (clicks, scrolling) goes through [`Page`], so tests can hand in a synthetic page.

#[cfg(feature = "chrome")]
pub mod chrome;
pub mod snapshot;

use scraper::Html;
use serde::Deserialize;

use crate::error::PageError;

pub use snapshot::SnapshotPage;

pub type ControlId = usize;

/// A clickable element (`button` or `a`) as it was when the page was queried.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Control {
    pub id: ControlId,
    pub text: String,
    #[serde(default)]
    pub aria_label: Option<String>,
}

pub trait Page {
    fn url(&self) -> String;

    /// Parse the document as it is right now.
    fn snapshot(&self) -> Html;

    fn has_match(&self, selector: &str) -> bool;

    fn controls(&self) -> Vec<Control>;

    /// Still attached to the document and rendered.
    fn is_live(&self, id: ControlId) -> bool;

    fn scroll_into_view(&mut self, id: ControlId) -> Result<(), PageError>;

    fn click(&mut self, id: ControlId) -> Result<(), PageError>;

    /// Total scrollable height; grows as lazy content mounts.
    fn scroll_height(&self) -> u32;

    fn scroll_y(&self) -> u32;

    fn scroll_by(&mut self, dy: u32) -> Result<(), PageError>;

    fn scroll_to_top(&mut self) -> Result<(), PageError>;
}
