use scraper::{ElementRef, Html};

use super::section::extract_section;
use super::text::fragments;
use crate::model::EducationEntry;

pub const KEYWORDS: &[&str] = &["education"];

/// School, degree and dates are the first three visible fragments, in that order.
pub fn parse_item(item: ElementRef) -> Option<EducationEntry> {
    let mut frags = fragments(item).into_iter();
    let school = frags.next()?;
    Some(EducationEntry {
        school,
        degree: frags.next(),
        duration: frags.next(),
    })
}

pub fn extract(doc: &Html) -> Vec<EducationEntry> {
    extract_section(doc, KEYWORDS, parse_item)
}
