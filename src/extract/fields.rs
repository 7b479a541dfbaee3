use std::sync::LazyLock;

use regex::Regex;
use scraper::{ElementRef, Html, Selector};

use super::text::{parse_selector, text_of};

static CONNECTIONS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\d+\+?\s*(connection|follower)").unwrap());
static SPAN_OR_LI: LazyLock<Selector> = LazyLock::new(|| Selector::parse("span, li").unwrap());

/// Try each candidate selector in priority order; the first element with non-empty text
/// (and different from `exclude`) wins.
pub fn extract_field(doc: &Html, candidates: &[String], exclude: Option<&str>) -> Option<String> {
    extract_field_within(doc.root_element(), candidates, exclude)
}

/// Same as [`extract_field`], limited to descendants of `scope`.
pub fn extract_field_within(
    scope: ElementRef,
    candidates: &[String],
    exclude: Option<&str>,
) -> Option<String> {
    candidates
        .iter()
        .filter_map(|raw| parse_selector(raw))
        .find_map(|sel| {
            let text = scope.select(&sel).next().and_then(text_of)?;
            match exclude {
                Some(ex) if ex == text => None,
                _ => Some(text),
            }
        })
}

/// `src` of the first element matched by any candidate.
pub fn extract_attr(doc: &Html, candidates: &[String], attr: &str) -> Option<String> {
    candidates
        .iter()
        .filter_map(|raw| parse_selector(raw))
        .find_map(|sel| {
            doc.select(&sel)
                .next()
                .and_then(|el| el.value().attr(attr))
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(String::from)
        })
}

/// "500+ connections", "1,204 followers"; first match in document order.
pub fn extract_connections(doc: &Html) -> Option<String> {
    doc.select(&SPAN_OR_LI)
        .filter_map(text_of)
        .find(|t| CONNECTIONS_RE.is_match(t))
}
