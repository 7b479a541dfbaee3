use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;
use scraper::{ElementRef, Html, Selector};

use super::section::{find_section, section_items};
use super::text::{fragments, text_of, VISIBLE_SPAN};
use crate::model::SkillEntry;

pub const KEYWORDS: &[&str] = &["skills"];
const LOW_YIELD: usize = 3;

static ENDORSEMENT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\d+\s*endorsement").unwrap());
static NOISE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)endorsement|show all").unwrap());
static BOLD_SPAN: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse(
        r#".mr1.t-bold span[aria-hidden="true"], [class*="entity-result__title"] span[aria-hidden="true"]"#,
    )
    .unwrap()
});

pub fn parse_item(item: ElementRef) -> Option<SkillEntry> {
    let name = item
        .select(&BOLD_SPAN)
        .next()
        .and_then(text_of)
        .or_else(|| item.select(&VISIBLE_SPAN).next().and_then(text_of))?;
    let endorsements = fragments(item)
        .into_iter()
        .find(|t| ENDORSEMENT_RE.is_match(t));
    Some(SkillEntry { name, endorsements })
}

/// Collapsed skill cards show only a couple of entries; pick up the rest of the
/// visible text in the section, skipping counters and "Show all" links.
fn low_yield_fallback(section: ElementRef, skills: &mut Vec<SkillEntry>) {
    let mut seen: HashSet<String> = skills.iter().map(|s| s.name.clone()).collect();
    for text in section.select(&VISIBLE_SPAN).filter_map(text_of) {
        let len = text.chars().count();
        if len <= 2 || len >= 100 || NOISE_RE.is_match(&text) {
            continue;
        }
        if seen.insert(text.clone()) {
            skills.push(SkillEntry { name: text, endorsements: None });
        }
    }
}

pub fn extract(doc: &Html) -> Vec<SkillEntry> {
    let Some(section) = find_section(doc, KEYWORDS) else {
        return Vec::new();
    };
    let mut skills: Vec<SkillEntry> = section_items(section)
        .into_iter()
        .filter_map(parse_item)
        .collect();
    if skills.len() < LOW_YIELD {
        low_yield_fallback(section, &mut skills);
    }
    skills
}
