use std::sync::LazyLock;

use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use tracing::trace;

use super::section::extract_section;
use super::text::{fragments, text_of, VISIBLE_SPAN};
use crate::model::ExperienceEntry;

pub const KEYWORDS: &[&str] = &["experience"];

static EMPLOYMENT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)full-time|part-time|contract|freelance|internship|self-employed").unwrap()
});
static DURATION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\d+\s*(mo|mos|month|months|yr|yrs|year|years)|[A-Z][a-z]{2}\s+\d{4}|\d{4}\s*-").unwrap()
});
static LOCATION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)on-site|remote|hybrid|algeria|france|usa|uk|canada").unwrap()
});
static BOLD: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(r#".mr1.t-bold, [class*="entity-result__title"]"#).unwrap());
static DESCRIPTION: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse(".inline-show-more-text, .pvs-list__outer-container .visually-hidden").unwrap()
});

/// One visible text unit of an item, with its position and whether it is the tentative title.
#[derive(Debug, Clone, Copy)]
pub struct Fragment<'a> {
    pub index: usize,
    pub text: &'a str,
    pub is_title_candidate: bool,
}

/// A classification rule. The first rule whose predicate matches claims the fragment.
pub struct Rule {
    pub name: &'static str,
    pub matches: fn(&Fragment, &ExperienceEntry) -> bool,
    pub assign: fn(&Fragment, &mut ExperienceEntry),
}

pub static RULES: &[Rule] = &[
    Rule {
        name: "title",
        matches: |f, _| f.index == 0 && f.is_title_candidate,
        assign: |f, e| e.title = Some(f.text.to_string()),
    },
    Rule {
        name: "employment_type",
        matches: |f, _| EMPLOYMENT_RE.is_match(f.text),
        assign: |f, e| {
            let parts: Vec<&str> = f.text.split('·').map(str::trim).collect();
            if parts.len() > 1 {
                e.company = Some(parts[0].to_string());
                e.employment_type = Some(parts[1].to_string());
            } else {
                e.employment_type = Some(f.text.to_string());
            }
        },
    },
    Rule {
        name: "duration",
        matches: |f, _| DURATION_RE.is_match(f.text),
        assign: |f, e| {
            e.duration.get_or_insert_with(|| f.text.to_string());
        },
    },
    Rule {
        name: "location",
        matches: |f, _| f.text.contains(',') || LOCATION_RE.is_match(f.text),
        assign: |f, e| {
            e.location.get_or_insert_with(|| f.text.to_string());
        },
    },
    Rule {
        name: "company",
        matches: |f, e| {
            let len = f.text.chars().count();
            e.company.is_none() && !f.text.chars().any(|c| c.is_ascii_digit()) && len > 2 && len < 100
        },
        assign: |f, e| e.company = Some(f.text.to_string()),
    },
];

/// Classify an item's fragments into experience slots. Pure; same input, same entry.
///
/// `bold` is the text of the item's title-styled element, if it has one. Without it the
/// first fragment is the tentative title.
pub fn classify(frags: &[String], bold: Option<&str>) -> ExperienceEntry {
    let mut entry = ExperienceEntry::default();
    let main_text = bold.or(frags.first().map(String::as_str));

    for (index, text) in frags.iter().enumerate() {
        let fragment = Fragment {
            index,
            text: text.as_str(),
            is_title_candidate: main_text == Some(text.as_str()),
        };
        if let Some(rule) = RULES.iter().find(|r| (r.matches)(&fragment, &entry)) {
            trace!(rule = rule.name, index, "Fragment claimed");
            (rule.assign)(&fragment, &mut entry);
        }
    }

    if entry.title.is_none() {
        entry.title = frags.first().cloned();
    }
    entry
}

fn bold_text(item: ElementRef) -> Option<String> {
    let bold = item.select(&BOLD).next()?;
    bold.select(&VISIBLE_SPAN)
        .find_map(text_of)
        .or_else(|| text_of(bold))
}

pub fn parse_item(item: ElementRef) -> Option<ExperienceEntry> {
    let frags = fragments(item);
    let bold = bold_text(item);
    let mut entry = classify(&frags, bold.as_deref());
    entry.description = item.select(&DESCRIPTION).next().and_then(text_of);
    entry.is_meaningful().then_some(entry)
}

pub fn extract(doc: &Html) -> Vec<ExperienceEntry> {
    extract_section(doc, KEYWORDS, parse_item)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frags(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    fn rule(name: &str) -> &'static Rule {
        RULES.iter().find(|r| r.name == name).unwrap()
    }

    fn frag(text: &str) -> Fragment<'_> {
        Fragment { index: 1, text, is_title_candidate: false }
    }

    #[test]
    fn canonical_item() {
        let e = classify(
            &frags(&["Software Engineer", "Acme Corp · Full-time", "Jan 2020 - Present", "Remote"]),
            None,
        );
        assert_eq!(e.title.as_deref(), Some("Software Engineer"));
        assert_eq!(e.company.as_deref(), Some("Acme Corp"));
        assert_eq!(e.employment_type.as_deref(), Some("Full-time"));
        assert_eq!(e.duration.as_deref(), Some("Jan 2020 - Present"));
        assert_eq!(e.location.as_deref(), Some("Remote"));
    }

    #[test]
    fn employment_rule_splits_on_middle_dot() {
        let mut e = ExperienceEntry::default();
        (rule("employment_type").assign)(&frag("Initech · Contract"), &mut e);
        assert_eq!(e.company.as_deref(), Some("Initech"));
        assert_eq!(e.employment_type.as_deref(), Some("Contract"));

        let mut e = ExperienceEntry::default();
        (rule("employment_type").assign)(&frag("Internship"), &mut e);
        assert_eq!(e.company, None);
        assert_eq!(e.employment_type.as_deref(), Some("Internship"));
    }

    #[test]
    fn duration_rule_patterns() {
        let m = rule("duration").matches;
        let e = ExperienceEntry::default();
        assert!(m(&frag("3 yrs 2 mos"), &e));
        assert!(m(&frag("Mar 2018 - Jun 2019"), &e));
        assert!(m(&frag("2016 - 2019"), &e));
        assert!(!m(&frag("Acme Corp"), &e));
    }

    #[test]
    fn first_duration_wins() {
        let e = classify(&frags(&["Dev", "Jan 2020 - Present", "4 yrs 1 mo"]), None);
        assert_eq!(e.duration.as_deref(), Some("Jan 2020 - Present"));
        // The second duration is claimed by the duration rule, not the company rule.
        assert_eq!(e.company, None);
    }

    #[test]
    fn location_rule_comma_or_keyword() {
        let m = rule("location").matches;
        let e = ExperienceEntry::default();
        assert!(m(&frag("Paris, Île-de-France"), &e));
        assert!(m(&frag("Hybrid"), &e));
        // Keywords match anywhere in the text, including inside longer words.
        assert!(m(&frag("Kyiv Ukraine"), &e));
        assert!(m(&frag("Duke University"), &e));
        assert!(!m(&frag("Globex"), &e));
    }

    #[test]
    fn localized_duration_units() {
        let m = rule("duration").matches;
        let e = ExperienceEntry::default();
        assert!(m(&frag("4 ans 3 mois"), &e));
        assert!(m(&frag("6 Monate"), &e));
    }

    #[test]
    fn localized_duration_and_keyword_location_classify() {
        let e = classify(&frags(&["Ingénieur", "4 ans 3 mois"]), None);
        assert_eq!(e.title.as_deref(), Some("Ingénieur"));
        assert_eq!(e.duration.as_deref(), Some("4 ans 3 mois"));
        assert_eq!(e.company, None);

        let e = classify(&frags(&["Engineer", "Kyiv Ukraine"]), None);
        assert_eq!(e.location.as_deref(), Some("Kyiv Ukraine"));
        assert_eq!(e.company, None);
    }

    #[test]
    fn company_rule_bounds() {
        let m = rule("company").matches;
        let empty = ExperienceEntry::default();
        assert!(m(&frag("Globex"), &empty));
        assert!(!m(&frag("AB"), &empty));
        assert!(!m(&frag("Team 42"), &empty));
        let taken = ExperienceEntry { company: Some("Globex".into()), ..Default::default() };
        assert!(!m(&frag("Initech"), &taken));
    }

    #[test]
    fn bold_title_different_from_first_fragment_falls_back() {
        // The title rule only fires when the bold text is the first fragment.
        let e = classify(&frags(&["Globex", "Principal"]), Some("Principal"));
        assert_eq!(e.company.as_deref(), Some("Globex"));
        assert_eq!(e.title.as_deref(), Some("Globex"));
    }

    #[test]
    fn item_without_fragments_is_dropped() {
        let doc = Html::parse_document(r#"<section><h2>Experience</h2><ul><li><div></div></li></ul></section>"#);
        assert!(extract(&doc).is_empty());
    }

    #[test]
    fn description_and_bold_title_from_markup() {
        let doc = Html::parse_document(
            r#"<section><h2>Experience</h2><ul class="pvs-list">
                <li>
                  <div class="display-flex align-items-center mr1 t-bold"><span aria-hidden="true">Staff Engineer</span><span class="visually-hidden">Staff Engineer</span></div>
                  <span aria-hidden="true">Acme Corp · Full-time</span>
                  <span aria-hidden="true">Jan 2020 - Present · 4 yrs</span>
                  <div class="inline-show-more-text">Built things.</div>
                </li>
              </ul></section>"#,
        );
        let entries = extract(&doc);
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].title.as_deref(), Some("Staff Engineer"));
        assert_eq!(entries[0].company.as_deref(), Some("Acme Corp"));
        assert_eq!(entries[0].description.as_deref(), Some("Built things."));
    }

    #[test]
    fn classification_is_idempotent() {
        let html = std::fs::read_to_string("tests/fixtures/profile.html").unwrap();
        let doc = Html::parse_document(&html);
        assert_eq!(extract(&doc), extract(&doc));
    }
}
