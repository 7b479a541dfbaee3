pub mod education;
pub mod experience;
pub mod fields;
pub mod section;
pub mod skills;
pub mod text;

use std::panic::{self, AssertUnwindSafe};
use std::sync::LazyLock;

use chrono::{DateTime, SecondsFormat, Utc};
use scraper::{Html, Selector};
use tracing::{debug, warn};

use crate::config::SelectorSettings;
use crate::model::{profile_id_from_url, ProfileRecord};

static CANONICAL: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse(r#"link[rel="canonical"][href], meta[property="og:url"][content]"#).unwrap()
});

const ABOUT_KEYWORDS: &[&str] = &["about"];

/// Build a full record from one document snapshot. Never fails: every field and section is
/// extracted on its own, and a failure in one leaves that slot empty.
pub fn extract_profile(
    doc: &Html,
    url: &str,
    selectors: &SelectorSettings,
    captured_at: DateTime<Utc>,
) -> ProfileRecord {
    let name = isolate("name", || fields::extract_field(doc, &selectors.name, None));
    let headline = isolate("headline", || {
        fields::extract_field(doc, &selectors.headline, name.as_deref())
    });
    let location = isolate("location", || fields::extract_field(doc, &selectors.location, None));
    let about = isolate("about", || {
        section::find_section(doc, ABOUT_KEYWORDS)
            .and_then(|s| fields::extract_field_within(s, &selectors.about, None))
    });
    let profile_picture = isolate("profilePicture", || fields::extract_attr(doc, &selectors.picture, "src"));
    let connections = isolate("connections", || fields::extract_connections(doc));

    let experience = isolate("experience", || experience::extract(doc));
    let education = isolate("education", || education::extract(doc));
    let skills = isolate("skills", || skills::extract(doc));

    let mut record = ProfileRecord {
        profile_id: profile_id_from_url(url),
        timestamp: captured_at.to_rfc3339_opts(SecondsFormat::Millis, true),
        url: url.to_string(),
        name,
        headline,
        location,
        about,
        profile_picture,
        connections,
        current_position: None,
        current_company: None,
        experience,
        education,
        skills,
    };
    record.derive_current_role();

    debug!(
        profile_id = ?record.profile_id,
        experience = record.experience.len(),
        education = record.education.len(),
        skills = record.skills.len(),
        "Extracted profile"
    );
    record
}

/// The page's own address, for saved snapshots that lost their URL.
pub fn document_url(doc: &Html) -> Option<String> {
    doc.select(&CANONICAL).find_map(|el| {
        el.value()
            .attr("href")
            .or_else(|| el.value().attr("content"))
            .map(str::trim)
            .filter(|u| !u.is_empty())
            .map(String::from)
    })
}

fn isolate<T: Default>(field: &str, f: impl FnOnce() -> T) -> T {
    match panic::catch_unwind(AssertUnwindSafe(f)) {
        Ok(value) => value,
        Err(_) => {
            warn!(field, "Extraction failed, leaving field empty");
            T::default()
        }
    }
}

// ── Tests ──
