use std::collections::{BTreeMap, HashSet};

use crate::model::ProfileRecord;

/// Case-insensitive match over the fields a reader would search by.
pub fn matches(record: &ProfileRecord, query: &str) -> bool {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return true;
    }
    let hit = |v: Option<&str>| v.is_some_and(|s| s.to_lowercase().contains(&needle));

    hit(record.name.as_deref())
        || hit(record.headline.as_deref())
        || hit(record.location.as_deref())
        || hit(record.current_company.as_deref())
        || hit(record.current_position.as_deref())
        || record
            .experience
            .iter()
            .any(|e| hit(e.title.as_deref()) || hit(e.company.as_deref()))
        || record.skills.iter().any(|s| hit(Some(s.name.as_str())))
}

pub fn search<'a>(records: &'a [ProfileRecord], query: &str) -> Vec<&'a ProfileRecord> {
    records.iter().filter(|r| matches(r, query)).collect()
}

/// Newest capture first. Timestamps are RFC 3339 in UTC, so text order is time order.
pub fn newest_first(mut records: Vec<ProfileRecord>) -> Vec<ProfileRecord> {
    records.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
    records
}

#[derive(Debug, Clone, PartialEq)]
pub struct Stats {
    pub total: usize,
    pub unique_companies: usize,
    pub avg_experience: f64,
    pub top_skill: Option<(String, usize)>,
}

pub fn stats(records: &[ProfileRecord]) -> Stats {
    let companies: HashSet<&str> = records
        .iter()
        .flat_map(|r| r.experience.iter())
        .filter_map(|e| e.company.as_deref())
        .filter(|c| !c.is_empty())
        .collect();

    let avg_experience = if records.is_empty() {
        0.0
    } else {
        let total: usize = records.iter().map(|r| r.experience.len()).sum();
        total as f64 / records.len() as f64
    };

    let mut skill_counts: BTreeMap<&str, usize> = BTreeMap::new();
    for skill in records.iter().flat_map(|r| r.skills.iter()) {
        *skill_counts.entry(skill.name.as_str()).or_default() += 1;
    }
    // Highest count; ties go to the alphabetically first name.
    let top_skill = skill_counts
        .into_iter()
        .fold(None::<(&str, usize)>, |best, (name, n)| match best {
            Some((_, m)) if m >= n => best,
            _ => Some((name, n)),
        })
        .map(|(name, n)| (name.to_string(), n));

    Stats {
        total: records.len(),
        unique_companies: companies.len(),
        avg_experience,
        top_skill,
    }
}
