use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use serde::Deserialize;

use crate::model::ProfileRecord;

pub fn all_file_name(date: NaiveDate) -> String {
    format!("linkedin_profiles_{}.json", date.format("%Y-%m-%d"))
}

pub fn one_file_name(profile_id: &str, date: NaiveDate) -> String {
    format!("profile_{}_{}.json", profile_id, date.format("%Y-%m-%d"))
}

/// Write every record as a pretty-printed array. An empty store is an error, not an empty file.
pub fn export_all(records: &[ProfileRecord], out: &Path) -> Result<()> {
    if records.is_empty() {
        bail!("No profiles to export");
    }
    write_json(out, &serde_json::to_string_pretty(records)?)
}

pub fn export_one(record: &ProfileRecord, out: &Path) -> Result<()> {
    write_json(out, &serde_json::to_string_pretty(record)?)
}

/// Resolve where an export lands: an explicit path wins, else the dated name inside `dir`.
pub fn target(out: Option<PathBuf>, dir: &Path, default_name: String) -> PathBuf {
    out.unwrap_or_else(|| dir.join(default_name))
}

fn write_json(out: &Path, json: &str) -> Result<()> {
    if let Some(dir) = out.parent().filter(|d| !d.as_os_str().is_empty()) {
        std::fs::create_dir_all(dir)?;
    }
    std::fs::write(out, json).with_context(|| format!("Failed to write {}", out.display()))
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ImportDoc {
    Many(Vec<ProfileRecord>),
    One(Box<ProfileRecord>),
    Keyed(BTreeMap<String, ProfileRecord>),
}

/// Read an export back. Accepts an array, a single record, or an id-keyed map.
pub fn read_import(path: &Path) -> Result<Vec<ProfileRecord>> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let doc: ImportDoc = serde_json::from_str(&raw)
        .with_context(|| format!("{} is not a profile export", path.display()))?;
    Ok(match doc {
        ImportDoc::Many(records) => records,
        ImportDoc::One(record) => vec![*record],
        ImportDoc::Keyed(map) => map.into_values().collect(),
    })
}
