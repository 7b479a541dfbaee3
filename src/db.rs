use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{Context, Result};
use rusqlite::{Connection, OptionalExtension};

use crate::error::StoreError;
use crate::model::ProfileRecord;

pub fn connect(path: &Path) -> Result<Connection> {
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create {}", dir.display()))?;
    }
    let conn = Connection::open(path)
        .with_context(|| format!("Failed to open {}", path.display()))?;
    conn.execute_batch("PRAGMA journal_mode=WAL;")?;
    init_schema(&conn)?;
    Ok(conn)
}

pub fn init_schema(conn: &Connection) -> Result<(), StoreError> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS profiles (
            profile_id  TEXT PRIMARY KEY,
            url         TEXT NOT NULL,
            name        TEXT,
            captured_at TEXT NOT NULL,
            record      TEXT NOT NULL,
            saved_at    TEXT NOT NULL DEFAULT (datetime('now'))
        );
        CREATE INDEX IF NOT EXISTS idx_profiles_captured ON profiles(captured_at);
        ",
    )?;
    Ok(())
}

// ── Writes ──

/// Insert or overwrite the record stored under its `profileId`.
pub fn save(conn: &Connection, record: &ProfileRecord) -> Result<(), StoreError> {
    let id = record.profile_id.as_deref().ok_or(StoreError::MissingProfileId)?;
    let json = serde_json::to_string(record)?;
    conn.execute(
        "INSERT OR REPLACE INTO profiles (profile_id, url, name, captured_at, record)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        rusqlite::params![id, record.url, record.name, record.timestamp, json],
    )?;
    Ok(())
}

/// Save a batch in one transaction. Records without an id are skipped; returns how many were saved.
pub fn save_many(conn: &Connection, records: &[ProfileRecord]) -> Result<usize, StoreError> {
    let tx = conn.unchecked_transaction()?;
    let mut count = 0;
    {
        let mut stmt = tx.prepare(
            "INSERT OR REPLACE INTO profiles (profile_id, url, name, captured_at, record)
             VALUES (?1, ?2, ?3, ?4, ?5)",
        )?;
        for r in records {
            let Some(id) = r.profile_id.as_deref() else {
                continue;
            };
            let json = serde_json::to_string(r)?;
            count += stmt.execute(rusqlite::params![id, r.url, r.name, r.timestamp, json])?;
        }
    }
    tx.commit()?;
    Ok(count)
}

pub fn delete(conn: &Connection, profile_id: &str) -> Result<(), StoreError> {
    let removed = conn.execute("DELETE FROM profiles WHERE profile_id = ?1", [profile_id])?;
    if removed == 0 {
        return Err(StoreError::NotFound(profile_id.to_string()));
    }
    Ok(())
}

pub fn clear_all(conn: &Connection) -> Result<usize, StoreError> {
    Ok(conn.execute("DELETE FROM profiles", [])?)
}

// ── Reads ──

pub fn get(conn: &Connection, profile_id: &str) -> Result<ProfileRecord, StoreError> {
    let json: Option<String> = conn
        .query_row(
            "SELECT record FROM profiles WHERE profile_id = ?1",
            [profile_id],
            |row| row.get(0),
        )
        .optional()?;
    match json {
        Some(json) => Ok(serde_json::from_str(&json)?),
        None => Err(StoreError::NotFound(profile_id.to_string())),
    }
}

pub fn get_all(conn: &Connection) -> Result<BTreeMap<String, ProfileRecord>, StoreError> {
    let mut stmt = conn.prepare("SELECT profile_id, record FROM profiles")?;
    let rows = stmt
        .query_map([], |row| Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?)))?
        .collect::<Result<Vec<_>, _>>()?;

    let mut out = BTreeMap::new();
    for (id, json) in rows {
        out.insert(id, serde_json::from_str(&json)?);
    }
    Ok(out)
}

// ── Tests ──
