//! Snapshot persistence for audit runs.
//!
//! Each live run saves the admin-group mapping to a dated file
//! (`DDMMYY_SS_pam.json`) so a later `--report` run can diff against
//! it. Discovery orders files by the date and sequence encoded in the
//! filename, not by filesystem mtime.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use time::format_description;

use crate::collector::AdminGroups;

/// Current schema version for snapshot format
pub const SNAPSHOT_SCHEMA_VERSION: &str = "1.0";

/// Suffix shared by every snapshot file
pub const SNAPSHOT_SUFFIX: &str = "_pam.json";

/// Metadata about the snapshot
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SnapshotMetadata {
    /// Schema version for compatibility checking
    #[serde(default)]
    pub schema_version: String,
    /// Timestamp when the snapshot was generated (ISO 8601)
    #[serde(default)]
    pub generated_at: String,
    /// Number of users whose memberships were recorded
    #[serde(default)]
    pub users_checked: usize,
    /// Directory service the mapping was read from
    #[serde(default)]
    pub source: String,
}

/// A persisted admin-group mapping from one audit run
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AuditSnapshot {
    pub metadata: SnapshotMetadata,
    /// Admin group display name -> member principals
    #[serde(default)]
    pub admin_groups: AdminGroups,
}

impl AuditSnapshot {
    /// Wrap a collected mapping with run metadata
    pub fn new(admin_groups: AdminGroups, users_checked: usize) -> Self {
        let generated_at = OffsetDateTime::now_utc()
            .format(&format_description::well_known::Iso8601::DEFAULT)
            .unwrap_or_else(|_| "unknown".to_string());

        Self {
            metadata: SnapshotMetadata {
                schema_version: SNAPSHOT_SCHEMA_VERSION.to_string(),
                generated_at,
                users_checked,
                source: "entra".to_string(),
            },
            admin_groups,
        }
    }

    /// Save under `output_dir`, creating it if needed. With no explicit
    /// name, the file is `DDMMYY_SS_pam.json` where SS is the lowest
    /// unused sequence number for today.
    pub fn save(&self, output_dir: &Path, explicit_name: Option<&str>) -> io::Result<PathBuf> {
        fs::create_dir_all(output_dir)?;

        let name = match explicit_name {
            Some(name) => name.to_string(),
            None => next_sequence_name(output_dir, &date_stamp())?,
        };
        let path = output_dir.join(name);

        let json = serde_json::to_string_pretty(self)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
        fs::write(&path, json)?;

        Ok(path)
    }

    /// Load a snapshot from disk. A schema-version mismatch warns but
    /// does not fail the load.
    pub fn load(path: &Path) -> io::Result<Self> {
        let content = fs::read_to_string(path)?;
        let snapshot: Self = serde_json::from_str(&content)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;

        if snapshot.metadata.schema_version != SNAPSHOT_SCHEMA_VERSION {
            eprintln!(
                "[pamwatch][warn] snapshot schema version mismatch in {}: found '{}', expected '{}'",
                path.display(),
                snapshot.metadata.schema_version,
                SNAPSHOT_SCHEMA_VERSION
            );
        }

        Ok(snapshot)
    }
}

/// Today's date as DDMMYY
fn date_stamp() -> String {
    let format =
        format_description::parse("[day][month][year repr:last_two]").unwrap_or_default();
    OffsetDateTime::now_utc()
        .format(&format)
        .unwrap_or_else(|_| "000000".to_string())
}

/// Lowest unused `DDMMYY_SS_pam.json` name for the given date
fn next_sequence_name(dir: &Path, date: &str) -> io::Result<String> {
    for seq in 0..100 {
        let name = format!("{}_{:02}{}", date, seq, SNAPSHOT_SUFFIX);
        if !dir.join(&name).exists() {
            return Ok(name);
        }
    }
    Err(io::Error::other(format!(
        "snapshot sequence exhausted for {} (100 files in one day)",
        date
    )))
}

/// Sort key parsed from a `DDMMYY_SS_pam.json` filename:
/// (year, month, day, sequence). Files with other names are ignored.
fn sort_key(file_name: &str) -> Option<(u16, u8, u8, u8)> {
    let stem = file_name.strip_suffix(SNAPSHOT_SUFFIX)?;
    let (date, seq) = stem.split_once('_')?;
    if date.len() != 6 || !date.is_ascii() {
        return None;
    }
    let day: u8 = date.get(0..2)?.parse().ok()?;
    let month: u8 = date.get(2..4)?.parse().ok()?;
    let year: u16 = date.get(4..6)?.parse().ok()?;
    let seq: u8 = seq.parse().ok()?;
    Some((year, month, day, seq))
}

/// All snapshot files in `dir`, oldest first
pub fn list_snapshots(dir: &Path) -> io::Result<Vec<PathBuf>> {
    let mut found: Vec<((u16, u8, u8, u8), PathBuf)> = Vec::new();
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let file_name = entry.file_name();
        if let Some(key) = sort_key(&file_name.to_string_lossy()) {
            found.push((key, entry.path()));
        }
    }
    found.sort();
    Ok(found.into_iter().map(|(_, path)| path).collect())
}
