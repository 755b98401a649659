use crate::error::Error;
use crate::model::{FileRecord, Fingerprint, Group, Timestamp, ROOT_GROUP};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Column order of the current schema. The leading `path` column keeps
/// the composite `~\group\filename` form so legacy readers still work.
pub const HEADER: [&str; 7] = [
    "path",
    "rel_path",
    "folder_name",
    "filename",
    "sha1sum",
    "timestamp",
    "mtime_iso",
];

/// A row as written by the current version.
#[derive(Debug, Serialize)]
pub struct StoreRow<'a> {
    pub path: String,
    pub rel_path: String,
    pub folder_name: &'a str,
    pub filename: &'a str,
    pub sha1sum: &'a str,
    /// Legacy `YY/MM/DD` short date.
    pub timestamp: String,
    pub mtime_iso: &'a str,
}

impl<'a> From<&'a FileRecord> for StoreRow<'a> {
    fn from(record: &'a FileRecord) -> Self {
        let path = match &record.group {
            Group::Root => format!("{}\\{}", ROOT_GROUP, record.filename),
            Group::Folder(name) => format!("{}\\{}\\{}", ROOT_GROUP, name, record.filename),
        };
        StoreRow {
            path,
            rel_path: record.display_path(),
            folder_name: record.group.as_str(),
            filename: &record.filename,
            sha1sum: record.fingerprint.as_stored(),
            timestamp: record.timestamp.legacy(),
            mtime_iso: record.timestamp.as_str(),
        }
    }
}

/// A row as read from disk, from either schema. Columns that are missing
/// or empty come through as `None`.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct RawRow {
    pub path: Option<String>,
    pub rel_path: Option<String>,
    pub folder_name: Option<String>,
    pub filename: Option<String>,
    pub sha1sum: Option<String>,
    pub timestamp: Option<String>,
    pub mtime_iso: Option<String>,
}

impl RawRow {
    /// Normalize into a record, reconstructing the absolute path from `root`.
    pub fn into_record(self, root: &Path, line: u64) -> Result<FileRecord, Error> {
        let (group, filename) = match (self.folder_name, self.filename) {
            (Some(folder), Some(filename)) => (Group::parse(&folder), filename),
            _ => {
                let composite = self.path.ok_or_else(|| Error::MalformedRow {
                    line,
                    reason: "neither folder_name/filename nor path present".to_string(),
                })?;
                parse_legacy_path(&composite).ok_or_else(|| Error::MalformedRow {
                    line,
                    reason: format!("unrecognized composite path '{}'", composite),
                })?
            }
        };

        let timestamp = self
            .mtime_iso
            .filter(|ts| !ts.trim().is_empty())
            .or(self.timestamp)
            .map(Timestamp::new)
            .unwrap_or_default();

        Ok(FileRecord::new(
            root,
            group,
            filename,
            Fingerprint::parse(self.sha1sum.as_deref()),
            timestamp,
        ))
    }
}

/// Split a legacy `~\group\filename` or `~\filename` composite path.
pub fn parse_legacy_path(composite: &str) -> Option<(Group, String)> {
    let rest = composite
        .strip_prefix(ROOT_GROUP)
        .and_then(|r| r.strip_prefix('\\'))
        .unwrap_or(composite);
    let parts: Vec<&str> = rest.split('\\').collect();
    match parts.as_slice() {
        [filename] if !filename.is_empty() && *filename != ROOT_GROUP => {
            Some((Group::Root, filename.to_string()))
        }
        [group, filename] if !group.is_empty() && !filename.is_empty() => {
            Some((Group::parse(group), filename.to_string()))
        }
        _ => None,
    }
}
