use super::row::{RawRow, StoreRow, HEADER};
use crate::config::AppConfig;
use crate::error::Error;
use crate::model::FileRecord;
use csv::{ReaderBuilder, StringRecord, Writer};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// The inventory file. Reads both historical schemas; always writes the
/// current one, replacing the whole file.
pub struct RecordStore {
    path: PathBuf,
    root: PathBuf,
}

impl RecordStore {
    pub fn new(config: &AppConfig) -> Self {
        Self::at(config.store_path(), config.root())
    }

    pub fn at(path: impl Into<PathBuf>, root: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            root: root.into(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load every readable row. A missing file is a first run and yields
    /// nothing; unreadable rows are logged and skipped.
    pub fn load(&self) -> Result<Vec<FileRecord>, Error> {
        if !self.path.exists() {
            info!(
                "No store at {}, starting with an empty inventory",
                self.path.display()
            );
            return Ok(Vec::new());
        }

        let mut reader = ReaderBuilder::new()
            .flexible(true)
            .trim(csv::Trim::Headers)
            .from_path(&self.path)?;
        let headers: StringRecord = reader.headers()?.clone();

        let mut records = Vec::new();
        let mut skipped = 0usize;
        for result in reader.records() {
            let row = match result {
                Ok(row) => row,
                Err(e) => {
                    warn!("Skipping unreadable store row: {}", e);
                    skipped += 1;
                    continue;
                }
            };
            let line = row.position().map(|p| p.line()).unwrap_or(0);
            let parsed = row
                .deserialize::<RawRow>(Some(&headers))
                .map_err(Error::from)
                .and_then(|raw| raw.into_record(&self.root, line));
            match parsed {
                Ok(record) => records.push(record),
                Err(e) => {
                    warn!("Skipping store row: {}", e);
                    skipped += 1;
                }
            }
        }

        debug!(
            "Loaded {} records from {} ({} skipped)",
            records.len(),
            self.path.display(),
            skipped
        );
        Ok(records)
    }

    /// Rewrite the whole store. Rows go to a sibling temp file that replaces
    /// the store only once fully written, so a failed save leaves the
    /// previous file as it was.
    pub fn save(&self, records: &[FileRecord]) -> Result<usize, Error> {
        let tmp_path = self.tmp_path();
        let result = write_rows(&tmp_path, records).and_then(|count| {
            fs::rename(&tmp_path, &self.path)?;
            Ok(count)
        });

        match result {
            Ok(count) => {
                debug!("Wrote {} records to {}", count, self.path.display());
                Ok(count)
            }
            Err(source) => {
                let _ = fs::remove_file(&tmp_path);
                Err(Error::StoreWrite {
                    path: self.path.clone(),
                    source,
                })
            }
        }
    }

    fn tmp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

fn write_rows(path: &Path, records: &[FileRecord]) -> Result<usize, csv::Error> {
    let mut writer = Writer::from_path(path)?;
    for record in records {
        writer.serialize(StoreRow::from(record))?;
    }
    if records.is_empty() {
        writer.write_record(HEADER)?;
    }
    writer.flush()?;
    Ok(records.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Fingerprint, Group, Timestamp};
    use tempfile::tempdir;

    #[test]
    fn test_missing_store_is_first_run() {
        let tmp = tempdir().unwrap();
        let store = RecordStore::at(tmp.path().join("results.csv"), tmp.path());
        assert!(store.load().unwrap().is_empty());
    }

    #[test]
    fn test_empty_save_writes_header() {
        let tmp = tempdir().unwrap();
        let store = RecordStore::at(tmp.path().join("results.csv"), tmp.path());
        store.save(&[]).unwrap();
        let text = fs::read_to_string(store.path()).unwrap();
        assert_eq!(
            text.trim(),
            "path,rel_path,folder_name,filename,sha1sum,timestamp,mtime_iso"
        );
        assert!(store.load().unwrap().is_empty());
    }

    #[test]
    fn test_save_then_load() {
        let tmp = tempdir().unwrap();
        let root = tmp.path();
        let store = RecordStore::at(root.join("results.csv"), root);
        let records = vec![
            FileRecord::new(
                root,
                Group::Root,
                "a.txt",
                Fingerprint::Digest("abc123".into()),
                Timestamp::new("2024-01-01T00:00:00"),
            ),
            FileRecord::new(
                root,
                Group::Folder("Video".into()),
                "big.mkv",
                Fingerprint::TooLarge,
                Timestamp::new("2024-06-01T00:00:00"),
            ),
            FileRecord::new(
                root,
                Group::Folder("Documents".into()),
                "locked.pdf",
                Fingerprint::Absent,
                Timestamp::new("2024-06-02T08:30:00"),
            ),
        ];

        assert_eq!(store.save(&records).unwrap(), 3);
        assert!(!root.join("results.csv.tmp").exists());
        assert_eq!(store.load().unwrap(), records);
    }
}
