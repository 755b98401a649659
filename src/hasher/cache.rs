use crate::model::{FileRecord, Group, Timestamp};
use std::collections::HashMap;

/// Digests from the previous store, looked up by on-disk location.
///
/// A hit requires the stored timestamp to equal the freshly observed one
/// exactly and a real digest to have been recorded. Anything else means
/// the file gets read again.
#[derive(Debug, Default)]
pub struct IncrementalCache {
    entries: HashMap<(Group, String), (Timestamp, String)>,
}

impl IncrementalCache {
    pub fn from_records(records: &[FileRecord]) -> Self {
        let mut entries = HashMap::with_capacity(records.len());
        for record in records {
            if let Some(digest) = record.fingerprint.digest() {
                entries.insert(
                    (record.group.clone(), record.filename.clone()),
                    (record.timestamp.clone(), digest.to_string()),
                );
            }
        }
        Self { entries }
    }

    pub fn lookup(&self, group: &Group, filename: &str, observed: &Timestamp) -> Option<&str> {
        if observed.is_empty() {
            return None;
        }
        self.entries
            .get(&(group.clone(), filename.to_string()))
            .filter(|(stored, _)| stored == observed)
            .map(|(_, digest)| digest.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
