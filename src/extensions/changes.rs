use super::ChangeTracker;
use crate::model::{FileRecord, Group};
use std::collections::{HashMap, HashSet};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModifiedFile {
    pub current: FileRecord,
    pub previous: FileRecord,
}

/// Differences between two inventories, matched by (group, filename).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChangeSet {
    pub new_files: Vec<FileRecord>,
    pub modified_files: Vec<ModifiedFile>,
    pub deleted_files: Vec<FileRecord>,
}

impl ChangeSet {
    pub fn total(&self) -> usize {
        self.new_files.len() + self.modified_files.len() + self.deleted_files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }
}

pub struct ChangeDetector;

impl ChangeTracker for ChangeDetector {
    fn name(&self) -> &'static str {
        "change_detector"
    }

    fn detect(&self, previous: &[FileRecord], current: &[FileRecord]) -> ChangeSet {
        let before: HashMap<(&Group, &str), &FileRecord> = previous
            .iter()
            .map(|r| ((&r.group, r.filename.as_str()), r))
            .collect();

        let mut changes = ChangeSet::default();
        let mut seen: HashSet<(&Group, &str)> = HashSet::with_capacity(current.len());

        for record in current {
            let key = (&record.group, record.filename.as_str());
            seen.insert(key);
            match before.get(&key) {
                Some(prev) => {
                    if prev.fingerprint != record.fingerprint || prev.timestamp != record.timestamp {
                        changes.modified_files.push(ModifiedFile {
                            current: record.clone(),
                            previous: (*prev).clone(),
                        });
                    }
                }
                None => changes.new_files.push(record.clone()),
            }
        }

        changes.deleted_files = previous
            .iter()
            .filter(|r| !seen.contains(&(&r.group, r.filename.as_str())))
            .cloned()
            .collect();

        changes
    }
}
