use crate::model::FileRecord;
use std::collections::BTreeMap;
use std::fs;
use tracing::{debug, warn};

/// Files that currently share identical content.
#[derive(Debug, Clone, Default)]
pub struct DuplicateReport {
    /// Digest → every record carrying it. Only groups of two or more.
    pub groups: BTreeMap<String, Vec<FileRecord>>,
    /// Redundant copies: sum of `len - 1` over all groups.
    pub total_duplicates: usize,
    /// Bytes a cleanup would free, from one stat per group.
    pub wasted_space: u64,
}

impl DuplicateReport {
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    pub fn group_count(&self) -> usize {
        self.groups.len()
    }

    /// Groups ordered by member count, largest first.
    pub fn largest_groups(&self, limit: usize) -> Vec<(&String, &Vec<FileRecord>)> {
        let mut groups: Vec<_> = self.groups.iter().collect();
        groups.sort_by(|a, b| b.1.len().cmp(&a.1.len()).then_with(|| a.0.cmp(b.0)));
        groups.truncate(limit);
        groups
    }
}

/// Group records by real digest. Sentinel and absent fingerprints never
/// take part.
pub fn find_duplicates(records: &[FileRecord]) -> DuplicateReport {
    let mut by_digest: BTreeMap<String, Vec<FileRecord>> = BTreeMap::new();
    for record in records {
        if let Some(digest) = record.fingerprint.digest() {
            by_digest
                .entry(digest.to_string())
                .or_default()
                .push(record.clone());
        }
    }
    by_digest.retain(|_, files| files.len() > 1);

    let mut total_duplicates = 0usize;
    let mut wasted_space = 0u64;
    for files in by_digest.values() {
        let extra = files.len() - 1;
        total_duplicates += extra;
        wasted_space += representative_size(files) * extra as u64;
    }

    debug!(
        "{} duplicate groups, {} redundant copies, {} bytes wasted",
        by_digest.len(),
        total_duplicates,
        wasted_space
    );

    DuplicateReport {
        groups: by_digest,
        total_duplicates,
        wasted_space,
    }
}

fn representative_size(files: &[FileRecord]) -> u64 {
    let Some(first) = files.first() else {
        return 0;
    };
    match fs::metadata(&first.path) {
        Ok(metadata) => metadata.len(),
        Err(e) => {
            warn!("Could not stat {}: {}", first.path.display(), e);
            0
        }
    }
}
