use crate::model::{FileRecord, IdentityKey};
use crate::scanner::ExcludeSet;
use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};
use tracing::{debug, trace};

/// Reconcile the previous store with a fresh scan.
///
/// Output holds exactly one record per identity key present in `fresh`
/// (excluded names aside), in fresh-scan order. For a key already known
/// from `previous`, whichever record carries the strictly latest
/// timestamp wins, which may keep an older path for content that moved.
/// Previous keys absent from `fresh` are deleted files and are dropped.
pub fn merge(
    previous: &[FileRecord],
    fresh: &[FileRecord],
    excluded: &ExcludeSet,
) -> Vec<FileRecord> {
    let mut index: HashMap<IdentityKey, Vec<&FileRecord>> = HashMap::new();
    for record in previous {
        if excluded.contains(&record.filename) {
            continue;
        }
        index.entry(record.identity_key()).or_default().push(record);
    }

    let mut emitted: HashSet<IdentityKey> = HashSet::with_capacity(fresh.len());
    let mut merged = Vec::with_capacity(fresh.len());
    let mut superseded = 0usize;

    for record in fresh {
        if excluded.contains(&record.filename) {
            continue;
        }
        let key = record.identity_key();
        if emitted.contains(&key) {
            trace!("Dropping {}: key {} already emitted", record.display_path(), key);
            continue;
        }

        let keep = match index.get(&key) {
            Some(known) => {
                let mut latest = record;
                for &candidate in known {
                    if candidate.timestamp.compare(&latest.timestamp) == Ordering::Greater {
                        latest = candidate;
                    }
                }
                if !std::ptr::eq(latest, record) {
                    superseded += 1;
                    debug!(
                        "Kept stored {} over scanned {} (later timestamp)",
                        latest.display_path(),
                        record.display_path()
                    );
                }
                latest
            }
            None => record,
        };

        merged.push(keep.clone());
        emitted.insert(key);
    }

    debug!(
        "Merged {} previous + {} fresh into {} records ({} kept from store)",
        previous.len(),
        fresh.len(),
        merged.len(),
        superseded
    );
    merged
}
