pub mod cache;
pub mod digest;

pub use cache::IncrementalCache;
pub use digest::{chunk_size_for, ContentHasher, Sha1Hasher};

use crate::config::AppConfig;
use crate::model::{FileRecord, Fingerprint, Timestamp};
use crate::progress::{ProgressReporter, ProgressThrottle};
use crate::scanner::WalkEntry;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{trace, warn};

const DEFAULT_CHUNK_SIZE: usize = 8192;

impl<H: ContentHasher + ?Sized> ContentHasher for &H {
    fn hash_file(&self, path: &Path, chunk_size: usize) -> io::Result<String> {
        (**self).hash_file(path, chunk_size)
    }
}

/// How a single record got its fingerprint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Reused,
    Hashed,
    TooLarge,
    Failed,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct FingerprintStats {
    pub scanned: usize,
    pub reused: usize,
    pub hashed: usize,
    pub too_large: usize,
    pub failed: usize,
}

impl FingerprintStats {
    fn record(&mut self, outcome: Outcome) {
        self.scanned += 1;
        match outcome {
            Outcome::Reused => self.reused += 1,
            Outcome::Hashed => self.hashed += 1,
            Outcome::TooLarge => self.too_large += 1,
            Outcome::Failed => self.failed += 1,
        }
    }
}

/// Fingerprint of the file at `path` with the default SHA-1 hasher.
/// Access errors are logged and give [`Fingerprint::Absent`].
pub fn fingerprint(path: &Path, size_limit: Option<u64>) -> Fingerprint {
    let result = fs::metadata(path).and_then(|metadata| {
        fingerprint_with(&Sha1Hasher, path, metadata.len(), size_limit, DEFAULT_CHUNK_SIZE)
    });
    match result {
        Ok(fp) => fp,
        Err(e) => {
            warn!("Error fingerprinting '{}': {}", path.display(), e);
            Fingerprint::Absent
        }
    }
}

fn fingerprint_with<H: ContentHasher>(
    hasher: &H,
    path: &Path,
    file_size: u64,
    size_limit: Option<u64>,
    chunk_hint: usize,
) -> io::Result<Fingerprint> {
    if let Some(limit) = size_limit {
        if file_size > limit {
            trace!(
                "Skipping hash for {} ({} bytes > {} limit)",
                path.display(),
                file_size,
                limit
            );
            return Ok(Fingerprint::TooLarge);
        }
    }
    let digest = hasher.hash_file(path, chunk_size_for(file_size, chunk_hint))?;
    Ok(Fingerprint::Digest(digest))
}

fn stat(path: &Path) -> io::Result<(u64, std::time::SystemTime)> {
    let metadata = fs::metadata(path)?;
    Ok((metadata.len(), metadata.modified()?))
}

/// Turns walker output into records, reusing digests from the previous
/// store when a file's timestamp is unchanged.
pub struct FingerprintEngine<H: ContentHasher = Sha1Hasher> {
    hasher: H,
    root: PathBuf,
    size_limit: Option<u64>,
    chunk_size: usize,
    cache: IncrementalCache,
}

impl FingerprintEngine<Sha1Hasher> {
    pub fn new(config: &AppConfig, previous: &[FileRecord]) -> Self {
        Self::with_hasher(config, previous, Sha1Hasher)
    }
}

impl<H: ContentHasher> FingerprintEngine<H> {
    pub fn with_hasher(config: &AppConfig, previous: &[FileRecord], hasher: H) -> Self {
        Self {
            hasher,
            root: config.root(),
            size_limit: config.size_limit_bytes(),
            chunk_size: config.chunk_size_bytes,
            cache: IncrementalCache::from_records(previous),
        }
    }

    /// Stored digests available for reuse.
    pub fn cached_digests(&self) -> usize {
        self.cache.len()
    }

    pub fn fingerprint_entry(&self, entry: &WalkEntry) -> (FileRecord, Outcome) {
        let filename = entry.filename();
        let make = |fingerprint: Fingerprint, timestamp: Timestamp| {
            FileRecord::new(&self.root, entry.group.clone(), filename.clone(), fingerprint, timestamp)
        };

        let (file_size, modified) = match stat(&entry.path) {
            Ok(m) => m,
            Err(e) => {
                warn!("Error reading metadata for {}: {}", entry.path.display(), e);
                return (make(Fingerprint::Absent, Timestamp::default()), Outcome::Failed);
            }
        };
        let timestamp = Timestamp::from_system_time(modified);

        if let Some(digest) = self.cache.lookup(&entry.group, &filename, &timestamp) {
            trace!("Reusing cached digest for {}", entry.path.display());
            let digest = Fingerprint::Digest(digest.to_string());
            return (make(digest, timestamp), Outcome::Reused);
        }

        match fingerprint_with(
            &self.hasher,
            &entry.path,
            file_size,
            self.size_limit,
            self.chunk_size,
        ) {
            Ok(Fingerprint::TooLarge) => (make(Fingerprint::TooLarge, timestamp), Outcome::TooLarge),
            Ok(fp) => (make(fp, timestamp), Outcome::Hashed),
            Err(e) => {
                warn!("Error hashing '{}': {}", entry.path.display(), e);
                (make(Fingerprint::Absent, timestamp), Outcome::Failed)
            }
        }
    }

    pub fn fingerprint_all(
        &self,
        entries: &[WalkEntry],
        reporter: &dyn ProgressReporter,
    ) -> (Vec<FileRecord>, FingerprintStats) {
        let throttle = ProgressThrottle::default();
        let total = entries.len();
        let mut stats = FingerprintStats::default();
        let mut records = Vec::with_capacity(total);

        reporter.on_hash_start(total);
        for (i, entry) in entries.iter().enumerate() {
            let (record, outcome) = self.fingerprint_entry(entry);
            stats.record(outcome);
            throttle.report(reporter, i + 1, total, &record.filename);
            records.push(record);
        }

        (records, stats)
    }
}
