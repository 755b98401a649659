use crate::analysis::{find_duplicates, merge, DuplicateReport};
use crate::config::AppConfig;
use crate::error::Error;
use crate::extensions::{ExtensionRegistry, ExtensionReport};
use crate::hasher::{ContentHasher, FingerprintEngine, FingerprintStats, Sha1Hasher};
use crate::model::{FileRecord, Group};
use crate::progress::ProgressReporter;
use crate::scanner::{ExcludeSet, Walker};
use crate::storage::RecordStore;
use std::collections::BTreeMap;
use std::time::{Duration, Instant};
use tracing::{debug, error, info, warn};

/// Runs the inventory pipeline against one root.
pub struct ScanEngine<H: ContentHasher = Sha1Hasher> {
    config: AppConfig,
    hasher: H,
    extensions: ExtensionRegistry,
}

#[derive(Debug)]
pub struct CycleResult {
    pub scan_duration: Duration,
    pub hash_duration: Duration,
    pub store_write_duration: Duration,
    pub stats: FingerprintStats,
    /// Rows in the store before this cycle.
    pub previous_count: usize,
    /// The canonical inventory that was saved.
    pub records: Vec<FileRecord>,
    /// Duplicates among the files seen on disk this cycle.
    pub duplicates: DuplicateReport,
    pub folder_counts: BTreeMap<Group, usize>,
    pub extensions: Option<ExtensionReport>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StoreCleanup {
    pub before: usize,
    pub after: usize,
}

impl StoreCleanup {
    pub fn removed(&self) -> usize {
        self.before.saturating_sub(self.after)
    }
}

impl ScanEngine<Sha1Hasher> {
    pub fn new(config: AppConfig) -> Self {
        Self::with_hasher(config, Sha1Hasher)
    }
}

impl<H: ContentHasher> ScanEngine<H> {
    pub fn with_hasher(config: AppConfig, hasher: H) -> Self {
        Self {
            config: exclude_store_files(config),
            hasher,
            extensions: ExtensionRegistry::with_defaults(),
        }
    }

    pub fn with_extensions(mut self, extensions: ExtensionRegistry) -> Self {
        self.extensions = extensions;
        self
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn hasher(&self) -> &H {
        &self.hasher
    }

    fn store(&self) -> RecordStore {
        RecordStore::new(&self.config)
    }

    /// One full cycle: walk, fingerprint, merge, persist, report.
    ///
    /// The store is only rewritten once every earlier step succeeded; a
    /// missing root or failed save returns `Err` with the previous file
    /// left in place. An unreadable store is treated as empty and gets
    /// rebuilt from the scan.
    pub fn run_cycle(&self, reporter: &dyn ProgressReporter) -> Result<CycleResult, Error> {
        let store = self.store();
        let previous = load_previous(&store);

        let scan_start = Instant::now();
        let (fresh, stats, hash_duration) = self.scan_with(&previous, reporter)?;
        let scan_duration = scan_start.elapsed().saturating_sub(hash_duration);

        let excluded = ExcludeSet::new(&self.config.excluded_files);
        let records = merge(&previous, &fresh, &excluded);
        if records.is_empty() && !previous.is_empty() {
            warn!(
                "No files found under {}; replacing {} stored records with an empty store",
                self.config.root().display(),
                previous.len()
            );
        }

        info!("Writing store...");
        reporter.on_store_write_start();
        let write_start = Instant::now();
        let written = match store.save(&records) {
            Ok(written) => written,
            Err(e) => {
                reporter.on_store_write_failed(&e.to_string());
                return Err(e);
            }
        };
        let store_write_duration = write_start.elapsed();
        reporter.on_store_write_complete(written, store_write_duration.as_secs_f64());
        debug!(
            "Store write completed in {:.2}s: {} rows",
            store_write_duration.as_secs_f64(),
            written
        );

        let duplicates = find_duplicates(&fresh);
        let extensions = self
            .config
            .enable_extensions
            .then(|| self.extensions.run(Some(&previous), &records));

        Ok(CycleResult {
            scan_duration,
            hash_duration,
            store_write_duration,
            stats,
            previous_count: previous.len(),
            folder_counts: folder_distribution(&records),
            records,
            duplicates,
            extensions,
        })
    }

    /// Walk and fingerprint what is on disk now, reusing stored digests,
    /// without touching the store.
    pub fn scan_files(&self, reporter: &dyn ProgressReporter) -> Result<Vec<FileRecord>, Error> {
        let previous = load_previous(&self.store());
        let (fresh, _, _) = self.scan_with(&previous, reporter)?;
        Ok(fresh)
    }

    fn scan_with(
        &self,
        previous: &[FileRecord],
        reporter: &dyn ProgressReporter,
    ) -> Result<(Vec<FileRecord>, FingerprintStats, Duration), Error> {
        let walker = Walker::new(&self.config);
        info!("Scanning {}...", walker.root().display());
        reporter.on_scan_start();
        let walk_start = Instant::now();
        let entries = walker.walk()?;
        let walk_duration = walk_start.elapsed();
        reporter.on_scan_complete(entries.len(), walk_duration.as_secs_f64());
        debug!(
            "Walk completed in {:.2}s: {} candidate files",
            walk_duration.as_secs_f64(),
            entries.len()
        );

        let hash_start = Instant::now();
        let fingerprinter = FingerprintEngine::with_hasher(&self.config, previous, &self.hasher);
        info!(
            "Fingerprinting {} files ({} stored digests available)...",
            entries.len(),
            fingerprinter.cached_digests()
        );
        let (fresh, stats) = fingerprinter.fingerprint_all(&entries, reporter);
        let hash_duration = hash_start.elapsed();
        reporter.on_hash_complete(stats.hashed, stats.reused, hash_duration.as_secs_f64());
        debug!(
            "Fingerprinting completed in {:.2}s: {} hashed, {} reused, {} too large, {} failed",
            hash_duration.as_secs_f64(),
            stats.hashed,
            stats.reused,
            stats.too_large,
            stats.failed
        );

        Ok((fresh, stats, hash_duration))
    }

    /// The inventory as currently stored.
    pub fn load_inventory(&self) -> Result<Vec<FileRecord>, Error> {
        self.store().load()
    }

    /// Collapse duplicate-identity rows in the existing store.
    pub fn clean_store(&self) -> Result<StoreCleanup, Error> {
        let store = self.store();
        let records = store.load()?;
        let excluded = ExcludeSet::new(&self.config.excluded_files);
        let cleaned = merge(&records, &records, &excluded);
        store.save(&cleaned)?;

        let cleanup = StoreCleanup {
            before: records.len(),
            after: cleaned.len(),
        };
        info!(
            "Cleaned store: {} rows -> {} rows ({} removed)",
            cleanup.before,
            cleanup.after,
            cleanup.removed()
        );
        Ok(cleanup)
    }

    /// Run the registered analyzers over the stored inventory.
    pub fn analyze_inventory(&self) -> Result<ExtensionReport, Error> {
        let records = self.store().load()?;
        Ok(self.extensions.run(None, &records))
    }
}

/// Previous inventory for a cycle. A store that cannot be read at all is
/// logged and treated as empty; the cycle's save replaces it.
fn load_previous(store: &RecordStore) -> Vec<FileRecord> {
    match store.load() {
        Ok(records) => records,
        Err(e) => {
            error!(
                "Could not read store {}: {}; starting from an empty inventory",
                store.path().display(),
                e
            );
            Vec::new()
        }
    }
}

/// Record count per group.
pub fn folder_distribution(records: &[FileRecord]) -> BTreeMap<Group, usize> {
    let mut counts = BTreeMap::new();
    for record in records {
        *counts.entry(record.group.clone()).or_insert(0) += 1;
    }
    counts
}

/// Keep the store file and its temp sibling out of the inventory when the
/// store lives directly under the root.
fn exclude_store_files(mut config: AppConfig) -> AppConfig {
    let store_path = config.store_path();
    if store_path.parent() != Some(config.root().as_path()) {
        return config;
    }
    if let Some(name) = store_path.file_name().map(|n| n.to_string_lossy().into_owned()) {
        for excluded in [name.clone(), format!("{}.tmp", name)] {
            if !config.excluded_files.contains(&excluded) {
                config.excluded_files.push(excluded);
            }
        }
    }
    config
}
