//! Optional analyses run over the inventory after a cycle.
//!
//! Each capability has its own trait and its own list in the registry, so
//! the registry never has to ask an extension what it can do.

pub mod changes;
pub mod file_sizes;
pub mod file_types;

pub use changes::{ChangeDetector, ChangeSet, ModifiedFile};
pub use file_sizes::{FileSizeAnalyzer, SizeBucket, SizeStats};
pub use file_types::{FileTypeAnalyzer, FileTypeStats};

use crate::model::FileRecord;
use tracing::debug;

/// Output of a [`RecordAnalyzer`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnalysisReport {
    FileTypes(FileTypeStats),
    FileSizes(SizeStats),
}

/// Computes statistics over one record set.
pub trait RecordAnalyzer {
    fn name(&self) -> &'static str;
    fn analyze(&self, records: &[FileRecord]) -> AnalysisReport;
}

/// Compares the previous inventory with the current one.
pub trait ChangeTracker {
    fn name(&self) -> &'static str;
    fn detect(&self, previous: &[FileRecord], current: &[FileRecord]) -> ChangeSet;
}

#[derive(Debug, Clone, Default)]
pub struct ExtensionReport {
    pub analyses: Vec<(&'static str, AnalysisReport)>,
    /// Empty when no previous inventory was supplied.
    pub changes: Vec<(&'static str, ChangeSet)>,
}

#[derive(Default)]
pub struct ExtensionRegistry {
    analyzers: Vec<Box<dyn RecordAnalyzer + Send + Sync>>,
    trackers: Vec<Box<dyn ChangeTracker + Send + Sync>>,
}

impl ExtensionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register_analyzer(FileTypeAnalyzer);
        registry.register_analyzer(FileSizeAnalyzer);
        registry.register_tracker(ChangeDetector);
        registry
    }

    pub fn register_analyzer(&mut self, analyzer: impl RecordAnalyzer + Send + Sync + 'static) {
        self.analyzers.push(Box::new(analyzer));
    }

    pub fn register_tracker(&mut self, tracker: impl ChangeTracker + Send + Sync + 'static) {
        self.trackers.push(Box::new(tracker));
    }

    pub fn analyzer_names(&self) -> Vec<&'static str> {
        self.analyzers.iter().map(|a| a.name()).collect()
    }

    pub fn tracker_names(&self) -> Vec<&'static str> {
        self.trackers.iter().map(|t| t.name()).collect()
    }

    pub fn run(&self, previous: Option<&[FileRecord]>, current: &[FileRecord]) -> ExtensionReport {
        let analyses = self
            .analyzers
            .iter()
            .map(|a| (a.name(), a.analyze(current)))
            .collect();

        let changes = match previous {
            Some(previous) => self
                .trackers
                .iter()
                .map(|t| (t.name(), t.detect(previous, current)))
                .collect(),
            None => Vec::new(),
        };

        debug!(
            "Ran {} analyzers and {} change trackers",
            self.analyzers.len(),
            if previous.is_some() { self.trackers.len() } else { 0 }
        );
        ExtensionReport { analyses, changes }
    }
}
