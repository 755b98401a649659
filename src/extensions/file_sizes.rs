use super::{AnalysisReport, RecordAnalyzer};
use crate::model::FileRecord;
use std::fs;

const KIB: u64 = 1024;
const MIB: u64 = 1024 * KIB;
const GIB: u64 = 1024 * MIB;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SizeBucket {
    Tiny,
    Small,
    Medium,
    Large,
    Huge,
}

impl SizeBucket {
    pub const ALL: [SizeBucket; 5] = [
        SizeBucket::Tiny,
        SizeBucket::Small,
        SizeBucket::Medium,
        SizeBucket::Large,
        SizeBucket::Huge,
    ];

    pub fn for_size(bytes: u64) -> Self {
        if bytes < KIB {
            SizeBucket::Tiny
        } else if bytes < MIB {
            SizeBucket::Small
        } else if bytes < 100 * MIB {
            SizeBucket::Medium
        } else if bytes < GIB {
            SizeBucket::Large
        } else {
            SizeBucket::Huge
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            SizeBucket::Tiny => "Tiny (< 1KB)",
            SizeBucket::Small => "Small (1KB - 1MB)",
            SizeBucket::Medium => "Medium (1MB - 100MB)",
            SizeBucket::Large => "Large (100MB - 1GB)",
            SizeBucket::Huge => "Huge (> 1GB)",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SizeStats {
    pub total_size: u64,
    pub counts: [usize; 5],
}

impl SizeStats {
    pub fn count(&self, bucket: SizeBucket) -> usize {
        self.counts[bucket as usize]
    }

    pub fn total_files(&self) -> usize {
        self.counts.iter().sum()
    }
}

/// Buckets files by on-disk size. Files that can no longer be stat'ed
/// are left out.
pub struct FileSizeAnalyzer;

impl RecordAnalyzer for FileSizeAnalyzer {
    fn name(&self) -> &'static str {
        "file_size_analyzer"
    }

    fn analyze(&self, records: &[FileRecord]) -> AnalysisReport {
        let mut stats = SizeStats::default();
        for record in records {
            if let Ok(metadata) = fs::metadata(&record.path) {
                let size = metadata.len();
                stats.total_size += size;
                stats.counts[SizeBucket::for_size(size) as usize] += 1;
            }
        }
        AnalysisReport::FileSizes(stats)
    }
}

/// Human-readable byte count, e.g. `1.5 MB`.
pub fn format_size(bytes: u64) -> String {
    let mut size = bytes as f64;
    for unit in ["B", "KB", "MB", "GB", "TB"] {
        if size < 1024.0 {
            return format!("{:.1} {}", size, unit);
        }
        size /= 1024.0;
    }
    format!("{:.1} PB", size)
}
