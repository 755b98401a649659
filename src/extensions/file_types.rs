use super::{AnalysisReport, RecordAnalyzer};
use crate::model::FileRecord;
use std::collections::BTreeMap;
use std::path::Path;

pub const NO_EXTENSION: &str = "No Extension";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileTypeStats {
    pub total_files: usize,
    /// Lowercased extension including the dot, e.g. `.pdf`.
    pub by_extension: BTreeMap<String, usize>,
}

impl FileTypeStats {
    pub fn unique_extensions(&self) -> usize {
        self.by_extension.len()
    }

    /// Most common extensions first.
    pub fn top(&self, limit: usize) -> Vec<(&str, usize)> {
        let mut entries: Vec<(&str, usize)> = self
            .by_extension
            .iter()
            .map(|(ext, count)| (ext.as_str(), *count))
            .collect();
        entries.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
        entries.truncate(limit);
        entries
    }
}

pub struct FileTypeAnalyzer;

impl RecordAnalyzer for FileTypeAnalyzer {
    fn name(&self) -> &'static str {
        "file_type_analyzer"
    }

    fn analyze(&self, records: &[FileRecord]) -> AnalysisReport {
        let mut stats = FileTypeStats {
            total_files: records.len(),
            ..FileTypeStats::default()
        };
        for record in records {
            *stats
                .by_extension
                .entry(extension_of(&record.filename))
                .or_default() += 1;
        }
        AnalysisReport::FileTypes(stats)
    }
}

fn extension_of(filename: &str) -> String {
    Path::new(filename)
        .extension()
        .map(|ext| format!(".{}", ext.to_string_lossy().to_lowercase()))
        .unwrap_or_else(|| NO_EXTENSION.to_string())
}
