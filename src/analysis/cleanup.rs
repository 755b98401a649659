use super::duplicates::DuplicateReport;
use crate::model::FileRecord;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CleanupAction {
    Keep,
    Delete,
}

impl fmt::Display for CleanupAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CleanupAction::Keep => f.write_str("keep"),
            CleanupAction::Delete => f.write_str("delete"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CleanupSuggestion {
    pub action: CleanupAction,
    pub record: FileRecord,
    pub reason: String,
}

/// Proposes, per duplicate group, one copy to keep and the rest to delete.
///
/// Copies already sorted into a category folder are preferred over copies
/// sitting in the root. Among equals the first one in the group wins.
/// Nothing here touches the filesystem.
pub fn suggest_cleanup(report: &DuplicateReport) -> Vec<CleanupSuggestion> {
    let mut suggestions = Vec::new();

    for files in report.groups.values() {
        if files.len() <= 1 {
            continue;
        }

        let mut ranked: Vec<&FileRecord> = files.iter().collect();
        ranked.sort_by_key(|record| record.group.is_root());

        let keep = ranked[0];
        suggestions.push(CleanupSuggestion {
            action: CleanupAction::Keep,
            record: keep.clone(),
            reason: format!("Best location: {}", keep.group),
        });
        for dupe in &ranked[1..] {
            suggestions.push(CleanupSuggestion {
                action: CleanupAction::Delete,
                record: (*dupe).clone(),
                reason: format!("Duplicate of {}", keep.display_path()),
            });
        }
    }

    suggestions
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::duplicates::find_duplicates;
    use crate::model::{Fingerprint, Group, Timestamp};
    use std::path::Path;

    fn rec(group: Group, name: &str, digest: &str) -> FileRecord {
        FileRecord::new(
            Path::new("/nowhere"),
            group,
            name,
            Fingerprint::Digest(digest.into()),
            Timestamp::new("2024-01-01T00:00:00"),
        )
    }

    #[test]
    fn test_category_copy_is_kept() {
        let root_copy = rec(Group::Root, "setup.exe", "abc");
        let sorted_copy = rec(Group::Folder("Programs".into()), "setup.exe", "abc");
        let report = find_duplicates(&[root_copy.clone(), sorted_copy.clone()]);

        let suggestions = suggest_cleanup(&report);
        assert_eq!(suggestions.len(), 2);
        assert_eq!(suggestions[0].action, CleanupAction::Keep);
        assert_eq!(suggestions[0].record, sorted_copy);
        assert_eq!(suggestions[0].reason, "Best location: Programs");
        assert_eq!(suggestions[1].action, CleanupAction::Delete);
        assert_eq!(suggestions[1].record, root_copy);
    }

    #[test]
    fn test_one_keep_per_group() {
        let report = find_duplicates(&[
            rec(Group::Root, "a1", "a"),
            rec(Group::Root, "a2", "a"),
            rec(Group::Root, "a3", "a"),
            rec(Group::Folder("Music".into()), "b1", "b"),
            rec(Group::Folder("Video".into()), "b2", "b"),
        ]);
        let suggestions = suggest_cleanup(&report);
        let keeps = suggestions
            .iter()
            .filter(|s| s.action == CleanupAction::Keep)
            .count();
        assert_eq!(keeps, 2);
        assert_eq!(suggestions.len(), 5);
    }

    #[test]
    fn test_tie_break_is_deterministic() {
        let records = vec![
            rec(Group::Folder("Music".into()), "x.mp3", "s"),
            rec(Group::Folder("Video".into()), "x.mp4", "s"),
        ];
        let first = suggest_cleanup(&find_duplicates(&records));
        let second = suggest_cleanup(&find_duplicates(&records));
        assert_eq!(first, second);
        assert_eq!(first[0].record.filename, "x.mp3");
    }
}
