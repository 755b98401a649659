use crate::config::AppConfig;
use crate::error::Error;
use crate::model::Group;
use glob::Pattern;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing::{debug, error, warn};
use walkdir::WalkDir;

/// A candidate file and the group it was found in.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct WalkEntry {
    pub path: PathBuf,
    pub group: Group,
}

impl WalkEntry {
    pub fn filename(&self) -> String {
        self.path
            .file_name()
            .map(|f| f.to_string_lossy().into_owned())
            .unwrap_or_default()
    }
}

/// File names left out of the inventory. Plain names match exactly;
/// entries containing glob metacharacters are compiled as patterns.
#[derive(Debug, Clone, Default)]
pub struct ExcludeSet {
    names: HashSet<String>,
    patterns: Vec<Pattern>,
}

impl ExcludeSet {
    pub fn new<S: AsRef<str>>(entries: &[S]) -> Self {
        let mut names = HashSet::new();
        let mut patterns = Vec::new();
        for entry in entries {
            let entry = entry.as_ref();
            if entry.contains(&['*', '?', '['][..]) {
                match Pattern::new(entry) {
                    Ok(p) => patterns.push(p),
                    Err(e) => error!("Invalid exclude pattern '{}': {}", entry, e),
                }
            } else {
                names.insert(entry.to_string());
            }
        }
        Self { names, patterns }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.contains(name) || self.patterns.iter().any(|p| p.matches(name))
    }
}

/// Enumerates files directly under the root and one level inside each
/// recognized group folder. Anything deeper is not reported.
pub struct Walker {
    root: PathBuf,
    excluded: ExcludeSet,
    group_folders: HashSet<String>,
}

impl Walker {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            root: config.root(),
            excluded: ExcludeSet::new(&config.excluded_files),
            group_folders: config.group_folders.iter().cloned().collect(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Unordered list of candidate files. Order follows the filesystem and
    /// must not be relied upon.
    pub fn walk(&self) -> Result<Vec<WalkEntry>, Error> {
        if !self.root.is_dir() {
            return Err(Error::RootNotFound(self.root.clone()));
        }

        let mut entries = Vec::new();

        for (path, name) in list_files(&self.root, |name| self.group_folders.contains(name)) {
            if self.excluded.contains(&name) {
                continue;
            }
            entries.push(WalkEntry {
                path,
                group: Group::Root,
            });
        }

        let mut groups: Vec<&String> = self.group_folders.iter().collect();
        groups.sort();
        for group in groups {
            let group_dir = self.root.join(group);
            if !group_dir.is_dir() {
                continue;
            }
            for (path, name) in list_files(&group_dir, |_| false) {
                if self.excluded.contains(&name) {
                    continue;
                }
                entries.push(WalkEntry {
                    path,
                    group: Group::Folder(group.clone()),
                });
            }
        }

        debug!(
            "Walked {}: {} candidate files",
            self.root.display(),
            entries.len()
        );
        Ok(entries)
    }
}

/// Regular files directly inside `dir`, skipping names for which `skip` is
/// true. Unreadable entries are logged and left out.
fn list_files(dir: &Path, skip: impl Fn(&str) -> bool) -> Vec<(PathBuf, String)> {
    let mut files = Vec::new();
    for entry in WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .follow_links(true)
    {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) => {
                warn!("Error reading entry in {}: {}", dir.display(), err);
                continue;
            }
        };
        let name = entry.file_name().to_string_lossy().into_owned();
        if skip(&name) || !entry.file_type().is_file() {
            continue;
        }
        files.push((entry.into_path(), name));
    }
    files
}
