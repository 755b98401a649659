use chrono::{DateTime, Local, NaiveDate, NaiveDateTime};
use std::cmp::Ordering;
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

/// Label used for files living directly under the monitored root.
pub const ROOT_GROUP: &str = "~";

/// Stored in place of a digest when a file exceeds the size ceiling.
pub const TOO_LARGE_SENTINEL: &str = "SKIPPED_TOO_LARGE";

const CANONICAL_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";
const LEGACY_FORMAT: &str = "%y/%m/%d";

/// First-level location of a file below the monitored root.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Group {
    Root,
    Folder(String),
}

impl Group {
    pub fn parse(label: &str) -> Self {
        if label == ROOT_GROUP || label.is_empty() {
            Group::Root
        } else {
            Group::Folder(label.to_string())
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Group::Root => ROOT_GROUP,
            Group::Folder(name) => name,
        }
    }

    pub fn is_root(&self) -> bool {
        matches!(self, Group::Root)
    }

    /// Absolute location of `filename` in this group under `root`.
    pub fn file_path(&self, root: &Path, filename: &str) -> PathBuf {
        match self {
            Group::Root => root.join(filename),
            Group::Folder(name) => root.join(name).join(filename),
        }
    }
}

impl fmt::Display for Group {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Content identity of a file. Serialized as the hex digest, the too-large
/// sentinel, or an empty field.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Fingerprint {
    Digest(String),
    TooLarge,
    Absent,
}

impl Fingerprint {
    pub fn parse(raw: Option<&str>) -> Self {
        match raw.map(str::trim) {
            None | Some("") => Fingerprint::Absent,
            Some(TOO_LARGE_SENTINEL) => Fingerprint::TooLarge,
            Some(digest) => Fingerprint::Digest(digest.to_string()),
        }
    }

    pub fn digest(&self) -> Option<&str> {
        match self {
            Fingerprint::Digest(digest) => Some(digest),
            _ => None,
        }
    }

    pub fn as_stored(&self) -> &str {
        match self {
            Fingerprint::Digest(digest) => digest,
            Fingerprint::TooLarge => TOO_LARGE_SENTINEL,
            Fingerprint::Absent => "",
        }
    }
}

/// Last-modified instant as it appears in the store.
///
/// The raw text is kept verbatim: the incremental cache compares it
/// exactly, while ordering goes through [`Timestamp::instant`], which
/// understands both the canonical and the legacy short-date forms.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct Timestamp(String);

impl Timestamp {
    pub fn new(raw: impl Into<String>) -> Self {
        Timestamp(raw.into().trim().to_string())
    }

    pub fn from_system_time(time: SystemTime) -> Self {
        let local: DateTime<Local> = time.into();
        Timestamp(local.naive_local().format(CANONICAL_FORMAT).to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn instant(&self) -> Option<NaiveDateTime> {
        if let Ok(dt) = NaiveDateTime::parse_from_str(&self.0, CANONICAL_FORMAT) {
            return Some(dt);
        }
        if let Ok(dt) = NaiveDateTime::parse_from_str(&self.0, "%Y-%m-%dT%H:%M:%S%.f") {
            return Some(dt);
        }
        NaiveDate::parse_from_str(&self.0, LEGACY_FORMAT)
            .ok()
            .and_then(|date| date.and_hms_opt(0, 0, 0))
    }

    /// `YY/MM/DD` form written next to the canonical value for older readers.
    pub fn legacy(&self) -> String {
        match self.instant() {
            Some(dt) => dt.format(LEGACY_FORMAT).to_string(),
            None => self.0.clone(),
        }
    }

    /// Instant comparison when both sides parse, raw text comparison otherwise.
    pub fn compare(&self, other: &Timestamp) -> Ordering {
        match (self.instant(), other.instant()) {
            (Some(a), Some(b)) => a.cmp(&b),
            _ => self.0.cmp(&other.0),
        }
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One inventoried file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileRecord {
    pub group: Group,
    pub filename: String,
    pub fingerprint: Fingerprint,
    pub timestamp: Timestamp,
    /// Rebuilt from root + group + filename; never persisted.
    pub path: PathBuf,
}

impl FileRecord {
    pub fn new(
        root: &Path,
        group: Group,
        filename: impl Into<String>,
        fingerprint: Fingerprint,
        timestamp: Timestamp,
    ) -> Self {
        let filename = filename.into();
        let path = group.file_path(root, &filename);
        Self {
            group,
            filename,
            fingerprint,
            timestamp,
            path,
        }
    }

    pub fn identity_key(&self) -> IdentityKey {
        match &self.fingerprint {
            Fingerprint::Digest(digest) => IdentityKey::Content(digest.clone()),
            Fingerprint::TooLarge | Fingerprint::Absent => IdentityKey::Path {
                group: self.group.as_str().to_string(),
                filename: self.filename.clone(),
            },
        }
    }

    /// `group/filename`, as shown to users and written to `rel_path`.
    pub fn display_path(&self) -> String {
        match &self.group {
            Group::Root => self.filename.clone(),
            Group::Folder(name) => format!("{}/{}", name, self.filename),
        }
    }
}

/// Deduplication key: the digest when one exists, the on-disk location otherwise.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum IdentityKey {
    Content(String),
    Path { group: String, filename: String },
}

impl fmt::Display for IdentityKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IdentityKey::Content(digest) => f.write_str(digest),
            IdentityKey::Path { group, filename } => write!(f, "PATH:{}/{}", group, filename),
        }
    }
}
