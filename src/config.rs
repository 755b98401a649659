use config::{Config, ConfigError, Environment, File as ConfigFile};
use serde::Deserialize;
use std::path::{Path, PathBuf};

const DEFAULT_GROUP_FOLDERS: [&str; 5] = ["Programs", "Compressed", "Documents", "Music", "Video"];
const DEFAULT_EXCLUDED_FILES: [&str; 4] = ["results.csv", "desktop.ini", "Thumbs.db", ".DS_Store"];

/// Everything the core needs from the outside world. Built once and handed
/// to each component by reference.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub root_path: String,
    pub store_file: String,
    pub max_file_size_mb: Option<u64>,
    pub chunk_size_bytes: usize,
    pub interval_seconds: u64,
    pub group_folders: Vec<String>,
    pub excluded_files: Vec<String>,
    pub enable_extensions: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            root_path: ".".to_string(),
            store_file: "results.csv".to_string(),
            max_file_size_mb: Some(500),
            chunk_size_bytes: 8192,
            interval_seconds: 60,
            group_folders: DEFAULT_GROUP_FOLDERS.iter().map(|s| s.to_string()).collect(),
            excluded_files: DEFAULT_EXCLUDED_FILES.iter().map(|s| s.to_string()).collect(),
            enable_extensions: true,
        }
    }
}

impl AppConfig {
    /// Config rooted at `root` with every other setting at its default.
    pub fn for_root(root: impl AsRef<Path>) -> Self {
        Self {
            root_path: root.as_ref().to_string_lossy().into_owned(),
            ..Self::default()
        }
    }

    pub fn root(&self) -> PathBuf {
        PathBuf::from(&self.root_path)
    }

    /// Store location; relative names live inside the monitored root.
    pub fn store_path(&self) -> PathBuf {
        let store = Path::new(&self.store_file);
        if store.is_absolute() {
            store.to_path_buf()
        } else {
            self.root().join(store)
        }
    }

    /// Size ceiling in bytes. A zero or missing limit disables it.
    pub fn size_limit_bytes(&self) -> Option<u64> {
        self.max_file_size_mb
            .filter(|mb| *mb > 0)
            .map(|mb| mb * 1024 * 1024)
    }
}

pub fn load_configuration() -> Result<AppConfig, ConfigError> {
    let builder = Config::builder()
        .add_source(ConfigFile::with_name("Config").required(false))
        .add_source(
            Environment::with_prefix("LEDGER")
                .try_parsing(true)
                .list_separator(",")
                .with_list_parse_key("group_folders")
                .with_list_parse_key("excluded_files"),
        )
        .build()?;
    builder.try_deserialize::<AppConfig>()
}
