use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Store error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Root directory not found: {}", .0.display())]
    RootNotFound(PathBuf),

    #[error("Failed to write store '{}': {source}", path.display())]
    StoreWrite {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("Malformed store row at line {line}: {reason}")]
    MalformedRow { line: u64, reason: String },
}

pub type Result<T> = std::result::Result<T, Error>;
