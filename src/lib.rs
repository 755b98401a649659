pub mod analysis;
pub mod config;
pub mod engine;
pub mod error;
pub mod extensions;
pub mod hasher;
pub mod model;
pub mod monitor;
pub mod progress;
pub mod scanner;
pub mod storage;

pub use config::AppConfig;
pub use engine::{CycleResult, ScanEngine, StoreCleanup};
pub use error::Error;
pub use model::{FileRecord, Fingerprint, Group, IdentityKey, Timestamp};
pub use monitor::{ContinuousMonitor, MonitorSummary};
pub use progress::{ProgressReporter, SilentReporter};
