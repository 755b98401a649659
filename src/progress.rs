use std::sync::Mutex;
use std::time::{Duration, Instant};

/// Trait for reporting cycle progress.
///
/// CLI implements with indicatif bars. Reporting is observational only:
/// nothing a reporter does can change what gets scanned or hashed.
/// All methods have default no-op implementations.
pub trait ProgressReporter: Send + Sync {
    fn on_scan_start(&self) {}
    fn on_scan_complete(&self, _total_files: usize, _duration_secs: f64) {}
    fn on_hash_start(&self, _total_files: usize) {}
    fn on_hash_progress(&self, _processed: usize, _total_files: usize, _current: &str) {}
    fn on_hash_complete(&self, _hashed: usize, _reused: usize, _duration_secs: f64) {}
    fn on_store_write_start(&self) {}
    fn on_store_write_complete(&self, _rows: usize, _duration_secs: f64) {}
    fn on_store_write_failed(&self, _error: &str) {}
}

/// No-op progress reporter for silent operation.
pub struct SilentReporter;

impl ProgressReporter for SilentReporter {}

/// Default spacing between hash progress callbacks (at most ~10/sec).
pub const DEFAULT_PROGRESS_INTERVAL: Duration = Duration::from_millis(100);

/// Rate limiter in front of `on_hash_progress`. The final item is always
/// delivered so reporters see the run reach its total.
pub struct ProgressThrottle {
    interval: Duration,
    last: Mutex<Option<Instant>>,
}

impl ProgressThrottle {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            last: Mutex::new(None),
        }
    }

    pub fn should_emit(&self, processed: usize, total: usize) -> bool {
        let now = Instant::now();
        let mut last = match self.last.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        let due = match *last {
            None => true,
            Some(prev) => now.duration_since(prev) >= self.interval,
        };
        if due || processed >= total {
            *last = Some(now);
            true
        } else {
            false
        }
    }

    pub fn report(
        &self,
        reporter: &dyn ProgressReporter,
        processed: usize,
        total: usize,
        current: &str,
    ) {
        if self.should_emit(processed, total) {
            reporter.on_hash_progress(processed, total, current);
        }
    }
}

impl Default for ProgressThrottle {
    fn default() -> Self {
        Self::new(DEFAULT_PROGRESS_INTERVAL)
    }
}
