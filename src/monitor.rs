use crate::config::AppConfig;
use crate::engine::{CycleResult, ScanEngine};
use crate::error::Error;
use crate::hasher::{ContentHasher, Sha1Hasher};
use crate::progress::ProgressReporter;
use std::thread;
use std::time::Duration;
use tracing::{error, info};

/// Repeats full cycles on a fixed interval.
pub struct ContinuousMonitor<H: ContentHasher = Sha1Hasher> {
    engine: ScanEngine<H>,
    interval: Duration,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct MonitorSummary {
    pub cycles: usize,
    pub failures: usize,
}

impl ContinuousMonitor<Sha1Hasher> {
    pub fn new(config: AppConfig) -> Self {
        let interval = Duration::from_secs(config.interval_seconds);
        Self::with_engine(ScanEngine::new(config), interval)
    }
}

impl<H: ContentHasher> ContinuousMonitor<H> {
    pub fn with_engine(engine: ScanEngine<H>, interval: Duration) -> Self {
        Self { engine, interval }
    }

    /// Run until `max_cycles` cycles have completed, or forever when `None`.
    /// `Some(0)` runs nothing.
    pub fn run(&self, reporter: &dyn ProgressReporter, max_cycles: Option<usize>) -> MonitorSummary {
        self.run_with(reporter, max_cycles, |_, _| {})
    }

    /// Like [`run`](Self::run), handing each cycle's outcome to `on_cycle`.
    /// A failed cycle is logged and the loop carries on after the usual wait.
    pub fn run_with<F>(
        &self,
        reporter: &dyn ProgressReporter,
        max_cycles: Option<usize>,
        mut on_cycle: F,
    ) -> MonitorSummary
    where
        F: FnMut(usize, &Result<CycleResult, Error>),
    {
        info!(
            "Starting continuous monitoring every {}s",
            self.interval.as_secs()
        );
        let mut summary = MonitorSummary::default();

        while max_cycles.map_or(true, |max| summary.cycles < max) {
            if summary.cycles > 0 {
                thread::sleep(self.interval);
            }
            summary.cycles += 1;
            let result = self.engine.run_cycle(reporter);
            match &result {
                Ok(cycle) => info!(
                    "Cycle {} complete: {} files scanned, {} unchanged",
                    summary.cycles, cycle.stats.scanned, cycle.stats.reused
                ),
                Err(e) => {
                    summary.failures += 1;
                    error!("Cycle {} failed: {}", summary.cycles, e);
                }
            }
            on_cycle(summary.cycles, &result);
        }

        info!(
            "Monitoring stopped after {} cycles ({} failed)",
            summary.cycles, summary.failures
        );
        summary
    }
}
