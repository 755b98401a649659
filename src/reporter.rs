use colored::*;
use content_ledger::ProgressReporter;
use indicatif::{ProgressBar, ProgressStyle};
use std::sync::Mutex;
use std::time::Duration;

const TICK_CHARS: &str = "⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏";
const TICK_INTERVAL: Duration = Duration::from_millis(80);

/// Terminal progress: a spinner while walking and writing the store, a bar
/// while fingerprinting.
pub struct CliReporter {
    bar: Mutex<Option<ProgressBar>>,
}

impl CliReporter {
    pub fn new() -> Self {
        Self {
            bar: Mutex::new(None),
        }
    }

    fn spinner(&self, message: &'static str) {
        let pb = ProgressBar::new_spinner();
        pb.set_style(
            ProgressStyle::with_template("{spinner:.cyan} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner())
                .tick_chars(TICK_CHARS),
        );
        pb.set_message(message);
        pb.enable_steady_tick(TICK_INTERVAL);
        self.set_bar(pb);
    }

    fn set_bar(&self, pb: ProgressBar) {
        if let Ok(mut guard) = self.bar.lock() {
            if let Some(old) = guard.replace(pb) {
                old.finish_and_clear();
            }
        }
    }

    fn finish_bar(&self) {
        if let Ok(mut guard) = self.bar.lock() {
            if let Some(pb) = guard.take() {
                pb.finish_and_clear();
            }
        }
    }
}

fn done(message: String) {
    eprintln!("  {} {}", "✓".green(), message);
}

impl ProgressReporter for CliReporter {
    fn on_scan_start(&self) {
        self.spinner("Scanning files...");
    }

    fn on_scan_complete(&self, total_files: usize, duration_secs: f64) {
        self.finish_bar();
        done(format!(
            "Scan complete: {} files in {:.2}s",
            total_files, duration_secs
        ));
    }

    fn on_hash_start(&self, total_files: usize) {
        let pb = ProgressBar::new(total_files as u64);
        pb.set_style(
            ProgressStyle::with_template(
                "  {spinner:.cyan} Fingerprinting [{bar:30.cyan/dim}] {pos}/{len} {msg}",
            )
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("━╸─")
            .tick_chars(TICK_CHARS),
        );
        pb.enable_steady_tick(TICK_INTERVAL);
        self.set_bar(pb);
    }

    fn on_hash_progress(&self, processed: usize, total_files: usize, current: &str) {
        if let Ok(guard) = self.bar.lock() {
            if let Some(pb) = guard.as_ref() {
                if pb.length() != Some(total_files as u64) {
                    pb.set_length(total_files as u64);
                }
                pb.set_position(processed as u64);
                pb.set_message(current.to_string());
            }
        }
    }

    fn on_hash_complete(&self, hashed: usize, reused: usize, duration_secs: f64) {
        self.finish_bar();
        done(format!(
            "Fingerprinting complete: {} hashed, {} unchanged in {:.2}s",
            hashed, reused, duration_secs
        ));
    }

    fn on_store_write_start(&self) {
        self.spinner("Writing store...");
    }

    fn on_store_write_complete(&self, rows: usize, duration_secs: f64) {
        self.finish_bar();
        done(format!(
            "Store write complete: {} records in {:.2}s",
            rows, duration_secs
        ));
    }

    fn on_store_write_failed(&self, error: &str) {
        self.finish_bar();
        eprintln!("  {} Store write failed: {}", "✗".red(), error);
    }
}
