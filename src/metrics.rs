//! Process-level counters for the demo binary.

use log::info;
use once_cell::sync::Lazy;
use parking_lot::Mutex;
use std::time::Instant;

/// Global metrics instance.
pub static METRICS: Lazy<Mutex<Metrics>> = Lazy::new(|| Mutex::new(Metrics::new()));

#[derive(Debug)]
pub struct Metrics {
    pub files_attempted: u64,
    pub files_successful: u64,
    pub files_failed: u64,
    pub records_parsed: u64,
    pub packages_emitted: u64,
    start_time: Instant,
}

impl Metrics {
    pub fn new() -> Self {
        Metrics {
            files_attempted: 0,
            files_successful: 0,
            files_failed: 0,
            records_parsed: 0,
            packages_emitted: 0,
            start_time: Instant::now(),
        }
    }

    pub fn record_file_attempt(&mut self) {
        self.files_attempted += 1;
    }

    pub fn record_file_success(&mut self, records: u64) {
        self.files_successful += 1;
        self.records_parsed += records;
    }

    pub fn record_file_failure(&mut self) {
        self.files_failed += 1;
    }

    pub fn record_packages(&mut self, packages: u64) {
        self.packages_emitted += packages;
    }

    pub fn log_summary(&self) {
        info!(
            "processed {}/{} files ({} failed), {} records -> {} packages in {:.2?}",
            self.files_successful,
            self.files_attempted,
            self.files_failed,
            self.records_parsed,
            self.packages_emitted,
            self.start_time.elapsed()
        );
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Metrics::new()
    }
}
