use tracing::{info, warn};

/// Progress tracker for scans over many (film, country) checks.
/// Provides periodic progress updates and a final summary to reduce log noise.
pub struct ProgressTracker {
    total: usize,
    with_offers: usize,
    empty: usize,
    failed: usize,
    start_time: std::time::Instant,
    progress_interval: usize, // Log every N items
    last_progress_log: usize,
}

impl ProgressTracker {
    pub fn new(total: usize, progress_interval: usize) -> Self {
        if total > 10 || progress_interval < total {
            info!("Starting scan: {} checks to process", total);
        }
        Self {
            total,
            with_offers: 0,
            empty: 0,
            failed: 0,
            start_time: std::time::Instant::now(),
            progress_interval,
            last_progress_log: 0,
        }
    }

    /// Record a check that produced at least one offer row.
    pub fn record_with_offers(&mut self) {
        self.with_offers += 1;
    }

    /// Record a check that produced no offers (no match or nothing streaming).
    pub fn record_empty(&mut self) {
        self.empty += 1;
    }

    pub fn record_failed(&mut self) {
        self.failed += 1;
    }

    /// Log progress if the interval has been reached. Call after each check
    /// with the 1-based index.
    pub fn log_progress(&mut self, current: usize) {
        if current - self.last_progress_log >= self.progress_interval || current == self.total {
            let elapsed = self.start_time.elapsed();
            let rate = if elapsed.as_secs_f64() > 0.0 {
                current as f64 / elapsed.as_secs_f64()
            } else {
                0.0
            };

            info!(
                "Progress: {}/{} ({:.1} checks/sec) | With offers: {} | Empty: {} | Failed: {}",
                current, self.total, rate, self.with_offers, self.empty, self.failed
            );
            self.last_progress_log = current;
        }
    }

    /// Log the final summary of the scan.
    pub fn log_summary(&self, operation_name: &str) {
        let elapsed = self.start_time.elapsed();
        if self.failed > 0 {
            warn!(
                "{} completed: {} checks in {:.1}s | With offers: {} | Empty: {} | Failed: {}",
                operation_name,
                self.total,
                elapsed.as_secs_f64(),
                self.with_offers,
                self.empty,
                self.failed
            );
        } else {
            info!(
                "{} completed: {} checks in {:.1}s | With offers: {} | Empty: {}",
                operation_name,
                self.total,
                elapsed.as_secs_f64(),
                self.with_offers,
                self.empty
            );
        }
    }
}
