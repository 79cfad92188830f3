//! Interval-based progress logging shared by worker threads.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

use log::info;

use crate::logging::{format_count, format_rate};

/// Counts processed items and logs each time the count crosses a multiple of the
/// interval. All methods take `&self` and may be called from any thread.
///
/// # Example
/// ```
/// use kmerpack_lib::progress::ProgressTracker;
///
/// let tracker = ProgressTracker::new("Encoded units").with_interval(100);
/// for _ in 0..250 {
///     tracker.log_if_needed(1); // logs at 100 and 200
/// }
/// tracker.log_final(); // logs "Encoded units 250 (complete)"
/// assert_eq!(tracker.count(), 250);
/// ```
pub struct ProgressTracker {
    interval: u64,
    message: String,
    count: AtomicU64,
    started: Instant,
}

impl ProgressTracker {
    /// Create a tracker with the default interval of 10,000.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            interval: 10_000,
            message: message.into(),
            count: AtomicU64::new(0),
            started: Instant::now(),
        }
    }

    /// Set the logging interval; zero is treated as one.
    #[must_use]
    pub fn with_interval(mut self, interval: u64) -> Self {
        self.interval = interval.max(1);
        self
    }

    /// Add `additional` items and log once per interval boundary crossed.
    ///
    /// Returns `true` if the new count is a non-zero multiple of the interval.
    pub fn log_if_needed(&self, additional: u64) -> bool {
        if additional == 0 {
            let count = self.count();
            return count > 0 && count.is_multiple_of(self.interval);
        }

        let previous = self.count.fetch_add(additional, Ordering::Relaxed);
        let current = previous + additional;
        for boundary in (previous / self.interval + 1)..=(current / self.interval) {
            let milestone = boundary * self.interval;
            info!(
                "{} {} ({})",
                self.message,
                format_count(milestone),
                format_rate(milestone, self.started.elapsed())
            );
        }
        current.is_multiple_of(self.interval)
    }

    /// Log the final count unless the last boundary already reported it.
    pub fn log_final(&self) {
        if !self.log_if_needed(0) {
            let count = self.count();
            if count > 0 {
                info!("{} {} (complete)", self.message, format_count(count));
            }
        }
    }

    /// Items counted so far.
    #[must_use]
    pub fn count(&self) -> u64 {
        self.count.load(Ordering::Relaxed)
    }
}
