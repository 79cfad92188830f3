//! Formatting helpers and summary logging for encoding runs.

use std::time::{Duration, Instant};

use crate::corpus::EncodeReport;
use crate::taskrunner::RunSummary;

/// Formats a count with thousands separators.
///
/// ```
/// use kmerpack_lib::logging::format_count;
///
/// assert_eq!(format_count(0), "0");
/// assert_eq!(format_count(1_234_567), "1,234,567");
/// ```
#[must_use]
pub fn format_count(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

/// Formats a fraction as a percentage with `decimals` places.
///
/// ```
/// use kmerpack_lib::logging::format_percent;
///
/// assert_eq!(format_percent(0.9543, 2), "95.43%");
/// ```
#[must_use]
pub fn format_percent(value: f64, decimals: usize) -> String {
    format!("{:.decimals$}%", value * 100.0)
}

/// Formats a duration as `45s`, `2m 15s` or `1h 30m`; sub-second durations in ms.
///
/// ```
/// use kmerpack_lib::logging::format_duration;
/// use std::time::Duration;
///
/// assert_eq!(format_duration(Duration::from_millis(250)), "250ms");
/// assert_eq!(format_duration(Duration::from_secs(135)), "2m 15s");
/// ```
#[must_use]
pub fn format_duration(duration: Duration) -> String {
    let secs = duration.as_secs();
    if secs == 0 {
        return format!("{}ms", duration.as_millis());
    }
    if secs < 60 {
        format!("{secs}s")
    } else if secs < 3600 {
        let (mins, rest) = (secs / 60, secs % 60);
        if rest == 0 { format!("{mins}m") } else { format!("{mins}m {rest}s") }
    } else {
        let (hours, mins) = (secs / 3600, (secs % 3600) / 60);
        if mins == 0 { format!("{hours}h") } else { format!("{hours}h {mins}m") }
    }
}

/// Formats `count` items over `duration` as a per-second (or per-minute) rate.
///
/// ```
/// use kmerpack_lib::logging::format_rate;
/// use std::time::Duration;
///
/// assert_eq!(format_rate(1000, Duration::from_secs(1)), "1,000 items/s");
/// ```
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn format_rate(count: u64, duration: Duration) -> String {
    let secs = duration.as_secs_f64();
    if secs < 0.001 {
        return format!("{} items/s", format_count(count));
    }
    let rate = count as f64 / secs;
    if rate >= 1.0 {
        format!("{} items/s", format_count(rate as u64))
    } else {
        format!("{:.1} items/min", count as f64 / (secs / 60.0))
    }
}

/// Logs a summary of an encoding run.
pub fn log_encode_summary(report: &EncodeReport, summary: Option<&RunSummary>, elapsed: Duration) {
    log::info!("Key Encoding Summary:");
    log::info!("  Units: {}", format_count(report.units as u64));
    log::info!("  Keys written: {}", format_count(report.keys_written));
    log::info!("  Elapsed: {} ({})", format_duration(elapsed), format_rate(report.keys_written, elapsed));

    if let Some(summary) = summary {
        log::info!("  Tasks: {}", format_count(summary.total));
        if summary.total > 0 {
            let busiest = summary.per_worker.iter().copied().max().unwrap_or(0);
            log::info!(
                "  Busiest worker share: {}",
                format_percent(busiest as f64 / summary.total as f64, 1)
            );
        }
        if summary.panicked > 0 {
            log::warn!("  Panicked tasks: {}", format_count(summary.panicked));
        }
    }

    if !report.is_complete() {
        log::warn!("  Units truncated by sequence bounds: {}", format_count(report.failures.len() as u64));
        for failure in report.failures.iter().take(5) {
            log::warn!(
                "    unit {}: {} of {} keys",
                failure.unit,
                format_count(failure.written as u64),
                format_count(failure.expected as u64)
            );
        }
    }
}

/// Logs the start of an operation and, on completion, its count, duration and rate.
///
/// ```no_run
/// use kmerpack_lib::logging::OperationTimer;
///
/// let timer = OperationTimer::new("Encoding keys");
/// // ... do work ...
/// timer.log_completion(10_000);
/// ```
pub struct OperationTimer {
    operation: String,
    start_time: Instant,
}

impl OperationTimer {
    /// Starts the timer and logs `"{operation} ..."`.
    #[must_use]
    pub fn new(operation: &str) -> Self {
        log::info!("{operation} ...");
        Self { operation: operation.to_string(), start_time: Instant::now() }
    }

    /// Time since the timer started.
    #[must_use]
    pub fn elapsed(&self) -> Duration {
        self.start_time.elapsed()
    }

    /// Logs completion with the item count and rate.
    pub fn log_completion(&self, count: u64) {
        let duration = self.elapsed();
        log::info!(
            "{} completed: {} in {} ({})",
            self.operation,
            format_count(count),
            format_duration(duration),
            format_rate(count, duration)
        );
    }
}
