//! Logger metrics for observability
//!
//! Counters for how many records were written, how many were filtered out by
//! the severity gate, and how many sink writes failed.

use std::sync::atomic::{AtomicU64, Ordering};

/// Metrics for logger observability
///
/// # Example
///
/// ```
/// use pzlog::LoggerMetrics;
///
/// let metrics = LoggerMetrics::new();
///
/// metrics.record_filtered();
/// metrics.record_logged();
///
/// assert_eq!(metrics.filtered_count(), 1);
/// assert_eq!(metrics.total_logged(), 1);
/// ```
#[derive(Debug)]
pub struct LoggerMetrics {
    /// Records delivered to every core that accepted them
    total_logged: AtomicU64,

    /// Records dropped by the severity gate before encoding
    filtered_count: AtomicU64,

    /// Individual sink writes that failed or panicked
    sink_failures: AtomicU64,
}

impl LoggerMetrics {
    /// Create a new metrics instance with all counters at zero
    pub const fn new() -> Self {
        Self {
            total_logged: AtomicU64::new(0),
            filtered_count: AtomicU64::new(0),
            sink_failures: AtomicU64::new(0),
        }
    }

    #[inline]
    pub fn total_logged(&self) -> u64 {
        self.total_logged.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn filtered_count(&self) -> u64 {
        self.filtered_count.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn sink_failures(&self) -> u64 {
        self.sink_failures.load(Ordering::Relaxed)
    }

    /// Record a successfully logged entry
    #[inline]
    pub fn record_logged(&self) -> u64 {
        self.total_logged.fetch_add(1, Ordering::Relaxed)
    }

    /// Record an entry dropped by the severity gate
    #[inline]
    pub fn record_filtered(&self) -> u64 {
        self.filtered_count.fetch_add(1, Ordering::Relaxed)
    }

    /// Record one failed sink write
    #[inline]
    pub fn record_sink_failure(&self) -> u64 {
        self.sink_failures.fetch_add(1, Ordering::Relaxed)
    }

    /// Reset all metrics to zero
    pub fn reset(&self) {
        self.total_logged.store(0, Ordering::Relaxed);
        self.filtered_count.store(0, Ordering::Relaxed);
        self.sink_failures.store(0, Ordering::Relaxed);
    }
}

impl Default for LoggerMetrics {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for LoggerMetrics {
    /// Create a snapshot of the current metrics values
    fn clone(&self) -> Self {
        Self {
            total_logged: AtomicU64::new(self.total_logged()),
            filtered_count: AtomicU64::new(self.filtered_count()),
            sink_failures: AtomicU64::new(self.sink_failures()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_new() {
        let metrics = LoggerMetrics::new();
        assert_eq!(metrics.total_logged(), 0);
        assert_eq!(metrics.filtered_count(), 0);
        assert_eq!(metrics.sink_failures(), 0);
    }

    #[test]
    fn test_metrics_record_returns_previous_value() {
        let metrics = LoggerMetrics::new();
        assert_eq!(metrics.record_sink_failure(), 0);
        assert_eq!(metrics.record_sink_failure(), 1);
        assert_eq!(metrics.sink_failures(), 2);
    }

    #[test]
    fn test_metrics_reset() {
        let metrics = LoggerMetrics::new();
        metrics.record_logged();
        metrics.record_filtered();
        metrics.record_sink_failure();

        metrics.reset();

        assert_eq!(metrics.total_logged(), 0);
        assert_eq!(metrics.filtered_count(), 0);
        assert_eq!(metrics.sink_failures(), 0);
    }

    #[test]
    fn test_metrics_clone() {
        let metrics = LoggerMetrics::new();
        metrics.record_logged();
        metrics.record_logged();

        let snapshot = metrics.clone();
        assert_eq!(snapshot.total_logged(), 2);

        // Original and clone are independent
        metrics.record_logged();
        assert_eq!(metrics.total_logged(), 3);
        assert_eq!(snapshot.total_logged(), 2);
    }
}
