//! Engine statistics collection.
//!
//! Counters are updated by the poll scheduler and the broadcast hub and
//! read by the REST layer. All operations are lock-free.

use std::sync::atomic::{AtomicI64, AtomicU64, AtomicUsize, Ordering};
use std::time::Instant;

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

/// Collects and tracks engine statistics.
pub struct EngineStatistics {
    /// Engine start time.
    start_time: Instant,

    /// Poll cycles that ran to the end of the roster.
    cycles_completed: AtomicU64,

    /// Cycles cut short by a provider-wide failure.
    cycle_failures: AtomicU64,

    /// Individual device queries that failed.
    device_failures: AtomicU64,

    /// Significant changes broadcast and logged.
    changes_notified: AtomicU64,

    /// Failed appends to the location log.
    log_write_failures: AtomicU64,

    /// Currently registered subscribers.
    subscribers: AtomicUsize,

    /// Unix seconds of the last finished cycle, 0 if none.
    last_cycle_at: AtomicI64,
}

/// Point-in-time copy of the engine statistics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatisticsSnapshot {
    pub cycles_completed: u64,
    pub cycle_failures: u64,
    pub device_failures: u64,
    pub changes_notified: u64,
    pub log_write_failures: u64,
    pub subscribers: usize,
    pub uptime: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_cycle_at: Option<DateTime<Utc>>,
}

impl EngineStatistics {
    pub fn new() -> Self {
        Self {
            start_time: Instant::now(),
            cycles_completed: AtomicU64::new(0),
            cycle_failures: AtomicU64::new(0),
            device_failures: AtomicU64::new(0),
            changes_notified: AtomicU64::new(0),
            log_write_failures: AtomicU64::new(0),
            subscribers: AtomicUsize::new(0),
            last_cycle_at: AtomicI64::new(0),
        }
    }

    pub fn record_cycle_completed(&self, at: DateTime<Utc>) {
        self.cycles_completed.fetch_add(1, Ordering::Relaxed);
        self.last_cycle_at.store(at.timestamp(), Ordering::Relaxed);
    }

    pub fn record_cycle_failure(&self, at: DateTime<Utc>) {
        self.cycle_failures.fetch_add(1, Ordering::Relaxed);
        self.last_cycle_at.store(at.timestamp(), Ordering::Relaxed);
    }

    pub fn record_device_failure(&self) {
        self.device_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_change(&self) {
        self.changes_notified.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_log_write_failure(&self) {
        self.log_write_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn set_subscribers(&self, count: usize) {
        self.subscribers.store(count, Ordering::Relaxed);
    }

    /// Get current statistics snapshot.
    pub fn snapshot(&self) -> StatisticsSnapshot {
        let last = self.last_cycle_at.load(Ordering::Relaxed);
        StatisticsSnapshot {
            cycles_completed: self.cycles_completed.load(Ordering::Relaxed),
            cycle_failures: self.cycle_failures.load(Ordering::Relaxed),
            device_failures: self.device_failures.load(Ordering::Relaxed),
            changes_notified: self.changes_notified.load(Ordering::Relaxed),
            log_write_failures: self.log_write_failures.load(Ordering::Relaxed),
            subscribers: self.subscribers.load(Ordering::Relaxed),
            uptime: self.start_time.elapsed().as_secs(),
            last_cycle_at: (last != 0)
                .then(|| Utc.timestamp_opt(last, 0).single())
                .flatten(),
        }
    }
}

impl Default for EngineStatistics {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_statistics_collection() {
        let stats = EngineStatistics::new();
        let at = Utc.with_ymd_and_hms(2024, 1, 17, 10, 0, 0).unwrap();

        stats.record_change();
        stats.record_change();
        stats.record_device_failure();
        stats.record_cycle_completed(at);

        let snapshot = stats.snapshot();
        assert_eq!(snapshot.changes_notified, 2);
        assert_eq!(snapshot.device_failures, 1);
        assert_eq!(snapshot.cycles_completed, 1);
        assert_eq!(snapshot.cycle_failures, 0);
        assert_eq!(snapshot.last_cycle_at, Some(at));
    }

    #[test]
    fn test_no_cycle_yet() {
        let snapshot = EngineStatistics::new().snapshot();
        assert_eq!(snapshot.last_cycle_at, None);
        assert_eq!(snapshot.subscribers, 0);
    }
}
