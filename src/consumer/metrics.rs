//! Consumer counters

use serde::Serialize;
use std::sync::atomic::{AtomicI64, AtomicU64, Ordering};

/// Lock-free counters updated by the consume loop
#[derive(Debug)]
pub struct ConsumerMetrics {
    consumed: AtomicU64,
    stored: AtomicU64,
    duplicates: AtomicU64,
    poison: AtomicU64,
    fetch_errors: AtomicU64,
    commits: AtomicU64,
    commit_errors: AtomicU64,
    max_committed_offset: AtomicI64,
}

/// Point-in-time copy of [`ConsumerMetrics`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MetricsSnapshot {
    /// Messages fetched
    pub consumed: u64,
    /// Articles admitted to the window
    pub stored: u64,
    /// Articles dropped as duplicate IDs
    pub duplicates: u64,
    /// Messages skipped because they could not be decoded
    pub poison: u64,
    /// Failed fetches
    pub fetch_errors: u64,
    /// Successful offset commits
    pub commits: u64,
    /// Failed offset commits
    pub commit_errors: u64,
    /// Highest message offset committed on any partition, -1 if none
    pub max_committed_offset: i64,
}

impl ConsumerMetrics {
    /// Zeroed counters
    pub fn new() -> Self {
        Self {
            consumed: AtomicU64::new(0),
            stored: AtomicU64::new(0),
            duplicates: AtomicU64::new(0),
            poison: AtomicU64::new(0),
            fetch_errors: AtomicU64::new(0),
            commits: AtomicU64::new(0),
            commit_errors: AtomicU64::new(0),
            max_committed_offset: AtomicI64::new(-1),
        }
    }

    pub(crate) fn increment_consumed(&self) {
        self.consumed.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn increment_stored(&self) {
        self.stored.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn increment_duplicates(&self) {
        self.duplicates.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn increment_poison(&self) {
        self.poison.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn increment_fetch_errors(&self) {
        self.fetch_errors.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_commit(&self, offset: i64) {
        self.commits.fetch_add(1, Ordering::Relaxed);
        self.max_committed_offset.fetch_max(offset, Ordering::Relaxed);
    }

    pub(crate) fn increment_commit_errors(&self) {
        self.commit_errors.fetch_add(1, Ordering::Relaxed);
    }

    /// Read every counter
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            consumed: self.consumed.load(Ordering::Relaxed),
            stored: self.stored.load(Ordering::Relaxed),
            duplicates: self.duplicates.load(Ordering::Relaxed),
            poison: self.poison.load(Ordering::Relaxed),
            fetch_errors: self.fetch_errors.load(Ordering::Relaxed),
            commits: self.commits.load(Ordering::Relaxed),
            commit_errors: self.commit_errors.load(Ordering::Relaxed),
            max_committed_offset: self.max_committed_offset.load(Ordering::Relaxed),
        }
    }
}

impl Default for ConsumerMetrics {
    fn default() -> Self {
        Self::new()
    }
}
