//! Metrics registry for ndcserve
//!
//! Monotonic counters plus the published suggestion-index size. All
//! values reset on process start. Relaxed atomics; eventual consistency
//! is fine for operational counters.

use std::sync::atomic::{AtomicU64, Ordering};

use serde_json::{json, Value};

/// Process-wide operational counters
#[derive(Debug, Default)]
pub struct ServiceMetrics {
    /// Lookups answered by a fast primary hit
    lookups_primary: AtomicU64,
    /// Lookups answered by the backup fallback
    lookups_backup: AtomicU64,
    /// Lookups answered by a late primary result after the deadline
    lookups_late_primary: AtomicU64,
    /// Lookups with no answer from any source
    lookups_missed: AtomicU64,
    /// Suggestion queries served
    suggest_queries: AtomicU64,
    /// Suggestion index builds (startup + reloads)
    index_rebuilds: AtomicU64,
    /// Current suggestion-index entry count (published by builds)
    suggest_index_size: AtomicU64,
}

impl ServiceMetrics {
    /// Create a registry with all counters at zero
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a fast primary hit
    pub fn record_primary_hit(&self) {
        self.lookups_primary.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a backup fallback hit
    pub fn record_backup_hit(&self) {
        self.lookups_backup.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a late primary hit
    pub fn record_late_primary_hit(&self) {
        self.lookups_late_primary.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a lookup that found nothing
    pub fn record_miss(&self) {
        self.lookups_missed.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a served suggestion query
    pub fn record_suggest_query(&self) {
        self.suggest_queries.fetch_add(1, Ordering::Relaxed);
    }

    /// Record an index build and publish the resulting size
    pub fn record_index_build(&self, size: usize) {
        self.index_rebuilds.fetch_add(1, Ordering::Relaxed);
        self.suggest_index_size.store(size as u64, Ordering::Relaxed);
    }

    /// Currently published suggestion-index size
    pub fn suggest_index_size(&self) -> u64 {
        self.suggest_index_size.load(Ordering::Relaxed)
    }

    /// Snapshot all values as JSON for the metrics route
    pub fn snapshot(&self) -> Value {
        json!({
            "lookups_primary": self.lookups_primary.load(Ordering::Relaxed),
            "lookups_backup": self.lookups_backup.load(Ordering::Relaxed),
            "lookups_late_primary": self.lookups_late_primary.load(Ordering::Relaxed),
            "lookups_missed": self.lookups_missed.load(Ordering::Relaxed),
            "suggest_queries": self.suggest_queries.load(Ordering::Relaxed),
            "index_rebuilds": self.index_rebuilds.load(Ordering::Relaxed),
            "suggest_index_size": self.suggest_index_size.load(Ordering::Relaxed),
        })
    }
}
