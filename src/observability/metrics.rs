//! Metrics registry
//!
//! - Counters only
//! - Monotonic increase
//! - Reset only on process start

use std::sync::atomic::{AtomicU64, Ordering};

/// Operational counters for the decision contract
///
/// All counters use Relaxed atomics; exact ordering between counters is not
/// needed.
#[derive(Debug, Default)]
pub struct MetricsRegistry {
    submissions_accepted: AtomicU64,
    submissions_rejected: AtomicU64,
    hash_mismatches: AtomicU64,
    conflicts: AtomicU64,
    storage_failures: AtomicU64,
    queries_by_id: AtomicU64,
    queries_by_hash: AtomicU64,
    index_hits: AtomicU64,
    digests_computed: AtomicU64,
}

impl MetricsRegistry {
    /// Create a new metrics registry with all counters at zero
    pub fn new() -> Self {
        Self::default()
    }

    pub fn increment_submissions_accepted(&self) {
        self.submissions_accepted.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_submissions_rejected(&self) {
        self.submissions_rejected.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_hash_mismatches(&self) {
        self.hash_mismatches.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_conflicts(&self) {
        self.conflicts.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_storage_failures(&self) {
        self.storage_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_queries_by_id(&self) {
        self.queries_by_id.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_queries_by_hash(&self) {
        self.queries_by_hash.fetch_add(1, Ordering::Relaxed);
    }

    /// Add the number of records a digest query resolved
    pub fn add_index_hits(&self, hits: u64) {
        self.index_hits.fetch_add(hits, Ordering::Relaxed);
    }

    pub fn increment_digests_computed(&self) {
        self.digests_computed.fetch_add(1, Ordering::Relaxed);
    }

    /// Get all metrics as a snapshot
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            submissions_accepted: self.submissions_accepted.load(Ordering::Relaxed),
            submissions_rejected: self.submissions_rejected.load(Ordering::Relaxed),
            hash_mismatches: self.hash_mismatches.load(Ordering::Relaxed),
            conflicts: self.conflicts.load(Ordering::Relaxed),
            storage_failures: self.storage_failures.load(Ordering::Relaxed),
            queries_by_id: self.queries_by_id.load(Ordering::Relaxed),
            queries_by_hash: self.queries_by_hash.load(Ordering::Relaxed),
            index_hits: self.index_hits.load(Ordering::Relaxed),
            digests_computed: self.digests_computed.load(Ordering::Relaxed),
        }
    }

    /// Current values as a JSON object string
    pub fn to_json(&self) -> String {
        let s = self.snapshot();
        format!(
            r#"{{"conflicts":{},"digests_computed":{},"hash_mismatches":{},"index_hits":{},"queries_by_hash":{},"queries_by_id":{},"storage_failures":{},"submissions_accepted":{},"submissions_rejected":{}}}"#,
            s.conflicts,
            s.digests_computed,
            s.hash_mismatches,
            s.index_hits,
            s.queries_by_hash,
            s.queries_by_id,
            s.storage_failures,
            s.submissions_accepted,
            s.submissions_rejected,
        )
    }
}

/// A point-in-time snapshot of all metrics
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MetricsSnapshot {
    pub submissions_accepted: u64,
    pub submissions_rejected: u64,
    pub hash_mismatches: u64,
    pub conflicts: u64,
    pub storage_failures: u64,
    pub queries_by_id: u64,
    pub queries_by_hash: u64,
    pub index_hits: u64,
    pub digests_computed: u64,
}
