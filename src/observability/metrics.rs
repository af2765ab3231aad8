//! Bulk write counters
//!
//! - Counters only, monotonic
//! - Atomic, Relaxed ordering
//! - One registry per coordinator unless shared explicitly

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

/// Operational counters for bulk writes
#[derive(Debug, Default)]
pub struct MetricsRegistry {
    /// Batches sent to a store
    batches_submitted: AtomicU64,
    /// Batches refused before any I/O
    batches_rejected: AtomicU64,
    /// Batches failed at call level by the store
    batches_failed: AtomicU64,
    /// Batches whose round trip timed out
    batch_timeouts: AtomicU64,
    /// Documents accepted
    documents_accepted: AtomicU64,
    /// Documents rejected with a conflict
    documents_conflicted: AtomicU64,
    /// Documents reported as errors
    documents_errored: AtomicU64,
}

/// Point-in-time copy of every counter
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct MetricsSnapshot {
    pub batches_submitted: u64,
    pub batches_rejected: u64,
    pub batches_failed: u64,
    pub batch_timeouts: u64,
    pub documents_accepted: u64,
    pub documents_conflicted: u64,
    pub documents_errored: u64,
}

impl MetricsRegistry {
    /// Create a new registry with all counters at zero
    pub fn new() -> Self {
        Self::default()
    }

    pub fn increment_batches_submitted(&self) {
        self.batches_submitted.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_batches_rejected(&self) {
        self.batches_rejected.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_batches_failed(&self) {
        self.batches_failed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_batch_timeouts(&self) {
        self.batch_timeouts.fetch_add(1, Ordering::Relaxed);
    }

    /// Add one batch's per-document tallies
    pub fn add_documents(&self, accepted: u64, conflicted: u64, errored: u64) {
        self.documents_accepted.fetch_add(accepted, Ordering::Relaxed);
        self.documents_conflicted.fetch_add(conflicted, Ordering::Relaxed);
        self.documents_errored.fetch_add(errored, Ordering::Relaxed);
    }

    /// Copy all counters
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            batches_submitted: self.batches_submitted.load(Ordering::Relaxed),
            batches_rejected: self.batches_rejected.load(Ordering::Relaxed),
            batches_failed: self.batches_failed.load(Ordering::Relaxed),
            batch_timeouts: self.batch_timeouts.load(Ordering::Relaxed),
            documents_accepted: self.documents_accepted.load(Ordering::Relaxed),
            documents_conflicted: self.documents_conflicted.load(Ordering::Relaxed),
            documents_errored: self.documents_errored.load(Ordering::Relaxed),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_registry_is_zero() {
        assert_eq!(MetricsRegistry::new().snapshot(), MetricsSnapshot::default());
    }

    #[test]
    fn test_counters_accumulate() {
        let metrics = MetricsRegistry::new();
        metrics.increment_batches_submitted();
        metrics.increment_batches_submitted();
        metrics.increment_batch_timeouts();
        metrics.add_documents(3, 1, 0);
        metrics.add_documents(1, 0, 2);

        let snap = metrics.snapshot();
        assert_eq!(snap.batches_submitted, 2);
        assert_eq!(snap.batch_timeouts, 1);
        assert_eq!(snap.documents_accepted, 4);
        assert_eq!(snap.documents_conflicted, 1);
        assert_eq!(snap.documents_errored, 2);
    }
}
