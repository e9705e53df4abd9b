//! Run-wide statistics, incremented via atomic counters and passed as a
//! handle into worker constructors rather than accessed as global state.

use std::sync::atomic::{AtomicU64, Ordering};

/// Snapshot of run statistics at a point in time.
#[derive(Debug, Clone, Default)]
pub struct Stats {
    pub sequences_searched: u64,
    pub hits_accepted: u64,
    pub hits_rejected: u64,
    pub pairs_merged: u64,
    pub pairs_unmerged: u64,
    pub bases_processed: u64,
}

/// Thread-safe run statistics. Cheap to share (`Arc<RunStats>`) across
/// searcher/merger workers; each worker only ever adds to its own counters.
#[derive(Debug, Default)]
pub struct RunStats {
    sequences_searched: AtomicU64,
    hits_accepted: AtomicU64,
    hits_rejected: AtomicU64,
    pairs_merged: AtomicU64,
    pairs_unmerged: AtomicU64,
    bases_processed: AtomicU64,
}

impl RunStats {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_query(&self, bases: u64) {
        self.sequences_searched.fetch_add(1, Ordering::Relaxed);
        self.bases_processed.fetch_add(bases, Ordering::Relaxed);
    }

    pub fn record_hit_accepted(&self) {
        self.hits_accepted.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_hit_rejected(&self) {
        self.hits_rejected.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_pair_merged(&self) {
        self.pairs_merged.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_pair_unmerged(&self) {
        self.pairs_unmerged.fetch_add(1, Ordering::Relaxed);
    }

    #[must_use]
    pub fn snapshot(&self) -> Stats {
        Stats {
            sequences_searched: self.sequences_searched.load(Ordering::Relaxed),
            hits_accepted: self.hits_accepted.load(Ordering::Relaxed),
            hits_rejected: self.hits_rejected.load(Ordering::Relaxed),
            pairs_merged: self.pairs_merged.load(Ordering::Relaxed),
            pairs_unmerged: self.pairs_unmerged.load(Ordering::Relaxed),
            bases_processed: self.bases_processed.load(Ordering::Relaxed),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counters_start_at_zero() {
        let stats = RunStats::new();
        let snap = stats.snapshot();
        assert_eq!(snap.sequences_searched, 0);
        assert_eq!(snap.hits_accepted, 0);
    }

    #[test]
    fn records_accumulate() {
        let stats = RunStats::new();
        stats.record_query(100);
        stats.record_hit_accepted();
        stats.record_hit_accepted();
        stats.record_hit_rejected();
        let snap = stats.snapshot();
        assert_eq!(snap.sequences_searched, 1);
        assert_eq!(snap.bases_processed, 100);
        assert_eq!(snap.hits_accepted, 2);
        assert_eq!(snap.hits_rejected, 1);
    }
}
