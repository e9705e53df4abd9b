//! Diagonal-bucketed seed collection: merges overlapping k-mer hits on the
//! same query/target diagonal into maximal seed segment pairs.

use rustc_hash::FxHashMap;

/// A maximal contiguous seed: `len` symbols starting at `query_start` in the
/// query align with `len` symbols starting at `target_start` in the target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SegmentPair {
    pub query_start: usize,
    pub target_start: usize,
    pub len: usize,
}

/// Maintains non-overlapping half-open `[start, end)` intervals on one
/// diagonal, merging a newly inserted interval into any it overlaps or
/// touches.
#[derive(Debug, Default)]
struct RangeMerger {
    ranges: Vec<(usize, usize)>,
}

impl RangeMerger {
    fn insert(&mut self, start: usize, end: usize) {
        let mut new_start = start;
        let mut new_end = end;
        self.ranges.retain(|&(s, e)| {
            if s <= new_end && new_start <= e {
                new_start = new_start.min(s);
                new_end = new_end.max(e);
                false
            } else {
                true
            }
        });
        self.ranges.push((new_start, new_end));
    }
}

/// Collects k-mer occurrence pairs `(query_pos, target_pos, width)` keyed by
/// diagonal `d = target_pos - query_pos`, merging same-diagonal hits into
/// seed segment pairs.
#[derive(Default)]
pub struct HitTracker {
    // Diagonal stored as a signed offset so target_pos < query_pos is valid.
    by_diagonal: FxHashMap<i64, RangeMerger>,
}

impl HitTracker {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, query_pos: usize, target_pos: usize, width: usize) {
        let diagonal = target_pos as i64 - query_pos as i64;
        self.by_diagonal
            .entry(diagonal)
            .or_default()
            .insert(query_pos, query_pos + width);
    }

    /// Drains the tracker into the set of merged seed segment pairs, one per
    /// maximal contiguous run on each diagonal.
    #[must_use]
    pub fn into_segment_pairs(self) -> Vec<SegmentPair> {
        let mut out = Vec::new();
        for (diagonal, merger) in self.by_diagonal {
            for (start, end) in merger.ranges {
                let target_start = (start as i64 + diagonal) as usize;
                out.push(SegmentPair {
                    query_start: start,
                    target_start,
                    len: end - start,
                });
            }
        }
        out
    }
}
