//! Bounded top-N tracker for per-target shared-k-mer hit counts.

/// One scored candidate target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScoredSeq {
    pub seq_id: usize,
    pub hits: u32,
}

/// Keeps the top `capacity` `(seqId, hits)` pairs by hit count, descending.
///
/// Built once per query from the full `hits[]` counter vector (sized `|D|`)
/// that candidate counting fills in; the hot loop increments a plain `Vec<u32>`
/// and this type only does the (cheap, once-per-query) top-N extraction.
pub struct Highscore {
    capacity: usize,
}

impl Highscore {
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self { capacity }
    }

    /// Extracts the top-`capacity` non-zero entries from `hits`, sorted by
    /// hit count descending (ties broken by ascending sequence id, matching
    /// the stable insertion order used by the counting pass).
    #[must_use]
    pub fn top(&self, hits: &[u32]) -> Vec<ScoredSeq> {
        let mut candidates: Vec<ScoredSeq> = hits
            .iter()
            .enumerate()
            .filter(|&(_, &h)| h > 0)
            .map(|(seq_id, &hits)| ScoredSeq { seq_id, hits })
            .collect();
        candidates.sort_by(|a, b| b.hits.cmp(&a.hits).then(a.seq_id.cmp(&b.seq_id)));
        candidates.truncate(self.capacity);
        candidates
    }
}
