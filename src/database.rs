//! Two-pass flat-array inverted k-mer index over a reference sequence set.
//!
//! Only the flat-array design is implemented; the legacy linked-list
//! `WordEntry` sketch found in `original_source` is not reproduced.

use crate::alphabet::Alphabet;
use crate::kmer::{KmerIter, AMBIGUOUS_KMER};
use crate::sequence::Sequence;

#[cfg(feature = "tracing")]
use tracing::{debug, info_span};

/// Bits available to a k-mer value that indexes directly into the counter/
/// marker tables (`2^30` entries, regardless of alphabet or word size).
const MAX_INDEX_BITS: u32 = 30;

/// Largest word size whose packed k-mer value fits within `MAX_INDEX_BITS`,
/// for alphabet `A`. Per spec §7, an out-of-range word size is clamped
/// silently rather than rejected.
#[must_use]
fn max_indexable_word_size<A: Alphabet>() -> usize {
    (MAX_INDEX_BITS / A::BITS_PER_SYMBOL) as usize
}

/// A read-only, immutable-after-build inverted index over a reference set.
///
/// `kmers_flat` is the concatenation, in sequence order, of every k-mer of
/// every indexed sequence. `seqids_flat` is, for each k-mer value, the sorted
/// (by insertion/ascending sequence-id) run of distinct sequence ids whose
/// sequence contains that k-mer at least once.
pub struct Database<A: Alphabet> {
    pub word_size: usize,
    pub sequences: Vec<Sequence<A>>,
    kmers_flat: Vec<u32>,
    kmer_offset_by_seq: Vec<usize>,
    kmer_count_by_seq: Vec<usize>,
    seqids_flat: Vec<u32>,
    seqid_offset_by_kmer: Vec<u32>,
    seqid_count_by_kmer: Vec<u32>,
}

impl<A: Alphabet> Database<A> {
    /// Builds the index from an ordered sequence list, via the counting pass
    /// then the filling pass described in the index construction algorithm.
    ///
    /// `on_progress`, if given, is called every 512 sequences with the number
    /// processed so far (the core's sole concession to progress reporting,
    /// which otherwise lives outside the core per the I/O boundary).
    pub fn initialize(
        sequences: Vec<Sequence<A>>,
        word_size: usize,
        mut on_progress: impl FnMut(usize),
    ) -> Self {
        // Clamp first: every k-mer this build produces (both passes below,
        // and every query search against this index) must fit the index
        // tables' `2^MAX_INDEX_BITS` entries, not just `kmer::max_window`'s
        // wider 32-bit packed-value limit.
        let word_size = word_size.min(max_indexable_word_size::<A>());

        #[cfg(feature = "tracing")]
        let _span = info_span!("database_initialize", sequences = sequences.len(), word_size).entered();

        let unique_count = 1usize << (word_size as u32 * A::BITS_PER_SYMBOL);

        // Pass 1: counting. unique_marker[k] holds the last sequence id that
        // touched k-mer k, so repeats within one sequence don't double-count.
        let mut unique_count_by_kmer = vec![0u32; unique_count];
        let mut unique_marker = vec![i64::from(-1); unique_count];

        for (s, seq) in sequences.iter().enumerate() {
            for (kmer, _pos) in KmerIter::<A>::new(seq, word_size) {
                if kmer == AMBIGUOUS_KMER {
                    continue;
                }
                let k = kmer as usize;
                if unique_marker[k] != s as i64 {
                    unique_count_by_kmer[k] += 1;
                    unique_marker[k] = s as i64;
                }
            }
            if (s + 1) % 512 == 0 {
                on_progress(s + 1);
            }
        }

        // Prefix sum to lay out seqid_offset_by_kmer.
        let mut seqid_offset_by_kmer = vec![0u32; unique_count];
        let mut running = 0u32;
        for k in 0..unique_count {
            seqid_offset_by_kmer[k] = running;
            running += unique_count_by_kmer[k];
        }
        let seqid_count_by_kmer = unique_count_by_kmer;
        let mut seqids_flat = vec![0u32; running as usize];
        let mut cursor = vec![0u32; unique_count];

        // Pass 2: filling. Re-walk k-mers, appending to kmers_flat (every
        // occurrence, including duplicates) and to seqids_flat (deduped per
        // sequence via unique_marker reset to -1).
        unique_marker.iter_mut().for_each(|m| *m = -1);
        let mut kmers_flat = Vec::new();
        let mut kmer_offset_by_seq = Vec::with_capacity(sequences.len());
        let mut kmer_count_by_seq = Vec::with_capacity(sequences.len());

        for (s, seq) in sequences.iter().enumerate() {
            let offset = kmers_flat.len();
            let mut count = 0usize;
            for (kmer, _pos) in KmerIter::<A>::new(seq, word_size) {
                kmers_flat.push(kmer);
                count += 1;
                if kmer == AMBIGUOUS_KMER {
                    continue;
                }
                let k = kmer as usize;
                if unique_marker[k] != s as i64 {
                    unique_marker[k] = s as i64;
                    let at = seqid_offset_by_kmer[k] + cursor[k];
                    seqids_flat[at as usize] = s as u32;
                    cursor[k] += 1;
                }
            }
            kmer_offset_by_seq.push(offset);
            kmer_count_by_seq.push(count);
        }

        #[cfg(feature = "tracing")]
        debug!(total_kmers = kmers_flat.len(), "index built");

        Self {
            word_size,
            sequences,
            kmers_flat,
            kmer_offset_by_seq,
            kmer_count_by_seq,
            seqids_flat,
            seqid_offset_by_kmer,
            seqid_count_by_kmer,
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.sequences.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sequences.is_empty()
    }

    /// The distinct sequence ids whose sequence contains k-mer `k` at least
    /// once, in ascending insertion order.
    #[must_use]
    pub fn seqids_for_kmer(&self, k: u32) -> &[u32] {
        let idx = k as usize;
        if idx >= self.seqid_offset_by_kmer.len() {
            return &[];
        }
        let start = self.seqid_offset_by_kmer[idx] as usize;
        let count = self.seqid_count_by_kmer[idx] as usize;
        &self.seqids_flat[start..start + count]
    }

    /// Every k-mer (including duplicates), in sequence order, for sequence `s`.
    #[must_use]
    pub fn kmers_for_sequence(&self, s: usize) -> &[u32] {
        let start = self.kmer_offset_by_seq[s];
        let count = self.kmer_count_by_seq[s];
        &self.kmers_flat[start..start + count]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alphabet::Dna;
    use bytes::Bytes;

    fn seq(id: &str, s: &str) -> Sequence<Dna> {
        Sequence::new(id, Bytes::copy_from_slice(s.as_bytes()), None)
    }

    #[test]
    fn index_completeness_every_unambiguous_kmer_appears_once() {
        let sequences = vec![seq("a", "ACGTACGT"), seq("b", "ACGTGGGG")];
        let db = Database::<Dna>::initialize(sequences.clone(), 4, |_| {});

        for (s, sequence) in sequences.iter().enumerate() {
            for (kmer, _pos) in KmerIter::<Dna>::new(sequence, 4) {
                if kmer == AMBIGUOUS_KMER {
                    continue;
                }
                let run = db.seqids_for_kmer(kmer);
                let occurrences = run.iter().filter(|&&id| id as usize == s).count();
                assert_eq!(occurrences, 1);
            }
        }
    }

    #[test]
    fn total_kmers_flat_matches_sum_of_windows() {
        let sequences = vec![seq("a", "ACGTACGT"), seq("b", "ACG")];
        let db = Database::<Dna>::initialize(sequences, 4, |_| {});
        // "ACGTACGT" (len 8, w=4) -> 5 windows; "ACG" (len 3 < w) -> 0 windows
        assert_eq!(db.kmers_for_sequence(0).len(), 5);
        assert_eq!(db.kmers_for_sequence(1).len(), 0);
    }

    #[test]
    fn ambiguous_kmer_never_stored_in_seqids() {
        let sequences = vec![seq("a", "ACGNACGT")];
        let db = Database::<Dna>::initialize(sequences, 4, |_| {});
        assert!(db.seqids_for_kmer(AMBIGUOUS_KMER).is_empty());
    }

    #[test]
    fn oversized_word_size_is_clamped_instead_of_panicking() {
        // DNA's 2 bits/symbol means a word size above 15 would pack a k-mer
        // value past the index tables' 2^30-entry bound; this must clamp
        // rather than index out of bounds.
        let sequences = vec![seq("a", &"ACGT".repeat(20))];
        let db = Database::<Dna>::initialize(sequences, 64, |_| {});
        assert!(db.word_size <= max_indexable_word_size::<Dna>());
    }
}
