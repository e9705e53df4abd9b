//! Global search pipeline: candidate counting, seed collection, HSP chaining
//! and stitching into one full-length alignment per accepted hit.

use std::sync::Arc;

use rustc_hash::FxHashSet;

use crate::align::{self, AlignParams, Direction};
use crate::alphabet::{Alphabet, Dna};
use crate::cigar::{Cigar, CigarOp};
use crate::database::Database;
use crate::highscore::Highscore;
use crate::hsp::Hsp;
use crate::kmer::{KmerIter, AMBIGUOUS_KMER};
use crate::sequence::Sequence;
use crate::seed::HitTracker;

#[cfg(feature = "tracing")]
use tracing::{debug, info_span};

const MAX_HSP_JOIN_DISTANCE: f64 = 16.0;

/// Which strand(s) of a DNA query to search.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strand {
    Plus,
    Minus,
    Both,
}

/// Search parameters, shared across every query in a run.
#[derive(Debug, Clone, Copy)]
pub struct SearchParams {
    pub word_size: usize,
    pub min_identity: f64,
    pub max_accepts: usize,
    pub max_rejects: usize,
    pub strand: Strand,
}

impl Default for SearchParams {
    fn default() -> Self {
        Self {
            word_size: 8,
            min_identity: 0.75,
            max_accepts: 1,
            max_rejects: 8,
            strand: Strand::Plus,
        }
    }
}

/// One accepted hit: a query against a single target sequence.
#[derive(Debug, Clone)]
pub struct Hit {
    pub target: usize,
    pub cigar: Cigar,
    pub strand: Strand,
}

/// Holds the reusable per-query scratch state for one searcher worker so
/// repeated queries against the same `Database` don't reallocate: the hit
/// counter vector and the per-query unique-kmer check.
pub struct GlobalSearch<A: Alphabet> {
    db: Arc<Database<A>>,
    params: AlignParams,
    hits: Vec<u32>,
}

impl<A: Alphabet> GlobalSearch<A> {
    /// Builds a searcher over a shared, reference-counted database, so a
    /// worker pool can clone the handle cheaply into each worker's
    /// processor closure instead of borrowing it.
    #[must_use]
    pub fn new(db: Arc<Database<A>>, align_params: AlignParams) -> Self {
        let hits = vec![0u32; db.len()];
        Self {
            db,
            params: align_params,
            hits,
        }
    }

    /// Runs one strand's worth of search (the query as given, not
    /// reverse-complemented) and returns the hits found on that pass.
    fn search_one_strand(
        &mut self,
        query: &Sequence<A>,
        search: &SearchParams,
        strand: Strand,
        max_accepts: usize,
        max_rejects: usize,
    ) -> Vec<Hit> {
        #[cfg(feature = "tracing")]
        let _span = info_span!("search_one_strand", query = %query.identifier).entered();

        self.hits.iter_mut().for_each(|h| *h = 0);
        let mut seen_kmers: FxHashSet<u32> = FxHashSet::default();

        for (kmer, _pos) in KmerIter::<A>::new(query, search.word_size) {
            if kmer == AMBIGUOUS_KMER || !seen_kmers.insert(kmer) {
                continue;
            }
            for &s in self.db.seqids_for_kmer(kmer) {
                self.hits[s as usize] += 1;
            }
        }

        let highscore = Highscore::new(max_accepts + max_rejects);
        let candidates = highscore.top(&self.hits);

        let mut out = Vec::new();
        let mut accepted = 0usize;
        let mut rejected = 0usize;

        for candidate in candidates {
            if accepted >= max_accepts || rejected >= max_rejects {
                break;
            }
            let t = candidate.seq_id;
            let target = &self.db.sequences[t];

            let mut tracker = HitTracker::new();
            for (kmer, q_pos) in KmerIter::<A>::new(query, search.word_size) {
                if kmer == AMBIGUOUS_KMER {
                    continue;
                }
                if !self.db.seqids_for_kmer(kmer).contains(&(t as u32)) {
                    continue;
                }
                for (t_pos, &tk) in self.db.kmers_for_sequence(t).iter().enumerate() {
                    if tk == kmer {
                        tracker.add(q_pos, t_pos, search.word_size);
                    }
                }
            }

            let min_len = 16usize.min((query.len() / 2).max(1));
            let mut hsps: Vec<Hsp> = tracker
                .into_segment_pairs()
                .into_iter()
                .map(|seg| build_hsp::<A>(&query.symbols, &target.symbols, seg, &self.params))
                .filter(|hsp| hsp.length() >= min_len)
                .collect();

            hsps.sort_by(|a, b| b.score.cmp(&a.score));
            let chain = chain_hsps(hsps);

            if chain.is_empty() {
                rejected += 1;
                continue;
            }

            let cigar = stitch::<A>(&query.symbols, &target.symbols, &chain, &self.params);
            let identity = cigar.identity();

            #[cfg(feature = "tracing")]
            debug!(target = t, identity, "candidate evaluated");

            if identity >= search.min_identity {
                out.push(Hit {
                    target: t,
                    cigar,
                    strand,
                });
                accepted += 1;
            } else {
                rejected += 1;
            }
        }

        out
    }

    /// Searches `query` against the database per `search.strand`, merging
    /// per-strand hits while preserving the strand that produced each one.
    ///
    /// `Strand::Minus`/`Strand::Both` only make sense for an alphabet with a
    /// real complement; the CLI rejects that combination for protein before
    /// a `GlobalSearch` is ever constructed.
    pub fn query(&mut self, query: &Sequence<A>, search: &SearchParams) -> Vec<Hit> {
        match search.strand {
            Strand::Plus => self.search_one_strand(
                query,
                search,
                Strand::Plus,
                search.max_accepts,
                search.max_rejects,
            ),
            Strand::Minus => {
                let rc = query.reverse_complement();
                self.search_one_strand(&rc, search, Strand::Minus, search.max_accepts, search.max_rejects)
            }
            Strand::Both => {
                let mut hits = self.search_one_strand(
                    query,
                    search,
                    Strand::Plus,
                    search.max_accepts,
                    search.max_rejects,
                );
                if hits.len() < search.max_accepts {
                    let rc = query.reverse_complement();
                    let remaining_accepts = search.max_accepts - hits.len();
                    let mut minus = self.search_one_strand(
                        &rc,
                        search,
                        Strand::Minus,
                        remaining_accepts,
                        search.max_rejects,
                    );
                    hits.append(&mut minus);
                }
                hits
            }
        }
    }
}

fn build_hsp<A: Alphabet>(
    q: &[u8],
    t: &[u8],
    seg: crate::seed::SegmentPair,
    params: &AlignParams,
) -> Hsp {
    let (a1, b1, mut left_cigar, left_score) =
        reverse_extend::<A>(q, t, seg.query_start, seg.target_start, params);

    let right_start_a = seg.query_start + seg.len;
    let right_start_b = seg.target_start + seg.len;
    let right = align::extend::<A>(q, t, right_start_a, right_start_b, Direction::Forward, params);
    let a2 = if right.best_a > right_start_a {
        right.best_a - 1
    } else {
        right_start_a - 1
    };
    let b2 = if right.best_b > right_start_b {
        right.best_b - 1
    } else {
        right_start_b - 1
    };

    let mut middle_cigar = Cigar::new();
    let mut middle_score = 0i32;
    for j in 0..seg.len {
        let matches = A::symbols_match(q[seg.query_start + j], t[seg.target_start + j]);
        middle_score += params.substitution(q[seg.query_start + j], t[seg.target_start + j], matches);
        middle_cigar.push_op(if matches { CigarOp::Match } else { CigarOp::Mismatch });
    }

    left_cigar.extend(&middle_cigar);
    left_cigar.extend(&right.cigar);

    let score = left_score + middle_score + right.best_score;
    Hsp::new(a1, a2, b1, b2, score, left_cigar)
}

/// Extends backward from `(s1, s2)` toward the start of `a`/`b`, via the
/// x-drop kernel's `Direction::Reverse` mode.
fn reverse_extend<A: Alphabet>(
    a: &[u8],
    b: &[u8],
    s1: usize,
    s2: usize,
    params: &AlignParams,
) -> (usize, usize, Cigar, i32) {
    let r = align::extend::<A>(a, b, s1, s2, Direction::Reverse, params);
    (r.best_a, r.best_b, r.cigar, r.best_score)
}

/// Greedy chain: sort by score descending (already done by the caller),
/// accept an HSP iff it doesn't overlap any already-accepted HSP on either
/// axis, and either the chain is empty or it's within join distance of some
/// accepted HSP. Returns the chain ordered by `(a1, b1)` for stitching.
fn chain_hsps(sorted_by_score: Vec<Hsp>) -> Vec<Hsp> {
    let mut accepted: Vec<Hsp> = Vec::new();
    for hsp in sorted_by_score {
        if accepted.iter().any(|a| a.is_overlapping(&hsp)) {
            continue;
        }
        let within_join_distance = accepted.is_empty()
            || accepted
                .iter()
                .any(|a| a.distance_to(&hsp) <= MAX_HSP_JOIN_DISTANCE);
        if within_join_distance {
            accepted.push(hsp);
        }
    }
    accepted.sort_by(|a, b| a.a1.cmp(&b.a1).then(a.b1.cmp(&b.b1)));
    accepted
}

/// Assembles the full query-length CIGAR by banded-aligning the gaps before,
/// between, and after the chained HSPs.
fn stitch<A: Alphabet>(q: &[u8], t: &[u8], chain: &[Hsp], params: &AlignParams) -> Cigar {
    let mut cigar = Cigar::new();
    let first = &chain[0];
    let (_, lead) = align::banded_align::<A>(&q[..first.a1], &t[..first.b1], params);
    cigar.extend(&lead);
    cigar.extend(&first.cigar);

    for pair in chain.windows(2) {
        let curr = &pair[0];
        let next = &pair[1];
        let (_, gap) = align::banded_align::<A>(
            &q[curr.a2 + 1..next.a1],
            &t[curr.b2 + 1..next.b1],
            params,
        );
        cigar.extend(&gap);
        cigar.extend(&next.cigar);
    }

    let last = chain.last().unwrap();
    let (_, tail) = align::banded_align::<A>(&q[last.a2 + 1..], &t[last.b2 + 1..], params);
    cigar.extend(&tail);
    cigar
}
