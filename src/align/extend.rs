//! X-drop gapped local extension from a seed point.

use crate::alphabet::Alphabet;
use crate::cigar::{Cigar, CigarEntry, CigarOp};

use super::params::AlignParams;
use super::Direction;

const NEG_INF: i32 = i32::MIN / 2;

/// Result of extending from a seed point in one direction.
#[derive(Debug, Clone)]
pub struct ExtendResult {
    pub best_score: i32,
    pub best_a: usize,
    pub best_b: usize,
    pub cigar: Cigar,
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum State {
    Diag,
    Gap,
}

/// Extends from `(start_a, start_b)` through as much of `a`/`b` as remains in
/// `direction` (`Forward`: `a[start_a + i]`; `Reverse`: `a[start_a - 1 - i]`),
/// stopping once the running best score drops by more than `params.x_drop`.
/// A single (non-affine) gap model is used, per the spec's extend contract.
/// `best_a`/`best_b` in the returned result are absolute indices into `a`/`b`,
/// and the CIGAR is always in left-to-right (forward) order regardless of
/// `direction`.
pub fn extend<A: Alphabet>(
    a: &[u8],
    b: &[u8],
    start_a: usize,
    start_b: usize,
    direction: Direction,
    params: &AlignParams,
) -> ExtendResult {
    let max_a = match direction {
        Direction::Forward => a.len() - start_a,
        Direction::Reverse => start_a,
    };
    let max_b = match direction {
        Direction::Forward => b.len() - start_b,
        Direction::Reverse => start_b,
    };

    if max_a == 0 || max_b == 0 {
        return ExtendResult {
            best_score: 0,
            best_a: start_a,
            best_b: start_b,
            cigar: Cigar::new(),
        };
    }

    let symbol_a = |i: usize| -> u8 {
        match direction {
            Direction::Forward => a[start_a + i],
            Direction::Reverse => a[start_a - 1 - i],
        }
    };
    let symbol_b = |j: usize| -> u8 {
        match direction {
            Direction::Forward => b[start_b + j],
            Direction::Reverse => b[start_b - 1 - j],
        }
    };

    let gap_cost = params.interior_gap_open + params.interior_gap_extend;
    let cols = max_b + 1;
    let rows = max_a + 1;

    let mut score = vec![vec![NEG_INF; cols]; rows];
    let mut gap = vec![vec![NEG_INF; cols]; rows];
    score[0][0] = 0;

    let mut best_score = 0;
    let mut best_a = 0usize;
    let mut best_b = 0usize;

    for i in 0..rows {
        for j in 0..cols {
            if i == 0 && j == 0 {
                continue;
            }
            let diag = if i > 0 && j > 0 {
                let matches = A::symbols_match(symbol_a(i - 1), symbol_b(j - 1));
                let subst = params.substitution(symbol_a(i - 1), symbol_b(j - 1), matches);
                score[i - 1][j - 1] + subst
            } else {
                NEG_INF
            };
            let from_up = if i > 0 {
                (score[i - 1][j] + gap_cost).max(gap[i - 1][j] + params.interior_gap_extend)
            } else {
                NEG_INF
            };
            let from_left = if j > 0 {
                (score[i][j - 1] + gap_cost).max(gap[i][j - 1] + params.interior_gap_extend)
            } else {
                NEG_INF
            };
            let best = diag.max(from_up).max(from_left);
            score[i][j] = best;
            gap[i][j] = from_up.max(from_left);

            if best_score - best > params.x_drop {
                score[i][j] = NEG_INF;
                continue;
            }
            if best > best_score {
                best_score = best;
                best_a = i;
                best_b = j;
            }
        }
    }

    // Backtrace from (best_a, best_b) to (0, 0).
    let mut i = best_a;
    let mut j = best_b;
    let mut runs = Vec::new();
    while i > 0 || j > 0 {
        let current = score[i][j];
        let diag_ok = i > 0
            && j > 0
            && {
                let matches = A::symbols_match(symbol_a(i - 1), symbol_b(j - 1));
                let subst = params.substitution(symbol_a(i - 1), symbol_b(j - 1), matches);
                score[i - 1][j - 1] + subst == current
            };
        if diag_ok {
            let matches = A::symbols_match(symbol_a(i - 1), symbol_b(j - 1));
            runs.push(if matches { CigarOp::Match } else { CigarOp::Mismatch });
            i -= 1;
            j -= 1;
        } else if i > 0
            && ((score[i - 1][j] + gap_cost).max(gap[i - 1][j] + params.interior_gap_extend) == current)
        {
            runs.push(CigarOp::Insertion);
            i -= 1;
        } else if j > 0 {
            runs.push(CigarOp::Deletion);
            j -= 1;
        } else {
            // Should not happen for a well-formed DP; stop defensively.
            break;
        }
    }
    runs.reverse();
    let mut cigar = Cigar::new();
    for op in runs {
        cigar.push_op(op);
    }
    // `runs` is now ordered from the extension's start to its best point.
    // For `Reverse`, that's right-to-left in `a`/`b`'s own coordinates, so
    // flip it back to the left-to-right order every other CIGAR uses.
    if direction == Direction::Reverse {
        cigar.reverse();
    }

    let (abs_best_a, abs_best_b) = match direction {
        Direction::Forward => (start_a + best_a, start_b + best_b),
        Direction::Reverse => (start_a - best_a, start_b - best_b),
    };

    ExtendResult {
        best_score,
        best_a: abs_best_a,
        best_b: abs_best_b,
        cigar,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alphabet::Dna;

    #[test]
    fn perfect_match_extends_full_length() {
        let a = b"ACGTACGT";
        let b = b"ACGTACGT";
        let r = extend::<Dna>(a, b, 0, 0, Direction::Forward, &AlignParams::default());
        assert_eq!(r.cigar.to_string(), "8M");
        assert_eq!(r.best_score, 16);
    }

    #[test]
    fn empty_remaining_sequence_yields_zero_score() {
        let a = b"ACGT";
        let b = b"ACGT";
        let r = extend::<Dna>(a, b, 4, 4, Direction::Forward, &AlignParams::default());
        assert_eq!(r.best_score, 0);
        assert!(r.cigar.is_empty());
    }

    #[test]
    fn stops_extending_once_score_drops_past_xdrop() {
        // Long run of mismatches after a short match should not keep extending
        // indefinitely: best position should be near the seed, not the end.
        let a = b"ACGTCCCCCCCCCCCCCCCCCCCC";
        let b = b"ACGTGGGGGGGGGGGGGGGGGGGG";
        let r = extend::<Dna>(a, b, 0, 0, Direction::Forward, &AlignParams::default());
        assert!(r.best_a <= 4);
    }

    #[test]
    fn empty_preceding_sequence_yields_zero_score() {
        let a = b"ACGT";
        let b = b"ACGT";
        let r = extend::<Dna>(a, b, 0, 0, Direction::Reverse, &AlignParams::default());
        assert_eq!(r.best_score, 0);
        assert!(r.cigar.is_empty());
    }

    #[test]
    fn reverse_extension_mirrors_forward_over_a_palindrome_free_match() {
        // Extending backward from the end of a perfectly matching pair should
        // consume the whole prefix and produce a left-to-right CIGAR
        // identical to the forward extension over the same pair.
        let a = b"ACGTACGT";
        let b = b"ACGTACGT";
        let r = extend::<Dna>(a, b, a.len(), b.len(), Direction::Reverse, &AlignParams::default());
        assert_eq!(r.cigar.to_string(), "8M");
        assert_eq!(r.best_score, 16);
        assert_eq!(r.best_a, 0);
        assert_eq!(r.best_b, 0);
    }
}
