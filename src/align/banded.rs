//! Fixed-bandwidth global alignment with affine gaps (Gotoh's algorithm,
//! band-restricted, terminal gaps cheaper than interior gaps).

use crate::alphabet::Alphabet;
use crate::cigar::{Cigar, CigarEntry, CigarOp};

use super::params::AlignParams;

const NEG_INF: i32 = i32::MIN / 2;

#[derive(Clone, Copy, PartialEq, Eq)]
enum Mat {
    M,
    Ix,
    Iy,
}

/// Computes the banded affine-gap global alignment of `a` against `b` (both
/// already oriented so the rectangle runs from `(0,0)` to `(|a|,|b|)`),
/// returning the score and the CIGAR for that rectangle. Matrices are freshly
/// allocated per call, so there is no state to leak between invocations.
pub fn banded_align<A: Alphabet>(a: &[u8], b: &[u8], params: &AlignParams) -> (i32, Cigar) {
    let len_a = a.len();
    let len_b = b.len();

    if len_a == 0 && len_b == 0 {
        return (0, Cigar::new());
    }
    if len_a == 0 {
        let score = params.terminal_gap_open + (len_b as i32) * params.terminal_gap_extend;
        let mut c = Cigar::new();
        c.push(CigarEntry { count: len_b, op: CigarOp::Deletion });
        return (score, c);
    }
    if len_b == 0 {
        let score = params.terminal_gap_open + (len_a as i32) * params.terminal_gap_extend;
        let mut c = Cigar::new();
        c.push(CigarEntry { count: len_a, op: CigarOp::Insertion });
        return (score, c);
    }

    let rows = len_a + 1;
    let cols = len_b + 1;
    let mut m = vec![vec![NEG_INF; cols]; rows];
    let mut ix = vec![vec![NEG_INF; cols]; rows];
    let mut iy = vec![vec![NEG_INF; cols]; rows];
    m[0][0] = 0;

    let band = params.bandwidth;
    let col_range = |i: usize| -> (usize, usize) {
        let center = i.min(len_b);
        let lo = center.saturating_sub(band);
        let hi = if i == len_a {
            len_b
        } else {
            (center + band).min(len_b)
        };
        (lo, hi)
    };

    for i in 0..rows {
        let (lo, hi) = col_range(i);
        for j in lo..=hi {
            if i == 0 && j == 0 {
                continue;
            }
            if i > 0 {
                let terminal = j == 0 || j == len_b;
                let (open, extend) = if terminal {
                    (params.terminal_gap_open, params.terminal_gap_extend)
                } else {
                    (params.interior_gap_open, params.interior_gap_extend)
                };
                ix[i][j] = (m[i - 1][j] + open).max(ix[i - 1][j] + extend);
            }
            if j > 0 {
                let terminal = i == 0 || i == len_a;
                let (open, extend) = if terminal {
                    (params.terminal_gap_open, params.terminal_gap_extend)
                } else {
                    (params.interior_gap_open, params.interior_gap_extend)
                };
                iy[i][j] = (m[i][j - 1] + open).max(iy[i][j - 1] + extend);
            }
            if i > 0 && j > 0 {
                let matches = A::symbols_match(a[i - 1], b[j - 1]);
                let subst = params.substitution(a[i - 1], b[j - 1], matches);
                let best_prev = m[i - 1][j - 1].max(ix[i - 1][j - 1]).max(iy[i - 1][j - 1]);
                m[i][j] = best_prev + subst;
            }
        }
    }

    let final_m = m[len_a][len_b];
    let final_ix = ix[len_a][len_b];
    let final_iy = iy[len_a][len_b];
    let (score, mut state) = if final_m >= final_ix && final_m >= final_iy {
        (final_m, Mat::M)
    } else if final_ix >= final_iy {
        (final_ix, Mat::Ix)
    } else {
        (final_iy, Mat::Iy)
    };

    let mut i = len_a;
    let mut j = len_b;
    let mut runs = Vec::new();

    while i > 0 || j > 0 {
        match state {
            Mat::M => {
                let matches = A::symbols_match(a[i - 1], b[j - 1]);
                runs.push(if matches { CigarOp::Match } else { CigarOp::Mismatch });
                let subst = params.substitution(a[i - 1], b[j - 1], matches);
                let target = m[i][j] - subst;
                i -= 1;
                j -= 1;
                state = if (i == 0 && j == 0 && target == 0) || m[i][j] == target {
                    Mat::M
                } else if ix[i][j] == target {
                    Mat::Ix
                } else {
                    Mat::Iy
                };
            }
            Mat::Ix => {
                runs.push(CigarOp::Insertion);
                let terminal = j == 0 || j == len_b;
                let open = if terminal {
                    params.terminal_gap_open
                } else {
                    params.interior_gap_open
                };
                let from_m = m[i - 1][j] + open == ix[i][j];
                i -= 1;
                state = if from_m { Mat::M } else { Mat::Ix };
            }
            Mat::Iy => {
                runs.push(CigarOp::Deletion);
                let terminal = i == 0 || i == len_a;
                let open = if terminal {
                    params.terminal_gap_open
                } else {
                    params.interior_gap_open
                };
                let from_m = m[i][j - 1] + open == iy[i][j];
                j -= 1;
                state = if from_m { Mat::M } else { Mat::Iy };
            }
        }
    }

    runs.reverse();
    let mut cigar = Cigar::new();
    for op in runs {
        cigar.push_op(op);
    }
    (score, cigar)
}
