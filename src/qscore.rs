//! Phred posterior quality tables (Edgar & Flyvbjerg 2015).
//!
//! Process-wide, lazily built 42x42 tables of posterior Q for a match or
//! mismatch between two observations at the same position.

use std::sync::OnceLock;

pub const MAX_SCORE: i32 = 41;
pub const MIN_ASCII_BASE: u8 = 33; // '!'
const DIM: usize = (MAX_SCORE + 1) as usize;

struct Tables {
    match_score: Vec<Vec<i32>>,
    mismatch_score: Vec<Vec<i32>>,
}

static TABLES: OnceLock<Tables> = OnceLock::new();

fn score_to_probability(q: i32) -> f64 {
    10f64.powf(-f64::from(q) / 10.0)
}

fn probability_to_score(p: f64) -> i32 {
    let q = (-10.0 * p.log10()).round() as i32;
    q.min(MAX_SCORE)
}

fn tables() -> &'static Tables {
    TABLES.get_or_init(|| {
        let mut match_score = vec![vec![0; DIM]; DIM];
        let mut mismatch_score = vec![vec![0; DIM]; DIM];
        for qx in 0..DIM {
            let px = score_to_probability(qx as i32);
            for qy in 0..DIM {
                let py = score_to_probability(qy as i32);

                let p_match = (px * py / 3.0) / (1.0 - px - py + 4.0 * px * py / 3.0);

                let (p_lo, p_hi) = if px < py { (px, py) } else { (py, px) };
                let p_mismatch =
                    p_lo * (1.0 - p_hi / 3.0) / (px + py - 4.0 * px * py / 3.0);

                match_score[qx][qy] = probability_to_score(p_match);
                mismatch_score[qx][qy] = probability_to_score(p_mismatch);
            }
        }
        Tables {
            match_score,
            mismatch_score,
        }
    })
}

/// Converts a Phred+33 ASCII quality byte to its numeric Q score.
#[must_use]
pub fn ascii_to_q(byte: u8) -> i32 {
    i32::from(byte.saturating_sub(MIN_ASCII_BASE)).clamp(0, MAX_SCORE)
}

/// Converts a numeric Q score to its Phred+33 ASCII byte.
#[must_use]
pub fn q_to_ascii(q: i32) -> u8 {
    (MIN_ASCII_BASE as i32 + q.clamp(0, MAX_SCORE)) as u8
}

/// Posterior Q for two bases that match, given their individual Q scores.
#[must_use]
pub fn posterior_for_match(q1: i32, q2: i32) -> i32 {
    tables().match_score[q1.clamp(0, MAX_SCORE) as usize][q2.clamp(0, MAX_SCORE) as usize]
}

/// Posterior Q for two bases that mismatch, given their individual Q scores.
#[must_use]
pub fn posterior_for_mismatch(q1: i32, q2: i32) -> i32 {
    tables().mismatch_score[q1.clamp(0, MAX_SCORE) as usize][q2.clamp(0, MAX_SCORE) as usize]
}

/// Probability that a base with quality score `q` is an error (`10^(-Q/10)`).
#[must_use]
pub fn error_probability(q: i32) -> f64 {
    score_to_probability(q)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn posterior_never_exceeds_max_score() {
        for q1 in 0..=MAX_SCORE {
            for q2 in 0..=MAX_SCORE {
                assert!(posterior_for_match(q1, q2) <= MAX_SCORE);
                assert!(posterior_for_mismatch(q1, q2) <= MAX_SCORE);
            }
        }
    }

    #[test]
    fn match_posterior_of_two_high_quality_bases_is_high() {
        // Both 'J' (Q=41): matching should yield a very high posterior.
        let q = ascii_to_q(b'J');
        assert_eq!(posterior_for_match(q, q), MAX_SCORE);
    }

    #[test]
    fn ascii_roundtrip() {
        for byte in 33u8..=74 {
            let q = ascii_to_q(byte);
            assert_eq!(q_to_ascii(q), byte);
        }
    }
}
