//! Paired-end read merging: overlap detection and consensus base calling.

use bytes::Bytes;

use crate::alphabet::{Alphabet, Dna};
use crate::qscore::{ascii_to_q, posterior_for_match, posterior_for_mismatch, q_to_ascii};
use crate::sequence::Sequence;

#[cfg(feature = "tracing")]
use tracing::info_span;

/// Parameters governing overlap acceptance.
#[derive(Debug, Clone, Copy)]
pub struct MergeParams {
    pub min_overlap: usize,
    pub min_identity: f64,
}

impl Default for MergeParams {
    fn default() -> Self {
        Self {
            min_overlap: 16,
            min_identity: 0.9,
        }
    }
}

/// Where the best-scoring overlap was found.
#[derive(Debug, Clone, Copy)]
struct Overlap {
    pos1: usize,
    pos2: usize,
    len: usize,
}

/// Merges forward read `f` and reverse read `r` (both with quality) into one
/// consensus read, or `None` if no overlap clears `min_overlap`/`min_identity`.
pub fn merge(f: &Sequence<Dna>, r: &Sequence<Dna>, params: &MergeParams) -> Option<Sequence<Dna>> {
    #[cfg(feature = "tracing")]
    let _span = info_span!("merge_pair", f_len = f.len(), r_len = r.len()).entered();

    let g = r.reverse_complement();
    let overlap = find_best_overlap(f, &g, params)?;
    Some(build_merged(f, &g, &overlap))
}

fn find_best_overlap(f: &Sequence<Dna>, g: &Sequence<Dna>, params: &MergeParams) -> Option<Overlap> {
    let len_f = f.len();
    let len_g = g.len();
    let max_mismatches_for = |len: usize| ((len as f64) * (1.0 - params.min_identity)).floor() as i64;

    let mut best: Option<(i64, Overlap)> = None;

    for i in 0..=(len_f + len_g) {
        let pos1 = len_f.saturating_sub(i);
        let pos2 = i.saturating_sub(len_f);
        let len = (len_g.saturating_sub(pos2)).min(i);
        if len < params.min_overlap {
            continue;
        }

        let max_mismatches = max_mismatches_for(len);
        let mut mismatches = 0i64;
        let mut score = 0i64;
        let mut aborted = false;
        for j in 0..len {
            let a = f.symbols[pos1 + j];
            let b = g.symbols[pos2 + j];
            if Dna::symbols_match(a, b) {
                score += 1;
            } else {
                score -= 1;
                mismatches += 1;
                if mismatches > max_mismatches {
                    aborted = true;
                    break;
                }
            }
        }
        if aborted {
            continue;
        }

        let candidate = Overlap { pos1, pos2, len };
        match &best {
            Some((best_score, _)) if *best_score >= score => {}
            _ => best = Some((score, candidate)),
        }
    }

    best.map(|(_, overlap)| overlap)
}

fn build_merged(f: &Sequence<Dna>, g: &Sequence<Dna>, overlap: &Overlap) -> Sequence<Dna> {
    let mut symbols = Vec::new();
    let mut quality = Vec::new();

    let staggered = overlap.pos2 > 0;

    if !staggered {
        symbols.extend_from_slice(&f.symbols[..overlap.pos1]);
        quality.extend_from_slice(f.quality.as_ref().map_or(&[][..], |q| &q[..overlap.pos1]));
    }

    for j in 0..overlap.len {
        let fs = f.symbols[overlap.pos1 + j];
        let gs = g.symbols[overlap.pos2 + j];
        let fq = f.quality.as_ref().map_or(0, |q| ascii_to_q(q[overlap.pos1 + j]));
        let gq = g.quality.as_ref().map_or(0, |q| ascii_to_q(q[overlap.pos2 + j]));

        let matches = Dna::symbols_match(fs, gs);
        let chosen_symbol = if fq >= gq { fs } else { gs };
        let posterior = if matches {
            posterior_for_match(fq, gq)
        } else {
            posterior_for_mismatch(fq, gq)
        };

        symbols.push(chosen_symbol);
        quality.push(q_to_ascii(posterior));
    }

    if !staggered {
        let tail_start = overlap.pos2 + overlap.len;
        symbols.extend_from_slice(&g.symbols[tail_start..]);
        quality.extend_from_slice(g.quality.as_ref().map_or(&[][..], |q| &q[tail_start..]));
    }

    Sequence::new(f.identifier.clone(), Bytes::from(symbols), Some(Bytes::from(quality)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dna(id: &str, s: &str, q: &str) -> Sequence<Dna> {
        Sequence::new(id, Bytes::copy_from_slice(s.as_bytes()), Some(Bytes::copy_from_slice(q.as_bytes())))
    }

    #[test]
    fn s5_non_staggered_merge() {
        let f = dna("f", "ACTGGATGGA", "JJJJJJJJJJ");
        let r_plain = dna("r", "ATGGAATCCC", "JJJJJJJJJJ");
        let r = r_plain.reverse_complement();
        let params = MergeParams {
            min_overlap: 5,
            min_identity: 1.0,
        };
        let merged = merge(&f, &r, &params).expect("should merge");
        assert_eq!(&merged.symbols[..], b"ACTGGATGGAATCCC");
    }

    #[test]
    fn s6_staggered_merge_drops_non_overlap() {
        let f = dna("f", "ATCCCGGA", "JJJJJJJJ");
        let r_plain = dna("r", "ATGGAATCCC", "JJJJJJJJJJ");
        let r = r_plain.reverse_complement();
        let merged = merge(&f, &r, &MergeParams::default()).expect("should merge");
        assert_eq!(&merged.symbols[..], b"ATCCC");
    }

    #[test]
    fn s7_posterior_quality_upgrade() {
        let f = dna("f", "ATTGACCGT", "1>AA1@FFF");
        let r_plain = dna("r", "ACCGTGAATC", "?AAAAFFFFF");
        let r = r_plain.reverse_complement();
        let merged = merge(&f, &r, &MergeParams::default()).expect("should merge");
        assert_eq!(&merged.symbols[..], b"ATTGACCGTGAATC");
        assert_eq!(&merged.quality.unwrap()[..], b"1>AAJJJJJFFFFF");
    }

    #[test]
    fn perfect_overlap_consensus_matches_source() {
        let f = dna("f", "ACGTACGTAC", "JJJJJJJJJJ");
        let overlap_region = "ACGTACGTAC";
        let r_plain = dna("r", overlap_region, "JJJJJJJJJJ");
        let r = r_plain.reverse_complement();
        let params = MergeParams {
            min_overlap: 5,
            min_identity: 1.0,
        };
        let merged = merge(&f, &r, &params).expect("perfect overlap should merge");
        assert_eq!(&merged.symbols[..], b"ACGTACGTAC");
    }
}
