//! CIGAR alignment representation.
//!
//! A [`Cigar`] is a run-length-encoded sequence of alignment operations. Adjacent
//! entries always differ in op; [`Cigar::push`] merges a new op into the last run
//! when they match.

use std::fmt;

/// A single alignment operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CigarOp {
    /// Query and target symbols match.
    Match,
    /// Query and target symbols differ but are aligned.
    Mismatch,
    /// Query symbol with no corresponding target symbol (consumes query only).
    Insertion,
    /// Target symbol with no corresponding query symbol (consumes target only).
    Deletion,
}

impl CigarOp {
    fn as_char(self) -> char {
        match self {
            Self::Match => 'M',
            Self::Mismatch => 'X',
            Self::Insertion => 'I',
            Self::Deletion => 'D',
        }
    }
}

/// A single run of `count` consecutive `op`s.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CigarEntry {
    pub count: usize,
    pub op: CigarOp,
}

/// A run-length-encoded alignment.
///
/// `Insertion` consumes query only; `Deletion` consumes target only; `Match`
/// and `Mismatch` consume one symbol of each.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Cigar {
    entries: Vec<CigarEntry>,
}

impl Cigar {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn entries(&self) -> &[CigarEntry] {
        &self.entries
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Reverses the run order (used when stitching a `Reverse`-direction extension).
    pub fn reverse(&mut self) {
        self.entries.reverse();
    }

    /// Appends one op, merging into the last run when the op matches.
    pub fn push_op(&mut self, op: CigarOp) {
        self.push(CigarEntry { count: 1, op });
    }

    /// Appends an entry, merging into the last run when the op matches.
    pub fn push(&mut self, entry: CigarEntry) {
        if entry.count == 0 {
            return;
        }
        match self.entries.last_mut() {
            Some(last) if last.op == entry.op => last.count += entry.count,
            _ => self.entries.push(entry),
        }
    }

    /// Appends all of `other`'s runs, merging the boundary run if ops match.
    pub fn extend(&mut self, other: &Cigar) {
        for &entry in &other.entries {
            self.push(entry);
        }
    }

    /// Interior runs: the full run list with a leading and/or trailing gap run
    /// (Insertion/Deletion) removed, per the terminal-trimming invariant.
    fn interior(&self) -> &[CigarEntry] {
        let mut start = 0;
        let mut end = self.entries.len();
        if let Some(first) = self.entries.first() {
            if matches!(first.op, CigarOp::Insertion | CigarOp::Deletion) {
                start = 1;
            }
        }
        if end > start {
            if let Some(last) = self.entries.get(end - 1) {
                if matches!(last.op, CigarOp::Insertion | CigarOp::Deletion) {
                    end -= 1;
                }
            }
        }
        &self.entries[start..end]
    }

    /// Fraction of interior columns that are `Match`, excluding a leading/trailing
    /// gap run. Returns `0.0` for an all-gap or empty CIGAR.
    #[must_use]
    pub fn identity(&self) -> f64 {
        let mut matches = 0usize;
        let mut total = 0usize;
        for entry in self.interior() {
            match entry.op {
                CigarOp::Match => {
                    matches += entry.count;
                    total += entry.count;
                }
                CigarOp::Mismatch | CigarOp::Insertion | CigarOp::Deletion => {
                    total += entry.count;
                }
            }
        }
        if total == 0 {
            0.0
        } else {
            matches as f64 / total as f64
        }
    }

    /// Query columns consumed: Match + Mismatch + Insertion.
    #[must_use]
    pub fn query_len(&self) -> usize {
        self.entries
            .iter()
            .filter(|e| !matches!(e.op, CigarOp::Deletion))
            .map(|e| e.count)
            .sum()
    }

    /// Target columns consumed: Match + Mismatch + Deletion.
    #[must_use]
    pub fn target_len(&self) -> usize {
        self.entries
            .iter()
            .filter(|e| !matches!(e.op, CigarOp::Insertion))
            .map(|e| e.count)
            .sum()
    }
}

impl fmt::Display for Cigar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for entry in &self.entries {
            write!(f, "{}{}", entry.count, entry.op.as_char())?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cigar_from(ops: &[(usize, CigarOp)]) -> Cigar {
        let mut c = Cigar::new();
        for &(count, op) in ops {
            c.push(CigarEntry { count, op });
        }
        c
    }

    #[test]
    fn merges_adjacent_same_op() {
        let mut c = Cigar::new();
        c.push_op(CigarOp::Match);
        c.push_op(CigarOp::Match);
        assert_eq!(c.to_string(), "2M");
    }

    #[test]
    fn display_matches_spec_example() {
        let c = cigar_from(&[
            (7, CigarOp::Match),
            (3, CigarOp::Insertion),
            (3, CigarOp::Match),
            (1, CigarOp::Mismatch),
            (3, CigarOp::Match),
        ]);
        assert_eq!(c.to_string(), "7M3I3M1X3M");
    }

    #[test]
    fn identity_trims_leading_and_trailing_gap() {
        let c = cigar_from(&[
            (2, CigarOp::Insertion),
            (8, CigarOp::Match),
            (2, CigarOp::Mismatch),
            (3, CigarOp::Deletion),
        ]);
        // interior: 8M 2X -> identity = 8/10
        assert!((c.identity() - 0.8).abs() < 1e-9);
    }

    #[test]
    fn identity_in_bounds() {
        let c = cigar_from(&[(5, CigarOp::Match), (5, CigarOp::Mismatch)]);
        let id = c.identity();
        assert!((0.0..=1.0).contains(&id));
    }

    #[test]
    fn query_and_target_len_account_for_all_columns() {
        let c = cigar_from(&[
            (7, CigarOp::Match),
            (3, CigarOp::Insertion),
            (3, CigarOp::Match),
            (1, CigarOp::Mismatch),
            (3, CigarOp::Match),
        ]);
        assert_eq!(c.query_len(), 17);
        assert_eq!(c.target_len(), 14);
    }
}
