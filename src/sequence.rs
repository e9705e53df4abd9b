//! Sequence: identifier + symbol string + optional per-symbol quality.

use std::marker::PhantomData;

use bytes::Bytes;

use crate::alphabet::Alphabet;

/// A biological sequence over alphabet `A`.
///
/// `quality`, when present, has the same length as `symbols` (Phred+33,
/// `Q ∈ [0, 41]`, so each byte is in `[33, 74]`).
#[derive(Debug, Clone)]
pub struct Sequence<A: Alphabet> {
    pub identifier: String,
    pub symbols: Bytes,
    pub quality: Option<Bytes>,
    _alphabet: PhantomData<A>,
}

impl<A: Alphabet> Sequence<A> {
    /// Builds a sequence, panicking if quality is present but mismatched in
    /// length — this is a programmer error at construction sites, not a
    /// caller-facing condition (readers validate FASTQ records before this
    /// point).
    #[must_use]
    pub fn new(identifier: impl Into<String>, symbols: Bytes, quality: Option<Bytes>) -> Self {
        if let Some(q) = &quality {
            assert_eq!(q.len(), symbols.len(), "quality length must match symbols");
        }
        Self {
            identifier: identifier.into(),
            symbols,
            quality,
            _alphabet: PhantomData,
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    /// Subsequence `[start, end)`, preserving the identifier and slicing
    /// quality identically.
    #[must_use]
    pub fn subsequence(&self, start: usize, end: usize) -> Self {
        Self {
            identifier: self.identifier.clone(),
            symbols: self.symbols.slice(start..end),
            quality: self.quality.as_ref().map(|q| q.slice(start..end)),
            _alphabet: PhantomData,
        }
    }
}

impl<A: Alphabet> Sequence<A>
where
    A: crate::alphabet::Alphabet,
{
    /// Reverses symbols and quality in place order (does not complement).
    #[must_use]
    pub fn reverse(&self) -> Self {
        let symbols: Bytes = self.symbols.iter().rev().copied().collect();
        let quality = self.quality.as_ref().map(|q| q.iter().rev().copied().collect());
        Self {
            identifier: self.identifier.clone(),
            symbols,
            quality,
            _alphabet: PhantomData,
        }
    }
}

impl<A: Alphabet> Sequence<A> {
    /// Reverse-complement: reverses symbols and quality, complementing each
    /// symbol. Only meaningful for alphabets with `HAS_COMPLEMENT`; for
    /// alphabets without complementarity this degenerates to a plain reverse.
    #[must_use]
    pub fn reverse_complement(&self) -> Self {
        let symbols: Bytes = self
            .symbols
            .iter()
            .rev()
            .map(|&b| A::complement(b))
            .collect();
        let quality = self.quality.as_ref().map(|q| q.iter().rev().copied().collect());
        Self {
            identifier: self.identifier.clone(),
            symbols,
            quality,
            _alphabet: PhantomData,
        }
    }
}
