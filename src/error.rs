//! Error types.
//!
//! Exhaustive, strongly-typed errors for every caller-actionable condition,
//! per the error handling design's "result values, not panics" policy.

use std::path::PathBuf;
use thiserror::Error;

/// Errors surfaced by the core and its I/O boundary.
#[derive(Debug, Error)]
pub enum NsearchError {
    /// Word size outside the range this build can represent.
    #[error("invalid k-mer length {k}: must be between {min} and {max}")]
    InvalidKmerLength { k: usize, min: u8, max: u8 },

    /// A symbol outside the selected alphabet's ambiguity bitmap.
    #[error("invalid symbol '{symbol}' at position {position}")]
    InvalidAlphabetSymbol { symbol: u8, position: usize },

    /// A malformed FASTA/FASTQ record: missing header, truncated quality line, etc.
    #[error("failed to parse sequence record: {details}")]
    SequenceParse { details: String },

    /// Failed to read a sequence file.
    #[error("failed to read sequence file '{path}': {source}")]
    SequenceRead {
        #[source]
        source: std::io::Error,
        path: PathBuf,
    },

    /// Failed to write sequence or hit-report output.
    #[error("failed to write output: {source}")]
    SequenceWrite {
        #[source]
        source: std::io::Error,
    },

    /// Failed to serialize/deserialize JSON (config dumps, structured reports).
    #[error("failed to serialize JSON: {source}")]
    JsonError {
        #[source]
        source: serde_json::Error,
    },

    /// Index corruption or capacity overflow: unrecoverable, process aborts.
    #[error("index error: {details}")]
    IndexError { details: String },
}

impl From<std::io::Error> for NsearchError {
    fn from(source: std::io::Error) -> Self {
        NsearchError::SequenceWrite { source }
    }
}

impl From<serde_json::Error> for NsearchError {
    fn from(source: serde_json::Error) -> Self {
        NsearchError::JsonError { source }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_kmer_length_display() {
        let err = NsearchError::InvalidKmerLength { k: 50, min: 1, max: 32 };
        assert_eq!(
            err.to_string(),
            "invalid k-mer length 50: must be between 1 and 32"
        );
    }

    #[test]
    fn invalid_alphabet_symbol_display() {
        let err = NsearchError::InvalidAlphabetSymbol { symbol: b'Z', position: 3 };
        assert_eq!(err.to_string(), "invalid symbol 'Z' at position 3");
    }
}
