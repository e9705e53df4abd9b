//! Command-line interface definition.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

use crate::format::SequenceFormat;
use crate::search::Strand;

/// A fast, parallel sequence search and paired-end read merging tool.
#[derive(Parser, Debug)]
#[command(name = "nsearch")]
#[command(version, author, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Search query sequences against a reference database
    Search(SearchArgs),
    /// Merge overlapping paired-end reads into a consensus sequence
    Merge(MergeArgs),
    /// Filter a FASTQ stream by maximum expected errors
    Filter(FilterArgs),
}

/// Which alphabet the input sequences are drawn from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Default)]
pub enum AlphabetArg {
    #[default]
    Dna,
    Protein,
}

/// Which strand(s) of a DNA query to search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Default)]
pub enum StrandArg {
    #[default]
    Plus,
    Minus,
    Both,
}

impl From<StrandArg> for Strand {
    fn from(value: StrandArg) -> Self {
        match value {
            StrandArg::Plus => Strand::Plus,
            StrandArg::Minus => Strand::Minus,
            StrandArg::Both => Strand::Both,
        }
    }
}

/// Hit report output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Default)]
pub enum ReportFormat {
    #[default]
    Text,
    Csv,
    /// Newline-delimited JSON, one hit object per line.
    Json,
}

#[derive(Parser, Debug)]
pub struct SearchArgs {
    /// Query sequences (FASTA/FASTQ, '-' or omit for stdin)
    #[arg(long, default_value = "-")]
    pub query: PathBuf,

    /// Reference database sequences (FASTA/FASTQ)
    #[arg(long)]
    pub db: PathBuf,

    /// Output path for the hit report ('-' or omit for stdout)
    #[arg(long, default_value = "-")]
    pub out: PathBuf,

    /// Hit report format
    #[arg(long, value_enum, default_value = "text")]
    pub format: ReportFormat,

    /// Alphabet of the query and database sequences
    #[arg(long, value_enum, default_value = "dna")]
    pub alphabet: AlphabetArg,

    /// K-mer seed length (silently clamped to what the index can represent)
    #[arg(long = "word-size", default_value = "8")]
    pub word_size: usize,

    /// Minimum alignment identity to accept a hit, in [0, 1]
    #[arg(long, default_value = "0.75")]
    pub identity: f64,

    /// Maximum accepted hits per query (alias: --max-hits)
    #[arg(long = "max-accepts", alias = "max-hits", default_value = "1")]
    pub max_accepts: usize,

    /// Maximum rejected candidates considered per query before giving up
    #[arg(long = "max-rejects", default_value = "8")]
    pub max_rejects: usize,

    /// Which strand(s) of the query to search (protein only supports plus)
    #[arg(long, value_enum, default_value = "plus")]
    pub strand: StrandArg,

    /// Input file format (auto-detected from extension if not specified)
    #[arg(short = 'i', long = "input-format", value_enum, default_value = "auto")]
    pub input_format: SequenceFormat,

    /// Suppress informational output
    #[arg(short, long)]
    pub quiet: bool,
}

impl SearchArgs {
    /// Validates cross-field constraints not expressible via `clap` alone.
    ///
    /// # Errors
    ///
    /// Returns an error if `--strand minus`/`--strand both` is combined with
    /// `--alphabet protein` (reverse-complementing has no protein meaning),
    /// or if `--identity` is outside `[0, 1]`.
    pub fn validate(&self) -> Result<(), String> {
        if self.alphabet == AlphabetArg::Protein && self.strand != StrandArg::Plus {
            return Err(format!(
                "--strand {:?} is not supported for --alphabet protein (proteins have no reverse complement)",
                self.strand
            ));
        }
        if !(0.0..=1.0).contains(&self.identity) {
            return Err(format!("--identity {} must be within [0, 1]", self.identity));
        }
        Ok(())
    }
}

#[derive(Parser, Debug)]
pub struct MergeArgs {
    /// Forward reads (FASTQ)
    #[arg(long)]
    pub forward: PathBuf,

    /// Reverse reads (FASTQ)
    #[arg(long)]
    pub reverse: PathBuf,

    /// Output path for merged reads ('-' or omit for stdout)
    #[arg(long, default_value = "-")]
    pub out: PathBuf,

    /// Minimum overlap length to accept a merge
    #[arg(long = "min-overlap", default_value = "16")]
    pub min_overlap: usize,

    /// Minimum overlap identity to accept a merge, in [0, 1]
    #[arg(long = "min-identity", default_value = "0.9")]
    pub min_identity: f64,

    /// Suppress informational output
    #[arg(short, long)]
    pub quiet: bool,
}

#[derive(Parser, Debug)]
pub struct FilterArgs {
    /// Input reads (FASTQ, '-' or omit for stdin)
    #[arg(long, default_value = "-")]
    pub input: PathBuf,

    /// Output path for reads passing the filter ('-' or omit for stdout)
    #[arg(long, default_value = "-")]
    pub out: PathBuf,

    /// Maximum expected errors (sum of per-base error probabilities) allowed
    #[arg(long = "max-expected-errors", default_value = "1.0")]
    pub max_expected_errors: f64,

    /// Suppress informational output
    #[arg(short, long)]
    pub quiet: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn protein_with_minus_strand_is_rejected() {
        let args = SearchArgs {
            query: "-".into(),
            db: "db.fa".into(),
            out: "-".into(),
            format: ReportFormat::Text,
            alphabet: AlphabetArg::Protein,
            word_size: 8,
            identity: 0.75,
            max_accepts: 1,
            max_rejects: 8,
            strand: StrandArg::Minus,
            input_format: SequenceFormat::Auto,
            quiet: false,
        };
        assert!(args.validate().is_err());
    }

    #[test]
    fn protein_with_plus_strand_is_accepted() {
        let args = SearchArgs {
            query: "-".into(),
            db: "db.fa".into(),
            out: "-".into(),
            format: ReportFormat::Text,
            alphabet: AlphabetArg::Protein,
            word_size: 8,
            identity: 0.75,
            max_accepts: 1,
            max_rejects: 8,
            strand: StrandArg::Plus,
            input_format: SequenceFormat::Auto,
            quiet: false,
        };
        assert!(args.validate().is_ok());
    }

    #[test]
    fn identity_out_of_range_is_rejected() {
        let args = SearchArgs {
            query: "-".into(),
            db: "db.fa".into(),
            out: "-".into(),
            format: ReportFormat::Text,
            alphabet: AlphabetArg::Dna,
            word_size: 8,
            identity: 1.5,
            max_accepts: 1,
            max_rejects: 8,
            strand: StrandArg::Plus,
            input_format: SequenceFormat::Auto,
            quiet: false,
        };
        assert!(args.validate().is_err());
    }

    #[test]
    fn max_hits_is_an_alias_for_max_accepts() {
        let cli = Cli::parse_from(["nsearch", "search", "--db", "db.fa", "--max-hits", "5"]);
        match cli.command {
            Command::Search(args) => assert_eq!(args.max_accepts, 5),
            _ => panic!("expected search subcommand"),
        }
    }
}
