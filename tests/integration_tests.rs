//! End-to-end tests driving the `run::run_search`/`run_merge`/`run_filter`
//! orchestration functions against real temp files, exercising the full
//! reader -> core -> writer path rather than the core algorithms in
//! isolation (those are covered by the unit tests alongside each module).

use std::io::Write;

use nsearch::cli::{AlphabetArg, FilterArgs, MergeArgs, ReportFormat, SearchArgs, StrandArg};
use nsearch::format::SequenceFormat;
use nsearch::run::{run_filter, run_merge, run_search};
use nsearch::stats::RunStats;
use tempfile::NamedTempFile;

const BIPECTINATA: &str = "TATAATGTTTACATTGGTCAAGTAAGAATGTAGTTGAGTGCGTCCTTGTGTTGTTAATATTGTATGCAAACCTATCAGT";
const GRIMSHAWI_QUERY: &str = "TATAATGTTTACATTGGTCAAGTAAGAATGTAGTTGAGTGCGTCCTTGTGTTGTTAATATTGTATGCA";

fn write_fasta(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file
}

fn write_fastq(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file
}

#[test]
fn search_end_to_end_reports_one_hit_as_text() {
    let db = write_fasta(&format!(">bipectinata\n{BIPECTINATA}\n"));
    let query = write_fasta(&format!(">grimshawi\n{GRIMSHAWI_QUERY}\n"));
    let out = NamedTempFile::new().unwrap();

    let args = SearchArgs {
        query: query.path().to_path_buf(),
        db: db.path().to_path_buf(),
        out: out.path().to_path_buf(),
        format: ReportFormat::Text,
        alphabet: AlphabetArg::Dna,
        word_size: 8,
        identity: 0.75,
        max_accepts: 1,
        max_rejects: 8,
        strand: StrandArg::Plus,
        input_format: SequenceFormat::Auto,
        quiet: true,
    };

    let stats = RunStats::new();
    run_search(&args, &stats).unwrap();

    let report = std::fs::read_to_string(out.path()).unwrap();
    assert!(report.contains("Query >grimshawi"));
    assert!(report.contains("bipectinata"));
    assert_eq!(stats.snapshot().hits_accepted, 1);
}

#[test]
fn search_end_to_end_reports_csv() {
    let db = write_fasta(&format!(">bipectinata\n{BIPECTINATA}\n"));
    let query = write_fasta(&format!(">grimshawi\n{GRIMSHAWI_QUERY}\n"));
    let out = NamedTempFile::new().unwrap();

    let args = SearchArgs {
        query: query.path().to_path_buf(),
        db: db.path().to_path_buf(),
        out: out.path().to_path_buf(),
        format: ReportFormat::Csv,
        alphabet: AlphabetArg::Dna,
        word_size: 8,
        identity: 0.75,
        max_accepts: 1,
        max_rejects: 8,
        strand: StrandArg::Plus,
        input_format: SequenceFormat::Auto,
        quiet: true,
    };

    let stats = RunStats::new();
    run_search(&args, &stats).unwrap();

    let report = std::fs::read_to_string(out.path()).unwrap();
    let mut lines = report.lines();
    assert_eq!(
        lines.next().unwrap(),
        "QueryId,TargetId,QueryMatchStart,QueryMatchEnd,TargetMatchStart,TargetMatchEnd,\
QueryMatchSeq,TargetMatchSeq,NumColumns,NumMatches,NumMismatches,NumGaps,Identity,Alignment"
    );
    let row = lines.next().unwrap();
    assert!(row.starts_with("grimshawi,bipectinata,"));
}

#[test]
fn search_with_no_hits_still_writes_a_query_header() {
    let db = write_fasta(">ref\nAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAA\n");
    let query = write_fasta(">q\nTTTTTTTTTTTTTTTTTTTTTTTTTTTTTTTT\n");
    let out = NamedTempFile::new().unwrap();

    let args = SearchArgs {
        query: query.path().to_path_buf(),
        db: db.path().to_path_buf(),
        out: out.path().to_path_buf(),
        format: ReportFormat::Text,
        alphabet: AlphabetArg::Dna,
        word_size: 8,
        identity: 0.75,
        max_accepts: 1,
        max_rejects: 8,
        strand: StrandArg::Plus,
        input_format: SequenceFormat::Auto,
        quiet: true,
    };

    let stats = RunStats::new();
    run_search(&args, &stats).unwrap();

    let report = std::fs::read_to_string(out.path()).unwrap();
    assert!(report.contains("Query >q"));
    assert!(report.contains("No hits found"));
    assert_eq!(stats.snapshot().hits_rejected, 1);
}

#[test]
fn merge_end_to_end_consensus_round_trips() {
    // A 40nt fragment split into two 24nt overlapping reads.
    let fragment = "ACGTACGTACGTACGTACGTACGTACGTACGTACGTACGT";
    let forward_seq = &fragment[0..24];
    let reverse_seq = reverse_complement(&fragment[16..40]);

    let forward = write_fastq(&format!("@pair1\n{forward_seq}\n+\n{}\n", "I".repeat(24)));
    let reverse = write_fastq(&format!("@pair1\n{reverse_seq}\n+\n{}\n", "I".repeat(24)));
    let out = NamedTempFile::new().unwrap();

    let args = MergeArgs {
        forward: forward.path().to_path_buf(),
        reverse: reverse.path().to_path_buf(),
        out: out.path().to_path_buf(),
        min_overlap: 8,
        min_identity: 0.9,
        quiet: true,
    };

    let stats = RunStats::new();
    run_merge(&args, &stats).unwrap();

    let merged = std::fs::read_to_string(out.path()).unwrap();
    assert!(merged.starts_with("@pair1\n"));
    assert_eq!(stats.snapshot().pairs_merged, 1);
}

#[test]
fn filter_end_to_end_drops_low_quality_reads() {
    // 'I' (Q=40) everywhere: negligible expected error, should pass.
    let good = "@good\nACGTACGT\n+\nIIIIIIII\n";
    // '#' (Q=2) everywhere: high expected error, should be dropped.
    let bad = "@bad\nACGTACGT\n+\n########\n";
    let input = write_fastq(&format!("{good}{bad}"));
    let out = NamedTempFile::new().unwrap();

    let args = FilterArgs {
        input: input.path().to_path_buf(),
        out: out.path().to_path_buf(),
        max_expected_errors: 1.0,
        quiet: true,
    };

    let stats = RunStats::new();
    run_filter(&args, &stats).unwrap();

    let kept = std::fs::read_to_string(out.path()).unwrap();
    assert!(kept.contains("@good"));
    assert!(!kept.contains("@bad"));
    assert_eq!(stats.snapshot().hits_accepted, 1);
    assert_eq!(stats.snapshot().hits_rejected, 1);
}

fn reverse_complement(s: &str) -> String {
    s.chars()
        .rev()
        .map(|c| match c {
            'A' => 'T',
            'T' => 'A',
            'C' => 'G',
            'G' => 'C',
            other => other,
        })
        .collect()
}
