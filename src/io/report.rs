//! Hit-report writers: a human-readable alignment block and a CSV table,
//! grounded respectively in `Alnout/Writer.h` and `CSV/WriterTest.cpp`.

use std::io::Write;

use crate::alphabet::Alphabet;
use crate::cigar::{Cigar, CigarEntry, CigarOp};
use crate::database::Database;
use crate::error::NsearchError;
use crate::search::Hit;
use crate::sequence::Sequence;

/// Columns per line before an alignment block wraps, matching the original
/// renderer's fixed line width.
const MAX_ALIGNMENT_LINE_LENGTH: usize = 60;

pub trait HitWriter<A: Alphabet> {
    fn write_hits(
        &mut self,
        query: &Sequence<A>,
        db: &Database<A>,
        hits: &[Hit],
    ) -> Result<(), NsearchError>;
}

/// Bounds of the CIGAR's interior (leading/trailing gap run trimmed), as
/// half-open `[start, end)` ranges into the query and target sequences.
fn interior_bounds(cigar: &Cigar) -> (usize, usize, usize, usize) {
    let entries = cigar.entries();
    let mut q_start = 0usize;
    let mut t_start = 0usize;
    let mut start_idx = 0;
    if let Some(first) = entries.first() {
        match first.op {
            CigarOp::Insertion => {
                q_start = first.count;
                start_idx = 1;
            }
            CigarOp::Deletion => {
                t_start = first.count;
                start_idx = 1;
            }
            _ => {}
        }
    }

    let mut end_idx = entries.len();
    if end_idx > start_idx {
        if let Some(last) = entries.get(end_idx - 1) {
            if matches!(last.op, CigarOp::Insertion | CigarOp::Deletion) {
                end_idx -= 1;
            }
        }
    }

    let mut q_end = q_start;
    let mut t_end = t_start;
    for entry in &entries[start_idx..end_idx] {
        match entry.op {
            CigarOp::Match | CigarOp::Mismatch => {
                q_end += entry.count;
                t_end += entry.count;
            }
            CigarOp::Insertion => q_end += entry.count,
            CigarOp::Deletion => t_end += entry.count,
        }
    }

    (q_start, q_end, t_start, t_end)
}

/// Three parallel alignment lines (query, match symbols, target) plus
/// column/match/gap counts, built by walking the CIGAR's interior.
struct AlignmentLines {
    query_line: Vec<u8>,
    match_line: Vec<u8>,
    target_line: Vec<u8>,
    columns: usize,
    matches: usize,
    gaps: usize,
}

fn build_alignment_lines(query: &[u8], target: &[u8], cigar: &Cigar) -> AlignmentLines {
    let entries = cigar.entries();
    let (q_start, _, t_start, _) = interior_bounds(cigar);

    let mut start_idx = 0;
    if let Some(first) = entries.first() {
        if matches!(first.op, CigarOp::Insertion | CigarOp::Deletion) {
            start_idx = 1;
        }
    }
    let mut end_idx = entries.len();
    if end_idx > start_idx {
        if let Some(last) = entries.get(end_idx - 1) {
            if matches!(last.op, CigarOp::Insertion | CigarOp::Deletion) {
                end_idx -= 1;
            }
        }
    }

    let mut query_line = Vec::new();
    let mut match_line = Vec::new();
    let mut target_line = Vec::new();
    let mut matches = 0usize;
    let mut gaps = 0usize;
    let mut q_pos = q_start;
    let mut t_pos = t_start;

    for entry in &entries[start_idx..end_idx] {
        match entry.op {
            CigarOp::Match => {
                for _ in 0..entry.count {
                    let qb = query[q_pos];
                    let tb = target[t_pos];
                    query_line.push(qb);
                    target_line.push(tb);
                    if qb == tb {
                        match_line.push(b'|');
                        matches += 1;
                    } else {
                        // A "Match" op whose symbols actually differ is an
                        // aligner invariant violation; keep displaying but
                        // flag it rather than aborting the run.
                        eprintln!(
                            "warning: Match op at query position {q_pos} does not match ({} vs {})",
                            qb as char, tb as char
                        );
                        match_line.push(b'X');
                    }
                    q_pos += 1;
                    t_pos += 1;
                }
            }
            CigarOp::Mismatch => {
                for _ in 0..entry.count {
                    query_line.push(query[q_pos]);
                    target_line.push(target[t_pos]);
                    match_line.push(b' ');
                    q_pos += 1;
                    t_pos += 1;
                }
            }
            CigarOp::Insertion => {
                for _ in 0..entry.count {
                    query_line.push(query[q_pos]);
                    target_line.push(b'-');
                    match_line.push(b' ');
                    q_pos += 1;
                    gaps += 1;
                }
            }
            CigarOp::Deletion => {
                for _ in 0..entry.count {
                    query_line.push(b'-');
                    target_line.push(target[t_pos]);
                    match_line.push(b' ');
                    t_pos += 1;
                    gaps += 1;
                }
            }
        }
    }

    let columns = query_line.len();
    AlignmentLines {
        query_line,
        match_line,
        target_line,
        columns,
        matches,
        gaps,
    }
}

/// Human-readable alignment report, one block per query.
pub struct TextReportWriter<W: Write> {
    inner: W,
}

impl<W: Write> TextReportWriter<W> {
    pub fn new(inner: W) -> Self {
        Self { inner }
    }
}

impl<A: Alphabet, W: Write> HitWriter<A> for TextReportWriter<W> {
    fn write_hits(
        &mut self,
        query: &Sequence<A>,
        db: &Database<A>,
        hits: &[Hit],
    ) -> Result<(), NsearchError> {
        writeln!(self.inner, "Query >{}", query.identifier)?;

        if hits.is_empty() {
            writeln!(self.inner, "No hits found")?;
            writeln!(self.inner)?;
            return Ok(());
        }

        writeln!(self.inner, "{:>6} {:>6}  Target", "%Id", "TLen")?;
        for hit in hits {
            let target = &db.sequences[hit.target];
            writeln!(
                self.inner,
                "{:>5.1}% {:>6}  {}",
                hit.cigar.identity() * 100.0,
                target.len(),
                target.identifier
            )?;
        }
        writeln!(self.inner)?;

        for hit in hits {
            let target = &db.sequences[hit.target];
            writeln!(self.inner, "Query {}nt >{}", query.len(), query.identifier)?;
            writeln!(self.inner, "Target {}nt >{}", target.len(), target.identifier)?;
            writeln!(self.inner)?;

            let lines = build_alignment_lines(&query.symbols, &target.symbols, &hit.cigar);
            for chunk_start in (0..lines.columns).step_by(MAX_ALIGNMENT_LINE_LENGTH) {
                let chunk_end = (chunk_start + MAX_ALIGNMENT_LINE_LENGTH).min(lines.columns);
                writeln!(
                    self.inner,
                    "Qry {}",
                    std::str::from_utf8(&lines.query_line[chunk_start..chunk_end]).unwrap_or("?")
                )?;
                writeln!(
                    self.inner,
                    "    {}",
                    std::str::from_utf8(&lines.match_line[chunk_start..chunk_end]).unwrap_or("?")
                )?;
                writeln!(
                    self.inner,
                    "Tgt {}",
                    std::str::from_utf8(&lines.target_line[chunk_start..chunk_end]).unwrap_or("?")
                )?;
                writeln!(self.inner)?;
            }

            let ident_pct = if lines.columns == 0 {
                0.0
            } else {
                100.0 * lines.matches as f64 / lines.columns as f64
            };
            let gap_pct = if lines.columns == 0 {
                0.0
            } else {
                100.0 * lines.gaps as f64 / lines.columns as f64
            };
            writeln!(
                self.inner,
                "{} cols, {} ids ({:.1}%), {} gaps ({:.1}%)",
                lines.columns, lines.matches, ident_pct, lines.gaps, gap_pct
            )?;
            writeln!(self.inner)?;
        }

        Ok(())
    }
}

/// SAM-style single-letter CIGAR code, distinct from [`crate::cigar::Cigar`]'s
/// own `Display` (`M`/`X`/`I`/`D`): the CSV `Alignment` column uses `=` for a
/// match rather than `M`.
fn sam_style_cigar(cigar: &Cigar) -> String {
    let mut out = String::new();
    for CigarEntry { count, op } in cigar.entries() {
        let c = match op {
            CigarOp::Match => '=',
            CigarOp::Mismatch => 'X',
            CigarOp::Insertion => 'I',
            CigarOp::Deletion => 'D',
        };
        out.push_str(&count.to_string());
        out.push(c);
    }
    out
}

fn csv_field(value: &str) -> String {
    if value.contains(',') || value.contains('"') || value.contains('\n') {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

/// CSV hit table: `QueryId,TargetId,QueryMatchStart,QueryMatchEnd,
/// TargetMatchStart,TargetMatchEnd,QueryMatchSeq,TargetMatchSeq,NumColumns,
/// NumMatches,NumMismatches,NumGaps,Identity,Alignment`.
pub struct CsvWriter<W: Write> {
    inner: W,
    header_written: bool,
}

impl<W: Write> CsvWriter<W> {
    pub fn new(inner: W) -> Self {
        Self {
            inner,
            header_written: false,
        }
    }

    fn write_header(&mut self) -> Result<(), NsearchError> {
        writeln!(
            self.inner,
            "QueryId,TargetId,QueryMatchStart,QueryMatchEnd,TargetMatchStart,TargetMatchEnd,\
QueryMatchSeq,TargetMatchSeq,NumColumns,NumMatches,NumMismatches,NumGaps,Identity,Alignment"
        )?;
        self.header_written = true;
        Ok(())
    }
}

impl<A: Alphabet, W: Write> HitWriter<A> for CsvWriter<W> {
    fn write_hits(
        &mut self,
        query: &Sequence<A>,
        db: &Database<A>,
        hits: &[Hit],
    ) -> Result<(), NsearchError> {
        if !self.header_written {
            self.write_header()?;
        }

        for hit in hits {
            let target = &db.sequences[hit.target];
            let (q_start, q_end, t_start, t_end) = interior_bounds(&hit.cigar);
            let lines = build_alignment_lines(&query.symbols, &target.symbols, &hit.cigar);

            let num_mismatches = hit
                .cigar
                .entries()
                .iter()
                .filter(|e| e.op == CigarOp::Mismatch)
                .map(|e| e.count)
                .sum::<usize>();

            writeln!(
                self.inner,
                "{},{},{},{},{},{},{},{},{},{},{},{},{:.4},{}",
                csv_field(&query.identifier),
                csv_field(&target.identifier),
                q_start,
                q_end.saturating_sub(1),
                t_start,
                t_end.saturating_sub(1),
                String::from_utf8_lossy(&lines.query_line),
                String::from_utf8_lossy(&lines.target_line),
                lines.columns,
                lines.matches,
                num_mismatches,
                lines.gaps,
                hit.cigar.identity(),
                sam_style_cigar(&hit.cigar),
            )?;
        }

        Ok(())
    }
}

/// One row of the optional JSON hit report, mirroring the CSV columns.
#[derive(serde::Serialize)]
struct JsonHit {
    query_id: String,
    target_id: String,
    query_match_start: usize,
    query_match_end: usize,
    target_match_start: usize,
    target_match_end: usize,
    num_columns: usize,
    num_matches: usize,
    num_mismatches: usize,
    num_gaps: usize,
    identity: f64,
    alignment: String,
}

/// Newline-delimited JSON hit report: one `JsonHit` object per line, so the
/// output streams the same way the text/CSV writers do rather than
/// buffering the whole run into one JSON array.
pub struct JsonReportWriter<W: Write> {
    inner: W,
}

impl<W: Write> JsonReportWriter<W> {
    pub fn new(inner: W) -> Self {
        Self { inner }
    }
}

impl<A: Alphabet, W: Write> HitWriter<A> for JsonReportWriter<W> {
    fn write_hits(
        &mut self,
        query: &Sequence<A>,
        db: &Database<A>,
        hits: &[Hit],
    ) -> Result<(), NsearchError> {
        for hit in hits {
            let target = &db.sequences[hit.target];
            let (q_start, q_end, t_start, t_end) = interior_bounds(&hit.cigar);
            let num_mismatches = hit
                .cigar
                .entries()
                .iter()
                .filter(|e| e.op == CigarOp::Mismatch)
                .map(|e| e.count)
                .sum::<usize>();
            let lines = build_alignment_lines(&query.symbols, &target.symbols, &hit.cigar);

            let row = JsonHit {
                query_id: query.identifier.clone(),
                target_id: target.identifier.clone(),
                query_match_start: q_start,
                query_match_end: q_end.saturating_sub(1),
                target_match_start: t_start,
                target_match_end: t_end.saturating_sub(1),
                num_columns: lines.columns,
                num_matches: lines.matches,
                num_mismatches,
                num_gaps: lines.gaps,
                identity: hit.cigar.identity(),
                alignment: sam_style_cigar(&hit.cigar),
            };
            serde_json::to_writer(&mut self.inner, &row)?;
            writeln!(self.inner)?;
        }
        Ok(())
    }
}
