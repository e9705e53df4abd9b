//! Sequence and hit-report I/O: pull readers, push writers.
//!
//! The core never touches a file handle directly — it's handed sequences
//! through [`SequenceReader`] and emits them through [`SequenceWriter`] /
//! [`report::HitWriter`], matching the reader/writer pull/push contracts.

pub mod fasta;
pub mod fastq;
pub mod report;

use std::fs::File;
use std::io::{Read, Write};

use crate::alphabet::Alphabet;
use crate::error::NsearchError;
use crate::input::Input;
use crate::sequence::Sequence;

/// Opens `input` for reading: `stdin` for [`Input::Stdin`], transparently
/// gzip-decompressed when the path ends in `.gz` and the `gzip` feature is
/// enabled, otherwise a plain file handle.
pub fn open_reader(input: &Input) -> Result<Box<dyn Read>, NsearchError> {
    let path = match input {
        Input::Stdin => return Ok(Box::new(std::io::stdin())),
        Input::File(path) => path,
    };

    let file = File::open(path).map_err(|source| NsearchError::SequenceRead {
        source,
        path: path.clone(),
    })?;

    #[cfg(feature = "gzip")]
    {
        if path.extension().and_then(std::ffi::OsStr::to_str) == Some("gz") {
            return Ok(Box::new(flate2::read::MultiGzDecoder::new(file)));
        }
    }

    Ok(Box::new(file))
}

/// Opens `output` for writing: `stdout` for [`Input::Stdin`] (the `-` marker
/// doubling as "write to stdout" for output paths), otherwise a plain file.
pub fn open_writer(output: &Input) -> Result<Box<dyn Write>, NsearchError> {
    match output {
        Input::Stdin => Ok(Box::new(std::io::stdout())),
        Input::File(path) => {
            let file = File::create(path)?;
            Ok(Box::new(file))
        }
    }
}

/// Pull interface: one record at a time, or up to `n` in a batch.
pub trait SequenceReader<A: Alphabet> {
    /// Reads the next record, or `None` at end of input.
    fn next_record(&mut self) -> Result<Option<Sequence<A>>, NsearchError>;

    /// Reads up to `n` records, returning fewer at end of input.
    fn read(&mut self, n: usize) -> Result<Vec<Sequence<A>>, NsearchError> {
        let mut out = Vec::with_capacity(n);
        for _ in 0..n {
            match self.next_record()? {
                Some(seq) => out.push(seq),
                None => break,
            }
        }
        Ok(out)
    }

    /// `true` once the underlying source is exhausted.
    fn is_eof(&self) -> bool;
}

/// Push interface: one record at a time, format-driven serialization.
pub trait SequenceWriter<A: Alphabet> {
    fn write_record(&mut self, seq: &Sequence<A>) -> Result<(), NsearchError>;
}
