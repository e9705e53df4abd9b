//! FASTA reader/writer, grounded in the `bio::io::fasta::Reader` +
//! `.records()` iterator pattern the teacher uses in `reader.rs`.
//!
//! Unlike the teacher, which collects the whole iterator into a `Vec`, this
//! wraps the `Records` iterator directly behind [`super::SequenceReader`]'s
//! one-record-at-a-time pull contract. Writing diverges from
//! `bio::io::fasta::Writer` (which emits the whole sequence on one line):
//! the contract wraps the symbol body at 60 columns, so the writer is
//! hand-rolled.

use std::io::{Read, Write};

use bio::io::fasta;
use bytes::Bytes;

use crate::alphabet::Alphabet;
use crate::error::NsearchError;
use crate::sequence::Sequence;

use super::{SequenceReader, SequenceWriter};

const WRAP_WIDTH: usize = 60;

/// Reads `>identifier` records, upper-casing symbols on the way out.
pub struct FastaReader<R: Read, A: Alphabet> {
    records: fasta::Records<R>,
    eof: bool,
    _alphabet: std::marker::PhantomData<A>,
}

impl<R: Read, A: Alphabet> FastaReader<R, A> {
    pub fn new(reader: R) -> Self {
        Self {
            records: fasta::Reader::new(reader).records(),
            eof: false,
            _alphabet: std::marker::PhantomData,
        }
    }
}

impl<R: Read, A: Alphabet> SequenceReader<A> for FastaReader<R, A> {
    fn next_record(&mut self) -> Result<Option<Sequence<A>>, NsearchError> {
        match self.records.next() {
            None => {
                self.eof = true;
                Ok(None)
            }
            Some(Err(source)) => Err(NsearchError::SequenceRead {
                source,
                path: std::path::PathBuf::new(),
            }),
            Some(Ok(record)) => {
                let symbols: Vec<u8> = record.seq().iter().map(|b| b.to_ascii_uppercase()).collect();
                Ok(Some(Sequence::new(record.id(), Bytes::from(symbols), None)))
            }
        }
    }

    fn is_eof(&self) -> bool {
        self.eof
    }
}

/// Writes `>identifier` records, wrapping the symbol body at 60 columns.
pub struct FastaWriter<W: Write> {
    inner: W,
}

impl<W: Write> FastaWriter<W> {
    pub fn new(inner: W) -> Self {
        Self { inner }
    }
}

impl<W: Write, A: Alphabet> SequenceWriter<A> for FastaWriter<W> {
    fn write_record(&mut self, seq: &Sequence<A>) -> Result<(), NsearchError> {
        writeln!(self.inner, ">{}", seq.identifier)?;
        for chunk in seq.symbols.chunks(WRAP_WIDTH) {
            self.inner.write_all(chunk)?;
            writeln!(self.inner)?;
        }
        Ok(())
    }
}
