//! FASTQ reader/writer, grounded in the `bio::io::fastq::Reader` +
//! `.records()` iterator pattern, mirroring [`super::fasta`].
//!
//! Quality is carried through verbatim (Phred+33 ASCII); no rescaling
//! happens here, that's [`crate::qscore`]'s job.

use std::io::{Read, Write};

use bio::io::fastq;
use bytes::Bytes;

use crate::alphabet::Alphabet;
use crate::error::NsearchError;
use crate::sequence::Sequence;

use super::{SequenceReader, SequenceWriter};

pub struct FastqReader<R: Read, A: Alphabet> {
    records: fastq::Records<R>,
    eof: bool,
    _alphabet: std::marker::PhantomData<A>,
}

impl<R: Read, A: Alphabet> FastqReader<R, A> {
    pub fn new(reader: R) -> Self {
        Self {
            records: fastq::Reader::new(reader).records(),
            eof: false,
            _alphabet: std::marker::PhantomData,
        }
    }
}

impl<R: Read, A: Alphabet> SequenceReader<A> for FastqReader<R, A> {
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
                if record.qual().len() != record.seq().len() {
                    return Err(NsearchError::SequenceParse {
                        details: format!(
                            "quality length {} does not match symbol length {} for '{}'",
                            record.qual().len(),
                            record.seq().len(),
                            record.id()
                        ),
                    });
                }
                let symbols: Vec<u8> = record.seq().iter().map(|b| b.to_ascii_uppercase()).collect();
                let quality = Bytes::from(record.qual().to_vec());
                Ok(Some(Sequence::new(record.id(), Bytes::from(symbols), Some(quality))))
            }
        }
    }

    fn is_eof(&self) -> bool {
        self.eof
    }
}

pub struct FastqWriter<W: Write> {
    inner: W,
}

impl<W: Write> FastqWriter<W> {
    pub fn new(inner: W) -> Self {
        Self { inner }
    }
}

impl<W: Write, A: Alphabet> SequenceWriter<A> for FastqWriter<W> {
    fn write_record(&mut self, seq: &Sequence<A>) -> Result<(), NsearchError> {
        let quality = seq.quality.as_ref().ok_or_else(|| NsearchError::SequenceParse {
            details: format!("sequence '{}' has no quality scores to write as FASTQ", seq.identifier),
        })?;
        writeln!(self.inner, "@{}", seq.identifier)?;
        self.inner.write_all(&seq.symbols)?;
        writeln!(self.inner)?;
        writeln!(self.inner, "+")?;
        self.inner.write_all(quality)?;
        writeln!(self.inner)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alphabet::Dna;

    #[test]
    fn reads_single_record() {
        let data = b"@seq1\nacgt\n+\nIIII\n";
        let mut reader = FastqReader::<_, Dna>::new(&data[..]);
        let record = reader.next_record().unwrap().unwrap();
        assert_eq!(record.identifier, "seq1");
        assert_eq!(&record.symbols[..], b"ACGT");
        assert_eq!(record.quality.unwrap().as_ref(), b"IIII");
        assert!(reader.next_record().unwrap().is_none());
        assert!(reader.is_eof());
    }

    #[test]
    fn rejects_mismatched_quality_length() {
        let data = b"@seq1\nACGT\n+\nIII\n";
        let mut reader = FastqReader::<_, Dna>::new(&data[..]);
        assert!(reader.next_record().is_err());
    }

    #[test]
    fn reads_multiple_records() {
        let data = b"@a\nACGT\n+\nIIII\n@b\nTTTT\n+\nJJJJ\n";
        let mut reader = FastqReader::<_, Dna>::new(&data[..]);
        let r1 = reader.next_record().unwrap().unwrap();
        assert_eq!(r1.identifier, "a");
        let r2 = reader.next_record().unwrap().unwrap();
        assert_eq!(r2.identifier, "b");
        assert!(reader.next_record().unwrap().is_none());
    }

    #[test]
    fn round_trips_through_writer() {
        let seq = Sequence::<Dna>::new("q1", Bytes::from_static(b"ACGT"), Some(Bytes::from_static(b"IIII")));
        let mut out = Vec::new();
        {
            let mut writer = FastqWriter::new(&mut out);
            writer.write_record(&seq).unwrap();
        }
        assert_eq!(out, b"@q1\nACGT\n+\nIIII\n");
    }
}
