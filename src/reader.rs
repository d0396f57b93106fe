//! SAM/BAM alignment reader.
//!
//! Decoding is done by `noodles`. The reader consumes the header on
//! construction, turns its `@SQ` records into [`References`], then yields one
//! [`AlignmentRecord`] per alignment.

use std::fmt;
use std::fs::File;
use std::io::{self, BufRead, BufReader, Read};
use std::path::Path;

use log::debug;
use noodles::sam::alignment::RecordBuf;
use noodles::{bam, sam};

use crate::config::ReadMode;
use crate::error::{Result, SlideError};
use crate::record::AlignmentRecord;
use crate::reference::References;
use crate::source::AlignmentSource;
use crate::streaming::buffers::DEFAULT_INPUT_BUFFER;

/// BAM is BGZF compressed, and every BGZF block opens with the gzip magic.
const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

/// Concrete encoding of the input stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Sam,
    Bam,
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Format::Sam => "SAM",
            Format::Bam => "BAM",
        })
    }
}

/// Record-at-a-time decoding shared by the SAM and BAM readers.
trait DecodeRecord {
    fn decode(&mut self, header: &sam::Header, record: &mut RecordBuf) -> io::Result<usize>;
}

impl<R: BufRead> DecodeRecord for sam::io::Reader<R> {
    fn decode(&mut self, header: &sam::Header, record: &mut RecordBuf) -> io::Result<usize> {
        self.read_record_buf(header, record)
    }
}

impl<R: Read> DecodeRecord for bam::io::Reader<R> {
    fn decode(&mut self, header: &sam::Header, record: &mut RecordBuf) -> io::Result<usize> {
        self.read_record_buf(header, record)
    }
}

/// A streaming SAM or BAM reader.
pub struct AlignmentReader {
    decoder: Box<dyn DecodeRecord>,
    header: sam::Header,
    references: References,
    format: Format,
    /// Alignment records decoded so far.
    record_number: usize,
}

impl AlignmentReader {
    /// Open a path, or stdin when the path is `-`.
    pub fn open<P: AsRef<Path>>(path: P, mode: ReadMode) -> Result<Self> {
        let path = path.as_ref();
        if path.as_os_str() == "-" {
            Self::new(io::stdin(), mode)
        } else {
            Self::new(File::open(path)?, mode)
        }
    }

    /// Create a reader over any byte stream and consume its header.
    ///
    /// With [`ReadMode::Auto`] the format is sniffed from the first bytes.
    pub fn new<R: Read + 'static>(reader: R, mode: ReadMode) -> Result<Self> {
        let mut input: Box<dyn BufRead> =
            Box::new(BufReader::with_capacity(DEFAULT_INPUT_BUFFER, reader));

        let format = match mode {
            ReadMode::Sam => Format::Sam,
            ReadMode::Bam => Format::Bam,
            ReadMode::Auto => detect_format(&mut input)?,
        };

        let (decoder, header): (Box<dyn DecodeRecord>, sam::Header) = match format {
            Format::Sam => {
                let mut reader = sam::io::Reader::new(input);
                let header = reader
                    .read_header()
                    .map_err(|e| header_error(format, e))?;
                (Box::new(reader), header)
            }
            Format::Bam => {
                let mut reader = bam::io::Reader::new(input);
                let header = reader
                    .read_header()
                    .map_err(|e| header_error(format, e))?;
                (Box::new(reader), header)
            }
        };

        let references = References::from_header(&header);
        debug!(
            "Reading {} input with {} reference sequences",
            format,
            references.len()
        );

        Ok(Self {
            decoder,
            header,
            references,
            format,
            record_number: 0,
        })
    }

    /// Replace the header's reference list, e.g. with one from a genome file.
    ///
    /// Record reference names are resolved against the new list.
    pub fn with_references(mut self, references: References) -> Result<Self> {
        self.header = references.to_header()?;
        self.references = references;
        Ok(self)
    }

    /// Format being decoded.
    pub fn format(&self) -> Format {
        self.format
    }

    /// Read the next alignment record.
    pub fn read_record(&mut self) -> Result<Option<AlignmentRecord>> {
        let mut record = RecordBuf::default();
        match self.decoder.decode(&self.header, &mut record) {
            Ok(0) => Ok(None),
            Ok(_) => {
                self.record_number += 1;
                Ok(Some(AlignmentRecord::from(record)))
            }
            Err(e) => Err(self.record_error(e)),
        }
    }

    fn record_error(&self, e: io::Error) -> SlideError {
        match e.kind() {
            io::ErrorKind::InvalidData | io::ErrorKind::UnexpectedEof => {
                SlideError::InvalidRecord {
                    record: self.record_number + 1,
                    message: e.to_string(),
                }
            }
            _ => SlideError::Io(e),
        }
    }
}

/// Peek at the buffered input without consuming it.
fn detect_format(input: &mut dyn BufRead) -> Result<Format> {
    let head = input.fill_buf()?;
    if head.starts_with(&GZIP_MAGIC) {
        Ok(Format::Bam)
    } else {
        Ok(Format::Sam)
    }
}

fn header_error(format: Format, e: io::Error) -> SlideError {
    match e.kind() {
        io::ErrorKind::InvalidData | io::ErrorKind::UnexpectedEof => {
            SlideError::InvalidFormat(format!("{} header: {}", format, e))
        }
        _ => SlideError::Io(e),
    }
}

impl Iterator for AlignmentReader {
    type Item = Result<AlignmentRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        match self.read_record() {
            Ok(Some(record)) => Some(Ok(record)),
            Ok(None) => None,
            Err(e) => Some(Err(e)),
        }
    }
}

impl AlignmentSource for AlignmentReader {
    type Record = AlignmentRecord;

    fn references(&self) -> &References {
        &self.references
    }
}
