//! Reference sequence metadata: names and lengths indexed by ordinal.
//!
//! Built from the `@SQ` records of a SAM/BAM header, or from a .genome file
//! (tab-delimited: name\tlength) when the header must be overridden.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::num::NonZeroUsize;
use std::path::Path;

use noodles::sam;
use noodles::sam::header::record::value::map::ReferenceSequence;
use noodles::sam::header::record::value::Map;
use rustc_hash::FxHashMap;

use crate::error::{Result, SlideError};

/// Ordered reference sequences.
/// The ordinal of a sequence is its position in input order.
#[derive(Debug, Clone, Default)]
pub struct References {
    names: Vec<String>,
    lengths: Vec<u64>,
    index: FxHashMap<String, usize>,
}

impl References {
    /// Create an empty reference list.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from `(name, length)` pairs in order.
    pub fn from_pairs<I, S>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (S, u64)>,
        S: Into<String>,
    {
        let mut refs = Self::new();
        for (name, length) in pairs {
            refs.insert(name.into(), length);
        }
        refs
    }

    /// Load references from a .genome file.
    pub fn from_genome_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path)?;
        let reader = BufReader::new(file);
        let mut refs = Self::new();

        for (line_num, line_result) in reader.lines().enumerate() {
            let line = line_result?;
            let line = line.trim();

            // Skip empty lines and comments
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let fields: Vec<&str> = line.split('\t').collect();
            if fields.len() < 2 {
                return Err(SlideError::Parse {
                    line: line_num + 1,
                    message: "Genome file requires two columns: name and length".to_string(),
                });
            }

            let length: u64 = fields[1].parse().map_err(|_| SlideError::Parse {
                line: line_num + 1,
                message: format!("Invalid sequence length: {}", fields[1]),
            })?;

            refs.insert(fields[0].to_string(), length);
        }

        Ok(refs)
    }

    /// Read the `@SQ` records of a SAM/BAM header, in header order.
    pub fn from_header(header: &sam::Header) -> Self {
        Self::from_pairs(header.reference_sequences().iter().map(|(name, map)| {
            (
                String::from_utf8_lossy(name).into_owned(),
                map.length().get() as u64,
            )
        }))
    }

    /// Build a header declaring exactly these sequences.
    ///
    /// Used to resolve record reference names against a genome file
    /// instead of the input's own header.
    pub fn to_header(&self) -> Result<sam::Header> {
        let mut builder = sam::Header::builder();
        for (name, &length) in self.names.iter().zip(&self.lengths) {
            let length = usize::try_from(length)
                .ok()
                .and_then(NonZeroUsize::new)
                .ok_or_else(|| {
                    SlideError::InvalidFormat(format!(
                        "reference '{}' needs a positive length, got {}",
                        name, length
                    ))
                })?;
            builder = builder
                .add_reference_sequence(name.as_str(), Map::<ReferenceSequence>::new(length));
        }
        Ok(builder.build())
    }

    /// Add a sequence. A repeated name updates the length in place.
    pub fn insert(&mut self, name: String, length: u64) {
        match self.index.get(&name) {
            Some(&tid) => self.lengths[tid] = length,
            None => {
                self.index.insert(name.clone(), self.names.len());
                self.names.push(name);
                self.lengths.push(length);
            }
        }
    }

    /// Name of the sequence with the given ordinal.
    #[inline]
    pub fn name(&self, tid: usize) -> Option<&str> {
        self.names.get(tid).map(String::as_str)
    }

    /// Length of the sequence with the given ordinal.
    #[inline]
    pub fn length(&self, tid: usize) -> Option<u64> {
        self.lengths.get(tid).copied()
    }

    /// Ordinal of a sequence name.
    #[inline]
    pub fn tid(&self, name: &str) -> Option<usize> {
        self.index.get(name).copied()
    }

    /// All sequence names in order.
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// All sequence lengths in order.
    pub fn lengths(&self) -> &[u64] {
        &self.lengths
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}
