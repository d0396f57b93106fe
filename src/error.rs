//! Error type shared by the reader, the validator and the slider.

use std::io;
use thiserror::Error;

/// Errors that can occur while reading alignments or sliding windows over them.
#[derive(Error, Debug)]
pub enum SlideError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Parse error at line {line}: {message}")]
    Parse { line: usize, message: String },

    #[error("Invalid alignment input: {0}")]
    InvalidFormat(String),

    /// A record the SAM/BAM decoder rejected. `record` is 1-based and
    /// counts alignment records only, not header lines.
    #[error("Invalid record {record}: {message}")]
    InvalidRecord { record: usize, message: String },

    /// Rejected slider options (window size or step below 1, ...).
    #[error("Invalid configuration: {0}")]
    Configuration(String),

    /// The record stream is not sorted by (reference, position).
    #[error("Input not sorted: {0}")]
    OrderingViolation(String),

    #[error("Reference id {0} is not present in the reference list")]
    UnknownReference(usize),
}

impl SlideError {
    /// True for errors caused by unsorted input.
    pub fn is_ordering_violation(&self) -> bool {
        matches!(self, SlideError::OrderingViolation(_))
    }
}

pub type Result<T> = std::result::Result<T, SlideError>;
