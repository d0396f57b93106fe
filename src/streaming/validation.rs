//! Sort validation for streaming operations.
//!
//! Windowing requires input sorted by reference ordinal, then position.
//! Sort validation checks that:
//! 1. Reference ordinals never decrease (each reference is contiguous and
//!    references follow header order)
//! 2. Within a reference, positions are non-decreasing

use std::path::Path;

use crate::config::ReadMode;
use crate::error::{Result, SlideError};
use crate::reader::AlignmentReader;
use crate::reference::References;
use crate::source::{Alignment, AlignmentSource};

/// Inline sort validator for use within streaming loops.
///
/// Validates records as they are processed, so the input is read once.
/// Unplaced and unmapped records are not checked. Callers pass the 1-based
/// number of the record in the stream, which only appears in error messages.
#[derive(Debug, Default)]
pub struct SortValidator {
    prev_tid: Option<usize>,
    prev_pos: Option<u64>,
}

impl SortValidator {
    /// Create a new sort validator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate that a placed, mapped record maintains sort order.
    #[inline]
    pub fn validate(
        &mut self,
        record: usize,
        tid: usize,
        pos: u64,
        references: &References,
    ) -> Result<()> {
        self.check_reference(record, tid, references)?;

        if let Some(prev_pos) = self.prev_pos {
            if pos < prev_pos {
                return Err(SlideError::OrderingViolation(format!(
                    "position {} at record {} comes after {} on {}",
                    pos + 1,
                    record,
                    prev_pos + 1,
                    reference_label(references, tid)
                )));
            }
        }

        self.prev_pos = Some(pos);
        Ok(())
    }

    /// Check only that the reference ordinal does not go backwards.
    ///
    /// Moving to a later reference forgets the last accepted position.
    #[inline]
    pub fn check_reference(
        &mut self,
        record: usize,
        tid: usize,
        references: &References,
    ) -> Result<()> {
        if let Some(prev_tid) = self.prev_tid {
            if tid < prev_tid {
                return Err(SlideError::OrderingViolation(format!(
                    "reference '{}' at record {} appears after '{}'",
                    reference_label(references, tid),
                    record,
                    reference_label(references, prev_tid)
                )));
            }
            if tid > prev_tid {
                self.prev_pos = None;
            }
        }
        self.prev_tid = Some(tid);
        Ok(())
    }

    /// Forget the last accepted position, keeping the reference.
    pub fn reset_position(&mut self) {
        self.prev_pos = None;
    }
}

fn reference_label(references: &References, tid: usize) -> String {
    references
        .name(tid)
        .map(str::to_string)
        .unwrap_or_else(|| format!("#{}", tid))
}

/// Verify that a SAM/BAM file (or stdin, as `-`) is coordinate sorted.
///
/// Returns the number of records checked.
///
/// # Example
///
/// ```rust,no_run
/// use samslider::streaming::verify_sorted;
/// use samslider::ReadMode;
///
/// verify_sorted("input.bam", ReadMode::Auto).expect("File must be sorted");
/// ```
pub fn verify_sorted<P: AsRef<Path>>(path: P, mode: ReadMode) -> Result<usize> {
    let reader = AlignmentReader::open(path, mode)?;
    verify_sorted_source(reader)
}

/// Verify sort order of any record source.
pub fn verify_sorted_source<S: AlignmentSource>(mut source: S) -> Result<usize> {
    let mut validator = SortValidator::new();
    let mut total = 0;

    while let Some(record) = source.next() {
        let record = record?;
        total += 1;
        if record.is_unmapped() {
            continue;
        }
        if let Some(tid) = record.reference_id() {
            validator.validate(total, tid, record.position(), source.references())?;
        }
    }

    Ok(total)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const HEADER: &str = "@SQ\tSN:chr1\tLN:1000\n@SQ\tSN:chr2\tLN:1000\n";

    fn create_temp_sam(body: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(HEADER.as_bytes()).unwrap();
        file.write_all(body.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }

    fn line(name: &str, flag: u16, rname: &str, pos: u64) -> String {
        format!("{}\t{}\t{}\t{}\t60\t4M\t*\t0\t0\tACGT\tIIII\n", name, flag, rname, pos)
    }

    fn refs() -> References {
        References::from_pairs([("chr1", 1000), ("chr2", 1000)])
    }

    #[test]
    fn test_verify_sorted_valid() {
        let body = [
            line("a", 0, "chr1", 10),
            line("b", 0, "chr1", 10),
            line("c", 0, "chr2", 1),
            line("u", 4, "*", 0),
        ]
        .concat();
        let file = create_temp_sam(&body);
        assert_eq!(verify_sorted(file.path(), ReadMode::Auto).unwrap(), 4);
    }

    #[test]
    fn test_verify_sorted_invalid_position() {
        let body = [line("a", 0, "chr1", 200), line("b", 0, "chr1", 100)].concat();
        let file = create_temp_sam(&body);
        let err = verify_sorted(file.path(), ReadMode::Sam).unwrap_err();
        assert!(err.is_ordering_violation());
        assert!(err.to_string().contains("position 100"));
    }

    #[test]
    fn test_verify_sorted_reference_revisited() {
        let body = [
            line("a", 0, "chr1", 10),
            line("b", 0, "chr2", 10),
            line("c", 0, "chr1", 20),
        ]
        .concat();
        let file = create_temp_sam(&body);
        let err = verify_sorted(file.path(), ReadMode::Sam).unwrap_err();
        assert!(err.to_string().contains("'chr1'"));
    }

    #[test]
    fn test_unmapped_positions_ignored() {
        let body = [
            line("a", 0, "chr1", 500),
            line("u", 4, "chr1", 3),
            line("b", 0, "chr1", 600),
        ]
        .concat();
        let file = create_temp_sam(&body);
        assert!(verify_sorted(file.path(), ReadMode::Sam).is_ok());
    }

    #[test]
    fn test_error_names_stream_record() {
        // the unmapped record still counts towards the record number
        let body = [
            line("a", 0, "chr1", 200),
            line("u", 4, "*", 0),
            line("b", 0, "chr1", 100),
        ]
        .concat();
        let file = create_temp_sam(&body);
        let err = verify_sorted(file.path(), ReadMode::Sam).unwrap_err();
        assert!(err.to_string().contains("at record 3"), "{}", err);
    }

    #[test]
    fn test_sort_validator() {
        let refs = refs();
        let mut validator = SortValidator::new();
        assert!(validator.validate(1, 0, 100, &refs).is_ok());
        assert!(validator.validate(2, 0, 200, &refs).is_ok());
        assert!(validator.validate(3, 1, 5, &refs).is_ok());

        let err = validator.validate(4, 1, 4, &refs).unwrap_err();
        assert!(err.to_string().contains("position 5 at record 4 comes after 6 on chr2"));
    }

    #[test]
    fn test_check_reference() {
        let refs = refs();
        let mut validator = SortValidator::new();
        validator.validate(1, 0, 500, &refs).unwrap();
        assert!(validator.check_reference(2, 1, &refs).is_ok());
        // a new reference starts from any position
        assert!(validator.validate(3, 1, 3, &refs).is_ok());
        let err = validator.check_reference(9, 0, &refs).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Input not sorted: reference 'chr1' at record 9 appears after 'chr2'"
        );
    }

    #[test]
    fn test_reset_position() {
        let refs = refs();
        let mut validator = SortValidator::new();
        validator.validate(1, 0, 100, &refs).unwrap();
        validator.reset_position();
        assert!(validator.validate(2, 0, 1, &refs).is_ok());
    }
}
