//! Alignment record type produced by the SAM/BAM reader.

use std::fmt;

pub use noodles::sam::alignment::record::Flags;
use noodles::sam::alignment::RecordBuf;

use crate::source::Alignment;

/// MAPQ reported when the record carries none (SAM `255`).
pub const MISSING_MAPQ: u8 = 255;

/// One alignment, with the fields windowing needs decoded up front.
///
/// The reference is resolved to its ordinal in the header (`None` when
/// unplaced) and the position is 0-based. The decoded record (CIGAR, mate
/// fields, sequence, qualities and tags) is carried through untouched in
/// `record`.
#[derive(Debug, Clone)]
pub struct AlignmentRecord {
    pub name: String,
    pub flags: Flags,
    pub reference_id: Option<usize>,
    pub position: u64,
    pub mapq: u8,
    pub record: RecordBuf,
}

impl AlignmentRecord {
    /// Create a minimal mapped record with an empty backing record.
    pub fn new(name: impl Into<String>, reference_id: usize, position: u64) -> Self {
        Self {
            name: name.into(),
            flags: Flags::empty(),
            reference_id: Some(reference_id),
            position,
            mapq: MISSING_MAPQ,
            record: RecordBuf::default(),
        }
    }

    /// Create an unplaced, unmapped record.
    pub fn unmapped(name: impl Into<String>) -> Self {
        Self {
            flags: Flags::UNMAPPED,
            reference_id: None,
            mapq: 0,
            ..Self::new(name, 0, 0)
        }
    }

    pub fn with_flags(mut self, flags: Flags) -> Self {
        self.flags = flags;
        self
    }

    pub fn with_mapq(mut self, mapq: u8) -> Self {
        self.mapq = mapq;
        self
    }
}

impl From<RecordBuf> for AlignmentRecord {
    fn from(record: RecordBuf) -> Self {
        let name = record
            .name()
            .map(|name| String::from_utf8_lossy(name).into_owned())
            .unwrap_or_else(|| "*".to_string());
        // noodles positions are 1-based
        let position = record
            .alignment_start()
            .map_or(0, |start| (usize::from(start) - 1) as u64);
        let mapq = record
            .mapping_quality()
            .map_or(MISSING_MAPQ, |mapq| mapq.get());

        Self {
            name,
            flags: record.flags(),
            reference_id: record.reference_sequence_id(),
            position,
            mapq,
            record,
        }
    }
}

impl Alignment for AlignmentRecord {
    #[inline]
    fn reference_id(&self) -> Option<usize> {
        self.reference_id
    }

    #[inline]
    fn position(&self) -> u64 {
        self.position
    }

    #[inline]
    fn is_unmapped(&self) -> bool {
        self.flags.is_unmapped()
    }

    #[inline]
    fn is_proper_pair(&self) -> bool {
        self.flags.is_properly_segmented()
    }

    #[inline]
    fn name(&self) -> &[u8] {
        self.name.as_bytes()
    }
}

impl fmt::Display for AlignmentRecord {
    /// Short form used in logs: `name@ref:pos` (1-based position like SAM).
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.reference_id {
            Some(tid) => write!(f, "{}@{}:{}", self.name, tid, self.position + 1),
            None => write!(f, "{}@*", self.name),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use noodles::core::Position;
    use noodles::sam::alignment::record::MappingQuality;

    #[test]
    fn test_from_record_buf() {
        let buf = RecordBuf::builder()
            .set_name("r1")
            .set_flags(Flags::SEGMENTED | Flags::PROPERLY_SEGMENTED | Flags::FIRST_SEGMENT)
            .set_reference_sequence_id(1)
            .set_alignment_start(Position::try_from(42).unwrap())
            .set_mapping_quality(MappingQuality::new(60).unwrap())
            .build();
        let rec = AlignmentRecord::from(buf);

        assert_eq!(rec.name, "r1");
        assert_eq!(rec.reference_id(), Some(1));
        assert_eq!(rec.position(), 41);
        assert_eq!(rec.mapq, 60);
        assert!(rec.is_proper_pair());
        assert!(!rec.is_unmapped());
        assert_eq!(rec.record.reference_sequence_id(), Some(1));
    }

    #[test]
    fn test_from_empty_record_buf() {
        let rec = AlignmentRecord::from(RecordBuf::default());
        assert_eq!(rec.name, "*");
        assert_eq!(rec.reference_id(), None);
        assert_eq!(rec.mapq, MISSING_MAPQ);
    }

    #[test]
    fn test_unmapped_record() {
        let rec = AlignmentRecord::unmapped("r1");
        assert!(rec.is_unmapped());
        assert_eq!(rec.reference_id(), None);
        assert_eq!(rec.to_string(), "r1@*");
    }

    #[test]
    fn test_record_builders() {
        let rec = AlignmentRecord::new("r2", 1, 41)
            .with_flags(Flags::from_bits_truncate(147))
            .with_mapq(60);
        assert!(rec.is_proper_pair());
        assert_eq!(rec.mapq, 60);
        assert_eq!(rec.position(), 41);
        assert_eq!(rec.name(), b"r2");
        assert_eq!(rec.to_string(), "r2@1:42");
    }
}
