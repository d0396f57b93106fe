//! Record source abstractions.
//!
//! The slider never parses alignment files itself. It pulls records from an
//! [`AlignmentSource`], which also provides the reference names and lengths.

use std::vec;

use crate::error::Result;
use crate::reference::References;

/// The fields of an alignment record that windowing depends on.
pub trait Alignment {
    /// Ordinal of the reference sequence, `None` for unplaced records.
    fn reference_id(&self) -> Option<usize>;

    /// 0-based leftmost aligned position.
    fn position(&self) -> u64;

    fn is_unmapped(&self) -> bool;

    fn is_proper_pair(&self) -> bool;

    /// Template name shared by both mates of a pair.
    fn name(&self) -> &[u8];
}

/// An ordered stream of alignment records plus its reference metadata.
///
/// Records must arrive sorted by (reference ordinal, position).
pub trait AlignmentSource: Iterator<Item = Result<Self::Record>> {
    type Record: Alignment + Clone;

    fn references(&self) -> &References;
}

/// An in-memory record source, mostly useful for tests and for callers that
/// already hold decoded records.
#[derive(Debug)]
pub struct MemorySource<R> {
    references: References,
    records: vec::IntoIter<R>,
}

impl<R> MemorySource<R> {
    pub fn new(references: References, records: Vec<R>) -> Self {
        Self {
            references,
            records: records.into_iter(),
        }
    }
}

impl<R> Iterator for MemorySource<R> {
    type Item = Result<R>;

    fn next(&mut self) -> Option<Self::Item> {
        self.records.next().map(Ok)
    }
}

impl<R: Alignment + Clone> AlignmentSource for MemorySource<R> {
    type Record = R;

    fn references(&self) -> &References {
        &self.references
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::AlignmentRecord;

    #[test]
    fn test_memory_source() {
        let refs = References::from_pairs([("chr1", 100)]);
        let records = vec![
            AlignmentRecord::new("a", 0, 1),
            AlignmentRecord::new("b", 0, 2),
        ];
        let mut source = MemorySource::new(refs, records);

        assert_eq!(source.references().len(), 1);
        assert_eq!(source.next().unwrap().unwrap().position(), 1);
        assert_eq!(source.next().unwrap().unwrap().name(), b"b");
        assert!(source.next().is_none());
    }
}
