//! Genomic window value type.

use std::fmt;

/// A window on a named reference sequence.
/// Uses 0-based, half-open coordinates: `[start, end)`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Window {
    pub seqname: String,
    pub start: u64,
    pub end: u64,
}

impl Window {
    /// Create a new window.
    #[inline]
    pub fn new(seqname: impl Into<String>, start: u64, end: u64) -> Self {
        Self {
            seqname: seqname.into(),
            start,
            end,
        }
    }

    /// Returns the length of the window.
    #[inline]
    pub fn len(&self) -> u64 {
        self.end.saturating_sub(self.start)
    }

    /// Returns true if the window spans no bases.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.start >= self.end
    }

    /// Check if a 0-based position lies inside the window.
    #[inline]
    pub fn contains(&self, position: u64) -> bool {
        self.start <= position && position < self.end
    }
}

impl fmt::Display for Window {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}\t{}\t{}", self.seqname, self.start, self.end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_window_contains_is_half_open() {
        let w = Window::new("chr1", 5, 15);
        assert!(w.contains(5));
        assert!(w.contains(14));
        assert!(!w.contains(15));
        assert!(!w.contains(4));
        assert_eq!(w.len(), 10);
    }

    #[test]
    fn test_window_display() {
        let w = Window::new("chrX", 100, 200);
        assert_eq!(w.to_string(), "chrX\t100\t200");
    }
}
