//! Per-reference window cursor.
//!
//! Produces window starts `0, step, 2*step, ...` strictly below
//! `length - size`. No window is clamped: the reference tail past the last
//! full window is never covered, and a reference no longer than `size` has
//! no windows at all.

/// Bounds of one window, `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowBounds {
    pub start: u64,
    pub end: u64,
}

/// Advance-only window state machine for a single reference.
#[derive(Debug, Clone)]
pub struct WindowCursor {
    size: u64,
    step: u64,
    /// Exclusive upper bound on window starts.
    limit: u64,
    next_start: Option<u64>,
}

impl WindowCursor {
    /// Create a cursor for a reference of `length` bases.
    ///
    /// `size` and `step` must be at least 1; [`SliderConfig`] guarantees it.
    ///
    /// [`SliderConfig`]: crate::config::SliderConfig
    pub fn new(length: u64, size: u64, step: u64) -> Self {
        debug_assert!(size >= 1 && step >= 1);
        let limit = length.saturating_sub(size);
        Self {
            size,
            step,
            limit,
            next_start: (limit > 0).then_some(0),
        }
    }

    /// Return the next window, or `None` once the reference is exhausted.
    #[inline]
    pub fn advance(&mut self) -> Option<WindowBounds> {
        let start = self.next_start?;
        self.next_start = start
            .checked_add(self.step)
            .filter(|&next| next < self.limit);
        Some(WindowBounds {
            start,
            end: start + self.size,
        })
    }

    /// Number of windows not yet produced.
    pub fn remaining(&self) -> u64 {
        match self.next_start {
            Some(start) => (self.limit - start).div_ceil(self.step),
            None => 0,
        }
    }
}

impl Iterator for WindowCursor {
    type Item = WindowBounds;

    fn next(&mut self) -> Option<Self::Item> {
        self.advance()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let n = usize::try_from(self.remaining()).unwrap_or(usize::MAX);
        (n, Some(n))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn starts(length: u64, size: u64, step: u64) -> Vec<u64> {
        WindowCursor::new(length, size, step).map(|w| w.start).collect()
    }

    #[test]
    fn test_overlapping_starts_exclude_tail() {
        // 15 < 25 - 10 is false, so 15 is not produced
        assert_eq!(starts(25, 10, 5), vec![0, 5, 10]);
    }

    #[test]
    fn test_bounds() {
        let mut cursor = WindowCursor::new(25, 10, 5);
        assert_eq!(cursor.advance(), Some(WindowBounds { start: 0, end: 10 }));
        assert_eq!(cursor.advance(), Some(WindowBounds { start: 5, end: 15 }));
        assert_eq!(cursor.remaining(), 1);
        assert_eq!(cursor.advance(), Some(WindowBounds { start: 10, end: 20 }));
        assert_eq!(cursor.remaining(), 0);
        assert_eq!(cursor.advance(), None);
        assert_eq!(cursor.advance(), None);
    }

    #[test]
    fn test_tiling_and_gapped() {
        assert_eq!(starts(100, 10, 10), vec![0, 10, 20, 30, 40, 50, 60, 70, 80]);
        assert_eq!(starts(100, 10, 30), vec![0, 30, 60]);
    }

    #[test]
    fn test_short_reference_has_no_windows() {
        assert!(starts(10, 10, 5).is_empty());
        assert!(starts(3, 10, 5).is_empty());
        assert!(starts(0, 1, 1).is_empty());
        assert_eq!(starts(11, 10, 5), vec![0]);
    }

    #[test]
    fn test_remaining_matches_iteration() {
        for (length, size, step) in [(25, 10, 5), (100, 10, 10), (101, 7, 3), (10, 10, 1)] {
            let cursor = WindowCursor::new(length, size, step);
            assert_eq!(cursor.remaining() as usize, cursor.clone().count());
        }
    }
}
