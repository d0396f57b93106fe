//! Retention buffer for the window slider.
//!
//! Holds records that were seen but may still belong to the current or a
//! future window. Records are appended at the tail in stream order and only
//! ever leave from the head.
//!
//! # Memory Complexity
//!
//! O(k) where k = max number of records whose position falls inside one
//! window. The drop threshold advances monotonically with the window cursor,
//! so the buffer never grows past that.

use std::collections::VecDeque;

use crate::source::Alignment;

/// Insertion-ordered buffer of pending records.
///
/// Positions are non-decreasing from head to tail (the slider rejects
/// unsorted input before admission), so every partition by position is a
/// head/tail split.
#[derive(Debug)]
pub struct RetentionBuffer<T> {
    data: VecDeque<T>,
    /// Maximum observed buffered size (for statistics).
    max_retained: usize,
}

impl<T> Default for RetentionBuffer<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> RetentionBuffer<T> {
    /// Create a new empty buffer.
    pub fn new() -> Self {
        Self {
            data: VecDeque::with_capacity(1024),
            max_retained: 0,
        }
    }

    /// Append a record at the tail.
    #[inline]
    pub fn push(&mut self, value: T) {
        self.data.push_back(value);
        if self.data.len() > self.max_retained {
            self.max_retained = self.data.len();
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Remove and return the first `n` records, in order.
    pub fn take_front(&mut self, n: usize) -> Vec<T> {
        let n = n.min(self.data.len());
        self.data.drain(..n).collect()
    }

    /// Remove and return everything.
    pub fn take_all(&mut self) -> Vec<T> {
        self.data.drain(..).collect()
    }

    /// Drop all records.
    pub fn clear(&mut self) {
        self.data.clear();
    }

    /// Get the maximum buffered size observed (for statistics).
    pub fn max_retained(&self) -> usize {
        self.max_retained
    }
}

impl<T: Alignment> RetentionBuffer<T> {
    /// Number of head records positioned before `threshold`.
    #[inline]
    pub fn count_before(&self, threshold: u64) -> usize {
        // Sorted by position, so the first record at or past the threshold
        // ends the prefix.
        self.data.partition_point(|r| r.position() < threshold)
    }

    /// Remove and return the records positioned before `threshold`.
    ///
    /// The buffer keeps exactly the records at or after it.
    pub fn take_before(&mut self, threshold: u64) -> Vec<T> {
        let n = self.count_before(threshold);
        self.take_front(n)
    }
}

impl<T: Alignment + Clone> RetentionBuffer<T> {
    /// Partition for a window whose successor starts at `threshold`.
    ///
    /// Returns every buffered record (in insertion order) as members of the
    /// closing window; only records at or after `threshold` stay buffered.
    pub fn emit_and_retain(&mut self, threshold: u64) -> Vec<T> {
        let mut members = self.take_before(threshold);
        members.reserve(self.data.len());
        members.extend(self.data.iter().cloned());
        members
    }
}
