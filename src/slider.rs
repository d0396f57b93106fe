//! Sliding-window iterator over a sorted alignment stream.
//!
//! A single forward pass that pairs each window with the records whose start
//! position falls inside it:
//! - a per-reference [`WindowCursor`] produces window bounds
//! - a [`RetentionBuffer`] holds records that may still belong to the current
//!   or a later window
//! - a record past the current window's end is held back while the windows
//!   before it are closed, one per pull, then appended to the buffer
//!
//! # Memory Complexity
//!
//! O(k) where k = max number of records starting inside one window.
//!
//! # Requirements
//!
//! Input MUST be sorted by reference ordinal, then position. Unsorted input
//! fails with [`SlideError::OrderingViolation`].

use std::collections::VecDeque;
use std::fmt;
use std::path::Path;

use log::{debug, info, warn};
use rustc_hash::FxHashSet;

use crate::config::{PairMode, SliderConfig};
use crate::error::{Result, SlideError};
use crate::reader::AlignmentReader;
use crate::reference::References;
use crate::source::{Alignment, AlignmentSource};
use crate::streaming::cursor::{WindowBounds, WindowCursor};
use crate::streaming::retention::RetentionBuffer;
use crate::streaming::validation::SortValidator;
use crate::window::Window;

/// One emitted window with its member records, in stream order.
pub type WindowBatch<R> = (Window, Vec<R>);

/// Why a record was not admitted into any window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Disposition {
    /// Unmapped flag set, or no reference.
    Unmapped,
    /// Mapped, but no window covers its position (reference tail, a gap
    /// between windows when `step > size`, or a reference shorter than a
    /// window).
    Unwindowed,
    /// Second mate of a proper pair already represented by its first mate.
    MateRepresented,
}

impl Disposition {
    pub const ALL: [Disposition; 3] = [
        Disposition::Unmapped,
        Disposition::Unwindowed,
        Disposition::MateRepresented,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Disposition::Unmapped => "unmapped",
            Disposition::Unwindowed => "unwindowed",
            Disposition::MateRepresented => "mate_represented",
        }
    }
}

impl fmt::Display for Disposition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Statistics from one slider run. Counts only grow.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SlideStats {
    pub records: usize,
    pub windows: usize,
    pub max_retained: usize,
    unmapped: u64,
    unwindowed: u64,
    mate_represented: u64,
}

impl SlideStats {
    /// Number of records with the given disposition.
    pub fn count(&self, disposition: Disposition) -> u64 {
        match disposition {
            Disposition::Unmapped => self.unmapped,
            Disposition::Unwindowed => self.unwindowed,
            Disposition::MateRepresented => self.mate_represented,
        }
    }

    #[inline]
    fn tally(&mut self, disposition: Disposition) {
        match disposition {
            Disposition::Unmapped => self.unmapped += 1,
            Disposition::Unwindowed => self.unwindowed += 1,
            Disposition::MateRepresented => self.mate_represented += 1,
        }
    }
}

impl fmt::Display for SlideStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Records: {}, Windows: {}, Max retained: {}",
            self.records, self.windows, self.max_retained
        )?;
        for disposition in Disposition::ALL {
            write!(f, ", {}: {}", disposition, self.count(disposition))?;
        }
        Ok(())
    }
}

/// Bounded, insertion-ordered set of proper-pair names awaiting their mate.
#[derive(Debug)]
struct PendingMates {
    names: FxHashSet<Box<[u8]>>,
    order: VecDeque<Box<[u8]>>,
    capacity: usize,
    evicted: usize,
}

impl PendingMates {
    fn new(capacity: usize) -> Self {
        Self {
            names: FxHashSet::default(),
            order: VecDeque::new(),
            capacity,
            evicted: 0,
        }
    }

    /// Remove `name` if pending. Returns true if it was.
    fn take(&mut self, name: &[u8]) -> bool {
        self.names.remove(name)
    }

    /// Remember `name`, evicting the oldest pending names past capacity.
    /// Returns the number of names evicted.
    fn insert(&mut self, name: &[u8]) -> usize {
        let name: Box<[u8]> = name.into();
        if !self.names.insert(name.clone()) {
            return 0;
        }
        self.order.push_back(name);

        let mut evicted = 0;
        while self.names.len() > self.capacity {
            match self.order.pop_front() {
                // Stale entries (already matched) are skipped
                Some(oldest) => {
                    if self.names.remove(&oldest) {
                        evicted += 1;
                    }
                }
                None => break,
            }
        }

        if self.order.len() > self.capacity.saturating_mul(2) {
            let names = &self.names;
            self.order.retain(|n| names.contains(n));
        }

        self.evicted += evicted;
        evicted
    }

    fn clear(&mut self) {
        self.names.clear();
        self.order.clear();
        self.evicted = 0;
    }
}

/// Cursor state for the reference currently being windowed.
#[derive(Debug)]
struct ReferenceState {
    tid: usize,
    name: String,
    cursor: WindowCursor,
    /// `None` once the cursor is exhausted.
    current: Option<WindowBounds>,
}

/// Work left over from the last pull, resumed before the source is read
/// again. Each step closes at most one window.
#[derive(Debug)]
enum Pending<R> {
    /// A validated record on the current reference, admitted once the
    /// current window reaches its position.
    Record(R),
    /// A record on a later reference, held while the current one is flushed.
    NextReference(usize, R),
    /// The source is done, or [`WindowSlider::finalize`] stopped reading it.
    EndOfStream,
}

/// Pull-based iterator of `(Window, members)` over a sorted record source.
///
/// Windows come out in (reference order, window start) order. Members are in
/// stream order. Every call to `next` closes at most one window, so a long
/// run of empty windows never piles up in memory. The trailing windows of
/// the last reference are flushed when the source is exhausted, or earlier
/// through [`WindowSlider::finalize`].
///
/// After an error is returned the iterator is fused.
pub struct WindowSlider<S: AlignmentSource> {
    source: S,
    references: References,
    config: SliderConfig,
    state: Option<ReferenceState>,
    buffer: RetentionBuffer<S::Record>,
    validator: SortValidator,
    mates: PendingMates,
    pending: Option<Pending<S::Record>>,
    stats: SlideStats,
    draining: bool,
    finished: bool,
}

impl WindowSlider<AlignmentReader> {
    /// Slide over a SAM/BAM file (or stdin, as `-`), opened in the config's
    /// read mode.
    pub fn open<P: AsRef<Path>>(path: P, config: SliderConfig) -> Result<Self> {
        let reader = AlignmentReader::open(path, config.mode())?;
        Ok(Self::new(reader, config))
    }
}

impl<S: AlignmentSource> WindowSlider<S> {
    /// Create a slider over `source`.
    pub fn new(source: S, config: SliderConfig) -> Self {
        let references = source.references().clone();
        let mates = PendingMates::new(config.mate_lookback());
        Self {
            source,
            references,
            config,
            state: None,
            buffer: RetentionBuffer::new(),
            validator: SortValidator::new(),
            mates,
            pending: None,
            stats: SlideStats::default(),
            draining: false,
            finished: false,
        }
    }

    /// Diagnostics accumulated so far.
    pub fn stats(&self) -> &SlideStats {
        &self.stats
    }

    /// Stop consuming the source and flush the buffered windows.
    ///
    /// Records already pulled from the source are still placed, then every
    /// window not yet yielded is returned. Afterwards the iterator yields
    /// nothing.
    pub fn finalize(&mut self) -> Result<Vec<WindowBatch<S::Record>>> {
        self.draining = true;
        self.by_ref().collect()
    }

    fn finish(&mut self) {
        self.buffer.clear();
        self.state = None;
        self.finished = true;
        info!("Window slider finished: {}", self.stats);
    }

    fn fail(&mut self) {
        self.finished = true;
        self.pending = None;
        self.buffer.clear();
        self.state = None;
    }

    /// Route a record pulled from the source.
    fn process(&mut self, record: S::Record) -> Result<()> {
        let Some(tid) = record.reference_id() else {
            self.stats.tally(Disposition::Unmapped);
            return Ok(());
        };
        if tid >= self.references.len() {
            return Err(SlideError::UnknownReference(tid));
        }

        if self.state.as_ref().map(|s| s.tid) != Some(tid) {
            self.validator
                .check_reference(self.stats.records, tid, &self.references)?;
            self.pending = Some(Pending::NextReference(tid, record));
            return Ok(());
        }

        self.process_on_reference(tid, record)
    }

    /// Validate a record on the current reference and hold it for admission.
    fn process_on_reference(&mut self, tid: usize, record: S::Record) -> Result<()> {
        if record.is_unmapped() {
            self.stats.tally(Disposition::Unmapped);
            return Ok(());
        }

        let pos = record.position();
        self.validator
            .validate(self.stats.records, tid, pos, &self.references)?;
        self.pending = Some(Pending::Record(record));
        Ok(())
    }

    /// Place a record the current window has reached.
    ///
    /// Only a record that lands in a window can claim its pair: a mate in a
    /// gap or past the last window is tallied `Unwindowed` and leaves the
    /// pair unclaimed.
    fn admit(&mut self, record: S::Record) {
        let collapse =
            self.config.pairing() == PairMode::CollapseProperPairs && record.is_proper_pair();

        match self.state.as_ref().and_then(|s| s.current) {
            Some(bounds) if record.position() >= bounds.start => {
                if collapse {
                    if self.mates.take(record.name()) {
                        self.stats.tally(Disposition::MateRepresented);
                        return;
                    }
                    self.remember_mate(record.name());
                }
                self.buffer.push(record);
                self.stats.max_retained = self.buffer.max_retained();
            }
            _ => {
                if collapse {
                    self.mates.take(record.name());
                }
                self.stats.tally(Disposition::Unwindowed);
            }
        }
    }

    fn remember_mate(&mut self, name: &[u8]) {
        let evicted = self.mates.insert(name);
        if evicted > 0 && self.mates.evicted == evicted {
            warn!(
                "Pending mate set full ({} names); evicting oldest mates, later mates will be admitted as new fragments",
                self.config.mate_lookback()
            );
        }
    }

    /// The current window, if the record at `pos` lies past its end.
    fn window_before(&self, pos: u64) -> Option<WindowBounds> {
        self.state
            .as_ref()
            .and_then(|s| s.current)
            .filter(|bounds| pos >= bounds.end)
    }

    /// Emit the current window and advance the cursor.
    fn close_window(&mut self) -> Option<WindowBatch<S::Record>> {
        let state = self.state.as_mut()?;
        let bounds = state.current?;

        let window = Window::new(state.name.clone(), bounds.start, bounds.end);
        let next = state.cursor.advance();

        let members = match next {
            Some(next) => match self.config.pairing() {
                PairMode::Independent => self.buffer.emit_and_retain(next.start),
                PairMode::CollapseProperPairs => self.buffer.take_before(next.start),
            },
            None => {
                debug!("{}: no windows past {}", state.name, bounds.start);
                self.buffer.take_all()
            }
        };
        state.current = next;

        self.stats.windows += 1;
        Some((window, members))
    }

    /// One step of flushing the current reference: close the next window
    /// while buffered records remain and the cursor has windows.
    ///
    /// Returns `None` once the reference is flushed.
    fn close_reference_step(&mut self) -> Option<WindowBatch<S::Record>> {
        if !self.buffer.is_empty() {
            if let Some(batch) = self.close_window() {
                return Some(batch);
            }
        }
        self.buffer.clear();
        None
    }

    fn enter_reference(&mut self, tid: usize) {
        self.mates.clear();
        self.validator.reset_position();

        let name = self.references.name(tid).unwrap_or_default().to_string();
        let length = self.references.length(tid).unwrap_or(0);
        let mut cursor = WindowCursor::new(length, self.config.size(), self.config.step());
        let current = cursor.advance();

        debug!(
            "Entering {} ({} bp, {} windows)",
            name,
            length,
            cursor.remaining() + u64::from(current.is_some())
        );

        self.state = Some(ReferenceState {
            tid,
            name,
            cursor,
            current,
        });
    }

    /// Advance on the held work by one step. `Ok(Some(batch))` means a
    /// window was closed, `Ok(None)` that the work is done.
    fn resume(&mut self, pending: Pending<S::Record>) -> Result<Option<WindowBatch<S::Record>>> {
        match pending {
            Pending::Record(record) => {
                if self.window_before(record.position()).is_some() {
                    let batch = self.close_window();
                    self.pending = Some(Pending::Record(record));
                    return Ok(batch);
                }
                self.admit(record);
                Ok(None)
            }
            Pending::NextReference(tid, record) => {
                if let Some(batch) = self.close_reference_step() {
                    self.pending = Some(Pending::NextReference(tid, record));
                    return Ok(Some(batch));
                }
                self.enter_reference(tid);
                self.process_on_reference(tid, record)?;
                Ok(None)
            }
            Pending::EndOfStream => {
                if let Some(batch) = self.close_reference_step() {
                    self.pending = Some(Pending::EndOfStream);
                    return Ok(Some(batch));
                }
                self.finish();
                Ok(None)
            }
        }
    }
}

impl<S: AlignmentSource> Iterator for WindowSlider<S> {
    type Item = Result<WindowBatch<S::Record>>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if self.finished {
                return None;
            }

            if let Some(pending) = self.pending.take() {
                match self.resume(pending) {
                    Ok(Some(batch)) => return Some(Ok(batch)),
                    Ok(None) => continue,
                    Err(e) => {
                        self.fail();
                        return Some(Err(e));
                    }
                }
            }

            if self.draining {
                self.pending = Some(Pending::EndOfStream);
                continue;
            }

            match self.source.next() {
                Some(Ok(record)) => {
                    self.stats.records += 1;
                    if let Err(e) = self.process(record) {
                        self.fail();
                        return Some(Err(e));
                    }
                }
                Some(Err(e)) => {
                    self.fail();
                    return Some(Err(e));
                }
                None => self.pending = Some(Pending::EndOfStream),
            }
        }
    }
}
