//! Slider configuration.
//!
//! All options are validated once at construction, before any record is
//! consumed. There is no process-wide state: each slider owns its config.

use std::fmt;
use std::str::FromStr;

use crate::error::{Result, SlideError};

/// Default bound on the number of proper-pair identities remembered per
/// reference while collapsing pairs.
pub const DEFAULT_MATE_LOOKBACK: usize = 65_536;

/// Input format, chosen the way `samtools view` open modes are.
///
/// `Auto` sniffs the first bytes: BGZF (gzip) magic means BAM, anything
/// else is read as SAM text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReadMode {
    #[default]
    Auto,
    Sam,
    Bam,
}

impl FromStr for ReadMode {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "auto" => Ok(ReadMode::Auto),
            "sam" | "r" => Ok(ReadMode::Sam),
            "bam" | "rb" => Ok(ReadMode::Bam),
            _ => Err(format!(
                "unknown input format '{}' (expected auto, sam or bam)",
                s
            )),
        }
    }
}

impl fmt::Display for ReadMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ReadMode::Auto => "auto",
            ReadMode::Sam => "sam",
            ReadMode::Bam => "bam",
        })
    }
}

/// How proper pairs are admitted into windows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PairMode {
    /// Every mapped record is admitted on its own, and appears in every
    /// window whose span contains its position.
    #[default]
    Independent,
    /// A proper pair is represented by the first of its mates that lands in
    /// a window, and each record is admitted into exactly one window: the one
    /// whose `[start, start + step)` owns its position.
    CollapseProperPairs,
}

/// Options for [`WindowSlider`](crate::slider::WindowSlider).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SliderConfig {
    size: u64,
    step: u64,
    mode: ReadMode,
    pairing: PairMode,
    mate_lookback: usize,
}

impl SliderConfig {
    /// Create a config for windows of `size` bases advancing by `step`.
    ///
    /// Fails with [`SlideError::Configuration`] if either value is below 1.
    pub fn new(size: u64, step: u64) -> Result<Self> {
        if size < 1 {
            return Err(SlideError::Configuration(format!(
                "window size must be >= 1, got {}",
                size
            )));
        }
        if step < 1 {
            return Err(SlideError::Configuration(format!(
                "window step must be >= 1, got {}",
                step
            )));
        }
        Ok(Self {
            size,
            step,
            mode: ReadMode::default(),
            pairing: PairMode::default(),
            mate_lookback: DEFAULT_MATE_LOOKBACK,
        })
    }

    pub fn with_mode(mut self, mode: ReadMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_pairing(mut self, pairing: PairMode) -> Self {
        self.pairing = pairing;
        self
    }

    /// Bound the pending-mate set used by [`PairMode::CollapseProperPairs`].
    pub fn with_mate_lookback(mut self, lookback: usize) -> Result<Self> {
        if lookback == 0 {
            return Err(SlideError::Configuration(
                "mate lookback must be >= 1".to_string(),
            ));
        }
        self.mate_lookback = lookback;
        Ok(self)
    }

    #[inline]
    pub fn size(&self) -> u64 {
        self.size
    }

    #[inline]
    pub fn step(&self) -> u64 {
        self.step
    }

    #[inline]
    pub fn mode(&self) -> ReadMode {
        self.mode
    }

    #[inline]
    pub fn pairing(&self) -> PairMode {
        self.pairing
    }

    #[inline]
    pub fn mate_lookback(&self) -> usize {
        self.mate_lookback
    }
}
