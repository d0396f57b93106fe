//! Per-window mapping-quality summary.
//!
//! Slides over a sorted SAM/BAM file and writes one line per window:
//!
//! ```text
//! seqname  start  end  n_records  mean_mapq  [mapq_list]
//! ```
//!
//! `mean_mapq` is `.` for an empty window, and so is the optional MAPQ list.

use std::io::Write;
use std::path::{Path, PathBuf};

use crate::config::{PairMode, ReadMode, SliderConfig};
use crate::error::Result;
use crate::reader::AlignmentReader;
use crate::record::AlignmentRecord;
use crate::reference::References;
use crate::slider::{SlideStats, WindowSlider};
use crate::source::AlignmentSource;
use crate::streaming::output::WindowWriter;
use crate::window::Window;

/// Windows command configuration.
#[derive(Debug, Clone)]
pub struct WindowsCommand {
    /// Window size in bases
    pub size: u64,
    /// Offset between consecutive window starts
    pub step: u64,
    /// Collapse proper pairs into one fragment per window
    pub collapse_pairs: bool,
    /// Append the comma-separated MAPQ of every member
    pub list_mapq: bool,
    /// Input format (SAM, BAM, or sniffed)
    pub format: ReadMode,
    /// Reference names and lengths overriding the input header
    pub genome: Option<PathBuf>,
}

impl Default for WindowsCommand {
    fn default() -> Self {
        Self::new()
    }
}

impl WindowsCommand {
    pub fn new() -> Self {
        Self {
            size: 10_000,
            step: 5_000,
            collapse_pairs: false,
            list_mapq: false,
            format: ReadMode::Auto,
            genome: None,
        }
    }

    /// Build the slider configuration, validating size and step.
    pub fn config(&self) -> Result<SliderConfig> {
        let pairing = if self.collapse_pairs {
            PairMode::CollapseProperPairs
        } else {
            PairMode::Independent
        };
        Ok(SliderConfig::new(self.size, self.step)?
            .with_mode(self.format)
            .with_pairing(pairing))
    }

    /// Execute on a SAM/BAM file, or stdin when the path is `-`.
    pub fn run<P: AsRef<Path>, W: Write>(&self, input: P, output: W) -> Result<SlideStats> {
        // Validate before opening anything
        let config = self.config()?;
        let mut reader = AlignmentReader::open(input, config.mode())?;
        if let Some(ref genome) = self.genome {
            reader = reader.with_references(References::from_genome_file(genome)?)?;
        }
        self.run_source(reader, config, output)
    }

    /// Execute over any record source.
    pub fn run_source<S, W>(&self, source: S, config: SliderConfig, output: W) -> Result<SlideStats>
    where
        S: AlignmentSource<Record = AlignmentRecord>,
        W: Write,
    {
        let mut writer = WindowWriter::new(output);
        let mut slider = WindowSlider::new(source, config);

        // Reused across windows
        let mut mapqs: Vec<u8> = Vec::with_capacity(1024);

        for batch in slider.by_ref() {
            let (window, members) = batch?;
            mapqs.clear();
            mapqs.extend(members.iter().map(|r| r.mapq));
            self.write_window(&mut writer, &window, &mapqs)?;
        }

        writer.flush()?;
        Ok(slider.stats().clone())
    }

    fn write_window<W: Write>(
        &self,
        writer: &mut WindowWriter<W>,
        window: &Window,
        mapqs: &[u8],
    ) -> Result<()> {
        writer.write_window(window)?;
        writer.write_tab()?;
        writer.write_int(mapqs.len())?;
        writer.write_tab()?;
        writer.write_float_or_na(mean_mapq(mapqs))?;
        if self.list_mapq {
            writer.write_tab()?;
            writer.write_int_list(mapqs)?;
        }
        writer.write_newline()
    }
}

/// Mean mapping quality, `None` for an empty window.
pub fn mean_mapq(mapqs: &[u8]) -> Option<f64> {
    if mapqs.is_empty() {
        return None;
    }
    let total: u64 = mapqs.iter().map(|&q| u64::from(q)).sum();
    Some(total as f64 / mapqs.len() as f64)
}
