//! samslider: sliding genomic windows over sorted SAM/BAM alignment streams
//!
//! Turns a coordinate-sorted stream of alignment records into fixed-size,
//! optionally overlapping windows, each paired with the records whose start
//! position falls inside it, in a single forward pass.
//!
//! # Features
//!
//! - **Streaming**: O(k) memory, k = records starting inside one window
//! - **Overlap aware**: with `step < size` a record is reported in every
//!   window containing it
//! - **Sort checking**: unsorted input fails instead of producing wrong windows
//! - **SAM and BAM**: decoded with `noodles`, format sniffed or forced
//!
//! # Example
//!
//! ```rust,no_run
//! use samslider::{SliderConfig, WindowSlider};
//!
//! let config = SliderConfig::new(10_000, 5_000).unwrap();
//! let slider = WindowSlider::open("test.sorted.bam", config).unwrap();
//! for batch in slider {
//!     let (window, reads) = batch.unwrap();
//!     let mapqs: Vec<u8> = reads.iter().map(|r| r.mapq).collect();
//!     println!("{} {:?}", window, mapqs);
//! }
//! ```

pub mod commands;
pub mod config;
pub mod error;
pub mod reader;
pub mod record;
pub mod reference;
pub mod slider;
pub mod source;
pub mod streaming;
pub mod window;

// Re-export commonly used types
pub use config::{PairMode, ReadMode, SliderConfig};
pub use error::{Result, SlideError};
pub use reader::{AlignmentReader, Format};
pub use record::{AlignmentRecord, Flags};
pub use reference::References;
pub use slider::{Disposition, SlideStats, WindowBatch, WindowSlider};
pub use source::{Alignment, AlignmentSource, MemorySource};
pub use window::Window;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::commands::WindowsCommand;
    pub use crate::config::{PairMode, ReadMode, SliderConfig};
    pub use crate::error::{Result, SlideError};
    pub use crate::reader::AlignmentReader;
    pub use crate::record::AlignmentRecord;
    pub use crate::reference::References;
    pub use crate::slider::{Disposition, WindowSlider};
    pub use crate::source::{Alignment, AlignmentSource};
    pub use crate::window::Window;
}
