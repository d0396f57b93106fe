//! Command implementations for samslider.

pub mod windows;

pub use crate::streaming::{verify_sorted, verify_sorted_source};
pub use windows::{mean_mapq, WindowsCommand};
