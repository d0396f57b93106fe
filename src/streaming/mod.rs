//! Streaming building blocks for the window slider.
//!
//! - Sort validation
//! - Window cursor and retention buffer
//! - Efficient output formatting
//!
//! Memory stays O(k) where k = max records starting inside one window.

pub mod buffers;
pub mod cursor;
pub mod output;
pub mod retention;
pub mod validation;

pub use cursor::{WindowBounds, WindowCursor};
pub use output::WindowWriter;
pub use retention::RetentionBuffer;
pub use validation::{verify_sorted, verify_sorted_source, SortValidator};
