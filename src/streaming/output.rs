//! Efficient output formatting for per-window summaries.
//!
//! Uses itoa for integer formatting and ryu for float formatting
//! to avoid allocation in the hot path.

use crate::error::Result;
use crate::streaming::buffers::DEFAULT_OUTPUT_BUFFER;
use crate::window::Window;
use std::io::{BufWriter, Write};

/// Tab-delimited window writer.
pub struct WindowWriter<W: Write> {
    writer: BufWriter<W>,
    itoa_buf: itoa::Buffer,
    ryu_buf: ryu::Buffer,
}

impl<W: Write> WindowWriter<W> {
    /// Create a new WindowWriter with default 2MB buffer.
    pub fn new(output: W) -> Self {
        Self::with_capacity(DEFAULT_OUTPUT_BUFFER, output)
    }

    /// Create a new WindowWriter with specified buffer size.
    pub fn with_capacity(capacity: usize, output: W) -> Self {
        Self {
            writer: BufWriter::with_capacity(capacity, output),
            itoa_buf: itoa::Buffer::new(),
            ryu_buf: ryu::Buffer::new(),
        }
    }

    /// Write the window coordinates (seqname, start, end) without newline.
    #[inline]
    pub fn write_window(&mut self, window: &Window) -> Result<()> {
        self.writer.write_all(window.seqname.as_bytes())?;
        self.writer.write_all(b"\t")?;
        self.writer
            .write_all(self.itoa_buf.format(window.start).as_bytes())?;
        self.writer.write_all(b"\t")?;
        self.writer
            .write_all(self.itoa_buf.format(window.end).as_bytes())?;
        Ok(())
    }

    /// Write a tab character.
    #[inline]
    pub fn write_tab(&mut self) -> Result<()> {
        self.writer.write_all(b"\t")?;
        Ok(())
    }

    /// Write a newline character.
    #[inline]
    pub fn write_newline(&mut self) -> Result<()> {
        self.writer.write_all(b"\n")?;
        Ok(())
    }

    /// Write an integer using itoa.
    #[inline]
    pub fn write_int<I: itoa::Integer>(&mut self, n: I) -> Result<()> {
        self.writer.write_all(self.itoa_buf.format(n).as_bytes())?;
        Ok(())
    }

    /// Write a float using ryu, or `.` when there is no value.
    #[inline]
    pub fn write_float_or_na(&mut self, f: Option<f64>) -> Result<()> {
        match f {
            Some(f) => self.writer.write_all(self.ryu_buf.format(f).as_bytes())?,
            None => self.writer.write_all(b".")?,
        }
        Ok(())
    }

    /// Write integers joined by commas, or `.` for an empty list.
    pub fn write_int_list<I: itoa::Integer + Copy>(&mut self, values: &[I]) -> Result<()> {
        if values.is_empty() {
            self.writer.write_all(b".")?;
            return Ok(());
        }
        for (i, &v) in values.iter().enumerate() {
            if i > 0 {
                self.writer.write_all(b",")?;
            }
            self.writer.write_all(self.itoa_buf.format(v).as_bytes())?;
        }
        Ok(())
    }

    /// Flush the output buffer.
    pub fn flush(&mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }
}
