//! `OutputBuffer`: Single-syscall output buffer for terminal writes.

use std::io::{self, Write};

/// Pre-allocated buffer for building terminal output.
///
/// Everything produced for one display update is accumulated here, then
/// flushed in a single `write()` so a reveal never shows half an escape
/// sequence. It implements [`Write`], so crossterm's `queue!` can target it.
#[derive(Debug, Default)]
pub struct OutputBuffer {
    data: Vec<u8>,
}

impl OutputBuffer {
    /// Create a new output buffer with the given capacity.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            data: Vec::with_capacity(capacity),
        }
    }

    /// Clear the buffer for reuse.
    #[inline]
    pub fn clear(&mut self) {
        self.data.clear();
    }

    /// Get the buffer contents.
    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    /// Check if buffer is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Write text, turning `\n` into `\r\n` so lines start at column 0
    /// whether or not the terminal translates newlines itself.
    pub fn write_text(&mut self, text: &str) {
        let mut lines = text.split('\n');
        if let Some(first) = lines.next() {
            self.data.extend_from_slice(first.as_bytes());
        }
        for line in lines {
            self.data.extend_from_slice(b"\r\n");
            self.data.extend_from_slice(line.as_bytes());
        }
    }

    /// Flush to a writer in a single syscall, then clear.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying writer fails.
    pub fn flush_to<W: Write>(&mut self, writer: &mut W) -> io::Result<()> {
        if self.data.is_empty() {
            return Ok(());
        }
        writer.write_all(&self.data)?;
        writer.flush()?;
        self.data.clear();
        Ok(())
    }
}

impl Write for OutputBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.data.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
