//! Printer: renders display updates onto a terminal stream.

use super::output::OutputBuffer;
use crate::actor::DisplayUpdate;
use crate::reveal::DisplayProjection;
use crossterm::queue;
use crossterm::style::{Attribute, Color, Print, ResetColor, SetAttribute, SetForegroundColor};
use std::io::{self, Write};

/// Prompt marker colour.
const PROMPT_FG: Color = Color::Rgb { r: 100, g: 180, b: 255 };

/// Appends revealed text to a terminal as it arrives.
///
/// The printer keeps its own [`DisplayProjection`], so updates from a
/// stream that has already been reset are recognised and skipped.
pub struct RevealPrinter<W: Write> {
    out: W,
    buffer: OutputBuffer,
    projection: DisplayProjection,
    /// Emit colours and attributes.
    styled: bool,
    /// Whether the cursor sits at column 0.
    at_line_start: bool,
}

impl<W: Write> RevealPrinter<W> {
    /// Create a printer writing to `out`.
    pub fn new(out: W, styled: bool) -> Self {
        Self {
            out,
            buffer: OutputBuffer::with_capacity(1024),
            projection: DisplayProjection::new(),
            styled,
            at_line_start: true,
        }
    }

    /// What the printer has shown for the current stream.
    pub const fn projection(&self) -> &DisplayProjection {
        &self.projection
    }

    /// Echo a submitted prompt on its own line.
    pub fn header(&mut self, prompt: &str) -> io::Result<()> {
        self.finish_line();
        if self.styled {
            queue!(
                self.buffer,
                SetForegroundColor(PROMPT_FG),
                SetAttribute(Attribute::Bold),
                Print("> "),
                SetAttribute(Attribute::Reset),
                SetForegroundColor(PROMPT_FG),
            )?;
        } else {
            self.buffer.write_text("> ");
        }
        self.buffer.write_text(prompt);
        if self.styled {
            queue!(self.buffer, ResetColor)?;
        }
        self.buffer.write_text("\n");
        self.at_line_start = true;
        self.buffer.flush_to(&mut self.out)
    }

    /// Apply one update and flush the result.
    pub fn apply(&mut self, update: &DisplayUpdate) -> io::Result<()> {
        match update {
            DisplayUpdate::Reset { .. } => {
                if self.projection.apply(update) {
                    self.finish_line();
                }
            }
            DisplayUpdate::Revealed { text, .. } => {
                if self.projection.apply(update) {
                    self.buffer.write_text(text);
                    self.at_line_start = text.ends_with('\n');
                }
            }
            DisplayUpdate::Idle { epoch } => {
                if *epoch == self.projection.epoch() {
                    self.finish_line();
                    if self.styled {
                        queue!(self.buffer, ResetColor)?;
                    }
                }
            }
        }
        self.buffer.flush_to(&mut self.out)
    }

    /// Consume the printer, returning the writer.
    pub fn into_inner(self) -> W {
        self.out
    }

    fn finish_line(&mut self) {
        if !self.at_line_start {
            self.buffer.write_text("\n");
            self.at_line_start = true;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reveal::Epoch;

    fn revealed(epoch: u64, text: &str) -> DisplayUpdate {
        DisplayUpdate::Revealed {
            epoch: Epoch::new(epoch),
            units: text.chars().count(),
            text: text.to_string(),
        }
    }

    fn screen(bytes: &[u8]) -> vt100::Parser {
        let mut parser = vt100::Parser::new(10, 40, 0);
        parser.process(bytes);
        parser
    }

    #[test]
    fn test_printer_streams_text() {
        let mut printer = RevealPrinter::new(Vec::new(), false);
        for piece in ["Hel", "lo\nwor", "ld"] {
            printer.apply(&revealed(0, piece)).unwrap();
        }
        printer.apply(&DisplayUpdate::Idle { epoch: Epoch::new(0) }).unwrap();
        assert_eq!(printer.projection().as_str(), "Hello\nworld");

        let parser = screen(&printer.into_inner());
        assert_eq!(parser.screen().contents(), "Hello\nworld");
        assert_eq!(parser.screen().cursor_position(), (2, 0));
    }

    #[test]
    fn test_printer_skips_superseded_stream() {
        let mut printer = RevealPrinter::new(Vec::new(), false);
        printer.apply(&revealed(0, "X")).unwrap();
        printer.apply(&DisplayUpdate::Reset { epoch: Epoch::new(1) }).unwrap();
        printer.apply(&revealed(0, "late")).unwrap();
        printer.apply(&revealed(1, "Y")).unwrap();
        printer.apply(&DisplayUpdate::Idle { epoch: Epoch::new(0) }).unwrap();

        assert_eq!(printer.projection().as_str(), "Y");
        let parser = screen(&printer.into_inner());
        assert_eq!(parser.screen().contents(), "X\nY");
    }

    #[test]
    fn test_header_is_styled() {
        let mut printer = RevealPrinter::new(Vec::new(), true);
        printer.header("why is the sky blue?").unwrap();
        printer.apply(&revealed(0, "Rayleigh")).unwrap();

        let parser = screen(&printer.into_inner());
        let screen = parser.screen();
        assert_eq!(screen.contents(), "> why is the sky blue?\nRayleigh");
        let marker = screen.cell(0, 0).unwrap();
        assert!(marker.bold());
        assert_eq!(marker.fgcolor(), vt100::Color::Rgb(100, 180, 255));
        assert_eq!(screen.cell(1, 0).unwrap().fgcolor(), vt100::Color::Default);
    }
}
