//! Render frame: what to draw, where, and in which color

use core::fmt::{self, Write};

use embedded_graphics::pixelcolor::Rgb888;
use embedded_graphics::prelude::Point;
use heapless::{String, Vec};

use crate::font::FontFace;

/// Maximum entries per frame
pub const MAX_ENTRIES: usize = 16;

/// Maximum text length per entry
pub const MAX_ENTRY_LEN: usize = 24;

/// Frame building error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BuildError {
    /// More than [`MAX_ENTRIES`] entries
    TooManyEntries,
    /// Entry text longer than [`MAX_ENTRY_LEN`]
    TextTooLong,
}

/// One positioned, colored string
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameEntry {
    pub text: String<MAX_ENTRY_LEN>,
    pub color: Rgb888,
    /// Baseline-left corner of the first glyph
    pub position: Point,
    pub font: FontFace,
}

impl FrameEntry {
    /// Horizontal extent in pixels
    pub fn width(&self) -> i32 {
        self.font.text_width(&self.text)
    }
}

/// Ordered list of entries making up one screen
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RenderFrame {
    entries: Vec<FrameEntry, MAX_ENTRIES>,
}

impl RenderFrame {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, entry: FrameEntry) -> Result<(), BuildError> {
        self.entries
            .push(entry)
            .map_err(|_| BuildError::TooManyEntries)
    }

    /// Append formatted text
    pub fn push_fmt(
        &mut self,
        args: fmt::Arguments<'_>,
        color: Rgb888,
        position: Point,
        font: FontFace,
    ) -> Result<&FrameEntry, BuildError> {
        let mut text = String::new();
        text.write_fmt(args).map_err(|_| BuildError::TextTooLong)?;
        self.push(FrameEntry {
            text,
            color,
            position,
            font,
        })?;
        // Just pushed
        self.entries.last().ok_or(BuildError::TooManyEntries)
    }

    pub fn entries(&self) -> &[FrameEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// First entry with exactly this text
    pub fn find(&self, text: &str) -> Option<&FrameEntry> {
        self.entries.iter().find(|e| e.text.as_str() == text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::YELLOW;

    #[test]
    fn test_push_fmt() {
        let mut frame = RenderFrame::new();
        let entry = frame
            .push_fmt(format_args!("{:03}", 7), YELLOW, Point::new(1, 13), FontFace::Bold)
            .unwrap();
        assert_eq!(entry.text.as_str(), "007");
        assert_eq!(entry.width(), 18);
        assert_eq!(frame.len(), 1);
        assert!(frame.find("007").is_some());
    }

    #[test]
    fn test_text_too_long() {
        let mut frame = RenderFrame::new();
        let long = "0123456789012345678901234";
        let err = frame
            .push_fmt(format_args!("{long}"), YELLOW, Point::zero(), FontFace::Small)
            .unwrap_err();
        assert_eq!(err, BuildError::TextTooLong);
        assert!(frame.is_empty());
    }

    #[test]
    fn test_too_many_entries() {
        let mut frame = RenderFrame::new();
        for i in 0..MAX_ENTRIES {
            frame
                .push_fmt(format_args!("{i}"), YELLOW, Point::zero(), FontFace::Small)
                .unwrap();
        }
        let err = frame
            .push_fmt(format_args!("x"), YELLOW, Point::zero(), FontFace::Small)
            .unwrap_err();
        assert_eq!(err, BuildError::TooManyEntries);
    }
}
