//! Font faces
//!
//! All faces are fixed-width, so the width of a string is known without
//! rasterizing it. That keeps layout deterministic and lets the
//! controller position text for a remote renderer.

use embedded_graphics::mono_font::{ascii, MonoFont};

/// Fixed-width font faces available on every backend
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FontFace {
    /// 5x8, for single-panel builds and secondary text
    Small,
    /// 6x13
    Regular,
    /// 6x13 bold, the countdown face
    Bold,
    /// 8x13 bold, for alerts
    Large,
}

impl FontFace {
    /// Wire identifier
    pub const fn id(self) -> u8 {
        match self {
            FontFace::Small => 0,
            FontFace::Regular => 1,
            FontFace::Bold => 2,
            FontFace::Large => 3,
        }
    }

    pub const fn from_id(id: u8) -> Option<Self> {
        match id {
            0 => Some(FontFace::Small),
            1 => Some(FontFace::Regular),
            2 => Some(FontFace::Bold),
            3 => Some(FontFace::Large),
            _ => None,
        }
    }

    /// Horizontal advance per glyph in pixels
    pub const fn advance(self) -> i32 {
        match self {
            FontFace::Small => 5,
            FontFace::Regular | FontFace::Bold => 6,
            FontFace::Large => 8,
        }
    }

    /// Glyph cell height in pixels
    pub const fn height(self) -> i32 {
        match self {
            FontFace::Small => 8,
            FontFace::Regular | FontFace::Bold | FontFace::Large => 13,
        }
    }

    /// Matching `embedded-graphics` font
    pub fn mono_font(self) -> &'static MonoFont<'static> {
        match self {
            FontFace::Small => &ascii::FONT_5X8,
            FontFace::Regular => &ascii::FONT_6X13,
            FontFace::Bold => &ascii::FONT_6X13_BOLD,
            FontFace::Large => &ascii::FONT_8X13_BOLD,
        }
    }

    /// Width of `text` in pixels
    pub fn text_width(self, text: &str) -> i32 {
        text.chars().count() as i32 * self.advance()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [FontFace; 4] = [FontFace::Small, FontFace::Regular, FontFace::Bold, FontFace::Large];

    #[test]
    fn test_id_round_trip() {
        for face in ALL {
            assert_eq!(FontFace::from_id(face.id()), Some(face));
        }
        assert_eq!(FontFace::from_id(4), None);
    }

    #[test]
    fn test_advance_matches_mono_font() {
        for face in ALL {
            let font = face.mono_font();
            let advance = font.character_size.width + font.character_spacing;
            assert_eq!(advance as i32, face.advance());
            assert_eq!(font.character_size.height as i32, face.height());
        }
    }

    #[test]
    fn test_text_width() {
        assert_eq!(FontFace::Bold.text_width("DAYS"), 24);
        assert_eq!(FontFace::Large.text_width("STOP AT"), 56);
        assert_eq!(FontFace::Small.text_width(""), 0);
    }
}
