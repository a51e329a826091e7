//! Backend over an `embedded-graphics` draw target
//!
//! Used by the matrix driver (or a simulator) to rasterize frames locally.
//! The draw target is the back buffer; `swap` counts presented frames and
//! leaves flushing to whoever owns the target.

use embedded_graphics::mono_font::MonoTextStyle;
use embedded_graphics::pixelcolor::{Rgb888, RgbColor};
use embedded_graphics::prelude::{DrawTarget, Point};
use embedded_graphics::text::{Baseline, Text};
use embedded_graphics::Drawable;

use crate::backend::{BackendError, MatrixBackend};
use crate::font::FontFace;

pub struct GraphicsBackend<D> {
    target: D,
    presented: u32,
}

impl<D> GraphicsBackend<D>
where
    D: DrawTarget<Color = Rgb888>,
{
    pub fn new(target: D) -> Self {
        Self {
            target,
            presented: 0,
        }
    }

    pub fn target(&self) -> &D {
        &self.target
    }

    pub fn target_mut(&mut self) -> &mut D {
        &mut self.target
    }

    pub fn into_inner(self) -> D {
        self.target
    }

    /// Frames presented so far
    pub fn presented(&self) -> u32 {
        self.presented
    }
}

impl<D> MatrixBackend for GraphicsBackend<D>
where
    D: DrawTarget<Color = Rgb888>,
{
    fn clear(&mut self) -> Result<(), BackendError> {
        self.target
            .clear(Rgb888::BLACK)
            .map_err(|_| BackendError::Communication)
    }

    fn draw_text(
        &mut self,
        font: FontFace,
        position: Point,
        color: Rgb888,
        text: &str,
    ) -> Result<i32, BackendError> {
        let style = MonoTextStyle::new(font.mono_font(), color);
        let next = Text::with_baseline(text, position, style, Baseline::Alphabetic)
            .draw(&mut self.target)
            .map_err(|_| BackendError::Communication)?;
        Ok(next.x - position.x)
    }

    fn swap(&mut self) -> Result<(), BackendError> {
        self.presented = self.presented.wrapping_add(1);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::YELLOW;
    use embedded_graphics::mock_display::MockDisplay;

    fn backend() -> GraphicsBackend<MockDisplay<Rgb888>> {
        let mut display = MockDisplay::new();
        display.set_allow_out_of_bounds_drawing(true);
        display.set_allow_overdraw(true);
        GraphicsBackend::new(display)
    }

    #[test]
    fn test_advance_matches_font_table() {
        let mut b = backend();
        for face in [FontFace::Small, FontFace::Regular, FontFace::Bold, FontFace::Large] {
            let width = b.draw_text(face, Point::new(1, 13), YELLOW, "DAYS").unwrap();
            assert_eq!(width, face.text_width("DAYS"));
        }
    }

    #[test]
    fn test_glyphs_sit_on_baseline() {
        let mut b = backend();
        b.draw_text(FontFace::Bold, Point::new(1, 13), YELLOW, "276").unwrap();

        let area = b.target().affected_area();
        assert!(area.size.width > 0);
        assert!(area.top_left.x >= 1);
        // Digits have no descenders; the cell extends 2 rows below the baseline
        assert!(area.top_left.y + area.size.height as i32 <= 15);
        assert!(area.top_left.y >= 0);
    }

    #[test]
    fn test_swap_counts_frames() {
        let mut b = backend();
        b.clear().unwrap();
        b.swap().unwrap();
        b.swap().unwrap();
        assert_eq!(b.presented(), 2);
    }
}
