//! Matrix backend trait
//!
//! The clock never touches pixels itself. Everything it draws goes through
//! these three calls.

use embedded_graphics::pixelcolor::Rgb888;
use embedded_graphics::prelude::Point;

use crate::font::FontFace;

/// Matrix backend errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BackendError {
    /// Underlying draw target or link failed
    Communication,
    /// Outgoing command queue is full
    QueueFull,
    /// Text could not be encoded for the backend
    InvalidText,
}

/// Renderer collaborator
///
/// Drawing goes to a back buffer; `swap` makes it visible.
pub trait MatrixBackend {
    /// Clear the back buffer
    fn clear(&mut self) -> Result<(), BackendError>;

    /// Draw `text` with its baseline-left corner at `position`
    ///
    /// Returns the horizontal advance in pixels.
    fn draw_text(
        &mut self,
        font: FontFace,
        position: Point,
        color: Rgb888,
        text: &str,
    ) -> Result<i32, BackendError>;

    /// Present the back buffer (on vsync where the hardware has one)
    fn swap(&mut self) -> Result<(), BackendError>;
}
