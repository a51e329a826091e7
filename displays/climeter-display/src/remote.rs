//! Drawing over the matrix link
//!
//! The controller turns backend calls into [`MatrixCommand`]s; the matrix
//! driver replays them onto its local backend.

use climeter_protocol::MatrixCommand;
use embedded_graphics::pixelcolor::Rgb888;
use embedded_graphics::prelude::Point;

use crate::backend::{BackendError, MatrixBackend};
use crate::color::{from_rgb, to_rgb};
use crate::font::FontFace;

/// `DrawText` command for a backend `draw_text` call
///
/// Coordinates outside the `i16` range are clamped; they are off-panel
/// either way.
pub fn draw_command(font: FontFace, position: Point, color: Rgb888, text: &str) -> MatrixCommand<'_> {
    MatrixCommand::DrawText {
        font: font.id(),
        x: clamp_i16(position.x),
        y: clamp_i16(position.y),
        rgb: to_rgb(color),
        text,
    }
}

fn clamp_i16(v: i32) -> i16 {
    v.clamp(i16::MIN as i32, i16::MAX as i32) as i16
}

/// Effect of a replayed command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Applied {
    /// Back buffer changed
    Drawn,
    /// Frame `seq` was swapped in; confirm it to the controller
    Presented(u8),
    /// Panel brightness requested, in percent
    Brightness(u8),
    /// Nothing to do locally
    Ignored,
}

/// Replay a received command onto a local backend
pub fn apply<B: MatrixBackend + ?Sized>(
    command: &MatrixCommand<'_>,
    backend: &mut B,
) -> Result<Applied, BackendError> {
    match *command {
        MatrixCommand::Clear => {
            backend.clear()?;
            Ok(Applied::Drawn)
        }
        MatrixCommand::DrawText {
            font,
            x,
            y,
            rgb,
            text,
        } => {
            let font = FontFace::from_id(font).ok_or(BackendError::InvalidText)?;
            backend.draw_text(font, Point::new(x.into(), y.into()), from_rgb(rgb), text)?;
            Ok(Applied::Drawn)
        }
        MatrixCommand::Present { seq } => {
            backend.swap()?;
            Ok(Applied::Presented(seq))
        }
        MatrixCommand::Brightness(percent) => Ok(Applied::Brightness(percent)),
        MatrixCommand::Pong => Ok(Applied::Ignored),
    }
}
