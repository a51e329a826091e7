//! Matrix backend over the UART link
//!
//! Drawing calls become protocol frames on the outgoing queue. The matrix
//! driver replays them and confirms each `Present` with its sequence
//! number.

use climeter_display::remote::draw_command;
use climeter_display::{BackendError, FontFace, MatrixBackend};
use climeter_protocol::MatrixCommand;
use embassy_time::Timer;
use embedded_graphics::pixelcolor::Rgb888;
use embedded_graphics::prelude::Point;

use crate::channels::OUTGOING;

/// Queue one command for the TX task
pub fn send(command: MatrixCommand<'_>) -> Result<(), BackendError> {
    let frame = command.to_frame().map_err(|_| BackendError::InvalidText)?;
    OUTGOING.try_send(frame).map_err(|_| BackendError::QueueFull)
}

/// Wait until the queue can take `slots` frames in one go
///
/// Queueing right after this returns, without an `.await` in between,
/// cannot hit `QueueFull` halfway through a screen.
pub async fn reserve(slots: usize) {
    while OUTGOING.free_capacity() < slots {
        Timer::after_millis(1).await;
    }
}

/// Backend that forwards everything to the matrix driver
pub struct LinkBackend {
    seq: u8,
}

impl LinkBackend {
    pub const fn new() -> Self {
        Self { seq: 0 }
    }

    /// Sequence number sent with the last `Present`
    pub fn seq(&self) -> u8 {
        self.seq
    }
}

impl MatrixBackend for LinkBackend {
    fn clear(&mut self) -> Result<(), BackendError> {
        send(MatrixCommand::Clear)
    }

    fn draw_text(
        &mut self,
        font: FontFace,
        position: Point,
        color: Rgb888,
        text: &str,
    ) -> Result<i32, BackendError> {
        send(draw_command(font, position, color, text))?;
        // Mono fonts: the advance is known without asking the driver
        Ok(font.text_width(text))
    }

    fn swap(&mut self) -> Result<(), BackendError> {
        self.seq = self.seq.wrapping_add(1);
        send(MatrixCommand::Present { seq: self.seq })
    }
}
