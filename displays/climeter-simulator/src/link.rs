//! In-process stand-in for the UART link
//!
//! Both ends exchange encoded protocol frames as raw bytes, so each
//! parser sees exactly what it would see on the wire.

use std::collections::VecDeque;

use climeter_core::traits::OffsetClock;
use climeter_display::remote::{apply, draw_command, Applied};
use climeter_display::{BackendError, FontFace, GraphicsBackend, MatrixBackend};
use climeter_protocol::{Frame, FrameError, FrameParser, MatrixCommand, MatrixEvent};
use embedded_graphics::pixelcolor::Rgb888;
use embedded_graphics::prelude::{DrawTarget, Point};
use log::{debug, info, trace, warn};

fn encode_into(queue: &mut VecDeque<u8>, frame: Result<Frame, FrameError>) -> Result<(), FrameError> {
    let bytes = frame?.encode_to_vec()?;
    queue.extend(bytes.iter().copied());
    Ok(())
}

/// Controller end: backend calls become frames toward the driver
pub struct ControllerLink {
    seq: u8,
    parser: FrameParser,
    tx: VecDeque<u8>,
}

impl Default for ControllerLink {
    fn default() -> Self {
        Self::new()
    }
}

impl ControllerLink {
    pub fn new() -> Self {
        Self {
            seq: 0,
            parser: FrameParser::new(),
            tx: VecDeque::new(),
        }
    }

    pub fn send(&mut self, command: MatrixCommand<'_>) -> Result<(), BackendError> {
        encode_into(&mut self.tx, command.to_frame()).map_err(|_| BackendError::InvalidText)
    }

    /// Sequence number sent with the last `Present`
    pub fn seq(&self) -> u8 {
        self.seq
    }

    /// Bytes queued for the driver
    pub fn take_tx(&mut self) -> VecDeque<u8> {
        core::mem::take(&mut self.tx)
    }

    /// Handle bytes from the driver
    ///
    /// Returns the last confirmed sequence number, if any arrived.
    pub fn receive(
        &mut self,
        bytes: impl IntoIterator<Item = u8>,
        clock: &OffsetClock,
        uptime_ms: u64,
    ) -> Option<u8> {
        let mut presented = None;
        for byte in bytes {
            let frame = match self.parser.feed(byte) {
                Ok(Some(frame)) => frame,
                Ok(None) => continue,
                Err(e) => {
                    warn!("Frame parse error: {:?}", e);
                    continue;
                }
            };
            match MatrixEvent::from_frame(&frame) {
                Ok(MatrixEvent::Presented { seq }) => {
                    trace!("Frame {} presented", seq);
                    presented = Some(seq);
                }
                Ok(MatrixEvent::Ping) => {
                    if let Err(e) = self.send(MatrixCommand::Pong) {
                        warn!("Failed to queue PONG: {:?}", e);
                    }
                }
                Ok(MatrixEvent::TimeSync { unix_ms }) => {
                    let first = !clock.is_synced();
                    clock.sync(unix_ms, uptime_ms);
                    if first {
                        info!("Wall clock synced: {} ms since epoch", unix_ms);
                    } else {
                        debug!("Wall clock resynced: {} ms since epoch", unix_ms);
                    }
                }
                Err(e) => warn!("Failed to parse matrix event: {:?}", e),
            }
        }
        presented
    }
}

impl MatrixBackend for ControllerLink {
    fn clear(&mut self) -> Result<(), BackendError> {
        self.send(MatrixCommand::Clear)
    }

    fn draw_text(
        &mut self,
        font: FontFace,
        position: Point,
        color: Rgb888,
        text: &str,
    ) -> Result<i32, BackendError> {
        self.send(draw_command(font, position, color, text))?;
        Ok(font.text_width(text))
    }

    fn swap(&mut self) -> Result<(), BackendError> {
        self.seq = self.seq.wrapping_add(1);
        self.send(MatrixCommand::Present { seq: self.seq })
    }
}

/// Driver end: replays commands onto a draw target
pub struct Driver<D> {
    parser: FrameParser,
    backend: GraphicsBackend<D>,
    tx: VecDeque<u8>,
    brightness: u8,
}

impl<D> Driver<D>
where
    D: DrawTarget<Color = Rgb888>,
{
    pub fn new(target: D) -> Self {
        Self {
            parser: FrameParser::new(),
            backend: GraphicsBackend::new(target),
            tx: VecDeque::new(),
            brightness: 100,
        }
    }

    pub fn display(&self) -> &D {
        self.backend.target()
    }

    /// Frames swapped in so far
    pub fn presented(&self) -> u32 {
        self.backend.presented()
    }

    /// Last requested brightness in percent
    pub fn brightness(&self) -> u8 {
        self.brightness
    }

    pub fn send(&mut self, event: MatrixEvent) {
        if let Err(e) = encode_into(&mut self.tx, event.to_frame()) {
            warn!("Failed to encode {:?}: {:?}", event, e);
        }
    }

    /// Bytes queued for the controller
    pub fn take_tx(&mut self) -> VecDeque<u8> {
        core::mem::take(&mut self.tx)
    }

    /// Handle bytes from the controller
    pub fn receive(&mut self, bytes: impl IntoIterator<Item = u8>) {
        for byte in bytes {
            match self.parser.feed(byte) {
                Ok(Some(frame)) => self.handle(&frame),
                Ok(None) => {}
                Err(e) => warn!("Frame parse error: {:?}", e),
            }
        }
    }

    fn handle(&mut self, frame: &Frame) {
        let command = match MatrixCommand::from_frame(frame) {
            Ok(command) => command,
            Err(e) => {
                warn!("Failed to parse matrix command: {:?}", e);
                return;
            }
        };
        match apply(&command, &mut self.backend) {
            Ok(Applied::Presented(seq)) => self.send(MatrixEvent::Presented { seq }),
            Ok(Applied::Brightness(percent)) => {
                info!("Brightness set to {}%", percent);
                self.brightness = percent;
            }
            Ok(Applied::Drawn | Applied::Ignored) => {}
            Err(e) => warn!("Failed to apply command: {:?}", e),
        }
    }
}
