//! Link messages
//!
//! - Controller → matrix: drawing commands and heartbeat replies
//! - Matrix → controller: frame confirmations, heartbeats, wall time

use heapless::Vec;

use crate::frame::{Frame, FrameError, MAX_PAYLOAD_SIZE};

// Message type IDs: matrix → controller
pub const MSG_PRESENTED: u8 = 0x01;
pub const MSG_PING: u8 = 0x02;
pub const MSG_TIME_SYNC: u8 = 0x03;

// Message type IDs: controller → matrix
pub const MSG_CLEAR: u8 = 0x30;
pub const MSG_DRAW_TEXT: u8 = 0x31;
pub const MSG_PRESENT: u8 = 0x32;
pub const MSG_BRIGHTNESS: u8 = 0x33;
pub const MSG_PONG: u8 = 0x34;

/// Longest text carried by one `DrawText`
pub const MAX_TEXT_LEN: usize = 32;

/// `DrawText` header: font, x (2), y (2), r, g, b, text length
const DRAW_TEXT_HEADER: usize = 9;

/// Commands from the controller to the matrix driver
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum MatrixCommand<'a> {
    /// Clear the back buffer
    Clear,
    /// Draw text with its baseline-left corner at (x, y)
    DrawText {
        font: u8,
        x: i16,
        y: i16,
        rgb: [u8; 3],
        text: &'a str,
    },
    /// Swap the back buffer in on the next vsync, then confirm `seq`
    Present { seq: u8 },
    /// Panel brightness in percent
    Brightness(u8),
    /// Heartbeat response
    Pong,
}

impl<'a> MatrixCommand<'a> {
    /// Encode into a frame
    ///
    /// Text longer than [`MAX_TEXT_LEN`] bytes is cut at the last character
    /// boundary that fits.
    pub fn to_frame(&self) -> Result<Frame, FrameError> {
        match self {
            MatrixCommand::Clear => Ok(Frame::empty(MSG_CLEAR)),
            MatrixCommand::DrawText {
                font,
                x,
                y,
                rgb,
                text,
            } => {
                let text = truncate(text, MAX_TEXT_LEN);
                let x = x.to_le_bytes();
                let y = y.to_le_bytes();

                let mut payload = Vec::<u8, MAX_PAYLOAD_SIZE>::new();
                payload
                    .extend_from_slice(&[*font, x[0], x[1], y[0], y[1], rgb[0], rgb[1], rgb[2]])
                    .map_err(|_| FrameError::PayloadTooLarge)?;
                payload
                    .push(text.len() as u8)
                    .map_err(|_| FrameError::PayloadTooLarge)?;
                payload
                    .extend_from_slice(text.as_bytes())
                    .map_err(|_| FrameError::PayloadTooLarge)?;

                Frame::new(MSG_DRAW_TEXT, &payload)
            }
            MatrixCommand::Present { seq } => Frame::new(MSG_PRESENT, &[*seq]),
            MatrixCommand::Brightness(percent) => Frame::new(MSG_BRIGHTNESS, &[*percent]),
            MatrixCommand::Pong => Ok(Frame::empty(MSG_PONG)),
        }
    }

    /// Decode a frame received by the matrix driver
    pub fn from_frame(frame: &'a Frame) -> Result<Self, FrameError> {
        let p = frame.payload.as_slice();
        match frame.msg_type {
            MSG_CLEAR => Ok(MatrixCommand::Clear),
            MSG_DRAW_TEXT => {
                let header = p.get(..DRAW_TEXT_HEADER).ok_or(FrameError::InvalidFrame)?;
                let len = header[8] as usize;
                let bytes = p
                    .get(DRAW_TEXT_HEADER..DRAW_TEXT_HEADER + len)
                    .ok_or(FrameError::InvalidFrame)?;
                let text = core::str::from_utf8(bytes).map_err(|_| FrameError::InvalidFrame)?;

                Ok(MatrixCommand::DrawText {
                    font: header[0],
                    x: i16::from_le_bytes([header[1], header[2]]),
                    y: i16::from_le_bytes([header[3], header[4]]),
                    rgb: [header[5], header[6], header[7]],
                    text,
                })
            }
            MSG_PRESENT => Ok(MatrixCommand::Present { seq: first(p)? }),
            MSG_BRIGHTNESS => Ok(MatrixCommand::Brightness(first(p)?)),
            MSG_PONG => Ok(MatrixCommand::Pong),
            _ => Err(FrameError::InvalidFrame),
        }
    }
}

/// Messages from the matrix driver to the controller
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum MatrixEvent {
    /// Frame `seq` is on the panels
    Presented { seq: u8 },
    /// Heartbeat request
    Ping,
    /// Current Unix time in milliseconds
    TimeSync { unix_ms: i64 },
}

impl MatrixEvent {
    pub fn from_frame(frame: &Frame) -> Result<Self, FrameError> {
        let p = frame.payload.as_slice();
        match frame.msg_type {
            MSG_PRESENTED => Ok(MatrixEvent::Presented { seq: first(p)? }),
            MSG_PING => Ok(MatrixEvent::Ping),
            MSG_TIME_SYNC => {
                let bytes: [u8; 8] = p
                    .get(..8)
                    .and_then(|b| b.try_into().ok())
                    .ok_or(FrameError::InvalidFrame)?;
                Ok(MatrixEvent::TimeSync {
                    unix_ms: i64::from_le_bytes(bytes),
                })
            }
            _ => Err(FrameError::InvalidFrame),
        }
    }

    /// Encode into a frame (matrix side, or for simulation)
    pub fn to_frame(&self) -> Result<Frame, FrameError> {
        match self {
            MatrixEvent::Presented { seq } => Frame::new(MSG_PRESENTED, &[*seq]),
            MatrixEvent::Ping => Ok(Frame::empty(MSG_PING)),
            MatrixEvent::TimeSync { unix_ms } => Frame::new(MSG_TIME_SYNC, &unix_ms.to_le_bytes()),
        }
    }
}

fn first(payload: &[u8]) -> Result<u8, FrameError> {
    payload.first().copied().ok_or(FrameError::InvalidFrame)
}

fn truncate(text: &str, max: usize) -> &str {
    if text.len() <= max {
        return text;
    }
    let mut end = max;
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    &text[..end]
}
