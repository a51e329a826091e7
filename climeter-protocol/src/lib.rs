//! Matrix link protocol
//!
//! The controller (RP2040) owns the clock and decides what to draw. The
//! matrix driver board owns the panels and the HUB75 timing, and knows the
//! wall-clock time. The two talk over a UART using small binary frames:
//!
//! ```text
//! ┌───────┬────────┬──────┬─────────────┬───────┐
//! │ START │ LENGTH │ TYPE │ PAYLOAD     │ CRC-8 │
//! │ 1B    │ 1B     │ 1B   │ 0–250B      │ 1B    │
//! └───────┴────────┴──────┴─────────────┴───────┘
//! ```
//!
//! A frame on the matrix is built from `Clear`, a run of `DrawText`
//! commands and a closing `Present`, which the driver confirms once the
//! back buffer has been swapped in on vsync.

#![no_std]
#![deny(unsafe_code)]

pub mod crc;
pub mod frame;
pub mod messages;

pub use frame::{Frame, FrameError, FrameParser, FRAME_START, MAX_FRAME_SIZE, MAX_PAYLOAD_SIZE};
pub use messages::{MatrixCommand, MatrixEvent, MAX_TEXT_LEN};
