//! Inter-task communication
//!
//! The render loop owns the clock engine. Other tasks only talk to it
//! through these statics.

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;
use embassy_sync::signal::Signal;

use climeter_core::input::EdgeLatch;
use climeter_core::traits::OffsetClock;
use climeter_protocol::Frame;

/// Outgoing frame queue depth
///
/// A full frame is one `Clear`, up to 16 `DrawText` and one `Present`, all
/// queued before the TX task gets to run.
pub const OUTGOING_SIZE: usize = 24;

const _: () = assert!(OUTGOING_SIZE >= climeter_display::present::MAX_COMMANDS);

/// Pending button edge, consumed once per tick
pub static BUTTON_EDGE: EdgeLatch = EdgeLatch::new();

/// Wall clock, valid after the matrix driver sent a `TimeSync`
pub static WALL_CLOCK: OffsetClock = OffsetClock::new();

/// Frames waiting for the UART
pub static OUTGOING: Channel<CriticalSectionRawMutex, Frame, OUTGOING_SIZE> = Channel::new();

/// Sequence number of the last frame the matrix confirmed
pub static PRESENTED: Signal<CriticalSectionRawMutex, u8> = Signal::new();
