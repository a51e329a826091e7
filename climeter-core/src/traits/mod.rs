//! Collaborator traits
//!
//! These traits define the interface between the clock logic and
//! whatever supplies wall-clock time on a given board.

pub mod clock;

pub use clock::{OffsetClock, SyncedClock, WallClock};
