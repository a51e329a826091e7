//! Board-agnostic core logic for the Climeter clock firmware
//!
//! This crate contains all application logic that does not depend on
//! specific hardware implementations:
//!
//! - Calendar-correct countdown toward a fixed deadline
//! - Linear projection of snapshot metrics (and their zero-crossings)
//! - Display mode state machine with debounced button input
//! - Per-minute alert comparator
//! - Single-slot hand-off of button edges between execution contexts
//! - Configuration types and the `clock.toml` parser
//! - The per-tick engine tying all of the above together

#![no_std]
#![deny(unsafe_code)]

#[cfg(test)]
extern crate std;

pub mod config;
pub mod countdown;
pub mod engine;
pub mod input;
pub mod projection;
pub mod state;
pub mod traits;

pub use engine::{ClockEngine, EngineError, TickSnapshot};
