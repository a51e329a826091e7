//! Climeter Hardware Abstraction Layer
//!
//! This crate defines the hardware abstraction traits the clock logic
//! consumes. Chip-specific code (the RP2040 firmware, host test doubles)
//! implements them so the countdown engine never touches registers.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │  Application (climeter-firmware)        │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  climeter-hal (this crate - traits)     │
//! └─────────────────────────────────────────┘
//!                     │
//!         ┌───────────┴───────────┐
//!         ▼                       ▼
//! ┌───────────────┐       ┌───────────────┐
//! │ embassy-rp    │       │ host test     │
//! │ Input wrapper │       │ doubles       │
//! └───────────────┘       └───────────────┘
//! ```
//!
//! # Traits
//!
//! - [`gpio::InputPin`] - Digital input level reads
//! - [`gpio::Inverted`] - Active-low adapter driven by pin configuration

#![no_std]
#![deny(unsafe_code)]

pub mod gpio;

pub use gpio::{InputPin, Inverted, Level};
