//! Rendering for the Climeter clock
//!
//! This crate provides:
//! - `FrameBuilder`, which turns a tick snapshot into an ordered list of
//!   positioned, colored text entries
//! - Fixed layout tables keyed by how many panels are chained
//! - `MatrixBackend`, the narrow interface to whatever draws the pixels
//! - `GraphicsBackend`, a backend over any `embedded-graphics` draw target
//!
//! # Architecture
//!
//! ```text
//! TickSnapshot ──► FrameBuilder ──► RenderFrame ──► present() ──► MatrixBackend
//!                     (layout)                                    ├─ GraphicsBackend (local pixels)
//!                                                                 └─ link backend (UART frames)
//! ```
//!
//! On the matrix driver side, `remote::apply` replays received link
//! commands onto a local backend.

#![no_std]
#![deny(unsafe_code)]

pub mod backend;
pub mod builder;
pub mod color;
pub mod font;
pub mod frame;
pub mod graphics;
pub mod layout;
pub mod present;
pub mod remote;

pub use backend::{BackendError, MatrixBackend};
pub use builder::FrameBuilder;
pub use font::FontFace;
pub use frame::{BuildError, FrameEntry, RenderFrame};
pub use graphics::GraphicsBackend;
pub use layout::{layout_for, Layout};
pub use present::present;

#[cfg(test)]
extern crate std;
