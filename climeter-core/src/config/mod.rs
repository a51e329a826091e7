//! Configuration types
//!
//! Board-agnostic configuration structures, filled from the `clock.toml`
//! embedded in the firmware image.

pub mod matrix;
pub mod parse;
pub mod types;

pub use matrix::*;
pub use parse::{parse_config, ParseError, ParseErrorKind};
pub use types::*;
