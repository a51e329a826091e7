//! Display mode state machine and alert comparator
//!
//! The display mode is the only piece of state that survives between
//! ticks. It changes solely through debounced button edges. The alert
//! state is recomputed every tick from the countdown and never feeds back
//! into the mode.

pub mod alert;
pub mod controller;
pub mod debounce;
pub mod events;
pub mod machine;

pub use alert::{AlertComparator, AlertState};
pub use controller::DisplayModeController;
pub use debounce::Debouncer;
pub use events::{ButtonEvent, Edge, ModeEvent};
pub use machine::DisplayMode;
