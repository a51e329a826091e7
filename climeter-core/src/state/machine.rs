//! Display mode definition
//!
//! Two modes and no terminal state. What gets drawn is a function of the
//! current mode and the tick's samples.

use super::events::ModeEvent;

/// What the matrix shows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DisplayMode {
    /// Countdown toward the deadline (and projected metrics)
    #[default]
    Deadline,
    /// Current UTC wall-clock time
    CurrentTime,
}

impl DisplayMode {
    /// Process an event and return the next mode
    pub fn transition(self, event: ModeEvent) -> Self {
        use DisplayMode::*;
        use ModeEvent::*;

        match (self, event) {
            (Deadline, Toggle) => CurrentTime,
            (CurrentTime, Toggle) => Deadline,
        }
    }
}
