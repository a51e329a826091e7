//! Per-minute alert comparator
//!
//! For the last few seconds of every minute the countdown gives way to a
//! fixed message. This is independent of the display mode.

use crate::countdown::TimeBreakdown;

/// Seconds field at which the alert takes over
pub const DEFAULT_ALERT_THRESHOLD_S: u8 = 55;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AlertState {
    /// Normal countdown rendering
    #[default]
    Countdown,
    /// Alert message replaces the countdown
    Stop,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct AlertComparator {
    enabled: bool,
    threshold_s: u8,
}

impl Default for AlertComparator {
    fn default() -> Self {
        Self::new(true, DEFAULT_ALERT_THRESHOLD_S)
    }
}

impl AlertComparator {
    pub const fn new(enabled: bool, threshold_s: u8) -> Self {
        Self {
            enabled,
            threshold_s,
        }
    }

    pub const fn disabled() -> Self {
        Self::new(false, DEFAULT_ALERT_THRESHOLD_S)
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn threshold_s(&self) -> u8 {
        self.threshold_s
    }

    /// Evaluate against this tick's countdown, if there is one
    pub fn evaluate(&self, countdown: Option<&TimeBreakdown>) -> AlertState {
        match countdown {
            Some(b) if self.enabled && !b.expired && b.seconds >= self.threshold_s => AlertState::Stop,
            _ => AlertState::Countdown,
        }
    }
}
