//! Button-driven display mode controller

use super::debounce::Debouncer;
use super::events::{ButtonEvent, Edge, ModeEvent};
use super::machine::DisplayMode;

/// Owns the display mode and decides which button edges change it
///
/// Only rising edges on the toggle pin are considered, and of those only
/// the ones the debouncer lets through.
#[derive(Debug, Clone)]
pub struct DisplayModeController {
    mode: DisplayMode,
    toggle_pin: u8,
    debouncer: Debouncer,
}

impl DisplayModeController {
    pub fn new(toggle_pin: u8, debounce_ms: u32) -> Self {
        Self {
            mode: DisplayMode::default(),
            toggle_pin,
            debouncer: Debouncer::new(debounce_ms),
        }
    }

    pub fn mode(&self) -> DisplayMode {
        self.mode
    }

    /// Feed a button event; returns the new mode if it changed
    pub fn handle(&mut self, event: ButtonEvent) -> Option<DisplayMode> {
        if event.edge != Edge::Rising || event.pin != self.toggle_pin {
            return None;
        }
        if !self.debouncer.accept(event.at_ms) {
            return None;
        }

        self.mode = self.mode.transition(ModeEvent::Toggle);
        Some(self.mode)
    }
}
