//! Level-to-edge conversion

use climeter_hal::{InputPin, Level};

use crate::state::{ButtonEvent, Edge};

/// Turns successive pin level samples into [`ButtonEvent`]s
#[derive(Debug, Clone, Copy)]
pub struct EdgeDetector {
    pin: u8,
    last: Level,
}

impl EdgeDetector {
    /// `initial` is the level the pin idles at
    pub const fn new(pin: u8, initial: Level) -> Self {
        Self { pin, last: initial }
    }

    pub fn pin(&self) -> u8 {
        self.pin
    }

    /// Feed a level sample taken at `at_ms`
    pub fn sample(&mut self, level: Level, at_ms: u64) -> Option<ButtonEvent> {
        if level == self.last {
            return None;
        }
        self.last = level;

        let edge = match level {
            Level::High => Edge::Rising,
            Level::Low => Edge::Falling,
        };
        Some(ButtonEvent {
            edge,
            pin: self.pin,
            at_ms,
        })
    }

    /// Read a pin and feed its level
    pub fn poll<P: InputPin>(&mut self, pin: &P, at_ms: u64) -> Option<ButtonEvent> {
        self.sample(pin.level(), at_ms)
    }
}
