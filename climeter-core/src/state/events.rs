//! Input events

/// Signal edge on an input pin
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Edge {
    /// Low to high
    Rising,
    /// High to low
    Falling,
}

/// A detected edge on a GPIO pin
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ButtonEvent {
    pub edge: Edge,
    /// GPIO number the edge was seen on
    pub pin: u8,
    /// Monotonic uptime in milliseconds
    pub at_ms: u64,
}

impl ButtonEvent {
    pub const fn rising(pin: u8, at_ms: u64) -> Self {
        Self {
            edge: Edge::Rising,
            pin,
            at_ms,
        }
    }

    pub const fn falling(pin: u8, at_ms: u64) -> Self {
        Self {
            edge: Edge::Falling,
            pin,
            at_ms,
        }
    }

    pub fn is_rising(&self) -> bool {
        self.edge == Edge::Rising
    }
}

/// Events that drive the display mode machine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ModeEvent {
    /// Accepted press of the toggle button
    Toggle,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constructors() {
        let up = ButtonEvent::rising(24, 1_000);
        assert!(up.is_rising());
        assert_eq!(up.pin, 24);
        assert_eq!(up.at_ms, 1_000);

        let down = ButtonEvent::falling(24, 1_050);
        assert!(!down.is_rising());
        assert_eq!(down.edge, Edge::Falling);
    }
}
