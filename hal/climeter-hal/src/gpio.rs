//! GPIO pin abstractions
//!
//! The clock only ever reads pins: a toggle button and, on some builds,
//! a second spare button. Outputs are owned by the matrix driver.

/// Logic level of a digital pin
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Level {
    /// Logic 0
    Low,
    /// Logic 1
    High,
}

impl Level {
    /// Level from a boolean (`true` = high)
    pub const fn from_bool(high: bool) -> Self {
        if high {
            Level::High
        } else {
            Level::Low
        }
    }

    /// Check if this is the high level
    pub const fn is_high(self) -> bool {
        matches!(self, Level::High)
    }
}

/// Digital input pin
///
/// Implementations should handle the actual hardware register reading
/// for the specific chip.
pub trait InputPin {
    /// Check if the pin reads high (logic 1)
    fn is_high(&self) -> bool;

    /// Check if the pin reads low (logic 0)
    fn is_low(&self) -> bool {
        !self.is_high()
    }

    /// Read the current level
    fn level(&self) -> Level {
        Level::from_bool(self.is_high())
    }
}

/// Active-low adapter
///
/// Buttons wired to ground with a pull-up read low when pressed. Wrapping
/// the pin makes "pressed" read as high, so a press is always a rising edge
/// for the rest of the firmware.
#[derive(Debug)]
pub struct Inverted<P> {
    pin: P,
    enabled: bool,
}

impl<P: InputPin> Inverted<P> {
    /// Wrap a pin, inverting its level when `enabled` is set
    pub const fn new(pin: P, enabled: bool) -> Self {
        Self { pin, enabled }
    }

    /// Access the wrapped pin
    pub fn inner(&self) -> &P {
        &self.pin
    }

    /// Mutable access to the wrapped pin (for edge waits)
    pub fn inner_mut(&mut self) -> &mut P {
        &mut self.pin
    }
}

impl<P: InputPin> InputPin for Inverted<P> {
    fn is_high(&self) -> bool {
        self.pin.is_high() != self.enabled
    }
}

impl<P: InputPin + ?Sized> InputPin for &P {
    fn is_high(&self) -> bool {
        (**self).is_high()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::cell::Cell;

    struct FakePin(Cell<bool>);

    impl InputPin for FakePin {
        fn is_high(&self) -> bool {
            self.0.get()
        }
    }

    #[test]
    fn test_level_from_pin() {
        let pin = FakePin(Cell::new(true));
        assert_eq!(pin.level(), Level::High);
        pin.0.set(false);
        assert_eq!(pin.level(), Level::Low);
        assert!(pin.is_low());
    }

    #[test]
    fn test_inverted_pin() {
        let pin = Inverted::new(FakePin(Cell::new(false)), true);
        assert!(pin.is_high());
        pin.inner().0.set(true);
        assert!(pin.is_low());
    }

    #[test]
    fn test_inversion_disabled_passes_through() {
        let pin = Inverted::new(FakePin(Cell::new(true)), false);
        assert!(pin.is_high());
    }

    #[test]
    fn test_level_from_bool() {
        assert!(Level::from_bool(true).is_high());
        assert_eq!(Level::from_bool(false), Level::Low);
    }
}
