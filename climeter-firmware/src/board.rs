//! Board wiring
//!
//! GPIO0/GPIO1 carry the matrix link (UART0). Any other GPIO can take the
//! toggle button; which one comes from `clock.toml`.

use embassy_rp::gpio::{AnyPin, Input};
use embassy_rp::Peri;

use climeter_hal::InputPin;

/// Number of GPIOs on the RP2040
pub const GPIO_COUNT: usize = 30;

/// Button input as seen by the clock logic
pub struct ButtonInput(pub Input<'static>);

impl InputPin for ButtonInput {
    fn is_high(&self) -> bool {
        self.0.is_high()
    }
}

/// GPIOs not claimed by fixed functions, taken by number
pub struct FreePins {
    pins: [Option<Peri<'static, AnyPin>>; GPIO_COUNT],
}

impl FreePins {
    pub fn new(pins: [Option<Peri<'static, AnyPin>>; GPIO_COUNT]) -> Self {
        Self { pins }
    }

    /// Take a pin; `None` if it is reserved, out of range or already taken
    pub fn take(&mut self, gpio: u8) -> Option<Peri<'static, AnyPin>> {
        self.pins.get_mut(gpio as usize)?.take()
    }
}
