//! LED matrix options
//!
//! These are handed to the matrix driver as-is. The only one the clock
//! logic itself looks at is the chain length, which picks the layout.

use heapless::String;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Maximum length of the hardware mapping name
pub const MAX_MAPPING_LEN: usize = 24;

/// Number of panels daisy-chained horizontally
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum ChainLength {
    One,
    #[default]
    Two,
    Three,
}

impl ChainLength {
    pub const fn from_panels(panels: u8) -> Option<Self> {
        match panels {
            1 => Some(Self::One),
            2 => Some(Self::Two),
            3 => Some(Self::Three),
            _ => None,
        }
    }

    pub const fn panels(self) -> u8 {
        match self {
            Self::One => 1,
            Self::Two => 2,
            Self::Three => 3,
        }
    }
}

/// Matrix driver options
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct MatrixOptions {
    /// Pixel rows per panel
    pub rows: u8,
    /// Pixel columns per panel
    pub cols: u8,
    pub chain_length: ChainLength,
    /// Parallel chains
    pub parallel: u8,
    /// Brightness in percent (1-100)
    pub brightness: u8,
    /// Adapter board pinout name (e.g. "regular", "adafruit-hat")
    pub hardware_mapping: String<MAX_MAPPING_LEN>,
    /// GPIO slowdown factor for fast host CPUs
    pub gpio_slowdown: u8,
}

impl Default for MatrixOptions {
    fn default() -> Self {
        let mut hardware_mapping = String::new();
        // "regular" always fits
        let _ = hardware_mapping.push_str("regular");

        Self {
            rows: 32,
            cols: 64,
            chain_length: ChainLength::default(),
            parallel: 1,
            brightness: 100,
            hardware_mapping,
            gpio_slowdown: 1,
        }
    }
}

impl MatrixOptions {
    /// Total width in pixels across the chain
    pub fn width(&self) -> u16 {
        self.cols as u16 * self.chain_length.panels() as u16
    }

    /// Total height in pixels across parallel chains
    pub fn height(&self) -> u16 {
        self.rows as u16 * self.parallel as u16
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chain_length() {
        assert_eq!(ChainLength::from_panels(1), Some(ChainLength::One));
        assert_eq!(ChainLength::from_panels(3).map(ChainLength::panels), Some(3));
        assert_eq!(ChainLength::from_panels(0), None);
        assert_eq!(ChainLength::from_panels(4), None);
    }

    #[test]
    fn test_default_geometry() {
        let options = MatrixOptions::default();
        assert_eq!(options.width(), 128);
        assert_eq!(options.height(), 32);
        assert_eq!(options.hardware_mapping.as_str(), "regular");
    }
}
