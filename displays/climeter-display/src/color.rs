//! Palette

use embedded_graphics::pixelcolor::{Rgb888, RgbColor};

/// Countdown digits
pub const YELLOW: Rgb888 = Rgb888::new(0xff, 0xd9, 0x19);
/// Unit labels
pub const ALT_YELLOW: Rgb888 = Rgb888::new(0xc8, 0x89, 0x0a);
pub const RED: Rgb888 = Rgb888::new(0xff, 0x00, 0x00);
pub const GREEN: Rgb888 = Rgb888::new(0x00, 0xff, 0x00);

/// Channels as `[r, g, b]`
pub fn to_rgb(color: Rgb888) -> [u8; 3] {
    [color.r(), color.g(), color.b()]
}

/// Color from `[r, g, b]`
pub fn from_rgb(rgb: [u8; 3]) -> Rgb888 {
    Rgb888::new(rgb[0], rgb[1], rgb[2])
}
