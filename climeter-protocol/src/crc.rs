//! CRC-8 (polynomial 0x07, init 0x00, no reflection)

const POLY: u8 = 0x07;

/// Running CRC-8 over a byte stream
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Crc8(u8);

impl Crc8 {
    pub const fn new() -> Self {
        Self(0)
    }

    pub fn update(&mut self, byte: u8) {
        let mut crc = self.0 ^ byte;
        for _ in 0..8 {
            crc = if crc & 0x80 != 0 { (crc << 1) ^ POLY } else { crc << 1 };
        }
        self.0 = crc;
    }

    pub fn update_slice(&mut self, bytes: &[u8]) {
        for &byte in bytes {
            self.update(byte);
        }
    }

    pub const fn value(self) -> u8 {
        self.0
    }
}

/// CRC-8 of a byte slice
pub fn crc8(bytes: &[u8]) -> u8 {
    let mut crc = Crc8::new();
    crc.update_slice(bytes);
    crc.value()
}
