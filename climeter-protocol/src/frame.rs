//! Frame encoding and decoding
//!
//! - START (1 byte): 0xC5 synchronization byte
//! - LENGTH (1 byte): payload length (0-250)
//! - TYPE (1 byte): message type identifier
//! - PAYLOAD (0-250 bytes)
//! - CRC (1 byte): CRC-8 over LENGTH, TYPE and PAYLOAD

use heapless::Vec;

use crate::crc::Crc8;

/// Frame synchronization byte
pub const FRAME_START: u8 = 0xC5;

/// Maximum payload size in bytes
pub const MAX_PAYLOAD_SIZE: usize = 250;

/// Bytes around the payload: START, LENGTH, TYPE and CRC
const OVERHEAD: usize = 4;

/// Maximum complete frame size
pub const MAX_FRAME_SIZE: usize = MAX_PAYLOAD_SIZE + OVERHEAD;

/// Frame codec error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FrameError {
    /// Payload exceeds maximum allowed size
    PayloadTooLarge,
    /// CRC mismatch
    InvalidChecksum,
    /// Structurally valid frame with contents that make no sense
    InvalidFrame,
    /// Output buffer too small for encoding
    BufferTooSmall,
}

/// A parsed or constructed frame
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pub msg_type: u8,
    pub payload: Vec<u8, MAX_PAYLOAD_SIZE>,
}

impl Frame {
    pub fn new(msg_type: u8, payload: &[u8]) -> Result<Self, FrameError> {
        let payload = Vec::from_slice(payload).map_err(|_| FrameError::PayloadTooLarge)?;
        Ok(Self { msg_type, payload })
    }

    /// Frame with no payload
    pub fn empty(msg_type: u8) -> Self {
        Self {
            msg_type,
            payload: Vec::new(),
        }
    }

    fn checksum(&self) -> u8 {
        let mut crc = Crc8::new();
        crc.update(self.payload.len() as u8);
        crc.update(self.msg_type);
        crc.update_slice(&self.payload);
        crc.value()
    }

    /// Size of this frame on the wire
    pub fn encoded_len(&self) -> usize {
        self.payload.len() + OVERHEAD
    }

    /// Encode into `buffer`, returning the number of bytes written
    pub fn encode(&self, buffer: &mut [u8]) -> Result<usize, FrameError> {
        let len = self.encoded_len();
        let out = buffer.get_mut(..len).ok_or(FrameError::BufferTooSmall)?;

        let (header, rest) = out.split_at_mut(3);
        header.copy_from_slice(&[FRAME_START, self.payload.len() as u8, self.msg_type]);
        let (body, crc) = rest.split_at_mut(self.payload.len());
        body.copy_from_slice(&self.payload);
        crc[0] = self.checksum();

        Ok(len)
    }

    /// Encode into a heapless Vec
    pub fn encode_to_vec(&self) -> Result<Vec<u8, MAX_FRAME_SIZE>, FrameError> {
        let mut out = Vec::new();
        out.resize(self.encoded_len(), 0)
            .map_err(|_| FrameError::BufferTooSmall)?;
        self.encode(&mut out)?;
        Ok(out)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stage {
    /// Hunting for START
    Sync,
    Length,
    Type,
    Payload,
    Crc,
}

/// Byte-at-a-time frame decoder
///
/// Bytes outside a frame are skipped until the next START byte. After a
/// bad frame the decoder goes back to hunting, so a corrupted byte costs
/// at most one frame.
#[derive(Debug, Clone)]
pub struct FrameParser {
    stage: Stage,
    length: u8,
    msg_type: u8,
    payload: Vec<u8, MAX_PAYLOAD_SIZE>,
    crc: Crc8,
}

impl Default for FrameParser {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameParser {
    pub fn new() -> Self {
        Self {
            stage: Stage::Sync,
            length: 0,
            msg_type: 0,
            payload: Vec::new(),
            crc: Crc8::new(),
        }
    }

    /// Drop any partial frame and hunt for the next START
    pub fn reset(&mut self) {
        self.stage = Stage::Sync;
        self.payload.clear();
        self.crc = Crc8::new();
    }

    /// Feed one byte
    ///
    /// `Ok(Some(frame))` when a frame completes, `Ok(None)` when more bytes
    /// are needed.
    pub fn feed(&mut self, byte: u8) -> Result<Option<Frame>, FrameError> {
        match self.stage {
            Stage::Sync => {
                if byte == FRAME_START {
                    self.reset();
                    self.stage = Stage::Length;
                }
            }
            Stage::Length => {
                if byte as usize > MAX_PAYLOAD_SIZE {
                    self.reset();
                    return Err(FrameError::PayloadTooLarge);
                }
                self.length = byte;
                self.crc.update(byte);
                self.stage = Stage::Type;
            }
            Stage::Type => {
                self.msg_type = byte;
                self.crc.update(byte);
                self.stage = if self.length == 0 { Stage::Crc } else { Stage::Payload };
            }
            Stage::Payload => {
                // Length was bounded above, so this always fits
                let _ = self.payload.push(byte);
                self.crc.update(byte);
                if self.payload.len() == self.length as usize {
                    self.stage = Stage::Crc;
                }
            }
            Stage::Crc => {
                let valid = byte == self.crc.value();
                let frame = Frame {
                    msg_type: self.msg_type,
                    payload: core::mem::take(&mut self.payload),
                };
                self.reset();
                return if valid {
                    Ok(Some(frame))
                } else {
                    Err(FrameError::InvalidChecksum)
                };
            }
        }
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crc::crc8;
    use proptest::prelude::*;

    /// Feed until the first frame or error, returning bytes consumed
    fn feed_until_done(
        parser: &mut FrameParser,
        bytes: &[u8],
    ) -> (Result<Option<Frame>, FrameError>, usize) {
        for (i, &byte) in bytes.iter().enumerate() {
            match parser.feed(byte) {
                Ok(None) => {}
                done => return (done, i + 1),
            }
        }
        (Ok(None), bytes.len())
    }

    fn parse_all(bytes: &[u8]) -> Result<Option<Frame>, FrameError> {
        feed_until_done(&mut FrameParser::new(), bytes).0
    }

    #[test]
    fn test_encode_empty_payload() {
        let frame = Frame::empty(0x30);
        let mut buffer = [0u8; 8];
        let len = frame.encode(&mut buffer).unwrap();

        assert_eq!(len, 4);
        assert_eq!(&buffer[..3], &[FRAME_START, 0, 0x30]);
        assert_eq!(buffer[3], crc8(&[0, 0x30]));
    }

    #[test]
    fn test_encode_with_payload() {
        let frame = Frame::new(0x32, &[7]).unwrap();
        let encoded = frame.encode_to_vec().unwrap();

        assert_eq!(encoded.len(), 5);
        assert_eq!(&encoded[..4], &[FRAME_START, 1, 0x32, 7]);
        assert_eq!(encoded[4], crc8(&[1, 0x32, 7]));
    }

    #[test]
    fn test_buffer_too_small() {
        let frame = Frame::new(0x31, &[1, 2, 3]).unwrap();
        let mut buffer = [0u8; 6];
        assert_eq!(frame.encode(&mut buffer), Err(FrameError::BufferTooSmall));
    }

    #[test]
    fn test_parse_encoded() {
        let frame = Frame::new(0x31, b"DAYS").unwrap();
        let encoded = frame.encode_to_vec().unwrap();
        assert_eq!(parse_all(&encoded), Ok(Some(frame)));
    }

    #[test]
    fn test_corrupted_payload_rejected() {
        let mut encoded = Frame::new(0x31, b"YRS").unwrap().encode_to_vec().unwrap();
        encoded[4] ^= 0x01;
        assert_eq!(parse_all(&encoded), Err(FrameError::InvalidChecksum));
    }

    #[test]
    fn test_oversized_length_rejected() {
        assert_eq!(parse_all(&[FRAME_START, 251]), Err(FrameError::PayloadTooLarge));
    }

    #[test]
    fn test_back_to_back_frames() {
        let first = Frame::new(0x32, &[1]).unwrap().encode_to_vec().unwrap();
        let second = Frame::empty(0x30).encode_to_vec().unwrap();

        let mut stream = Vec::<u8, 16>::new();
        stream.extend_from_slice(&first).unwrap();
        stream.extend_from_slice(&second).unwrap();

        let mut parser = FrameParser::new();
        let (result, used) = feed_until_done(&mut parser, &stream);
        assert_eq!(result.unwrap().unwrap().msg_type, 0x32);
        assert_eq!(used, first.len());

        let (result, _) = feed_until_done(&mut parser, &stream[used..]);
        assert_eq!(result.unwrap().unwrap().msg_type, 0x30);
    }

    #[test]
    fn test_payload_too_large() {
        let large = [0u8; MAX_PAYLOAD_SIZE + 1];
        assert_eq!(Frame::new(0x31, &large), Err(FrameError::PayloadTooLarge));
    }

    proptest! {
        #[test]
        fn prop_resync_after_noise(
            noise in proptest::collection::vec(any::<u8>().prop_filter("no start byte", |b| *b != FRAME_START), 0..32),
            payload in proptest::collection::vec(any::<u8>(), 0..MAX_PAYLOAD_SIZE),
            msg_type in any::<u8>(),
        ) {
            let frame = Frame::new(msg_type, &payload).unwrap();
            let encoded = frame.encode_to_vec().unwrap();

            let mut parser = FrameParser::new();
            for &b in &noise {
                prop_assert_eq!(parser.feed(b), Ok(None));
            }
            prop_assert_eq!(feed_until_done(&mut parser, &encoded).0, Ok(Some(frame)));
        }

        #[test]
        fn prop_never_panics(bytes in proptest::collection::vec(any::<u8>(), 0..600)) {
            let mut parser = FrameParser::new();
            for b in bytes {
                let _ = parser.feed(b);
            }
        }
    }
}
