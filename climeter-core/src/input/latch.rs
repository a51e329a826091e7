//! Single-slot atomic event latch

use portable_atomic::{AtomicU64, Ordering};

use crate::state::{ButtonEvent, Edge};

const VALID: u64 = 1 << 63;
const RISING: u64 = 1 << 62;
const PIN_SHIFT: u32 = 48;
const PIN_MASK: u64 = 0xFF << PIN_SHIFT;
/// Timestamps keep 48 bits (~8900 years of uptime in ms)
const TIME_MASK: u64 = (1 << PIN_SHIFT) - 1;

/// Lock-free slot holding at most one [`ButtonEvent`]
///
/// Newer events replace older ones, except that a pending rising edge is
/// never replaced by a falling edge: a tap that is released before the
/// consumer runs must still reach it as a press.
///
/// Suitable for a `static`; both sides only ever swap the whole word.
pub struct EdgeLatch {
    slot: AtomicU64,
}

impl Default for EdgeLatch {
    fn default() -> Self {
        Self::new()
    }
}

impl EdgeLatch {
    pub const fn new() -> Self {
        Self {
            slot: AtomicU64::new(0),
        }
    }

    /// Store an event
    ///
    /// Returns the event that lost: the overwritten one, or `event` itself
    /// when it is a falling edge behind a pending rising edge.
    pub fn post(&self, event: ButtonEvent) -> Option<ButtonEvent> {
        let incoming = encode(event);
        let stored = self
            .slot
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |current| {
                (!holds_press(current, incoming)).then_some(incoming)
            });

        match stored {
            Ok(previous) => decode(previous),
            Err(_) => Some(event),
        }
    }

    /// Take the pending event, leaving the slot empty
    pub fn take(&self) -> Option<ButtonEvent> {
        decode(self.slot.swap(0, Ordering::AcqRel))
    }

    pub fn is_pending(&self) -> bool {
        self.slot.load(Ordering::Acquire) & VALID != 0
    }
}

fn holds_press(current: u64, incoming: u64) -> bool {
    current & (VALID | RISING) == VALID | RISING && incoming & RISING == 0
}

fn encode(event: ButtonEvent) -> u64 {
    let edge = match event.edge {
        Edge::Rising => RISING,
        Edge::Falling => 0,
    };
    VALID | edge | ((event.pin as u64) << PIN_SHIFT) | (event.at_ms & TIME_MASK)
}

fn decode(word: u64) -> Option<ButtonEvent> {
    if word & VALID == 0 {
        return None;
    }

    let edge = if word & RISING != 0 {
        Edge::Rising
    } else {
        Edge::Falling
    };

    Some(ButtonEvent {
        edge,
        pin: ((word & PIN_MASK) >> PIN_SHIFT) as u8,
        at_ms: word & TIME_MASK,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty() {
        let latch = EdgeLatch::new();
        assert!(!latch.is_pending());
        assert_eq!(latch.take(), None);
    }

    #[test]
    fn test_post_then_take_once() {
        let latch = EdgeLatch::new();
        let event = ButtonEvent::rising(24, 123_456);

        assert_eq!(latch.post(event), None);
        assert!(latch.is_pending());
        assert_eq!(latch.take(), Some(event));
        assert_eq!(latch.take(), None);
    }

    #[test]
    fn test_latest_wins() {
        let latch = EdgeLatch::new();
        let first = ButtonEvent::falling(24, 10);
        let second = ButtonEvent::rising(25, 20);

        latch.post(first);
        assert_eq!(latch.post(second), Some(first));
        assert_eq!(latch.take(), Some(second));
    }

    #[test]
    fn test_release_does_not_hide_press() {
        let latch = EdgeLatch::new();
        let press = ButtonEvent::rising(24, 1_000);
        let release = ButtonEvent::falling(24, 1_030);

        assert_eq!(latch.post(press), None);
        assert_eq!(latch.post(release), Some(release));
        assert_eq!(latch.take(), Some(press));
        assert_eq!(latch.take(), None);
    }

    #[test]
    fn test_newer_press_replaces_pending_press() {
        let latch = EdgeLatch::new();
        let first = ButtonEvent::rising(24, 1_000);
        let second = ButtonEvent::rising(24, 1_040);

        latch.post(first);
        latch.post(ButtonEvent::falling(24, 1_020));
        assert_eq!(latch.post(second), Some(first));
        assert_eq!(latch.take(), Some(second));
    }

    #[test]
    fn test_timestamp_zero_is_still_an_event() {
        let latch = EdgeLatch::new();
        let event = ButtonEvent::falling(0, 0);
        latch.post(event);
        assert_eq!(latch.take(), Some(event));
    }

    #[test]
    fn test_static_latch() {
        static LATCH: EdgeLatch = EdgeLatch::new();
        LATCH.post(ButtonEvent::rising(7, 99));
        assert_eq!(LATCH.take().map(|e| e.pin), Some(7));
    }
}
