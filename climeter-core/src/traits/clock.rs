//! Wall-clock time source
//!
//! Boards without a battery-backed RTC only have monotonic uptime. The
//! wall clock is recovered by pairing a uptime reading with a Unix time
//! received from a peer, and applying the resulting offset from then on.

use chrono::{DateTime, Utc};
use portable_atomic::{AtomicI64, Ordering};

/// Source of the current UTC time
pub trait WallClock {
    /// Current time, or `None` if the clock has not been set yet
    fn now(&self) -> Option<DateTime<Utc>>;
}

const UNSYNCED: i64 = i64::MIN;

/// Uptime-to-Unix-time offset, shareable as a `static`
pub struct OffsetClock {
    /// `unix_ms - uptime_ms` at the last sync
    offset_ms: AtomicI64,
}

impl Default for OffsetClock {
    fn default() -> Self {
        Self::new()
    }
}

impl OffsetClock {
    pub const fn new() -> Self {
        Self {
            offset_ms: AtomicI64::new(UNSYNCED),
        }
    }

    /// Record that Unix time `unix_ms` corresponds to uptime `uptime_ms`
    pub fn sync(&self, unix_ms: i64, uptime_ms: u64) {
        let offset = unix_ms.saturating_sub(uptime_ms as i64);
        // The sentinel is unreachable for any real clock; nudge it anyway
        let offset = if offset == UNSYNCED { UNSYNCED + 1 } else { offset };
        self.offset_ms.store(offset, Ordering::Release);
    }

    pub fn is_synced(&self) -> bool {
        self.offset_ms.load(Ordering::Acquire) != UNSYNCED
    }

    /// Forget the offset (e.g. after the peer went away)
    pub fn invalidate(&self) {
        self.offset_ms.store(UNSYNCED, Ordering::Release);
    }

    /// Wall-clock time at uptime `uptime_ms`
    pub fn at(&self, uptime_ms: u64) -> Option<DateTime<Utc>> {
        let offset = self.offset_ms.load(Ordering::Acquire);
        if offset == UNSYNCED {
            return None;
        }
        let unix_ms = offset.checked_add(i64::try_from(uptime_ms).ok()?)?;
        DateTime::from_timestamp_millis(unix_ms)
    }
}

/// An [`OffsetClock`] read against a monotonic uptime counter
pub struct SyncedClock<'a, F> {
    offset: &'a OffsetClock,
    uptime_ms: F,
}

impl<'a, F: Fn() -> u64> SyncedClock<'a, F> {
    pub fn new(offset: &'a OffsetClock, uptime_ms: F) -> Self {
        Self { offset, uptime_ms }
    }
}

impl<F: Fn() -> u64> WallClock for SyncedClock<'_, F> {
    fn now(&self) -> Option<DateTime<Utc>> {
        self.offset.at((self.uptime_ms)())
    }
}
