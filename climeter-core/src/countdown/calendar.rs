//! Calendar delta between two instants
//!
//! Subtraction is done field by field from the largest unit downward.
//! Whole months are found first by stepping back from the naive
//! year/month difference until adding them to the start no longer
//! overshoots the end. Month addition clamps to the last day of the target
//! month (Jan 31 + 1 month = Feb 28/29), which is what makes 28, 29, 30 and
//! 31 day months come out right.

use chrono::{DateTime, Datelike, Days, Months, TimeDelta, Utc};

const SECONDS_PER_MINUTE: i64 = 60;
const SECONDS_PER_HOUR: i64 = 3_600;
const SECONDS_PER_DAY: i64 = 86_400;

/// Calendar-unit difference between two instants
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct CalendarDelta {
    /// Whole years
    pub years: u32,
    /// Whole months after the years (0-11)
    pub months: u32,
    /// Whole days after the months
    pub days: u32,
    /// Hours (0-23)
    pub hours: u32,
    /// Minutes (0-59)
    pub minutes: u32,
    /// Seconds (0-59)
    pub seconds: u32,
    /// Microseconds (0-999_999)
    pub micros: u32,
}

impl CalendarDelta {
    /// Compute the delta from `from` forward to `to`
    ///
    /// Returns `None` if `to` is before `from`, or if month arithmetic
    /// leaves the representable calendar range.
    pub fn between(from: DateTime<Utc>, to: DateTime<Utc>) -> Option<Self> {
        if to < from {
            return None;
        }

        // (year, month) of `to` is never before that of `from`, so this is >= 0
        let naive = (to.year() - from.year()) * 12 + to.month() as i32 - from.month() as i32;
        let mut months = u32::try_from(naive).ok()?;
        let mut anchor = add_months(from, months)?;

        // Zero months always fits since from <= to
        while anchor > to {
            months -= 1;
            anchor = add_months(from, months)?;
        }

        let rest = to - anchor;
        let secs = rest.num_seconds();
        let micros = rest.subsec_nanos() / 1_000;

        Some(Self {
            years: months / 12,
            months: months % 12,
            days: (secs / SECONDS_PER_DAY) as u32,
            hours: (secs % SECONDS_PER_DAY / SECONDS_PER_HOUR) as u32,
            minutes: (secs % SECONDS_PER_HOUR / SECONDS_PER_MINUTE) as u32,
            seconds: (secs % SECONDS_PER_MINUTE) as u32,
            micros: micros as u32,
        })
    }

    /// Total whole months (years folded in)
    pub fn total_months(&self) -> u32 {
        self.years * 12 + self.months
    }

    /// Sub-second part truncated to centiseconds (0-99)
    pub fn centiseconds(&self) -> u8 {
        (self.micros / 10_000) as u8
    }

    /// Collapse the month and day fields into a plain day count
    ///
    /// Advances `from` by the leftover months (clamped to month end) and
    /// then the days, and counts the elapsed whole days. Years are not
    /// applied, so the count is relative to `from` itself.
    pub fn collapsed_days(&self, from: DateTime<Utc>) -> Option<u32> {
        let advanced = add_months(from, self.months)?.checked_add_days(Days::new(self.days as u64))?;
        u32::try_from((advanced - from).num_days()).ok()
    }

    /// Add this delta back onto `from`: years and months first, then days
    /// and the clock remainder
    pub fn apply(&self, from: DateTime<Utc>) -> Option<DateTime<Utc>> {
        let anchor = add_months(from, self.total_months())?;
        let secs = self.days as i64 * SECONDS_PER_DAY
            + self.hours as i64 * SECONDS_PER_HOUR
            + self.minutes as i64 * SECONDS_PER_MINUTE
            + self.seconds as i64;
        let rest = TimeDelta::new(secs, self.micros * 1_000)?;
        anchor.checked_add_signed(rest)
    }
}

fn add_months(at: DateTime<Utc>, months: u32) -> Option<DateTime<Utc>> {
    at.checked_add_months(Months::new(months))
}
