//! Time-remaining breakdown sampled every refresh tick

use chrono::{DateTime, TimeDelta, Utc};

use super::calendar::CalendarDelta;

/// What the countdown shows once the deadline has passed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ExpiryPolicy {
    /// Hold every field at zero
    #[default]
    Freeze,
    /// Zero fields, and the renderer switches to a "deadline reached" screen
    Alert,
    /// Count the time elapsed since the deadline (rendered with a `-` sign)
    CountUp,
}

/// Time left until the deadline, in display units
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TimeBreakdown {
    pub years: u32,
    /// Days after whole years, month lengths accounted for
    pub days: u32,
    pub hours: u8,
    pub minutes: u8,
    pub seconds: u8,
    pub centiseconds: u8,
    /// Deadline reached or passed
    pub expired: bool,
    /// Exact duration the fields were derived from.
    ///
    /// Negative only under [`ExpiryPolicy::CountUp`] after the deadline.
    #[cfg_attr(feature = "defmt", defmt(Debug2Format))]
    pub remaining: TimeDelta,
}

impl TimeBreakdown {
    /// All-zero breakdown for a deadline that has been reached
    pub const fn expired() -> Self {
        Self {
            years: 0,
            days: 0,
            hours: 0,
            minutes: 0,
            seconds: 0,
            centiseconds: 0,
            expired: true,
            remaining: TimeDelta::zero(),
        }
    }

    /// Build from a calendar delta anchored at `from`
    fn from_calendar(delta: &CalendarDelta, from: DateTime<Utc>, remaining: TimeDelta) -> Option<Self> {
        Some(Self {
            years: delta.years,
            days: delta.collapsed_days(from)?,
            hours: delta.hours as u8,
            minutes: delta.minutes as u8,
            seconds: delta.seconds as u8,
            centiseconds: delta.centiseconds(),
            expired: false,
            remaining,
        })
    }

    /// Plain day count without years, used when calendar math would leave
    /// the representable range
    fn from_duration(span: TimeDelta) -> Self {
        let span = span.abs();
        let secs = span.num_seconds();
        Self {
            years: 0,
            days: (secs / 86_400) as u32,
            hours: (secs % 86_400 / 3_600) as u8,
            minutes: (secs % 3_600 / 60) as u8,
            seconds: (secs % 60) as u8,
            centiseconds: (span.subsec_nanos() / 10_000_000) as u8,
            expired: false,
            remaining: span,
        }
    }

    /// Whether the blinking separator is lit in this tick
    ///
    /// Lit for the first half of every second.
    pub fn separator_visible(&self) -> bool {
        self.centiseconds < 50
    }

    /// Label following the year count
    pub fn year_label(&self) -> &'static str {
        if self.years == 1 {
            "YEAR "
        } else {
            "YRS"
        }
    }

    /// Label following the day count
    pub fn day_label(&self) -> &'static str {
        if self.days == 1 {
            "DAY "
        } else {
            "DAYS"
        }
    }
}

/// Break down the time left until `deadline` as seen at `now`
///
/// A reached deadline yields an all-zero breakdown with `expired` set.
pub fn breakdown(deadline: DateTime<Utc>, now: DateTime<Utc>) -> TimeBreakdown {
    breakdown_with(deadline, now, ExpiryPolicy::Freeze)
}

/// Break down the time left until `deadline` under an expiry policy
pub fn breakdown_with(deadline: DateTime<Utc>, now: DateTime<Utc>, policy: ExpiryPolicy) -> TimeBreakdown {
    if now < deadline {
        return decompose(now, deadline);
    }

    match policy {
        ExpiryPolicy::Freeze | ExpiryPolicy::Alert => TimeBreakdown::expired(),
        ExpiryPolicy::CountUp => {
            let elapsed = decompose(deadline, now);
            TimeBreakdown {
                expired: true,
                remaining: deadline - now,
                ..elapsed
            }
        }
    }
}

fn decompose(from: DateTime<Utc>, to: DateTime<Utc>) -> TimeBreakdown {
    let span = to - from;
    CalendarDelta::between(from, to)
        .and_then(|delta| TimeBreakdown::from_calendar(&delta, from, span))
        .unwrap_or_else(|| TimeBreakdown::from_duration(span))
}

/// A fixed deadline paired with its expiry policy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Countdown {
    deadline: DateTime<Utc>,
    policy: ExpiryPolicy,
}

impl Countdown {
    pub const fn new(deadline: DateTime<Utc>, policy: ExpiryPolicy) -> Self {
        Self { deadline, policy }
    }

    pub fn deadline(&self) -> DateTime<Utc> {
        self.deadline
    }

    pub fn policy(&self) -> ExpiryPolicy {
        self.policy
    }

    /// Sample the countdown at `now`
    pub fn sample(&self, now: DateTime<Utc>) -> TimeBreakdown {
        breakdown_with(self.deadline, now, self.policy)
    }
}
