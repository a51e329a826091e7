//! Projection baseline and crossing solver

use chrono::{DateTime, TimeDelta, Utc};

/// Astronomical (Julian) year in seconds
pub const SECONDS_PER_YEAR: f64 = 365.25 * 24.0 * 3600.0;

/// Largest offset from the baseline timestamp a crossing may have.
///
/// Roughly 300 000 years, safely inside chrono's calendar range and far
/// inside the exact-integer range of `f64`.
const MAX_CROSSING_OFFSET_S: f64 = 1.0e13;

const NANOS_PER_SECOND: f64 = 1.0e9;

/// Projection error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ProjectionError {
    /// Rate is zero; the value never changes and never crosses anything
    DegenerateModel,
    /// Crossing is not a representable instant (non-finite inputs or too far away)
    OutOfRange,
}

/// Snapshot of a metric plus its linear rate of change
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ProjectionBaseline {
    /// When `initial_value` was observed
    pub timestamp: DateTime<Utc>,
    /// Value at `timestamp`
    pub initial_value: f64,
    /// Change per second (negative for a depleting quantity)
    pub rate: f64,
}

impl ProjectionBaseline {
    pub const fn new(timestamp: DateTime<Utc>, initial_value: f64, rate: f64) -> Self {
        Self {
            timestamp,
            initial_value,
            rate,
        }
    }

    /// Create a baseline from a rate given per astronomical year
    pub fn from_yearly_rate(timestamp: DateTime<Utc>, initial_value: f64, per_year: f64) -> Self {
        Self::new(timestamp, initial_value, per_year / SECONDS_PER_YEAR)
    }

    /// Projected value at `at`
    ///
    /// Exactly `initial_value` at the baseline timestamp.
    pub fn value_at(&self, at: DateTime<Utc>) -> f64 {
        self.initial_value + self.rate * seconds_between(self.timestamp, at)
    }

    /// Instant at which the projected value equals `threshold`
    ///
    /// The instant may lie before the baseline timestamp if the value is
    /// moving away from the threshold.
    pub fn crossing(&self, threshold: f64) -> Result<DateTime<Utc>, ProjectionError> {
        if self.rate == 0.0 {
            return Err(ProjectionError::DegenerateModel);
        }

        let offset_s = (threshold - self.initial_value) / self.rate;
        if !offset_s.is_finite() || !(-MAX_CROSSING_OFFSET_S..=MAX_CROSSING_OFFSET_S).contains(&offset_s) {
            return Err(ProjectionError::OutOfRange);
        }

        // `as` truncates toward zero, keeping whole and fractional parts the same sign
        let whole = offset_s as i64;
        let nanos = ((offset_s - whole as f64) * NANOS_PER_SECOND) as i64;

        let offset = TimeDelta::try_seconds(whole)
            .and_then(|secs| secs.checked_add(&TimeDelta::nanoseconds(nanos)))
            .ok_or(ProjectionError::OutOfRange)?;

        self.timestamp
            .checked_add_signed(offset)
            .ok_or(ProjectionError::OutOfRange)
    }

    /// Instant at which the projected value reaches zero
    pub fn zero_crossing(&self) -> Result<DateTime<Utc>, ProjectionError> {
        self.crossing(0.0)
    }
}

/// Signed seconds from `from` to `to`, with sub-second precision
pub fn seconds_between(from: DateTime<Utc>, to: DateTime<Utc>) -> f64 {
    let delta = to - from;
    delta.num_seconds() as f64 + delta.subsec_nanos() as f64 / NANOS_PER_SECOND
}

/// Projected value of `baseline` at `at`
pub fn value_at(baseline: &ProjectionBaseline, at: DateTime<Utc>) -> f64 {
    baseline.value_at(at)
}

/// Instant at which `baseline` reaches zero
pub fn zero_crossing(baseline: &ProjectionBaseline) -> Result<DateTime<Utc>, ProjectionError> {
    baseline.zero_crossing()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use proptest::prelude::*;

    const RENEWABLES_RATE: f64 = 2.0428359571070087e-08;

    fn snapshot_time() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2022, 11, 5, 0, 0, 0).unwrap()
    }

    fn renewables() -> ProjectionBaseline {
        ProjectionBaseline::new(snapshot_time(), 11.4, RENEWABLES_RATE)
    }

    #[test]
    fn test_value_at_baseline_is_exact() {
        let b = renewables();
        assert_eq!(b.value_at(b.timestamp), 11.4);
        assert_eq!(value_at(&b, b.timestamp), b.initial_value);
    }

    #[test]
    fn test_value_one_year_later() {
        let b = renewables();
        let later = snapshot_time() + TimeDelta::days(365);
        let value = b.value_at(later);
        assert!((value - 12.044228747433266).abs() < 1e-12);
    }

    #[test]
    fn test_value_before_baseline() {
        let b = ProjectionBaseline::new(snapshot_time(), 10.0, 0.5);
        let earlier = snapshot_time() - TimeDelta::seconds(4);
        assert_eq!(b.value_at(earlier), 8.0);
    }

    #[test]
    fn test_yearly_rate_conversion() {
        let b = ProjectionBaseline::from_yearly_rate(snapshot_time(), 11.4, 0.64467);
        assert!((b.rate - RENEWABLES_RATE).abs() < 1e-20);
        assert!((b.rate * SECONDS_PER_YEAR - 0.64467).abs() < 1e-12);
    }

    #[test]
    fn test_seconds_between_subsecond() {
        let from = snapshot_time();
        let to = from + TimeDelta::milliseconds(2_250);
        assert_eq!(seconds_between(from, to), 2.25);
        assert_eq!(seconds_between(to, from), -2.25);
    }

    #[test]
    fn test_zero_crossing_depletion() {
        let budget = ProjectionBaseline::new(snapshot_time(), 100.0, -1.0);
        let crossing = zero_crossing(&budget).unwrap();
        assert_eq!(crossing, snapshot_time() + TimeDelta::seconds(100));
    }

    #[test]
    fn test_zero_crossing_in_past() {
        // Growing from a positive value: zero was in the past
        let growing = ProjectionBaseline::new(snapshot_time(), 5.0, 0.5);
        let crossing = growing.zero_crossing().unwrap();
        assert_eq!(crossing, snapshot_time() - TimeDelta::seconds(10));
    }

    #[test]
    fn test_crossing_threshold() {
        let b = ProjectionBaseline::new(snapshot_time(), 11.4, 0.1);
        let crossing = b.crossing(12.4).unwrap();
        assert_eq!(crossing, snapshot_time() + TimeDelta::seconds(10));
    }

    #[test]
    fn test_degenerate_model() {
        let flat = ProjectionBaseline::new(snapshot_time(), 42.0, 0.0);
        assert_eq!(flat.zero_crossing(), Err(ProjectionError::DegenerateModel));
        assert_eq!(flat.value_at(snapshot_time() + TimeDelta::days(1000)), 42.0);
    }

    #[test]
    fn test_out_of_range() {
        let tiny = ProjectionBaseline::new(snapshot_time(), 1.0e10, -1.0e-10);
        assert_eq!(tiny.zero_crossing(), Err(ProjectionError::OutOfRange));

        let nan = ProjectionBaseline::new(snapshot_time(), f64::NAN, 1.0);
        assert_eq!(nan.zero_crossing(), Err(ProjectionError::OutOfRange));
    }

    fn rate() -> impl Strategy<Value = f64> {
        (1.0e-4f64..1.0e4, any::<bool>()).prop_map(|(magnitude, negative)| {
            if negative {
                -magnitude
            } else {
                magnitude
            }
        })
    }

    proptest! {
        #[test]
        fn prop_zero_crossing_round_trip(initial in -1.0e4f64..1.0e4, rate in rate()) {
            let b = ProjectionBaseline::new(snapshot_time(), initial, rate);
            let crossing = b.zero_crossing().unwrap();
            let tolerance = 1.0e-6 * (1.0 + initial.abs() + rate.abs());
            prop_assert!(b.value_at(crossing).abs() <= tolerance);
        }

        #[test]
        fn prop_value_differences_are_affine(
            initial in -1.0e4f64..1.0e4,
            rate in rate(),
            a_ms in -1_000_000_000i64..1_000_000_000,
            b_ms in -1_000_000_000i64..1_000_000_000,
        ) {
            let baseline = ProjectionBaseline::new(snapshot_time(), initial, rate);
            let t1 = snapshot_time() + TimeDelta::milliseconds(a_ms);
            let t2 = snapshot_time() + TimeDelta::milliseconds(b_ms);

            let s1 = seconds_between(snapshot_time(), t1);
            let s2 = seconds_between(snapshot_time(), t2);
            let diff = baseline.value_at(t2) - baseline.value_at(t1);
            let expected = rate * seconds_between(t1, t2);
            let tolerance = 1.0e-12 * (1.0 + initial.abs() + (rate * s1).abs() + (rate * s2).abs());
            prop_assert!((diff - expected).abs() <= tolerance);
        }
    }
}
