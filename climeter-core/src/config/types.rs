//! Configuration type definitions
//!
//! A `ClockConfig` is built once at startup. Nothing in it changes while
//! the clock runs.

use chrono::{DateTime, Utc};
use heapless::{String, Vec};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use super::matrix::MatrixOptions;
use crate::countdown::ExpiryPolicy;
use crate::projection::ProjectionBaseline;
use crate::state::alert::DEFAULT_ALERT_THRESHOLD_S;
use crate::state::debounce::DEFAULT_DEBOUNCE_MS;

/// Maximum label length
pub const MAX_LABEL_LEN: usize = 16;

/// Maximum unit suffix length
pub const MAX_UNIT_LEN: usize = 4;

/// Maximum tracked metrics per config
pub const MAX_METRICS: usize = 4;

/// Carbon budget deadline, 2029-07-22T16:00:03Z
pub const CARBON_DEADLINE_UNIX: i64 = 1_879_430_403;

/// Renewable share snapshot, 2022-11-05T00:00:00Z
pub const RENEWABLES_TIMESTAMP_UNIX: i64 = 1_667_606_400;

/// Renewable share of global energy at the snapshot, in percent
pub const RENEWABLES_INITIAL: f64 = 11.4;

/// Renewable share growth, percent per second
pub const RENEWABLES_RATE: f64 = 2.0428359571070087e-08;

/// Pin configuration with optional inversion
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PinConfig {
    /// GPIO number
    pub pin: u8,
    /// Active-low
    pub inverted: bool,
    /// Enable internal pull-up
    pub pull_up: bool,
}

impl PinConfig {
    pub const fn new(pin: u8) -> Self {
        Self {
            pin,
            inverted: false,
            pull_up: false,
        }
    }

    /// Button to ground with the internal pull-up: active-low
    pub const fn button(pin: u8) -> Self {
        Self {
            pin,
            inverted: true,
            pull_up: true,
        }
    }
}

/// Where the deadline comes from
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum DeadlineSource {
    /// A fixed instant
    At(DateTime<Utc>),
    /// The zero-crossing of the named metric
    Metric(String<MAX_LABEL_LEN>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DeadlineConfig {
    pub source: DeadlineSource,
    pub on_expiry: ExpiryPolicy,
}

impl Default for DeadlineConfig {
    fn default() -> Self {
        Self {
            source: DeadlineSource::At(unix(CARBON_DEADLINE_UNIX)),
            on_expiry: ExpiryPolicy::Freeze,
        }
    }
}

/// One linearly projected metric
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct MetricConfig {
    /// Key used by `[deadline] metric` and `[display] primary_metric`
    pub name: String<MAX_LABEL_LEN>,
    /// Text drawn in front of the value
    pub label: String<MAX_LABEL_LEN>,
    /// Text drawn after the value
    pub unit: String<MAX_UNIT_LEN>,
    /// Digits after the decimal point
    pub decimals: u8,
    pub baseline: ProjectionBaseline,
}

impl MetricConfig {
    /// Renewable share of global energy consumption
    pub fn renewables() -> Self {
        Self {
            name: label("renewables"),
            label: label("RENEWABLES"),
            unit: label("%"),
            decimals: 3,
            baseline: ProjectionBaseline::new(
                unix(RENEWABLES_TIMESTAMP_UNIX),
                RENEWABLES_INITIAL,
                RENEWABLES_RATE,
            ),
        }
    }
}

/// Button input configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct InputConfig {
    /// Mode toggle button
    pub toggle_pin: PinConfig,
    /// Minimum spacing between accepted presses
    pub debounce_ms: u32,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            toggle_pin: PinConfig::button(24),
            debounce_ms: DEFAULT_DEBOUNCE_MS,
        }
    }
}

/// End-of-minute alert configuration
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct AlertConfig {
    pub enabled: bool,
    /// Seconds field at which the alert takes over
    pub seconds_threshold: u8,
    /// First alert line
    pub line1: String<MAX_LABEL_LEN>,
    /// Second alert line
    pub line2: String<MAX_LABEL_LEN>,
}

impl Default for AlertConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            seconds_threshold: DEFAULT_ALERT_THRESHOLD_S,
            line1: label("STOP AT"),
            line2: label("1.5`C"),
        }
    }
}

/// Rendering configuration
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DisplayConfig {
    /// Tick period
    pub refresh_ms: u32,
    /// Blink the h:m:s separators at 1 Hz
    pub colon_blink: bool,
    /// Metric shown under the countdown (wide chains only)
    pub primary_metric: Option<String<MAX_LABEL_LEN>>,
    /// How long to wait for the matrix to confirm a frame
    pub present_timeout_ms: u32,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            refresh_ms: 50,
            colon_blink: true,
            primary_metric: Some(label("renewables")),
            present_timeout_ms: 200,
        }
    }
}

/// Top-level clock configuration
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ClockConfig {
    pub matrix: MatrixOptions,
    pub deadline: DeadlineConfig,
    pub metrics: Vec<MetricConfig, MAX_METRICS>,
    pub input: InputConfig,
    pub alert: AlertConfig,
    pub display: DisplayConfig,
}

impl ClockConfig {
    /// Create a configuration with defaults and no metrics
    pub fn new() -> Self {
        Self::default()
    }

    /// Defaults plus the built-in renewables snapshot
    pub fn snapshot() -> Self {
        let mut config = Self::new();
        // Capacity is at least one
        let _ = config.metrics.push(MetricConfig::renewables());
        config
    }

    /// Find a metric by name
    pub fn find_metric(&self, name: &str) -> Option<&MetricConfig> {
        self.metrics.iter().find(|m| m.name.as_str() == name)
    }

    /// Index of a metric by name
    pub fn metric_index(&self, name: &str) -> Option<usize> {
        self.metrics.iter().position(|m| m.name.as_str() == name)
    }

    /// Metric shown under the countdown, if configured and present
    pub fn primary_metric(&self) -> Option<&MetricConfig> {
        self.display
            .primary_metric
            .as_ref()
            .and_then(|name| self.find_metric(name))
    }
}

fn unix(secs: i64) -> DateTime<Utc> {
    DateTime::from_timestamp(secs, 0).unwrap_or_default()
}

/// Truncating conversion for built-in labels
fn label<const N: usize>(s: &str) -> String<N> {
    let mut out = String::new();
    for c in s.chars() {
        if out.push(c).is_err() {
            break;
        }
    }
    out
}
