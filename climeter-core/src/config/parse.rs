//! Minimal parser for `clock.toml`
//!
//! Handles only the subset of TOML the clock configuration uses and does
//! not allocate. The firmware build script validates the same file with a
//! full TOML parser, so this one can stay small.
//!
//! Supported:
//! - `key = value` pairs (string, integer, float, boolean)
//! - `[section]` and `[metric.<name>]` headers
//! - Comments (`# ...`), also after a value
//!
//! Timestamps are RFC 3339 strings and must carry an explicit offset.

use chrono::{DateTime, Utc};
use heapless::String as HString;

use super::matrix::ChainLength;
use super::types::{
    ClockConfig, DeadlineSource, MetricConfig, PinConfig, MAX_LABEL_LEN, MAX_UNIT_LEN,
};
use crate::countdown::ExpiryPolicy;
use crate::projection::ProjectionBaseline;

/// What went wrong
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ParseErrorKind {
    /// Unknown or malformed section header
    InvalidSection,
    /// Key not valid in this section
    UnknownKey,
    /// Value has the wrong type or is out of range
    InvalidValue,
    /// Timestamp is not RFC 3339 or has no UTC offset
    InvalidTimestamp,
    /// Exceeded a fixed capacity
    TooManyItems,
    /// A section ended without a required key
    MissingField,
    /// Invalid pin string
    InvalidPin,
}

/// Parse error with the 1-based line it was found on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ParseError {
    pub line: usize,
    pub kind: ParseErrorKind,
}

impl ParseError {
    const fn new(line: usize, kind: ParseErrorKind) -> Self {
        Self { line, kind }
    }
}

type Result<T> = core::result::Result<T, ParseErrorKind>;

/// Current parsing context
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    Root,
    Matrix,
    Deadline,
    Metric,
    Input,
    Alert,
    Display,
}

/// A `[metric.<name>]` section being collected
#[derive(Debug, Default)]
struct MetricDraft {
    name: HString<MAX_LABEL_LEN>,
    label: Option<HString<MAX_LABEL_LEN>>,
    unit: Option<HString<MAX_UNIT_LEN>>,
    decimals: Option<u8>,
    initial: Option<f64>,
    timestamp: Option<DateTime<Utc>>,
    rate: Option<Rate>,
}

/// Rate as written in the file
#[derive(Debug, Clone, Copy)]
enum Rate {
    PerSecond(f64),
    PerYear(f64),
}

impl MetricDraft {
    fn finish(self) -> Result<MetricConfig> {
        let timestamp = self.timestamp.ok_or(ParseErrorKind::MissingField)?;
        let initial = self.initial.ok_or(ParseErrorKind::MissingField)?;
        let rate = self.rate.ok_or(ParseErrorKind::MissingField)?;

        let label = match self.label {
            Some(label) => label,
            None => self.name.clone(),
        };

        let baseline = match rate {
            Rate::PerSecond(rate) => ProjectionBaseline::new(timestamp, initial, rate),
            Rate::PerYear(rate) => ProjectionBaseline::from_yearly_rate(timestamp, initial, rate),
        };

        Ok(MetricConfig {
            name: self.name,
            label,
            unit: self.unit.unwrap_or_default(),
            decimals: self.decimals.unwrap_or(2),
            baseline,
        })
    }
}

/// Parse `clock.toml` into a [`ClockConfig`]
///
/// Sections that are absent keep their defaults. Metrics are only those
/// declared in the file.
pub fn parse_config(input: &str) -> core::result::Result<ClockConfig, ParseError> {
    let mut config = ClockConfig::new();
    let mut section = Section::Root;
    let mut draft: Option<(usize, MetricDraft)> = None;

    for (index, line) in input.lines().enumerate() {
        let line_no = index + 1;
        let line = line.trim();

        // Skip empty lines and comments
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        if line.starts_with('[') && line.ends_with(']') {
            if let Some((start, metric)) = draft.take() {
                save_metric(&mut config, metric).map_err(|kind| ParseError::new(start, kind))?;
            }

            let (next, name) = parse_section_header(&line[1..line.len() - 1])
                .map_err(|kind| ParseError::new(line_no, kind))?;
            section = next;

            if let Some(name) = name {
                draft = Some((
                    line_no,
                    MetricDraft {
                        name,
                        ..MetricDraft::default()
                    },
                ));
            }
            continue;
        }

        let (key, value) =
            parse_key_value(line).ok_or(ParseError::new(line_no, ParseErrorKind::InvalidValue))?;

        let applied = match section {
            Section::Metric => match draft.as_mut() {
                Some((_, metric)) => apply_metric(metric, key, value),
                None => Err(ParseErrorKind::InvalidSection),
            },
            _ => apply_value(section, key, value, &mut config),
        };
        applied.map_err(|kind| ParseError::new(line_no, kind))?;
    }

    if let Some((start, metric)) = draft.take() {
        save_metric(&mut config, metric).map_err(|kind| ParseError::new(start, kind))?;
    }

    Ok(config)
}

fn save_metric(config: &mut ClockConfig, draft: MetricDraft) -> Result<()> {
    if config.find_metric(&draft.name).is_some() {
        return Err(ParseErrorKind::InvalidSection);
    }
    let metric = draft.finish()?;
    config
        .metrics
        .push(metric)
        .map_err(|_| ParseErrorKind::TooManyItems)
}

/// Parse a section header like "matrix" or "metric.renewables"
fn parse_section_header(header: &str) -> Result<(Section, Option<HString<MAX_LABEL_LEN>>)> {
    let header = header.trim();

    if let Some((kind, name)) = header.split_once('.') {
        if kind != "metric" || name.is_empty() || name.contains('.') {
            return Err(ParseErrorKind::InvalidSection);
        }
        let name = HString::try_from(name).map_err(|_| ParseErrorKind::InvalidSection)?;
        return Ok((Section::Metric, Some(name)));
    }

    let section = match header {
        "matrix" => Section::Matrix,
        "deadline" => Section::Deadline,
        "input" => Section::Input,
        "alert" => Section::Alert,
        "display" => Section::Display,
        _ => return Err(ParseErrorKind::InvalidSection),
    };
    Ok((section, None))
}

/// Parse "key = value" line
fn parse_key_value(line: &str) -> Option<(&str, &str)> {
    let eq_pos = line.find('=')?;
    let key = line[..eq_pos].trim();
    let value = line[eq_pos + 1..].trim();

    // Remove inline comments
    let value = match value.find('#') {
        // Make sure # is not inside a string
        Some(hash_pos) if value[..hash_pos].matches('"').count() % 2 == 0 => value[..hash_pos].trim(),
        _ => value,
    };

    if key.is_empty() || value.is_empty() {
        return None;
    }

    Some((key, value))
}

/// Parse a string value (removes quotes)
fn parse_string(value: &str) -> &str {
    if value.len() >= 2 && value.starts_with('"') && value.ends_with('"') {
        &value[1..value.len() - 1]
    } else {
        // Allow unquoted strings for simple values
        value
    }
}

fn parse_label<const N: usize>(value: &str) -> Result<HString<N>> {
    HString::try_from(parse_string(value)).map_err(|_| ParseErrorKind::InvalidValue)
}

fn parse_int<T: core::str::FromStr>(value: &str) -> Result<T> {
    value.parse().map_err(|_| ParseErrorKind::InvalidValue)
}

fn parse_float(value: &str) -> Result<f64> {
    let parsed: f64 = value.parse().map_err(|_| ParseErrorKind::InvalidValue)?;
    if parsed.is_finite() {
        Ok(parsed)
    } else {
        Err(ParseErrorKind::InvalidValue)
    }
}

fn parse_bool(value: &str) -> Result<bool> {
    match value {
        "true" => Ok(true),
        "false" => Ok(false),
        _ => Err(ParseErrorKind::InvalidValue),
    }
}

/// Parse an RFC 3339 timestamp; a missing offset is rejected
fn parse_timestamp(value: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(parse_string(value))
        .map(|t| t.with_timezone(&Utc))
        .map_err(|_| ParseErrorKind::InvalidTimestamp)
}

/// Parse a pin string like "gpio24", "!gpio24", "^!gpio24"
fn parse_pin(value: &str) -> Result<PinConfig> {
    let mut s = parse_string(value);
    let mut inverted = false;
    let mut pull_up = false;

    // Check for modifiers
    loop {
        if let Some(rest) = s.strip_prefix('!') {
            inverted = true;
            s = rest;
        } else if let Some(rest) = s.strip_prefix('^') {
            pull_up = true;
            s = rest;
        } else {
            break;
        }
    }

    let number = s.strip_prefix("gpio").ok_or(ParseErrorKind::InvalidPin)?;
    let pin: u8 = number.parse().map_err(|_| ParseErrorKind::InvalidPin)?;
    if pin > 29 {
        return Err(ParseErrorKind::InvalidPin);
    }

    Ok(PinConfig {
        pin,
        inverted,
        pull_up,
    })
}

fn parse_expiry(value: &str) -> Result<ExpiryPolicy> {
    match parse_string(value) {
        "freeze" => Ok(ExpiryPolicy::Freeze),
        "alert" => Ok(ExpiryPolicy::Alert),
        "count_up" => Ok(ExpiryPolicy::CountUp),
        _ => Err(ParseErrorKind::InvalidValue),
    }
}

fn parse_chain_length(value: &str) -> Result<ChainLength> {
    ChainLength::from_panels(parse_int(value)?).ok_or(ParseErrorKind::InvalidValue)
}

fn apply_value(section: Section, key: &str, value: &str, config: &mut ClockConfig) -> Result<()> {
    match section {
        Section::Root | Section::Metric => return Err(ParseErrorKind::InvalidSection),
        Section::Matrix => {
            let m = &mut config.matrix;
            match key {
                "rows" => m.rows = parse_int(value)?,
                "cols" => m.cols = parse_int(value)?,
                "chain_length" => m.chain_length = parse_chain_length(value)?,
                "parallel" => m.parallel = parse_int(value)?,
                "brightness" => {
                    let brightness: u8 = parse_int(value)?;
                    if !(1..=100).contains(&brightness) {
                        return Err(ParseErrorKind::InvalidValue);
                    }
                    m.brightness = brightness;
                }
                "hardware_mapping" => m.hardware_mapping = parse_label(value)?,
                "gpio_slowdown" => m.gpio_slowdown = parse_int(value)?,
                _ => return Err(ParseErrorKind::UnknownKey),
            }
        }
        Section::Deadline => {
            let d = &mut config.deadline;
            match key {
                "at" => d.source = DeadlineSource::At(parse_timestamp(value)?),
                "metric" => d.source = DeadlineSource::Metric(parse_label(value)?),
                "on_expiry" => d.on_expiry = parse_expiry(value)?,
                _ => return Err(ParseErrorKind::UnknownKey),
            }
        }
        Section::Input => {
            let i = &mut config.input;
            match key {
                "toggle_pin" => i.toggle_pin = parse_pin(value)?,
                "debounce_ms" => i.debounce_ms = parse_int(value)?,
                _ => return Err(ParseErrorKind::UnknownKey),
            }
        }
        Section::Alert => {
            let a = &mut config.alert;
            match key {
                "enabled" => a.enabled = parse_bool(value)?,
                "seconds_threshold" => {
                    let threshold: u8 = parse_int(value)?;
                    if threshold > 59 {
                        return Err(ParseErrorKind::InvalidValue);
                    }
                    a.seconds_threshold = threshold;
                }
                "line1" => a.line1 = parse_label(value)?,
                "line2" => a.line2 = parse_label(value)?,
                _ => return Err(ParseErrorKind::UnknownKey),
            }
        }
        Section::Display => {
            let d = &mut config.display;
            match key {
                "refresh_ms" => {
                    let refresh: u32 = parse_int(value)?;
                    if refresh == 0 {
                        return Err(ParseErrorKind::InvalidValue);
                    }
                    d.refresh_ms = refresh;
                }
                "colon_blink" => d.colon_blink = parse_bool(value)?,
                "primary_metric" => {
                    let name: HString<MAX_LABEL_LEN> = parse_label(value)?;
                    d.primary_metric = if name.is_empty() { None } else { Some(name) };
                }
                "present_timeout_ms" => d.present_timeout_ms = parse_int(value)?,
                _ => return Err(ParseErrorKind::UnknownKey),
            }
        }
    }
    Ok(())
}

fn apply_metric(metric: &mut MetricDraft, key: &str, value: &str) -> Result<()> {
    match key {
        "label" => metric.label = Some(parse_label(value)?),
        "unit" => metric.unit = Some(parse_label(value)?),
        "decimals" => {
            let decimals: u8 = parse_int(value)?;
            if decimals > 9 {
                return Err(ParseErrorKind::InvalidValue);
            }
            metric.decimals = Some(decimals);
        }
        "initial" => metric.initial = Some(parse_float(value)?),
        "timestamp" => metric.timestamp = Some(parse_timestamp(value)?),
        "rate" => metric.rate = Some(Rate::PerSecond(parse_float(value)?)),
        "rate_per_year" => metric.rate = Some(Rate::PerYear(parse_float(value)?)),
        _ => return Err(ParseErrorKind::UnknownKey),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use crate::projection::SECONDS_PER_YEAR;

    const FULL: &str = r#"
# Climeter configuration
[matrix]
rows = 32
cols = 64
chain_length = 2
parallel = 1
brightness = 80
hardware_mapping = "adafruit-hat"
gpio_slowdown = 4

[deadline]
at = "2029-07-22T16:00:03+00:00"
on_expiry = "count_up"

[metric.renewables]
label = "RENEWABLES"
unit = "%"
decimals = 3
initial = 11.4
timestamp = "2022-11-05T00:00:00+00:00"
rate = 2.0428359571070087e-08   # percent per second

[input]
toggle_pin = "^!gpio24"
debounce_ms = 250

[alert]
enabled = true
seconds_threshold = 55
line1 = "STOP AT"
line2 = "1.5`C"

[display]
refresh_ms = 50
colon_blink = false
primary_metric = "renewables"
"#;

    #[test]
    fn test_full_config() {
        let config = parse_config(FULL).unwrap();

        assert_eq!(config.matrix.chain_length, ChainLength::Two);
        assert_eq!(config.matrix.brightness, 80);
        assert_eq!(config.matrix.gpio_slowdown, 4);
        assert_eq!(config.matrix.hardware_mapping.as_str(), "adafruit-hat");

        let deadline = Utc.with_ymd_and_hms(2029, 7, 22, 16, 0, 3).unwrap();
        assert_eq!(config.deadline.source, DeadlineSource::At(deadline));
        assert_eq!(config.deadline.on_expiry, ExpiryPolicy::CountUp);

        assert_eq!(config.metrics.len(), 1);
        let renewables = &config.metrics[0];
        assert_eq!(renewables, &MetricConfig::renewables());

        assert_eq!(config.input.toggle_pin, PinConfig::button(24));
        assert_eq!(config.input.debounce_ms, 250);
        assert!(!config.display.colon_blink);
        assert!(config.primary_metric().is_some());
    }

    #[test]
    fn test_empty_input_is_defaults() {
        let config = parse_config("").unwrap();
        assert_eq!(config, ClockConfig::new());
    }

    #[test]
    fn test_metric_deadline_and_yearly_rate() {
        let input = r#"
[deadline]
metric = "budget"

[metric.budget]
initial = 250.0
timestamp = "2024-01-01T00:00:00Z"
rate_per_year = -40.0
"#;
        let config = parse_config(input).unwrap();
        assert_eq!(config.deadline.source, DeadlineSource::Metric(HString::try_from("budget").unwrap()));

        let budget = config.find_metric("budget").unwrap();
        assert_eq!(budget.label.as_str(), "budget");
        assert_eq!(budget.decimals, 2);
        assert!((budget.baseline.rate * SECONDS_PER_YEAR + 40.0).abs() < 1e-9);
    }

    #[test]
    fn test_timestamp_offset_is_normalized() {
        let input = "[deadline]\nat = \"2029-07-22T18:00:03+02:00\"\n";
        let config = parse_config(input).unwrap();
        let expected = Utc.with_ymd_and_hms(2029, 7, 22, 16, 0, 3).unwrap();
        assert_eq!(config.deadline.source, DeadlineSource::At(expected));
    }

    #[test]
    fn test_timestamp_without_offset_rejected() {
        let input = "[deadline]\nat = \"2029-07-22T16:00:03\"\n";
        let err = parse_config(input).unwrap_err();
        assert_eq!(err, ParseError::new(2, ParseErrorKind::InvalidTimestamp));
    }

    #[test]
    fn test_missing_metric_field_reports_section_line() {
        let input = "\n[metric.partial]\ninitial = 1.0\nrate = 0.1\n";
        let err = parse_config(input).unwrap_err();
        assert_eq!(err, ParseError::new(2, ParseErrorKind::MissingField));
    }

    #[test]
    fn test_duplicate_metric_rejected() {
        let metric = "initial = 1.0\nrate = 1.0\ntimestamp = \"2024-01-01T00:00:00Z\"\n";
        let mut input = std::string::String::new();
        input.push_str("[metric.a]\n");
        input.push_str(metric);
        input.push_str("[metric.a]\n");
        input.push_str(metric);
        let err = parse_config(&input).unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::InvalidSection);
    }

    #[test]
    fn test_too_many_metrics() {
        let mut input = std::string::String::new();
        for name in ["a", "b", "c", "d", "e"] {
            input.push_str("[metric.");
            input.push_str(name);
            input.push_str("]\ninitial = 1.0\nrate = 1.0\ntimestamp = \"2024-01-01T00:00:00Z\"\n");
        }
        let err = parse_config(&input).unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::TooManyItems);
    }

    #[test]
    fn test_invalid_sections_and_keys() {
        assert_eq!(parse_config("[stepper]\n").unwrap_err().kind, ParseErrorKind::InvalidSection);
        assert_eq!(parse_config("[matrix.x]\n").unwrap_err().kind, ParseErrorKind::InvalidSection);
        assert_eq!(parse_config("rows = 3\n").unwrap_err().kind, ParseErrorKind::InvalidSection);
        assert_eq!(
            parse_config("[matrix]\nrowz = 32\n").unwrap_err(),
            ParseError::new(2, ParseErrorKind::UnknownKey)
        );
    }

    #[test]
    fn test_invalid_values() {
        assert_eq!(
            parse_config("[matrix]\nchain_length = 4\n").unwrap_err().kind,
            ParseErrorKind::InvalidValue
        );
        assert_eq!(
            parse_config("[matrix]\nbrightness = 0\n").unwrap_err().kind,
            ParseErrorKind::InvalidValue
        );
        assert_eq!(
            parse_config("[alert]\nenabled = yes\n").unwrap_err().kind,
            ParseErrorKind::InvalidValue
        );
        assert_eq!(
            parse_config("[deadline]\non_expiry = \"explode\"\n").unwrap_err().kind,
            ParseErrorKind::InvalidValue
        );
        assert_eq!(
            parse_config("[metric.x]\nrate = inf\n").unwrap_err().kind,
            ParseErrorKind::InvalidValue
        );
    }

    #[test]
    fn test_parse_pin() {
        assert_eq!(parse_pin("\"gpio25\""), Ok(PinConfig::new(25)));
        assert_eq!(parse_pin("!^gpio24"), Ok(PinConfig::button(24)));
        assert_eq!(parse_pin("gpio30"), Err(ParseErrorKind::InvalidPin));
        assert_eq!(parse_pin("pin24"), Err(ParseErrorKind::InvalidPin));
    }

    #[test]
    fn test_inline_comment_inside_string() {
        assert_eq!(parse_key_value("line1 = \"#1\""), Some(("line1", "\"#1\"")));
        assert_eq!(parse_key_value("rows = 32 # panel"), Some(("rows", "32")));
    }

    #[test]
    fn test_blank_primary_metric_disables_it() {
        let config = parse_config("[display]\nprimary_metric = \"\"\n").unwrap();
        assert_eq!(config.display.primary_metric, None);
    }

    #[test]
    fn test_shipped_firmware_config() {
        let config = parse_config(include_str!("../../../climeter-firmware/clock.toml")).unwrap();
        assert_eq!(config.alert, crate::config::AlertConfig::default());
        assert!(config.alert.enabled);
        assert_eq!(config.input.toggle_pin, PinConfig::button(15));
        assert_eq!(config.metrics.len(), 1);
    }
}
