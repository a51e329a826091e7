//! Per-tick orchestration
//!
//! Each tick samples the countdown and every projected metric against the
//! same "now", then applies the pending button event (if any) to the
//! display mode. The result is a self-contained snapshot the renderer can
//! format without looking at anything else.

use chrono::{DateTime, Utc};
use heapless::Vec;

use crate::config::{ClockConfig, DeadlineSource, MAX_METRICS};
use crate::countdown::{Countdown, ExpiryPolicy, TimeBreakdown};
use crate::projection::{ProjectionBaseline, ProjectionError};
use crate::state::{AlertComparator, AlertState, ButtonEvent, DisplayMode, DisplayModeController};

/// Engine construction error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum EngineError {
    /// The deadline refers to a metric that is not configured
    UnknownMetric,
}

/// Everything sampled in one tick
#[derive(Debug, Clone, PartialEq)]
pub struct TickSnapshot {
    pub now: DateTime<Utc>,
    /// Mode after this tick's input was applied
    pub mode: DisplayMode,
    /// The mode flipped during this tick
    pub mode_changed: bool,
    pub alert: AlertState,
    /// `None` when there is no deadline
    pub countdown: Option<TimeBreakdown>,
    pub expiry: ExpiryPolicy,
    /// Projected values, in configuration order
    pub metrics: Vec<f64, MAX_METRICS>,
}

/// Countdown, projections and display mode for one clock
#[derive(Debug, Clone)]
pub struct ClockEngine {
    countdown: Option<Countdown>,
    expiry: ExpiryPolicy,
    metrics: Vec<ProjectionBaseline, MAX_METRICS>,
    controller: DisplayModeController,
    alert: AlertComparator,
}

impl ClockEngine {
    /// Build from configuration, resolving the deadline
    ///
    /// A deadline taken from a metric whose value never reaches zero
    /// (zero rate, or a crossing beyond the calendar) leaves the engine
    /// without a countdown. That is not an error.
    pub fn from_config(config: &ClockConfig) -> Result<Self, EngineError> {
        let expiry = config.deadline.on_expiry;
        let deadline = match &config.deadline.source {
            DeadlineSource::At(at) => Some(*at),
            DeadlineSource::Metric(name) => {
                let metric = config.find_metric(name).ok_or(EngineError::UnknownMetric)?;
                match metric.baseline.zero_crossing() {
                    Ok(at) => Some(at),
                    Err(ProjectionError::DegenerateModel | ProjectionError::OutOfRange) => None,
                }
            }
        };

        let mut engine = Self::new(
            deadline.map(|at| Countdown::new(at, expiry)),
            DisplayModeController::new(config.input.toggle_pin.pin, config.input.debounce_ms),
            AlertComparator::new(config.alert.enabled, config.alert.seconds_threshold),
        );
        engine.expiry = expiry;
        // Same capacity on both sides
        for metric in &config.metrics {
            let _ = engine.metrics.push(metric.baseline);
        }
        Ok(engine)
    }

    pub fn new(
        countdown: Option<Countdown>,
        controller: DisplayModeController,
        alert: AlertComparator,
    ) -> Self {
        Self {
            expiry: countdown.map(|c| c.policy()).unwrap_or_default(),
            countdown,
            metrics: Vec::new(),
            controller,
            alert,
        }
    }

    pub fn deadline(&self) -> Option<DateTime<Utc>> {
        self.countdown.map(|c| c.deadline())
    }

    pub fn mode(&self) -> DisplayMode {
        self.controller.mode()
    }

    /// Sample everything at `now` and apply an optional button event
    pub fn tick(&mut self, now: DateTime<Utc>, event: Option<ButtonEvent>) -> TickSnapshot {
        let countdown = self.countdown.map(|c| c.sample(now));
        let metrics = self.metrics.iter().map(|b| b.value_at(now)).collect();

        let mode_changed = match event {
            Some(event) => self.controller.handle(event).is_some(),
            None => false,
        };

        TickSnapshot {
            now,
            mode: self.controller.mode(),
            mode_changed,
            alert: self.alert.evaluate(countdown.as_ref()),
            countdown,
            expiry: self.expiry,
            metrics,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{MetricConfig, PinConfig};
    use crate::input::EdgeLatch;
    use chrono::{TimeDelta, TimeZone};
    use heapless::String;

    fn deadline() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2029, 7, 22, 16, 0, 3).unwrap()
    }

    fn depleting(name: &str, rate: f64) -> MetricConfig {
        MetricConfig {
            name: String::try_from(name).unwrap(),
            label: String::try_from(name).unwrap(),
            unit: String::new(),
            decimals: 1,
            baseline: ProjectionBaseline::new(deadline() - TimeDelta::seconds(100), 100.0, rate),
        }
    }

    #[test]
    fn test_snapshot_tick() {
        let mut engine = ClockEngine::from_config(&ClockConfig::snapshot()).unwrap();
        let now = Utc.with_ymd_and_hms(2026, 10, 19, 12, 0, 0).unwrap();
        let snap = engine.tick(now, None);

        assert_eq!(snap.mode, DisplayMode::Deadline);
        assert!(!snap.mode_changed);
        let countdown = snap.countdown.unwrap();
        assert_eq!(countdown.years, 2);
        assert!(!countdown.expired);
        assert_eq!(snap.metrics.len(), 1);
        assert!(snap.metrics[0] > 11.4);
    }

    #[test]
    fn test_button_toggles_mode() {
        let mut config = ClockConfig::new();
        config.input.toggle_pin = PinConfig::button(24);
        let mut engine = ClockEngine::from_config(&config).unwrap();
        let now = deadline() - TimeDelta::days(10);

        let snap = engine.tick(now, Some(ButtonEvent::rising(24, 1_000)));
        assert!(snap.mode_changed);
        assert_eq!(snap.mode, DisplayMode::CurrentTime);

        // Bounce inside the window
        let snap = engine.tick(now, Some(ButtonEvent::rising(24, 1_100)));
        assert!(!snap.mode_changed);
        assert_eq!(engine.mode(), DisplayMode::CurrentTime);
    }

    #[test]
    fn test_quick_tap_through_latch_toggles() {
        let mut engine = ClockEngine::from_config(&ClockConfig::new()).unwrap();
        let latch = EdgeLatch::new();
        let now = deadline() - TimeDelta::days(10);

        // Pressed and released between two ticks
        latch.post(ButtonEvent::rising(24, 1_000));
        latch.post(ButtonEvent::falling(24, 1_030));

        let snap = engine.tick(now + TimeDelta::milliseconds(50), latch.take());
        assert!(snap.mode_changed);
        assert_eq!(snap.mode, DisplayMode::CurrentTime);
        assert!(!latch.is_pending());
    }

    #[test]
    fn test_alert_in_last_seconds_of_minute() {
        let mut engine = ClockEngine::from_config(&ClockConfig::new()).unwrap();

        let snap = engine.tick(deadline() - TimeDelta::seconds(60 + 56), None);
        assert_eq!(snap.countdown.map(|c| c.seconds), Some(56));
        assert_eq!(snap.alert, AlertState::Stop);

        let snap = engine.tick(deadline() - TimeDelta::seconds(60 + 30), None);
        assert_eq!(snap.alert, AlertState::Countdown);
    }

    #[test]
    fn test_deadline_from_metric() {
        let mut config = ClockConfig::new();
        config.metrics.push(depleting("budget", -1.0)).unwrap();
        config.deadline.source = DeadlineSource::Metric(String::try_from("budget").unwrap());

        let engine = ClockEngine::from_config(&config).unwrap();
        assert_eq!(engine.deadline(), Some(deadline()));
    }

    #[test]
    fn test_degenerate_metric_suppresses_countdown() {
        let mut config = ClockConfig::new();
        config.metrics.push(depleting("flat", 0.0)).unwrap();
        config.deadline.source = DeadlineSource::Metric(String::try_from("flat").unwrap());

        let mut engine = ClockEngine::from_config(&config).unwrap();
        assert_eq!(engine.deadline(), None);

        let snap = engine.tick(deadline(), None);
        assert!(snap.countdown.is_none());
        assert_eq!(snap.alert, AlertState::Countdown);
        assert_eq!(snap.metrics[0], 100.0);
    }

    #[test]
    fn test_unknown_metric() {
        let mut config = ClockConfig::new();
        config.deadline.source = DeadlineSource::Metric(String::try_from("missing").unwrap());
        assert_eq!(ClockEngine::from_config(&config).unwrap_err(), EngineError::UnknownMetric);
    }

    #[test]
    fn test_expiry_policy_carried() {
        let mut config = ClockConfig::new();
        config.deadline.on_expiry = ExpiryPolicy::Alert;
        let mut engine = ClockEngine::from_config(&config).unwrap();

        let snap = engine.tick(deadline() + TimeDelta::seconds(1), None);
        assert_eq!(snap.expiry, ExpiryPolicy::Alert);
        assert!(snap.countdown.unwrap().expired);
    }
}
