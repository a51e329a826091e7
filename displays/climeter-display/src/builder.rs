//! Frame builder
//!
//! Turns a tick snapshot into a [`RenderFrame`]. Which screen is built
//! depends on the display mode first, then on the countdown:
//!
//! | Mode          | Condition                          | Screen            |
//! |---------------|------------------------------------|-------------------|
//! | `CurrentTime` | always                             | UTC date and time |
//! | `Deadline`    | no deadline                        | "NO DEADLINE"     |
//! | `Deadline`    | expired under `ExpiryPolicy::Alert` | "DEADLINE REACHED"|
//! | `Deadline`    | alert comparator says `Stop`       | alert message     |
//! | `Deadline`    | otherwise                          | countdown         |

use core::fmt::Write;

use chrono::{DateTime, Datelike, Timelike, Utc};
use climeter_core::config::{ClockConfig, MAX_LABEL_LEN, MAX_UNIT_LEN};
use climeter_core::countdown::{ExpiryPolicy, TimeBreakdown};
use climeter_core::state::{AlertState, DisplayMode};
use climeter_core::TickSnapshot;
use embedded_graphics::pixelcolor::Rgb888;
use embedded_graphics::prelude::Point;
use heapless::String;

use crate::color::{ALT_YELLOW, GREEN, RED, YELLOW};
use crate::font::FontFace;
use crate::frame::{BuildError, RenderFrame, MAX_ENTRY_LEN};
use crate::layout::{layout_for, Layout};

/// Projected metric drawn next to the countdown
#[derive(Debug, Clone)]
struct MetricSlot {
    /// Index into the snapshot's metric values
    index: usize,
    label: String<MAX_LABEL_LEN>,
    unit: String<MAX_UNIT_LEN>,
    decimals: u8,
}

/// Places text left to right along one baseline
struct Cursor {
    position: Point,
    font: FontFace,
    spacing: i32,
}

impl Cursor {
    fn new(position: Point, font: FontFace, spacing: i32) -> Self {
        Self {
            position,
            font,
            spacing,
        }
    }

    fn put(
        &mut self,
        frame: &mut RenderFrame,
        args: core::fmt::Arguments<'_>,
        color: Rgb888,
    ) -> Result<(), BuildError> {
        let width = frame.push_fmt(args, color, self.position, self.font)?.width();
        self.position.x += width + self.spacing;
        Ok(())
    }
}

/// Builds frames for one configured clock
#[derive(Debug, Clone)]
pub struct FrameBuilder {
    layout: &'static Layout,
    colon_blink: bool,
    alert_line1: String<MAX_LABEL_LEN>,
    alert_line2: String<MAX_LABEL_LEN>,
    metric: Option<MetricSlot>,
}

impl FrameBuilder {
    pub fn from_config(config: &ClockConfig) -> Self {
        let layout = layout_for(config.matrix.chain_length);

        let metric = config
            .display
            .primary_metric
            .as_ref()
            .and_then(|name| config.metric_index(name))
            .filter(|_| layout.shows_metric())
            .map(|index| {
                let m = &config.metrics[index];
                MetricSlot {
                    index,
                    label: m.label.clone(),
                    unit: m.unit.clone(),
                    decimals: m.decimals,
                }
            });

        Self {
            layout,
            colon_blink: config.display.colon_blink,
            alert_line1: config.alert.line1.clone(),
            alert_line2: config.alert.line2.clone(),
            metric,
        }
    }

    pub fn layout(&self) -> &'static Layout {
        self.layout
    }

    /// Build the frame for a tick
    pub fn build(&self, snapshot: &TickSnapshot) -> Result<RenderFrame, BuildError> {
        let mut frame = RenderFrame::new();

        match snapshot.mode {
            DisplayMode::CurrentTime => self.time_screen(&mut frame, snapshot.now)?,
            DisplayMode::Deadline => match snapshot.countdown {
                None => {
                    self.message(&mut frame, "NO", "DEADLINE", ALT_YELLOW, ALT_YELLOW)?;
                }
                Some(b) if b.expired && snapshot.expiry == ExpiryPolicy::Alert => {
                    self.message(&mut frame, "DEADLINE", "REACHED", RED, RED)?;
                }
                Some(_) if snapshot.alert == AlertState::Stop => {
                    self.message(&mut frame, &self.alert_line1, &self.alert_line2, RED, GREEN)?;
                }
                Some(b) => {
                    let count_up = b.expired && snapshot.expiry == ExpiryPolicy::CountUp;
                    self.countdown(&mut frame, &b, count_up)?;
                    self.metric(&mut frame, snapshot)?;
                }
            },
        }

        Ok(frame)
    }

    /// Placeholder shown until wall-clock time is known
    pub fn build_syncing(&self) -> Result<RenderFrame, BuildError> {
        let mut frame = RenderFrame::new();
        self.message(&mut frame, "SYNCING", "", ALT_YELLOW, ALT_YELLOW)?;
        Ok(frame)
    }

    fn countdown(
        &self,
        frame: &mut RenderFrame,
        b: &TimeBreakdown,
        count_up: bool,
    ) -> Result<(), BuildError> {
        let l = self.layout;

        let mut line1 = Cursor::new(l.line1, l.font, l.segment_spacing);
        if count_up {
            line1.put(frame, format_args!("-"), RED)?;
        }
        line1.put(frame, format_args!("{}", b.years), YELLOW)?;
        line1.put(frame, format_args!("{}", b.year_label()), ALT_YELLOW)?;
        line1.put(frame, format_args!("{:03}", b.days), YELLOW)?;
        line1.put(frame, format_args!("{}", b.day_label()), ALT_YELLOW)?;

        let separator = if !self.colon_blink || b.separator_visible() {
            ":"
        } else {
            " "
        };
        let mut line2 = Cursor::new(l.line2, l.font, 0);
        line2.put(frame, format_args!("{:02}", b.hours), YELLOW)?;
        line2.put(frame, format_args!("{separator}"), YELLOW)?;
        line2.put(frame, format_args!("{:02}", b.minutes), YELLOW)?;
        line2.put(frame, format_args!("{separator}"), YELLOW)?;
        line2.put(frame, format_args!("{:02}", b.seconds), YELLOW)?;
        Ok(())
    }

    fn metric(&self, frame: &mut RenderFrame, snapshot: &TickSnapshot) -> Result<(), BuildError> {
        let l = self.layout;
        let (Some(slot), Some(label_at), Some(value_at)) = (&self.metric, l.metric_label, l.metric_value)
        else {
            return Ok(());
        };
        let Some(value) = snapshot.metrics.get(slot.index) else {
            return Ok(());
        };

        // A value that does not fit an entry drops the metric, not the frame
        let mut text = String::<MAX_ENTRY_LEN>::new();
        if write!(text, "{:.*}{}", slot.decimals as usize, value, slot.unit).is_err() {
            return Ok(());
        }

        frame.push_fmt(format_args!("{}", slot.label), ALT_YELLOW, label_at, l.metric_font)?;
        frame.push_fmt(format_args!("{text}"), YELLOW, value_at, l.metric_font)?;
        Ok(())
    }

    fn time_screen(&self, frame: &mut RenderFrame, now: DateTime<Utc>) -> Result<(), BuildError> {
        let l = self.layout;

        let mut line1 = Cursor::new(l.line1, l.font, l.segment_spacing);
        line1.put(
            frame,
            format_args!("{:04}-{:02}-{:02}", now.year(), now.month(), now.day()),
            YELLOW,
        )?;

        let mut line2 = Cursor::new(l.line2, l.font, l.segment_spacing);
        line2.put(
            frame,
            format_args!("{:02}:{:02}:{:02}", now.hour(), now.minute(), now.second()),
            YELLOW,
        )?;
        // Zone label only where it fits
        if line2.position.x + l.font.text_width("UTC") <= l.width {
            line2.put(frame, format_args!("UTC"), ALT_YELLOW)?;
        }
        Ok(())
    }

    /// Two-line message in the alert face
    fn message(
        &self,
        frame: &mut RenderFrame,
        line1: &str,
        line2: &str,
        color1: Rgb888,
        color2: Rgb888,
    ) -> Result<(), BuildError> {
        let l = self.layout;
        frame.push_fmt(format_args!("{line1}"), color1, l.alert_line1, l.alert_font)?;
        if !line2.is_empty() {
            frame.push_fmt(format_args!("{line2}"), color2, l.alert_line2, l.alert_font)?;
        }
        Ok(())
    }
}
