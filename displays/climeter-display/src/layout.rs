//! Fixed layout tables
//!
//! Every position on screen comes from these tables. Positions are the
//! baseline-left corner of the first glyph; panels are 32 pixels high.

use climeter_core::config::ChainLength;
use embedded_graphics::prelude::Point;

use crate::font::FontFace;

/// Where everything goes for one chain length
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Layout {
    /// Total width in pixels
    pub width: i32,
    /// Countdown face
    pub font: FontFace,
    /// Years and days
    pub line1: Point,
    /// Hours, minutes and seconds
    pub line2: Point,
    /// Gap between segments on line 1
    pub segment_spacing: i32,
    /// Face for the projected metric
    pub metric_font: FontFace,
    /// Metric label, if the chain is wide enough for one
    pub metric_label: Option<Point>,
    /// Metric value, if the chain is wide enough for one
    pub metric_value: Option<Point>,
    /// Face for alerts and the deadline-reached screen
    pub alert_font: FontFace,
    pub alert_line1: Point,
    pub alert_line2: Point,
}

const ONE_PANEL: Layout = Layout {
    width: 64,
    font: FontFace::Small,
    line1: Point::new(1, 12),
    line2: Point::new(6, 25),
    segment_spacing: 1,
    metric_font: FontFace::Small,
    metric_label: None,
    metric_value: None,
    alert_font: FontFace::Regular,
    alert_line1: Point::new(11, 15),
    alert_line2: Point::new(17, 28),
};

const TWO_PANELS: Layout = Layout {
    width: 128,
    font: FontFace::Bold,
    line1: Point::new(1, 13),
    line2: Point::new(8, 27),
    segment_spacing: 1,
    metric_font: FontFace::Small,
    metric_label: Some(Point::new(76, 12)),
    metric_value: Some(Point::new(76, 26)),
    alert_font: FontFace::Large,
    alert_line1: Point::new(5, 15),
    alert_line2: Point::new(20, 27),
};

const THREE_PANELS: Layout = Layout {
    width: 192,
    font: FontFace::Bold,
    line1: Point::new(1, 13),
    line2: Point::new(8, 27),
    segment_spacing: 1,
    metric_font: FontFace::Regular,
    metric_label: Some(Point::new(96, 13)),
    metric_value: Some(Point::new(96, 27)),
    alert_font: FontFace::Large,
    alert_line1: Point::new(68, 15),
    alert_line2: Point::new(76, 27),
};

/// Layout for a chain length
pub const fn layout_for(chain: ChainLength) -> &'static Layout {
    match chain {
        ChainLength::One => &ONE_PANEL,
        ChainLength::Two => &TWO_PANELS,
        ChainLength::Three => &THREE_PANELS,
    }
}

impl Layout {
    /// Whether this layout shows a metric under/next to the countdown
    pub fn shows_metric(&self) -> bool {
        self.metric_value.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CHAINS: [ChainLength; 3] = [ChainLength::One, ChainLength::Two, ChainLength::Three];

    #[test]
    fn test_metric_only_on_wide_chains() {
        assert!(!layout_for(ChainLength::One).shows_metric());
        assert!(layout_for(ChainLength::Two).shows_metric());
        assert!(layout_for(ChainLength::Three).shows_metric());
    }

    #[test]
    fn test_widest_countdown_fits() {
        for chain in CHAINS {
            let l = layout_for(chain);
            let line1 = l.line1.x + l.font.text_width("9YRS366DAYS") + 3 * l.segment_spacing;
            let limit = l.metric_label.map_or(l.width, |p| p.x);
            assert!(line1 <= limit, "{chain:?}: {line1} > {limit}");

            let line2 = l.line2.x + l.font.text_width("23:59:59");
            assert!(line2 <= l.metric_value.map_or(l.width, |p| p.x));
        }
    }

    #[test]
    fn test_alert_fits() {
        for chain in CHAINS {
            let l = layout_for(chain);
            assert!(l.alert_line1.x + l.alert_font.text_width("DEADLINE") <= l.width);
            assert!(l.alert_line2.x + l.alert_font.text_width("REACHED") <= l.width);
        }
    }

    #[test]
    fn test_metric_fits() {
        for chain in [ChainLength::Two, ChainLength::Three] {
            let l = layout_for(chain);
            let label = l.metric_label.unwrap();
            assert!(label.x + l.metric_font.text_width("RENEWABLES") <= l.width);
        }
    }

    #[test]
    fn test_lines_fit_panel_height() {
        for chain in CHAINS {
            let l = layout_for(chain);
            assert!(l.line1.y - l.font.height() >= -2);
            assert!(l.line2.y <= 32);
            assert!(l.alert_line2.y <= 32);
        }
    }
}
