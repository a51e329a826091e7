//! Calendar-aware countdown
//!
//! Breaks the time left until a deadline into years, days and a clock
//! remainder the way a calendar would, respecting month lengths and leap
//! years instead of dividing by an average year.

pub mod breakdown;
pub mod calendar;

pub use breakdown::{breakdown, breakdown_with, Countdown, ExpiryPolicy, TimeBreakdown};
pub use calendar::CalendarDelta;
