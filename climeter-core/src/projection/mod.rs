//! Linear extrapolation of snapshot metrics
//!
//! Metrics such as the remaining carbon budget or the renewable share of
//! global energy are published as a value at a timestamp plus a rate of
//! change. Between snapshots the clock extrapolates them linearly.

mod baseline;

pub use baseline::{
    seconds_between, value_at, zero_crossing, ProjectionBaseline, ProjectionError,
    SECONDS_PER_YEAR,
};
