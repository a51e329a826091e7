//! Button input plumbing
//!
//! Edges are detected in one execution context (an interrupt-driven task)
//! and consumed by the render loop in another. The hand-off is a single
//! atomic slot rather than a queue. A pending press is kept when its
//! release arrives in the same tick, so quick taps are not lost. Two
//! presses within one tick collapse into the newer one; the debouncer
//! would have rejected the second anyway.

mod edge;
mod latch;

pub use edge::EdgeDetector;
pub use latch::EdgeLatch;
