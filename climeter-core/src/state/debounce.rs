//! Edge debouncer
//!
//! An edge is accepted only if at least the window has elapsed since the
//! last *accepted* edge. Rejected edges do not restart the window, so a
//! bouncing contact cannot hold the button off indefinitely.

/// Default debounce window in milliseconds
pub const DEFAULT_DEBOUNCE_MS: u32 = 200;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Debouncer {
    window_ms: u32,
    last_accepted_ms: Option<u64>,
}

impl Default for Debouncer {
    fn default() -> Self {
        Self::new(DEFAULT_DEBOUNCE_MS)
    }
}

impl Debouncer {
    pub const fn new(window_ms: u32) -> Self {
        Self {
            window_ms,
            last_accepted_ms: None,
        }
    }

    /// Decide whether an edge at `at_ms` passes, recording it if so
    ///
    /// Timestamps that run backwards count as zero elapsed time.
    pub fn accept(&mut self, at_ms: u64) -> bool {
        let passes = match self.last_accepted_ms {
            None => true,
            Some(last) => at_ms.saturating_sub(last) >= self.window_ms as u64,
        };

        if passes {
            self.last_accepted_ms = Some(at_ms);
        }
        passes
    }

}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_edge_accepted() {
        let mut d = Debouncer::default();
        assert!(d.accept(0));
    }

    #[test]
    fn test_window_boundary() {
        let mut d = Debouncer::new(200);
        assert!(d.accept(1_000));
        assert!(!d.accept(1_199));
        assert!(d.accept(1_200));
    }

    #[test]
    fn test_rejected_edges_do_not_extend_window() {
        let mut d = Debouncer::new(200);
        assert!(d.accept(0));
        assert!(!d.accept(150));
        assert!(!d.accept(190));
        // Measured from the edge at 0, not the rejected one at 190
        assert!(d.accept(200));
    }

    #[test]
    fn test_backwards_time() {
        let mut d = Debouncer::new(200);
        assert!(d.accept(5_000));
        assert!(!d.accept(100));
    }
}
