//! Closed-eye timing state machine

use std::time::{Duration, Instant};
use tracing::debug;

/// Per-session drowsiness tracker.
///
/// Holds the start of the current closed-eye run and reports, for every
/// frame, whether the run has outlasted the wait time. Elapsed time is
/// monotonic wall clock, not frame counts, so the verdict is invariant to
/// frame-rate fluctuations. The wait time is read fresh on every update:
/// lowering it can fire an in-progress timer on the next frame, raising it
/// can un-fire one, and neither resets the run start.
#[derive(Debug, Default)]
pub struct DrowsinessTracker {
    closed_since: Option<Instant>,
}

impl DrowsinessTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Consume one frame classification and report the alarm boolean.
    ///
    /// `closed` covers both closed eyes and an absent face. A wait time of
    /// zero fires on the first closed frame.
    pub fn update(&mut self, closed: bool, now: Instant, wait_time: Duration) -> bool {
        if !closed {
            if self.closed_since.take().is_some() {
                debug!("Eyes open, closed-eye timer reset");
            }
            return false;
        }

        let since = *self.closed_since.get_or_insert(now);
        now.saturating_duration_since(since) >= wait_time
    }

    /// Whether a closed-eye run is currently being timed
    pub fn is_timing(&self) -> bool {
        self.closed_since.is_some()
    }

    /// Discard any in-progress closed-eye run
    pub fn reset(&mut self) {
        self.closed_since = None;
    }
}
