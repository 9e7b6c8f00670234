//! Detection thresholds

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Detection thresholds, supplied per session and tunable between frames
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Thresholds {
    /// Minimum eye aspect ratio still classified as open
    pub ear: f32,

    /// Continuous closed-eye duration required before the alarm fires
    pub wait_time: Duration,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            ear: 0.18,
            wait_time: Duration::from_secs(1),
        }
    }
}

impl Thresholds {
    /// Create strict thresholds (alarm sooner)
    pub fn strict() -> Self {
        Self {
            ear: 0.22,
            wait_time: Duration::from_millis(500),
        }
    }

    /// Create lenient thresholds (alarm later)
    pub fn lenient() -> Self {
        Self {
            ear: 0.15,
            wait_time: Duration::from_secs(2),
        }
    }
}
