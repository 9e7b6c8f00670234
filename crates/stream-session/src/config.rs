//! Session configuration

use crate::SessionError;
use alarm_gate::GateMode;
use detection::Thresholds;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Session configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Minimum eye aspect ratio still classified as open
    pub ear_threshold: f32,

    /// Continuous closed-eye seconds before the alarm fires
    pub wait_time_seconds: f32,

    /// What the audio path emits while the alarm is off
    pub gate_mode: GateMode,

    /// WAV file for the alarm clip; a built-in tone is used when unset
    pub alarm_clip_path: Option<String>,

    /// ONNX landmark model; the mock estimator is used when unset
    pub landmark_model_path: Option<String>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            ear_threshold: 0.18,
            wait_time_seconds: 1.0,
            gate_mode: GateMode::Silence,
            alarm_clip_path: None,
            landmark_model_path: None,
        }
    }
}

impl SessionConfig {
    /// Load configuration layered from defaults, an optional file, and
    /// `DROWSY_*` environment variables
    pub fn load(path: Option<&str>) -> Result<Self, SessionError> {
        let mut builder = config::Config::builder()
            .set_default("ear_threshold", 0.18_f64)?
            .set_default("wait_time_seconds", 1.0_f64)?
            .set_default("gate_mode", "silence")?;

        if let Some(path) = path {
            builder = builder.add_source(config::File::with_name(path));
        }

        let loaded: SessionConfig = builder
            .add_source(config::Environment::with_prefix("DROWSY"))
            .build()?
            .try_deserialize()?;

        loaded.validate()?;
        Ok(loaded)
    }

    /// Reject values outside the configurable ranges
    pub fn validate(&self) -> Result<(), SessionError> {
        if !self.ear_threshold.is_finite() || self.ear_threshold < 0.0 {
            return Err(SessionError::InvalidConfig(format!(
                "ear_threshold must be a non-negative number, got {}",
                self.ear_threshold
            )));
        }
        if !self.wait_time_seconds.is_finite() || self.wait_time_seconds < 0.0 {
            return Err(SessionError::InvalidConfig(format!(
                "wait_time_seconds must be a non-negative number, got {}",
                self.wait_time_seconds
            )));
        }
        Ok(())
    }

    /// Detection thresholds for this configuration
    pub fn thresholds(&self) -> Thresholds {
        Thresholds {
            ear: self.ear_threshold,
            wait_time: Duration::from_secs_f32(self.wait_time_seconds),
        }
    }
}
