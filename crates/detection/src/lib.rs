//! Drowsiness Detection Core
//!
//! Per-frame eye state analysis for a live video stream:
//! - Landmark capability boundary (external estimator behind a trait)
//! - Eye openness scoring from eye-contour geometry (EAR analog)
//! - Closed-eye timing state machine producing the alarm boolean
//! - Operator feedback overlay on the returned frame

pub mod config;
pub mod estimator;
pub mod landmark;
mod overlay;
pub mod tracker;

pub use config::Thresholds;
pub use estimator::{EyeMetrics, EyeStateEstimator};
pub use landmark::{LandmarkEstimator, LandmarkSet, OnnxLandmarkEstimator, Point2, ScriptedLandmarks};
pub use tracker::DrowsinessTracker;

use thiserror::Error;

/// Detection error types
#[derive(Error, Debug)]
pub enum DetectionError {
    #[error("Model loading failed: {0}")]
    ModelLoad(String),

    #[error("Inference failed: {0}")]
    Inference(String),

    #[error("Image processing failed: {0}")]
    ImageProcessing(String),

    #[error("Landmark capability failed: {0}")]
    Capability(String),
}
