//! Alarm Gate
//!
//! The single point of coupling between the video and audio paths:
//! - A mutex-guarded boolean written once per video frame and read once
//!   per audio chunk
//! - A fixed looping alarm clip read in wrapping chunks
//! - The per-audio-frame transformer that plays or mutes the clip

pub mod clip;
pub mod gate;
pub mod signal;

pub use clip::AlarmClip;
pub use gate::{AlarmGate, GateMode};
pub use signal::AlarmSignal;

use thiserror::Error;

/// Alarm gate error types
#[derive(Error, Debug)]
pub enum GateError {
    #[error("Failed to read alarm clip: {0}")]
    ClipRead(#[from] hound::Error),

    #[error("Alarm clip is empty")]
    EmptyClip,

    #[error("Unsupported alarm clip format: {0}")]
    UnsupportedFormat(String),
}
