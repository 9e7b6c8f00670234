//! Stream Session
//!
//! Wires the detection core and the alarm gate into the two callback
//! streams the transport drives:
//! - Video path: validate -> estimate -> track -> publish alarm signal
//! - Audio path: validate -> gate the looping alarm clip
//!
//! The only coupling between the paths is the shared alarm boolean.

pub mod config;
pub mod driver;
pub mod session;

pub use config::SessionConfig;
pub use driver::SessionDriver;
pub use session::{AudioPath, SharedThresholds, StreamSession, VideoPath};

use thiserror::Error;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

/// Session error types
#[derive(Error, Debug)]
pub enum SessionError {
    #[error("Configuration error: {0}")]
    Config(#[from] ::config::ConfigError),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Detection setup failed: {0}")]
    Detection(#[from] detection::DetectionError),

    #[error("Alarm gate setup failed: {0}")]
    Gate(#[from] alarm_gate::GateError),
}

/// Initialize logging
pub fn init_logging() {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .with_target(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .expect("Failed to set tracing subscriber");
}
