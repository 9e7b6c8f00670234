//! Media Frame Types
//!
//! Decoded frame buffers exchanged with the stream transport:
//! - RGB24 video frames (one image per callback)
//! - Interleaved PCM audio frames (one chunk per callback)
//!
//! Frames are passed by value into the pipeline and a derived frame of the
//! same kind is returned; the pipeline never retains a frame across calls.

pub mod audio;
pub mod video;

pub use audio::AudioFrame;
pub use video::VideoFrame;

use thiserror::Error;

/// Frame validation error types
#[derive(Error, Debug)]
pub enum MediaError {
    #[error("Malformed video frame: expected {expected} bytes for {width}x{height} RGB, got {actual}")]
    MalformedVideo {
        width: u32,
        height: u32,
        expected: usize,
        actual: usize,
    },

    #[error("Malformed audio frame: {0}")]
    MalformedAudio(String),
}
