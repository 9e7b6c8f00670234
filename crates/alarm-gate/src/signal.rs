//! Shared alarm boolean

use std::sync::{Arc, Mutex};

/// The alarm boolean shared between the video path (writer) and the audio
/// path (reader).
///
/// Both accessors hold the lock only for the single read or write, never
/// for frame processing, so neither stream can stall the other. Only the
/// latest value matters; there is no history.
#[derive(Debug, Clone, Default)]
pub struct AlarmSignal {
    play_alarm: Arc<Mutex<bool>>,
}

impl AlarmSignal {
    pub fn new() -> Self {
        Self::default()
    }

    /// Overwrite the signal. Called from the video path once per frame.
    pub fn set(&self, active: bool) {
        // The lock only ever guards a plain bool; recover the value if a
        // holder panicked.
        *self
            .play_alarm
            .lock()
            .unwrap_or_else(|e| e.into_inner()) = active;
    }

    /// Read the signal. Called from the audio path once per chunk.
    pub fn get(&self) -> bool {
        *self.play_alarm.lock().unwrap_or_else(|e| e.into_inner())
    }
}
