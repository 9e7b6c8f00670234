//! Per-audio-frame alarm gating

use crate::clip::AlarmClip;
use crate::signal::AlarmSignal;
use media_frames::AudioFrame;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// What the audio path emits while the alarm is off
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GateMode {
    /// Emit zeroed samples
    #[default]
    Silence,
    /// Emit the captured audio unchanged
    Passthrough,
}

/// Audio-path transformer: plays the looping clip while the shared signal
/// is on, otherwise mutes per [`GateMode`].
///
/// The clip read offset holds its position while muted, so playback
/// resumes mid-clip rather than restarting. No debouncing: signal flips
/// map directly to sample-level start/stop.
pub struct AlarmGate {
    signal: AlarmSignal,
    clip: AlarmClip,
    mode: GateMode,
    offset: usize,
    was_active: bool,
}

impl AlarmGate {
    pub fn new(signal: AlarmSignal, clip: AlarmClip, mode: GateMode) -> Self {
        Self {
            signal,
            clip,
            mode,
            offset: 0,
            was_active: false,
        }
    }

    /// Transform one audio chunk, preserving its sample count and format
    pub fn process(&mut self, mut frame: AudioFrame) -> AudioFrame {
        // Lock held for the boolean read only, never for the mixing work.
        let active = self.signal.get();

        if active != self.was_active {
            debug!(
                "Alarm playback {}",
                if active { "started" } else { "stopped" }
            );
            self.was_active = active;
        }

        if frame.channels == 0 {
            return frame;
        }

        if active {
            let channels = frame.channels as usize;
            let mut mono = vec![0i16; frame.samples_per_channel()];
            self.offset = self.clip.fill(self.offset, &mut mono);

            for (i, sample) in frame.samples.iter_mut().enumerate() {
                *sample = mono[i / channels];
            }
        } else if self.mode == GateMode::Silence {
            frame.samples.fill(0);
        }

        frame
    }

    /// Current clip read offset in samples
    pub fn offset(&self) -> usize {
        self.offset
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gate(mode: GateMode) -> (AlarmSignal, AlarmGate) {
        let signal = AlarmSignal::new();
        let clip = AlarmClip::from_samples(vec![10, 20, 30, 40, 50, 60, 70], 16000).unwrap();
        let gate = AlarmGate::new(signal.clone(), clip, mode);
        (signal, gate)
    }

    fn chunk(len: usize, channels: u16) -> AudioFrame {
        AudioFrame::new(vec![7; len * channels as usize], channels, 16000, 0)
    }

    #[test]
    fn test_three_chunks_advance_monotonically_across_wrap() {
        let (signal, mut gate) = gate(GateMode::Silence);
        signal.set(true);

        let a = gate.process(chunk(3, 1));
        let b = gate.process(chunk(3, 1));
        let c = gate.process(chunk(3, 1));

        assert_eq!(a.samples, vec![10, 20, 30]);
        assert_eq!(b.samples, vec![40, 50, 60]);
        // Third chunk crosses the clip end with no gap or repeat.
        assert_eq!(c.samples, vec![70, 10, 20]);
        assert_eq!(gate.offset(), 2);
    }

    #[test]
    fn test_offset_holds_while_muted_and_resumes_mid_clip() {
        let (signal, mut gate) = gate(GateMode::Silence);
        signal.set(true);
        let _ = gate.process(chunk(4, 1));
        assert_eq!(gate.offset(), 4);

        signal.set(false);
        let muted = gate.process(chunk(4, 1));
        assert_eq!(muted.samples, vec![0; 4]);
        assert_eq!(gate.offset(), 4);

        signal.set(true);
        let resumed = gate.process(chunk(2, 1));
        assert_eq!(resumed.samples, vec![50, 60]);
    }

    #[test]
    fn test_passthrough_keeps_captured_audio() {
        let (_, mut gate) = gate(GateMode::Passthrough);
        let out = gate.process(chunk(4, 1));
        assert_eq!(out.samples, vec![7; 4]);
    }

    #[test]
    fn test_silence_zeroes_captured_audio() {
        let (_, mut gate) = gate(GateMode::Silence);
        let out = gate.process(chunk(4, 1));
        assert_eq!(out.samples, vec![0; 4]);
    }

    #[test]
    fn test_clip_replicated_across_channels() {
        let (signal, mut gate) = gate(GateMode::Silence);
        signal.set(true);

        let out = gate.process(chunk(3, 2));
        assert_eq!(out.samples, vec![10, 10, 20, 20, 30, 30]);
        assert_eq!(out.channels, 2);
        // Offset advances per clip sample, not per interleaved sample.
        assert_eq!(gate.offset(), 3);
    }

    #[test]
    fn test_output_matches_input_shape() {
        let (signal, mut gate) = gate(GateMode::Silence);
        signal.set(true);
        let out = gate.process(chunk(480, 2));
        assert_eq!(out.samples.len(), 960);
        assert_eq!(out.sample_rate, 16000);
    }
}
