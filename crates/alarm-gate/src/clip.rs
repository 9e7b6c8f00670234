//! Looping alarm clip

use crate::GateError;
use hound::SampleFormat;
use std::path::Path;
use tracing::info;

/// Fixed-length mono PCM buffer read in wrapping chunks.
///
/// Loaded once at session start; the audio path only ever takes
/// fixed-size chunks with wraparound.
#[derive(Debug, Clone)]
pub struct AlarmClip {
    samples: Vec<i16>,
    sample_rate: u32,
}

impl AlarmClip {
    /// Create a clip from mono samples
    pub fn from_samples(samples: Vec<i16>, sample_rate: u32) -> Result<Self, GateError> {
        if samples.is_empty() {
            return Err(GateError::EmptyClip);
        }
        Ok(Self {
            samples,
            sample_rate,
        })
    }

    /// Load a clip from a WAV file, downmixing multi-channel audio to mono
    pub fn from_wav_path<P: AsRef<Path>>(path: P) -> Result<Self, GateError> {
        let mut reader = hound::WavReader::open(path.as_ref())?;
        let spec = reader.spec();

        let interleaved: Vec<i16> = match (spec.sample_format, spec.bits_per_sample) {
            (SampleFormat::Int, 16) => reader
                .samples::<i16>()
                .collect::<Result<Vec<_>, _>>()?,
            (SampleFormat::Float, 32) => reader
                .samples::<f32>()
                .map(|s| s.map(|v| (v.clamp(-1.0, 1.0) * i16::MAX as f32) as i16))
                .collect::<Result<Vec<_>, _>>()?,
            (format, bits) => {
                return Err(GateError::UnsupportedFormat(format!(
                    "{:?} {}-bit",
                    format, bits
                )))
            }
        };

        let channels = spec.channels.max(1) as usize;
        let mono: Vec<i16> = interleaved
            .chunks(channels)
            .map(|frame| {
                let sum: i32 = frame.iter().map(|&s| s as i32).sum();
                (sum / frame.len() as i32) as i16
            })
            .collect();

        info!(
            "Loaded alarm clip: {} samples at {} Hz",
            mono.len(),
            spec.sample_rate
        );
        Self::from_samples(mono, spec.sample_rate)
    }

    /// Clip length in samples
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Clip sample rate in Hz
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Fill `out` with clip samples starting at `offset`, wrapping at the
    /// clip end. Returns the offset for the next read.
    pub fn fill(&self, offset: usize, out: &mut [i16]) -> usize {
        let len = self.samples.len();
        let offset = offset % len;
        for (i, slot) in out.iter_mut().enumerate() {
            *slot = self.samples[(offset + i) % len];
        }
        (offset + out.len()) % len
    }
}
