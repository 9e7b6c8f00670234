//! Per-session video and audio processing paths

use crate::config::SessionConfig;
use crate::SessionError;
use alarm_gate::{AlarmClip, AlarmGate, AlarmSignal};
use detection::{
    DrowsinessTracker, EyeStateEstimator, LandmarkEstimator, OnnxLandmarkEstimator, Thresholds,
};
use media_frames::{AudioFrame, VideoFrame};
use std::sync::{Arc, Mutex};
use std::time::Instant;
use tracing::{info, warn};
use uuid::Uuid;

/// Live-updatable detection thresholds.
///
/// The UI side may overwrite values between frames; the video path reads
/// them fresh on every frame, so an update takes effect on the next frame
/// without touching the closed-eye timer.
#[derive(Debug, Clone)]
pub struct SharedThresholds {
    inner: Arc<Mutex<Thresholds>>,
}

impl SharedThresholds {
    pub fn new(thresholds: Thresholds) -> Self {
        Self {
            inner: Arc::new(Mutex::new(thresholds)),
        }
    }

    pub fn get(&self) -> Thresholds {
        *self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn set(&self, thresholds: Thresholds) {
        *self.inner.lock().unwrap_or_else(|e| e.into_inner()) = thresholds;
    }

    pub fn set_ear(&self, ear: f32) {
        self.inner.lock().unwrap_or_else(|e| e.into_inner()).ear = ear;
    }

    pub fn set_wait_time(&self, wait_time: std::time::Duration) {
        self.inner
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .wait_time = wait_time;
    }
}

/// One active stream session.
///
/// Create once per stream, then either call the two entry points directly
/// or `split` into the per-thread paths when the transport drives video
/// and audio from separate callback contexts.
pub struct StreamSession {
    id: Uuid,
    video: VideoPath,
    audio: AudioPath,
    signal: AlarmSignal,
    thresholds: SharedThresholds,
}

impl StreamSession {
    /// Create a session from configuration, building the landmark
    /// capability from the configured model path
    pub fn new(config: &SessionConfig) -> Result<Self, SessionError> {
        let capability = OnnxLandmarkEstimator::new(config.landmark_model_path.as_deref())?;
        Self::with_capability(config, Box::new(capability))
    }

    /// Create a session with an externally supplied landmark capability
    pub fn with_capability(
        config: &SessionConfig,
        capability: Box<dyn LandmarkEstimator>,
    ) -> Result<Self, SessionError> {
        config.validate()?;

        let clip = match &config.alarm_clip_path {
            Some(path) => AlarmClip::from_wav_path(path)?,
            None => default_clip()?,
        };

        let id = Uuid::new_v4();
        let signal = AlarmSignal::new();
        let thresholds = SharedThresholds::new(config.thresholds());

        info!("Stream session {} created", id);

        Ok(Self {
            id,
            video: VideoPath {
                estimator: EyeStateEstimator::new(),
                capability,
                tracker: DrowsinessTracker::new(),
                thresholds: thresholds.clone(),
                signal: signal.clone(),
                was_alarming: false,
            },
            audio: AudioPath {
                gate: AlarmGate::new(signal.clone(), clip, config.gate_mode),
            },
            signal,
            thresholds,
        })
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Handle to the shared alarm boolean
    pub fn signal(&self) -> AlarmSignal {
        self.signal.clone()
    }

    /// Handle for live threshold updates
    pub fn thresholds(&self) -> SharedThresholds {
        self.thresholds.clone()
    }

    /// Video callback entry point
    pub fn process_video_frame(&mut self, frame: VideoFrame) -> VideoFrame {
        self.video.process(frame)
    }

    /// Audio callback entry point
    pub fn process_audio_frame(&mut self, frame: AudioFrame) -> AudioFrame {
        self.audio.process(frame)
    }

    /// Split into the two per-thread paths
    pub fn split(self) -> (VideoPath, AudioPath) {
        (self.video, self.audio)
    }
}

/// Video-side path: estimator -> tracker -> alarm signal
pub struct VideoPath {
    estimator: EyeStateEstimator,
    capability: Box<dyn LandmarkEstimator>,
    tracker: DrowsinessTracker,
    thresholds: SharedThresholds,
    signal: AlarmSignal,
    was_alarming: bool,
}

impl VideoPath {
    /// Process one video frame against the current wall clock
    pub fn process(&mut self, frame: VideoFrame) -> VideoFrame {
        self.process_at(frame, Instant::now())
    }

    /// Process one video frame at an explicit timestamp.
    ///
    /// A malformed frame passes through untouched but still counts toward
    /// the closed-eye timer: a frame the pipeline cannot read cannot
    /// confirm alertness either.
    pub fn process_at(&mut self, frame: VideoFrame, now: Instant) -> VideoFrame {
        metrics::counter!("video_frames_processed").increment(1);
        let thresholds = self.thresholds.get();

        if let Err(e) = frame.validate() {
            warn!("Dropping annotation for unreadable frame: {}", e);
            metrics::counter!("malformed_video_frames").increment(1);
            let alarm = self.tracker.update(true, now, thresholds.wait_time);
            self.publish(alarm);
            return frame;
        }

        let (annotated, eye_metrics) =
            self.estimator
                .process(frame, self.capability.as_ref(), thresholds.ear);

        if let Some(score) = eye_metrics.score {
            metrics::gauge!("eye_openness_score").set(score as f64);
        }

        let alarm = self
            .tracker
            .update(eye_metrics.closed, now, thresholds.wait_time);
        self.publish(alarm);
        annotated
    }

    fn publish(&mut self, alarm: bool) {
        if alarm != self.was_alarming {
            if alarm {
                info!("Drowsiness alarm activated");
                metrics::counter!("alarm_activations").increment(1);
            } else {
                info!("Drowsiness alarm cleared");
            }
            self.was_alarming = alarm;
        }
        self.signal.set(alarm);
    }
}

/// Audio-side path: shared signal -> alarm gate
pub struct AudioPath {
    gate: AlarmGate,
}

impl AudioPath {
    /// Process one audio chunk; malformed chunks pass through untouched
    pub fn process(&mut self, frame: AudioFrame) -> AudioFrame {
        metrics::counter!("audio_chunks_processed").increment(1);

        if let Err(e) = frame.validate() {
            warn!("Passing through unreadable audio chunk: {}", e);
            metrics::counter!("malformed_audio_chunks").increment(1);
            return frame;
        }

        self.gate.process(frame)
    }
}

/// Built-in pulse tone used when no alarm clip file is configured
fn default_clip() -> Result<AlarmClip, SessionError> {
    const RATE: u32 = 16000;
    let samples: Vec<i16> = (0..RATE as usize / 2)
        .map(|i| if (i / 40) % 2 == 0 { 12000 } else { -12000 })
        .collect();
    Ok(AlarmClip::from_samples(samples, RATE)?)
}
