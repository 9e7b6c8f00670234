//! Async session driver
//!
//! Pumps the two frame streams through a session on independent tasks.
//! The transport owns backpressure: channel capacity bounds in-flight
//! frames, and neither task ever waits on the other.

use crate::session::StreamSession;
use media_frames::{AudioFrame, VideoFrame};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::debug;

/// Two spawned tasks, one per callback stream
pub struct SessionDriver {
    video_task: JoinHandle<()>,
    audio_task: JoinHandle<()>,
}

impl SessionDriver {
    /// Split the session and spawn the per-stream pump tasks.
    ///
    /// Each task drains its inbound channel, processes one frame at a
    /// time, and forwards the result; it exits when either side of its
    /// channel pair closes.
    pub fn spawn(
        session: StreamSession,
        mut video_in: mpsc::Receiver<VideoFrame>,
        video_out: mpsc::Sender<VideoFrame>,
        mut audio_in: mpsc::Receiver<AudioFrame>,
        audio_out: mpsc::Sender<AudioFrame>,
    ) -> Self {
        let (mut video_path, mut audio_path) = session.split();

        let video_task = tokio::spawn(async move {
            while let Some(frame) = video_in.recv().await {
                let frame = video_path.process(frame);
                if video_out.send(frame).await.is_err() {
                    break;
                }
            }
            debug!("Video stream closed");
        });

        let audio_task = tokio::spawn(async move {
            while let Some(frame) = audio_in.recv().await {
                let frame = audio_path.process(frame);
                if audio_out.send(frame).await.is_err() {
                    break;
                }
            }
            debug!("Audio stream closed");
        });

        Self {
            video_task,
            audio_task,
        }
    }

    /// Wait for both streams to close
    pub async fn join(self) {
        let _ = self.video_task.await;
        let _ = self.audio_task.await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SessionConfig;
    use detection::landmark::{eye_contour, Point2};
    use detection::{LandmarkSet, ScriptedLandmarks};

    fn closed_face() -> LandmarkSet {
        LandmarkSet::Present {
            left_eye: eye_contour(Point2::new(0.35, 0.4), 0.06, 0.004),
            right_eye: eye_contour(Point2::new(0.65, 0.4), 0.06, 0.004),
        }
    }

    #[tokio::test]
    async fn test_driver_pumps_both_streams() {
        let config = SessionConfig {
            wait_time_seconds: 0.0,
            ..Default::default()
        };
        let script = ScriptedLandmarks::new(vec![closed_face(), closed_face()]);
        let session = StreamSession::with_capability(&config, Box::new(script)).unwrap();
        let signal = session.signal();

        let (video_tx, video_in) = mpsc::channel(4);
        let (video_out_tx, mut video_rx) = mpsc::channel(4);
        let (audio_tx, audio_in) = mpsc::channel(4);
        let (audio_out_tx, mut audio_rx) = mpsc::channel(4);

        let driver = SessionDriver::spawn(session, video_in, video_out_tx, audio_in, audio_out_tx);

        // Zero wait time: the first closed frame raises the alarm.
        video_tx
            .send(VideoFrame::new(vec![0; 160 * 120 * 3], 160, 120, 0, 0))
            .await
            .unwrap();
        let annotated = video_rx.recv().await.unwrap();
        assert_eq!(annotated.data.len(), 160 * 120 * 3);
        assert!(signal.get());

        audio_tx
            .send(AudioFrame::new(vec![0; 480], 1, 16000, 0))
            .await
            .unwrap();
        let gated = audio_rx.recv().await.unwrap();
        assert!(gated.samples.iter().any(|&s| s != 0));

        drop(video_tx);
        drop(audio_tx);
        driver.join().await;
    }

    #[tokio::test]
    async fn test_driver_stops_when_inputs_close() {
        let session = StreamSession::with_capability(
            &SessionConfig::default(),
            Box::new(ScriptedLandmarks::new(vec![])),
        )
        .unwrap();

        let (video_tx, video_in) = mpsc::channel::<VideoFrame>(1);
        let (video_out_tx, _video_rx) = mpsc::channel(1);
        let (audio_tx, audio_in) = mpsc::channel::<AudioFrame>(1);
        let (audio_out_tx, _audio_rx) = mpsc::channel(1);

        let driver = SessionDriver::spawn(session, video_in, video_out_tx, audio_in, audio_out_tx);
        drop(video_tx);
        drop(audio_tx);
        driver.join().await;
    }
}
