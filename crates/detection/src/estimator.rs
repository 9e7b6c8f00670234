//! Eye openness scoring and open/closed classification

use crate::landmark::{EyeContour, LandmarkEstimator, LandmarkSet};
use crate::overlay;
use media_frames::VideoFrame;
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Per-frame eye state
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EyeMetrics {
    /// Averaged eye aspect ratio, `None` when no face was found
    pub score: Option<f32>,
    /// Whether this frame counts toward the closed-eye timer
    pub closed: bool,
}

/// Eye aspect ratio for one eye contour: eyelid gap over eye width.
///
/// A degenerate eye width yields 0 rather than dividing by (near) zero.
pub fn eye_aspect_ratio(eye: &EyeContour) -> f32 {
    let v1 = eye[1].distance(&eye[5]);
    let v2 = eye[2].distance(&eye[4]);
    let h = eye[0].distance(&eye[3]);

    if h < 1e-4 {
        return 0.0;
    }

    (v1 + v2) / (2.0 * h)
}

/// Stateless per-frame classifier
///
/// Pure function of (frame, landmarks, threshold) aside from the feedback
/// overlay drawn on the returned frame.
#[derive(Debug, Default)]
pub struct EyeStateEstimator;

impl EyeStateEstimator {
    pub fn new() -> Self {
        Self
    }

    /// Classify a landmark set against the EAR threshold.
    ///
    /// An absent face counts as closed: alertness cannot be confirmed, so
    /// the timer keeps running. Scores are non-negative, so a threshold of
    /// zero can never classify closed (strict `<`).
    pub fn classify(&self, landmarks: &LandmarkSet, ear_threshold: f32) -> EyeMetrics {
        match landmarks {
            LandmarkSet::Present { left_eye, right_eye } => {
                let score = (eye_aspect_ratio(left_eye) + eye_aspect_ratio(right_eye)) / 2.0;
                EyeMetrics {
                    score: Some(score),
                    closed: score < ear_threshold,
                }
            }
            LandmarkSet::Absent => EyeMetrics {
                score: None,
                closed: true,
            },
        }
    }

    /// Run the landmark capability on one frame and classify the result.
    ///
    /// Capability failures are contained here: the frame degrades to
    /// "no face found" and the stream continues.
    pub fn process(
        &self,
        frame: VideoFrame,
        capability: &dyn LandmarkEstimator,
        ear_threshold: f32,
    ) -> (VideoFrame, EyeMetrics) {
        let landmarks = match capability.estimate(&frame) {
            Ok(landmarks) => landmarks,
            Err(e) => {
                warn!("Landmark capability failed, treating frame as face absent: {}", e);
                metrics::counter!("detection_estimator_failures").increment(1);
                LandmarkSet::Absent
            }
        };

        let eye_metrics = self.classify(&landmarks, ear_threshold);
        let annotated = overlay::annotate(frame, &landmarks, &eye_metrics, ear_threshold);
        (annotated, eye_metrics)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::landmark::{eye_contour, Point2, ScriptedLandmarks};

    fn face(half_gap: f32) -> LandmarkSet {
        LandmarkSet::Present {
            left_eye: eye_contour(Point2::new(0.35, 0.4), 0.06, half_gap),
            right_eye: eye_contour(Point2::new(0.65, 0.4), 0.06, half_gap),
        }
    }

    fn frame() -> VideoFrame {
        VideoFrame::new(vec![0; 160 * 120 * 3], 160, 120, 0, 0)
    }

    #[test]
    fn test_open_eyes_score_above_closed_eyes() {
        let est = EyeStateEstimator::new();
        let open = est.classify(&face(0.025), 0.18);
        let shut = est.classify(&face(0.004), 0.18);

        assert!(!open.closed);
        assert!(shut.closed);
        assert!(open.score.unwrap() > shut.score.unwrap());
    }

    #[test]
    fn test_absent_face_counts_as_closed() {
        let est = EyeStateEstimator::new();
        let m = est.classify(&LandmarkSet::Absent, 0.18);
        assert!(m.closed);
        assert_eq!(m.score, None);
    }

    #[test]
    fn test_zero_threshold_never_closed() {
        let est = EyeStateEstimator::new();
        // Fully collapsed lids score exactly 0, which is not < 0.
        let m = est.classify(&face(0.0), 0.0);
        assert_eq!(m.score, Some(0.0));
        assert!(!m.closed);
    }

    #[test]
    fn test_classification_is_idempotent() {
        let est = EyeStateEstimator::new();
        let a = est.classify(&face(0.02), 0.18);
        let b = est.classify(&face(0.02), 0.18);
        assert_eq!(a, b);
    }

    #[test]
    fn test_degenerate_eye_width_scores_zero() {
        let eye = eye_contour(Point2::new(0.5, 0.5), 0.0, 0.05);
        assert_eq!(eye_aspect_ratio(&eye), 0.0);
    }

    #[test]
    fn test_capability_failure_degrades_to_absent() {
        let est = EyeStateEstimator::new();
        let script = ScriptedLandmarks::new(vec![]);
        script.push_failure("decoder crashed");

        let (annotated, m) = est.process(frame(), &script, 0.18);
        assert!(m.closed);
        assert_eq!(m.score, None);
        assert_eq!(annotated.width, 160);
        assert_eq!(annotated.height, 120);
    }

    #[test]
    fn test_process_keeps_frame_dimensions() {
        let est = EyeStateEstimator::new();
        let script = ScriptedLandmarks::new(vec![face(0.025)]);
        let (annotated, m) = est.process(frame(), &script, 0.18);

        assert!(!m.closed);
        assert_eq!(annotated.data.len(), 160 * 120 * 3);
    }
}
