//! Landmark capability boundary and estimator implementations

use crate::DetectionError;
use media_frames::VideoFrame;
use ndarray::Array4;
use ort::session::builder::GraphOptimizationLevel;
use ort::session::Session;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::sync::Mutex;
use tracing::{error, info, warn};

/// Normalized 2D point, coordinates in [0, 1] relative to frame size
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point2 {
    pub x: f32,
    pub y: f32,
}

impl Point2 {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to another point
    pub fn distance(&self, other: &Point2) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }
}

/// Eye contour points, ordered: outer corner, two upper-lid points,
/// inner corner, two lower-lid points. Upper/lower pairs are
/// (index 1, index 5) and (index 2, index 4).
pub type EyeContour = [Point2; 6];

/// Landmarks for a single frame, or `Absent` when no face was found
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum LandmarkSet {
    Present {
        left_eye: EyeContour,
        right_eye: EyeContour,
    },
    Absent,
}

/// Build a symmetric eye contour around a center point.
///
/// `half_width` is half the corner-to-corner distance, `half_gap` half the
/// eyelid opening. Useful for mock output and synthetic test faces.
pub fn eye_contour(center: Point2, half_width: f32, half_gap: f32) -> EyeContour {
    [
        Point2::new(center.x - half_width, center.y),
        Point2::new(center.x - half_width * 0.4, center.y - half_gap),
        Point2::new(center.x + half_width * 0.4, center.y - half_gap),
        Point2::new(center.x + half_width, center.y),
        Point2::new(center.x + half_width * 0.4, center.y + half_gap),
        Point2::new(center.x - half_width * 0.4, center.y + half_gap),
    ]
}

/// External landmark capability: one synchronous call per video frame
pub trait LandmarkEstimator: Send {
    fn estimate(&self, frame: &VideoFrame) -> Result<LandmarkSet, DetectionError>;
}

/// Model input edge length
const INPUT_SIZE: u32 = 192;

/// Flat output length: 12 points, (x, y) each
const OUTPUT_LEN: usize = 24;

/// Landmark estimator backed by an ONNX eye-contour model
///
/// The model takes a 1x3x192x192 normalized RGB tensor and produces a flat
/// tensor of 24 floats: six left-eye points then six right-eye points, each
/// as normalized (x, y). Without a configured model path a fixed open-eye
/// mock is returned.
pub struct OnnxLandmarkEstimator {
    session: Option<Session>,
}

impl OnnxLandmarkEstimator {
    pub fn new(model_path: Option<&str>) -> Result<Self, DetectionError> {
        let session = if let Some(path) = model_path {
            info!("Loading landmark model from {}", path);
            match Session::builder() {
                Ok(builder) => {
                    match builder.with_optimization_level(GraphOptimizationLevel::Level3) {
                        Ok(builder) => match builder.commit_from_file(path) {
                            Ok(s) => Some(s),
                            Err(e) => {
                                error!("Failed to load landmark model: {}", e);
                                return Err(DetectionError::ModelLoad(e.to_string()));
                            }
                        },
                        Err(e) => {
                            error!("Failed to configure model optimization: {}", e);
                            return Err(DetectionError::ModelLoad(e.to_string()));
                        }
                    }
                }
                Err(e) => {
                    error!("Failed to create session builder: {}", e);
                    return Err(DetectionError::ModelLoad(e.to_string()));
                }
            }
        } else {
            warn!("No landmark model path configured. Using mock implementation.");
            None
        };

        Ok(Self { session })
    }

    fn preprocess(frame: &VideoFrame) -> Result<Array4<f32>, DetectionError> {
        let img = match image::ImageBuffer::<image::Rgb<u8>, _>::from_raw(
            frame.width,
            frame.height,
            frame.data.as_slice(),
        ) {
            Some(i) => i,
            None => {
                return Err(DetectionError::ImageProcessing(
                    "Failed to create image buffer".into(),
                ))
            }
        };

        let resized = image::imageops::resize(
            &img,
            INPUT_SIZE,
            INPUT_SIZE,
            image::imageops::FilterType::Triangle,
        );

        let mut input = Array4::<f32>::zeros((1, 3, INPUT_SIZE as usize, INPUT_SIZE as usize));
        for (x, y, pixel) in resized.enumerate_pixels() {
            input[[0, 0, y as usize, x as usize]] = pixel[0] as f32 / 255.0;
            input[[0, 1, y as usize, x as usize]] = pixel[1] as f32 / 255.0;
            input[[0, 2, y as usize, x as usize]] = pixel[2] as f32 / 255.0;
        }
        Ok(input)
    }

    fn decode(values: &[f32]) -> LandmarkSet {
        if values.len() < OUTPUT_LEN {
            return LandmarkSet::Absent;
        }

        // A collapsed output (all coordinates at the origin) is the model's
        // no-face sentinel.
        if values[..OUTPUT_LEN].iter().all(|v| v.abs() < f32::EPSILON) {
            return LandmarkSet::Absent;
        }

        let point = |i: usize| Point2::new(values[i * 2], values[i * 2 + 1]);
        LandmarkSet::Present {
            left_eye: [point(0), point(1), point(2), point(3), point(4), point(5)],
            right_eye: [point(6), point(7), point(8), point(9), point(10), point(11)],
        }
    }

    fn mock_landmarks() -> LandmarkSet {
        LandmarkSet::Present {
            left_eye: eye_contour(Point2::new(0.35, 0.4), 0.06, 0.025),
            right_eye: eye_contour(Point2::new(0.65, 0.4), 0.06, 0.025),
        }
    }
}

impl LandmarkEstimator for OnnxLandmarkEstimator {
    fn estimate(&self, frame: &VideoFrame) -> Result<LandmarkSet, DetectionError> {
        if let Some(session) = &self.session {
            let input = Self::preprocess(frame)?;

            let outputs = session
                .run(ort::inputs![input].map_err(|e| DetectionError::Inference(e.to_string()))?)
                .map_err(|e| DetectionError::Inference(e.to_string()))?;

            let tensor = outputs[0]
                .try_extract_tensor::<f32>()
                .map_err(|e| DetectionError::Inference(e.to_string()))?;
            let values: Vec<f32> = tensor.iter().copied().collect();

            Ok(Self::decode(&values))
        } else {
            Ok(Self::mock_landmarks())
        }
    }
}

/// Scripted landmark capability for tests: pops one prepared result per
/// call and yields `Absent` once the script runs out
pub struct ScriptedLandmarks {
    script: Mutex<VecDeque<Result<LandmarkSet, DetectionError>>>,
}

impl ScriptedLandmarks {
    pub fn new<I: IntoIterator<Item = LandmarkSet>>(script: I) -> Self {
        Self {
            script: Mutex::new(script.into_iter().map(Ok).collect()),
        }
    }

    /// Queue a capability failure as the next result
    pub fn push_failure(&self, message: &str) {
        self.script
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push_back(Err(DetectionError::Capability(message.to_string())));
    }
}

impl LandmarkEstimator for ScriptedLandmarks {
    fn estimate(&self, _frame: &VideoFrame) -> Result<LandmarkSet, DetectionError> {
        self.script
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .pop_front()
            .unwrap_or(Ok(LandmarkSet::Absent))
    }
}
