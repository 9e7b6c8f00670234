//! Operator feedback overlay
//!
//! Draws eye contours, an openness meter, and a face-lost border onto the
//! returned frame. Display only: nothing here feeds back into detection.

use crate::estimator::EyeMetrics;
use crate::landmark::{EyeContour, LandmarkSet};
use image::{ImageBuffer, Rgb};
use imageproc::drawing::{draw_filled_rect_mut, draw_hollow_rect_mut, draw_line_segment_mut};
use imageproc::rect::Rect;
use media_frames::VideoFrame;

const CONTOUR: Rgb<u8> = Rgb([0, 220, 80]);
const METER_FILL_OPEN: Rgb<u8> = Rgb([0, 220, 80]);
const METER_FILL_CLOSED: Rgb<u8> = Rgb([230, 40, 40]);
const METER_BACK: Rgb<u8> = Rgb([40, 40, 40]);
const METER_TICK: Rgb<u8> = Rgb([255, 255, 255]);
const LOST_BORDER: Rgb<u8> = Rgb([230, 40, 40]);

/// Full-scale EAR for the meter; open eyes sit around 0.3
const METER_FULL_SCALE: f32 = 0.5;

const METER_X: i32 = 8;
const METER_Y: i32 = 8;
const METER_W: u32 = 120;
const METER_H: u32 = 8;

type Canvas = ImageBuffer<Rgb<u8>, Vec<u8>>;

/// Draw the feedback overlay and return the annotated frame.
///
/// Frames whose buffer does not match their dimensions are returned
/// untouched; annotation never fails a frame.
pub(crate) fn annotate(
    mut frame: VideoFrame,
    landmarks: &LandmarkSet,
    metrics: &EyeMetrics,
    ear_threshold: f32,
) -> VideoFrame {
    if frame.validate().is_err() {
        return frame;
    }

    let data = std::mem::take(&mut frame.data);
    let mut canvas = match Canvas::from_raw(frame.width, frame.height, data) {
        Some(canvas) => canvas,
        // Buffer length was validated above; not reached.
        None => return frame,
    };

    match landmarks {
        LandmarkSet::Present { left_eye, right_eye } => {
            draw_eye(&mut canvas, left_eye);
            draw_eye(&mut canvas, right_eye);
        }
        LandmarkSet::Absent => draw_lost_border(&mut canvas),
    }
    draw_meter(&mut canvas, metrics, ear_threshold);

    frame.data = canvas.into_raw();
    frame
}

/// Closed polyline through the six contour points
fn draw_eye(canvas: &mut Canvas, eye: &EyeContour) {
    let w = canvas.width() as f32;
    let h = canvas.height() as f32;
    for i in 0..eye.len() {
        let a = eye[i];
        let b = eye[(i + 1) % eye.len()];
        draw_line_segment_mut(canvas, (a.x * w, a.y * h), (b.x * w, b.y * h), CONTOUR);
    }
}

/// Openness meter: filled bar proportional to the score, with a tick at
/// the classification threshold
fn draw_meter(canvas: &mut Canvas, metrics: &EyeMetrics, ear_threshold: f32) {
    if canvas.width() < (METER_X as u32 + METER_W + 8) || canvas.height() < 32 {
        return;
    }

    draw_filled_rect_mut(
        canvas,
        Rect::at(METER_X, METER_Y).of_size(METER_W, METER_H),
        METER_BACK,
    );

    if let Some(score) = metrics.score {
        let frac = (score / METER_FULL_SCALE).clamp(0.0, 1.0);
        let fill = (frac * METER_W as f32) as u32;
        if fill > 0 {
            let color = if metrics.closed {
                METER_FILL_CLOSED
            } else {
                METER_FILL_OPEN
            };
            draw_filled_rect_mut(
                canvas,
                Rect::at(METER_X, METER_Y).of_size(fill, METER_H),
                color,
            );
        }
    }

    let tick = ((ear_threshold / METER_FULL_SCALE).clamp(0.0, 1.0) * METER_W as f32) as i32;
    draw_line_segment_mut(
        canvas,
        ((METER_X + tick) as f32, (METER_Y - 2) as f32),
        ((METER_X + tick) as f32, (METER_Y + METER_H as i32 + 2) as f32),
        METER_TICK,
    );
}

/// Three nested hollow rectangles along the frame edge
fn draw_lost_border(canvas: &mut Canvas) {
    let (w, h) = (canvas.width(), canvas.height());
    for inset in 0..3u32 {
        if w <= inset * 2 + 1 || h <= inset * 2 + 1 {
            break;
        }
        draw_hollow_rect_mut(
            canvas,
            Rect::at(inset as i32, inset as i32).of_size(w - inset * 2, h - inset * 2),
            LOST_BORDER,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::landmark::{eye_contour, Point2};

    fn frame() -> VideoFrame {
        VideoFrame::new(vec![0; 160 * 120 * 3], 160, 120, 7, 3)
    }

    fn present() -> LandmarkSet {
        LandmarkSet::Present {
            left_eye: eye_contour(Point2::new(0.35, 0.4), 0.06, 0.02),
            right_eye: eye_contour(Point2::new(0.65, 0.4), 0.06, 0.02),
        }
    }

    #[test]
    fn test_annotation_preserves_shape_and_metadata() {
        let metrics = EyeMetrics {
            score: Some(0.3),
            closed: false,
        };
        let out = annotate(frame(), &present(), &metrics, 0.18);
        assert_eq!(out.width, 160);
        assert_eq!(out.height, 120);
        assert_eq!(out.data.len(), 160 * 120 * 3);
        assert_eq!(out.timestamp_ns, 7);
        assert_eq!(out.sequence, 3);
    }

    #[test]
    fn test_absent_face_paints_border() {
        let metrics = EyeMetrics {
            score: None,
            closed: true,
        };
        let out = annotate(frame(), &LandmarkSet::Absent, &metrics, 0.18);
        assert_eq!(out.get_pixel(0, 0), Some([230, 40, 40]));
        assert_eq!(out.get_pixel(159, 119), Some([230, 40, 40]));
    }

    #[test]
    fn test_present_face_has_no_border() {
        let metrics = EyeMetrics {
            score: Some(0.3),
            closed: false,
        };
        let out = annotate(frame(), &present(), &metrics, 0.18);
        assert_eq!(out.get_pixel(0, 0), Some([0, 0, 0]));
    }

    #[test]
    fn test_malformed_frame_passes_through() {
        let bad = VideoFrame::new(vec![0; 10], 160, 120, 0, 0);
        let metrics = EyeMetrics {
            score: None,
            closed: true,
        };
        let out = annotate(bad, &LandmarkSet::Absent, &metrics, 0.18);
        assert_eq!(out.data.len(), 10);
    }

    #[test]
    fn test_tiny_frame_skips_meter() {
        let tiny = VideoFrame::new(vec![0; 8 * 8 * 3], 8, 8, 0, 0);
        let metrics = EyeMetrics {
            score: Some(0.3),
            closed: false,
        };
        let out = annotate(tiny, &present(), &metrics, 0.18);
        assert_eq!(out.data.len(), 8 * 8 * 3);
    }
}
