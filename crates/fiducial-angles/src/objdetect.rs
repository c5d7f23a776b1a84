//! Corner bearings for object-detector bounding boxes.
//!
//! Detector models run on a square, letterboxed copy of the camera frame. The
//! helpers here map their normalized boxes back to source pixels and then
//! reuse the tag bearing math for the box corners.

use fiducial_angles_core::{compute_bearings, CameraCalibration, ObjDetectObservation, TagAngleError};
use log::{debug, warn};
use nalgebra::Point2;
use serde::{Deserialize, Serialize};

/// Side length of the square model input, in pixels.
pub const DEFAULT_MODEL_SIZE: u32 = 640;

/// Axis-aligned box in source-image pixels, given by centre and size.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub cx: f64,
    pub cy: f64,
    pub width: f64,
    pub height: f64,
}

impl BoundingBox {
    pub fn new(cx: f64, cy: f64, width: f64, height: f64) -> Self {
        Self {
            cx,
            cy,
            width,
            height,
        }
    }

    /// Top-left, top-right, bottom-left, bottom-right.
    pub fn corners(&self) -> [Point2<f64>; 4] {
        let (hw, hh) = (self.width / 2.0, self.height / 2.0);
        [
            Point2::new(self.cx - hw, self.cy - hh),
            Point2::new(self.cx + hw, self.cy - hh),
            Point2::new(self.cx - hw, self.cy + hh),
            Point2::new(self.cx + hw, self.cy + hh),
        ]
    }
}

/// Mapping between a source frame and its letterboxed square model input.
///
/// The longer image side is scaled to the model size; the shorter side is
/// scaled by the same factor (rounded down) and centred between bars.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LetterboxTransform {
    image_width: u32,
    image_height: u32,
    model_size: u32,
    scaled: (u32, u32),
}

impl LetterboxTransform {
    /// `None` for empty images or when one side would collapse to zero pixels.
    pub fn new(image_width: u32, image_height: u32, model_size: u32) -> Option<Self> {
        if image_width == 0 || image_height == 0 || model_size == 0 {
            return None;
        }
        let (w, h, m) = (
            u64::from(image_width),
            u64::from(image_height),
            u64::from(model_size),
        );
        let (sw, sh) = if w >= h { (m, m * h / w) } else { (m * w / h, m) };
        if sw == 0 || sh == 0 {
            return None;
        }
        // both are bounded by model_size
        Some(Self {
            image_width,
            image_height,
            model_size,
            scaled: (sw as u32, sh as u32),
        })
    }

    /// Letterbox into the default 640 px model input.
    pub fn for_image(image_width: u32, image_height: u32) -> Option<Self> {
        Self::new(image_width, image_height, DEFAULT_MODEL_SIZE)
    }

    #[inline]
    pub fn model_size(&self) -> u32 {
        self.model_size
    }

    /// Size of the resized image inside the model input.
    #[inline]
    pub fn scaled_size(&self) -> (u32, u32) {
        self.scaled
    }

    /// Width of the left bar and height of the top bar.
    pub fn padding(&self) -> (u32, u32) {
        (
            (self.model_size - self.scaled.0) / 2,
            (self.model_size - self.scaled.1) / 2,
        )
    }

    /// Map a normalized model box `(cx, cy, w, h)` to source-image pixels.
    pub fn to_image(&self, coordinates: [f64; 4]) -> BoundingBox {
        let m = f64::from(self.model_size);
        let (sw, sh) = (f64::from(self.scaled.0), f64::from(self.scaled.1));
        let (px, py) = self.padding();
        let (iw, ih) = (f64::from(self.image_width), f64::from(self.image_height));
        let [cx, cy, w, h] = coordinates;
        BoundingBox::new(
            (cx * m - f64::from(px)) / sw * iw,
            (cy * m - f64::from(py)) / sh * ih,
            w * m / sw * iw,
            h * m / sh * ih,
        )
    }
}

/// Raw model output for one detection.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ModelPrediction {
    /// Normalized `(cx, cy, w, h)` in model-input space.
    pub coordinates: [f64; 4],
    /// One confidence per class.
    pub confidence: Vec<f64>,
}

/// Index and value of the highest confidence; the first maximum wins.
pub fn select_class(confidence: &[f64]) -> Option<(usize, f64)> {
    confidence
        .iter()
        .copied()
        .enumerate()
        .fold(None, |best, (i, c)| match best {
            Some((_, b)) if b >= c || c.is_nan() => best,
            _ => Some((i, c)),
        })
}

/// Bearings of the four box corners.
pub fn objdetect_observation(
    obj_class: usize,
    confidence: f64,
    bbox: &BoundingBox,
    calibration: &CameraCalibration,
) -> Result<ObjDetectObservation, TagAngleError> {
    let corner_pixels = bbox.corners();
    let corner_angles = compute_bearings(&corner_pixels, calibration)?;
    Ok(ObjDetectObservation {
        obj_class,
        confidence,
        corner_angles,
        corner_pixels,
    })
}

/// Convert a batch of model predictions. Predictions without class scores are
/// skipped; bearing failures stay local to their prediction.
pub fn objdetect_frame(
    letterbox: &LetterboxTransform,
    predictions: &[ModelPrediction],
    calibration: &CameraCalibration,
) -> Vec<Result<ObjDetectObservation, TagAngleError>> {
    predictions
        .iter()
        .filter_map(|pred| {
            let Some((class, confidence)) = select_class(&pred.confidence) else {
                debug!("skipping prediction without class scores");
                return None;
            };
            let bbox = letterbox.to_image(pred.coordinates);
            let res = objdetect_observation(class, confidence, &bbox, calibration);
            if let Err(err) = &res {
                warn!("dropping detection of class {class}: {err}");
            }
            Some(res)
        })
        .collect()
}
