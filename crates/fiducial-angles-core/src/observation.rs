use crate::{CornerAngles, ObservationError};
use nalgebra::{Isometry3, Point2};
use serde::{Deserialize, Serialize};

/// One detected tag: id plus its four corners in detector order.
///
/// The corner order must be consistent across frames; it defines which model
/// corner each pixel corresponds to during pose estimation.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(
    try_from = "RawFiducialImageObservation",
    into = "RawFiducialImageObservation"
)]
pub struct FiducialImageObservation {
    pub tag_id: u32,
    pub corners: [Point2<f64>; 4],
}

impl FiducialImageObservation {
    pub fn new(tag_id: u32, corners: [Point2<f64>; 4]) -> Self {
        Self { tag_id, corners }
    }

    /// Build from loosely typed detector output.
    pub fn from_raw(tag_id: Option<u32>, corners: &[[f64; 2]]) -> Result<Self, ObservationError> {
        let tag_id = tag_id.ok_or(ObservationError::MissingTagId)?;
        let corners: [[f64; 2]; 4] = corners
            .try_into()
            .map_err(|_| ObservationError::CornerCount { got: corners.len() })?;
        let obs = Self::new(tag_id, corners.map(|[x, y]| Point2::new(x, y)));
        obs.validate()?;
        Ok(obs)
    }

    /// Reject corners with NaN or infinite coordinates.
    pub fn validate(&self) -> Result<(), ObservationError> {
        match self
            .corners
            .iter()
            .position(|p| !p.x.is_finite() || !p.y.is_finite())
        {
            Some(index) => Err(ObservationError::NonFiniteCorner { index }),
            None => Ok(()),
        }
    }
}

/// Detector output as it appears on the wire, before validation.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RawFiducialImageObservation {
    #[serde(default)]
    pub tag_id: Option<u32>,
    #[serde(default)]
    pub corners: Vec<[f64; 2]>,
}

impl TryFrom<RawFiducialImageObservation> for FiducialImageObservation {
    type Error = ObservationError;

    fn try_from(raw: RawFiducialImageObservation) -> Result<Self, Self::Error> {
        Self::from_raw(raw.tag_id, &raw.corners)
    }
}

impl From<FiducialImageObservation> for RawFiducialImageObservation {
    fn from(obs: FiducialImageObservation) -> Self {
        Self {
            tag_id: Some(obs.tag_id),
            corners: obs.corners.iter().map(|p| [p.x, p.y]).collect(),
        }
    }
}

/// One candidate camera←tag transform and how well it explains the corners.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct PoseHypothesis {
    pub pose: Isometry3<f64>,
    /// Non-negative fit error; lower is better.
    pub error: f64,
}

impl PoseHypothesis {
    pub fn new(pose: Isometry3<f64>, error: f64) -> Self {
        Self { pose, error }
    }

    /// Euclidean norm of the translation component.
    #[inline]
    pub fn distance(&self) -> f64 {
        self.pose.translation.vector.norm()
    }
}

/// Both pose hypotheses for a planar square tag.
///
/// Two solutions are inherent to single-view planar pose; neither is dropped
/// here so that the selection policy stays auditable.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct FiducialPoseObservation {
    pub tag_id: u32,
    pub hypotheses: [PoseHypothesis; 2],
}

impl FiducialPoseObservation {
    pub fn new(tag_id: u32, first: PoseHypothesis, second: PoseHypothesis) -> Self {
        Self {
            tag_id,
            hypotheses: [first, second],
        }
    }

    /// Ratio of the smaller to the larger error, in `[0, 1]`.
    ///
    /// Values close to 1 mean the two hypotheses are equally plausible.
    pub fn ambiguity(&self) -> f64 {
        let [a, b] = self.hypotheses.map(|h| h.error);
        let hi = a.max(b);
        if hi <= 0.0 {
            1.0
        } else {
            a.min(b) / hi
        }
    }
}

/// Final per-tag output: corner bearings plus distance to the tag.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct TagAngleObservation {
    pub tag_id: u32,
    /// `(azimuth, elevation)` per corner, same order as the input corners.
    pub corners: CornerAngles,
    pub distance: f64,
}

impl TagAngleObservation {
    pub fn new(tag_id: u32, corners: CornerAngles, distance: f64) -> Self {
        Self {
            tag_id,
            corners,
            distance,
        }
    }
}

/// Object-detector box expressed as corner bearings.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ObjDetectObservation {
    pub obj_class: usize,
    pub confidence: f64,
    pub corner_angles: CornerAngles,
    /// Source-image pixels the angles were computed from.
    pub corner_pixels: [Point2<f64>; 4],
}
