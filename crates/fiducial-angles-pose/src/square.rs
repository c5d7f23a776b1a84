use crate::ippe::{estimate_translation, ippe_rotations};
use fiducial_angles_core::{
    homography_from_4pt, undistort_normalized, CameraCalibration, FiducialImageObservation,
    FiducialPoseObservation, PoseHypothesis, PoseResolver, PoseSolveError,
};
use log::debug;
use nalgebra::{Isometry3, Point2, Point3, Rotation3, Translation3, UnitQuaternion};

#[cfg(feature = "tracing")]
use tracing::instrument;

/// IPPE solver for a square tag of known side length.
///
/// Model corners lie on `z = 0`, centred on the tag:
/// `(-s/2, s/2)`, `(s/2, s/2)`, `(s/2, -s/2)`, `(-s/2, -s/2)`. Detector corners
/// must be supplied in that order. The fit error of each hypothesis is the RMS
/// reprojection error in pixels (lens distortion applied); hypotheses are
/// returned best first.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SquareTargetPoseResolver {
    tag_size: f64,
}

impl SquareTargetPoseResolver {
    /// `tag_size` is the side length of the square, in the unit the
    /// translation (and therefore the distance) should be reported in.
    pub fn new(tag_size: f64) -> Self {
        Self { tag_size }
    }

    #[inline]
    pub fn tag_size(&self) -> f64 {
        self.tag_size
    }

    pub fn model_corners(&self) -> [Point3<f64>; 4] {
        let h = self.tag_size / 2.0;
        [
            Point3::new(-h, h, 0.0),
            Point3::new(h, h, 0.0),
            Point3::new(h, -h, 0.0),
            Point3::new(-h, -h, 0.0),
        ]
    }

    fn hypothesis(
        &self,
        rotation: Rotation3<f64>,
        model: &[Point3<f64>; 4],
        normalized: &[Point2<f64>; 4],
        observed: &[Point2<f64>; 4],
        calibration: &CameraCalibration,
    ) -> Result<PoseHypothesis, PoseSolveError> {
        let t = estimate_translation(&rotation, model, normalized)
            .ok_or(PoseSolveError::DegenerateGeometry("translation is unconstrained"))?;
        let pose = Isometry3::from_parts(
            Translation3::from(t),
            UnitQuaternion::from_rotation_matrix(&rotation),
        );
        let error = reprojection_rms(&pose, model, observed, calibration);
        Ok(PoseHypothesis::new(pose, error))
    }
}

impl PoseResolver for SquareTargetPoseResolver {
    #[cfg_attr(
        feature = "tracing",
        instrument(level = "debug", skip(self, observation, calibration), fields(tag_id = observation.tag_id))
    )]
    fn solve_fiducial_pose(
        &self,
        observation: &FiducialImageObservation,
        calibration: &CameraCalibration,
    ) -> Result<FiducialPoseObservation, PoseSolveError> {
        if !self.tag_size.is_finite() || self.tag_size <= 0.0 {
            return Err(PoseSolveError::InvalidTagSize(self.tag_size));
        }

        let normalized = undistort_normalized(&observation.corners, calibration)?;
        let model = self.model_corners();
        let model_plane = model.map(|p| Point2::new(p.x, p.y));

        let h = homography_from_4pt(&model_plane, &normalized).ok_or(
            PoseSolveError::DegenerateGeometry("corners do not span a quadrilateral"),
        )?;
        let centre = Point2::origin();
        let (r1, r2) = ippe_rotations(&h.apply(centre).coords, &h.jacobian_at(centre)).ok_or(
            PoseSolveError::DegenerateGeometry("homography has zero scale at the tag centre"),
        )?;

        let first = self.hypothesis(r1, &model, &normalized, &observation.corners, calibration)?;
        let second = self.hypothesis(r2, &model, &normalized, &observation.corners, calibration)?;
        let (first, second) = if second.error < first.error {
            (second, first)
        } else {
            (first, second)
        };
        if !first.error.is_finite() {
            return Err(PoseSolveError::DegenerateGeometry(
                "tag projects behind the camera",
            ));
        }

        debug!(
            "tag {}: pose errors {:.4} / {:.4} px, distances {:.4} / {:.4}",
            observation.tag_id,
            first.error,
            second.error,
            first.distance(),
            second.distance()
        );

        Ok(FiducialPoseObservation::new(
            observation.tag_id,
            first,
            second,
        ))
    }
}

/// RMS pixel distance between projected model corners and observed corners,
/// normalized per coordinate. Infinite if any corner projects behind the camera.
pub(crate) fn reprojection_rms(
    pose: &Isometry3<f64>,
    model: &[Point3<f64>; 4],
    observed: &[Point2<f64>; 4],
    calibration: &CameraCalibration,
) -> f64 {
    let mut sum_sq = 0.0;
    for (x, obs) in model.iter().zip(observed) {
        let Some(px) = calibration.project(&(pose * x).coords) else {
            return f64::INFINITY;
        };
        sum_sq += (px - obs).norm_squared();
    }
    (sum_sq / (2.0 * model.len() as f64)).sqrt()
}
