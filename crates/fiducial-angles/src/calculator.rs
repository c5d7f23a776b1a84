//! Tag angle calculation: corner bearings plus disambiguated distance.

use fiducial_angles_core::{
    compute_bearings, CameraCalibration, FiducialImageObservation, FiducialPoseObservation,
    PoseHypothesis, PoseResolver, TagAngleError, TagAngleObservation,
};
use log::debug;

#[cfg(feature = "tracing")]
use tracing::instrument;

/// Turns one tag detection into a [`TagAngleObservation`].
pub trait TagAngleCalculator: Send + Sync {
    fn calc_tag_angles(
        &self,
        observation: &FiducialImageObservation,
        calibration: &CameraCalibration,
    ) -> Result<TagAngleObservation, TagAngleError>;
}

/// Pick the hypothesis with the strictly smaller fit error.
///
/// Equal errors (and any comparison involving NaN) keep hypothesis 0, so the
/// choice is reproducible for identical solver output.
pub fn select_hypothesis(poses: &FiducialPoseObservation) -> (usize, &PoseHypothesis) {
    let [first, second] = &poses.hypotheses;
    if second.error < first.error {
        (1, second)
    } else {
        (0, first)
    }
}

/// Bearings from the intrinsic calibration, distance from the preferred pose.
///
/// Calibration and observation problems are reported before the resolver is
/// consulted. A resolver failure is propagated and no partial observation is
/// produced.
#[cfg_attr(
    feature = "tracing",
    instrument(level = "debug", skip_all, fields(tag_id = observation.tag_id))
)]
pub fn build_tag_angle_observation<R: PoseResolver + ?Sized>(
    observation: &FiducialImageObservation,
    calibration: &CameraCalibration,
    resolver: &R,
) -> Result<TagAngleObservation, TagAngleError> {
    observation.validate()?;
    let corners = compute_bearings(&observation.corners, calibration)?;
    let poses = resolver.solve_fiducial_pose(observation, calibration)?;

    let (index, selected) = select_hypothesis(&poses);
    let distance = selected.distance();
    debug!(
        "tag {}: hypothesis {} selected (errors {:.4e} / {:.4e}, ambiguity {:.3}), distance {:.4}",
        observation.tag_id,
        index,
        poses.hypotheses[0].error,
        poses.hypotheses[1].error,
        poses.ambiguity(),
        distance
    );

    Ok(TagAngleObservation::new(
        observation.tag_id,
        corners,
        distance,
    ))
}

/// Calculator built on the camera matrix and an injected pose resolver.
#[derive(Clone, Debug)]
pub struct CameraMatrixTagAngleCalculator<R> {
    resolver: R,
}

impl<R: PoseResolver> CameraMatrixTagAngleCalculator<R> {
    pub fn new(resolver: R) -> Self {
        Self { resolver }
    }

    #[inline]
    pub fn resolver(&self) -> &R {
        &self.resolver
    }
}

impl<R: PoseResolver> TagAngleCalculator for CameraMatrixTagAngleCalculator<R> {
    fn calc_tag_angles(
        &self,
        observation: &FiducialImageObservation,
        calibration: &CameraCalibration,
    ) -> Result<TagAngleObservation, TagAngleError> {
        build_tag_angle_observation(observation, calibration, &self.resolver)
    }
}
