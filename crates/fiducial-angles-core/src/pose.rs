//! Pose-solving capability consumed by the tag angle pipeline.

use crate::{CameraCalibration, FiducialImageObservation, FiducialPoseObservation, PoseSolveError};
use std::sync::Arc;

/// Solves the pose of a square fiducial from its four image corners.
///
/// Implementations must be deterministic for identical inputs and must always
/// return both ambiguous hypotheses, with a lower error meaning better
/// agreement with the observed corners.
pub trait PoseResolver: Send + Sync {
    fn solve_fiducial_pose(
        &self,
        observation: &FiducialImageObservation,
        calibration: &CameraCalibration,
    ) -> Result<FiducialPoseObservation, PoseSolveError>;
}

impl<T: PoseResolver + ?Sized> PoseResolver for &T {
    fn solve_fiducial_pose(
        &self,
        observation: &FiducialImageObservation,
        calibration: &CameraCalibration,
    ) -> Result<FiducialPoseObservation, PoseSolveError> {
        (**self).solve_fiducial_pose(observation, calibration)
    }
}

impl<T: PoseResolver + ?Sized> PoseResolver for Box<T> {
    fn solve_fiducial_pose(
        &self,
        observation: &FiducialImageObservation,
        calibration: &CameraCalibration,
    ) -> Result<FiducialPoseObservation, PoseSolveError> {
        (**self).solve_fiducial_pose(observation, calibration)
    }
}

impl<T: PoseResolver + ?Sized> PoseResolver for Arc<T> {
    fn solve_fiducial_pose(
        &self,
        observation: &FiducialImageObservation,
        calibration: &CameraCalibration,
    ) -> Result<FiducialPoseObservation, PoseSolveError> {
        (**self).solve_fiducial_pose(observation, calibration)
    }
}
