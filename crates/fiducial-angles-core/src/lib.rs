//! Core types and geometry for turning fiducial tag corners into bearings.
//!
//! This crate is intentionally small and purely geometric. It does *not*
//! detect tags or solve poses itself; pose solving is a [`PoseResolver`]
//! capability implemented elsewhere (see `fiducial-angles-pose`).

mod bearing;
mod calibration;
mod distortion;
mod error;
mod homography;
mod logger;
mod observation;
mod pose;

pub use bearing::{
    compute_bearings, pixel_bearing, undistort_normalized, undistort_pixels, CornerAngles,
};
pub use calibration::CameraCalibration;
pub use distortion::{DistortionCoefficients, UNDISTORT_ITERATIONS};
pub use error::{CalibrationError, ObservationError, PoseSolveError, TagAngleError};
pub use homography::{homography_from_4pt, Homography};
pub use observation::{
    FiducialImageObservation, FiducialPoseObservation, ObjDetectObservation, PoseHypothesis,
    RawFiducialImageObservation, TagAngleObservation,
};
pub use pose::PoseResolver;

#[cfg(feature = "tracing")]
pub use logger::{init_tracing, init_tracing_with_level};

pub use logger::{init_from_env, init_with_level, LOG_ENV};
