//! High-level facade for the `fiducial-angles-*` workspace.
//!
//! Given the four pixel corners of a detected square tag and the camera's
//! intrinsic calibration, this crate produces per-corner bearing angles
//! (azimuth, elevation) and a distance to the tag. Distance comes from the
//! lower-error of the two planar pose hypotheses.
//!
//! ## Quickstart
//!
//! ```
//! use fiducial_angles::core::{CameraCalibration, FiducialImageObservation};
//! use fiducial_angles::pose::SquareTargetPoseResolver;
//! use fiducial_angles::{CameraMatrixTagAngleCalculator, TagAngleCalculator};
//! use nalgebra::Point2;
//!
//! let calibration = CameraCalibration::pinhole(900.0, 900.0, 640.0, 360.0);
//! let calculator = CameraMatrixTagAngleCalculator::new(SquareTargetPoseResolver::new(0.1651));
//! let tag = FiducialImageObservation::new(
//!     7,
//!     [
//!         Point2::new(600.0, 320.0),
//!         Point2::new(680.0, 320.0),
//!         Point2::new(680.0, 400.0),
//!         Point2::new(600.0, 400.0),
//!     ],
//! );
//! let obs = calculator.calc_tag_angles(&tag, &calibration).unwrap();
//! assert_eq!(obs.tag_id, 7);
//! assert!(obs.distance > 0.0);
//! ```
//!
//! ## API map
//! - `fiducial_angles::core`: observations, calibration, undistortion, bearings.
//! - `fiducial_angles::pose`: IPPE pose solver for square tags.
//! - [`calculator`]: hypothesis selection and the [`TagAngleCalculator`] trait.
//! - [`frame`]: per-frame helpers (parallel with feature `rayon`).
//! - [`objdetect`]: bearings for object-detector bounding boxes.
//! - [`io`]: JSON config, frame input and report.

pub use fiducial_angles_core as core;
pub use fiducial_angles_pose as pose;

pub mod calculator;
pub mod frame;
pub mod io;
pub mod objdetect;

pub use calculator::{
    build_tag_angle_observation, select_hypothesis, CameraMatrixTagAngleCalculator,
    TagAngleCalculator,
};
pub use fiducial_angles_core::{
    CameraCalibration, FiducialImageObservation, TagAngleError, TagAngleObservation,
};
pub use frame::{calc_frame, calc_raw_frame, TagResult};
#[cfg(feature = "rayon")]
pub use frame::{calc_frame_par, calc_raw_frame_par};
pub use io::{FrameDetections, FrameReport, TagAnglesConfig, TagAnglesIoError, TagFailure};
