//! Pose solving for square fiducial tags.
//!
//! [`SquareTargetPoseResolver`] implements
//! [`fiducial_angles_core::PoseResolver`] with the IPPE method: a homography
//! from the tag plane to undistorted normalized coordinates is decomposed
//! into the two rotations that are locally consistent with it, each paired
//! with a least-squares translation and scored by pixel reprojection error.
//!
//! Both hypotheses are always returned; choosing between them is left to the
//! caller.

mod ippe;
mod square;

pub use square::SquareTargetPoseResolver;
