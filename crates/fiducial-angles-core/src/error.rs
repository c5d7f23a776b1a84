//! Error taxonomy shared by the bearing pipeline and pose resolvers.
//!
//! Every failure is local to a single tag observation: callers drop the
//! offending tag and keep processing the rest of the frame.

/// A detector observation that cannot be processed.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum ObservationError {
    #[error("expected 4 corners, got {got}")]
    CornerCount { got: usize },
    #[error("tag id is missing")]
    MissingTagId,
    #[error("corner {index} has non-finite coordinates")]
    NonFiniteCorner { index: usize },
}

/// A camera calibration snapshot that cannot be used for inverse projection.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum CalibrationError {
    #[error("camera matrix has non-finite entries")]
    NonFiniteCameraMatrix,
    #[error("camera matrix last row must be [0, 0, s] with s != 0, got {row:?}")]
    MalformedCameraMatrix { row: [f64; 3] },
    #[error("camera matrix is singular (det={det:e})")]
    SingularCameraMatrix { det: f64 },
    #[error("unsupported distortion coefficient count {got} (expected 0, 4, 5, 8 or 12)")]
    DistortionCount { got: usize },
    #[error("distortion coefficient {index} is not finite")]
    NonFiniteDistortion { index: usize },
}

/// Failure reported by a [`crate::PoseResolver`].
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum PoseSolveError {
    #[error("tag size must be positive and finite, got {0}")]
    InvalidTagSize(f64),
    #[error("degenerate tag geometry: {0}")]
    DegenerateGeometry(&'static str),
    #[error("solver did not converge: {0}")]
    NotConverged(String),
    #[error(transparent)]
    Calibration(#[from] CalibrationError),
}

/// Errors returned while turning one tag detection into a [`crate::TagAngleObservation`].
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum TagAngleError {
    #[error("invalid observation: {0}")]
    InvalidObservation(#[from] ObservationError),
    #[error("invalid calibration: {0}")]
    InvalidCalibration(#[from] CalibrationError),
    #[error("corner {corner} maps to a ray with undefined direction")]
    DegenerateRay { corner: usize },
    #[error("pose solve failed: {0}")]
    PoseSolveFailure(#[from] PoseSolveError),
}
