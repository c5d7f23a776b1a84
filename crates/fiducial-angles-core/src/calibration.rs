use crate::{CalibrationError, DistortionCoefficients};
use nalgebra::{Matrix3, Point2, Vector3};
use serde::{Deserialize, Serialize};

const SINGULAR_EPS: f64 = 1e-12;
const LAST_ROW_TOL: f64 = 1e-9;

/// Intrinsic calibration snapshot of a single camera.
///
/// The snapshot is treated as immutable for the duration of a frame. It is
/// validated lazily: every geometric operation re-checks the intrinsic matrix
/// and fails with [`CalibrationError`] instead of producing garbage bearings.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CameraCalibration {
    /// Maps normalized camera rays to pixels. Serialized as three rows.
    #[serde(with = "matrix_rows")]
    pub camera_matrix: Matrix3<f64>,
    #[serde(default)]
    pub distortion_coefficients: DistortionCoefficients,
}

impl CameraCalibration {
    pub fn new(camera_matrix: Matrix3<f64>, distortion_coefficients: DistortionCoefficients) -> Self {
        Self {
            camera_matrix,
            distortion_coefficients,
        }
    }

    /// Ideal pinhole camera without skew or distortion.
    pub fn pinhole(fx: f64, fy: f64, cx: f64, cy: f64) -> Self {
        Self::new(
            Matrix3::new(
                fx, 0.0, cx, //
                0.0, fy, cy, //
                0.0, 0.0, 1.0,
            ),
            DistortionCoefficients::NONE,
        )
    }

    pub fn from_rows(rows: [[f64; 3]; 3], distortion: &[f64]) -> Result<Self, CalibrationError> {
        Ok(Self::new(
            matrix_rows::from_rows(rows),
            DistortionCoefficients::new(distortion)?,
        ))
    }

    pub fn with_distortion(mut self, distortion_coefficients: DistortionCoefficients) -> Self {
        self.distortion_coefficients = distortion_coefficients;
        self
    }

    /// Check that the intrinsic matrix can be used for inverse projection.
    pub fn validate(&self) -> Result<(), CalibrationError> {
        self.inverse_camera_matrix().map(|_| ())
    }

    /// `K` divided by its `(2, 2)` entry, so that the last row is `[0, 0, 1]`.
    ///
    /// Intrinsics are only defined up to scale; any last row `[0, 0, s]` with
    /// `s != 0` is accepted.
    pub fn normalized_camera_matrix(&self) -> Result<Matrix3<f64>, CalibrationError> {
        let k = &self.camera_matrix;
        if k.iter().any(|v| !v.is_finite()) {
            return Err(CalibrationError::NonFiniteCameraMatrix);
        }
        let row = [k[(2, 0)], k[(2, 1)], k[(2, 2)]];
        let s = row[2];
        if s.abs() < SINGULAR_EPS
            || row[0].abs() > LAST_ROW_TOL * s.abs()
            || row[1].abs() > LAST_ROW_TOL * s.abs()
        {
            return Err(CalibrationError::MalformedCameraMatrix { row });
        }
        Ok(k / s)
    }

    /// `K⁻¹` of the normalized matrix, after checking that `K` is finite,
    /// affine up to scale and non-singular.
    pub fn inverse_camera_matrix(&self) -> Result<Matrix3<f64>, CalibrationError> {
        let k = self.normalized_camera_matrix()?;
        let det = k.determinant();
        if det.abs() < SINGULAR_EPS {
            return Err(CalibrationError::SingularCameraMatrix { det });
        }
        k.try_inverse()
            .ok_or(CalibrationError::SingularCameraMatrix { det })
    }

    /// Project an ideal normalized point (`z = 1` plane) to pixels.
    #[inline]
    pub fn normalized_to_pixel(&self, p: Point2<f64>) -> Point2<f64> {
        let v = self.camera_matrix * Vector3::new(p.x, p.y, 1.0);
        Point2::new(v.x / v.z, v.y / v.z)
    }

    /// Project a camera-frame point through distortion and intrinsics.
    ///
    /// Returns `None` for points on or behind the image plane.
    pub fn project(&self, p_cam: &Vector3<f64>) -> Option<Point2<f64>> {
        if p_cam.z <= f64::EPSILON {
            return None;
        }
        let (xd, yd) = self
            .distortion_coefficients
            .distort(p_cam.x / p_cam.z, p_cam.y / p_cam.z);
        Some(self.normalized_to_pixel(Point2::new(xd, yd)))
    }
}

/// Row-major `[[f64; 3]; 3]` (de)serialization for `Matrix3<f64>`.
mod matrix_rows {
    use nalgebra::Matrix3;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub fn from_rows(rows: [[f64; 3]; 3]) -> Matrix3<f64> {
        Matrix3::from_fn(|r, c| rows[r][c])
    }

    pub fn serialize<S: Serializer>(m: &Matrix3<f64>, s: S) -> Result<S::Ok, S::Error> {
        let rows: [[f64; 3]; 3] = std::array::from_fn(|r| std::array::from_fn(|c| m[(r, c)]));
        rows.serialize(s)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Matrix3<f64>, D::Error> {
        let rows = <[[f64; 3]; 3]>::deserialize(d)?;
        Ok(from_rows(rows))
    }
}
