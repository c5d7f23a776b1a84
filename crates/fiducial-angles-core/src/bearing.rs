//! Undistortion and per-corner bearing computation.
//!
//! A bearing is the pair `(atan(x), atan(y))` of the camera ray `(x, y, 1)`
//! through an ideal pixel: the angular offset from the optical axis along
//! each image axis.

use crate::{CalibrationError, CameraCalibration, TagAngleError};
use nalgebra::{Matrix3, Point2, Vector3};

/// `(azimuth, elevation)` in radians for each of the four corners, in input order.
pub type CornerAngles = [[f64; 2]; 4];

const MIN_RAY_Z: f64 = 1e-12;

/// Remove lens distortion, keeping the result in pixel units.
///
/// With all-zero distortion coefficients the input is returned unchanged.
pub fn undistort_pixels<const N: usize>(
    pixels: &[Point2<f64>; N],
    calibration: &CameraCalibration,
) -> Result<[Point2<f64>; N], CalibrationError> {
    let k_inv = calibration.inverse_camera_matrix()?;
    if calibration.distortion_coefficients.is_zero() {
        return Ok(*pixels);
    }
    Ok(pixels.map(|p| {
        let n = undistort_one(&k_inv, calibration, p);
        calibration.normalized_to_pixel(n)
    }))
}

/// Remove lens distortion and express the points on the normalized `z = 1` plane.
pub fn undistort_normalized<const N: usize>(
    pixels: &[Point2<f64>; N],
    calibration: &CameraCalibration,
) -> Result<[Point2<f64>; N], CalibrationError> {
    let k_inv = calibration.inverse_camera_matrix()?;
    Ok(pixels.map(|p| undistort_one(&k_inv, calibration, p)))
}

#[inline]
fn undistort_one(
    k_inv: &Matrix3<f64>,
    calibration: &CameraCalibration,
    p: Point2<f64>,
) -> Point2<f64> {
    // last row of K⁻¹ is [0, 0, 1]
    let v = k_inv * Vector3::new(p.x, p.y, 1.0);
    let (x, y) = calibration.distortion_coefficients.undistort(v.x, v.y);
    Point2::new(x, y)
}

/// Bearing of an ideal (distortion-free) pixel.
///
/// Returns `None` when the ray through the pixel has no defined direction.
#[inline]
pub fn pixel_bearing(k_inv: &Matrix3<f64>, pixel: &Point2<f64>) -> Option<[f64; 2]> {
    let ray = k_inv * Vector3::new(pixel.x, pixel.y, 1.0);
    if !ray.iter().all(|v| v.is_finite()) || ray.z.abs() < MIN_RAY_Z {
        return None;
    }
    Some([(ray.x / ray.z).atan(), (ray.y / ray.z).atan()])
}

/// Undistort the four corners and convert each to an `(azimuth, elevation)` pair.
pub fn compute_bearings(
    corners: &[Point2<f64>; 4],
    calibration: &CameraCalibration,
) -> Result<CornerAngles, TagAngleError> {
    let ideal = undistort_pixels(corners, calibration)?;
    let k_inv = calibration.inverse_camera_matrix()?;

    let mut angles = [[0.0; 2]; 4];
    for (corner, (slot, p)) in angles.iter_mut().zip(ideal.iter()).enumerate() {
        *slot = pixel_bearing(&k_inv, p).ok_or(TagAngleError::DegenerateRay { corner })?;
    }
    Ok(angles)
}
