//! Lens distortion in normalized image coordinates.
//!
//! Coefficients follow the OpenCV layout
//! `k1 k2 p1 p2 [k3 [k4 k5 k6 [s1 s2 s3 s4]]]`: radial (rational) terms,
//! tangential terms and thin-prism terms. Shorter vectors leave the trailing
//! coefficients at zero.

use crate::CalibrationError;
use serde::{Deserialize, Serialize};

/// Fixed-point iterations used by [`DistortionCoefficients::undistort`].
pub const UNDISTORT_ITERATIONS: usize = 5;

const MAX_COEFFS: usize = 12;
const SUPPORTED_LENGTHS: [usize; 5] = [0, 4, 5, 8, 12];

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<f64>", into = "Vec<f64>")]
pub struct DistortionCoefficients {
    k: [f64; MAX_COEFFS],
    len: usize,
}

impl DistortionCoefficients {
    /// No distortion at all.
    pub const NONE: DistortionCoefficients = DistortionCoefficients {
        k: [0.0; MAX_COEFFS],
        len: 0,
    };

    pub fn new(coeffs: &[f64]) -> Result<Self, CalibrationError> {
        if !SUPPORTED_LENGTHS.contains(&coeffs.len()) {
            return Err(CalibrationError::DistortionCount { got: coeffs.len() });
        }
        if let Some(index) = coeffs.iter().position(|c| !c.is_finite()) {
            return Err(CalibrationError::NonFiniteDistortion { index });
        }
        let mut k = [0.0; MAX_COEFFS];
        k[..coeffs.len()].copy_from_slice(coeffs);
        Ok(Self {
            k,
            len: coeffs.len(),
        })
    }

    /// Plumb-bob model (`k1 k2 p1 p2 k3`).
    pub fn brown_conrady(k1: f64, k2: f64, p1: f64, p2: f64, k3: f64) -> Self {
        let mut k = [0.0; MAX_COEFFS];
        k[..5].copy_from_slice(&[k1, k2, p1, p2, k3]);
        Self { k, len: 5 }
    }

    /// Coefficients as originally supplied.
    pub fn as_slice(&self) -> &[f64] {
        &self.k[..self.len]
    }

    #[inline]
    pub fn is_zero(&self) -> bool {
        self.k.iter().all(|&c| c == 0.0)
    }

    /// Apply the forward distortion model to an ideal normalized point.
    pub fn distort(&self, x: f64, y: f64) -> (f64, f64) {
        if self.is_zero() {
            return (x, y);
        }
        let k = &self.k;
        let r2 = x * x + y * y;
        let r4 = r2 * r2;
        let r6 = r4 * r2;

        let radial =
            (1.0 + k[0] * r2 + k[1] * r4 + k[4] * r6) / (1.0 + k[5] * r2 + k[6] * r4 + k[7] * r6);
        let xd = x * radial + 2.0 * k[2] * x * y + k[3] * (r2 + 2.0 * x * x) + k[8] * r2 + k[9] * r4;
        let yd =
            y * radial + k[2] * (r2 + 2.0 * y * y) + 2.0 * k[3] * x * y + k[10] * r2 + k[11] * r4;
        (xd, yd)
    }

    /// Invert the distortion model by fixed-point iteration.
    ///
    /// If the radial factor turns negative (far outside the calibrated field of
    /// view) the distorted point is returned as-is.
    pub fn undistort(&self, xd: f64, yd: f64) -> (f64, f64) {
        if self.is_zero() {
            return (xd, yd);
        }
        let k = &self.k;
        let (mut x, mut y) = (xd, yd);

        for _ in 0..UNDISTORT_ITERATIONS {
            let r2 = x * x + y * y;
            let icdist = (1.0 + ((k[7] * r2 + k[6]) * r2 + k[5]) * r2)
                / (1.0 + ((k[4] * r2 + k[1]) * r2 + k[0]) * r2);
            if icdist < 0.0 {
                return (xd, yd);
            }
            let dx = 2.0 * k[2] * x * y + k[3] * (r2 + 2.0 * x * x) + k[8] * r2 + k[9] * r2 * r2;
            let dy = k[2] * (r2 + 2.0 * y * y) + 2.0 * k[3] * x * y + k[10] * r2 + k[11] * r2 * r2;
            x = (xd - dx) * icdist;
            y = (yd - dy) * icdist;
        }
        (x, y)
    }
}

impl TryFrom<Vec<f64>> for DistortionCoefficients {
    type Error = CalibrationError;

    fn try_from(value: Vec<f64>) -> Result<Self, Self::Error> {
        Self::new(&value)
    }
}

impl From<DistortionCoefficients> for Vec<f64> {
    fn from(value: DistortionCoefficients) -> Self {
        value.as_slice().to_vec()
    }
}
