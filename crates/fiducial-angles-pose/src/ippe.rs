//! Infinitesimal plane-based pose estimation (Collins & Bartoli, 2014).
//!
//! Given the homography from a centred model plane to normalized image
//! coordinates, the local first-order behaviour at the model origin admits
//! exactly two rotations. Each rotation then fixes the translation by linear
//! least squares.

use nalgebra::{Matrix2, Matrix2x3, Matrix3, Point2, Point3, Rotation3, Vector2, Vector3};

/// Rotation taking the optical axis `(0, 0, 1)` onto the ray `(v.x, v.y, 1)`.
fn rotate_axis_to(v: &Vector2<f64>) -> Matrix3<f64> {
    let t = v.norm();
    if t < 1e-12 {
        return Matrix3::identity();
    }
    let s = (t * t + 1.0).sqrt();
    let (cos, sin) = (1.0 / s, t / s);
    let k = Matrix3::new(
        0.0, 0.0, v.x, //
        0.0, 0.0, v.y, //
        -v.x, -v.y, 0.0,
    ) / t;
    Matrix3::identity() + k * sin + k * k * (1.0 - cos)
}

/// Both IPPE rotations for image point `v` of the model origin and
/// homography Jacobian `j` at that point.
///
/// Returns `None` when the Jacobian has (numerically) zero scale.
pub(crate) fn ippe_rotations(
    v: &Vector2<f64>,
    j: &Matrix2<f64>,
) -> Option<(Rotation3<f64>, Rotation3<f64>)> {
    let rv = rotate_axis_to(v);

    let proj = Matrix2x3::new(
        1.0, 0.0, -v.x, //
        0.0, 1.0, -v.y,
    );
    let b: Matrix2<f64> = proj * rv.fixed_view::<3, 2>(0, 0);
    let a = b.try_inverse()? * j;

    // largest singular value of A, closed form for 2x2
    let ata = a.transpose() * a;
    let disc = ((ata[(0, 0)] - ata[(1, 1)]).powi(2) + 4.0 * ata[(0, 1)] * ata[(0, 1)]).sqrt();
    let gamma = (0.5 * (ata[(0, 0)] + ata[(1, 1)] + disc)).sqrt();
    if !gamma.is_finite() || gamma < f64::from(f32::EPSILON) {
        return None;
    }

    let r22 = a / gamma;
    let h = Matrix2::identity() - r22.transpose() * r22;
    let b0 = h[(0, 0)].max(0.0).sqrt();
    let mut b1 = h[(1, 1)].max(0.0).sqrt();
    if h[(0, 1)] < 0.0 {
        b1 = -b1;
    }

    let c0 = Vector3::new(r22[(0, 0)], r22[(1, 0)], b0);
    let c1 = Vector3::new(r22[(0, 1)], r22[(1, 1)], b1);
    let d = c0.cross(&c1);

    let m1 = Matrix3::new(
        r22[(0, 0)], r22[(0, 1)], d.x, //
        r22[(1, 0)], r22[(1, 1)], d.y, //
        b0, b1, d.z,
    );
    let m2 = Matrix3::new(
        r22[(0, 0)], r22[(0, 1)], -d.x, //
        r22[(1, 0)], r22[(1, 1)], -d.y, //
        -b0, -b1, d.z,
    );

    Some((
        Rotation3::from_matrix(&(rv * m1)),
        Rotation3::from_matrix(&(rv * m2)),
    ))
}

/// Least-squares translation for a known rotation.
///
/// Minimizes the algebraic error `u * Pz - Px`, `v * Pz - Py` with
/// `P = R * X + t` over all correspondences.
pub(crate) fn estimate_translation(
    rotation: &Rotation3<f64>,
    model: &[Point3<f64>],
    normalized: &[Point2<f64>],
) -> Option<Vector3<f64>> {
    let mut m = Matrix3::zeros();
    let mut rhs = Vector3::zeros();
    for (x, p) in model.iter().zip(normalized) {
        let a = Matrix2x3::new(
            -1.0, 0.0, p.x, //
            0.0, -1.0, p.y,
        );
        let ata = a.transpose() * a;
        m += ata;
        rhs -= ata * (rotation * x.coords);
    }
    let t = m.try_inverse()? * rhs;
    t.iter().all(|v| v.is_finite()).then_some(t)
}
