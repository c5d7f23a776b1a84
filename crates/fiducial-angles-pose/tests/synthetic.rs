use approx::assert_abs_diff_eq;
use fiducial_angles_core::{
    CalibrationError, CameraCalibration, DistortionCoefficients, FiducialImageObservation,
    PoseResolver, PoseSolveError,
};
use fiducial_angles_pose::SquareTargetPoseResolver;
use nalgebra::{Isometry3, Matrix3, Point2, Translation3, UnitQuaternion};
use std::f64::consts::PI;

const TAG_SIZE: f64 = 0.1651;

fn camera() -> CameraCalibration {
    CameraCalibration::pinhole(910.0, 905.0, 640.0, 360.0)
}

fn observe(
    resolver: &SquareTargetPoseResolver,
    cal: &CameraCalibration,
    pose: &Isometry3<f64>,
) -> FiducialImageObservation {
    let corners = resolver
        .model_corners()
        .map(|x| cal.project(&(pose * x).coords).expect("tag in front of camera"));
    FiducialImageObservation::new(5, corners)
}

fn tilted_pose(roll: f64, pitch: f64, t: [f64; 3]) -> Isometry3<f64> {
    Isometry3::from_parts(
        Translation3::new(t[0], t[1], t[2]),
        UnitQuaternion::from_euler_angles(PI + roll, pitch, 0.05),
    )
}

#[test]
fn recovers_oblique_pose_as_best_hypothesis() {
    let cal = camera();
    let resolver = SquareTargetPoseResolver::new(TAG_SIZE);
    let truth = tilted_pose(0.35, -0.4, [0.2, -0.12, 2.3]);
    let obs = observe(&resolver, &cal, &truth);

    let res = resolver.solve_fiducial_pose(&obs, &cal).expect("solve");
    assert_eq!(res.tag_id, 5);

    let best = res.hypotheses[0];
    assert!(best.error < 1e-6, "best error {}", best.error);
    assert_abs_diff_eq!(
        best.distance(),
        truth.translation.vector.norm(),
        epsilon = 1e-6
    );
    assert!(best.pose.rotation.angle_to(&truth.rotation) < 1e-6);

    // the mirrored solution is kept and scores worse
    let other = res.hypotheses[1];
    assert!(other.error >= best.error);
    assert!(other.error.is_finite());
}

#[test]
fn hypotheses_are_ordered_by_error() {
    let cal = camera();
    let resolver = SquareTargetPoseResolver::new(TAG_SIZE);
    for (roll, pitch) in [(0.0, 0.0), (0.1, 0.05), (-0.5, 0.3), (0.6, 0.6)] {
        let obs = observe(&resolver, &cal, &tilted_pose(roll, pitch, [-0.1, 0.05, 1.8]));
        let res = resolver.solve_fiducial_pose(&obs, &cal).expect("solve");
        assert!(res.hypotheses[0].error <= res.hypotheses[1].error);
        assert!(res.hypotheses.iter().all(|h| h.error >= 0.0));
    }
}

#[test]
fn frontal_tag_is_fully_ambiguous() {
    let cal = camera();
    let resolver = SquareTargetPoseResolver::new(TAG_SIZE);
    let truth = tilted_pose(0.0, 0.0, [0.0, 0.0, 1.2]);
    let obs = observe(&resolver, &cal, &truth);

    let res = resolver.solve_fiducial_pose(&obs, &cal).expect("solve");
    for h in res.hypotheses {
        assert_abs_diff_eq!(h.distance(), 1.2, epsilon = 1e-6);
        assert!(h.error < 1e-6);
    }
}

#[test]
fn distorted_corners_are_undistorted_before_solving() {
    let dist = DistortionCoefficients::brown_conrady(-0.1, 0.02, 0.0004, -0.0002, 0.0);
    let cal = camera().with_distortion(dist);
    let resolver = SquareTargetPoseResolver::new(TAG_SIZE);
    let truth = tilted_pose(0.25, 0.2, [0.3, 0.15, 1.9]);
    let obs = observe(&resolver, &cal, &truth);

    let res = resolver.solve_fiducial_pose(&obs, &cal).expect("solve");
    assert_abs_diff_eq!(
        res.hypotheses[0].distance(),
        truth.translation.vector.norm(),
        epsilon = 1e-4
    );
    assert!(res.hypotheses[0].error < 1e-3);
}

#[test]
fn solve_is_deterministic() {
    let cal = camera();
    let resolver = SquareTargetPoseResolver::new(TAG_SIZE);
    let obs = observe(&resolver, &cal, &tilted_pose(0.3, 0.1, [0.0, 0.1, 3.0]));
    let a = resolver.solve_fiducial_pose(&obs, &cal).expect("solve");
    let b = resolver.solve_fiducial_pose(&obs, &cal).expect("solve");
    assert_eq!(a, b);
}

#[test]
fn collapsed_corners_are_degenerate() {
    let cal = camera();
    let resolver = SquareTargetPoseResolver::new(TAG_SIZE);
    let obs = FiducialImageObservation::new(9, [Point2::new(640.0, 360.0); 4]);
    let err = resolver.solve_fiducial_pose(&obs, &cal).unwrap_err();
    assert!(matches!(err, PoseSolveError::DegenerateGeometry(_)));
}

#[test]
fn singular_calibration_is_reported() {
    let cal = CameraCalibration::new(
        Matrix3::new(0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 1.0),
        DistortionCoefficients::NONE,
    );
    let resolver = SquareTargetPoseResolver::new(TAG_SIZE);
    let obs = FiducialImageObservation::new(
        1,
        [
            Point2::new(0.0, 0.0),
            Point2::new(1.0, 0.0),
            Point2::new(1.0, 1.0),
            Point2::new(0.0, 1.0),
        ],
    );
    let err = resolver.solve_fiducial_pose(&obs, &cal).unwrap_err();
    assert!(matches!(
        err,
        PoseSolveError::Calibration(CalibrationError::SingularCameraMatrix { .. })
    ));
}
