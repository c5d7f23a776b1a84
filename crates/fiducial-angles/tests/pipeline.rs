use approx::assert_abs_diff_eq;
use fiducial_angles::core::{
    CalibrationError, CameraCalibration, DistortionCoefficients, FiducialImageObservation,
    RawFiducialImageObservation,
};
use fiducial_angles::pose::SquareTargetPoseResolver;
use fiducial_angles::{
    calc_frame, CameraMatrixTagAngleCalculator, FrameDetections, FrameReport, TagAngleCalculator,
    TagAngleError, TagAnglesConfig,
};
use nalgebra::{Isometry3, Point3, Translation3, UnitQuaternion};
use std::f64::consts::PI;

const TAG_SIZE: f64 = 0.1651;

fn camera() -> CameraCalibration {
    CameraCalibration::pinhole(910.0, 905.0, 640.0, 360.0)
}

fn tag_pose(roll: f64, pitch: f64, t: [f64; 3]) -> Isometry3<f64> {
    Isometry3::from_parts(
        Translation3::new(t[0], t[1], t[2]),
        UnitQuaternion::from_euler_angles(PI + roll, pitch, 0.0),
    )
}

fn camera_points(pose: &Isometry3<f64>) -> [Point3<f64>; 4] {
    SquareTargetPoseResolver::new(TAG_SIZE)
        .model_corners()
        .map(|x| pose * x)
}

fn observe(tag_id: u32, cal: &CameraCalibration, pose: &Isometry3<f64>) -> FiducialImageObservation {
    let corners = camera_points(pose).map(|p| cal.project(&p.coords).expect("in front of camera"));
    FiducialImageObservation::new(tag_id, corners)
}

#[test]
fn angles_and_distance_match_ground_truth() {
    let cal = camera();
    let calc = CameraMatrixTagAngleCalculator::new(SquareTargetPoseResolver::new(TAG_SIZE));
    let truth = tag_pose(0.3, -0.25, [0.4, -0.1, 2.6]);

    let obs = calc
        .calc_tag_angles(&observe(11, &cal, &truth), &cal)
        .expect("tag angles");

    assert_eq!(obs.tag_id, 11);
    assert_abs_diff_eq!(obs.distance, truth.translation.vector.norm(), epsilon = 1e-6);
    for (angles, p) in obs.corners.iter().zip(camera_points(&truth)) {
        assert_abs_diff_eq!(angles[0], (p.x / p.z).atan(), epsilon = 1e-9);
        assert_abs_diff_eq!(angles[1], (p.y / p.z).atan(), epsilon = 1e-9);
    }
}

#[test]
fn lens_distortion_is_removed_before_bearings() {
    let dist = DistortionCoefficients::brown_conrady(-0.08, 0.015, 0.0003, -0.0002, 0.0);
    let cal = camera().with_distortion(dist);
    let calc = CameraMatrixTagAngleCalculator::new(SquareTargetPoseResolver::new(TAG_SIZE));
    let truth = tag_pose(-0.2, 0.35, [-0.3, 0.2, 1.8]);

    let obs = calc
        .calc_tag_angles(&observe(4, &cal, &truth), &cal)
        .expect("tag angles");

    assert_abs_diff_eq!(obs.distance, truth.translation.vector.norm(), epsilon = 1e-4);
    for (angles, p) in obs.corners.iter().zip(camera_points(&truth)) {
        assert_abs_diff_eq!(angles[0], (p.x / p.z).atan(), epsilon = 1e-5);
        assert_abs_diff_eq!(angles[1], (p.y / p.z).atan(), epsilon = 1e-5);
    }
}

#[test]
fn frame_isolates_bad_tags() {
    let cal = camera();
    let calc = CameraMatrixTagAngleCalculator::new(SquareTargetPoseResolver::new(TAG_SIZE));
    let good = observe(1, &cal, &tag_pose(0.1, 0.1, [0.0, 0.0, 2.0]));
    let mut collapsed = good;
    collapsed.tag_id = 2;
    collapsed.corners = [good.corners[0]; 4];

    let res = calc_frame(&calc, &[good, collapsed, good], &cal);
    assert_eq!(res.len(), 3);
    assert!(res[0].is_ok());
    assert!(matches!(res[1], Err(TagAngleError::PoseSolveFailure(_))));
    assert_eq!(res[0], res[2]);
}

#[test]
fn singular_calibration_yields_no_observations() {
    let good = observe(1, &camera(), &tag_pose(0.0, 0.2, [0.1, 0.0, 1.5]));
    let cal = CameraCalibration::from_rows(
        [[900.0, 0.0, 640.0], [900.0, 0.0, 640.0], [0.0, 0.0, 1.0]],
        &[],
    )
    .expect("well-formed rows");
    let calc = CameraMatrixTagAngleCalculator::new(SquareTargetPoseResolver::new(TAG_SIZE));
    let err = calc.calc_tag_angles(&good, &cal).unwrap_err();
    assert!(matches!(
        err,
        TagAngleError::InvalidCalibration(CalibrationError::SingularCameraMatrix { .. })
    ));
}

#[test]
fn report_from_config_and_raw_detections() {
    let cfg = TagAnglesConfig::new(camera(), TAG_SIZE);
    let tag = observe(7, &cfg.calibration, &tag_pose(0.2, 0.0, [0.0, 0.1, 3.0]));
    let frame = FrameDetections {
        timestamp: Some(12.25),
        tags: vec![
            RawFiducialImageObservation::from(tag),
            RawFiducialImageObservation {
                tag_id: Some(8),
                corners: vec![[1.0, 1.0]; 3],
            },
        ],
    };

    let report = FrameReport::process(&cfg.build_calculator(), &frame, &cfg.calibration);
    assert_eq!(report.timestamp, Some(12.25));
    assert_eq!(report.observations.len(), 1);
    assert_eq!(report.observations[0].tag_id, 7);
    assert_abs_diff_eq!(report.observations[0].distance, 3.0_f64.hypot(0.1), epsilon = 1e-6);
    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].tag_id, Some(8));
    assert!(report.failures[0].error.contains("expected 4 corners"));
}
