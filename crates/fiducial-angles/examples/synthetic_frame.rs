//! Project a few tags through a distorted camera and print the frame report.
//!
//! ```text
//! cargo run -p fiducial-angles --example synthetic_frame
//! ```

use fiducial_angles::core::{
    init_with_level, CameraCalibration, DistortionCoefficients, FiducialImageObservation,
};
use fiducial_angles::pose::SquareTargetPoseResolver;
use fiducial_angles::{FrameDetections, FrameReport, TagAnglesConfig};
use log::{info, LevelFilter};
use nalgebra::{Isometry3, Translation3, UnitQuaternion};
use std::f64::consts::PI;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_with_level(LevelFilter::Debug)?;

    let calibration = CameraCalibration::pinhole(910.0, 905.0, 640.0, 360.0).with_distortion(
        DistortionCoefficients::brown_conrady(-0.09, 0.02, 0.0002, -0.0001, 0.0),
    );
    let cfg = TagAnglesConfig::new(calibration, 0.1651);
    let model = SquareTargetPoseResolver::new(cfg.tag_size_m).model_corners();

    let poses = [
        (1, 0.0, 0.0, [0.0, 0.0, 1.5]),
        (2, 0.4, -0.2, [0.6, -0.2, 3.0]),
        (3, -0.3, 0.5, [-0.8, 0.3, 4.2]),
    ];
    let mut frame = FrameDetections::default();
    for (id, roll, pitch, t) in poses {
        let pose = Isometry3::from_parts(
            Translation3::new(t[0], t[1], t[2]),
            UnitQuaternion::from_euler_angles(PI + roll, pitch, 0.0),
        );
        let mut corners = [nalgebra::Point2::origin(); 4];
        for (c, x) in corners.iter_mut().zip(model) {
            *c = cfg
                .calibration
                .project(&(pose * x).coords)
                .ok_or("tag behind camera")?;
        }
        info!("tag {id}: true distance {:.4}", pose.translation.vector.norm());
        frame
            .tags
            .push(FiducialImageObservation::new(id, corners).into());
    }

    let report = FrameReport::process(&cfg.build_calculator(), &frame, &cfg.calibration);
    println!("{}", report.to_json_pretty()?);
    Ok(())
}
