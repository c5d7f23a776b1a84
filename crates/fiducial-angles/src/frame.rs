//! Per-frame helpers: every tag against one calibration snapshot.
//!
//! A failing tag yields an `Err` in its slot and a `warn!` line; the other
//! tags are unaffected.

use crate::calculator::TagAngleCalculator;
use fiducial_angles_core::{
    CameraCalibration, FiducialImageObservation, RawFiducialImageObservation, TagAngleError,
    TagAngleObservation,
};
use log::warn;

#[cfg(feature = "rayon")]
use rayon::prelude::*;

pub type TagResult = Result<TagAngleObservation, TagAngleError>;

fn calc_logged<C: TagAngleCalculator + ?Sized>(
    calculator: &C,
    observation: &FiducialImageObservation,
    calibration: &CameraCalibration,
) -> TagResult {
    let res = calculator.calc_tag_angles(observation, calibration);
    if let Err(err) = &res {
        warn!("dropping tag {}: {}", observation.tag_id, err);
    }
    res
}

fn calc_raw_logged<C: TagAngleCalculator + ?Sized>(
    calculator: &C,
    raw: &RawFiducialImageObservation,
    calibration: &CameraCalibration,
) -> TagResult {
    match FiducialImageObservation::from_raw(raw.tag_id, &raw.corners) {
        Ok(observation) => calc_logged(calculator, &observation, calibration),
        Err(err) => {
            warn!("dropping tag {:?}: {}", raw.tag_id, err);
            Err(err.into())
        }
    }
}

/// Results in input order, one per observation.
pub fn calc_frame<C: TagAngleCalculator + ?Sized>(
    calculator: &C,
    observations: &[FiducialImageObservation],
    calibration: &CameraCalibration,
) -> Vec<TagResult> {
    observations
        .iter()
        .map(|obs| calc_logged(calculator, obs, calibration))
        .collect()
}

/// Like [`calc_frame`], validating loosely typed detector output first.
pub fn calc_raw_frame<C: TagAngleCalculator + ?Sized>(
    calculator: &C,
    observations: &[RawFiducialImageObservation],
    calibration: &CameraCalibration,
) -> Vec<TagResult> {
    observations
        .iter()
        .map(|raw| calc_raw_logged(calculator, raw, calibration))
        .collect()
}

/// [`calc_frame`] across the rayon pool. Output order matches input order.
#[cfg(feature = "rayon")]
pub fn calc_frame_par<C: TagAngleCalculator + ?Sized>(
    calculator: &C,
    observations: &[FiducialImageObservation],
    calibration: &CameraCalibration,
) -> Vec<TagResult> {
    observations
        .par_iter()
        .map(|obs| calc_logged(calculator, obs, calibration))
        .collect()
}

/// [`calc_raw_frame`] across the rayon pool.
#[cfg(feature = "rayon")]
pub fn calc_raw_frame_par<C: TagAngleCalculator + ?Sized>(
    calculator: &C,
    observations: &[RawFiducialImageObservation],
    calibration: &CameraCalibration,
) -> Vec<TagResult> {
    observations
        .par_iter()
        .map(|raw| calc_raw_logged(calculator, raw, calibration))
        .collect()
}
