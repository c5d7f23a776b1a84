//! JSON configuration, frame input and report helpers.

use crate::calculator::{CameraMatrixTagAngleCalculator, TagAngleCalculator};
use crate::frame::{calc_raw_frame, TagResult};
use fiducial_angles_core::{CameraCalibration, RawFiducialImageObservation, TagAngleObservation};
use fiducial_angles_pose::SquareTargetPoseResolver;
use log::LevelFilter;
use serde::{Deserialize, Serialize};
use std::{fs, path::Path, str::FromStr};

#[derive(thiserror::Error, Debug)]
pub enum TagAnglesIoError {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

/// Side of a 36h11 tag as printed for FRC fields, in metres.
fn default_tag_size_m() -> f64 {
    0.1651
}

/// Camera calibration plus the physical tag size.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TagAnglesConfig {
    pub calibration: CameraCalibration,
    #[serde(default = "default_tag_size_m")]
    pub tag_size_m: f64,
    /// `error`, `warn`, `info`, `debug`, `trace` or `off`.
    #[serde(default)]
    pub log_level: Option<String>,
}

impl TagAnglesConfig {
    pub fn new(calibration: CameraCalibration, tag_size_m: f64) -> Self {
        Self {
            calibration,
            tag_size_m,
            log_level: None,
        }
    }

    /// Load a JSON config from disk.
    pub fn load_json(path: impl AsRef<Path>) -> Result<Self, TagAnglesIoError> {
        let raw = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }

    /// Write this config to disk as pretty JSON.
    pub fn write_json(&self, path: impl AsRef<Path>) -> Result<(), TagAnglesIoError> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }

    /// Parsed `log_level`; unknown names are ignored.
    pub fn log_level(&self) -> Option<LevelFilter> {
        self.log_level
            .as_deref()
            .and_then(|s| LevelFilter::from_str(s.trim()).ok())
    }

    pub fn build_resolver(&self) -> SquareTargetPoseResolver {
        SquareTargetPoseResolver::new(self.tag_size_m)
    }

    /// Calculator backed by the IPPE square-tag resolver.
    pub fn build_calculator(&self) -> CameraMatrixTagAngleCalculator<SquareTargetPoseResolver> {
        CameraMatrixTagAngleCalculator::new(self.build_resolver())
    }
}

/// Detector output for one camera frame.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FrameDetections {
    #[serde(default)]
    pub timestamp: Option<f64>,
    pub tags: Vec<RawFiducialImageObservation>,
}

impl FrameDetections {
    pub fn load_json(path: impl AsRef<Path>) -> Result<Self, TagAnglesIoError> {
        let raw = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }

    pub fn write_json(&self, path: impl AsRef<Path>) -> Result<(), TagAnglesIoError> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }
}

/// A tag that produced no observation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TagFailure {
    pub tag_id: Option<u32>,
    pub error: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FrameReport {
    #[serde(default)]
    pub timestamp: Option<f64>,
    pub observations: Vec<TagAngleObservation>,
    #[serde(default)]
    pub failures: Vec<TagFailure>,
}

impl FrameReport {
    /// Split per-tag results into observations and failures.
    ///
    /// `results` must be in the same order as `frame.tags`.
    pub fn from_results(frame: &FrameDetections, results: Vec<TagResult>) -> Self {
        let mut report = Self {
            timestamp: frame.timestamp,
            ..Self::default()
        };
        for (raw, res) in frame.tags.iter().zip(results) {
            match res {
                Ok(obs) => report.observations.push(obs),
                Err(err) => report.failures.push(TagFailure {
                    tag_id: raw.tag_id,
                    error: err.to_string(),
                }),
            }
        }
        report
    }

    /// Run `calculator` over every tag in `frame`.
    pub fn process<C: TagAngleCalculator + ?Sized>(
        calculator: &C,
        frame: &FrameDetections,
        calibration: &CameraCalibration,
    ) -> Self {
        let results = calc_raw_frame(calculator, &frame.tags, calibration);
        Self::from_results(frame, results)
    }

    /// Parallel [`FrameReport::process`].
    #[cfg(feature = "rayon")]
    pub fn process_par<C: TagAngleCalculator + ?Sized>(
        calculator: &C,
        frame: &FrameDetections,
        calibration: &CameraCalibration,
    ) -> Self {
        let results = crate::frame::calc_raw_frame_par(calculator, &frame.tags, calibration);
        Self::from_results(frame, results)
    }

    pub fn to_json_pretty(&self) -> Result<String, TagAnglesIoError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Load a report from JSON on disk.
    pub fn load_json(path: impl AsRef<Path>) -> Result<Self, TagAnglesIoError> {
        let raw = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }

    /// Write this report to disk as pretty JSON.
    pub fn write_json(&self, path: impl AsRef<Path>) -> Result<(), TagAnglesIoError> {
        fs::write(path, self.to_json_pretty()?)?;
        Ok(())
    }
}
