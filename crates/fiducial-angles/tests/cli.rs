#![cfg(feature = "cli")]

use assert_cmd::Command;
use fiducial_angles::FrameReport;
use predicates::prelude::*;
use std::fs;
use std::path::Path;

const CONFIG: &str = r#"{
    "calibration": {
        "camera_matrix": [[900.0, 0.0, 640.0], [0.0, 900.0, 360.0], [0.0, 0.0, 1.0]],
        "distortion_coefficients": []
    },
    "tag_size_m": 0.16
}"#;

// frontal 0.16 m tag at 1.8 m: 80 px side around the principal point
const DETECTIONS: &str = r#"{
    "timestamp": 3.5,
    "tags": [
        {"tag_id": 5, "corners": [[600.0, 320.0], [680.0, 320.0], [680.0, 400.0], [600.0, 400.0]]},
        {"tag_id": 6, "corners": [[1.0, 1.0], [2.0, 2.0]]}
    ]
}"#;

fn write(dir: &Path, name: &str, body: &str) -> std::path::PathBuf {
    let path = dir.join(name);
    fs::write(&path, body).expect("write fixture");
    path
}

fn cmd() -> Command {
    Command::cargo_bin("fiducial-angles").expect("binary")
}

#[test]
fn writes_report_to_stdout() {
    let dir = tempfile::tempdir().expect("tempdir");
    let cfg = write(dir.path(), "cfg.json", CONFIG);
    let det = write(dir.path(), "frame.json", DETECTIONS);

    let out = cmd()
        .arg("--config")
        .arg(&cfg)
        .arg("--detections")
        .arg(&det)
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    let report: FrameReport = serde_json::from_slice(&out).expect("report json");
    assert_eq!(report.timestamp, Some(3.5));
    assert_eq!(report.observations.len(), 1);
    assert_eq!(report.observations[0].tag_id, 5);
    assert!((report.observations[0].distance - 1.8).abs() < 1e-6);
    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].tag_id, Some(6));
}

#[test]
fn writes_report_file() {
    let dir = tempfile::tempdir().expect("tempdir");
    let cfg = write(dir.path(), "cfg.json", CONFIG);
    let det = write(dir.path(), "frame.json", DETECTIONS);
    let out = dir.path().join("report.json");

    cmd()
        .args(["--config", cfg.to_str().expect("utf8")])
        .args(["--detections", det.to_str().expect("utf8")])
        .args(["--output", out.to_str().expect("utf8")])
        .assert()
        .success()
        .stdout(predicate::str::is_empty());

    let report = FrameReport::load_json(&out).expect("report");
    assert_eq!(report.observations.len(), 1);
}

#[test]
fn missing_config_fails() {
    let dir = tempfile::tempdir().expect("tempdir");
    let det = write(dir.path(), "frame.json", DETECTIONS);
    cmd()
        .arg("--config")
        .arg(dir.path().join("missing.json"))
        .arg("--detections")
        .arg(&det)
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to load config"));
}

#[test]
fn malformed_detections_fail() {
    let dir = tempfile::tempdir().expect("tempdir");
    let cfg = write(dir.path(), "cfg.json", CONFIG);
    let det = write(dir.path(), "frame.json", "{\"tags\": 3}");
    cmd()
        .arg("--config")
        .arg(&cfg)
        .arg("--detections")
        .arg(&det)
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to load detections"));
}

#[test]
fn verbose_logs_selection_to_stderr_only() {
    let dir = tempfile::tempdir().expect("tempdir");
    let cfg = write(dir.path(), "cfg.json", CONFIG);
    let det = write(dir.path(), "frame.json", DETECTIONS);

    let out = cmd()
        .env_remove("RUST_LOG")
        .env_remove("FIDUCIAL_ANGLES_LOG")
        .arg("--config")
        .arg(&cfg)
        .arg("--detections")
        .arg(&det)
        .arg("--verbose")
        .assert()
        .success()
        .stderr(predicate::str::contains("hypothesis 0 selected"))
        .get_output()
        .stdout
        .clone();

    let report: FrameReport = serde_json::from_slice(&out).expect("stdout is only the report");
    assert_eq!(report.observations.len(), 1);
}
