//! Compute corner bearings and distances for one frame of tag detections.

use clap::Parser;
use fiducial_angles::{FrameDetections, FrameReport, TagAnglesConfig, TagAnglesIoError};
use log::{info, LevelFilter};
use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser, Debug)]
#[command(name = "fiducial-angles", version, about)]
struct Args {
    /// Calibration and tag size (JSON).
    #[arg(long)]
    config: PathBuf,
    /// Detector output for one frame (JSON).
    #[arg(long)]
    detections: PathBuf,
    /// Report path; stdout when omitted.
    #[arg(short, long)]
    output: Option<PathBuf>,
    /// Log per-tag details to stderr.
    #[arg(short, long)]
    verbose: bool,
}

#[derive(thiserror::Error, Debug)]
enum CliError {
    #[error("failed to load config {path}: {source}")]
    Config {
        path: PathBuf,
        source: TagAnglesIoError,
    },
    #[error("failed to load detections {path}: {source}")]
    Detections {
        path: PathBuf,
        source: TagAnglesIoError,
    },
    #[error("failed to write report: {0}")]
    Output(#[from] TagAnglesIoError),
    #[error("failed to write report: {0}")]
    Stdout(#[from] std::io::Error),
}

fn init_logging(level: LevelFilter) {
    #[cfg(feature = "tracing")]
    {
        let _ = tracing_log::LogTracer::init();
        fiducial_angles::core::init_tracing_with_level(false, level);
    }
    #[cfg(not(feature = "tracing"))]
    {
        let _ = fiducial_angles::core::init_from_env(level);
    }
}

fn run(args: Args) -> Result<(), CliError> {
    let cfg = TagAnglesConfig::load_json(&args.config).map_err(|source| CliError::Config {
        path: args.config.clone(),
        source,
    })?;

    let level = if args.verbose {
        LevelFilter::Debug
    } else {
        cfg.log_level().unwrap_or(LevelFilter::Warn)
    };
    init_logging(level);

    let frame =
        FrameDetections::load_json(&args.detections).map_err(|source| CliError::Detections {
            path: args.detections.clone(),
            source,
        })?;

    let calculator = cfg.build_calculator();
    let report = FrameReport::process(&calculator, &frame, &cfg.calibration);
    info!(
        "{} tags: {} observations, {} failures",
        frame.tags.len(),
        report.observations.len(),
        report.failures.len()
    );

    match &args.output {
        Some(path) => {
            report.write_json(path)?;
            info!("wrote report JSON to {}", path.display());
        }
        None => {
            let mut stdout = std::io::stdout().lock();
            writeln!(stdout, "{}", report.to_json_pretty()?)?;
        }
    }
    Ok(())
}

fn main() -> ExitCode {
    match run(Args::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}
