use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use indicatif::{ProgressBar, ProgressStyle};
use stackdrift_core::drift::{estimate_shifts_reported, DriftEstimator, PointTrackEstimator};
use stackdrift_core::io::annotations::read_annotations;
use stackdrift_core::io::drift_table::{write_drift_table, DriftReport};
use stackdrift_core::pipeline::StackInput;
use stackdrift_core::{DriftTrajectory, FrameSource};

use super::{load_config, DriftArgs};
use crate::summary::print_drift_table;

#[derive(Args)]
pub struct EstimateArgs {
    /// Input SER file, multi-page TIFF, or image directory
    pub input: PathBuf,

    /// Point annotations CSV (frame,x,y); skips phase correlation
    #[arg(long)]
    pub points: Option<PathBuf>,

    /// Write the drift table CSV here instead of printing it
    #[arg(short, long)]
    pub table: Option<PathBuf>,

    /// TOML config file for drift options
    #[arg(long)]
    pub config: Option<PathBuf>,

    #[command(flatten)]
    pub drift: DriftArgs,
}

pub fn run(args: &EstimateArgs) -> Result<()> {
    let mut config = load_config(args.config.as_deref())?.drift;
    args.drift.apply(&mut config);
    config.validate()?;

    let input = StackInput::open(&args.input)
        .with_context(|| format!("Failed to open {}", args.input.display()))?;
    let total = input.frame_count();

    let report = match &args.points {
        Some(path) => {
            let annotations = read_annotations(path)
                .with_context(|| format!("Failed to read annotations {}", path.display()))?;
            let samples = PointTrackEstimator::new(&annotations, &config).samples()?;
            let trajectory = DriftTrajectory::fit(&samples, config.smoothing_factor)?;
            DriftReport::new(&trajectory, total, &samples)
        }
        None => {
            let pb = ProgressBar::new(total.saturating_sub(1) as u64);
            pb.set_style(
                ProgressStyle::default_bar()
                    .template("{msg:20} [{bar:40}] {pos}/{len}")?
                    .progress_chars("=> "),
            );
            pb.set_message("Registering frames");
            let estimates =
                estimate_shifts_reported(&input, &config, |done| pb.set_position(done as u64))?;
            pb.finish_and_clear();

            let trajectory = DriftTrajectory::fit(&estimates.samples, config.smoothing_factor)?;
            if let Some(mean) = estimates.mean_error() {
                println!(
                    "Registered {} frames against a reference, mean error {:.4}, {} reference updates",
                    estimates.registered_frames(),
                    mean,
                    estimates.reference_updates.len()
                );
            }
            DriftReport::from_estimates(&trajectory, total, &estimates)
        }
    };

    match &args.table {
        Some(path) => {
            write_drift_table(path, &report)
                .with_context(|| format!("Failed to write drift table {}", path.display()))?;
            println!(
                "Drift table saved to {} (max drift {:.2} px)",
                path.display(),
                report.max_drift()
            );
        }
        None => print_drift_table(&report),
    }

    Ok(())
}
