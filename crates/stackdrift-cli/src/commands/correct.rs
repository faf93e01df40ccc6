use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use clap::{Args, ValueEnum};
use stackdrift_core::pipeline::run_pipeline_reported;

use super::{load_config, DriftArgs};
use crate::progress::BarReporter;
use crate::summary::{print_pipeline_summary, print_result_summary};

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum SequenceFormat {
    Tif,
    Png,
}

impl SequenceFormat {
    fn extension(self) -> &'static str {
        match self {
            Self::Tif => "tif",
            Self::Png => "png",
        }
    }
}

#[derive(Args)]
pub struct CorrectArgs {
    /// Input SER file, multi-page TIFF, or image directory (overrides config)
    pub input: Option<PathBuf>,

    /// Output .ser file, .tif multi-page stack, or image directory (overrides config)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// TOML config file
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Point annotations CSV (frame,x,y); skips phase correlation
    #[arg(long)]
    pub points: Option<PathBuf>,

    /// Also write the drift table CSV
    #[arg(short, long)]
    pub table: Option<PathBuf>,

    /// Image format when the output is a directory
    #[arg(long, value_enum)]
    pub format: Option<SequenceFormat>,

    #[command(flatten)]
    pub drift: DriftArgs,
}

pub fn run(args: &CorrectArgs) -> Result<()> {
    let mut config = load_config(args.config.as_deref())?;
    if let Some(ref input) = args.input {
        config.input = input.clone();
    }
    if let Some(ref output) = args.output {
        config.output = output.clone();
    }
    if args.points.is_some() {
        config.annotations = args.points.clone();
    }
    if args.table.is_some() {
        config.drift_table = args.table.clone();
    }
    if let Some(format) = args.format {
        config.sequence_extension = format.extension().to_string();
    }
    args.drift.apply(&mut config.drift);
    config.validate()?;

    print_pipeline_summary(&config);

    let reporter = Arc::new(BarReporter::new()?);
    let result = run_pipeline_reported(&config, reporter.clone());
    reporter.finish();
    let output = result?;

    print_result_summary(&config, &output);
    Ok(())
}
