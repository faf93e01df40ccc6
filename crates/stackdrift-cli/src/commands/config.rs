use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use stackdrift_core::pipeline::PipelineConfig;

#[derive(Args)]
pub struct ConfigArgs {
    /// Save the template here instead of printing it
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Template for point-annotation runs instead of phase correlation
    #[arg(long)]
    pub points: bool,
}

/// Emit a default `PipelineConfig` as TOML, ready to edit and pass to `correct --config`.
pub fn run(args: &ConfigArgs) -> Result<()> {
    let template = PipelineConfig {
        drift_table: Some(PathBuf::from("drift.csv")),
        annotations: args.points.then(|| PathBuf::from("points.csv")),
        ..Default::default()
    };
    let text = toml::to_string_pretty(&template).context("Failed to serialize config")?;

    match args.output {
        Some(ref path) => {
            std::fs::write(path, &text)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            println!("Config template saved to {}", path.display());
        }
        None => print!("{text}"),
    }
    Ok(())
}
