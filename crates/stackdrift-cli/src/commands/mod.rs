pub mod config;
pub mod correct;
pub mod estimate;
pub mod info;

use std::path::Path;

use anyhow::{Context, Result};
use clap::Args;
use stackdrift_core::drift::{DriftConfig, DuplicatePolicy};
use stackdrift_core::pipeline::PipelineConfig;
use tracing::debug;

/// Drift estimation options shared by `estimate` and `correct`.
///
/// Unset options keep the value from the config file (or the default).
#[derive(Args, Clone, Debug)]
pub struct DriftArgs {
    /// Subpixel upsampling factor (1 = integer-pixel registration)
    #[arg(long)]
    pub upsample: Option<usize>,

    /// Gaussian prefilter sigma in pixels (0 disables the prefilter)
    #[arg(long)]
    pub sigma: Option<f32>,

    /// Frames registered against one reference before it is replaced
    #[arg(long)]
    pub update_threshold: Option<usize>,

    /// Spline smoothing factor in [0, 1] (0 interpolates, 1 fits a line)
    #[arg(long)]
    pub smoothing: Option<f64>,

    /// How repeated annotations at one frame are combined: last, mean
    #[arg(long)]
    pub duplicates: Option<DuplicatePolicy>,
}

impl DriftArgs {
    pub fn apply(&self, config: &mut DriftConfig) {
        if let Some(u) = self.upsample {
            config.upsample_factor = u;
        }
        if let Some(sigma) = self.sigma {
            config.prefilter_sigma = sigma;
        }
        if let Some(t) = self.update_threshold {
            config.update_threshold = t;
        }
        if let Some(s) = self.smoothing {
            config.smoothing_factor = s;
        }
        if let Some(policy) = self.duplicates {
            config.duplicate_policy = policy;
        }
    }
}

/// Load a pipeline config from a TOML file, or start from the defaults.
pub fn load_config(path: Option<&Path>) -> Result<PipelineConfig> {
    match path {
        Some(path) => {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file {}", path.display()))?;
            let config = toml::from_str(&content)
                .with_context(|| format!("Failed to parse config file {}", path.display()))?;
            debug!(path = %path.display(), "Loaded config");
            Ok(config)
        }
        None => Ok(PipelineConfig::default()),
    }
}
