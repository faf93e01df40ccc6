use serde::{Deserialize, Serialize};

use crate::consts::{
    DEFAULT_PREFILTER_SIGMA, DEFAULT_SMOOTHING_FACTOR, DEFAULT_UPDATE_THRESHOLD,
    DEFAULT_UPSAMPLE_FACTOR,
};
use crate::error::{DriftError, Result};

/// How several annotations at one frame index collapse into one sample.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DuplicatePolicy {
    /// The annotation appearing last in input order wins.
    #[default]
    Last,
    /// Coordinates of all annotations at the index are averaged.
    Mean,
}

impl std::fmt::Display for DuplicatePolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Last => write!(f, "last"),
            Self::Mean => write!(f, "mean"),
        }
    }
}

impl std::str::FromStr for DuplicatePolicy {
    type Err = DriftError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "last" => Ok(Self::Last),
            "mean" => Ok(Self::Mean),
            other => Err(DriftError::InvalidConfig(format!(
                "unknown duplicate policy '{other}' (expected 'last' or 'mean')"
            ))),
        }
    }
}

/// Parameters shared by every drift estimation entry point.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DriftConfig {
    /// Subpixel resolution of phase correlation is `1 / upsample_factor`.
    pub upsample_factor: usize,
    /// Gaussian sigma (pixels) applied to reference and candidate before
    /// registration. Zero disables the prefilter.
    pub prefilter_sigma: f32,
    /// Frames measured against one reference before it is replaced.
    pub update_threshold: usize,
    /// Trajectory smoothing in [0, 1]: 0 interpolates, 1 fits a line.
    pub smoothing_factor: f64,
    pub duplicate_policy: DuplicatePolicy,
}

impl Default for DriftConfig {
    fn default() -> Self {
        Self {
            upsample_factor: DEFAULT_UPSAMPLE_FACTOR,
            prefilter_sigma: DEFAULT_PREFILTER_SIGMA,
            update_threshold: DEFAULT_UPDATE_THRESHOLD,
            smoothing_factor: DEFAULT_SMOOTHING_FACTOR,
            duplicate_policy: DuplicatePolicy::default(),
        }
    }
}

impl DriftConfig {
    pub fn validate(&self) -> Result<()> {
        if self.upsample_factor == 0 {
            return Err(DriftError::InvalidConfig(
                "upsample_factor must be at least 1".into(),
            ));
        }
        if self.prefilter_sigma.is_nan() || self.prefilter_sigma < 0.0 {
            return Err(DriftError::InvalidConfig(format!(
                "prefilter_sigma must be a non-negative number, got {}",
                self.prefilter_sigma
            )));
        }
        if !(0.0..=1.0).contains(&self.smoothing_factor) {
            return Err(DriftError::InvalidConfig(format!(
                "smoothing_factor must lie in [0, 1], got {}",
                self.smoothing_factor
            )));
        }
        Ok(())
    }
}
