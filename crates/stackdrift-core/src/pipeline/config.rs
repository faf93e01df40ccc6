use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::consts::DEFAULT_SEQUENCE_EXTENSION;
use crate::drift::DriftConfig;
use crate::error::{DriftError, Result};

/// Everything needed for one estimate-and-correct run.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// `.ser` file or directory of images.
    pub input: PathBuf,
    /// `.ser` file or directory for the corrected image sequence.
    pub output: PathBuf,
    /// Point annotations CSV. When present, drift comes from the annotations
    /// instead of phase correlation.
    #[serde(default)]
    pub annotations: Option<PathBuf>,
    /// Optional CSV drift table destination.
    #[serde(default)]
    pub drift_table: Option<PathBuf>,
    /// Extension (and format) of image-sequence output files.
    #[serde(default = "default_sequence_extension")]
    pub sequence_extension: String,
    #[serde(default)]
    pub drift: DriftConfig,
}

fn default_sequence_extension() -> String {
    DEFAULT_SEQUENCE_EXTENSION.to_string()
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            input: PathBuf::from("input.ser"),
            output: PathBuf::from("corrected.ser"),
            annotations: None,
            drift_table: None,
            sequence_extension: default_sequence_extension(),
            drift: DriftConfig::default(),
        }
    }
}

impl PipelineConfig {
    pub fn validate(&self) -> Result<()> {
        self.drift.validate()?;
        match self.sequence_extension.to_ascii_lowercase().as_str() {
            "tif" | "tiff" | "png" => Ok(()),
            other => Err(DriftError::InvalidConfig(format!(
                "unsupported sequence extension '{other}' (expected tif, tiff or png)"
            ))),
        }
    }

    /// Whether drift comes from point annotations.
    pub fn uses_annotations(&self) -> bool {
        self.annotations.is_some()
    }
}
