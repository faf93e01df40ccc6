//! Drift estimation: raw per-frame samples from phase correlation or from
//! manual point annotations, smoothed into a [`DriftTrajectory`].

pub mod config;
pub mod points;
pub mod reference;

use tracing::info;

use crate::error::Result;
use crate::frame::{PointAnnotation, ShiftSample};
use crate::io::FrameSource;
use crate::trajectory::DriftTrajectory;

pub use config::{DriftConfig, DuplicatePolicy};
pub use points::samples_from_annotations;
pub use reference::{estimate_shifts, estimate_shifts_reported, ReferenceState, ShiftEstimates};

/// A source of raw drift samples.
pub trait DriftEstimator {
    fn config(&self) -> &DriftConfig;

    /// Raw drift samples, sorted by frame index.
    fn samples(&self) -> Result<Vec<ShiftSample>>;

    /// Fit the smoothed trajectory through [`samples`](Self::samples).
    fn estimate(&self) -> Result<DriftTrajectory> {
        let config = self.config();
        config.validate()?;
        DriftTrajectory::fit(&self.samples()?, config.smoothing_factor)
    }
}

/// Drift measured by registering every frame against an adaptive reference.
pub struct PhaseCorrelationEstimator<'a, S: FrameSource + ?Sized> {
    source: &'a S,
    config: &'a DriftConfig,
}

impl<'a, S: FrameSource + ?Sized> PhaseCorrelationEstimator<'a, S> {
    pub fn new(source: &'a S, config: &'a DriftConfig) -> Self {
        Self { source, config }
    }

    /// Full estimation report including registration errors.
    pub fn shifts(&self) -> Result<ShiftEstimates> {
        estimate_shifts(self.source, self.config)
    }
}

impl<S: FrameSource + ?Sized> DriftEstimator for PhaseCorrelationEstimator<'_, S> {
    fn config(&self) -> &DriftConfig {
        self.config
    }

    fn samples(&self) -> Result<Vec<ShiftSample>> {
        Ok(self.shifts()?.samples)
    }
}

/// Drift read from a manually tracked feature.
pub struct PointTrackEstimator<'a> {
    annotations: &'a [PointAnnotation],
    config: &'a DriftConfig,
}

impl<'a> PointTrackEstimator<'a> {
    pub fn new(annotations: &'a [PointAnnotation], config: &'a DriftConfig) -> Self {
        Self {
            annotations,
            config,
        }
    }
}

impl DriftEstimator for PointTrackEstimator<'_> {
    fn config(&self) -> &DriftConfig {
        self.config
    }

    fn samples(&self) -> Result<Vec<ShiftSample>> {
        let samples = samples_from_annotations(self.annotations, self.config.duplicate_policy);
        info!(
            annotations = self.annotations.len(),
            frames = samples.len(),
            policy = %self.config.duplicate_policy,
            "Converted point annotations"
        );
        Ok(samples)
    }
}

/// Estimate the drift of a stack by phase correlation.
pub fn estimate_by_phase_correlation<S: FrameSource + ?Sized>(
    source: &S,
    config: &DriftConfig,
) -> Result<DriftTrajectory> {
    PhaseCorrelationEstimator::new(source, config).estimate()
}

/// Estimate drift from point annotations of one tracked feature.
pub fn estimate_by_points(
    annotations: &[PointAnnotation],
    config: &DriftConfig,
) -> Result<DriftTrajectory> {
    PointTrackEstimator::new(annotations, config).estimate()
}
