use crate::drift::ShiftEstimates;
use crate::io::drift_table::DriftReport;
use crate::trajectory::DriftTrajectory;

/// Pipeline processing stage, used for progress reporting.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PipelineStage {
    Reading,
    Estimating,
    Fitting,
    Correcting,
    Writing,
}

impl std::fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Reading => write!(f, "Reading input"),
            Self::Estimating => write!(f, "Estimating drift"),
            Self::Fitting => write!(f, "Fitting trajectory"),
            Self::Correcting => write!(f, "Correcting frames"),
            Self::Writing => write!(f, "Writing drift table"),
        }
    }
}

/// Which path produced the raw drift samples.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EstimationMethod {
    PhaseCorrelation,
    Points,
}

impl std::fmt::Display for EstimationMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::PhaseCorrelation => write!(f, "phase correlation"),
            Self::Points => write!(f, "point annotations"),
        }
    }
}

/// Result of a pipeline run.
#[derive(Clone, Debug)]
pub struct PipelineOutput {
    pub method: EstimationMethod,
    pub trajectory: DriftTrajectory,
    pub report: DriftReport,
    /// Present for phase-correlation runs.
    pub estimates: Option<ShiftEstimates>,
    pub frames_written: usize,
}

/// Thread-safe progress reporting for the pipeline.
///
/// Implementors can use this to drive progress bars, logging, or any other
/// UI feedback. All methods have default no-op implementations.
pub trait ProgressReporter: Send + Sync {
    /// A new pipeline stage has started. `total_items` is the number of
    /// work items in this stage (e.g., frame count), if known.
    fn begin_stage(&self, _stage: PipelineStage, _total_items: Option<usize>) {}

    /// Work items completed so far within the current stage.
    fn advance(&self, _items_done: usize) {}

    /// The current stage is finished.
    fn finish_stage(&self) {}
}

/// Progress reporter that ignores every event.
pub struct NoOpReporter;
impl ProgressReporter for NoOpReporter {}
