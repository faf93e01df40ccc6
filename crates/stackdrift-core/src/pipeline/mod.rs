pub mod config;
mod input;
mod orchestrator;
mod types;

pub use config::PipelineConfig;
pub use input::StackInput;
pub use orchestrator::{run_pipeline, run_pipeline_reported, write_corrected};
pub use types::{EstimationMethod, NoOpReporter, PipelineOutput, PipelineStage, ProgressReporter};
