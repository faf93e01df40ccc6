pub mod align;
pub mod consts;
pub mod correct;
pub mod drift;
pub mod error;
pub mod filters;
pub mod frame;
pub mod io;
pub mod pipeline;
pub mod trajectory;

pub use correct::{apply_correction, CorrectedStack};
pub use drift::{estimate_by_phase_correlation, estimate_by_points, DriftConfig, DriftEstimator};
pub use error::{DriftError, Result};
pub use frame::{Frame, PointAnnotation, ShiftSample};
pub use io::{FrameSource, MemoryStack};
pub use trajectory::DriftTrajectory;
