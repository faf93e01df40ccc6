use ndarray::Array2;
use tracing::{debug, info};

use crate::align::{register_arrays, shift_array};
use crate::error::{DriftError, Result};
use crate::filters::gaussian_blur_array;
use crate::frame::{Registration, ShiftSample};
use crate::io::FrameSource;

use super::config::DriftConfig;

/// Reference image threaded through the estimation fold.
#[derive(Clone, Debug)]
pub struct ReferenceState {
    /// Prefiltered reference, in the coordinates of frame 0.
    pub reference: Array2<f32>,
    /// Candidates registered against `reference` since it was installed.
    pub frames_since_update: usize,
}

impl ReferenceState {
    pub fn new(reference: Array2<f32>) -> Self {
        Self {
            reference,
            frames_since_update: 0,
        }
    }

    /// Account for one registered candidate.
    ///
    /// Once more than `update_threshold` candidates have been measured
    /// against the current reference, the candidate, warped back by its own
    /// displacement, becomes the new reference. Returns the next state and
    /// whether the reference was replaced.
    pub fn advance(
        self,
        candidate: &Array2<f32>,
        registration: &Registration,
        update_threshold: usize,
    ) -> (Self, bool) {
        let frames_since_update = self.frames_since_update + 1;
        if frames_since_update > update_threshold {
            let reference = shift_array(candidate, -registration.dy, -registration.dx);
            (Self::new(reference), true)
        } else {
            (
                Self {
                    reference: self.reference,
                    frames_since_update,
                },
                false,
            )
        }
    }
}

/// Raw outcome of phase-correlation drift estimation.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ShiftEstimates {
    /// One sample per frame in index order; frame 0 is the zero origin.
    pub samples: Vec<ShiftSample>,
    /// Registration error of each sample, parallel to `samples`.
    pub errors: Vec<f64>,
    /// Frame indices whose candidate became the new reference.
    pub reference_updates: Vec<usize>,
}

impl ShiftEstimates {
    pub fn error_at(&self, frame_index: usize) -> Option<f64> {
        self.samples
            .iter()
            .position(|s| s.frame_index == frame_index)
            .and_then(|i| self.errors.get(i).copied())
    }

    /// Frames registered against a reference; frame 0 is the origin.
    pub fn registered_frames(&self) -> usize {
        self.samples.len().saturating_sub(1)
    }

    /// Mean registration error over the registered frames (frame 0 excluded).
    pub fn mean_error(&self) -> Option<f64> {
        let registered = self.errors.get(1..)?;
        if registered.is_empty() {
            return None;
        }
        Some(registered.iter().sum::<f64>() / registered.len() as f64)
    }

    pub fn max_error(&self) -> Option<f64> {
        self.errors.get(1..)?.iter().copied().reduce(f64::max)
    }
}

/// Measure the displacement of every frame against an adaptive reference.
pub fn estimate_shifts<S: FrameSource + ?Sized>(
    source: &S,
    config: &DriftConfig,
) -> Result<ShiftEstimates> {
    estimate_shifts_reported(source, config, |_done| {})
}

/// [`estimate_shifts`] with a callback invoked after each registered frame
/// with the number of frames processed so far.
pub fn estimate_shifts_reported<S, F>(
    source: &S,
    config: &DriftConfig,
    mut on_frame: F,
) -> Result<ShiftEstimates>
where
    S: FrameSource + ?Sized,
    F: FnMut(usize),
{
    config.validate()?;
    let total = source.frame_count();
    if total < 2 {
        return Err(DriftError::EmptyStack { frames: total });
    }

    info!(
        frames = total,
        upsample = config.upsample_factor,
        sigma = config.prefilter_sigma,
        update_threshold = config.update_threshold,
        "Estimating drift by phase correlation"
    );

    let first = source.read_frame(0)?;
    let initial = ReferenceState::new(gaussian_blur_array(&first.data, config.prefilter_sigma));

    let mut estimates = ShiftEstimates {
        samples: vec![ShiftSample::new(0, 0.0, 0.0)],
        errors: vec![0.0],
        reference_updates: Vec::new(),
    };

    (1..total).try_fold(initial, |state, i| -> Result<ReferenceState> {
        let frame = source.read_frame(i)?;
        let candidate = gaussian_blur_array(&frame.data, config.prefilter_sigma);
        let reg = register_arrays(&state.reference, &candidate, config.upsample_factor)?;

        debug!(frame = i, dy = reg.dy, dx = reg.dx, error = reg.error, "Registered frame");
        estimates.samples.push(ShiftSample::new(i, reg.dy, reg.dx));
        estimates.errors.push(reg.error);

        let (next, replaced) = state.advance(&candidate, &reg, config.update_threshold);
        if replaced {
            debug!(frame = i, "Reference replaced");
            estimates.reference_updates.push(i);
        }
        on_frame(i);
        Ok(next)
    })?;

    info!(
        samples = estimates.samples.len(),
        reference_updates = estimates.reference_updates.len(),
        mean_error = estimates.mean_error().unwrap_or(0.0),
        "Drift estimation complete"
    );

    Ok(estimates)
}
