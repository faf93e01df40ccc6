use std::ops::Range;

use rayon::prelude::*;
use tracing::{debug, info};

use crate::align::shift_frame;
use crate::consts::PARALLEL_FRAME_THRESHOLD;
use crate::error::Result;
use crate::frame::Frame;
use crate::io::FrameSource;
use crate::trajectory::DriftTrajectory;

/// Drift-corrected view of a frame source.
///
/// Frames are corrected on demand: frame `i` is read from the source and
/// translated by the negated trajectory value at `i`. Any frame may be
/// requested in any order, any number of times.
pub struct CorrectedStack<'a, S: FrameSource + ?Sized> {
    source: &'a S,
    trajectory: &'a DriftTrajectory,
}

/// Wrap `source` so that every frame read is drift corrected.
pub fn apply_correction<'a, S: FrameSource + ?Sized>(
    source: &'a S,
    trajectory: &'a DriftTrajectory,
) -> CorrectedStack<'a, S> {
    CorrectedStack { source, trajectory }
}

impl<'a, S: FrameSource + ?Sized> CorrectedStack<'a, S> {
    pub fn trajectory(&self) -> &DriftTrajectory {
        self.trajectory
    }

    /// Corrected frames from `start` to the end of the stack.
    pub fn iter_from(&self, start: usize) -> impl Iterator<Item = Result<Frame>> + '_ {
        (start..self.source.frame_count()).map(move |i| self.read_frame(i))
    }
}

impl<S: FrameSource + Sync + ?Sized> CorrectedStack<'_, S> {
    /// Correct every frame, in parallel for larger stacks.
    pub fn correct_all(&self) -> Result<Vec<Frame>> {
        let total = self.source.frame_count();
        info!(frames = total, "Correcting drift");
        self.correct_range(0..total)
    }

    /// Correct the frames in `range`, in parallel when the range is large
    /// enough.
    pub fn correct_range(&self, range: Range<usize>) -> Result<Vec<Frame>> {
        let end = range.end.min(self.source.frame_count());
        let range = range.start.min(end)..end;
        if range.len() >= PARALLEL_FRAME_THRESHOLD {
            range.into_par_iter().map(|i| self.read_frame(i)).collect()
        } else {
            range.map(|i| self.read_frame(i)).collect()
        }
    }

    /// Corrected frames in consecutive batches of `chunk_len`, each batch
    /// corrected in parallel. Bounds memory to one batch at a time.
    pub fn chunks(&self, chunk_len: usize) -> impl Iterator<Item = Result<Vec<Frame>>> + '_ {
        let chunk_len = chunk_len.max(1);
        let total = self.source.frame_count();
        (0..total)
            .step_by(chunk_len)
            .map(move |start| self.correct_range(start..start + chunk_len))
    }
}

impl<S: FrameSource + ?Sized> FrameSource for CorrectedStack<'_, S> {
    fn frame_count(&self) -> usize {
        self.source.frame_count()
    }

    fn dimensions(&self) -> (usize, usize) {
        self.source.dimensions()
    }

    fn bit_depth(&self) -> u8 {
        self.source.bit_depth()
    }

    fn read_frame(&self, index: usize) -> Result<Frame> {
        let frame = self.source.read_frame(index)?;
        let (fy, fx) = self.trajectory.evaluate(index as f64);
        debug!(frame = index, dy = fy, dx = fx, "Correcting frame");
        Ok(shift_frame(&frame, -fy, -fx).with_index(index).quantized())
    }
}
