pub mod spline;

use std::collections::BTreeMap;

use tracing::debug;

use crate::error::{DriftError, Result};
use crate::frame::ShiftSample;

pub use spline::SmoothingSpline;

/// Continuous drift as a function of (fractional) frame index.
///
/// Each axis is an independent cubic smoothing spline over frame index.
#[derive(Clone, Debug, PartialEq)]
pub struct DriftTrajectory {
    y: SmoothingSpline,
    x: SmoothingSpline,
}

impl DriftTrajectory {
    /// Fit a trajectory to raw drift samples.
    ///
    /// Samples may arrive in any order. Samples sharing a frame index are
    /// averaged. Fewer than two distinct frame indices cannot define a
    /// trajectory.
    pub fn fit(samples: &[ShiftSample], smoothing_factor: f64) -> Result<Self> {
        let mut by_frame: BTreeMap<usize, (f64, f64, usize)> = BTreeMap::new();
        for s in samples {
            let entry = by_frame.entry(s.frame_index).or_insert((0.0, 0.0, 0));
            entry.0 += s.dy;
            entry.1 += s.dx;
            entry.2 += 1;
        }
        if by_frame.len() < 2 {
            return Err(DriftError::InsufficientSamples {
                distinct: by_frame.len(),
            });
        }

        let t: Vec<f64> = by_frame.keys().map(|&k| k as f64).collect();
        let ys: Vec<f64> = by_frame.values().map(|v| v.0 / v.2 as f64).collect();
        let xs: Vec<f64> = by_frame.values().map(|v| v.1 / v.2 as f64).collect();

        debug!(
            samples = t.len(),
            smoothing_factor, "Fitting drift trajectory"
        );

        Ok(Self {
            y: SmoothingSpline::fit(&t, &ys, smoothing_factor)?,
            x: SmoothingSpline::fit(&t, &xs, smoothing_factor)?,
        })
    }

    /// Drift `(dy, dx)` at fractional frame index `t`.
    pub fn evaluate(&self, t: f64) -> (f64, f64) {
        (self.y.evaluate(t), self.x.evaluate(t))
    }

    /// Drift velocity `(dy/dt, dx/dt)` in pixels per frame.
    pub fn derivative(&self, t: f64) -> (f64, f64) {
        (self.y.derivative(t), self.x.derivative(t))
    }

    /// Fitted drift at integer frame `index`.
    pub fn at_frame(&self, index: usize) -> ShiftSample {
        let (dy, dx) = self.evaluate(index as f64);
        ShiftSample::new(index, dy, dx)
    }

    /// Fitted drift at every frame index `0..frame_count`.
    pub fn sample_frames(&self, frame_count: usize) -> Vec<ShiftSample> {
        (0..frame_count).map(|i| self.at_frame(i)).collect()
    }

    /// Drift sampled `per_frame` times per frame over `[0, frame_count - 1]`,
    /// as `(t, dy, dx)` triples.
    pub fn sample_dense(&self, frame_count: usize, per_frame: usize) -> Vec<(f64, f64, f64)> {
        let per_frame = per_frame.max(1);
        let steps = frame_count.saturating_sub(1) * per_frame;
        (0..=steps)
            .map(|k| {
                let t = k as f64 / per_frame as f64;
                let (dy, dx) = self.evaluate(t);
                (t, dy, dx)
            })
            .collect()
    }

    /// First and last frame index covered by samples.
    pub fn sample_span(&self) -> (f64, f64) {
        let knots = self.y.knots();
        (knots[0], knots[knots.len() - 1])
    }
}
