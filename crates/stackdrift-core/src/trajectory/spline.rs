//! Cubic smoothing spline (Reinsch / Green & Silverman formulation).
//!
//! For knots `t_0 < ... < t_{n-1}` and values `y_i` the fitted curve `g`
//! minimizes
//!
//! ```text
//! (1 - s) * Σ (y_i - g(t_i))²  +  s * K * h̄³ * ∫ g''(t)² dt
//! ```
//!
//! where `s` is the smoothing factor in `[0, 1]`, `h̄` the mean knot spacing
//! and `K` is [`SMOOTHING_PENALTY_SCALE`]. Scaling by `h̄³` makes the penalty
//! independent of the frame spacing, so the same `s` smooths a densely and a
//! sparsely sampled trajectory alike. `s = 0` interpolates the
//! samples (natural cubic spline), `s = 1` collapses to the least-squares
//! straight line. Outside the knot range the curve continues linearly.

use crate::consts::SMOOTHING_PENALTY_SCALE;
use crate::error::{DriftError, Result};

#[derive(Clone, Debug, PartialEq)]
pub struct SmoothingSpline {
    knots: Vec<f64>,
    values: Vec<f64>,
    /// Second derivative at each knot; zero at both ends.
    curvature: Vec<f64>,
}

impl SmoothingSpline {
    /// Fit a smoothing spline through `(t, y)` pairs sorted by strictly
    /// increasing `t`.
    pub fn fit(t: &[f64], y: &[f64], smoothing_factor: f64) -> Result<Self> {
        if t.len() != y.len() {
            return Err(DriftError::InvalidConfig(format!(
                "spline abscissa/ordinate length mismatch: {} vs {}",
                t.len(),
                y.len()
            )));
        }
        if !(0.0..=1.0).contains(&smoothing_factor) {
            return Err(DriftError::InvalidConfig(format!(
                "smoothing factor {smoothing_factor} outside [0, 1]"
            )));
        }
        if t.len() < 2 {
            return Err(DriftError::InsufficientSamples { distinct: t.len() });
        }
        if t
            .windows(2)
            .any(|p| p[1].partial_cmp(&p[0]) != Some(std::cmp::Ordering::Greater))
        {
            return Err(DriftError::InvalidConfig(
                "spline knots must be strictly increasing".into(),
            ));
        }

        let n = t.len();
        if n == 2 || smoothing_factor >= 1.0 {
            return Ok(Self::least_squares_line(t, y));
        }

        let h: Vec<f64> = t.windows(2).map(|p| p[1] - p[0]).collect();
        let m = n - 2;
        let mean_h = (t[n - 1] - t[0]) / (n - 1) as f64;
        let alpha = SMOOTHING_PENALTY_SCALE * mean_h.powi(3) * smoothing_factor
            / (1.0 - smoothing_factor);

        // Band of Qᵀ for interior knot j: rows j, j+1, j+2 of Q.
        let q = |j: usize| -> [f64; 3] {
            [1.0 / h[j], -1.0 / h[j] - 1.0 / h[j + 1], 1.0 / h[j + 1]]
        };

        // Symmetric pentadiagonal system (R + alpha QᵀQ) γ = Qᵀ y.
        let mut diag = vec![0.0; m];
        let mut off1 = vec![0.0; m.saturating_sub(1)];
        let mut off2 = vec![0.0; m.saturating_sub(2)];
        let mut rhs = vec![0.0; m];
        for j in 0..m {
            let qj = q(j);
            diag[j] = (h[j] + h[j + 1]) / 3.0
                + alpha * (qj[0] * qj[0] + qj[1] * qj[1] + qj[2] * qj[2]);
            rhs[j] = qj[0] * y[j] + qj[1] * y[j + 1] + qj[2] * y[j + 2];
            if j + 1 < m {
                let qn = q(j + 1);
                off1[j] = h[j + 1] / 6.0 + alpha * (qj[1] * qn[0] + qj[2] * qn[1]);
            }
            if j + 2 < m {
                let qnn = q(j + 2);
                off2[j] = alpha * qj[2] * qnn[0];
            }
        }

        let gamma = solve_pentadiagonal(&diag, &off1, &off2, &rhs);

        // g = y - alpha * Q γ
        let mut values = y.to_vec();
        for (j, &g) in gamma.iter().enumerate() {
            let qj = q(j);
            values[j] -= alpha * qj[0] * g;
            values[j + 1] -= alpha * qj[1] * g;
            values[j + 2] -= alpha * qj[2] * g;
        }

        let mut curvature = vec![0.0; n];
        curvature[1..n - 1].copy_from_slice(&gamma);

        Ok(Self {
            knots: t.to_vec(),
            values,
            curvature,
        })
    }

    fn least_squares_line(t: &[f64], y: &[f64]) -> Self {
        let n = t.len() as f64;
        let mean_t = t.iter().sum::<f64>() / n;
        let mean_y = y.iter().sum::<f64>() / n;
        let mut sxx = 0.0;
        let mut sxy = 0.0;
        for (&ti, &yi) in t.iter().zip(y) {
            sxx += (ti - mean_t) * (ti - mean_t);
            sxy += (ti - mean_t) * (yi - mean_y);
        }
        let slope = if sxx > 0.0 { sxy / sxx } else { 0.0 };
        Self {
            knots: t.to_vec(),
            values: t.iter().map(|&ti| mean_y + slope * (ti - mean_t)).collect(),
            curvature: vec![0.0; t.len()],
        }
    }

    pub fn knots(&self) -> &[f64] {
        &self.knots
    }

    /// Evaluate the spline at `t`.
    pub fn evaluate(&self, t: f64) -> f64 {
        let n = self.knots.len();
        let first = self.knots[0];
        let last = self.knots[n - 1];
        if t < first {
            return self.values[0] + self.end_slope(false) * (t - first);
        }
        if t > last {
            return self.values[n - 1] + self.end_slope(true) * (t - last);
        }

        let i = self.segment(t);
        let (t0, t1) = (self.knots[i], self.knots[i + 1]);
        let h = t1 - t0;
        let a = t - t0;
        let b = t1 - t;
        (a * self.values[i + 1] + b * self.values[i]) / h
            - a * b / 6.0
                * ((1.0 + a / h) * self.curvature[i + 1] + (1.0 + b / h) * self.curvature[i])
    }

    /// First derivative of the spline at `t`.
    pub fn derivative(&self, t: f64) -> f64 {
        let n = self.knots.len();
        if t < self.knots[0] {
            return self.end_slope(false);
        }
        if t > self.knots[n - 1] {
            return self.end_slope(true);
        }

        let i = self.segment(t);
        let (t0, t1) = (self.knots[i], self.knots[i + 1]);
        let h = t1 - t0;
        let a = t - t0;
        let b = t1 - t;
        let (c0, c1) = (self.curvature[i], self.curvature[i + 1]);
        (self.values[i + 1] - self.values[i]) / h
            + (c1 * (3.0 * a * a - h * h) - c0 * (3.0 * b * b - h * h)) / (6.0 * h)
    }

    /// Index of the segment `[knots[i], knots[i+1]]` containing `t`.
    fn segment(&self, t: f64) -> usize {
        let n = self.knots.len();
        match self.knots.partition_point(|&k| k <= t) {
            0 => 0,
            p if p >= n => n - 2,
            p => p - 1,
        }
    }

    fn end_slope(&self, upper: bool) -> f64 {
        let n = self.knots.len();
        if upper {
            let h = self.knots[n - 1] - self.knots[n - 2];
            (self.values[n - 1] - self.values[n - 2]) / h + h * self.curvature[n - 2] / 6.0
        } else {
            let h = self.knots[1] - self.knots[0];
            (self.values[1] - self.values[0]) / h - h * self.curvature[1] / 6.0
        }
    }
}

/// Solve a symmetric positive-definite pentadiagonal system by banded LDLᵀ.
///
/// `diag[i] = A[i][i]`, `off1[i] = A[i+1][i]`, `off2[i] = A[i+2][i]`.
fn solve_pentadiagonal(diag: &[f64], off1: &[f64], off2: &[f64], rhs: &[f64]) -> Vec<f64> {
    let m = diag.len();
    let mut d = vec![0.0; m];
    let mut l1 = vec![0.0; m];
    let mut l2 = vec![0.0; m];

    for i in 0..m {
        let mut di = diag[i];
        if i >= 1 {
            di -= l1[i - 1] * l1[i - 1] * d[i - 1];
        }
        if i >= 2 {
            di -= l2[i - 2] * l2[i - 2] * d[i - 2];
        }
        d[i] = di;
        if i + 1 < m {
            let mut v = off1[i];
            if i >= 1 {
                v -= l2[i - 1] * l1[i - 1] * d[i - 1];
            }
            l1[i] = v / di;
        }
        if i + 2 < m {
            l2[i] = off2[i] / di;
        }
    }

    let mut z = rhs.to_vec();
    for i in 0..m {
        if i >= 1 {
            z[i] -= l1[i - 1] * z[i - 1];
        }
        if i >= 2 {
            z[i] -= l2[i - 2] * z[i - 2];
        }
    }
    for i in 0..m {
        z[i] /= d[i];
    }
    for i in (0..m).rev() {
        if i + 1 < m {
            z[i] -= l1[i] * z[i + 1];
        }
        if i + 2 < m {
            z[i] -= l2[i] * z[i + 2];
        }
    }
    z
}
