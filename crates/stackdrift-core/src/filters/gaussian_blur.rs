use ndarray::{Array2, Axis};
use rayon::prelude::*;

use crate::consts::PARALLEL_PIXEL_THRESHOLD;
use crate::frame::Frame;

/// Apply Gaussian blur to a frame using separable 1D convolution.
///
/// Edges are clamped. A non-positive sigma returns an unchanged copy.
pub fn gaussian_blur(frame: &Frame, sigma: f32) -> Frame {
    let blurred = gaussian_blur_array(&frame.data, sigma);
    Frame::new(blurred, frame.original_bit_depth).with_index(frame.frame_index)
}

/// Apply Gaussian blur to a raw array.
pub fn gaussian_blur_array(data: &Array2<f32>, sigma: f32) -> Array2<f32> {
    if sigma.is_nan() || sigma <= 0.0 {
        return data.clone();
    }
    let kernel = gaussian_kernel(sigma);
    let row_pass = convolve_axis(data, &kernel, Axis(1));
    convolve_axis(&row_pass, &kernel, Axis(0))
}

/// Kernel half-width in standard deviations.
const TRUNCATE: f32 = 4.0;

/// Normalized, symmetric sampled Gaussian of radius `round(TRUNCATE * sigma)`.
fn gaussian_kernel(sigma: f32) -> Vec<f32> {
    let radius = (TRUNCATE * sigma + 0.5) as isize;
    let weights: Vec<f32> = (-radius..=radius)
        .map(|x| (-0.5 * (x as f32 / sigma).powi(2)).exp())
        .collect();
    let total: f32 = weights.iter().sum();
    weights.into_iter().map(|w| w / total).collect()
}

/// Convolve every lane along `axis` (Axis(1) = rows, Axis(0) = columns).
fn convolve_axis(data: &Array2<f32>, kernel: &[f32], axis: Axis) -> Array2<f32> {
    let (h, w) = data.dim();
    let radius = kernel.len() as isize / 2;
    let along_cols = axis == Axis(0);

    let output_row = |row: usize| -> Vec<f32> {
        (0..w)
            .map(|col| {
                let mut sum = 0.0f32;
                for (ki, &kv) in kernel.iter().enumerate() {
                    let off = ki as isize - radius;
                    let v = if along_cols {
                        let r = (row as isize + off).clamp(0, h as isize - 1) as usize;
                        data[[r, col]]
                    } else {
                        let c = (col as isize + off).clamp(0, w as isize - 1) as usize;
                        data[[row, c]]
                    };
                    sum += v * kv;
                }
                sum
            })
            .collect()
    };

    let rows: Vec<Vec<f32>> = if h * w >= PARALLEL_PIXEL_THRESHOLD {
        (0..h).into_par_iter().map(output_row).collect()
    } else {
        (0..h).map(output_row).collect()
    };

    Array2::from_shape_vec((h, w), rows.concat()).unwrap_or_else(|_| data.clone())
}
