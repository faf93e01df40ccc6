use ndarray::{Array2, ArrayViewMut1};
use num_complex::Complex;
use rayon::prelude::*;
use rustfft::{FftDirection, FftPlanner};

use crate::consts::{CROSS_POWER_RELATIVE_FLOOR, PARALLEL_PIXEL_THRESHOLD};
use crate::error::{DriftError, Result};
use crate::frame::{Frame, Registration};

use super::subpixel::{refine_upsampled, registration_error};

/// Register `candidate` against `reference` by phase correlation.
///
/// Returns the displacement of the candidate's content relative to the
/// reference (a reference translated by `(sy, sx)` yields `(sy, sx)`),
/// resolved to `1 / upsample_factor` pixel, and the normalized RMS
/// registration error. `upsample_factor <= 1` keeps the integer peak.
pub fn register_arrays(
    reference: &Array2<f32>,
    candidate: &Array2<f32>,
    upsample_factor: usize,
) -> Result<Registration> {
    let (h, w) = reference.dim();
    if candidate.dim() != (h, w) {
        return Err(DriftError::DimensionMismatch {
            expected: (h, w),
            found: candidate.dim(),
        });
    }
    if h == 0 || w == 0 {
        return Err(DriftError::InvalidDimensions {
            width: w as u32,
            height: h as u32,
        });
    }

    let ref_fft = fft2d_forward(reference);
    let cand_fft = fft2d_forward(candidate);

    let cross = cross_power(&cand_fft, &ref_fft);
    let normalized = normalize_phase(&cross);
    let correlation = ifft2d(&normalized);

    let (peak_row, peak_col, _) = find_peak(&correlation);
    let coarse_dy = signed_offset(peak_row, h);
    let coarse_dx = signed_offset(peak_col, w);

    let (dy, dx) = if upsample_factor > 1 {
        refine_upsampled(&normalized, coarse_dy, coarse_dx, upsample_factor)
    } else {
        (coarse_dy, coarse_dx)
    };

    let error = registration_error(&cross, &ref_fft, &cand_fft, dy, dx);

    Ok(Registration { dy, dx, error })
}

/// Register two frames. See [`register_arrays`].
pub fn register(reference: &Frame, candidate: &Frame, upsample_factor: usize) -> Result<Registration> {
    register_arrays(&reference.data, &candidate.data, upsample_factor)
}

/// 2D forward FFT: row-wise FFT, then column-wise FFT.
pub fn fft2d_forward(data: &Array2<f32>) -> Array2<Complex<f64>> {
    let mut spectrum = data.mapv(|v| Complex::new(v as f64, 0.0));
    fft2d_in_place(&mut spectrum, FftDirection::Forward);
    spectrum
}

/// Inverse 2D FFT, scaled by `1 / (h * w)`.
pub fn ifft2d(spectrum: &Array2<Complex<f64>>) -> Array2<Complex<f64>> {
    let (h, w) = spectrum.dim();
    let mut work = spectrum.clone();
    fft2d_in_place(&mut work, FftDirection::Inverse);
    let scale = 1.0 / (h * w) as f64;
    work.mapv_inplace(|c| c * scale);
    work
}

fn fft2d_in_place(data: &mut Array2<Complex<f64>>, direction: FftDirection) {
    let (h, w) = data.dim();
    let mut planner = FftPlanner::new();
    let fft_row = planner.plan_fft(w, direction);
    let fft_col = planner.plan_fft(h, direction);

    let mut buf: Vec<Complex<f64>> = Vec::with_capacity(h.max(w));
    let mut run = |mut lane: ArrayViewMut1<Complex<f64>>, fft: &dyn rustfft::Fft<f64>| {
        buf.clear();
        buf.extend(lane.iter().copied());
        fft.process(&mut buf);
        for (dst, src) in lane.iter_mut().zip(&buf) {
            *dst = *src;
        }
    };

    for row in data.rows_mut() {
        run(row, fft_row.as_ref());
    }
    for col in data.columns_mut() {
        run(col, fft_col.as_ref());
    }
}

/// Cross-power spectrum `candidate * conj(reference)`.
///
/// Its inverse transform peaks at the displacement of the candidate.
pub fn cross_power(
    cand_fft: &Array2<Complex<f64>>,
    ref_fft: &Array2<Complex<f64>>,
) -> Array2<Complex<f64>> {
    ndarray::Zip::from(cand_fft)
        .and(ref_fft)
        .map_collect(|c, r| *c * r.conj())
}

/// Normalize every cross-power bin to unit magnitude.
///
/// Bins below a relative floor carry only rounding noise and are zeroed
/// instead of being amplified.
pub fn normalize_phase(cross: &Array2<Complex<f64>>) -> Array2<Complex<f64>> {
    let max_mag = cross.iter().map(|c| c.norm()).fold(0.0f64, f64::max);
    let floor = (max_mag * CROSS_POWER_RELATIVE_FLOOR).max(1e-300);
    cross.mapv(|c| {
        let mag = c.norm();
        if mag > floor {
            c / mag
        } else {
            Complex::new(0.0, 0.0)
        }
    })
}

/// Location and magnitude of the strongest bin of a correlation surface.
pub fn find_peak(data: &Array2<Complex<f64>>) -> (usize, usize, f64) {
    let mut best = (0, 0, f64::NEG_INFINITY);
    for ((row, col), v) in data.indexed_iter() {
        let mag = v.norm();
        if mag > best.2 {
            best = (row, col, mag);
        }
    }
    best
}

/// Convert a circular peak index into a signed shift.
pub fn signed_offset(peak: usize, n: usize) -> f64 {
    if peak > n / 2 {
        peak as f64 - n as f64
    } else {
        peak as f64
    }
}

/// Sample `data` at a fractional position. Out-of-bounds neighbours read as 0.
pub fn bilinear_sample(data: &Array2<f32>, y: f64, x: f64) -> f32 {
    let (h, w) = data.dim();

    let x0 = x.floor() as i64;
    let y0 = y.floor() as i64;
    let x1 = x0 + 1;
    let y1 = y0 + 1;

    let fx = (x - x0 as f64) as f32;
    let fy = (y - y0 as f64) as f32;

    let sample = |r: i64, c: i64| -> f32 {
        if r >= 0 && r < h as i64 && c >= 0 && c < w as i64 {
            data[[r as usize, c as usize]]
        } else {
            0.0
        }
    };

    let v00 = sample(y0, x0);
    let v10 = sample(y0, x1);
    let v01 = sample(y1, x0);
    let v11 = sample(y1, x1);

    v00 * (1.0 - fx) * (1.0 - fy)
        + v10 * fx * (1.0 - fy)
        + v01 * (1.0 - fx) * fy
        + v11 * fx * fy
}

/// Translate the content of `data` by `(dy, dx)` with bilinear interpolation.
///
/// Pixels uncovered by the translation are filled with 0.
pub fn shift_array(data: &Array2<f32>, dy: f64, dx: f64) -> Array2<f32> {
    let (h, w) = data.dim();
    let sample_row = |row: usize| -> Vec<f32> {
        (0..w)
            .map(|col| bilinear_sample(data, row as f64 - dy, col as f64 - dx))
            .collect()
    };

    if h * w >= PARALLEL_PIXEL_THRESHOLD {
        let rows: Vec<Vec<f32>> = (0..h).into_par_iter().map(sample_row).collect();
        Array2::from_shape_fn((h, w), |(r, c)| rows[r][c])
    } else {
        Array2::from_shape_fn((h, w), |(r, c)| {
            bilinear_sample(data, r as f64 - dy, c as f64 - dx)
        })
    }
}

/// Translate a frame's content by `(dy, dx)`. See [`shift_array`].
pub fn shift_frame(frame: &Frame, dy: f64, dx: f64) -> Frame {
    Frame::new(shift_array(&frame.data, dy, dx), frame.original_bit_depth)
        .with_index(frame.frame_index)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn signed_offset_wraps_upper_half() {
        assert_eq!(signed_offset(0, 64), 0.0);
        assert_eq!(signed_offset(32, 64), 32.0);
        assert_eq!(signed_offset(33, 64), -31.0);
        assert_eq!(signed_offset(63, 64), -1.0);
    }

    #[test]
    fn fft_round_trip_restores_input() {
        let data = Array2::from_shape_fn((6, 10), |(r, c)| ((r * 3 + c * 7) % 5) as f32);
        let back = ifft2d(&fft2d_forward(&data));
        for (a, b) in data.iter().zip(back.iter()) {
            assert!((*a as f64 - b.re).abs() < 1e-9);
            assert!(b.im.abs() < 1e-9);
        }
    }

    #[test]
    fn find_peak_locates_maximum() {
        let mut data = Array2::<Complex<f64>>::zeros((5, 5));
        data[[3, 1]] = Complex::new(2.0, 0.0);
        assert_eq!(find_peak(&data), (3, 1, 2.0));
    }

    #[test]
    fn find_peak_ranks_by_magnitude() {
        let mut data = Array2::<Complex<f64>>::zeros((5, 5));
        data[[0, 4]] = Complex::new(1.5, 0.0);
        data[[2, 2]] = Complex::new(0.0, -3.0);
        assert_eq!(find_peak(&data), (2, 2, 3.0));
    }
}
