#![allow(dead_code)]

use ndarray::Array2;
use stackdrift_core::io::ser::SER_HEADER_SIZE;
use stackdrift_core::{Frame, MemoryStack};

/// Blob centres (row, col) and amplitudes of the synthetic scene.
const BLOBS: [(f64, f64, f64); 6] = [
    (30.0, 28.0, 0.9),
    (36.0, 62.0, 0.6),
    (58.0, 40.0, 0.75),
    (66.0, 70.0, 0.5),
    (48.0, 52.0, 0.35),
    (70.0, 30.0, 0.45),
];

/// Render the synthetic scene with its content displaced by `(dy, dx)`.
///
/// The scene is a sum of Gaussian blobs, at least 20 px from the border of a
/// 96x96 frame for displacements up to a few pixels, on a zero background.
pub fn render_scene(dy: f64, dx: f64, blob_sigma: f64) -> Array2<f32> {
    let s2 = 2.0 * blob_sigma * blob_sigma;
    Array2::from_shape_fn((96, 96), |(r, c)| {
        let v: f64 = BLOBS
            .iter()
            .map(|&(br, bc, amp)| {
                let y = r as f64 - (br + dy);
                let x = c as f64 - (bc + dx);
                amp * (-(y * y + x * x) / s2).exp()
            })
            .sum();
        v.min(1.0) as f32
    })
}

/// A float stack whose content drifts by `drift(i)` at frame `i`.
pub fn drifting_stack<F>(frames: usize, blob_sigma: f64, drift: F) -> MemoryStack
where
    F: Fn(usize) -> (f64, f64),
{
    let frames = (0..frames)
        .map(|i| {
            let (dy, dx) = drift(i);
            Frame::new(render_scene(dy, dx, blob_sigma), 32)
        })
        .collect();
    MemoryStack::new(frames).expect("uniform stack")
}

/// Largest absolute difference over the pixels at least `margin` from the
/// border.
pub fn max_interior_diff(a: &Array2<f32>, b: &Array2<f32>, margin: usize) -> f32 {
    let (h, w) = a.dim();
    let mut worst = 0.0f32;
    for r in margin..h - margin {
        for c in margin..w - margin {
            worst = worst.max((a[[r, c]] - b[[r, c]]).abs());
        }
    }
    worst
}

/// Build a SER file header with configurable bit depth and color mode.
pub fn build_ser_header_full(
    width: u32,
    height: u32,
    bit_depth: u32,
    num_frames: usize,
    color_id: i32,
) -> Vec<u8> {
    let mut buf = Vec::with_capacity(SER_HEADER_SIZE);

    // Magic (14 bytes)
    buf.extend_from_slice(b"LUCAM-RECORDER");
    // LuID (4 bytes)
    buf.extend_from_slice(&0i32.to_le_bytes());
    // ColorID (4 bytes)
    buf.extend_from_slice(&color_id.to_le_bytes());
    // LittleEndian = 0 (little-endian per Siril convention)
    buf.extend_from_slice(&0i32.to_le_bytes());
    buf.extend_from_slice(&(width as i32).to_le_bytes());
    buf.extend_from_slice(&(height as i32).to_le_bytes());
    buf.extend_from_slice(&(bit_depth as i32).to_le_bytes());
    buf.extend_from_slice(&(num_frames as i32).to_le_bytes());
    // Observer, Instrument, Telescope (40 bytes each)
    buf.extend_from_slice(&[0u8; 120]);
    // DateTime, DateTimeUTC
    buf.extend_from_slice(&0u64.to_le_bytes());
    buf.extend_from_slice(&0u64.to_le_bytes());

    assert_eq!(buf.len(), SER_HEADER_SIZE);
    buf
}

/// Write a buffer to a temporary file and return the handle.
///
/// The file stays alive as long as the returned `NamedTempFile` is not dropped.
pub fn write_temp(data: &[u8]) -> tempfile::NamedTempFile {
    use std::io::Write;
    let mut f = tempfile::NamedTempFile::new().expect("create temp file");
    f.write_all(data).expect("write data");
    f.flush().expect("flush");
    f
}
