use ndarray::Array2;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// A single grayscale image frame.
/// Pixel values are f32 in [0.0, 1.0].
#[derive(Clone, Debug)]
pub struct Frame {
    /// Pixel data, row-major, shape = (height, width)
    pub data: Array2<f32>,
    /// Original bit depth of the samples (8 or 16 for integer data, 32 for float)
    pub original_bit_depth: u8,
    /// Position of the frame in its stack
    pub frame_index: usize,
}

impl Frame {
    pub fn new(data: Array2<f32>, bit_depth: u8) -> Self {
        Self {
            data,
            original_bit_depth: bit_depth,
            frame_index: 0,
        }
    }

    pub fn with_index(mut self, index: usize) -> Self {
        self.frame_index = index;
        self
    }

    pub fn width(&self) -> usize {
        self.data.ncols()
    }

    pub fn height(&self) -> usize {
        self.data.nrows()
    }

    /// (height, width)
    pub fn dim(&self) -> (usize, usize) {
        self.data.dim()
    }

    /// Whether the source pixel type is an integer type.
    pub fn is_integer(&self) -> bool {
        (1..=16).contains(&self.original_bit_depth)
    }

    /// Round every sample to the nearest level representable at the original
    /// integer bit depth. Float frames are returned unchanged.
    pub fn quantized(mut self) -> Self {
        if self.is_integer() {
            let max_val = ((1u32 << self.original_bit_depth) - 1) as f32;
            self.data
                .mapv_inplace(|v| (v * max_val).round().clamp(0.0, max_val) / max_val);
        }
        self
    }
}

/// One observed displacement of the imaged content at `frame_index`,
/// relative to the zero-drift origin of the run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ShiftSample {
    pub frame_index: usize,
    pub dy: f64,
    pub dx: f64,
}

impl ShiftSample {
    pub fn new(frame_index: usize, dy: f64, dx: f64) -> Self {
        Self { frame_index, dy, dx }
    }

    /// Euclidean length of the displacement.
    pub fn magnitude(&self) -> f64 {
        self.dy.hypot(self.dx)
    }
}

/// A manually placed position of one physical feature in one frame.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct PointAnnotation {
    #[serde(rename = "frame")]
    pub frame_index: usize,
    pub x: f64,
    pub y: f64,
}

impl PointAnnotation {
    pub fn new(frame_index: usize, x: f64, y: f64) -> Self {
        Self { frame_index, x, y }
    }
}

/// Subpixel registration result between a reference and a candidate frame.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Registration {
    /// Displacement of the candidate content relative to the reference (rows).
    pub dy: f64,
    /// Displacement of the candidate content relative to the reference (columns).
    pub dx: f64,
    /// Normalized RMS registration error in [0, 1].
    pub error: f64,
}

/// Metadata about a frame source.
#[derive(Clone, Debug)]
pub struct SourceInfo {
    pub filename: PathBuf,
    pub total_frames: usize,
    pub width: u32,
    pub height: u32,
    pub bit_depth: u8,
    pub observer: Option<String>,
    pub telescope: Option<String>,
    pub instrument: Option<String>,
}
