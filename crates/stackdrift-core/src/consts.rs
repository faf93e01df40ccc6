/// Minimum pixel count (h*w) to use row-level Rayon parallelism.
pub const PARALLEL_PIXEL_THRESHOLD: usize = 65_536;

/// Minimum frame count to use frame-level Rayon parallelism.
pub const PARALLEL_FRAME_THRESHOLD: usize = 4;

/// Default upsampling factor for subpixel phase correlation.
/// 100 resolves offsets to 1/100 pixel.
pub const DEFAULT_UPSAMPLE_FACTOR: usize = 100;

/// Default Gaussian prefilter sigma (pixels) applied before registration.
pub const DEFAULT_PREFILTER_SIGMA: f32 = 2.0;

/// Default number of frames measured against one reference before it is
/// replaced by a motion-compensated candidate.
pub const DEFAULT_UPDATE_THRESHOLD: usize = 10;

/// Default trajectory smoothing factor in [0, 1].
pub const DEFAULT_SMOOTHING_FACTOR: f64 = 0.8;

/// Roughness penalty weight of the trajectory spline, relative to the cube of
/// the mean knot spacing. At 20 a single-frame spike at either end of the
/// stack is pulled toward the trend for smoothing factors from 0.7 up.
pub const SMOOTHING_PENALTY_SCALE: f64 = 20.0;

/// Width (in pixels) of the neighbourhood around the coarse correlation peak
/// that is evaluated by the upsampled DFT.
pub const UPSAMPLE_SEARCH_WINDOW: f64 = 1.5;

/// Cross-power bins weaker than this fraction of the strongest bin are
/// dropped before phase normalization. They carry rounding noise only.
pub const CROSS_POWER_RELATIVE_FLOOR: f64 = 1e-12;

/// Frames corrected per parallel batch when writing a corrected stack.
pub const CORRECTION_CHUNK_FRAMES: usize = 64;

/// Default file extension for image-sequence output.
pub const DEFAULT_SEQUENCE_EXTENSION: &str = "tif";
