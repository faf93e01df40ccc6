pub mod phase_correlation;
pub mod subpixel;

pub use phase_correlation::{bilinear_sample, register, register_arrays, shift_array, shift_frame};
