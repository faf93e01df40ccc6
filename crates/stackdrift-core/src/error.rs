use thiserror::Error;

#[derive(Error, Debug)]
pub enum DriftError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid SER file: {0}")]
    InvalidSer(String),

    #[error("Invalid image dimensions: {width}x{height}")]
    InvalidDimensions { width: u32, height: u32 },

    #[error("Frame index {index} out of range (total: {total})")]
    FrameIndexOutOfRange { index: usize, total: usize },

    #[error("Unsupported color mode: {0}")]
    UnsupportedColorMode(String),

    #[error("Invalid TIFF stack: {0}")]
    InvalidTiff(String),

    #[error("TIFF error: {0}")]
    Tiff(#[from] tiff::TiffError),

    #[error("Image format error: {0}")]
    ImageError(#[from] image::ImageError),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Frame dimension mismatch: expected {}x{}, found {}x{}", expected.1, expected.0, found.1, found.0)]
    DimensionMismatch {
        /// (height, width) of the reference.
        expected: (usize, usize),
        /// (height, width) of the offending frame.
        found: (usize, usize),
    },

    #[error("Need at least 2 distinct frame indices to fit a trajectory, got {distinct}")]
    InsufficientSamples { distinct: usize },

    #[error("Stack has {frames} frame(s); drift estimation needs at least 2")]
    EmptyStack { frames: usize },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

pub type Result<T> = std::result::Result<T, DriftError>;
