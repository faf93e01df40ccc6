use std::path::{Path, PathBuf};

use image::{ColorType, DynamicImage, GrayImage, ImageFormat, Luma};
use ndarray::Array2;

use crate::error::{DriftError, Result};
use crate::frame::{Frame, SourceInfo};

use super::source::FrameSource;

/// File extensions recognized as single-frame images.
const IMAGE_EXTENSIONS: [&str; 4] = ["tif", "tiff", "png", "jpg"];

/// Save a frame as 16-bit grayscale TIFF.
pub fn save_tiff(frame: &Frame, path: &Path) -> Result<()> {
    let pixels: Vec<u16> = frame
        .data
        .iter()
        .map(|&v| (v.clamp(0.0, 1.0) * 65535.0).round() as u16)
        .collect();

    let img = image::ImageBuffer::<Luma<u16>, Vec<u16>>::from_raw(
        frame.width() as u32,
        frame.height() as u32,
        pixels,
    )
    .ok_or(DriftError::InvalidDimensions {
        width: frame.width() as u32,
        height: frame.height() as u32,
    })?;
    img.save_with_format(path, ImageFormat::Tiff)?;
    Ok(())
}

/// Save a frame as 8-bit grayscale PNG.
pub fn save_png(frame: &Frame, path: &Path) -> Result<()> {
    let h = frame.height();
    let w = frame.width();

    let mut img = GrayImage::new(w as u32, h as u32);
    for ((row, col), &v) in frame.data.indexed_iter() {
        let val = (v.clamp(0.0, 1.0) * 255.0).round() as u8;
        img.put_pixel(col as u32, row as u32, Luma([val]));
    }

    img.save_with_format(path, ImageFormat::Png)?;
    Ok(())
}

/// Save frame, choosing format from file extension.
pub fn save_image(frame: &Frame, path: &Path) -> Result<()> {
    match path.extension().and_then(|e| e.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case("png") => save_png(frame, path),
        _ => save_tiff(frame, path),
    }
}

/// Load a grayscale image file into a Frame.
///
/// Colour images are reduced to luminance. The bit depth records the sample
/// type of the file (8, 16, or 32 for float).
pub fn load_image(path: &Path) -> Result<Frame> {
    let img = image::open(path)?;
    let bit_depth = bit_depth_of(&img);

    let data = if bit_depth == 32 {
        let gray = img.to_luma32f();
        let (w, h) = gray.dimensions();
        Array2::from_shape_fn((h as usize, w as usize), |(row, col)| {
            gray.get_pixel(col as u32, row as u32).0[0]
        })
    } else {
        let gray = img.to_luma16();
        let (w, h) = gray.dimensions();
        Array2::from_shape_fn((h as usize, w as usize), |(row, col)| {
            gray.get_pixel(col as u32, row as u32).0[0] as f32 / 65535.0
        })
    };

    Ok(Frame::new(data, bit_depth))
}

fn bit_depth_of(img: &DynamicImage) -> u8 {
    match img.color() {
        ColorType::L8 | ColorType::La8 | ColorType::Rgb8 | ColorType::Rgba8 => 8,
        ColorType::L16 | ColorType::La16 | ColorType::Rgb16 | ColorType::Rgba16 => 16,
        _ => 32,
    }
}

/// A directory of single-frame images, ordered by file name and decoded
/// on demand.
pub struct ImageSequence {
    paths: Vec<PathBuf>,
    dims: (usize, usize),
    bit_depth: u8,
}

impl ImageSequence {
    /// Scan `dir` for image files. The first image fixes the stack shape.
    pub fn open(dir: &Path) -> Result<Self> {
        let mut paths: Vec<PathBuf> = std::fs::read_dir(dir)?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|p| p.is_file() && is_image_path(p))
            .collect();
        paths.sort();

        let (dims, bit_depth) = match paths.first() {
            Some(first) => {
                let frame = load_image(first)?;
                (frame.dim(), frame.original_bit_depth)
            }
            None => ((0, 0), 32),
        };

        Ok(Self {
            paths,
            dims,
            bit_depth,
        })
    }

    pub fn paths(&self) -> &[PathBuf] {
        &self.paths
    }

    pub fn source_info(&self, dir: &Path) -> SourceInfo {
        SourceInfo {
            filename: dir.to_path_buf(),
            total_frames: self.paths.len(),
            width: self.dims.1 as u32,
            height: self.dims.0 as u32,
            bit_depth: self.bit_depth,
            observer: None,
            telescope: None,
            instrument: None,
        }
    }
}

impl FrameSource for ImageSequence {
    fn frame_count(&self) -> usize {
        self.paths.len()
    }

    fn dimensions(&self) -> (usize, usize) {
        self.dims
    }

    fn bit_depth(&self) -> u8 {
        self.bit_depth
    }

    fn read_frame(&self, index: usize) -> Result<Frame> {
        let path = self
            .paths
            .get(index)
            .ok_or(DriftError::FrameIndexOutOfRange {
                index,
                total: self.paths.len(),
            })?;
        let frame = load_image(path)?;
        if frame.dim() != self.dims {
            return Err(DriftError::DimensionMismatch {
                expected: self.dims,
                found: frame.dim(),
            });
        }
        Ok(frame.with_index(index))
    }
}

fn is_image_path(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| IMAGE_EXTENSIONS.contains(&e.to_ascii_lowercase().as_str()))
        .unwrap_or(false)
}

/// Output file name for frame `index` of a sequence, e.g. `frame_00042.tif`.
pub fn sequence_file_name(index: usize, extension: &str) -> String {
    format!("frame_{index:05}.{extension}")
}

/// Write frames as a numbered image sequence inside `dir` (created if needed).
///
/// Returns the number of frames written.
pub fn write_image_sequence<I>(dir: &Path, frames: I, extension: &str) -> Result<usize>
where
    I: IntoIterator<Item = Result<Frame>>,
{
    std::fs::create_dir_all(dir)?;
    let mut written = 0;
    for (i, frame) in frames.into_iter().enumerate() {
        let frame = frame?;
        save_image(&frame, &dir.join(sequence_file_name(i, extension)))?;
        written += 1;
    }
    Ok(written)
}
