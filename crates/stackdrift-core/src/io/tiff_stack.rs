use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use std::sync::Mutex;

use ndarray::Array2;
use tiff::decoder::{Decoder, DecodingResult, Limits};
use tiff::encoder::{colortype, TiffEncoder};
use tiff::ColorType;

use crate::error::{DriftError, Result};
use crate::frame::{Frame, SourceInfo};

use super::source::FrameSource;

/// A multi-page TIFF holding one frame per page.
///
/// Opening walks the page directories once to count pages and check that
/// they share one shape and sample type. Pixel data is decoded per page on
/// demand. The decoder is shared behind a lock, so concurrent reads are
/// serialized.
pub struct MultiPageTiff {
    decoder: Mutex<Decoder<BufReader<File>>>,
    pages: usize,
    dims: (usize, usize),
    color: ColorType,
}

impl MultiPageTiff {
    pub fn open(path: &Path) -> Result<Self> {
        // Planetary captures easily exceed the default decoder limits.
        let mut decoder =
            Decoder::new(BufReader::new(File::open(path)?))?.with_limits(Limits::unlimited());

        let color = decoder.colortype()?;
        check_sample_type(color)?;
        let dims = page_dims(&mut decoder)?;

        let mut pages = 1;
        while decoder.more_images() {
            decoder.next_image()?;
            let found = page_dims(&mut decoder)?;
            if found != dims {
                return Err(DriftError::DimensionMismatch {
                    expected: dims,
                    found,
                });
            }
            let page_color = decoder.colortype()?;
            if page_color != color {
                return Err(DriftError::InvalidTiff(format!(
                    "page {pages} is {page_color:?}, page 0 is {color:?}"
                )));
            }
            pages += 1;
        }

        Ok(Self {
            decoder: Mutex::new(decoder),
            pages,
            dims,
            color,
        })
    }

    pub fn source_info(&self, path: &Path) -> SourceInfo {
        SourceInfo {
            filename: path.to_path_buf(),
            total_frames: self.pages,
            width: self.dims.1 as u32,
            height: self.dims.0 as u32,
            bit_depth: self.bit_depth(),
            observer: None,
            telescope: None,
            instrument: None,
        }
    }

    fn decode_page(&self, index: usize) -> Result<DecodingResult> {
        let mut decoder = self
            .decoder
            .lock()
            .map_err(|_| DriftError::InvalidTiff("decoder lock poisoned".into()))?;
        decoder.seek_to_image(index)?;
        Ok(decoder.read_image()?)
    }
}

impl FrameSource for MultiPageTiff {
    fn frame_count(&self) -> usize {
        self.pages
    }

    fn dimensions(&self) -> (usize, usize) {
        self.dims
    }

    fn bit_depth(&self) -> u8 {
        match self.color {
            ColorType::Gray(bits) | ColorType::RGB(bits) => bits,
            _ => 32,
        }
    }

    fn read_frame(&self, index: usize) -> Result<Frame> {
        if index >= self.pages {
            return Err(DriftError::FrameIndexOutOfRange {
                index,
                total: self.pages,
            });
        }
        let samples = to_unit_range(self.decode_page(index)?)?;
        let samples = match self.color {
            ColorType::RGB(_) => samples
                .chunks_exact(3)
                .map(|p| 0.2126 * p[0] + 0.7152 * p[1] + 0.0722 * p[2])
                .collect(),
            _ => samples,
        };
        let data = Array2::from_shape_vec(self.dims, samples)
            .map_err(|e| DriftError::InvalidTiff(format!("page {index} shape: {e}")))?;
        Ok(Frame::new(data, self.bit_depth()).with_index(index))
    }
}

fn page_dims(decoder: &mut Decoder<BufReader<File>>) -> Result<(usize, usize)> {
    let (width, height) = decoder.dimensions()?;
    if width == 0 || height == 0 {
        return Err(DriftError::InvalidDimensions { width, height });
    }
    Ok((height as usize, width as usize))
}

/// Gray or RGB pages with 8/16-bit integer or 32-bit float samples.
fn check_sample_type(color: ColorType) -> Result<()> {
    match color {
        ColorType::Gray(8 | 16 | 32) | ColorType::RGB(8 | 16 | 32) => Ok(()),
        other => Err(DriftError::UnsupportedColorMode(format!("TIFF {other:?}"))),
    }
}

fn to_unit_range(page: DecodingResult) -> Result<Vec<f32>> {
    match page {
        DecodingResult::U8(buf) => Ok(buf.iter().map(|&v| v as f32 / 255.0).collect()),
        DecodingResult::U16(buf) => Ok(buf.iter().map(|&v| v as f32 / 65535.0).collect()),
        DecodingResult::F32(buf) => Ok(buf),
        other => Err(DriftError::InvalidTiff(format!(
            "unsupported sample format {}",
            sample_format_name(&other)
        ))),
    }
}

fn sample_format_name(page: &DecodingResult) -> &'static str {
    match page {
        DecodingResult::U8(_) => "u8",
        DecodingResult::U16(_) => "u16",
        DecodingResult::U32(_) => "u32",
        DecodingResult::U64(_) => "u64",
        DecodingResult::I8(_) => "i8",
        DecodingResult::I16(_) => "i16",
        DecodingResult::I32(_) => "i32",
        DecodingResult::I64(_) => "i64",
        DecodingResult::F32(_) => "f32",
        _ => "float",
    }
}

/// Streams normalized frames into a multi-page 16-bit grayscale TIFF, one
/// page per frame.
pub struct TiffStackWriter {
    encoder: TiffEncoder<File>,
    dims: (usize, usize),
    written: usize,
}

impl TiffStackWriter {
    pub fn create(path: &Path, height: usize, width: usize) -> Result<Self> {
        if width == 0 || height == 0 || width > u32::MAX as usize || height > u32::MAX as usize {
            return Err(DriftError::InvalidDimensions {
                width: width.min(u32::MAX as usize) as u32,
                height: height.min(u32::MAX as usize) as u32,
            });
        }
        Ok(Self {
            encoder: TiffEncoder::new(File::create(path)?)?,
            dims: (height, width),
            written: 0,
        })
    }

    pub fn write_frame(&mut self, frame: &Frame) -> Result<()> {
        if frame.dim() != self.dims {
            return Err(DriftError::DimensionMismatch {
                expected: self.dims,
                found: frame.dim(),
            });
        }
        let pixels: Vec<u16> = frame
            .data
            .iter()
            .map(|&v| (v.clamp(0.0, 1.0) * 65535.0).round() as u16)
            .collect();
        self.encoder.write_image::<colortype::Gray16>(
            self.dims.1 as u32,
            self.dims.0 as u32,
            &pixels,
        )?;
        self.written += 1;
        Ok(())
    }

    pub fn frames_written(&self) -> usize {
        self.written
    }
}

/// True for `.tif` / `.tiff` file names, case-insensitively.
pub fn is_tiff_path(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("tif") || e.eq_ignore_ascii_case("tiff"))
}
