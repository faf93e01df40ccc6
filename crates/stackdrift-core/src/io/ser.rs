use std::fs::File;
use std::io::{Cursor, Read, Write};
use std::path::Path;

use byteorder::{BigEndian, ByteOrder, LittleEndian, ReadBytesExt, WriteBytesExt};
use memmap2::Mmap;
use ndarray::Array2;

use crate::error::{DriftError, Result};
use crate::frame::{Frame, SourceInfo};

use super::source::FrameSource;

pub const SER_HEADER_SIZE: usize = 178;
pub const SER_MAGIC: &[u8; 14] = b"LUCAM-RECORDER";

const SER_COLOR_MONO: i32 = 0;
const SER_TEXT_FIELD: usize = 40;

/// The parts of a SER header a mono drift run needs.
///
/// Timestamps are not kept; the writer emits zeros for them.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SerHeader {
    pub color_id: i32,
    /// Byte order of 16-bit samples. The on-disk flag is 0 for little-endian.
    pub little_endian: bool,
    pub width: u32,
    pub height: u32,
    pub pixel_depth: u32,
    pub frame_count: u32,
    pub observer: String,
    pub instrument: String,
    pub telescope: String,
}

impl SerHeader {
    /// Header for a little-endian mono stack.
    pub fn mono(width: u32, height: u32, pixel_depth: u32, frame_count: u32) -> Self {
        Self {
            color_id: SER_COLOR_MONO,
            little_endian: true,
            width,
            height,
            pixel_depth,
            frame_count,
            observer: String::new(),
            instrument: String::new(),
            telescope: String::new(),
        }
    }

    pub fn bytes_per_pixel(&self) -> usize {
        if self.pixel_depth > 8 {
            2
        } else {
            1
        }
    }

    pub fn frame_byte_size(&self) -> usize {
        self.width as usize * self.height as usize * self.bytes_per_pixel()
    }

    /// Header plus all frame payloads, or `None` if that overflows `usize`.
    fn stack_byte_size(&self) -> Option<usize> {
        (self.width as usize)
            .checked_mul(self.height as usize)?
            .checked_mul(self.bytes_per_pixel())?
            .checked_mul(self.frame_count as usize)?
            .checked_add(SER_HEADER_SIZE)
    }

    fn parse(buf: &[u8]) -> Result<Self> {
        if buf.len() < SER_HEADER_SIZE || &buf[..SER_MAGIC.len()] != SER_MAGIC {
            return Err(DriftError::InvalidSer(
                "missing LUCAM-RECORDER header".into(),
            ));
        }
        let mut cur = Cursor::new(&buf[SER_MAGIC.len()..SER_HEADER_SIZE]);
        let _lu_id = cur.read_i32::<LittleEndian>()?;
        let color_id = cur.read_i32::<LittleEndian>()?;
        let endian_flag = cur.read_i32::<LittleEndian>()?;
        let width = cur.read_i32::<LittleEndian>()?;
        let height = cur.read_i32::<LittleEndian>()?;
        let pixel_depth = cur.read_i32::<LittleEndian>()?;
        let frame_count = cur.read_i32::<LittleEndian>()?;
        let observer = read_text(&mut cur)?;
        let instrument = read_text(&mut cur)?;
        let telescope = read_text(&mut cur)?;

        if width <= 0 || height <= 0 {
            return Err(DriftError::InvalidDimensions {
                width: width.max(0) as u32,
                height: height.max(0) as u32,
            });
        }
        if frame_count < 0 {
            return Err(DriftError::InvalidSer(format!(
                "negative frame count {frame_count}"
            )));
        }

        Ok(Self {
            color_id,
            little_endian: endian_flag != 1,
            width: width as u32,
            height: height as u32,
            pixel_depth: pixel_depth.max(0) as u32,
            frame_count: frame_count as u32,
            observer,
            instrument,
            telescope,
        })
    }

    /// Serialize the 178-byte header.
    pub(crate) fn write_to<W: Write>(&self, w: &mut W) -> Result<()> {
        w.write_all(SER_MAGIC)?;
        w.write_i32::<LittleEndian>(0)?;
        w.write_i32::<LittleEndian>(self.color_id)?;
        w.write_i32::<LittleEndian>(if self.little_endian { 0 } else { 1 })?;
        for v in [self.width, self.height, self.pixel_depth, self.frame_count] {
            w.write_i32::<LittleEndian>(v as i32)?;
        }
        for text in [&self.observer, &self.instrument, &self.telescope] {
            let mut field = [0u8; SER_TEXT_FIELD];
            let n = text.len().min(SER_TEXT_FIELD);
            field[..n].copy_from_slice(&text.as_bytes()[..n]);
            w.write_all(&field)?;
        }
        w.write_u64::<LittleEndian>(0)?;
        w.write_u64::<LittleEndian>(0)?;
        Ok(())
    }

    /// Encode a normalized frame as raw samples at this header's depth.
    pub(crate) fn encode_frame(&self, data: &Array2<f32>) -> Vec<u8> {
        let max_val = self.max_level();
        let mut out = Vec::with_capacity(self.frame_byte_size());
        for &v in data.iter() {
            let level = (v.clamp(0.0, 1.0) * max_val).round() as u16;
            match (self.bytes_per_pixel(), self.little_endian) {
                (1, _) => out.push(level as u8),
                (_, true) => out.extend_from_slice(&level.to_le_bytes()),
                (_, false) => out.extend_from_slice(&level.to_be_bytes()),
            }
        }
        out
    }

    fn decode_frame(&self, raw: &[u8]) -> Result<Array2<f32>> {
        let max_val = self.max_level();
        let samples: Vec<f32> = match (self.bytes_per_pixel(), self.little_endian) {
            (1, _) => raw.iter().map(|&b| b as f32 / max_val).collect(),
            (_, true) => raw
                .chunks_exact(2)
                .map(|p| LittleEndian::read_u16(p) as f32 / max_val)
                .collect(),
            (_, false) => raw
                .chunks_exact(2)
                .map(|p| BigEndian::read_u16(p) as f32 / max_val)
                .collect(),
        };
        Array2::from_shape_vec((self.height as usize, self.width as usize), samples)
            .map_err(|e| DriftError::InvalidSer(format!("frame shape: {e}")))
    }

    fn max_level(&self) -> f32 {
        ((1u32 << self.pixel_depth.clamp(1, 16)) - 1) as f32
    }
}

fn read_text(cur: &mut Cursor<&[u8]>) -> Result<String> {
    let mut field = [0u8; SER_TEXT_FIELD];
    cur.read_exact(&mut field)?;
    Ok(String::from_utf8_lossy(&field)
        .trim_end_matches('\0')
        .trim()
        .to_string())
}

fn color_mode_name(color_id: i32) -> String {
    match color_id {
        8..=11 => format!("Bayer (color id {color_id})"),
        100 => "RGB".into(),
        101 => "BGR".into(),
        other => format!("color id {other}"),
    }
}

/// Memory-mapped reader for mono SER videos.
pub struct SerReader {
    mmap: Mmap,
    pub header: SerHeader,
}

impl SerReader {
    pub fn open(path: &Path) -> Result<Self> {
        let file = File::open(path)?;
        // SAFETY: the mapping is read-only and lives as long as the reader.
        let mmap = unsafe { Mmap::map(&file)? };
        let header = SerHeader::parse(&mmap)?;

        if header.color_id != SER_COLOR_MONO {
            return Err(DriftError::UnsupportedColorMode(color_mode_name(
                header.color_id,
            )));
        }
        if !(1..=16).contains(&header.pixel_depth) {
            return Err(DriftError::InvalidSer(format!(
                "unsupported pixel depth {}",
                header.pixel_depth
            )));
        }
        let needed = header.stack_byte_size().ok_or_else(|| {
            DriftError::InvalidSer(format!(
                "{}x{} px x {} frames does not fit in memory",
                header.width, header.height, header.frame_count
            ))
        })?;
        if mmap.len() < needed {
            return Err(DriftError::InvalidSer(format!(
                "truncated: {} frames need {needed} bytes, file has {}",
                header.frame_count,
                mmap.len()
            )));
        }

        Ok(Self { mmap, header })
    }

    /// Raw sample bytes of one frame, borrowed from the mapping.
    pub fn frame_raw(&self, index: usize) -> Result<&[u8]> {
        let total = self.frame_count();
        if index >= total {
            return Err(DriftError::FrameIndexOutOfRange { index, total });
        }
        let size = self.header.frame_byte_size();
        let start = SER_HEADER_SIZE + index * size;
        Ok(&self.mmap[start..start + size])
    }

    pub fn source_info(&self, path: &Path) -> SourceInfo {
        let text = |s: &str| (!s.is_empty()).then(|| s.to_string());
        SourceInfo {
            filename: path.to_path_buf(),
            total_frames: self.frame_count(),
            width: self.header.width,
            height: self.header.height,
            bit_depth: self.bit_depth(),
            observer: text(&self.header.observer),
            telescope: text(&self.header.telescope),
            instrument: text(&self.header.instrument),
        }
    }
}

impl FrameSource for SerReader {
    fn frame_count(&self) -> usize {
        self.header.frame_count as usize
    }

    fn dimensions(&self) -> (usize, usize) {
        (self.header.height as usize, self.header.width as usize)
    }

    fn bit_depth(&self) -> u8 {
        self.header.pixel_depth as u8
    }

    fn read_frame(&self, index: usize) -> Result<Frame> {
        let data = self.header.decode_frame(self.frame_raw(index)?)?;
        Ok(Frame::new(data, self.bit_depth()).with_index(index))
    }
}
