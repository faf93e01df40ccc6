use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::error::{DriftError, Result};
use crate::frame::Frame;
use crate::io::ser::SerHeader;

/// Streams normalized frames into a mono SER file.
///
/// The frame count in the header is fixed up front; `finalize` fails if a
/// different number of frames was written.
pub struct SerWriter {
    out: BufWriter<File>,
    header: SerHeader,
    written: u32,
}

impl SerWriter {
    pub fn create(path: &Path, header: &SerHeader) -> Result<Self> {
        let mut out = BufWriter::new(File::create(path)?);
        header.write_to(&mut out)?;
        Ok(Self {
            out,
            header: header.clone(),
            written: 0,
        })
    }

    pub fn write_frame(&mut self, frame: &Frame) -> Result<()> {
        let expected = (self.header.height as usize, self.header.width as usize);
        if frame.dim() != expected {
            return Err(DriftError::DimensionMismatch {
                expected,
                found: frame.dim(),
            });
        }
        let raw = self.header.encode_frame(&frame.data);
        self.out.write_all(&raw)?;
        self.written += 1;
        Ok(())
    }

    pub fn frames_written(&self) -> usize {
        self.written as usize
    }

    pub fn finalize(mut self) -> Result<()> {
        self.out.flush()?;
        if self.written != self.header.frame_count {
            return Err(DriftError::InvalidSer(format!(
                "header announces {} frames, {} written",
                self.header.frame_count, self.written
            )));
        }
        Ok(())
    }
}
