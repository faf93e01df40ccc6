use std::path::Path;

use crate::error::Result;
use crate::frame::{Frame, SourceInfo};
use crate::io::image_io::ImageSequence;
use crate::io::ser::SerReader;
use crate::io::tiff_stack::{is_tiff_path, MultiPageTiff};
use crate::io::FrameSource;

/// A stack read from disk: a SER video, a multi-page TIFF or a directory of
/// images.
pub enum StackInput {
    Ser(SerReader),
    Tiff(MultiPageTiff),
    Images(ImageSequence),
}

impl StackInput {
    /// Open `path` as an image directory if it is a directory, as a
    /// multi-page TIFF if it has a `.tif`/`.tiff` extension, else as SER.
    pub fn open(path: &Path) -> Result<Self> {
        if path.is_dir() {
            Ok(Self::Images(ImageSequence::open(path)?))
        } else if is_tiff_path(path) {
            Ok(Self::Tiff(MultiPageTiff::open(path)?))
        } else {
            Ok(Self::Ser(SerReader::open(path)?))
        }
    }

    pub fn source_info(&self, path: &Path) -> SourceInfo {
        match self {
            Self::Ser(reader) => reader.source_info(path),
            Self::Tiff(stack) => stack.source_info(path),
            Self::Images(seq) => seq.source_info(path),
        }
    }

    fn inner(&self) -> &(dyn FrameSource + Sync) {
        match self {
            Self::Ser(reader) => reader,
            Self::Tiff(stack) => stack,
            Self::Images(seq) => seq,
        }
    }
}

impl FrameSource for StackInput {
    fn frame_count(&self) -> usize {
        self.inner().frame_count()
    }

    fn dimensions(&self) -> (usize, usize) {
        self.inner().dimensions()
    }

    fn bit_depth(&self) -> u8 {
        self.inner().bit_depth()
    }

    fn read_frame(&self, index: usize) -> Result<Frame> {
        self.inner().read_frame(index)
    }
}
