use crate::error::{DriftError, Result};
use crate::frame::Frame;

/// Random-access provider of the frames of one stack.
///
/// Every frame has the same dimensions and bit depth. Reads may be lazy
/// (decoded on demand) and may happen in any order.
pub trait FrameSource {
    /// Number of frames in the stack.
    fn frame_count(&self) -> usize;

    /// (height, width) shared by every frame.
    fn dimensions(&self) -> (usize, usize);

    /// Bit depth of the source samples (8/16 integer, 32 float).
    fn bit_depth(&self) -> u8;

    /// Read (decode) the frame at `index`.
    fn read_frame(&self, index: usize) -> Result<Frame>;

    /// Iterator over all frames in index order.
    fn frames(&self) -> Box<dyn Iterator<Item = Result<Frame>> + '_> {
        Box::new((0..self.frame_count()).map(move |i| self.read_frame(i)))
    }
}

impl<S: FrameSource + ?Sized> FrameSource for &S {
    fn frame_count(&self) -> usize {
        (**self).frame_count()
    }

    fn dimensions(&self) -> (usize, usize) {
        (**self).dimensions()
    }

    fn bit_depth(&self) -> u8 {
        (**self).bit_depth()
    }

    fn read_frame(&self, index: usize) -> Result<Frame> {
        (**self).read_frame(index)
    }
}

/// A fully resident stack of frames.
#[derive(Clone, Debug)]
pub struct MemoryStack {
    frames: Vec<Frame>,
    dims: (usize, usize),
    bit_depth: u8,
}

impl MemoryStack {
    /// Wrap a vector of frames, checking that all share one shape.
    ///
    /// An empty vector is accepted; estimators reject it later with
    /// [`DriftError::EmptyStack`].
    pub fn new(frames: Vec<Frame>) -> Result<Self> {
        let (dims, bit_depth) = match frames.first() {
            Some(first) => (first.dim(), first.original_bit_depth),
            None => ((0, 0), 32),
        };
        for frame in &frames {
            if frame.dim() != dims {
                return Err(DriftError::DimensionMismatch {
                    expected: dims,
                    found: frame.dim(),
                });
            }
        }
        let frames = frames
            .into_iter()
            .enumerate()
            .map(|(i, f)| f.with_index(i))
            .collect();
        Ok(Self {
            frames,
            dims,
            bit_depth,
        })
    }

    /// Wrap frames without checking shapes. Frames with a different shape
    /// make registration fail with [`DriftError::DimensionMismatch`].
    pub fn new_unchecked(frames: Vec<Frame>) -> Self {
        let (dims, bit_depth) = match frames.first() {
            Some(first) => (first.dim(), first.original_bit_depth),
            None => ((0, 0), 32),
        };
        Self {
            frames,
            dims,
            bit_depth,
        }
    }
}

impl FrameSource for MemoryStack {
    fn frame_count(&self) -> usize {
        self.frames.len()
    }

    fn dimensions(&self) -> (usize, usize) {
        self.dims
    }

    fn bit_depth(&self) -> u8 {
        self.bit_depth
    }

    fn read_frame(&self, index: usize) -> Result<Frame> {
        self.frames
            .get(index)
            .cloned()
            .ok_or(DriftError::FrameIndexOutOfRange {
                index,
                total: self.frames.len(),
            })
    }
}
