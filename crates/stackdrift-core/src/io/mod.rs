pub mod annotations;
pub mod drift_table;
pub mod image_io;
pub mod ser;
pub mod ser_writer;
pub mod source;
pub mod tiff_stack;

pub use source::{FrameSource, MemoryStack};
