//! Output encoders and file writers: JPEG through `jpeg-encoder`, PNG/TIFF through
//! `image`, and the atomic file writer used by every path-based entry point.
pub mod atomic;
pub mod encode;
pub mod jpeg;

pub use atomic::write_atomic;
pub use encode::{DEFAULT_JPEG_QUALITY, encode_raster};
