//! I/O layer: decoding inputs into a [`Raster`] pixel buffer and `writers`
//! for encoding outputs and persisting them without partial files.
pub mod raster;
pub use raster::{Raster, luma};

pub mod writers;
