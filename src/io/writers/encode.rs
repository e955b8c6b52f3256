use std::io::Cursor;

use image::ImageFormat;
use tracing::debug;

use crate::error::{Error, Result};
use crate::io::raster::Raster;
use crate::io::writers::jpeg::encode_jpeg;
use crate::types::OutputFormat;

pub const DEFAULT_JPEG_QUALITY: u8 = 95;

/// Encode the raster fully in memory; nothing touches the filesystem here.
pub fn encode_raster(raster: &Raster, format: OutputFormat, jpeg_quality: u8) -> Result<Vec<u8>> {
    let bytes = match format {
        OutputFormat::Jpeg => encode_jpeg(raster, jpeg_quality)?,
        OutputFormat::Png => encode_with_image(raster, ImageFormat::Png)?,
        OutputFormat::Tiff => encode_with_image(raster, ImageFormat::Tiff)?,
    };
    debug!(%format, bytes = bytes.len(), "Encoded output");
    Ok(bytes)
}

fn encode_with_image(raster: &Raster, format: ImageFormat) -> Result<Vec<u8>> {
    let mut buf = Cursor::new(Vec::new());
    raster
        .to_dynamic()?
        .write_to(&mut buf, format)
        .map_err(Error::encode)?;
    Ok(buf.into_inner())
}
