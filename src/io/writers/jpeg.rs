use jpeg_encoder::{ColorType, Encoder};

use crate::error::{Error, Result};
use crate::io::raster::Raster;

/// Encode a raster as baseline JPEG. Alpha, when present, is dropped by the encoder.
pub fn encode_jpeg(raster: &Raster, quality: u8) -> Result<Vec<u8>> {
    let (cols, rows) = (raster.width(), raster.height());
    if cols > u16::MAX as usize || rows > u16::MAX as usize {
        return Err(Error::Encode(format!(
            "JPEG dimensions are limited to 65535, got {}x{}",
            cols, rows
        )));
    }
    let color = match raster.channels() {
        1 => ColorType::Luma,
        3 => ColorType::Rgb,
        _ => ColorType::Rgba,
    };

    let data = raster.to_raw();
    let mut out = Vec::with_capacity(data.len() / 4);
    let encoder = Encoder::new(&mut out, quality);
    encoder
        .encode(&data, cols as u16, rows as u16, color)
        .map_err(Error::encode)?;
    Ok(out)
}
