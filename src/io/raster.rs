use std::io::{BufRead, Cursor, Seek};
use std::ops::Range;
use std::path::Path;

use image::{DynamicImage, GrayImage, ImageDecoder, ImageReader, ImageResult, RgbImage, RgbaImage};
use ndarray::{Array3, ArrayView1, ArrayView2, ArrayView3, Axis, s};
use tracing::debug;

use crate::error::{Error, Result};

/// Decoded 8-bit pixel buffer of shape `(rows, cols, channels)`.
///
/// Channel layouts are normalized on decode: 1 (gray), 3 (RGB) or 4 (RGBA).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Raster {
    pixels: Array3<u8>,
}

/// Decode through the format decoder so EXIF orientation is applied to the pixels.
fn decode_oriented<R: BufRead + Seek>(reader: ImageReader<R>) -> ImageResult<DynamicImage> {
    let mut decoder = reader.into_decoder()?;
    let orientation = decoder.orientation()?;
    let mut img = DynamicImage::from_decoder(decoder)?;
    img.apply_orientation(orientation);
    Ok(img)
}

/// Rec.601 luma of one pixel; alpha is ignored.
#[inline]
pub fn luma(pixel: ArrayView1<u8>) -> u8 {
    if pixel.len() < 3 {
        return pixel[0];
    }
    let (r, g, b) = (pixel[0] as u32, pixel[1] as u32, pixel[2] as u32);
    ((299 * r + 587 * g + 114 * b + 500) / 1000) as u8
}

impl Raster {
    pub fn from_array(pixels: Array3<u8>) -> Result<Self> {
        let (rows, cols, channels) = pixels.dim();
        if rows == 0 || cols == 0 {
            return Err(Error::Decode(format!("empty image {}x{}", cols, rows)));
        }
        if !matches!(channels, 1 | 3 | 4) {
            return Err(Error::Decode(format!(
                "unsupported channel count {}",
                channels
            )));
        }
        Ok(Self { pixels })
    }

    /// Wrap interleaved row-major bytes.
    pub fn from_raw(width: usize, height: usize, channels: usize, data: Vec<u8>) -> Result<Self> {
        let pixels =
            Array3::from_shape_vec((height, width, channels), data).map_err(Error::decode)?;
        Self::from_array(pixels)
    }

    /// A raster where every pixel equals `pixel`.
    pub fn filled(width: usize, height: usize, pixel: &[u8]) -> Result<Self> {
        let pixels = Array3::from_shape_fn((height, width, pixel.len()), |(_, _, c)| pixel[c]);
        Self::from_array(pixels)
    }

    /// Decode a file, sniffing the format from its content rather than its name.
    /// EXIF orientation is applied, so rows run top to bottom as displayed.
    pub fn open(path: &Path) -> Result<Self> {
        let reader = ImageReader::open(path)
            .map_err(|e| Error::Decode(format!("{}: {}", path.display(), e)))?
            .with_guessed_format()
            .map_err(|e| Error::Decode(format!("{}: {}", path.display(), e)))?;
        let img = decode_oriented(reader)
            .map_err(|e| Error::Decode(format!("{}: {}", path.display(), e)))?;
        Self::from_dynamic(img)
    }

    /// Decode an in-memory encoded image (PNG, JPEG, TIFF, WebP, ...), applying
    /// EXIF orientation.
    pub fn decode(bytes: &[u8]) -> Result<Self> {
        let reader = ImageReader::new(Cursor::new(bytes))
            .with_guessed_format()
            .map_err(Error::decode)?;
        let img = decode_oriented(reader).map_err(Error::decode)?;
        Self::from_dynamic(img)
    }

    pub fn from_dynamic(img: DynamicImage) -> Result<Self> {
        let (width, height) = (img.width() as usize, img.height() as usize);
        let color = img.color();
        let (channels, data) = if color.has_alpha() {
            (4, img.into_rgba8().into_raw())
        } else if !color.has_color() {
            (1, img.into_luma8().into_raw())
        } else {
            (3, img.into_rgb8().into_raw())
        };
        debug!(width, height, channels, source = ?color, "Decoded raster");
        Self::from_raw(width, height, channels, data)
    }

    pub fn to_dynamic(&self) -> Result<DynamicImage> {
        let (w, h) = (self.width() as u32, self.height() as u32);
        let data = self.to_raw();
        let too_small = || Error::Encode("pixel buffer does not match dimensions".to_string());
        Ok(match self.channels() {
            1 => DynamicImage::ImageLuma8(
                GrayImage::from_raw(w, h, data).ok_or_else(too_small)?,
            ),
            3 => DynamicImage::ImageRgb8(RgbImage::from_raw(w, h, data).ok_or_else(too_small)?),
            _ => DynamicImage::ImageRgba8(RgbaImage::from_raw(w, h, data).ok_or_else(too_small)?),
        })
    }

    pub fn width(&self) -> usize {
        self.pixels.dim().1
    }

    pub fn height(&self) -> usize {
        self.pixels.dim().0
    }

    pub fn channels(&self) -> usize {
        self.pixels.dim().2
    }

    pub fn pixels(&self) -> &Array3<u8> {
        &self.pixels
    }

    pub fn pixels_mut(&mut self) -> &mut Array3<u8> {
        &mut self.pixels
    }

    /// One row as a `(cols, channels)` view.
    pub fn row(&self, row: usize) -> ArrayView2<'_, u8> {
        self.pixels.index_axis(Axis(0), row)
    }

    pub fn rows(&self, rows: Range<usize>) -> ArrayView3<'_, u8> {
        self.pixels.slice(s![rows, .., ..])
    }

    /// Interleaved row-major copy of the pixels.
    pub fn to_raw(&self) -> Vec<u8> {
        self.pixels.iter().copied().collect()
    }

    pub fn into_array(self) -> Array3<u8> {
        self.pixels
    }
}
