use fast_image_resize::{FilterType, PixelType, ResizeAlg, ResizeOptions, Resizer, images::Image};
use ndarray::{Array3, ArrayView2, ArrayView3, Axis};
use tracing::debug;

fn pixel_type(channels: usize) -> Result<PixelType, Box<dyn std::error::Error>> {
    match channels {
        1 => Ok(PixelType::U8),
        3 => Ok(PixelType::U8x3),
        4 => Ok(PixelType::U8x4),
        n => Err(format!("Unsupported channel count for resampling: {}", n).into()),
    }
}

/// Resample a background strip vertically to `dest_rows` rows.
///
/// Width is kept, so the horizontal pass is an identity and columns are never mixed.
/// Alpha is resampled as an ordinary channel (no premultiplication).
pub fn stretch_rows(
    strip: ArrayView3<u8>,
    dest_rows: usize,
) -> Result<Array3<u8>, Box<dyn std::error::Error>> {
    let (src_rows, cols, channels) = strip.dim();
    if src_rows == 0 {
        return Err("Cannot stretch an empty strip".into());
    }
    if dest_rows == 0 {
        return Ok(Array3::zeros((0, cols, channels)));
    }

    let width = u32::try_from(cols)?;
    let src_height = u32::try_from(src_rows)?;
    let dest_height = u32::try_from(dest_rows)?;
    let pixel_type = pixel_type(channels)?;

    let resize_options = ResizeOptions::new()
        .resize_alg(ResizeAlg::Convolution(FilterType::Bilinear))
        .use_alpha(false);
    let mut resizer = Resizer::new();

    let src_image = Image::from_vec_u8(
        width,
        src_height,
        strip.iter().copied().collect(),
        pixel_type,
    )?;
    let mut dst_image = Image::new(width, dest_height, pixel_type);
    resizer.resize(&src_image, &mut dst_image, &resize_options)?;

    debug!(src_rows, dest_rows, cols, "Stretched background strip");
    Ok(Array3::from_shape_vec(
        (dest_rows, cols, channels),
        dst_image.into_vec(),
    )?)
}

/// Repeat a single row `dest_rows` times.
pub fn extrapolate_row(row: ArrayView2<u8>, dest_rows: usize) -> Array3<u8> {
    let (cols, channels) = row.dim();
    let mut out = Array3::zeros((dest_rows, cols, channels));
    for mut dst in out.axis_iter_mut(Axis(0)) {
        dst.assign(&row);
    }
    out
}
