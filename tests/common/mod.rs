#![allow(dead_code)]

use std::ops::RangeInclusive;
use std::path::{Path, PathBuf};

use canvas_extend::io::writers::encode_raster;
use canvas_extend::{OutputFormat, Raster};
use ndarray::s;

/// RGB shot on a flat `background`: rows in `subject` hold a `fill` block spanning the
/// middle half of the width.
pub fn product_shot(
    width: usize,
    height: usize,
    subject: RangeInclusive<usize>,
    background: u8,
    fill: u8,
) -> Raster {
    let mut raster = Raster::filled(width, height, &[background; 3]).unwrap();
    raster
        .pixels_mut()
        .slice_mut(s![subject, width / 4..3 * width / 4, ..])
        .fill(fill);
    raster
}

pub fn write_png(dir: &Path, name: &str, raster: &Raster) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, encode_raster(raster, OutputFormat::Png, 95).unwrap()).unwrap();
    path
}
