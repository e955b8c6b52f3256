use ndarray::parallel::prelude::*;
use ndarray::{ArrayView2, Axis};
use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::io::raster::{Raster, luma};
use crate::types::{BoundingBox, Threshold};

/// A row counts as background only when strictly more than this fraction of its
/// pixels are at or above the threshold. Tolerates sensor noise and dust specks
/// without swallowing thin subject features such as antennas or mirrors.
pub const BACKGROUND_ROW_COVERAGE: f64 = 0.98;

/// Fraction of pixels in `row` that classify as background.
pub fn background_fraction(row: ArrayView2<u8>, threshold: u8) -> f64 {
    let width = row.len_of(Axis(0));
    if width == 0 {
        return 1.0;
    }
    let background = row
        .axis_iter(Axis(0))
        .filter(|px| luma(px.view()) >= threshold)
        .count();
    background as f64 / width as f64
}

pub fn is_background_row(row: ArrayView2<u8>, threshold: u8) -> bool {
    background_fraction(row, threshold) > BACKGROUND_ROW_COVERAGE
}

/// Per-row background classification, top to bottom.
pub fn row_profile(raster: &Raster, threshold: u8) -> Vec<bool> {
    raster
        .pixels()
        .axis_iter(Axis(0))
        .into_par_iter()
        .map(|row| is_background_row(row, threshold))
        .collect()
}

/// Locate the first and last non-background rows.
pub fn find_subject_bounds(raster: &Raster, threshold: Threshold) -> Result<BoundingBox> {
    let profile = row_profile(raster, threshold.value);
    let top = profile.iter().position(|&bg| !bg);
    let bottom = profile.iter().rposition(|&bg| !bg);

    match (top, bottom) {
        (Some(top), Some(bottom)) => {
            let bounds = BoundingBox { top, bottom };
            info!(
                top,
                bottom,
                subject_height = bounds.height(),
                threshold = threshold.value,
                "Foreground bounds"
            );
            Ok(bounds)
        }
        _ => {
            debug!(rows = profile.len(), threshold = threshold.value, "Every row is background");
            Err(Error::NoSubjectDetected {
                threshold: threshold.value,
            })
        }
    }
}
