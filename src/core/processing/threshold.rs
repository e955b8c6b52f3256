use ndarray::{ArrayView3, Axis, s};
use tracing::{debug, info};

use crate::io::raster::{Raster, luma};
use crate::types::{Threshold, ThresholdMode};

/// Auto thresholds never leave this range, whatever the sampled brightness.
pub const AUTO_THRESHOLD_MIN: u8 = 180;
pub const AUTO_THRESHOLD_MAX: u8 = 250;
/// Brightness levels subtracted from the sampled background so borderline pixels
/// still count as background.
pub const THRESHOLD_CUSHION: f64 = 5.0;

const STRIPE_HEIGHT: usize = 20;
const STRIPE_HALF_WIDTH: usize = 40;

/// Resolve the threshold for `raster`: explicit values pass through untouched,
/// auto mode samples the background stripes.
pub fn estimate_threshold(raster: &Raster, mode: ThresholdMode) -> Threshold {
    match mode {
        ThresholdMode::Explicit(value) => {
            debug!(value, "Using explicit white threshold");
            Threshold { value, auto: false }
        }
        ThresholdMode::Auto => Threshold {
            value: center_sample_threshold(raster),
            auto: true,
        },
    }
}

/// Mean brightness of two center stripes at the top and bottom edges, taking the
/// darker of the two, minus the cushion.
pub fn center_sample_threshold(raster: &Raster) -> u8 {
    let (rows, cols) = (raster.height(), raster.width());
    let cx = cols / 2;
    let half = STRIPE_HALF_WIDTH
        .min(cx.saturating_sub(1))
        .min(cols.saturating_sub(cx + 1));
    let h = STRIPE_HEIGHT.min(rows / 10).max(1);

    let x0 = cx - half;
    let x1 = cx + half + 1;
    let pixels = raster.pixels();
    let top = mean_brightness(pixels.slice(s![0..h, x0..x1, ..]));
    let bottom = mean_brightness(pixels.slice(s![rows - h..rows, x0..x1, ..]));

    let raw = (top.min(bottom) - THRESHOLD_CUSHION).trunc() as i32;
    let value = raw.clamp(AUTO_THRESHOLD_MIN as i32, AUTO_THRESHOLD_MAX as i32) as u8;
    info!(
        top_mean = top,
        bottom_mean = bottom,
        stripe_w = x1 - x0,
        stripe_h = h,
        value,
        "Auto white threshold"
    );
    value
}

fn mean_brightness(region: ArrayView3<u8>) -> f64 {
    let mut sum = 0u64;
    let mut count = 0u64;
    for row in region.axis_iter(Axis(0)) {
        for px in row.axis_iter(Axis(0)) {
            sum += luma(px) as u64;
            count += 1;
        }
    }
    if count == 0 {
        return 0.0;
    }
    sum as f64 / count as f64
}
