use std::ops::Range;

use ndarray::{Array2, Axis, Zip};
use tracing::debug;

use crate::io::raster::Raster;
use crate::types::{Seam, SeamSide};

/// Synthesized rows blended toward the original boundary row at each seam.
pub const BLEND_ROWS: usize = 6;

/// Linear ramp across each seam: the synthesized row at distance `d` from the
/// anchor (0 = adjacent) takes weight `(B - d) / (B + 1)` of the anchor row.
/// Rows inside `protected` are never written.
pub fn blend_seams(raster: &mut Raster, seams: &[Seam], protected: &Range<usize>) {
    let height = raster.height();
    for seam in seams {
        let rows = BLEND_ROWS.min(seam.span);
        if rows == 0 {
            continue;
        }
        let anchor: Array2<f32> = raster.row(seam.anchor_row).mapv(|v| v as f32);

        for d in 0..rows {
            let target = match seam.side {
                SeamSide::Above => seam.anchor_row.checked_sub(d + 1),
                SeamSide::Below => Some(seam.anchor_row + d + 1),
            };
            let Some(target) = target.filter(|&r| r < height) else {
                break;
            };
            if protected.contains(&target) {
                continue;
            }

            let weight = (rows - d) as f32 / (rows + 1) as f32;
            let mut dst = raster.pixels_mut().index_axis_mut(Axis(0), target);
            Zip::from(&mut dst).and(&anchor).for_each(|px, &a| {
                *px = (*px as f32 * (1.0 - weight) + a * weight).round() as u8;
            });
        }
        debug!(anchor = seam.anchor_row, side = ?seam.side, rows, "Blended seam");
    }
}
