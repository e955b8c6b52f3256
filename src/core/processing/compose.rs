//! Canvas planning and assembly.
//!
//! The plan decides how many synthetic rows go above and below the padded subject;
//! assembly then stacks `[top margin][padded box][bottom margin]`. The padded box is
//! always copied with a plain slice assignment, so its pixels cannot change.
use std::ops::Range;

use ndarray::{Array3, s};
use tracing::{debug, info};

use crate::core::processing::resize::{extrapolate_row, stretch_rows};
use crate::error::{Error, Result};
use crate::io::raster::Raster;
use crate::types::{CanvasPlan, MarginFill, MarginPlan, PaddedBox, Seam, SeamSide};

/// Largest canvas, in pixels, that [`plan_canvas`] will lay out.
pub const MAX_CANVAS_PIXELS: usize = 1 << 28;

/// Output of [`compose`]: the assembled canvas plus where the blender may work.
#[derive(Debug, Clone)]
pub struct ComposedCanvas {
    pub raster: Raster,
    pub seams: Vec<Seam>,
    /// Output rows holding the untouched padded box.
    pub protected: Range<usize>,
}

/// `round(total * top_weight / (top_weight + bottom_weight))`, the top side's share.
fn proportional_share(total: usize, top_weight: usize, bottom_weight: usize) -> usize {
    let weights = top_weight + bottom_weight;
    if weights == 0 {
        return total / 2;
    }
    let share = (total as f64 * top_weight as f64 / weights as f64 + 0.5).floor() as usize;
    share.min(total)
}

/// Split `extra` rows between the top and bottom margins.
///
/// Extension debt is served first. What is left goes to each side in proportion to
/// the real background rows it has to sample from; with no background on either
/// side the remainder is halved, the odd row going to the bottom.
pub fn split_extra(
    extra: usize,
    available: (usize, usize),
    debt: (usize, usize),
) -> (usize, usize) {
    if extra == 0 {
        return (0, 0);
    }
    let total_debt = debt.0 + debt.1;
    if total_debt >= extra {
        let top = proportional_share(extra, debt.0, debt.1);
        return (top, extra - top);
    }
    let remaining = extra - total_debt;
    let top_share = proportional_share(remaining, available.0, available.1);
    (debt.0 + top_share, debt.1 + remaining - top_share)
}

fn margin_plan(source: Range<usize>, dest_rows: usize) -> MarginPlan {
    let fill = if dest_rows == 0 {
        MarginFill::Empty
    } else if source.is_empty() {
        MarginFill::Extrapolate
    } else if source.len() == dest_rows {
        MarginFill::Copy
    } else {
        MarginFill::Stretch
    };
    MarginPlan {
        source,
        dest_rows,
        fill,
    }
}

/// Decide the layout of a `desired_height`-row canvas around `padded`.
pub fn plan_canvas(
    image_width: usize,
    image_height: usize,
    padded: &PaddedBox,
    desired_height: usize,
) -> Result<CanvasPlan> {
    let padded_height = padded.height();
    if desired_height < padded_height {
        return Err(Error::InvalidTargetHeight {
            desired: desired_height,
            padded: padded_height,
        });
    }

    let pixels = image_width.checked_mul(desired_height);
    if pixels.is_none_or(|n| n > MAX_CANVAS_PIXELS) {
        return Err(Error::Resource(format!(
            "a {}x{} canvas exceeds the limit of {} pixels",
            image_width, desired_height, MAX_CANVAS_PIXELS
        )));
    }

    let extra = desired_height - padded_height;
    let available = (padded.top, image_height - 1 - padded.bottom);
    let (top_rows, bottom_rows) =
        split_extra(extra, available, (padded.debt_top, padded.debt_bottom));

    let plan = CanvasPlan {
        width: image_width,
        height: desired_height,
        subject: padded.rows(),
        top: margin_plan(0..padded.top, top_rows),
        bottom: margin_plan(padded.bottom + 1..image_height, bottom_rows),
    };
    info!(
        extra,
        available_top = available.0,
        available_bottom = available.1,
        top_rows,
        bottom_rows,
        top_fill = ?plan.top.fill,
        bottom_fill = ?plan.bottom.fill,
        "Canvas plan"
    );
    Ok(plan)
}

fn render_margin(raster: &Raster, margin: &MarginPlan, boundary_row: usize) -> Result<Array3<u8>> {
    let (cols, channels) = (raster.width(), raster.channels());
    Ok(match margin.fill {
        MarginFill::Empty => Array3::zeros((0, cols, channels)),
        MarginFill::Copy => raster.rows(margin.source.clone()).to_owned(),
        MarginFill::Stretch => stretch_rows(raster.rows(margin.source.clone()), margin.dest_rows)
            .map_err(Error::encode)?,
        MarginFill::Extrapolate => extrapolate_row(raster.row(boundary_row), margin.dest_rows),
    })
}

/// Assemble the output canvas described by `plan`.
pub fn compose(raster: &Raster, plan: &CanvasPlan) -> Result<ComposedCanvas> {
    let top = render_margin(raster, &plan.top, plan.subject.start)?;
    let bottom = render_margin(raster, &plan.bottom, plan.subject.end - 1)?;
    let protected = plan.protected_rows();

    let mut canvas = Array3::<u8>::zeros((plan.height, raster.width(), raster.channels()));
    canvas.slice_mut(s![..protected.start, .., ..]).assign(&top);
    canvas
        .slice_mut(s![protected.clone(), .., ..])
        .assign(&raster.rows(plan.subject.clone()));
    canvas.slice_mut(s![protected.end.., .., ..]).assign(&bottom);

    let mut seams = Vec::with_capacity(2);
    if plan.top.synthesized() {
        seams.push(Seam {
            anchor_row: protected.start,
            side: SeamSide::Above,
            span: plan.top.dest_rows,
        });
    }
    if plan.bottom.synthesized() {
        seams.push(Seam {
            anchor_row: protected.end - 1,
            side: SeamSide::Below,
            span: plan.bottom.dest_rows,
        });
    }
    debug!(height = plan.height, seams = seams.len(), "Composed canvas");

    Ok(ComposedCanvas {
        raster: Raster::from_array(canvas)?,
        seams,
        protected,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    fn padded(top: usize, bottom: usize) -> PaddedBox {
        PaddedBox { top, bottom, padding: 0, debt_top: 0, debt_bottom: 0 }
    }

    /// Gray raster whose every row holds its own index, so rows are traceable.
    fn indexed_rows(width: usize, height: usize) -> Raster {
        let pixels = Array3::from_shape_fn((height, width, 1), |(y, _, _)| y as u8);
        Raster::from_array(pixels).unwrap()
    }

    #[test]
    fn split_is_proportional_to_available_background() {
        // Scenario A numbers: 1139 extra rows, 370 above / 409 below.
        assert_eq!(split_extra(1139, (370, 409), (0, 0)), (541, 598));
        assert_eq!(split_extra(100, (0, 50), (0, 0)), (0, 100));
        assert_eq!(split_extra(0, (10, 10), (0, 0)), (0, 0));
    }

    #[test]
    fn split_without_background_halves_with_odd_row_below() {
        assert_eq!(split_extra(11, (0, 0), (0, 0)), (5, 6));
    }

    #[test]
    fn debt_is_served_first() {
        assert_eq!(split_extra(30, (0, 40), (10, 0)), (10, 20));
        // Not enough extra for the debts: divided by debt.
        assert_eq!(split_extra(6, (0, 0), (8, 4)), (4, 2));
    }

    #[test]
    fn target_below_padded_height_is_rejected() {
        let err = plan_canvas(10, 100, &padded(20, 80), 60).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidTargetHeight);
        assert!(matches!(err, Error::InvalidTargetHeight { desired: 60, padded: 61 }));
    }

    #[test]
    fn oversized_canvas_is_a_resource_error() {
        for desired in [3_000_000_000usize, 1 << 33] {
            let err = plan_canvas(10, 100, &padded(20, 80), desired).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::ResourceError, "height {desired}");
        }
        let err = plan_canvas(20_000, 100, &padded(20, 80), 1 << 20).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ResourceError);
        assert!(plan_canvas(10, 100, &padded(20, 80), 1 << 20).is_ok());
    }

    #[cfg(target_pointer_width = "64")]
    #[test]
    fn failed_stretch_is_an_encode_error() {
        let raster = indexed_rows(4, 30);
        let mut plan = plan_canvas(4, 30, &padded(10, 19), 60).unwrap();
        assert_eq!(plan.top.fill, MarginFill::Stretch);
        plan.top.dest_rows = u32::MAX as usize + 1;
        let err = compose(&raster, &plan).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::EncodeError);
    }

    #[test]
    fn zero_extra_plans_the_padded_box_only() {
        let plan = plan_canvas(10, 100, &padded(20, 80), 61).unwrap();
        assert_eq!(plan.top.fill, MarginFill::Empty);
        assert_eq!(plan.bottom.fill, MarginFill::Empty);
        assert_eq!(plan.protected_rows(), 0..61);
    }

    #[test]
    fn plan_never_samples_inside_the_box() {
        let plan = plan_canvas(10, 100, &padded(20, 80), 150).unwrap();
        assert_eq!(plan.top.source, 0..20);
        assert_eq!(plan.bottom.source, 81..100);
        assert_eq!(plan.top.dest_rows + plan.bottom.dest_rows + 61, 150);
        assert_eq!(plan.top.fill, MarginFill::Stretch);
    }

    #[test]
    fn equal_lengths_copy_instead_of_stretching() {
        let plan = plan_canvas(10, 100, &padded(20, 80), 100).unwrap();
        assert_eq!(plan.top.fill, MarginFill::Copy);
        assert_eq!(plan.bottom.fill, MarginFill::Copy);
        let raster = indexed_rows(3, 100);
        let out = compose(&raster, &plan).unwrap();
        assert_eq!(out.raster, raster);
        assert!(out.seams.is_empty());
    }

    #[test]
    fn composed_box_is_byte_identical() {
        let raster = indexed_rows(5, 60);
        let plan = plan_canvas(5, 60, &padded(10, 39), 90).unwrap();
        let out = compose(&raster, &plan).unwrap();

        assert_eq!(out.raster.height(), 90);
        assert_eq!(out.raster.width(), 5);
        let p = out.protected.clone();
        assert_eq!(p.len(), 30);
        assert_eq!(out.raster.rows(p), raster.rows(10..40));
        assert_eq!(out.seams.len(), 2);
    }

    #[test]
    fn missing_background_is_extrapolated_from_the_boundary_row() {
        let raster = indexed_rows(4, 30);
        // Box touches the top; 5 rows of debt above.
        let boxed = PaddedBox { top: 0, bottom: 19, padding: 5, debt_top: 5, debt_bottom: 0 };
        let plan = plan_canvas(4, 30, &boxed, 35).unwrap();
        assert_eq!(plan.top.fill, MarginFill::Extrapolate);
        assert_eq!(plan.top.dest_rows, 5);

        let out = compose(&raster, &plan).unwrap();
        for y in 0..5 {
            assert!(out.raster.row(y).iter().all(|&v| v == 0));
        }
        assert_eq!(out.seams[0], Seam { anchor_row: 5, side: SeamSide::Above, span: 5 });
    }
}
