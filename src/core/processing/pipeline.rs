use serde::Serialize;
use tracing::info;

use crate::core::params::ValidatedParams;
use crate::core::processing::blend::blend_seams;
use crate::core::processing::compose::{compose, plan_canvas};
use crate::core::processing::padding::pad_bounds;
use crate::core::processing::segment::find_subject_bounds;
use crate::core::processing::threshold::estimate_threshold;
use crate::error::Result;
use crate::io::raster::Raster;
use crate::types::{BoundingBox, CanvasPlan, PaddedBox, Threshold};

/// Intermediate results of one run, kept for logging and diagnostics.
#[derive(Debug, Clone, Serialize)]
pub struct ExtendReport {
    pub threshold: Threshold,
    pub bounds: BoundingBox,
    pub padded: PaddedBox,
    pub plan: CanvasPlan,
}

/// Run estimator -> segmenter -> padding -> composer -> blender on one image.
///
/// Pure and synchronous: no state survives the call and the input is not modified.
pub fn extend_canvas(raster: &Raster, params: &ValidatedParams) -> Result<(Raster, ExtendReport)> {
    let threshold = estimate_threshold(raster, params.threshold);
    let bounds = find_subject_bounds(raster, threshold)?;
    let padded = pad_bounds(bounds, raster.height(), params.padding_pct)?;
    let plan = plan_canvas(raster.width(), raster.height(), &padded, params.desired_height)?;

    let mut composed = compose(raster, &plan)?;
    blend_seams(&mut composed.raster, &composed.seams, &composed.protected);

    info!(
        width = composed.raster.width(),
        height = composed.raster.height(),
        threshold = threshold.value,
        auto_threshold = threshold.auto,
        "Canvas extended"
    );
    Ok((
        composed.raster,
        ExtendReport {
            threshold,
            bounds,
            padded,
            plan,
        },
    ))
}
