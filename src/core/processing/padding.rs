use tracing::info;

use crate::core::params::validate_padding_pct;
use crate::error::Result;
use crate::types::{BoundingBox, PaddedBox};

/// Grow `bounds` by `round(subject_height * padding_pct)` rows on each side.
///
/// The result is clamped to `0..image_height`; rows of padding that fall outside
/// the frame are returned as extension debt so the composer can synthesize them.
pub fn pad_bounds(bounds: BoundingBox, image_height: usize, padding_pct: f64) -> Result<PaddedBox> {
    let padding_pct = validate_padding_pct(padding_pct)?;
    let subject_height = bounds.height();
    let padding = (subject_height as f64 * padding_pct + 0.5).floor() as usize;

    let top = bounds.top.saturating_sub(padding);
    let bottom = (bounds.bottom + padding).min(image_height - 1);
    let debt_top = padding - (bounds.top - top);
    let debt_bottom = padding - (bottom - bounds.bottom);

    info!(
        subject_height,
        padding, top, bottom, debt_top, debt_bottom, "Padded subject box"
    );

    Ok(PaddedBox {
        top,
        bottom,
        padding,
        debt_top,
        debt_bottom,
    })
}
