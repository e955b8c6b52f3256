use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::types::ThresholdMode;

pub const DEFAULT_PADDING_PCT: f64 = 0.05;
pub const AUTO_THRESHOLD: i32 = -1;
/// Tallest canvas accepted from callers.
pub const MAX_DESIRED_HEIGHT: i64 = 1 << 20;

/// Raw extension parameters as they arrive from the CLI, a JSON request or a
/// config file. Nothing here is trusted until [`CanvasParams::validate`] runs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CanvasParams {
    /// Target output height in pixels; must be positive
    pub desired_height: i64,
    /// Fraction of subject height added above and below, within [0, 1]
    pub padding_pct: f64,
    /// Brightness cutoff 0..=255, or -1 to derive it from the image
    pub white_thresh: i32,
}

impl Default for CanvasParams {
    fn default() -> Self {
        Self {
            desired_height: 0,
            padding_pct: DEFAULT_PADDING_PCT,
            white_thresh: AUTO_THRESHOLD,
        }
    }
}

/// Parameters that passed validation; the pipeline only accepts this type.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ValidatedParams {
    pub desired_height: usize,
    pub padding_pct: f64,
    pub threshold: ThresholdMode,
}

impl CanvasParams {
    pub fn new(desired_height: i64) -> Self {
        Self {
            desired_height,
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<ValidatedParams> {
        let desired_height = validate_desired_height(self.desired_height)?;
        let padding_pct = validate_padding_pct(self.padding_pct)?;
        let threshold = threshold_mode(self.white_thresh)?;
        Ok(ValidatedParams {
            desired_height,
            padding_pct,
            threshold,
        })
    }
}

pub fn validate_desired_height(value: i64) -> Result<usize> {
    if value <= 0 {
        return Err(Error::invalid(
            "desired_height",
            value,
            "must be a positive integer",
        ));
    }
    if value > MAX_DESIRED_HEIGHT {
        return Err(Error::invalid(
            "desired_height",
            value,
            "exceeds the maximum of 1048576 rows",
        ));
    }
    usize::try_from(value).map_err(|_| Error::invalid("desired_height", value, "too large"))
}

pub fn validate_padding_pct(value: f64) -> Result<f64> {
    if !value.is_finite() || !(0.0..=1.0).contains(&value) {
        return Err(Error::invalid(
            "padding_pct",
            value,
            "must be within [0, 1]",
        ));
    }
    Ok(value)
}

/// Map the CLI/JSON threshold convention (-1 = auto, 0..=255 explicit) to a mode.
pub fn threshold_mode(value: i32) -> Result<ThresholdMode> {
    match value {
        AUTO_THRESHOLD => Ok(ThresholdMode::Auto),
        0..=255 => Ok(ThresholdMode::Explicit(value as u8)),
        _ => Err(Error::invalid(
            "white_thresh",
            value,
            "must be -1 (auto) or within [0, 255]",
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn defaults_are_auto_threshold_and_five_percent() {
        let v = CanvasParams::new(1800).validate().unwrap();
        assert_eq!(v.desired_height, 1800);
        assert_eq!(v.padding_pct, 0.05);
        assert_eq!(v.threshold, ThresholdMode::Auto);
    }

    #[test]
    fn rejects_non_positive_height() {
        for h in [0, -5] {
            let err = CanvasParams::new(h).validate().unwrap_err();
            assert_eq!(err.kind(), ErrorKind::InvalidParameter);
        }
    }

    #[test]
    fn rejects_heights_above_the_cap() {
        assert_eq!(validate_desired_height(MAX_DESIRED_HEIGHT).unwrap(), 1 << 20);
        for h in [MAX_DESIRED_HEIGHT + 1, 3_000_000_000, 1 << 33, i64::MAX] {
            let err = CanvasParams::new(h).validate().unwrap_err();
            assert_eq!(err.kind(), ErrorKind::InvalidParameter, "height {h}");
            assert!(err.to_string().contains("desired_height"));
        }
    }

    #[test]
    fn padding_bounds_are_inclusive() {
        assert!(validate_padding_pct(0.0).is_ok());
        assert!(validate_padding_pct(1.0).is_ok());
        assert!(validate_padding_pct(1.5).is_err());
        assert!(validate_padding_pct(-0.01).is_err());
        assert!(validate_padding_pct(f64::NAN).is_err());
    }

    #[test]
    fn threshold_convention() {
        assert_eq!(threshold_mode(-1).unwrap(), ThresholdMode::Auto);
        assert_eq!(threshold_mode(0).unwrap(), ThresholdMode::Explicit(0));
        assert_eq!(threshold_mode(255).unwrap(), ThresholdMode::Explicit(255));
        assert!(threshold_mode(-2).is_err());
        assert!(threshold_mode(256).is_err());
    }

    #[test]
    fn deserializes_camel_case_with_defaults() {
        let p: CanvasParams = serde_json::from_str(r#"{"desiredHeight": 900}"#).unwrap();
        assert_eq!(p, CanvasParams::new(900));
        let p: CanvasParams =
            serde_json::from_str(r#"{"desiredHeight": 900, "paddingPct": 0.1, "whiteThresh": 210}"#)
                .unwrap();
        assert_eq!(p.white_thresh, 210);
        assert_eq!(p.padding_pct, 0.1);
    }
}
