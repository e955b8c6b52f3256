//! Shared types and enums used across the canvas extender.
//! Includes the output `OutputFormat`, the threshold types (`ThresholdMode`,
//! `Threshold`) and the geometry handed from stage to stage (`BoundingBox`,
//! `PaddedBox`, `CanvasPlan`, `Seam`).
use std::ops::Range;
use std::path::Path;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

#[derive(
    Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Debug, Default, ValueEnum, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Png,
    #[serde(alias = "jpg")]
    Jpeg, // Lossy, alpha is dropped
    #[serde(alias = "tif")]
    Tiff,
}

impl OutputFormat {
    /// Infer the format from a file extension (`.png`, `.jpg`/`.jpeg`, `.tif`/`.tiff`).
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "png" => Some(OutputFormat::Png),
            "jpg" | "jpeg" => Some(OutputFormat::Jpeg),
            "tif" | "tiff" => Some(OutputFormat::Tiff),
            _ => None,
        }
    }

    pub fn mime_type(self) -> &'static str {
        match self {
            OutputFormat::Png => "image/png",
            OutputFormat::Jpeg => "image/jpeg",
            OutputFormat::Tiff => "image/tiff",
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Png => write!(f, "png"),
            OutputFormat::Jpeg => write!(f, "jpeg"),
            OutputFormat::Tiff => write!(f, "tiff"),
        }
    }
}

/// How the white threshold is obtained.
#[derive(Copy, Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub enum ThresholdMode {
    /// Sample the top and bottom center stripes.
    Auto,
    /// Use the caller's value verbatim.
    Explicit(u8),
}

impl std::fmt::Display for ThresholdMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ThresholdMode::Auto => write!(f, "auto"),
            ThresholdMode::Explicit(v) => write!(f, "{}", v),
        }
    }
}

/// Brightness cutoff: pixels at or above `value` are background.
#[derive(Copy, Clone, PartialEq, Eq, Debug, Serialize)]
pub struct Threshold {
    pub value: u8,
    pub auto: bool,
}

/// Vertical span of foreground content, inclusive on both ends.
#[derive(Copy, Clone, PartialEq, Eq, Debug, Serialize)]
pub struct BoundingBox {
    pub top: usize,
    pub bottom: usize,
}

impl BoundingBox {
    pub fn height(&self) -> usize {
        self.bottom - self.top + 1
    }
}

/// `BoundingBox` grown by the padding, clamped to the frame. Rows of padding that
/// would have fallen outside the frame are kept as per-side extension debt.
#[derive(Copy, Clone, PartialEq, Eq, Debug, Serialize)]
pub struct PaddedBox {
    pub top: usize,
    pub bottom: usize,
    pub padding: usize,
    pub debt_top: usize,
    pub debt_bottom: usize,
}

impl PaddedBox {
    pub fn height(&self) -> usize {
        self.bottom - self.top + 1
    }

    pub fn rows(&self) -> Range<usize> {
        self.top..self.bottom + 1
    }
}

/// How one margin of the output canvas gets its pixels.
#[derive(Copy, Clone, PartialEq, Eq, Debug, Serialize)]
pub enum MarginFill {
    /// Margin has no rows.
    Empty,
    /// Source strip copied verbatim (same length).
    Copy,
    /// Source strip resampled vertically to a different length.
    Stretch,
    /// No source rows; the padded box boundary row is repeated.
    Extrapolate,
}

#[derive(Clone, PartialEq, Eq, Debug, Serialize)]
pub struct MarginPlan {
    /// Input rows sampled for this margin (strictly outside the padded box).
    pub source: Range<usize>,
    /// Number of output rows produced.
    pub dest_rows: usize,
    pub fill: MarginFill,
}

impl MarginPlan {
    pub fn synthesized(&self) -> bool {
        matches!(self.fill, MarginFill::Stretch | MarginFill::Extrapolate)
    }
}

#[derive(Clone, PartialEq, Eq, Debug, Serialize)]
pub struct CanvasPlan {
    pub width: usize,
    pub height: usize,
    /// Input rows copied unchanged into the output.
    pub subject: Range<usize>,
    pub top: MarginPlan,
    pub bottom: MarginPlan,
}

impl CanvasPlan {
    /// Output rows occupied by the padded box.
    pub fn protected_rows(&self) -> Range<usize> {
        let start = self.top.dest_rows;
        start..start + self.subject.len()
    }
}

/// Side of a seam on which the synthesized margin lies.
#[derive(Copy, Clone, PartialEq, Eq, Debug, Serialize)]
pub enum SeamSide {
    Above,
    Below,
}

/// Boundary between synthesized rows and original rows in the output.
#[derive(Copy, Clone, PartialEq, Eq, Debug, Serialize)]
pub struct Seam {
    /// Original row the blend is anchored on.
    pub anchor_row: usize,
    /// Which side of `anchor_row` is synthesized.
    pub side: SeamSide,
    /// Number of synthesized rows available on that side.
    pub span: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn output_format_from_extension() {
        assert_eq!(OutputFormat::from_path(Path::new("a/b.JPG")), Some(OutputFormat::Jpeg));
        assert_eq!(OutputFormat::from_path(Path::new("b.tif")), Some(OutputFormat::Tiff));
        assert_eq!(OutputFormat::from_path(Path::new("b.png")), Some(OutputFormat::Png));
        assert_eq!(OutputFormat::from_path(Path::new("b.webp")), None);
        assert_eq!(OutputFormat::from_path(Path::new("noext")), None);
    }

    #[test]
    fn protected_rows_follow_top_margin() {
        let plan = CanvasPlan {
            width: 4,
            height: 20,
            subject: 5..15,
            top: MarginPlan { source: 0..5, dest_rows: 7, fill: MarginFill::Stretch },
            bottom: MarginPlan { source: 15..18, dest_rows: 3, fill: MarginFill::Copy },
        };
        assert_eq!(plan.protected_rows(), 7..17);
        assert!(plan.top.synthesized());
        assert!(!plan.bottom.synthesized());
    }
}
