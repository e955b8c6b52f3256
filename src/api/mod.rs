//! High-level, ergonomic library API: extend a file to a file, or encoded bytes to
//! encoded bytes. Parameters are validated before anything is decoded, and outputs
//! are produced completely in memory before any file is touched. Prefer these
//! entrypoints over the low-level processing modules when integrating.
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::core::params::{CanvasParams, ValidatedParams};
use crate::core::processing::pipeline::{ExtendReport, extend_canvas};
use crate::error::{Error, Result};
use crate::io::raster::Raster;
use crate::io::writers::{DEFAULT_JPEG_QUALITY, encode_raster, write_atomic};
use crate::types::OutputFormat;

/// Encoding choices for the output image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct OutputOptions {
    /// None means "infer from the output path", falling back to PNG
    pub format: Option<OutputFormat>,
    /// JPEG quality 1..=100; ignored for lossless formats
    pub jpeg_quality: u8,
}

impl Default for OutputOptions {
    fn default() -> Self {
        Self {
            format: None,
            jpeg_quality: DEFAULT_JPEG_QUALITY,
        }
    }
}

impl OutputOptions {
    pub fn validate(&self) -> Result<()> {
        if !(1..=100).contains(&self.jpeg_quality) {
            return Err(Error::invalid(
                "jpeg_quality",
                self.jpeg_quality,
                "must be within [1, 100]",
            ));
        }
        Ok(())
    }

    pub fn resolve_format(&self, output: Option<&Path>) -> OutputFormat {
        self.format
            .or_else(|| output.and_then(OutputFormat::from_path))
            .unwrap_or_default()
    }
}

/// Result of in-memory processing
#[derive(Debug, Clone)]
pub struct ProcessedImage {
    pub width: usize,
    pub height: usize,
    pub format: OutputFormat,
    pub bytes: Vec<u8>,
    pub report: ExtendReport,
}

/// Validate `params` and extend an already decoded raster.
pub fn extend_raster(raster: &Raster, params: &CanvasParams) -> Result<(Raster, ExtendReport)> {
    let validated = params.validate()?;
    extend_canvas(raster, &validated)
}

/// Extend an already validated, decoded raster and encode the result.
pub fn extend_and_encode(
    raster: &Raster,
    params: &ValidatedParams,
    format: OutputFormat,
    jpeg_quality: u8,
) -> Result<ProcessedImage> {
    let (out, report) = extend_canvas(raster, params)?;
    let bytes = encode_raster(&out, format, jpeg_quality)?;
    Ok(ProcessedImage {
        width: out.width(),
        height: out.height(),
        format,
        bytes,
        report,
    })
}

/// Extend an encoded image held in memory and return the encoded result.
pub fn extend_bytes_to_buffer(
    input: &[u8],
    params: &CanvasParams,
    options: &OutputOptions,
) -> Result<ProcessedImage> {
    let validated = params.validate()?;
    options.validate()?;
    let raster = Raster::decode(input)?;
    extend_and_encode(
        &raster,
        &validated,
        options.resolve_format(None),
        options.jpeg_quality,
    )
}

/// Extend an image file and return the encoded result without writing anything.
pub fn extend_path_to_buffer(
    input: &Path,
    params: &CanvasParams,
    options: &OutputOptions,
) -> Result<ProcessedImage> {
    let validated = params.validate()?;
    options.validate()?;
    let raster = Raster::open(input)?;
    extend_and_encode(
        &raster,
        &validated,
        options.resolve_format(None),
        options.jpeg_quality,
    )
}

/// Extend `input` and write the result to `output` atomically.
///
/// On any error `output` is left exactly as it was (absent or the previous file).
pub fn extend_path_to_path(
    input: &Path,
    output: &Path,
    params: &CanvasParams,
    options: &OutputOptions,
) -> Result<ExtendReport> {
    let validated = params.validate()?;
    options.validate()?;
    let format = options.resolve_format(Some(output));

    let raster = Raster::open(input)?;
    info!(
        input = ?input,
        width = raster.width(),
        height = raster.height(),
        channels = raster.channels(),
        "Loaded input"
    );
    let processed = extend_and_encode(&raster, &validated, format, options.jpeg_quality)?;
    write_atomic(output, &processed.bytes)?;
    info!(output = ?output, %format, bytes = processed.bytes.len(), "Wrote output");
    Ok(processed.report)
}
