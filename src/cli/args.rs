use clap::Parser;
use std::path::PathBuf;

use canvas_extend::OutputFormat;
use canvas_extend::core::params::{AUTO_THRESHOLD, DEFAULT_PADDING_PCT};
use canvas_extend::io::writers::DEFAULT_JPEG_QUALITY;

#[derive(Parser, Debug)]
#[command(
    name = "extend_canvas",
    version,
    about = "Extend the background of a product photo to a target height without touching the subject"
)]
pub struct CliArgs {
    /// Input image (PNG, JPEG, TIFF, WebP, ...)
    pub input: PathBuf,

    /// Output image; the format follows the extension unless --format is given
    pub output: PathBuf,

    /// Target canvas height in pixels
    #[arg(allow_negative_numbers = true)]
    pub desired_height: i64,

    /// Margin above and below the subject, as a fraction of its height (0-1)
    #[arg(default_value_t = DEFAULT_PADDING_PCT, allow_negative_numbers = true)]
    pub padding_pct: f64,

    /// White threshold 0-255, or -1 to sample it from the image
    #[arg(default_value_t = AUTO_THRESHOLD, allow_negative_numbers = true)]
    pub white_thresh: i32,

    /// Output format (png, jpeg or tiff)
    #[arg(short = 'f', long, value_enum)]
    pub format: Option<OutputFormat>,

    /// JPEG quality (1-100)
    #[arg(long, default_value_t = DEFAULT_JPEG_QUALITY)]
    pub jpeg_quality: u8,

    /// Enable logging
    #[arg(long, default_value_t = false)]
    pub log: bool,
}
