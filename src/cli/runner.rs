use tracing::info;

use canvas_extend::{CanvasParams, OutputOptions, Result, extend_path_to_path};

use super::args::CliArgs;

pub fn run(args: CliArgs) -> Result<()> {
    if args.log {
        tracing_subscriber::fmt()
            .with_max_level(tracing::Level::DEBUG)
            .with_writer(std::io::stderr)
            .init();
    }

    let params = CanvasParams {
        desired_height: args.desired_height,
        padding_pct: args.padding_pct,
        white_thresh: args.white_thresh,
    };
    let options = OutputOptions {
        format: args.format,
        jpeg_quality: args.jpeg_quality,
    };

    info!(input = ?args.input, output = ?args.output, ?params, "Extending canvas");
    let report = extend_path_to_path(&args.input, &args.output, &params, &options)?;

    println!(
        "Saved (thr={}{}) to {}",
        report.threshold.value,
        if report.threshold.auto { ", auto" } else { "" },
        args.output.display()
    );
    Ok(())
}
