#![doc = r#"
canvas-extend: vertical canvas extension for product photos.

Given a photo of an object on a near-white background, this crate finds the rows that
hold the object, pads them, and grows the image to an exact target height by resampling
the existing background above and below the subject. The subject pixels are copied
unchanged; only synthesized background rows are ever written. Width never changes.

It powers both the `extend_canvas` CLI and the `extend_canvas_service` HTTP wrapper,
and can be embedded in your own Rust applications.

Add dependency
--------------
```toml
[dependencies]
canvas-extend = { version = "0.1", default-features = false }
```

Quick start: extend a file to a file
------------------------------------
```rust,no_run
use std::path::Path;
use canvas_extend::{CanvasParams, OutputOptions, extend_path_to_path};

fn main() -> canvas_extend::Result<()> {
    let params = CanvasParams {
        desired_height: 1800,
        padding_pct: 0.05,
        white_thresh: -1, // estimate from the image
    };

    let report = extend_path_to_path(
        Path::new("/photos/mug.jpg"),
        Path::new("/out/mug.png"),
        &params,
        &OutputOptions::default(),
    )?;
    println!("threshold {} (auto: {})", report.threshold.value, report.threshold.auto);
    Ok(())
}
```

Extend in memory
----------------
```rust,no_run
use canvas_extend::{CanvasParams, OutputFormat, OutputOptions, extend_bytes_to_buffer};

fn main() -> canvas_extend::Result<()> {
    let input = std::fs::read("/photos/mug.jpg")?;
    let options = OutputOptions {
        format: Some(OutputFormat::Jpeg),
        jpeg_quality: 90,
    };
    let img = extend_bytes_to_buffer(&input, &CanvasParams::new(1800), &options)?;
    assert_eq!(img.height, 1800);
    Ok(())
}
```

Error handling
--------------
All public functions return `canvas_extend::Result<T>`. Every failure carries a coarse
[`ErrorKind`] that the CLI maps to exit codes and the service maps to HTTP statuses.

```rust,no_run
use std::path::Path;
use canvas_extend::{CanvasParams, Error, OutputOptions, extend_path_to_path};

fn main() {
    let params = CanvasParams::new(600);
    match extend_path_to_path(Path::new("in.png"), Path::new("out.png"), &params, &OutputOptions::default()) {
        Ok(_) => {}
        Err(Error::NoSubjectDetected { threshold }) => eprintln!("blank at {threshold}"),
        Err(Error::InvalidTargetHeight { desired, padded }) => {
            eprintln!("{desired} rows cannot hold a {padded}-row subject")
        }
        Err(other) => eprintln!("{} ({})", other, other.kind()),
    }
}
```

Feature flags
-------------
- `service`: builds the [`service`] module and the `extend_canvas_service` binary (tokio, reqwest, base64).
- `full`: enables every feature.

Useful modules
--------------
- [`api`]: high-level, ergonomic entry points.
- [`core`]: parameter validation and the processing stages.
- [`types`]: plain data passed between stages (`Threshold`, `BoundingBox`, `CanvasPlan`, ...).
- [`io`]: raster decoding and encoded writers.
- [`error`]: crate-level `Error` and `Result`.
"#]

// Core modules (public)
pub mod api;
pub mod core;
pub mod error;
pub mod io;
pub mod types;

// HTTP wrapper (only available with the service feature)
#[cfg(feature = "service")]
pub mod service;

// Curated public API surface
// Types
pub use core::params::{CanvasParams, ValidatedParams};
pub use error::{Error, ErrorKind, Result};
pub use types::{
    BoundingBox, CanvasPlan, MarginFill, OutputFormat, PaddedBox, Threshold, ThresholdMode,
};

// Raster
pub use io::raster::Raster;

// Pipeline
pub use core::processing::pipeline::{ExtendReport, extend_canvas};

// High-level API re-exports
pub use api::{
    OutputOptions, ProcessedImage, extend_and_encode, extend_bytes_to_buffer,
    extend_path_to_buffer, extend_path_to_path, extend_raster,
};
