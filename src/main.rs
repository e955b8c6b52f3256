//! `extend_canvas` CLI entrypoint.
//!
//! Provides a thin wrapper over the `cli` module: parse args, run the transform
//! once, and exit with a status specific to the failure kind.
//! For programmatic use, prefer the library API (`canvas_extend::api`).

use std::process::ExitCode;

use canvas_extend::ErrorKind;
use clap::Parser;
use clap::error::ErrorKind as ClapErrorKind;

mod cli;

fn main() -> ExitCode {
    let args = match cli::CliArgs::try_parse() {
        Ok(args) => args,
        Err(e) if matches!(e.kind(), ClapErrorKind::DisplayHelp | ClapErrorKind::DisplayVersion) => {
            e.exit()
        }
        Err(e) => {
            // Usage errors share the report format of every other failure.
            let rendered = e.render().to_string();
            let message = rendered.trim().trim_start_matches("error: ");
            eprintln!("error[{}]: {}", ErrorKind::InvalidParameter, message);
            return ExitCode::from(cli::exit_code(ErrorKind::InvalidParameter));
        }
    };
    match cli::run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error[{}]: {}", e.kind(), e);
            ExitCode::from(cli::exit_code(e.kind()))
        }
    }
}
