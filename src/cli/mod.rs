//! Command Line Interface (CLI) layer for the canvas extender.
//!
//! This module defines argument parsing (`args`), the exit status for each
//! failure kind (`errors`), and the orchestration logic (`runner`). It wires
//! user-provided options to the library functionality exposed via
//! `canvas_extend::api`.
//!
//! If you are embedding the extender into another application, prefer the
//! high-level `canvas_extend::api` module instead of calling the CLI code.
pub mod args;
pub mod errors;
pub mod runner;

pub use args::CliArgs;
pub use errors::exit_code;
pub use runner::run;
