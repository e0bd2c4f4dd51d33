//! Command Line Interface (CLI) layer for stac-sentinel.
//!
//! This module defines argument parsing (`args`), error types (`errors`),
//! and the orchestration logic (`runner`) for single-file and batch
//! transforms. It wires user-provided options to the library functionality
//! exposed via `stac_sentinel::api`.
pub mod args;
pub mod errors;
pub mod runner;

pub use args::CliArgs;
pub use runner::run;
