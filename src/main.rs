//! # Avocado CLI
//!
//! This is the binary entry point for the `avocado` command-line tool.
//!
//! Its primary responsibilities are:
//! - Parsing command-line arguments using `clap`.
//! - Executing the appropriate command based on the parsed arguments.
//! - Reporting environment faults as an internal error with exit code 1.
//!
//! The core application logic is defined in the `lib.rs` library crate, ensuring
//! that the binary is a thin wrapper around the reusable library functionality.

mod cli;
mod commands;

use std::process::ExitCode;

use clap::Parser;

fn main() -> ExitCode {
    let cli = cli::Cli::parse();
    cli.init_logging();
    let out = cli.output_config();

    match cli.execute() {
        Ok(code) => code,
        Err(e) => {
            eprintln!("{}", out.internal_error());
            eprintln!("{e:#}");
            ExitCode::from(1)
        }
    }
}
