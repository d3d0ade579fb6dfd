//! CLI argument parsing and command dispatch

use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};

use crate::commands;
use avocado::output::OutputConfig;

/// Avocado - Validate references between files of an AutoRest specification repository
#[derive(Parser, Debug)]
#[command(name = "avocado")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    command: Commands,

    /// Colorize output (always, never, auto)
    #[arg(long, global = true, value_name = "WHEN", default_value = "auto")]
    color: String,

    /// Set log level (error, warn, info, debug, trace)
    #[arg(long, global = true, value_name = "LEVEL", default_value = "warn")]
    log_level: String,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Validate the specification folder of a repository
    Validate(commands::validate::ValidateArgs),

    /// List files a pull request changes
    Diff(commands::diff::DiffArgs),

    /// List the default-tag and latest stable files of readmes
    Files(commands::files::FilesArgs),
}

impl Cli {
    pub fn output_config(&self) -> OutputConfig {
        OutputConfig::from_env_and_flag(&self.color)
    }

    /// Initialise `env_logger` at the requested level, writing to stderr.
    ///
    /// `RUST_LOG` still wins when set.
    pub fn init_logging(&self) {
        let mut builder = env_logger::Builder::new();
        builder
            .parse_filters(&self.log_level)
            .parse_env("RUST_LOG")
            .format_timestamp(None)
            .target(env_logger::Target::Stderr);
        // a second initialisation in the same process is harmless
        let _ = builder.try_init();
    }

    /// Execute the CLI command
    pub fn execute(self) -> Result<ExitCode> {
        let out = self.output_config();
        match self.command {
            Commands::Validate(args) => commands::validate::execute(args, &out),
            Commands::Diff(args) => commands::diff::execute(args),
            Commands::Files(args) => commands::files::execute(args),
        }
    }
}
