//! # CLI Command Implementations
//!
//! This module contains the implementation for each subcommand of the `avocado`
//! command-line tool. Each subcommand is defined in its own file.
//!
//! Each command module contains:
//! - An `Args` struct that defines the command-specific arguments and options,
//!   derived using `clap`.
//! - An `execute` function that takes the parsed `Args` and returns the
//!   process exit code, calling into the `avocado` library for the core logic.

pub mod diff;
pub mod files;
pub mod validate;
