//! # Error Handling
//!
//! This module defines the error type for faults that stop `avocado` from
//! doing its job: unreadable directories, malformed settings files, failing
//! `git` invocations and similar environment problems.
//!
//! Findings about the specification tree itself (missing files, cycles,
//! syntax errors, ...) are *not* represented here. Those are ordinary data,
//! see [`crate::validation::ValidationError`]. Anything that surfaces as an
//! [`Error`] is reported by the CLI as an internal error and fails the run.
//!
//! ## Key Components
//!
//! - **`Error`**: every anticipated environment fault, each variant carrying
//!   the context needed to diagnose it.
//! - **`Result<T>`**: alias for `std::result::Result<T, Error>`.

use std::path::PathBuf;

use thiserror::Error;

/// Main error type for avocado operations
#[derive(Error, Debug)]
pub enum Error {
    /// The settings file could not be parsed.
    ///
    /// Includes an optional hint about how to fix it.
    #[error("Configuration parsing error: {message}{}", hint.as_ref().map(|h| format!("\n  hint: {}", h)).unwrap_or_default())]
    ConfigParse {
        message: String,
        /// Optional hint for how to fix the configuration issue
        hint: Option<String>,
    },

    /// A `git` command exited unsuccessfully or could not be spawned.
    #[error("Git command failed in {}: git {command} - {stderr}", dir.display())]
    GitCommand {
        command: String,
        dir: PathBuf,
        stderr: String,
    },

    /// A filesystem operation failed for a reason other than a missing file.
    #[error("Filesystem operation error: {message}")]
    Filesystem { message: String },

    /// The worker pool used to validate readmes in parallel could not be built.
    #[error("Thread pool error: {message}")]
    ThreadPool { message: String },

    /// An I/O error, wrapped from `std::io::Error`.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A YAML parsing error, wrapped from `serde_yaml::Error`.
    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// A JSON serialization error, wrapped from `serde_json::Error`.
    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    /// A glob pattern error, wrapped from `glob::PatternError`.
    #[error("Glob pattern error: {0}")]
    Glob(#[from] glob::PatternError),
}

/// A convenient type alias for `Result<T, Error>`.
pub type Result<T> = std::result::Result<T, Error>;
