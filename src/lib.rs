//! # Avocado Library
//!
//! This library validates the reference graph of an AutoRest specification
//! repository: the `readme.md` configuration files under `specification/`,
//! the JSON documents they list as inputs, and the `$ref` links between
//! those documents. It is designed to be used by the `avocado` command-line
//! tool but can also be embedded in other tooling.
//!
//! ## Quick Example
//!
//! ```
//! use avocado::config::ValidationConfig;
//! use avocado::filesystem::MemoryFS;
//! use avocado::pipeline;
//! use avocado::validation::ErrorCode;
//!
//! let mut fs = MemoryFS::new();
//! fs.add_file_string(
//!     "/repo/specification/readme.md",
//!     "> see https://aka.ms/autorest\n\n```yaml\ninput-file: a.json\n```\n",
//! );
//! fs.add_file_string("/repo/specification/a.json", r#"{"$ref": "b.json"}"#);
//!
//! let errors = pipeline::validate_specification_folder(&fs, &ValidationConfig::new("/repo")).unwrap();
//! assert_eq!(errors.len(), 1);
//! assert_eq!(errors[0].code(), ErrorCode::NoJsonFileFound);
//! ```
//!
//! ## Core Concepts
//!
//! - **Findings (`validation`)**: every problem in a specification tree is a
//!   [`validation::ValidationError`] value with a code, a level and an
//!   identity used to deduplicate and to compare runs.
//! - **Filesystem (`filesystem`)**: the [`filesystem::SpecFs`] seam, with a
//!   disk implementation and an in-memory one for tests.
//! - **Readmes (`readme`)**: recognition of AutoRest configuration files and
//!   extraction of input files, tags and the default tag.
//! - **Reference walk (`refs`, `walker`)**: `$ref` extraction and an explicit
//!   stack depth-first traversal that reports missing files, parse errors and
//!   cycles.
//! - **Consistency checks (`tags`, `orphan`)**: API version rules for tags and
//!   detection of files nothing references.
//! - **Pull requests (`devops`, `git`)**: differential validation against a
//!   target branch.
//!
//! ## Execution Flow
//!
//! [`pipeline::validate_specification_folder`] finds every readme, validates
//! each one on a bounded rayon pool and merges the findings. Faults of the
//! environment (unreadable directories, failing `git`) are [`error::Error`]
//! values and abort the run.

pub mod api_version;
pub mod config;
pub mod devops;
pub mod error;
pub mod filesystem;
pub mod git;
pub mod json;
pub mod orphan;
pub mod output;
pub mod path;
pub mod pipeline;
pub mod readme;
pub mod refs;
pub mod suggestions;
pub mod tags;
pub mod validation;
pub mod walker;

#[cfg(test)]
mod path_proptest;
