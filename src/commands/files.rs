//! # Files Command Implementation
//!
//! Prints, as JSON, the files of each given readme's default tag (`latest`)
//! and of its newest stable tag (`stable`). Documentation pipelines use the
//! lists to decide which documents to publish.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::Args;

use avocado::filesystem::DiskFs;
use avocado::readme::swagger_file_list;
use avocado::suggestions;

/// List the default-tag and latest stable files of readmes
#[derive(Args, Debug)]
pub struct FilesArgs {
    /// Readme path relative to DIR (repeatable).
    #[arg(long, value_name = "PATH", required = true)]
    pub readme: Vec<String>,

    /// Repository root the readme paths are relative to.
    #[arg(short, long, value_name = "DIR", default_value = ".")]
    pub dir: PathBuf,

    /// Leave this file (relative to DIR) out of both lists (repeatable).
    #[arg(long, value_name = "PATH")]
    pub exclude: Vec<String>,
}

/// Execute the `files` command.
pub fn execute(args: FilesArgs) -> Result<ExitCode> {
    if !args.dir.is_dir() {
        return Err(suggestions::working_dir_not_found(&args.dir));
    }
    let list = swagger_file_list(&DiskFs, &args.dir, &args.readme, &args.exclude)?;
    println!("{}", serde_json::to_string_pretty(&list)?);
    Ok(ExitCode::SUCCESS)
}
