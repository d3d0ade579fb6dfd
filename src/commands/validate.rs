//! # Validate Command Implementation
//!
//! Runs a validation pass over the `specification` folder of a repository and
//! prints every finding.
//!
//! When a target branch is given, on the command line or through
//! `SYSTEM_PULLREQUEST_TARGETBRANCH`, only the findings introduced relative to
//! that branch are reported.
//!
//! The exit code is 1 when at least one finding is at the `Error` level.

use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Args;
use log::info;

use avocado::config::{self, Settings, ValidationConfig, DEFAULT_CONFIG_FILE};
use avocado::devops::{self, PullRequest, TARGET_BRANCH_ENV};
use avocado::filesystem::DiskFs;
use avocado::git;
use avocado::output::{error_count, render_finding, render_summary, JsonLinesWriter, OutputConfig};
use avocado::path::normalize_path;
use avocado::pipeline;
use avocado::suggestions;
use avocado::validation::ValidationError;

/// Validate the specification folder of a repository
#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// Root of the specification repository.
    #[arg(short, long, value_name = "DIR", default_value = ".")]
    pub dir: PathBuf,

    /// Settings file. Defaults to `.avocado.yaml` in DIR when present.
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Drop findings about paths matching this glob (repeatable).
    #[arg(long, value_name = "GLOB")]
    pub exclude_paths: Vec<String>,

    /// Also write every finding as a JSON line to this file.
    #[arg(short, long, value_name = "PATH")]
    pub file: Option<PathBuf>,

    /// Number of readmes validated in parallel.
    #[arg(long, value_name = "N")]
    pub concurrency: Option<usize>,

    /// Report only findings the current branch adds relative to this branch.
    #[arg(long, value_name = "BRANCH", env = TARGET_BRANCH_ENV)]
    pub target_branch: Option<String>,
}

/// Execute the `validate` command.
pub fn execute(args: ValidateArgs, out: &OutputConfig) -> Result<ExitCode> {
    if !args.dir.is_dir() {
        return Err(suggestions::working_dir_not_found(&args.dir));
    }
    let dir = normalize_path(&std::path::absolute(&args.dir)?);
    let config = build_config(&dir, &args)?;

    let findings: Vec<ValidationError> = match args.target_branch.as_deref() {
        Some(target) if !target.is_empty() => {
            if !git::is_repository(&dir) {
                return Err(suggestions::not_a_git_repository(&dir));
            }
            let pr = PullRequest::open(&dir, target)?;
            devops::differential(&DiskFs, &config, &pr)?
                .into_values()
                .collect()
        }
        _ => pipeline::error_map_for_dir(&DiskFs, &config)?
            .into_values()
            .collect(),
    };

    let mut writer = match &args.file {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("Failed to create {}", path.display()))?;
            Some(JsonLinesWriter::new(BufWriter::new(file)))
        }
        None => None,
    };

    for finding in &findings {
        eprintln!("{}", render_finding(out, finding)?);
        if let Some(writer) = writer.as_mut() {
            writer.write(finding)?;
        }
    }
    if let Some(writer) = writer {
        writer.finish()?;
    }

    let errors = error_count(&findings);
    println!("{}", render_summary(errors));
    info!("{} findings, {} errors", findings.len(), errors);

    Ok(if errors == 0 {
        ExitCode::SUCCESS
    } else {
        ExitCode::from(1)
    })
}

/// Merge the settings file and the command line into a [`ValidationConfig`].
fn build_config(dir: &Path, args: &ValidateArgs) -> Result<ValidationConfig> {
    let settings = load_settings(dir, args.config.as_deref())?;

    for pattern in &args.exclude_paths {
        if let Err(e) = glob::Pattern::new(pattern) {
            return Err(suggestions::invalid_glob(pattern, &e));
        }
    }

    let mut config = ValidationConfig::new(dir)
        .with_settings(&settings)?
        .with_exclude_paths(&args.exclude_paths)?;
    if let Some(concurrency) = args.concurrency {
        config.concurrency = concurrency.max(1);
    }
    Ok(config)
}

fn load_settings(dir: &Path, explicit: Option<&Path>) -> Result<Settings> {
    match explicit {
        Some(path) => {
            if !path.is_file() {
                return Err(suggestions::config_not_found(path));
            }
            Ok(config::load(path)?)
        }
        None => {
            let path = dir.join(DEFAULT_CONFIG_FILE);
            if path.is_file() {
                info!("Using settings from {}", path.display());
                Ok(config::load(&path)?)
            } else {
                Ok(Settings::default())
            }
        }
    }
}
