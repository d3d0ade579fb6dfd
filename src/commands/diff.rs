//! # Diff Command Implementation
//!
//! Lists the files a pull request adds, deletes or modifies relative to its
//! target branch, one `<kind>\t<path>` line per file.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::Args;

use avocado::devops::{PullRequest, TARGET_BRANCH_ENV};
use avocado::git::{self, ChangeKind};
use avocado::suggestions;

/// List files a pull request changes
#[derive(Args, Debug)]
pub struct DiffArgs {
    /// Branch the pull request merges into.
    #[arg(long, value_name = "BRANCH", env = TARGET_BRANCH_ENV)]
    pub target_branch: String,

    /// Root of the git checkout holding the pull request.
    #[arg(short, long, value_name = "DIR", default_value = ".")]
    pub dir: PathBuf,
}

/// Execute the `diff` command.
pub fn execute(args: DiffArgs) -> Result<ExitCode> {
    if !args.dir.is_dir() {
        return Err(suggestions::working_dir_not_found(&args.dir));
    }
    if !git::is_repository(&args.dir) {
        return Err(suggestions::not_a_git_repository(&args.dir));
    }

    let pr = PullRequest::open(&args.dir, &args.target_branch)?;
    for change in pr.diff()? {
        let kind = match change.kind {
            ChangeKind::Added => "added",
            ChangeKind::Deleted => "deleted",
            ChangeKind::Modified => "modified",
        };
        println!("{}\t{}", kind, change.path.display());
    }
    Ok(ExitCode::SUCCESS)
}
