//! Thin wrapper over the system `git` binary.
//!
//! Every command runs with `GIT_TERMINAL_PROMPT=0` so a missing credential
//! fails the command instead of blocking on a prompt.

use std::path::{Path, PathBuf};
use std::process::Command;

use log::debug;

use crate::error::{Error, Result};

/// Captured output of a successful `git` invocation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExecResult {
    pub stdout: String,
    pub stderr: String,
}

/// Run `git <args>` in `repo_dir`.
///
/// A non-zero exit status is an [`Error::GitCommand`] carrying stderr.
pub fn run(repo_dir: &Path, args: &[&str]) -> Result<ExecResult> {
    let command = args.join(" ");
    debug!("git {} (in {})", command, repo_dir.display());

    let output = Command::new("git")
        .args(args)
        .current_dir(repo_dir)
        .env("GIT_TERMINAL_PROMPT", "0")
        .output()
        .map_err(|e| Error::GitCommand {
            command: command.clone(),
            dir: repo_dir.to_path_buf(),
            stderr: e.to_string(),
        })?;

    let result = ExecResult {
        stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
        stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
    };
    if !output.status.success() {
        return Err(Error::GitCommand {
            command,
            dir: repo_dir.to_path_buf(),
            stderr: result.stderr.trim().to_string(),
        });
    }
    if !result.stdout.is_empty() {
        debug!("git {}: {}", command, result.stdout.trim_end());
    }
    Ok(result)
}

/// `true` when `dir` is inside a git work tree.
pub fn is_repository(dir: &Path) -> bool {
    run(dir, &["rev-parse", "--is-inside-work-tree"])
        .is_ok_and(|result| result.stdout.trim() == "true")
}

/// Clone `source` (a path or URL) into the existing empty directory `target`.
pub fn clone(source: &Path, target: &Path) -> Result<()> {
    let source = source.to_string_lossy();
    run(target, &["clone", "--quiet", source.as_ref(), "."]).map(|_| ())
}

/// Check out `branch`, resetting it to `start_point` first.
pub fn checkout_at(repo_dir: &Path, branch: &str, start_point: &str) -> Result<()> {
    run(repo_dir, &["checkout", "--quiet", "-B", branch, start_point]).map(|_| ())
}

/// Point `branch` at `start_point`, creating or moving it.
pub fn force_branch(repo_dir: &Path, branch: &str, start_point: &str) -> Result<()> {
    run(repo_dir, &["branch", "--force", branch, start_point]).map(|_| ())
}

/// `true` when a local branch named `branch` exists.
pub fn has_branch(repo_dir: &Path, branch: &str) -> bool {
    let reference = format!("refs/heads/{branch}");
    run(repo_dir, &["rev-parse", "--verify", "--quiet", &reference]).is_ok()
}

/// Kind of change reported by `git diff --name-status`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ChangeKind {
    Added,
    Deleted,
    Modified,
}

impl ChangeKind {
    fn from_status(status: &str) -> Option<Self> {
        match status.chars().next()? {
            'A' => Some(ChangeKind::Added),
            'D' => Some(ChangeKind::Deleted),
            // type changes and unmerged entries still alter the file
            'M' | 'T' | 'U' => Some(ChangeKind::Modified),
            _ => None,
        }
    }
}

/// A path changed between two revisions, relative to the repository root.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FileChange {
    pub kind: ChangeKind,
    pub path: PathBuf,
}

/// Parse the output of `git diff --name-status --no-renames`.
///
/// Lines with an unknown status letter are skipped.
pub fn parse_name_status(output: &str) -> Vec<FileChange> {
    output
        .lines()
        .filter_map(|line| {
            let (status, path) = line.split_once('\t')?;
            let kind = ChangeKind::from_status(status.trim())?;
            Some(FileChange {
                kind,
                path: PathBuf::from(path.trim()),
            })
        })
        .collect()
}

/// Files that differ between `from` and `to`.
pub fn diff_name_status(repo_dir: &Path, from: &str, to: &str) -> Result<Vec<FileChange>> {
    let result = run(repo_dir, &["diff", "--name-status", "--no-renames", from, to])?;
    Ok(parse_name_status(&result.stdout))
}
