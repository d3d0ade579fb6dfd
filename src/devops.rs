//! # Pull Request Validation
//!
//! When a pull request build sets `SYSTEM_PULLREQUEST_TARGETBRANCH`, only the
//! findings the pull request introduces are reported: the tree is validated
//! once at the target branch and once at the source, and every finding whose
//! identity already exists at the target is dropped.
//!
//! Branches are switched in a scratch clone, never in the checkout `avocado`
//! was started from. The origin checkout gets two local branches:
//!
//! - [`SOURCE_BRANCH`], forced to the current `HEAD`
//! - the target branch, created from `remotes/origin/<target>` when missing

use std::path::{Path, PathBuf};

use log::{debug, info};
use tempfile::TempDir;

use crate::config::ValidationConfig;
use crate::error::Result;
use crate::filesystem::SpecFs;
use crate::git::{self, FileChange};
use crate::path::normalize_path;
use crate::pipeline::error_map_for_dir;
use crate::validation::ErrorMap;

/// Environment variable naming the branch a pull request merges into.
pub const TARGET_BRANCH_ENV: &str = "SYSTEM_PULLREQUEST_TARGETBRANCH";

/// Local branch name given to the pull request head.
pub const SOURCE_BRANCH: &str = "source-b6791c5f-e0a5-49b1-9175-d7fd3e341cb8";

/// A pull request prepared for differential validation.
#[derive(Debug)]
pub struct PullRequest {
    origin: PathBuf,
    target_branch: String,
    working: TempDir,
}

impl PullRequest {
    /// Prepare branches in `origin` and clone it into a scratch directory.
    pub fn open(origin: &Path, target_branch: &str) -> Result<Self> {
        info!(
            "Preparing pull request validation of {} against {}",
            origin.display(),
            target_branch
        );
        git::force_branch(origin, SOURCE_BRANCH, "HEAD")?;
        if !git::has_branch(origin, target_branch) {
            let remote = format!("remotes/origin/{target_branch}");
            git::force_branch(origin, target_branch, &remote)?;
        }

        let working = tempfile::Builder::new().prefix("avocado-").tempdir()?;
        git::clone(origin, working.path())?;
        debug!("Scratch clone at {}", working.path().display());

        Ok(PullRequest {
            origin: origin.to_path_buf(),
            target_branch: target_branch.to_string(),
            working,
        })
    }

    pub fn target_branch(&self) -> &str {
        &self.target_branch
    }

    pub fn source_branch(&self) -> &str {
        SOURCE_BRANCH
    }

    /// Root of the scratch clone both passes run in.
    pub fn working_dir(&self) -> &Path {
        self.working.path()
    }

    /// Switch the scratch clone to `branch` as it exists in the origin.
    pub fn checkout(&self, branch: &str) -> Result<()> {
        debug!("Checking out {} in the scratch clone", branch);
        git::checkout_at(self.working_dir(), branch, &format!("origin/{branch}"))
    }

    /// Files the pull request adds, deletes or modifies.
    pub fn diff(&self) -> Result<Vec<FileChange>> {
        git::diff_name_status(&self.origin, &self.target_branch, SOURCE_BRANCH)
    }
}

/// Findings present at the source branch and absent at the target branch.
///
/// The two passes run one after the other in the same scratch clone, so
/// findings about the same file carry the same path in both maps. The
/// surviving findings are moved back onto `config.cwd`: the source branch is
/// the origin's `HEAD`, and the scratch clone goes away with `pr`.
pub fn differential<F: SpecFs + ?Sized>(
    fs: &F,
    config: &ValidationConfig,
    pr: &PullRequest,
) -> Result<ErrorMap> {
    let scratch = normalize_path(pr.working_dir());
    let scratch_config = config.with_cwd(&scratch);

    pr.checkout(pr.target_branch())?;
    let target = error_map_for_dir(fs, &scratch_config)?;

    pr.checkout(pr.source_branch())?;
    let mut source = error_map_for_dir(fs, &scratch_config)?;

    source.subtract(&target);
    info!(
        "{} findings at {}, {} introduced by the pull request",
        target.len(),
        pr.target_branch(),
        source.len()
    );
    Ok(source
        .into_values()
        .map(|mut error| {
            error.relocate(&scratch, &config.cwd);
            error
        })
        .collect())
}
