//! Shared test utilities for integration and E2E tests.
//!
//! This module provides a fixture that builds a specification repository in
//! a temporary directory, plus readme snippets used across test files.
//!
//! ## Usage
//!
//! Add `mod common;` to your test file, then use the helpers:
//!
//! ```rust,ignore
//! mod common;
//! use common::prelude::*;
//!
//! #[test]
//! fn test_example() {
//!     let fixture = TestFixture::new()
//!         .with_readme("specification/rp", &readmes::inputs(&["a.json"]))
//!         .with_file("specification/rp/a.json", "{}");
//!     fixture.command().arg("validate").assert().success();
//! }
//! ```

use assert_fs::prelude::*;
use std::path::{Path, PathBuf};
use std::process::Command;

/// Re-export commonly used test dependencies for convenience.
pub mod prelude {
    #[allow(unused_imports)]
    pub use assert_cmd::cargo::cargo_bin_cmd;
    pub use assert_fs::prelude::*;
    #[allow(unused_imports)]
    pub use predicates::prelude::*;

    #[allow(unused_imports)]
    pub use super::git_available;
    #[allow(unused_imports)]
    pub use super::readmes;
    pub use super::TestFixture;
}

/// Readme snippets.
#[allow(dead_code)]
pub mod readmes {
    /// The block quote that marks a readme as AutoRest configuration.
    pub const MARKER: &str = "> see https://aka.ms/autorest\n\n";

    /// An AutoRest readme listing `files` in an untagged block.
    pub fn inputs(files: &[&str]) -> String {
        let mut text = format!("# Service\n\n{MARKER}```yaml\ninput-file:\n");
        for file in files {
            text.push_str(&format!("  - {file}\n"));
        }
        text.push_str("```\n");
        text
    }

    /// An AutoRest readme with a default tag and one block per tag.
    pub fn tagged(default_tag: &str, tags: &[(&str, &[&str])]) -> String {
        let mut text = format!(
            "# Service\n\n{MARKER}## Basic Information\n\n```yaml\ntag: {default_tag}\n```\n\n"
        );
        for (tag, files) in tags {
            text.push_str(&format!("### Tag: {tag}\n\n```yaml $(tag) == '{tag}'\ninput-file:\n"));
            for file in *files {
                text.push_str(&format!("  - {file}\n"));
            }
            text.push_str("```\n\n");
        }
        text
    }
}

/// `true` when a `git` binary can be run.
#[allow(dead_code)]
pub fn git_available() -> bool {
    Command::new("git")
        .arg("--version")
        .output()
        .is_ok_and(|output| output.status.success())
}

/// A specification repository in a temporary directory.
pub struct TestFixture {
    temp_dir: assert_fs::TempDir,
}

#[allow(dead_code)]
impl TestFixture {
    /// Create a new test fixture with an empty temporary directory.
    pub fn new() -> Self {
        Self {
            temp_dir: assert_fs::TempDir::new().expect("Failed to create temp directory"),
        }
    }

    /// Add a `readme.md` in `dir` (relative to the root).
    pub fn with_readme(self, dir: &str, content: &str) -> Self {
        self.with_file(&format!("{dir}/readme.md"), content)
    }

    /// Add a file with the given path and content.
    pub fn with_file(self, path: &str, content: &str) -> Self {
        self.temp_dir
            .child(path)
            .write_str(content)
            .expect("Failed to write file");
        self
    }

    /// Add a `.avocado.yaml` settings file.
    pub fn with_settings(self, content: &str) -> Self {
        self.with_file(".avocado.yaml", content)
    }

    /// Get the path to the temporary directory.
    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Absolute path of `relative` inside the fixture.
    pub fn join(&self, relative: &str) -> PathBuf {
        self.temp_dir.path().join(relative)
    }

    /// Create a child path in the temp directory.
    pub fn child(&self, path: &str) -> assert_fs::fixture::ChildPath {
        self.temp_dir.child(path)
    }

    /// Commit everything on the current branch, initialising the repository
    /// on `main` first when needed.
    pub fn commit_all(&self, message: &str) {
        if !self.path().join(".git").exists() {
            self.git(&["init", "-q", "-b", "main"]);
            self.git(&["config", "user.email", "test@example.com"]);
            self.git(&["config", "user.name", "Test User"]);
            self.git(&["config", "commit.gpgsign", "false"]);
        }
        self.git(&["add", "-A"]);
        self.git(&["commit", "-q", "--allow-empty", "-m", message]);
    }

    /// Run a git command in the fixture, panicking on failure.
    pub fn git(&self, args: &[&str]) {
        let output = Command::new("git")
            .args(args)
            .current_dir(self.path())
            .output()
            .expect("Failed to run git");
        assert!(
            output.status.success(),
            "git {:?} failed: {}",
            args,
            String::from_utf8_lossy(&output.stderr)
        );
    }
}

impl Default for TestFixture {
    fn default() -> Self {
        Self::new()
    }
}

#[allow(dead_code)]
impl TestFixture {
    /// Create a command for the avocado binary, validating this fixture.
    ///
    /// The pull request variable is cleared so a CI environment does not
    /// switch tests into differential mode.
    pub fn command(&self) -> assert_cmd::Command {
        let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("avocado");
        cmd.current_dir(self.path())
            .env_remove("SYSTEM_PULLREQUEST_TARGETBRANCH")
            .env("NO_COLOR", "1");
        cmd
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixture_creates_temp_dir() {
        let fixture = TestFixture::new();
        assert!(fixture.path().exists());
    }

    #[test]
    fn test_fixture_with_readme() {
        let fixture = TestFixture::new().with_readme("specification/rp", &readmes::inputs(&[]));
        assert!(fixture.join("specification/rp/readme.md").exists());
    }

    #[test]
    fn test_tagged_readme_shape() {
        let text = readmes::tagged("package-a", &[("package-a", &["a.json"])]);
        assert!(text.contains("tag: package-a"));
        assert!(text.contains("```yaml $(tag) == 'package-a'"));
        assert!(text.contains("  - a.json"));
    }
}
