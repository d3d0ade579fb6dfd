//! # Configuration
//!
//! A validation run is driven by a [`ValidationConfig`]: the working
//! directory to validate, path exclusions, the number of readmes validated in
//! parallel and the tag name markers that declare aggregate tags. Nothing in
//! the engine consults the process working directory; every entry point
//! receives the directory through this value.
//!
//! Defaults can be stored in an optional `.avocado.yaml` at the root of the
//! specification repository:
//!
//! ```yaml
//! exclude-paths:
//!   - "**/examples/**"
//! concurrency: 4
//! aggregate-tags:
//!   - all-api-versions
//!   - profile
//! ```
//!
//! Command line flags override values from the file.

use std::fs;
use std::path::{Path, PathBuf};

use glob::Pattern;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::suggestions::find_similar;
use crate::tags::DEFAULT_AGGREGATE_MARKER;

/// Settings file looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = ".avocado.yaml";

/// Folder holding the specification tree, relative to the working directory.
pub const SPECIFICATION_DIR: &str = "specification";

const MAX_DEFAULT_CONCURRENCY: usize = 8;

const SETTING_KEYS: &[&str] = &["exclude-paths", "concurrency", "aggregate-tags"];

/// Contents of a settings file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct Settings {
    /// Glob patterns; findings about matching paths are dropped.
    #[serde(default)]
    pub exclude_paths: Vec<String>,
    /// Readmes validated in parallel.
    #[serde(default)]
    pub concurrency: Option<usize>,
    /// Tag name markers that declare a tag as spanning several API versions.
    #[serde(default)]
    pub aggregate_tags: Option<Vec<String>>,
}

/// Parse settings from YAML text.
pub fn parse(yaml_content: &str) -> Result<Settings> {
    if yaml_content.trim().is_empty() {
        return Ok(Settings::default());
    }
    serde_yaml::from_str(yaml_content).map_err(|e| {
        let message = e.to_string();
        let hint = unknown_field(&message)
            .and_then(|field| find_similar(field, SETTING_KEYS))
            .map(|key| format!("Did you mean `{key}`?"));
        Error::ConfigParse { message, hint }
    })
}

/// Read and parse a settings file.
pub fn load(path: &Path) -> Result<Settings> {
    let content = fs::read_to_string(path)?;
    parse(&content)
}

/// The field name in a serde "unknown field `x`" message.
fn unknown_field(message: &str) -> Option<&str> {
    let rest = message.split_once("unknown field `")?.1;
    rest.split_once('`').map(|(field, _)| field)
}

/// Parallelism used when neither the settings nor the command line set one.
pub fn default_concurrency() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
        .min(MAX_DEFAULT_CONCURRENCY)
}

/// Everything one validation pass needs to know.
#[derive(Debug, Clone)]
pub struct ValidationConfig {
    /// Root of the checkout; `specification/` is looked up below it.
    pub cwd: PathBuf,
    pub exclude_paths: Vec<Pattern>,
    pub concurrency: usize,
    pub aggregate_tags: Vec<String>,
}

impl ValidationConfig {
    pub fn new(cwd: impl Into<PathBuf>) -> Self {
        ValidationConfig {
            cwd: cwd.into(),
            exclude_paths: Vec::new(),
            concurrency: default_concurrency(),
            aggregate_tags: vec![DEFAULT_AGGREGATE_MARKER.to_string()],
        }
    }

    /// Apply the values present in `settings`.
    pub fn with_settings(mut self, settings: &Settings) -> Result<Self> {
        self = self.with_exclude_paths(&settings.exclude_paths)?;
        if let Some(concurrency) = settings.concurrency {
            self.concurrency = concurrency.max(1);
        }
        if let Some(markers) = &settings.aggregate_tags {
            self.aggregate_tags = markers.clone();
        }
        Ok(self)
    }

    /// Add exclusion patterns.
    pub fn with_exclude_paths(mut self, patterns: &[String]) -> Result<Self> {
        for pattern in patterns {
            self.exclude_paths.push(Pattern::new(pattern)?);
        }
        Ok(self)
    }

    /// Same configuration rooted at another checkout.
    pub fn with_cwd(&self, cwd: impl Into<PathBuf>) -> Self {
        ValidationConfig {
            cwd: cwd.into(),
            ..self.clone()
        }
    }

    pub fn specification_dir(&self) -> PathBuf {
        self.cwd.join(SPECIFICATION_DIR)
    }

    /// `true` when `path` matches an exclusion pattern, either as given or
    /// relative to the working directory with `/` separators.
    pub fn is_excluded(&self, path: &Path) -> bool {
        if self.exclude_paths.is_empty() {
            return false;
        }
        let relative = path
            .strip_prefix(&self.cwd)
            .ok()
            .map(|p| p.to_string_lossy().replace('\\', "/"));
        self.exclude_paths.iter().any(|pattern| {
            pattern.matches_path(path)
                || relative
                    .as_deref()
                    .is_some_and(|relative| pattern.matches(relative))
        })
    }
}
