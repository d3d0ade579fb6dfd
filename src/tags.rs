//! # Tag Consistency
//!
//! Checks the tag mapping of a readme against the API versions encoded in
//! file paths:
//!
//! - every tag other than an aggregate one covers a single API version
//! - the default tag holds every file other tags list for the versions it
//!   covers, and every operation the latest stable and preview tags expose
//! - no tag of the default tag's kind is newer than the default tag
//!
//! It also flags resource-manager documents stored outside a
//! `resource-manager` folder.

use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

use log::debug;
use serde_json::Value;

use crate::api_version::{compare_api_version, latest_tag, VersionKind};
use crate::path::{api_version_of, has_directory, normalize_api_path};
use crate::readme::Readme;
use crate::validation::ValidationError;

/// Tag name marker used when none is configured.
pub const DEFAULT_AGGREGATE_MARKER: &str = "all-api-versions";

/// Top-level keys holding operation paths.
const PATH_KEYS: &[&str] = &["paths", "x-ms-paths"];

/// Distinct API versions of `files`, oldest first.
fn api_versions<'a>(files: impl IntoIterator<Item = &'a PathBuf>) -> Vec<String> {
    let mut versions: Vec<String> = files
        .into_iter()
        .filter_map(|f| api_version_of(f))
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();
    versions.sort_by(|a, b| compare_api_version(a, b));
    versions
}

/// The newest API version among `files`.
fn effective_version(files: &BTreeSet<PathBuf>) -> Option<String> {
    api_versions(files).pop()
}

/// Normalized operation paths declared by `document`.
pub fn api_paths(document: &Value) -> impl Iterator<Item = String> + '_ {
    PATH_KEYS
        .iter()
        .filter_map(|key| document.get(*key).and_then(Value::as_object))
        .flat_map(|paths| paths.keys())
        .map(|path| normalize_api_path(path))
}

fn api_paths_of(files: &BTreeSet<PathBuf>, documents: &BTreeMap<PathBuf, Value>) -> BTreeSet<String> {
    files
        .iter()
        .filter_map(|f| documents.get(f))
        .flat_map(api_paths)
        .collect()
}

fn is_aggregate(tag: &str, markers: &[String]) -> bool {
    let tag = tag.to_ascii_lowercase();
    markers
        .iter()
        .any(|marker| tag.contains(&marker.to_ascii_lowercase()))
}

/// Run every tag check for `readme`.
///
/// `documents` holds the parsed documents the readme reaches; files missing
/// from it contribute no operations.
pub fn check_tags(
    readme: &Readme,
    documents: &BTreeMap<PathBuf, Value>,
    aggregate_markers: &[String],
) -> Vec<ValidationError> {
    let mapping = readme.tag_mapping();
    let mut errors = Vec::new();

    for (tag, files) in &mapping {
        if is_aggregate(tag, aggregate_markers) {
            continue;
        }
        let versions = api_versions(files);
        if versions.len() > 1 {
            errors.push(ValidationError::MultipleApiVersion {
                readme: readme.path.clone(),
                tag: tag.to_string(),
                api_versions: versions,
            });
        }
    }

    let Some(default_tag) = readme.default_tag.as_deref() else {
        debug!("{} has no default tag", readme.path.display());
        return errors;
    };
    let empty = BTreeSet::new();
    let default_files = mapping.get(default_tag).unwrap_or(&empty);

    errors.extend(missing_apis(readme, default_tag, default_files, &mapping, documents));
    errors.extend(not_latest(readme, default_tag, default_files, &mapping));
    errors
}

fn missing_apis(
    readme: &Readme,
    default_tag: &str,
    default_files: &BTreeSet<PathBuf>,
    mapping: &BTreeMap<&str, BTreeSet<PathBuf>>,
    documents: &BTreeMap<PathBuf, Value>,
) -> Option<ValidationError> {
    let default_versions: BTreeSet<String> =
        default_files.iter().filter_map(|f| api_version_of(f)).collect();

    let missing_files: BTreeSet<PathBuf> = mapping
        .iter()
        .filter(|(tag, _)| **tag != default_tag)
        .flat_map(|(_, files)| files)
        .filter(|f| !default_files.contains(*f))
        .filter(|f| api_version_of(f).is_some_and(|v| default_versions.contains(&v)))
        .cloned()
        .collect();

    let default_paths = api_paths_of(default_files, documents);
    let mut missing_paths = BTreeSet::new();
    for kind in [VersionKind::Stable, VersionKind::Preview] {
        let Some(latest) = latest_tag(mapping.keys().copied(), kind) else {
            continue;
        };
        if latest == default_tag {
            continue;
        }
        missing_paths.extend(
            api_paths_of(&mapping[latest], documents)
                .into_iter()
                .filter(|p| !default_paths.contains(p)),
        );
    }

    if missing_files.is_empty() && missing_paths.is_empty() {
        return None;
    }
    Some(ValidationError::MissingApisInDefaultTag {
        readme: readme.path.clone(),
        tag: default_tag.to_string(),
        missing_files: missing_files.into_iter().collect(),
        missing_apis: missing_paths.into_iter().collect(),
    })
}

fn not_latest(
    readme: &Readme,
    default_tag: &str,
    default_files: &BTreeSet<PathBuf>,
    mapping: &BTreeMap<&str, BTreeSet<PathBuf>>,
) -> Option<ValidationError> {
    let default_version = effective_version(default_files)?;
    let kind = VersionKind::of(&default_version);
    let latest = latest_tag(mapping.keys().copied(), kind)?;
    if latest == default_tag {
        return None;
    }
    let latest_version = effective_version(&mapping[latest])?;
    if compare_api_version(&latest_version, &default_version) != Ordering::Greater {
        return None;
    }
    Some(ValidationError::NotLatestApiVersionInDefaultTag {
        readme: readme.path.clone(),
        tag: default_tag.to_string(),
        default_version,
        latest_tag: latest.to_string(),
        latest_version,
    })
}

/// `true` for a Swagger or OpenAPI document.
fn is_api_document(document: &Value) -> bool {
    document.get("swagger").is_some() || document.get("openapi").is_some()
}

/// Resource-manager documents outside a `resource-manager` folder.
pub fn check_file_locations(
    readme: &Path,
    documents: &BTreeMap<PathBuf, Value>,
) -> Vec<ValidationError> {
    documents
        .iter()
        .filter(|(_, document)| is_api_document(document))
        .filter(|(_, document)| api_paths(document).any(|p| p.contains("/providers/")))
        .filter(|(path, _)| !has_directory(path, "resource-manager"))
        .map(|(path, _)| ValidationError::InvalidFileLocation {
            readme: readme.to_path_buf(),
            json: path.clone(),
        })
        .collect()
}
