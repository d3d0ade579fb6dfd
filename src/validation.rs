//! # Validation Findings
//!
//! Everything `avocado` reports about a specification tree is a
//! [`ValidationError`]. Findings are plain data: producing one never stops a
//! validation pass.
//!
//! ## Correlation
//!
//! Each finding has a [`CorrelationId`] computed from its kind and its stable
//! fields only. Message text, lists of missing files and similar details are
//! deliberately left out, so the same fault found by two independent runs
//! (for example before and after a pull request) yields the same identity.
//! [`ErrorMap`] uses identities to deduplicate one run and to subtract a
//! baseline run from a candidate run.

use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::json::ParseFailure;
use crate::path::has_directory;

/// Where to read about the AutoRest readme format.
pub const AUTOREST_HELP_URL: &str =
    "http://azure.github.io/autorest/user/literate-file-formats/configuration.html#the-file-format";

/// Machine-readable finding code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    JsonParse,
    NotAutorestMarkdown,
    NoJsonFileFound,
    UnreferencedJsonFile,
    CircularReference,
    MultipleApiVersion,
    MissingReadme,
    MissingApisInDefaultTag,
    NotLatestApiVersionInDefaultTag,
    InvalidFileLocation,
}

impl ErrorCode {
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorCode::JsonParse => "JSON_PARSE",
            ErrorCode::NotAutorestMarkdown => "NOT_AUTOREST_MARKDOWN",
            ErrorCode::NoJsonFileFound => "NO_JSON_FILE_FOUND",
            ErrorCode::UnreferencedJsonFile => "UNREFERENCED_JSON_FILE",
            ErrorCode::CircularReference => "CIRCULAR_REFERENCE",
            ErrorCode::MultipleApiVersion => "MULTIPLE_API_VERSION",
            ErrorCode::MissingReadme => "MISSING_README",
            ErrorCode::MissingApisInDefaultTag => "MISSING_APIS_IN_DEFAULT_TAG",
            ErrorCode::NotLatestApiVersionInDefaultTag => "NOT_LATEST_API_VERSION_IN_DEFAULT_TAG",
            ErrorCode::InvalidFileLocation => "INVALID_FILE_LOCATION",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Severity of a finding. Only [`Level::Error`] fails a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub enum Level {
    Info,
    Warning,
    Error,
}

/// A fault found in a specification tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// A JSON document has a syntax error.
    JsonParse { error: ParseFailure },

    /// A `readme.md` lacks the AutoRest recognition marker.
    NotRecognizedConfig { readme: PathBuf },

    /// A file listed by a readme, or referenced from a reached document,
    /// could not be read.
    FileNotFound { readme: PathBuf, json: PathBuf },

    /// A JSON file under the readme's directory that nothing reaches.
    UnreferencedFile { readme: PathBuf, json: PathBuf },

    /// `json` references a document that is still being expanded.
    CircularReference { readme: PathBuf, json: PathBuf },

    /// A tag groups files of more than one API version.
    MultipleApiVersion {
        readme: PathBuf,
        tag: String,
        api_versions: Vec<String>,
    },

    /// A folder holding JSON files has no `readme.md` on its way up to
    /// `specification/`.
    MissingReadme { folder: PathBuf },

    /// The default tag lacks files or operations other tags provide.
    MissingApisInDefaultTag {
        readme: PathBuf,
        tag: String,
        missing_files: Vec<PathBuf>,
        missing_apis: Vec<String>,
    },

    /// A newer tag of the default tag's kind exists.
    NotLatestApiVersionInDefaultTag {
        readme: PathBuf,
        tag: String,
        default_version: String,
        latest_tag: String,
        latest_version: String,
    },

    /// A resource-manager document outside a `resource-manager` folder.
    InvalidFileLocation { readme: PathBuf, json: PathBuf },
}

impl ValidationError {
    pub fn code(&self) -> ErrorCode {
        match self {
            ValidationError::JsonParse { .. } => ErrorCode::JsonParse,
            ValidationError::NotRecognizedConfig { .. } => ErrorCode::NotAutorestMarkdown,
            ValidationError::FileNotFound { .. } => ErrorCode::NoJsonFileFound,
            ValidationError::UnreferencedFile { .. } => ErrorCode::UnreferencedJsonFile,
            ValidationError::CircularReference { .. } => ErrorCode::CircularReference,
            ValidationError::MultipleApiVersion { .. } => ErrorCode::MultipleApiVersion,
            ValidationError::MissingReadme { .. } => ErrorCode::MissingReadme,
            ValidationError::MissingApisInDefaultTag { .. } => ErrorCode::MissingApisInDefaultTag,
            ValidationError::NotLatestApiVersionInDefaultTag { .. } => {
                ErrorCode::NotLatestApiVersionInDefaultTag
            }
            ValidationError::InvalidFileLocation { .. } => ErrorCode::InvalidFileLocation,
        }
    }

    pub fn level(&self) -> Level {
        match self {
            ValidationError::NotRecognizedConfig { .. }
            | ValidationError::MultipleApiVersion { .. }
            | ValidationError::InvalidFileLocation { .. } => Level::Warning,
            _ => Level::Error,
        }
    }

    /// Human readable description; never part of the identity.
    pub fn message(&self) -> &'static str {
        match self {
            ValidationError::JsonParse { .. } => "The file is not a valid JSON file.",
            ValidationError::NotRecognizedConfig { .. } => {
                "The `readme.md` is not an AutoRest markdown file."
            }
            ValidationError::FileNotFound { .. } => {
                "The JSON file is not found but it is referenced from the readme file."
            }
            ValidationError::UnreferencedFile { json, .. } => {
                if has_directory(json, "examples") {
                    "The example JSON file is not referenced from the swagger file."
                } else {
                    "The swagger JSON file is not referenced from the readme file."
                }
            }
            ValidationError::CircularReference { .. } => "The JSON file has a circular reference.",
            ValidationError::MultipleApiVersion { .. } => {
                "The tag contains swagger files of multiple API versions."
            }
            ValidationError::MissingReadme { .. } => {
                "Can not find readme.md in the folder. If no readme.md file, it will block SDK generation."
            }
            ValidationError::MissingApisInDefaultTag { .. } => {
                "The default tag does not contain all APIs in this RP. Please make sure the missing API swaggers are in the default tag."
            }
            ValidationError::NotLatestApiVersionInDefaultTag { .. } => {
                "The default tag does not contain the latest API version. Please make sure the latest api version swaggers are in the default tag."
            }
            ValidationError::InvalidFileLocation { .. } => {
                "The swagger JSON file is not in a `resource-manager` folder."
            }
        }
    }

    /// The file or folder a finding is about, used by path exclusion.
    pub fn primary_path(&self) -> &Path {
        match self {
            ValidationError::JsonParse { error } => Path::new(&error.url),
            ValidationError::NotRecognizedConfig { readme }
            | ValidationError::MultipleApiVersion { readme, .. }
            | ValidationError::MissingApisInDefaultTag { readme, .. }
            | ValidationError::NotLatestApiVersionInDefaultTag { readme, .. } => readme,
            ValidationError::FileNotFound { json, .. }
            | ValidationError::UnreferencedFile { json, .. }
            | ValidationError::CircularReference { json, .. }
            | ValidationError::InvalidFileLocation { json, .. } => json,
            ValidationError::MissingReadme { folder } => folder,
        }
    }

    /// Stable identity of the fault.
    pub fn correlation_id(&self) -> CorrelationId {
        let key = match self {
            ValidationError::JsonParse { error } => vec![
                error.url.clone(),
                error.position.line.to_string(),
                error.position.column.to_string(),
            ],
            ValidationError::NotRecognizedConfig { readme } => vec![display(readme)],
            ValidationError::FileNotFound { readme, json }
            | ValidationError::CircularReference { readme, json } => {
                vec![display(readme), display(json)]
            }
            ValidationError::UnreferencedFile { json, .. }
            | ValidationError::InvalidFileLocation { json, .. } => vec![display(json)],
            ValidationError::MultipleApiVersion { readme, tag, .. }
            | ValidationError::MissingApisInDefaultTag { readme, tag, .. }
            | ValidationError::NotLatestApiVersionInDefaultTag { readme, tag, .. } => {
                vec![display(readme), tag.clone()]
            }
            ValidationError::MissingReadme { folder } => vec![display(folder)],
        };
        CorrelationId {
            code: self.code(),
            key,
        }
    }

    /// Move every path below `from` to the same place below `to`.
    ///
    /// Paths outside `from` are left alone.
    pub fn relocate(&mut self, from: &Path, to: &Path) {
        let move_path = |path: &mut PathBuf| {
            if let Ok(rest) = path.strip_prefix(from) {
                *path = to.join(rest);
            }
        };
        match self {
            ValidationError::JsonParse { error } => {
                let mut url = PathBuf::from(&error.url);
                move_path(&mut url);
                error.url = display(&url);
            }
            ValidationError::NotRecognizedConfig { readme }
            | ValidationError::MultipleApiVersion { readme, .. }
            | ValidationError::NotLatestApiVersionInDefaultTag { readme, .. } => move_path(readme),
            ValidationError::FileNotFound { readme, json }
            | ValidationError::UnreferencedFile { readme, json }
            | ValidationError::CircularReference { readme, json }
            | ValidationError::InvalidFileLocation { readme, json } => {
                move_path(readme);
                move_path(json);
            }
            ValidationError::MissingReadme { folder } => move_path(folder),
            ValidationError::MissingApisInDefaultTag {
                readme,
                missing_files,
                ..
            } => {
                move_path(readme);
                missing_files.iter_mut().for_each(|file| move_path(file));
            }
        }
    }

    /// Serializable view used by every output format.
    pub fn report(&self) -> ErrorReport<'_> {
        let mut report = ErrorReport {
            code: self.code(),
            level: self.level(),
            message: self.message(),
            read_me_url: None,
            json_url: None,
            folder_url: None,
            help_url: None,
            tag: None,
            api_versions: &[],
            missing_files: Vec::new(),
            missing_apis: &[],
            default_version: None,
            latest_tag: None,
            latest_version: None,
            error: None,
        };
        match self {
            ValidationError::JsonParse { error } => report.error = Some(error),
            ValidationError::NotRecognizedConfig { readme } => {
                report.read_me_url = Some(display(readme));
                report.help_url = Some(AUTOREST_HELP_URL);
            }
            ValidationError::FileNotFound { readme, json }
            | ValidationError::UnreferencedFile { readme, json }
            | ValidationError::CircularReference { readme, json }
            | ValidationError::InvalidFileLocation { readme, json } => {
                report.read_me_url = Some(display(readme));
                report.json_url = Some(display(json));
            }
            ValidationError::MultipleApiVersion {
                readme,
                tag,
                api_versions,
            } => {
                report.read_me_url = Some(display(readme));
                report.tag = Some(tag.as_str());
                report.api_versions = api_versions.as_slice();
            }
            ValidationError::MissingReadme { folder } => report.folder_url = Some(display(folder)),
            ValidationError::MissingApisInDefaultTag {
                readme,
                tag,
                missing_files,
                missing_apis,
            } => {
                report.read_me_url = Some(display(readme));
                report.tag = Some(tag.as_str());
                report.missing_files = missing_files.iter().map(|f| display(f)).collect();
                report.missing_apis = missing_apis.as_slice();
            }
            ValidationError::NotLatestApiVersionInDefaultTag {
                readme,
                tag,
                default_version,
                latest_tag,
                latest_version,
            } => {
                report.read_me_url = Some(display(readme));
                report.tag = Some(tag.as_str());
                report.default_version = Some(default_version.as_str());
                report.latest_tag = Some(latest_tag.as_str());
                report.latest_version = Some(latest_version.as_str());
            }
        }
        report
    }
}

fn display(path: &Path) -> String {
    path.display().to_string()
}

/// Rendering of a [`ValidationError`] with the field names tools built
/// around avocado expect (`readMeUrl`, `jsonUrl`, ...).
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorReport<'a> {
    pub code: ErrorCode,
    pub level: Level,
    pub message: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub read_me_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub json_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub folder_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub help_url: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tag: Option<&'a str>,
    #[serde(skip_serializing_if = "<[String]>::is_empty")]
    pub api_versions: &'a [String],
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub missing_files: Vec<String>,
    #[serde(skip_serializing_if = "<[String]>::is_empty")]
    pub missing_apis: &'a [String],
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_version: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latest_tag: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latest_version: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<&'a ParseFailure>,
}

/// Identity of a finding: its code plus its stable fields.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CorrelationId {
    code: ErrorCode,
    key: Vec<String>,
}

/// Findings of one validation pass keyed by identity.
///
/// Inserting a finding whose identity is already present replaces the
/// earlier one. Iteration is ordered by identity, which makes output stable
/// regardless of the order readmes were validated in.
#[derive(Debug, Clone, Default)]
pub struct ErrorMap {
    errors: BTreeMap<CorrelationId, ValidationError>,
}

impl ErrorMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert `error`, replacing any finding with the same identity.
    pub fn insert(&mut self, error: ValidationError) {
        self.errors.insert(error.correlation_id(), error);
    }

    /// Remove every finding whose identity also appears in `baseline`.
    pub fn subtract(&mut self, baseline: &ErrorMap) {
        self.errors.retain(|id, _| !baseline.errors.contains_key(id));
    }

    pub fn contains(&self, error: &ValidationError) -> bool {
        self.errors.contains_key(&error.correlation_id())
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn values(&self) -> impl Iterator<Item = &ValidationError> {
        self.errors.values()
    }

    pub fn into_values(self) -> impl Iterator<Item = ValidationError> {
        self.errors.into_values()
    }
}

impl Extend<ValidationError> for ErrorMap {
    fn extend<I: IntoIterator<Item = ValidationError>>(&mut self, iter: I) {
        for error in iter {
            self.insert(error);
        }
    }
}

impl FromIterator<ValidationError> for ErrorMap {
    fn from_iter<I: IntoIterator<Item = ValidationError>>(iter: I) -> Self {
        let mut map = ErrorMap::new();
        map.extend(iter);
        map
    }
}
