//! Files nothing points at.
//!
//! [`unreferenced_files`] compares the JSON files physically present under a
//! readme's directory with the set the walker reached. [`missing_readmes`]
//! looks for API documents that no readme could ever reach because there is
//! no `readme.md` above them.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use crate::path::{api_version_of, has_directory};
use crate::validation::ValidationError;

/// Name of the configuration file, compared case-insensitively.
pub const README_FILE_NAME: &str = "readme.md";

pub fn is_json(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext == "json")
}

pub fn is_readme(path: &Path) -> bool {
    path.file_name()
        .and_then(|name| name.to_str())
        .is_some_and(|name| name.eq_ignore_ascii_case(README_FILE_NAME))
}

/// One [`ValidationError::UnreferencedFile`] per JSON file in `files` that is
/// not in `reachable`.
pub fn unreferenced_files<'a>(
    readme: &Path,
    files: impl IntoIterator<Item = &'a PathBuf>,
    reachable: &BTreeSet<PathBuf>,
) -> Vec<ValidationError> {
    files
        .into_iter()
        .filter(|file| is_json(file) && !reachable.contains(*file))
        .map(|file| ValidationError::UnreferencedFile {
            readme: readme.to_path_buf(),
            json: file.clone(),
        })
        .collect()
}

/// Folders under `specification` holding API documents with no `readme.md`
/// in the folder or any ancestor up to `specification` itself.
///
/// Only JSON files inside an API version folder and outside `examples` count
/// as API documents.
pub fn missing_readmes(specification: &Path, files: &[PathBuf]) -> Vec<ValidationError> {
    let readme_dirs: BTreeSet<&Path> = files
        .iter()
        .filter(|f| is_readme(f))
        .filter_map(|f| f.parent())
        .collect();

    let covered = |dir: &Path| {
        dir.ancestors()
            .take_while(|d| d.starts_with(specification))
            .any(|d| readme_dirs.contains(d))
    };

    let folders: BTreeSet<&Path> = files
        .iter()
        .filter(|f| is_json(f) && api_version_of(f).is_some() && !has_directory(f, "examples"))
        .filter_map(|f| f.parent())
        .filter(|dir| !covered(*dir))
        .collect();

    folders
        .into_iter()
        .map(|folder| ValidationError::MissingReadme {
            folder: folder.to_path_buf(),
        })
        .collect()
}
