//! Path manipulation utilities for avocado
//!
//! Every file in a validation run is addressed by an absolute, lexically
//! normalized path. Nothing here touches the filesystem: `..` and `.` are
//! resolved textually so paths to files that do not exist still compare equal
//! when they name the same location.

use std::path::{Component, Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;

/// A directory component naming an API version, e.g. `2021-04-01`,
/// `2020_05_01-preview` or `v7.1`.
static VERSION_SEGMENT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(?:\d{4}[-_]\d{2}[-_]\d{2}|v?\d+(?:\.\d+)+)(?:-preview)?$")
        .expect("version segment regex is valid")
});

static PATH_PLACEHOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{[^{}/]*\}").expect("placeholder regex is valid"));

/// Resolve `.` and `..` components without consulting the filesystem.
pub fn normalize_path(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    let mut has_root = false;

    for component in path.components() {
        match component {
            Component::Prefix(prefix) => out.push(prefix.as_os_str()),
            Component::RootDir => {
                has_root = true;
                out.push(Component::RootDir.as_os_str());
            }
            Component::CurDir => {}
            Component::ParentDir => {
                if !out.pop() && !has_root {
                    out.push("..");
                }
            }
            Component::Normal(part) => out.push(part),
        }
    }

    out
}

/// Resolve a file name listed in a readme against the readme's directory.
///
/// Readmes written on Windows use `\` as separator, so both separators are
/// accepted regardless of platform.
pub fn resolve_input_file(readme_dir: &Path, input_file: &str) -> PathBuf {
    let mut path = readme_dir.to_path_buf();
    for part in input_file.split(['\\', '/']).filter(|p| !p.is_empty()) {
        path.push(part);
    }
    normalize_path(&path)
}

/// Resolve a `$ref` target against the directory of the referencing file.
///
/// Returns `None` for remote documents (anything with a URI scheme).
pub fn resolve_reference(referencing_file: &Path, target: &str) -> Option<PathBuf> {
    if has_uri_scheme(target) {
        return None;
    }
    let dir = referencing_file.parent().unwrap_or(Path::new(""));
    Some(resolve_input_file(dir, target))
}

fn has_uri_scheme(target: &str) -> bool {
    let Some((scheme, _)) = target.split_once(':') else {
        return false;
    };
    // a single letter is a Windows drive, not a scheme
    if scheme.len() < 2 {
        return false;
    }
    let mut chars = scheme.chars();
    let Some(first) = chars.next() else {
        return false;
    };
    first.is_ascii_alphabetic() && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '.' | '-'))
}

/// The normalized API version encoded in a file's directory path.
///
/// The innermost matching directory wins. The token is lowercased, `_` becomes
/// `-` and a leading `v` is dropped, so `v7.1`, `V7.1` and `7.1` land in the
/// same version group.
pub fn api_version_of(path: &Path) -> Option<String> {
    let dir = path.parent()?;
    dir.components().rev().find_map(|component| {
        let Component::Normal(part) = component else {
            return None;
        };
        let part = part.to_str()?;
        if !VERSION_SEGMENT.is_match(part) {
            return None;
        }
        let token = part.to_ascii_lowercase().replace('_', "-");
        Some(token.strip_prefix('v').map(str::to_string).unwrap_or(token))
    })
}

/// Canonical form of a URL-shaped operation path.
///
/// Placeholder names do not distinguish operations, so
/// `/subscriptions/{subscriptionId}/providers/Foo` and
/// `/Subscriptions/{id}/providers/foo/` normalize to the same string.
pub fn normalize_api_path(template: &str) -> String {
    let collapsed = PATH_PLACEHOLDER.replace_all(template.trim(), "{}");
    let trimmed = collapsed.trim_end_matches('/');
    if trimmed.is_empty() {
        "/".to_string()
    } else {
        trimmed.to_ascii_lowercase()
    }
}

/// `true` when any directory component of `path` equals `name`
/// (ASCII case-insensitive).
pub fn has_directory(path: &Path, name: &str) -> bool {
    path.parent().is_some_and(|dir| {
        dir.components().any(|c| match c {
            Component::Normal(part) => part
                .to_str()
                .is_some_and(|part| part.eq_ignore_ascii_case(name)),
            _ => false,
        })
    })
}
