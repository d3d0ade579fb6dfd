//! # Error Suggestions
//!
//! Helpers that build command errors which say what went wrong AND how to
//! fix it.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use crate::suggestions;
//!
//! // Instead of:
//! anyhow::bail!("Configuration file not found: {}", path.display());
//!
//! // Use:
//! return Err(suggestions::config_not_found(path));
//! ```

use std::path::Path;

/// Generate an error for an explicitly requested settings file that does not
/// exist.
pub fn config_not_found(path: &Path) -> anyhow::Error {
    anyhow::anyhow!(
        "Configuration file not found: {path}\n\n\
         hint: Create a .avocado.yaml file in the repository root\n\
         hint: Use --config to specify a different path, or omit it to use defaults",
        path = path.display()
    )
}

/// Generate an error for a working directory that does not exist.
pub fn working_dir_not_found(path: &Path) -> anyhow::Error {
    anyhow::anyhow!(
        "Working directory not found: {path}\n\n\
         hint: Pass the root of a specification repository with -d/--dir\n\
         hint: The directory should contain a 'specification' folder",
        path = path.display()
    )
}

/// Generate an error for an invalid glob pattern.
///
/// Includes hints about glob syntax.
pub fn invalid_glob(pattern: &str, error: &glob::PatternError) -> anyhow::Error {
    anyhow::anyhow!(
        "Invalid glob pattern: {pattern}\n\
         error: {error}\n\n\
         hint: Use * for single path component, ** for recursive matching\n\
         hint: Use [abc] for character classes, [!abc] to negate"
    )
}

/// Generate an error for pull request validation outside a git checkout.
pub fn not_a_git_repository(path: &Path) -> anyhow::Error {
    anyhow::anyhow!(
        "Not a git repository: {path}\n\n\
         hint: Pull request validation compares two branches and needs a git checkout\n\
         hint: Unset SYSTEM_PULLREQUEST_TARGETBRANCH to validate the working tree as is",
        path = path.display()
    )
}

/// Find a similar string from a list of candidates using edit distance.
///
/// Returns Some(candidate) if a close match is found (edit distance <= 2).
pub fn find_similar<'a>(input: &str, candidates: &[&'a str]) -> Option<&'a str> {
    candidates
        .iter()
        .filter_map(|&candidate| {
            let distance = edit_distance(input, candidate);
            (distance <= 2 && distance < input.len()).then_some((candidate, distance))
        })
        .min_by_key(|(_, distance)| *distance)
        .map(|(candidate, _)| candidate)
}

/// Levenshtein distance between two strings.
fn edit_distance(a: &str, b: &str) -> usize {
    let b_chars: Vec<char> = b.chars().collect();
    let mut previous: Vec<usize> = (0..=b_chars.len()).collect();

    for (i, a_char) in a.chars().enumerate() {
        let mut current = Vec::with_capacity(previous.len());
        current.push(i + 1);
        for (j, b_char) in b_chars.iter().enumerate() {
            let cost = usize::from(a_char != *b_char);
            let value = (previous[j + 1] + 1)
                .min(current[j] + 1)
                .min(previous[j] + cost);
            current.push(value);
        }
        previous = current;
    }

    previous[b_chars.len()]
}
