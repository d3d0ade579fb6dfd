//! # API Version Ordering
//!
//! API versions come in two shapes: date-stamped (`2025-07-01`,
//! `2021-04-01-preview`, `package-2022_01_01`) and legacy dotted numbers
//! (`7.0`, `v7.1`). Every recent version is date-stamped, so dated strings
//! always sort after non-dated ones.
//!
//! This module provides the ordering used everywhere versions or tags are
//! compared, plus the "latest tag of a kind" selection used by the default
//! tag checks.

use std::cmp::Ordering;
use std::sync::LazyLock;

use regex::{Captures, Regex};
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

static DASHED_DATE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d{4})-(\d{2})-(\d{2})").expect("date regex is valid"));

static UNDERSCORED_DATE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d{4})_(\d{2})_(\d{2})").expect("date regex is valid"));

/// Substring that marks a tag or version as a preview.
pub const PREVIEW_MARKER: &str = "preview";

/// Stability class of a tag or version.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VersionKind {
    Stable,
    Preview,
}

impl VersionKind {
    /// Classify a tag or version string by the presence of [`PREVIEW_MARKER`].
    pub fn of(value: &str) -> Self {
        if value.contains(PREVIEW_MARKER) {
            VersionKind::Preview
        } else {
            VersionKind::Stable
        }
    }
}

/// Compare two API version strings.
///
/// Date-based strings sort after all non-date-based strings. Two date-based
/// strings are ordered by their date; two non-date-based strings by a
/// comparison that ignores case and diacritics. Remaining ties fall through to the raw text,
/// so only identical strings compare `Equal`.
pub fn compare_api_version(a: &str, b: &str) -> Ordering {
    match (date_of(a), date_of(b)) {
        (Some(_), None) => Ordering::Greater,
        (None, Some(_)) => Ordering::Less,
        (Some(date_a), Some(date_b)) => date_a
            .cmp(&date_b)
            .then_with(|| invariant_compare(a, b)),
        (None, None) => invariant_compare(a, b),
    }
}

fn invariant_compare(a: &str, b: &str) -> Ordering {
    fold(a).cmp(fold(b)).then_with(|| a.cmp(b))
}

/// Lowercase `value` with combining marks removed after canonical
/// decomposition, so `é` and `E` fold to `e`.
fn fold(value: &str) -> impl Iterator<Item = char> + '_ {
    value
        .nfd()
        .filter(|c| !is_combining_mark(*c))
        .flat_map(char::to_lowercase)
}

/// The `(year, month, day)` of the first date-shaped substring, dashes or
/// underscores.
fn date_of(value: &str) -> Option<(u32, u32, u32)> {
    DASHED_DATE
        .captures(value)
        .or_else(|| UNDERSCORED_DATE.captures(value))
        .and_then(|captures| parse_date(&captures))
}

fn parse_date(captures: &Captures<'_>) -> Option<(u32, u32, u32)> {
    let field = |i: usize| captures.get(i)?.as_str().parse::<u32>().ok();
    Some((field(1)?, field(2)?, field(3)?))
}

/// Sort the dated subset of `versions` chronologically.
///
/// Strings carrying a `YYYY-MM-DD` date are preferred; only when none does are
/// `YYYY_MM_DD` strings considered. Undated strings are dropped.
pub fn sort_by_api_version<'a>(versions: &[&'a str]) -> Vec<&'a str> {
    for pattern in [&*DASHED_DATE, &*UNDERSCORED_DATE] {
        let mut dated: Vec<(&str, (u32, u32, u32))> = versions
            .iter()
            .filter_map(|v| {
                let captures = pattern.captures(v)?;
                Some((*v, parse_date(&captures)?))
            })
            .collect();
        if !dated.is_empty() {
            dated.sort_by(|(a, date_a), (b, date_b)| {
                date_a.cmp(date_b).then_with(|| invariant_compare(a, b))
            });
            return dated.into_iter().map(|(v, _)| v).collect();
        }
    }
    Vec::new()
}

/// The most recent dated tag of the given kind, or `None` when no tag
/// qualifies.
pub fn latest_tag<'a, I>(tags: I, kind: VersionKind) -> Option<&'a str>
where
    I: IntoIterator<Item = &'a str>,
{
    let filtered: Vec<&str> = tags
        .into_iter()
        .filter(|tag| VersionKind::of(tag) == kind)
        .collect();
    sort_by_api_version(&filtered).pop()
}
