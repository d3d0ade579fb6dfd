//! `$ref` extraction.
//!
//! [`extract_references`] walks a JSON document lazily and yields every string
//! stored under a `$ref` key. [`referenced_files`] turns those strings into the
//! absolute paths of the documents they point to, dropping same-document
//! fragments and remote URLs.

use std::path::{Path, PathBuf};

use serde_json::Value;

use crate::path::resolve_reference;

/// Key that marks a cross-document pointer.
pub const REF_KEY: &str = "$ref";

/// A `$ref` split into the document it names and the fragment inside it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Reference<'a> {
    /// Document part; empty for a same-document pointer such as `#/definitions/A`.
    pub url: &'a str,
    /// JSON pointer after the first `#`, empty when absent.
    pub fragment: &'a str,
}

impl<'a> Reference<'a> {
    /// Split on the first `#`.
    pub fn parse(value: &'a str) -> Self {
        match value.split_once('#') {
            Some((url, fragment)) => Reference { url, fragment },
            None => Reference {
                url: value,
                fragment: "",
            },
        }
    }
}

enum Pending<'a> {
    Value(&'a Value),
    Ref(&'a str),
}

/// Depth-first iterator over the `$ref` strings of a document.
///
/// Members are visited in the document map's iteration order, so the sequence
/// is deterministic for a given document.
pub struct References<'a> {
    stack: Vec<Pending<'a>>,
}

impl<'a> Iterator for References<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(pending) = self.stack.pop() {
            match pending {
                Pending::Ref(target) => return Some(target),
                Pending::Value(Value::Object(map)) => {
                    for (key, value) in map.iter().rev() {
                        match value {
                            Value::String(target) if key == REF_KEY => {
                                self.stack.push(Pending::Ref(target))
                            }
                            _ => self.stack.push(Pending::Value(value)),
                        }
                    }
                }
                Pending::Value(Value::Array(items)) => {
                    self.stack
                        .extend(items.iter().rev().map(Pending::Value));
                }
                Pending::Value(_) => {}
            }
        }
        None
    }
}

/// Lazily yield every `$ref` string in `document`.
pub fn extract_references(document: &Value) -> References<'_> {
    References {
        stack: vec![Pending::Value(document)],
    }
}

/// Absolute paths of the documents referenced from `file`.
pub fn referenced_files<'a>(
    file: &'a Path,
    document: &'a Value,
) -> impl Iterator<Item = PathBuf> + 'a {
    extract_references(document)
        .map(Reference::parse)
        .filter(|reference| !reference.url.is_empty())
        .filter_map(move |reference| resolve_reference(file, reference.url))
}
