//! Tolerant JSON parsing.
//!
//! Specification documents are parsed with `serde_json`. A syntax error never
//! aborts validation: [`parse`] always returns, with a structured description
//! of the syntax error and, where it can be had, a best-effort document.
//!
//! Recovery re-reads the text as JSON5, which accepts the slips hand-edited
//! documents usually carry (trailing commas, comments, single quotes). The
//! `$ref` links of such a document are still followed, so one stray comma
//! does not turn every file it references into an orphan. A leading byte
//! order mark is dropped before parsing and is not an error.

use std::path::Path;

use log::debug;
use serde::Serialize;
use serde_json::error::Category;
use serde_json::Value;

/// Line and column of a syntax error, both one-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct Position {
    pub line: usize,
    pub column: usize,
}

/// A syntax error reported by the parser.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParseFailure {
    /// Short machine-friendly description, e.g. `trailing comma`.
    pub code: String,
    /// `syntax`, `structure` (premature end of input) or `data`.
    pub kind: String,
    pub message: String,
    pub position: Position,
    /// The offending character, empty at end of input.
    pub token: String,
    pub url: String,
}

/// Outcome of parsing one document.
#[derive(Debug, Clone)]
pub struct ParsedDocument {
    /// `None` when not even lenient parsing could make sense of the text.
    pub document: Option<Value>,
    pub errors: Vec<ParseFailure>,
}

/// Parse `text`, the content of the file at `url`.
pub fn parse(url: &Path, text: &str) -> ParsedDocument {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);
    match serde_json::from_str::<Value>(text) {
        Ok(document) => ParsedDocument {
            document: Some(document),
            errors: Vec::new(),
        },
        Err(err) => {
            let document = json5::from_str::<Value>(text).ok();
            if document.is_some() {
                debug!("Recovered {} despite: {}", url.display(), err);
            }
            ParsedDocument {
                document,
                errors: vec![describe(url, text, &err)],
            }
        }
    }
}

fn describe(url: &Path, text: &str, err: &serde_json::Error) -> ParseFailure {
    let kind = match err.classify() {
        Category::Eof => "structure",
        Category::Syntax => "syntax",
        Category::Data | Category::Io => "data",
    };
    let position = Position {
        line: err.line(),
        column: err.column(),
    };
    let token = token_at(text, position);
    let rendered = err.to_string();
    let code = rendered
        .rsplit_once(" at line ")
        .map(|(head, _)| head)
        .unwrap_or(&rendered)
        .to_string();
    let message = format!(
        "{code}, token: {token}, line: {}, column: {}",
        position.line, position.column
    );
    ParseFailure {
        code,
        kind: kind.to_string(),
        message,
        position,
        token,
        url: url.display().to_string(),
    }
}

/// The character under `position`; `serde_json` columns count bytes.
fn token_at(text: &str, position: Position) -> String {
    if position.line == 0 || position.column == 0 {
        return String::new();
    }
    text.split('\n')
        .nth(position.line - 1)
        .and_then(|line| line.get(position.column - 1..))
        .and_then(|rest| rest.chars().next())
        .map(String::from)
        .unwrap_or_default()
}
