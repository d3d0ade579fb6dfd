//! # AutoRest Readme Parsing
//!
//! A `readme.md` in a specification tree is literate configuration: prose
//! interleaved with fenced YAML blocks. The blocks list the documents the
//! readme owns (`input-file`) and group them into tags:
//!
//! ````markdown
//! > see https://aka.ms/autorest
//!
//! ## Basic Information
//!
//! ```yaml
//! tag: package-2022-01-01
//! ```
//!
//! ```yaml $(tag) == 'package-2022-01-01'
//! input-file:
//!   - stable/2022-01-01/service.json
//! ```
//! ````
//!
//! [`Readme::parse`] turns such a file into a [`Readme`]. Markdown is read with
//! `pulldown-cmark`; blocks with YAML that does not parse are skipped.

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use log::{debug, warn};
use pulldown_cmark::{CodeBlockKind, Event, Parser, Tag, TagEnd};
use regex::Regex;
use serde::Serialize;
use serde_yaml::Value;

use crate::api_version::{latest_tag, VersionKind};
use crate::error::{Error, Result};
use crate::filesystem::SpecFs;
use crate::path::resolve_input_file;
use crate::validation::ValidationError;

/// Text of the block quote that marks a readme as AutoRest configuration.
pub const AUTOREST_MARKER: &str = "see https://aka.ms/autorest";

/// Heading whose code block declares the default tag.
const BASIC_INFORMATION: &str = "Basic Information";

static TAG_CONDITION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"\$\(tag\)\s*==\s*['"]([^'"]+)['"]"#).expect("tag condition regex is valid")
});

/// A fenced code block and the heading it appears under.
#[derive(Debug, Clone, PartialEq, Eq)]
struct CodeBlock {
    heading: Option<String>,
    info: String,
    literal: String,
}

impl CodeBlock {
    fn language(&self) -> String {
        self.info
            .split_whitespace()
            .next()
            .unwrap_or_default()
            .to_ascii_lowercase()
    }

    fn is_yaml(&self) -> bool {
        self.language() == "yaml"
    }

    fn tag_condition(&self) -> Option<&str> {
        TAG_CONDITION
            .captures(&self.info)
            .and_then(|c| c.get(1))
            .map(|m| m.as_str())
    }

    fn settings(&self, readme: &Path) -> Option<Value> {
        match serde_yaml::from_str::<Value>(&self.literal) {
            Ok(value) => Some(value),
            Err(e) => {
                warn!(
                    "Skipping unparsable `{}` block in {}: {}",
                    self.info,
                    readme.display(),
                    e
                );
                None
            }
        }
    }
}

/// Markdown structure relevant to configuration, in document order.
#[derive(Debug, Default)]
struct Outline {
    is_autorest: bool,
    blocks: Vec<CodeBlock>,
}

fn outline(text: &str) -> Outline {
    let mut out = Outline::default();
    let mut depth = 0usize;
    let mut heading: Option<String> = None;
    let mut heading_text: Option<String> = None;
    let mut code: Option<(String, String)> = None;
    let mut in_top_quote = false;
    let mut quote_child_seen = false;
    // leading text run of the first paragraph of a top-level quote
    let mut quote_text: Option<String> = None;

    for event in Parser::new(text) {
        match event {
            Event::Start(tag) => {
                if in_top_quote && depth == 1 && !quote_child_seen {
                    quote_child_seen = true;
                    if matches!(tag, Tag::Paragraph) {
                        quote_text = Some(String::new());
                    }
                } else if let Some(text) = quote_text.take() {
                    check_marker(&mut out, &text);
                }
                match &tag {
                    Tag::BlockQuote if depth == 0 => {
                        in_top_quote = true;
                        quote_child_seen = false;
                    }
                    Tag::Heading { .. } if depth == 0 => heading_text = Some(String::new()),
                    Tag::CodeBlock(kind) => {
                        let info = match kind {
                            CodeBlockKind::Fenced(info) => info.to_string(),
                            CodeBlockKind::Indented => String::new(),
                        };
                        code = Some((info, String::new()));
                    }
                    _ => {}
                }
                depth += 1;
            }
            Event::End(tag) => {
                depth = depth.saturating_sub(1);
                if let Some(text) = quote_text.take() {
                    check_marker(&mut out, &text);
                }
                match tag {
                    TagEnd::BlockQuote if depth == 0 => in_top_quote = false,
                    TagEnd::Heading(_) => {
                        if let Some(text) = heading_text.take() {
                            heading = Some(text.trim().to_string());
                        }
                    }
                    TagEnd::CodeBlock => {
                        if let Some((info, literal)) = code.take() {
                            out.blocks.push(CodeBlock {
                                heading: heading.clone(),
                                info,
                                literal,
                            });
                        }
                    }
                    _ => {}
                }
            }
            Event::Text(text) => {
                if let Some((_, literal)) = code.as_mut() {
                    literal.push_str(&text);
                } else if let Some(buffer) = heading_text.as_mut() {
                    buffer.push_str(&text);
                } else if let Some(buffer) = quote_text.as_mut() {
                    buffer.push_str(&text);
                }
            }
            Event::Code(text) => {
                if let Some(buffer) = heading_text.as_mut() {
                    buffer.push_str(&text);
                }
                if let Some(text) = quote_text.take() {
                    check_marker(&mut out, &text);
                }
            }
            _ => {
                if let Some(text) = quote_text.take() {
                    check_marker(&mut out, &text);
                }
            }
        }
    }
    out
}

fn check_marker(out: &mut Outline, text: &str) {
    if text == AUTOREST_MARKER {
        out.is_autorest = true;
    }
}

/// `input-file` entries of a settings block, as written.
fn input_files_of(settings: &Value) -> Vec<String> {
    match settings.get("input-file") {
        Some(Value::String(file)) => vec![file.clone()],
        Some(Value::Sequence(files)) => files
            .iter()
            .filter_map(|f| f.as_str().map(str::to_string))
            .collect(),
        _ => Vec::new(),
    }
}

fn tag_of(settings: &Value) -> Option<String> {
    match settings.get("tag")? {
        Value::String(tag) if !tag.is_empty() => Some(tag.clone()),
        _ => None,
    }
}

/// Configuration extracted from one `readme.md`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Readme {
    pub path: PathBuf,
    /// Whether the readme carries the AutoRest marker.
    pub is_autorest: bool,
    /// `input-file` entries of every YAML block, as written, deduplicated.
    pub input_files: Vec<String>,
    /// `input-file` entries per tag, as written.
    pub tags: BTreeMap<String, Vec<String>>,
    pub default_tag: Option<String>,
}

impl Readme {
    /// Read and parse the readme at `path`.
    ///
    /// An unreadable readme is an environment fault, not a finding.
    pub fn load<F: SpecFs + ?Sized>(fs: &F, path: &Path) -> Result<Self> {
        let bytes = fs.read(path).map_err(|e| Error::Filesystem {
            message: format!("Failed to read {}: {}", path.display(), e),
        })?;
        Ok(Self::parse(path, &String::from_utf8_lossy(&bytes)))
    }

    pub fn parse(path: &Path, text: &str) -> Self {
        let outline = outline(text);
        let mut input_files: Vec<String> = Vec::new();
        let mut tags: BTreeMap<String, Vec<String>> = BTreeMap::new();
        let mut basic_tag = None;
        let mut fallback_tag = None;

        for block in &outline.blocks {
            let language = block.language();
            if language != "yaml" && language != "json" {
                continue;
            }
            let Some(settings) = block.settings(path) else {
                continue;
            };

            if block.is_yaml() {
                let files = input_files_of(&settings);
                for file in &files {
                    if !input_files.contains(file) {
                        input_files.push(file.clone());
                    }
                }
                if let Some(tag) = block.tag_condition() {
                    let entry = tags.entry(tag.to_string()).or_default();
                    for file in files {
                        if !entry.contains(&file) {
                            entry.push(file);
                        }
                    }
                }
            }

            let is_basic = block
                .heading
                .as_deref()
                .is_some_and(|h| h.eq_ignore_ascii_case(BASIC_INFORMATION));
            if is_basic && basic_tag.is_none() {
                basic_tag = tag_of(&settings);
            }
            let plain = block.info.trim().eq_ignore_ascii_case(&language);
            if plain && fallback_tag.is_none() {
                fallback_tag = tag_of(&settings);
            }
        }

        let default_tag = basic_tag.or(fallback_tag);
        debug!(
            "Parsed {}: {} input files, {} tags, default tag {:?}",
            path.display(),
            input_files.len(),
            tags.len(),
            default_tag
        );

        Readme {
            path: path.to_path_buf(),
            is_autorest: outline.is_autorest,
            input_files,
            tags,
            default_tag,
        }
    }

    pub fn dir(&self) -> &Path {
        self.path.parent().unwrap_or(Path::new(""))
    }

    /// Absolute paths of every file the readme lists, in first-seen order.
    pub fn root_files(&self) -> Vec<PathBuf> {
        let mut seen = BTreeSet::new();
        self.input_files
            .iter()
            .map(|f| resolve_input_file(self.dir(), f))
            .filter(|f| seen.insert(f.clone()))
            .collect()
    }

    /// Absolute paths of the files listed under `tag`.
    pub fn tag_files(&self, tag: &str) -> BTreeSet<PathBuf> {
        self.tags
            .get(tag)
            .map(|files| {
                files
                    .iter()
                    .map(|f| resolve_input_file(self.dir(), f))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Absolute-path tag mapping.
    pub fn tag_mapping(&self) -> BTreeMap<&str, BTreeSet<PathBuf>> {
        self.tags
            .keys()
            .map(|tag| (tag.as_str(), self.tag_files(tag)))
            .collect()
    }

    /// Findings about the readme itself.
    pub fn findings(&self) -> Vec<ValidationError> {
        if self.is_autorest {
            Vec::new()
        } else {
            vec![ValidationError::NotRecognizedConfig {
                readme: self.path.clone(),
            }]
        }
    }
}

/// Files published for documentation, relative to the repository root.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SwaggerFileList {
    /// Files of each readme's default tag.
    pub latest: Vec<String>,
    /// Files of each readme's latest stable tag.
    pub stable: Vec<String>,
}

/// Collect the default-tag and latest-stable-tag files of `readme_files`
/// (paths relative to `root`), dropping any listed in `exclude_files`.
pub fn swagger_file_list<F: SpecFs + ?Sized>(
    fs: &F,
    root: &Path,
    readme_files: &[String],
    exclude_files: &[String],
) -> Result<SwaggerFileList> {
    let mut list = SwaggerFileList::default();
    for readme_file in readme_files {
        let readme = Readme::load(fs, &root.join(readme_file))?;
        let prefix = match readme_file.rfind(['/', '\\']) {
            Some(i) => &readme_file[..=i],
            None => "",
        };
        let relative = |file: &String| format!("{}{}", prefix, file).replace('\\', "/");

        if let Some(tag) = &readme.default_tag {
            list.latest
                .extend(readme.tags.get(tag).into_iter().flatten().map(relative));
        }
        if let Some(tag) = latest_tag(readme.tags.keys().map(String::as_str), VersionKind::Stable)
        {
            list.stable
                .extend(readme.tags.get(tag).into_iter().flatten().map(relative));
        }
    }
    let excluded: BTreeSet<String> = exclude_files.iter().map(|f| f.replace('\\', "/")).collect();
    list.latest.retain(|f| !excluded.contains(f));
    list.stable.retain(|f| !excluded.contains(f));
    Ok(list)
}
