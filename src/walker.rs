//! # Reference Graph Walker
//!
//! Starting from the files a readme lists, the walker reads every document,
//! follows its `$ref` pointers and reports the files it cannot read, the
//! documents that do not parse and the references that close a cycle.
//!
//! ## Traversal
//!
//! Files live in a [`FileArena`] and are addressed by [`FileId`]. Each file
//! carries a [`Color`] in the [`TraversalState`]:
//!
//! - `Unvisited` → `InProgress` when the walker starts expanding it
//! - `InProgress` → `Done` once all of its references were followed
//! - `InProgress` → `Failed` when it cannot be read; it is never retried
//!
//! Reaching a file that is `InProgress` means the current path re-entered
//! itself. The walker reports a [`ValidationError::CircularReference`] at the
//! referencing file and marks the target `Done`, so other paths into the same
//! cycle do not report it again.
//!
//! The depth-first walk keeps its own frame stack rather than recursing, and
//! is exposed as an [`Iterator`] of findings. Once the iterator is exhausted,
//! [`ReferenceWalker::into_outcome`] hands back the reachable set and the
//! parsed documents.

use std::collections::{BTreeMap, BTreeSet, HashMap, VecDeque};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use log::{debug, trace};
use serde_json::Value;

use crate::error::{Error, Result};
use crate::filesystem::SpecFs;
use crate::json;
use crate::refs::referenced_files;
use crate::validation::ValidationError;

/// Index of a file in a [`FileArena`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FileId(usize);

/// A file known to one traversal.
#[derive(Debug, Clone)]
pub struct SpecFile {
    pub path: PathBuf,
    /// The parsed document, once read. `None` before reading, after a read
    /// failure and for text no lenient parse could recover.
    pub document: Option<Value>,
}

/// Files of one traversal, addressed by normalized absolute path.
#[derive(Debug, Default)]
pub struct FileArena {
    files: Vec<SpecFile>,
    index: HashMap<PathBuf, FileId>,
}

impl FileArena {
    /// Id of `path`, adding it when unknown.
    pub fn intern(&mut self, path: PathBuf) -> FileId {
        if let Some(id) = self.index.get(&path) {
            return *id;
        }
        let id = FileId(self.files.len());
        self.index.insert(path.clone(), id);
        self.files.push(SpecFile {
            path,
            document: None,
        });
        id
    }

    pub fn id(&self, path: &Path) -> Option<FileId> {
        self.index.get(path).copied()
    }

    pub fn get(&self, id: FileId) -> &SpecFile {
        &self.files[id.0]
    }

    pub fn path(&self, id: FileId) -> &Path {
        &self.files[id.0].path
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    fn set_document(&mut self, id: FileId, document: Option<Value>) {
        self.files[id.0].document = document;
    }
}

/// Traversal state of a single file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Color {
    Unvisited,
    InProgress,
    Done,
    /// Could not be read; never retried.
    Failed,
}

/// Colour of every file in an arena. Files not yet seen are `Unvisited`.
#[derive(Debug, Default)]
pub struct TraversalState {
    colors: Vec<Color>,
}

impl TraversalState {
    pub fn color(&self, id: FileId) -> Color {
        self.colors.get(id.0).copied().unwrap_or(Color::Unvisited)
    }

    fn set(&mut self, id: FileId, color: Color) {
        if self.colors.len() <= id.0 {
            self.colors.resize(id.0 + 1, Color::Unvisited);
        }
        self.colors[id.0] = color;
    }

    /// `Unvisited` → `InProgress`. Returns `false` for any other colour.
    pub fn begin(&mut self, id: FileId) -> bool {
        if self.color(id) != Color::Unvisited {
            return false;
        }
        self.set(id, Color::InProgress);
        true
    }

    /// `InProgress` → `Done`. Files that already left `InProgress`, through
    /// a cycle or a failure, keep their colour.
    pub fn finish(&mut self, id: FileId) {
        if self.color(id) == Color::InProgress {
            self.set(id, Color::Done);
        }
    }

    /// `InProgress` → `Failed`.
    pub fn fail(&mut self, id: FileId) {
        if self.color(id) == Color::InProgress {
            self.set(id, Color::Failed);
        }
    }

    /// Ids currently of colour `color`.
    pub fn with_color(&self, color: Color) -> impl Iterator<Item = FileId> + '_ {
        self.colors
            .iter()
            .enumerate()
            .filter(move |(_, c)| **c == color)
            .map(|(i, _)| FileId(i))
    }
}

struct Frame {
    id: FileId,
    refs: std::vec::IntoIter<PathBuf>,
}

/// What a finished traversal leaves behind.
#[derive(Debug, Default)]
pub struct WalkOutcome {
    /// Every file that was fully expanded.
    pub reachable: BTreeSet<PathBuf>,
    /// Parsed documents of the reachable files.
    pub documents: BTreeMap<PathBuf, Value>,
}

/// Lazy depth-first traversal of the reference graph of one readme.
///
/// Yields findings as they are discovered. An `Err` item is an environment
/// fault (for example a permission error); the iterator is exhausted after
/// returning one.
pub struct ReferenceWalker<'a, F: SpecFs + ?Sized> {
    fs: &'a F,
    readme: PathBuf,
    arena: FileArena,
    state: TraversalState,
    roots: std::vec::IntoIter<FileId>,
    stack: Vec<Frame>,
    pending: VecDeque<ValidationError>,
    fused: bool,
}

impl<'a, F: SpecFs + ?Sized> ReferenceWalker<'a, F> {
    /// Prepare a walk from `roots`, the files `readme` lists.
    pub fn new(fs: &'a F, readme: &Path, roots: impl IntoIterator<Item = PathBuf>) -> Self {
        let mut arena = FileArena::default();
        let roots: Vec<FileId> = roots.into_iter().map(|p| arena.intern(p)).collect();
        ReferenceWalker {
            fs,
            readme: readme.to_path_buf(),
            arena,
            state: TraversalState::default(),
            roots: roots.into_iter(),
            stack: Vec::new(),
            pending: VecDeque::new(),
            fused: false,
        }
    }

    pub fn arena(&self) -> &FileArena {
        &self.arena
    }

    pub fn state(&self) -> &TraversalState {
        &self.state
    }

    /// Colour of `path`, `None` when the walk has not seen it.
    pub fn color_of(&self, path: &Path) -> Option<Color> {
        self.arena.id(path).map(|id| self.state.color(id))
    }

    /// Read, parse and push `id`, which must be `Unvisited`.
    fn enter(&mut self, id: FileId) -> Result<()> {
        if !self.state.begin(id) {
            return Ok(());
        }
        let path = self.arena.path(id).to_path_buf();
        trace!("Reading {}", path.display());

        let bytes = match self.fs.read(&path) {
            Ok(bytes) => bytes,
            Err(e)
                if matches!(
                    e.kind(),
                    ErrorKind::NotFound | ErrorKind::IsADirectory | ErrorKind::NotADirectory
                ) =>
            {
                debug!("{} is referenced but cannot be read: {}", path.display(), e);
                self.state.fail(id);
                self.pending.push_back(ValidationError::FileNotFound {
                    readme: self.readme.clone(),
                    json: path,
                });
                return Ok(());
            }
            Err(e) => {
                return Err(Error::Filesystem {
                    message: format!("Failed to read {}: {}", path.display(), e),
                });
            }
        };

        let parsed = json::parse(&path, &String::from_utf8_lossy(&bytes));
        self.pending.extend(
            parsed
                .errors
                .into_iter()
                .map(|error| ValidationError::JsonParse { error }),
        );
        let refs: Vec<PathBuf> = match &parsed.document {
            Some(document) => referenced_files(&path, document).collect(),
            None => Vec::new(),
        };
        self.arena.set_document(id, parsed.document);
        self.stack.push(Frame {
            id,
            refs: refs.into_iter(),
        });
        Ok(())
    }

    /// Advance the traversal by one edge or one frame.
    ///
    /// Returns `Ok(false)` once there is nothing left to expand.
    fn step(&mut self) -> Result<bool> {
        let Some(frame) = self.stack.last_mut() else {
            return match self.roots.next() {
                Some(root) => self.enter(root).map(|_| true),
                None => Ok(false),
            };
        };

        let current = frame.id;
        let Some(target) = frame.refs.next() else {
            self.stack.pop();
            self.state.finish(current);
            return Ok(true);
        };

        let target = self.arena.intern(target);
        match self.state.color(target) {
            Color::Unvisited => self.enter(target)?,
            Color::InProgress => {
                debug!(
                    "{} closes a reference cycle through {}",
                    self.arena.path(current).display(),
                    self.arena.path(target).display()
                );
                self.state.set(target, Color::Done);
                self.pending.push_back(ValidationError::CircularReference {
                    readme: self.readme.clone(),
                    json: self.arena.path(current).to_path_buf(),
                });
            }
            Color::Done | Color::Failed => {}
        }
        Ok(true)
    }

    /// The reachable set and documents. Meaningful once the iterator is
    /// exhausted.
    pub fn into_outcome(self) -> WalkOutcome {
        let mut outcome = WalkOutcome::default();
        for (i, SpecFile { path, document }) in self.arena.files.into_iter().enumerate() {
            if self.state.color(FileId(i)) != Color::Done {
                continue;
            }
            if let Some(document) = document {
                outcome.documents.insert(path.clone(), document);
            }
            outcome.reachable.insert(path);
        }
        outcome
    }
}

impl<F: SpecFs + ?Sized> Iterator for ReferenceWalker<'_, F> {
    type Item = Result<ValidationError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(error) = self.pending.pop_front() {
                return Some(Ok(error));
            }
            if self.fused {
                return None;
            }
            match self.step() {
                Ok(true) => {}
                Ok(false) => {
                    self.fused = true;
                }
                Err(e) => {
                    self.fused = true;
                    self.stack.clear();
                    return Some(Err(e));
                }
            }
        }
    }
}
