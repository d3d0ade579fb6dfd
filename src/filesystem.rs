//! Filesystem access for validation runs
//!
//! The validation engine never touches `std::fs` directly. It goes through
//! [`SpecFs`], which has two implementations: [`DiskFs`] for real
//! specification trees and [`MemoryFS`] for tests and benchmarks.

use std::collections::BTreeMap;
use std::io;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::path::normalize_path;

/// Directories never descended into when listing a tree.
const SKIP_DIRS: &[&str] = &[".git", "node_modules"];

/// Read-only view of a specification tree.
///
/// Implementations must be shareable across the worker threads that validate
/// independent readmes.
pub trait SpecFs: Send + Sync {
    /// Read the whole file.
    ///
    /// A missing file fails with [`io::ErrorKind::NotFound`]; reading a
    /// directory fails with [`io::ErrorKind::IsADirectory`].
    fn read(&self, path: &Path) -> io::Result<Vec<u8>>;

    /// `true` when `path` names an existing file or directory.
    fn exists(&self, path: &Path) -> bool;

    /// Every file below `dir`, recursively, in sorted order.
    ///
    /// A directory that does not exist has no files.
    fn list_files(&self, dir: &Path) -> Result<Vec<PathBuf>>;
}

/// [`SpecFs`] backed by the real filesystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct DiskFs;

impl SpecFs for DiskFs {
    fn read(&self, path: &Path) -> io::Result<Vec<u8>> {
        std::fs::read(path)
    }

    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn list_files(&self, dir: &Path) -> Result<Vec<PathBuf>> {
        if !dir.is_dir() {
            return Ok(Vec::new());
        }

        let mut files = Vec::new();
        for entry in walkdir::WalkDir::new(dir).into_iter().filter_entry(|e| {
            e.depth() == 0
                || !e
                    .file_name()
                    .to_str()
                    .is_some_and(|name| SKIP_DIRS.contains(&name))
        }) {
            let entry = entry.map_err(|e| Error::Filesystem {
                message: format!("Failed to list {}: {}", dir.display(), e),
            })?;
            if entry.file_type().is_file() {
                files.push(normalize_path(entry.path()));
            }
        }
        files.sort();
        Ok(files)
    }
}

/// In-memory filesystem
///
/// Paths are normalized on insertion so lookups by resolved reference paths
/// hit regardless of how the caller spelled them.
#[derive(Debug, Clone, Default)]
pub struct MemoryFS {
    files: BTreeMap<PathBuf, Vec<u8>>,
}

impl MemoryFS {
    /// Create a new empty filesystem
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a file with raw content
    pub fn add_file_content<P: AsRef<Path>>(&mut self, path: P, content: Vec<u8>) {
        self.files.insert(normalize_path(path.as_ref()), content);
    }

    /// Add or replace a file with string content
    pub fn add_file_string<P: AsRef<Path>>(&mut self, path: P, content: &str) {
        self.add_file_content(path, content.as_bytes().to_vec());
    }

    /// Remove a file, returning its content
    pub fn remove_file<P: AsRef<Path>>(&mut self, path: P) -> Option<Vec<u8>> {
        self.files.remove(&normalize_path(path.as_ref()))
    }

    /// Get the number of files
    pub fn len(&self) -> usize {
        self.files.len()
    }

    /// Check if filesystem is empty
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    fn is_dir(&self, path: &Path) -> bool {
        self.files
            .keys()
            .any(|file| file != path && file.starts_with(path))
    }
}

impl SpecFs for MemoryFS {
    fn read(&self, path: &Path) -> io::Result<Vec<u8>> {
        let path = normalize_path(path);
        if let Some(content) = self.files.get(&path) {
            return Ok(content.clone());
        }
        if self.is_dir(&path) {
            return Err(io::Error::new(
                io::ErrorKind::IsADirectory,
                format!("{} is a directory", path.display()),
            ));
        }
        Err(io::Error::new(
            io::ErrorKind::NotFound,
            format!("{} not found", path.display()),
        ))
    }

    fn exists(&self, path: &Path) -> bool {
        let path = normalize_path(path);
        self.files.contains_key(&path) || self.is_dir(&path)
    }

    fn list_files(&self, dir: &Path) -> Result<Vec<PathBuf>> {
        let dir = normalize_path(dir);
        Ok(self
            .files
            .keys()
            .filter(|file| **file != dir && file.starts_with(&dir))
            .cloned()
            .collect())
    }
}
