// Copyright 2026 The Loom Authors
// SPDX-License-Identifier: Apache-2.0

//! Loading and indexing of source files.

use std::fs;
use std::io;
use std::ops::Index;
use std::path::{Path, PathBuf};

use camino::Utf8PathBuf;
use thiserror::Error;

use super::{FileId, SourceFile};

/// Hard ceiling on the size of a single source file: 1 GiB.
///
/// Combined with `u32` span offsets this bounds every lookup structure in
/// the pipeline.
pub const MAX_FILE_SIZE: u64 = 1 << 30;

/// Errors raised while loading source files.
#[derive(Debug, Error)]
pub enum SourceError {
    /// The file could not be read or its path could not be canonicalised.
    #[error("failed to read `{path}`")]
    Io {
        /// The path as given by the caller.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// The canonical path is not valid UTF-8.
    #[error("path `{path}` is not valid UTF-8")]
    NonUtf8Path {
        /// The offending path.
        path: PathBuf,
    },

    /// The file exceeds [`MAX_FILE_SIZE`].
    #[error("`{path}` is {size} bytes, over the 1 GiB source limit")]
    FileTooLarge {
        /// The canonical path of the file.
        path: Utf8PathBuf,
        /// The size reported by the filesystem.
        size: u64,
    },
}

/// An ordered collection of [`SourceFile`]s indexed by dense [`FileId`]s.
///
/// Loading the same canonical path twice returns the same id; updating a
/// file's text in place preserves its id (editor use).
///
/// # Examples
///
/// ```
/// use loom_core::source::SourceManager;
///
/// let mut manager = SourceManager::new();
/// let id = manager.add_virtual("repl", "let x = 1;".to_string());
/// assert_eq!(manager[id].src(), "let x = 1;");
/// ```
#[derive(Debug, Default)]
pub struct SourceManager {
    files: Vec<SourceFile>,
}

impl SourceManager {
    /// Creates an empty manager.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads a file from disk.
    ///
    /// The path is canonicalised first; if a file with the same canonical
    /// path is already loaded its existing id is returned without touching
    /// the filesystem again.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError`] if the path cannot be canonicalised or read,
    /// is not valid UTF-8, or the file is larger than [`MAX_FILE_SIZE`].
    pub fn load_file(&mut self, path: impl AsRef<Path>) -> Result<FileId, SourceError> {
        let path = path.as_ref();
        let canonical = fs::canonicalize(path).map_err(|source| SourceError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let canonical = Utf8PathBuf::from_path_buf(canonical)
            .map_err(|path| SourceError::NonUtf8Path { path })?;

        if let Some(id) = self.file_id_for_path(&canonical) {
            return Ok(id);
        }

        let size = fs::metadata(&canonical)
            .map_err(|source| SourceError::Io {
                path: canonical.clone().into(),
                source,
            })?
            .len();
        if size > MAX_FILE_SIZE {
            return Err(SourceError::FileTooLarge {
                path: canonical,
                size,
            });
        }

        let src = fs::read_to_string(&canonical).map_err(|source| SourceError::Io {
            path: canonical.clone().into(),
            source,
        })?;
        Ok(self.push(SourceFile::new(canonical, src)))
    }

    /// Registers a source that has no backing file (REPL input, unsaved
    /// editor buffers, tests). The name is used verbatim as the path.
    pub fn add_virtual(&mut self, name: impl Into<Utf8PathBuf>, src: String) -> FileId {
        self.push(SourceFile::new(name.into(), src))
    }

    /// Replaces the text of a loaded file in place, preserving its id.
    /// Line starts are recomputed.
    pub fn update(&mut self, id: FileId, src: String) {
        self.files[id.index() as usize].update(src);
    }

    /// Returns the file for an id, or `None` if the id is not from this
    /// manager.
    #[must_use]
    pub fn get(&self, id: FileId) -> Option<&SourceFile> {
        self.files.get(id.index() as usize)
    }

    /// Returns the id of an already-loaded canonical path.
    #[must_use]
    pub fn file_id_for_path(&self, path: &camino::Utf8Path) -> Option<FileId> {
        self.files
            .iter()
            .position(|f| f.path() == path)
            .map(|i| FileId::new(u32::try_from(i).expect("file count fits u32")))
    }

    /// Returns the number of loaded files.
    #[must_use]
    pub fn len(&self) -> usize {
        self.files.len()
    }

    /// Returns true if no files are loaded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    fn push(&mut self, file: SourceFile) -> FileId {
        let id = FileId::new(u32::try_from(self.files.len()).expect("file count fits u32"));
        self.files.push(file);
        id
    }
}

impl Index<FileId> for SourceManager {
    type Output = SourceFile;

    fn index(&self, id: FileId) -> &SourceFile {
        &self.files[id.index() as usize]
    }
}
