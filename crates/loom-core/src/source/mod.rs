// Copyright 2026 The Loom Authors
// SPDX-License-Identifier: Apache-2.0

//! Source file identity and position mapping.
//!
//! A [`SourceFile`] owns a file's text together with a sorted array of
//! line-start offsets computed once at load time, so offset → line/column
//! lookups are a binary search and never rescan the text. Files are handed
//! out as dense [`FileId`]s by the [`SourceManager`].
//!
//! Source bytes must outlive every [`Span`](crate::source_analysis::Span)
//! that references them; the manager therefore never drops a loaded file,
//! only replaces its text in place (editor updates).

mod manager;

pub use manager::{MAX_FILE_SIZE, SourceError, SourceManager};

use camino::Utf8PathBuf;

/// A dense handle identifying a loaded source file.
///
/// File ids are indices into the owning [`SourceManager`]; they carry no
/// ownership and are meaningless across managers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FileId(u32);

impl FileId {
    /// Creates a file id from a raw index.
    #[must_use]
    pub const fn new(index: u32) -> Self {
        Self(index)
    }

    /// Returns the raw index.
    #[must_use]
    pub const fn index(self) -> u32 {
        self.0
    }
}

impl std::fmt::Display for FileId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A single source file: path, UTF-8 text, and precomputed line starts.
///
/// # Invariant
///
/// `line_starts` always contains `0` at index 0; subsequent entries are
/// strictly increasing (one past each `\n`).
#[derive(Debug, Clone)]
pub struct SourceFile {
    path: Utf8PathBuf,
    src: String,
    line_starts: Vec<u32>,
}

impl SourceFile {
    /// Creates a source file, computing its line-start table.
    #[must_use]
    pub fn new(path: Utf8PathBuf, src: String) -> Self {
        let line_starts = compute_line_starts(&src);
        Self {
            path,
            src,
            line_starts,
        }
    }

    /// Returns the file's path.
    #[must_use]
    pub fn path(&self) -> &camino::Utf8Path {
        &self.path
    }

    /// Returns the file's text.
    #[must_use]
    pub fn src(&self) -> &str {
        &self.src
    }

    /// Returns the number of lines (a final newline does not open a new
    /// countable line unless text follows it; an empty file has one line).
    #[must_use]
    pub fn line_count(&self) -> u32 {
        #[expect(
            clippy::cast_possible_truncation,
            reason = "line starts are bounded by the 1 GiB file limit"
        )]
        let count = self.line_starts.len() as u32;
        count
    }

    /// Replaces the file's text, recomputing line starts. The file keeps its
    /// identity (editor update-in-place).
    pub fn update(&mut self, src: String) {
        self.line_starts = compute_line_starts(&src);
        self.src = src;
    }

    /// Maps a byte offset to a 1-based `(line, column)` pair.
    ///
    /// The column is a byte column within the line. Offsets at or past the
    /// end of text map into the last line.
    #[must_use]
    pub fn line_col(&self, offset: u32) -> (u32, u32) {
        let line_index = self.line_starts.partition_point(|&start| start <= offset) - 1;
        let column = offset - self.line_starts[line_index] + 1;
        #[expect(
            clippy::cast_possible_truncation,
            reason = "line count is bounded by the file size"
        )]
        let line = line_index as u32 + 1;
        (line, column)
    }

    /// Maps a 1-based `(line, column)` pair back to a byte offset.
    ///
    /// Returns `None` if the line does not exist or the column runs past the
    /// end of that line (editor integration contract).
    #[must_use]
    pub fn offset_of(&self, line: u32, column: u32) -> Option<u32> {
        if line == 0 || column == 0 {
            return None;
        }
        let start = *self.line_starts.get(line as usize - 1)?;
        let offset = start + (column - 1);
        let line_end = self
            .line_starts
            .get(line as usize)
            .copied()
            .unwrap_or_else(|| self.end_offset());
        (offset <= line_end).then_some(offset)
    }

    /// Returns the text of a 1-based line, without its line terminator.
    #[must_use]
    pub fn line_text(&self, line: u32) -> Option<&str> {
        let start = *self.line_starts.get(line as usize - 1)? as usize;
        let end = self
            .line_starts
            .get(line as usize)
            .map_or(self.src.len(), |&next| next as usize);
        let text = &self.src[start..end];
        Some(text.trim_end_matches(['\n', '\r']))
    }

    #[expect(
        clippy::cast_possible_truncation,
        reason = "file size is capped at 1 GiB by the source manager"
    )]
    fn end_offset(&self) -> u32 {
        self.src.len() as u32
    }
}

#[expect(
    clippy::cast_possible_truncation,
    reason = "file size is capped at 1 GiB by the source manager"
)]
fn compute_line_starts(src: &str) -> Vec<u32> {
    std::iter::once(0)
        .chain(src.match_indices('\n').map(|(i, _)| i as u32 + 1))
        .collect()
}
