//! A registered source file with line-start indexing.

use crate::file_id::FileId;
use std::path::PathBuf;

/// A source file known to the build.
///
/// Files referenced only through an AST provider have no text; the driver
/// attaches text later when it wants to render snippets.
pub struct SourceFile {
    /// The identifier of this file within the [`SourceDb`](crate::SourceDb).
    pub id: FileId,
    /// The path the file was registered under.
    pub path: PathBuf,
    /// The file text, empty when unknown.
    pub content: String,
    /// Byte offsets of each line start (the first entry is always 0).
    line_starts: Vec<u32>,
}

impl SourceFile {
    /// Creates a new `SourceFile` with precomputed line starts.
    pub fn new(id: FileId, path: PathBuf, content: String) -> Self {
        let line_starts = compute_line_starts(&content);
        Self {
            id,
            path,
            content,
            line_starts,
        }
    }

    /// Replaces the file text, recomputing line starts.
    pub fn set_content(&mut self, content: String) {
        self.line_starts = compute_line_starts(&content);
        self.content = content;
    }

    /// Returns `true` if the file text is available.
    pub fn has_text(&self) -> bool {
        !self.content.is_empty()
    }

    /// Converts a byte offset into 1-indexed (line, column) coordinates.
    pub fn line_col(&self, byte_offset: u32) -> (u32, u32) {
        let line_idx = match self.line_starts.binary_search(&byte_offset) {
            Ok(idx) => idx,
            Err(idx) => idx - 1,
        };
        let line = (line_idx as u32) + 1;
        let col = byte_offset - self.line_starts[line_idx] + 1;
        (line, col)
    }

    /// Returns the text between two byte offsets, clamped to the file.
    pub fn snippet(&self, start: u32, end: u32) -> &str {
        let len = self.content.len();
        let start = (start as usize).min(len);
        let end = (end as usize).clamp(start, len);
        &self.content[start..end]
    }
}

fn compute_line_starts(content: &str) -> Vec<u32> {
    let mut starts = vec![0u32];
    for (i, byte) in content.bytes().enumerate() {
        if byte == b'\n' {
            starts.push((i + 1) as u32);
        }
    }
    starts
}
