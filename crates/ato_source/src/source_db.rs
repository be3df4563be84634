//! Registry of every source file taking part in a build.

use crate::file_id::FileId;
use crate::resolved_span::ResolvedSpan;
use crate::source_file::SourceFile;
use crate::span::Span;
use std::collections::HashMap;
use std::io;
use std::path::{Component, Path, PathBuf};

/// The source database.
///
/// Hands out one [`FileId`] per distinct (lexically normalized) path and keeps
/// whatever text is known for rendering diagnostics.
pub struct SourceDb {
    files: Vec<SourceFile>,
    by_path: HashMap<PathBuf, FileId>,
}

impl SourceDb {
    /// Creates an empty source database.
    pub fn new() -> Self {
        Self {
            files: Vec::new(),
            by_path: HashMap::new(),
        }
    }

    /// Returns the id for `path`, registering it without text if new.
    pub fn intern_path(&mut self, path: &Path) -> FileId {
        let path = normalize_path(path);
        if let Some(&id) = self.by_path.get(&path) {
            return id;
        }
        self.push(path, String::new())
    }

    /// Registers a file with in-memory text, replacing text for a known path.
    pub fn add_source(&mut self, name: impl Into<PathBuf>, content: String) -> FileId {
        let path = normalize_path(&name.into());
        if let Some(&id) = self.by_path.get(&path) {
            self.files[id.as_raw() as usize].set_content(content);
            return id;
        }
        self.push(path, content)
    }

    /// Reads a file from disk and registers it with its text.
    pub fn load_file(&mut self, path: &Path) -> Result<FileId, io::Error> {
        let content = std::fs::read_to_string(path)?;
        Ok(self.add_source(path, content))
    }

    fn push(&mut self, path: PathBuf, content: String) -> FileId {
        let id = FileId::from_raw(self.files.len() as u32);
        self.by_path.insert(path.clone(), id);
        self.files.push(SourceFile::new(id, path, content));
        id
    }

    /// Returns the [`SourceFile`] for the given [`FileId`].
    ///
    /// # Panics
    ///
    /// Panics if the `FileId` is invalid.
    pub fn get_file(&self, id: FileId) -> &SourceFile {
        &self.files[id.as_raw() as usize]
    }

    /// Returns the registered path of a file, or `None` for [`FileId::DUMMY`].
    pub fn path(&self, id: FileId) -> Option<&Path> {
        self.files.get(id.as_raw() as usize).map(|f| f.path.as_path())
    }

    /// Returns the number of registered files.
    pub fn len(&self) -> usize {
        self.files.len()
    }

    /// Returns `true` if no file has been registered.
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Resolves a [`Span`] to line/column coordinates.
    pub fn resolve_span(&self, span: Span) -> ResolvedSpan {
        let file = self.get_file(span.file);
        let (start_line, start_col) = file.line_col(span.start);
        let (end_line, end_col) = file.line_col(span.end.saturating_sub(1).max(span.start));
        ResolvedSpan {
            file_path: file.path.clone(),
            start_line,
            start_col,
            end_line,
            end_col,
        }
    }

    /// Returns the source text corresponding to a [`Span`].
    pub fn snippet(&self, span: Span) -> &str {
        self.get_file(span.file).snippet(span.start, span.end)
    }
}

impl Default for SourceDb {
    fn default() -> Self {
        Self::new()
    }
}

/// Removes `.` segments and folds `..` into its parent without touching disk.
pub fn normalize_path(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !out.pop() {
                    out.push("..");
                }
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}
