//! Byte ranges within source files.

use crate::file_id::FileId;
use serde::{Deserialize, Serialize};

/// A byte range within a source file, `start` inclusive and `end` exclusive.
///
/// The front end never reads spans itself; it threads them through to errors
/// so the driver can point at the offending statement.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub struct Span {
    /// The source file this span belongs to.
    pub file: FileId,
    /// Byte offset of the start of the span (inclusive).
    pub start: u32,
    /// Byte offset of the end of the span (exclusive).
    pub end: u32,
}

impl Span {
    /// Span used when no source location is available.
    pub const DUMMY: Span = Span {
        file: FileId::DUMMY,
        start: 0,
        end: 0,
    };

    /// Creates a new span in the given file with the given byte range.
    pub fn new(file: FileId, start: u32, end: u32) -> Self {
        Self { file, start, end }
    }

    /// Returns the same byte range attached to another file.
    ///
    /// AST providers produce spans before the file has been registered; the
    /// front end rebinds them once the file's id is known.
    pub fn in_file(self, file: FileId) -> Span {
        Span { file, ..self }
    }

    /// Returns the length of this span in bytes.
    pub fn len(&self) -> u32 {
        self.end - self.start
    }

    /// Returns `true` if this span has zero length.
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Returns `true` if this span points at no file.
    pub fn is_dummy(&self) -> bool {
        self.file.is_dummy()
    }
}

impl Default for Span {
    fn default() -> Self {
        Self::DUMMY
    }
}
