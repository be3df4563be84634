//! Opaque identifier for source files registered in a build.

use serde::{Deserialize, Serialize};

/// Identity of one source file within a [`SourceDb`](crate::SourceDb).
///
/// Two paths that normalize to the same file share a `FileId`, which makes
/// `FileId` the file half of every global address.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Serialize, Deserialize)]
pub struct FileId(u32);

impl FileId {
    /// Placeholder for locations with no source file: builtins and synthetic spans.
    pub const DUMMY: FileId = FileId(u32::MAX);

    /// Creates a `FileId` from a raw `u32` value.
    pub fn from_raw(raw: u32) -> Self {
        Self(raw)
    }

    /// Returns the raw `u32` value of this `FileId`.
    pub fn as_raw(self) -> u32 {
        self.0
    }

    /// Returns `true` for [`FileId::DUMMY`].
    pub fn is_dummy(self) -> bool {
        self == Self::DUMMY
    }
}
