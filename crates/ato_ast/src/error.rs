//! Errors raised while obtaining a file's statements.

use std::path::PathBuf;

/// Failure to supply the statements of a file.
#[derive(Debug, thiserror::Error)]
pub enum AstError {
    /// The provider has no parse of this file.
    #[error("no parsed source available for `{}`", path.display())]
    NotFound {
        /// Requested path.
        path: PathBuf,
    },
    /// The parse could not be read.
    #[error("failed to read `{}`: {source}", path.display())]
    Io {
        /// Path that was read.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
    /// The parse was not valid statement JSON.
    #[error("malformed statement stream in `{}`: {source}", path.display())]
    Json {
        /// Path that was read.
        path: PathBuf,
        /// Underlying decode error.
        #[source]
        source: serde_json::Error,
    },
}
