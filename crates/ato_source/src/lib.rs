//! Source file identity, spans, and the per-build source database.
//!
//! Every `.ato` file that takes part in a build gets a [`FileId`] from the
//! [`SourceDb`]. Addresses and spans refer to files only through that id.

#![warn(missing_docs)]

pub mod file_id;
pub mod resolved_span;
pub mod source_db;
pub mod source_file;
pub mod span;

pub use file_id::FileId;
pub use resolved_span::ResolvedSpan;
pub use source_db::SourceDb;
pub use source_file::SourceFile;
pub use span::Span;
