//! The parsed-statement stream consumed by the ato front end.
//!
//! The lexer and grammar live outside this workspace. Whatever parses `.ato`
//! source hands the front end one [`SourceFileAst`] per file through an
//! [`AstProvider`]: an ordered list of [`Stmt`]s where block definitions nest
//! their own bodies. Names and dotted references are plain strings here; the
//! front end interns them.

#![warn(missing_docs)]

pub mod ast;
pub mod build;
pub mod error;
pub mod provider;

pub use ast::{
    BlockDef, BlockKind, CompareOp, Connectable, LinkDirection, Literal, Operand, SourceFileAst,
    Stmt, StmtKind,
};
pub use error::AstError;
pub use provider::{AstProvider, JsonAstProvider, MemoryAstProvider};
