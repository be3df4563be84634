//! Semantic core of the ato front end.
//!
//! Turns parsed `.ato` files into a tree of [`Instance`]s in three stages:
//!
//! 1. **Scoop** extracts a [`ClassDef`] skeleton per file and block, with
//!    its imports, nested definitions and retypes.
//! 2. **Dizzy** resolves each class's superclass through its lexical closure
//!    into a chain of [`ClassLayer`]s.
//! 3. **Lofty** walks a chain base-first and materializes children, links,
//!    layered assignments and assertions.
//!
//! # Usage
//!
//! ```
//! use ato_ast::build::*;
//! use ato_ast::MemoryAstProvider;
//! use ato_common::Interner;
//! use ato_front::FrontEnd;
//! use std::path::Path;
//!
//! let provider = MemoryAstProvider::new().with_file(
//!     "main.ato",
//!     file(vec![component("Resistor", None, vec![pin("1"), pin("2")])]),
//! );
//! let interner = Interner::new();
//! let mut front = FrontEnd::new(&interner, &provider, vec![]);
//! let entry = front.address(Path::new("main.ato"), &["Resistor"]);
//! let resistor = front.build(&entry).unwrap();
//! assert_eq!(resistor.children.len(), 2);
//! ```

#![warn(missing_docs)]

pub mod address;
pub mod arena;
pub mod datamodel;
pub mod dizzy;
pub mod errors;
pub mod front;
pub mod ids;
pub mod lofty;
pub mod scoop;

pub use address::{AddrStr, Ref};
pub use datamodel::{
    Assertion, Assignment, AssignmentLayer, Assignments, Builtin, ClassDef, ClassLayer, DefKind,
    Import, Instance, Link, Operand, Replacement, SuperRef,
};
pub use errors::{FrontEndError, FrontEndResult};
pub use front::FrontEnd;
pub use ids::{ClassDefId, LayerId};
