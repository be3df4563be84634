//! Shared foundational types used across the ato front end.
//!
//! Interned identifiers for block, pin, and attribute names.

#![warn(missing_docs)]

pub mod ident;

pub use ident::{Ident, Interner};
