//! Parsing and validation of `ato.toml` project configuration files.
//!
//! The configuration names the project, says where `.ato` sources and
//! installed modules live, and lists named builds with their entry address.
//! [`resolve_build`] turns one build into the inputs the front end needs.

#![warn(missing_docs)]

pub mod error;
pub mod loader;
pub mod resolve;
pub mod types;

pub use error::ConfigError;
pub use loader::{load_config, load_config_from_str, CONFIG_FILENAME};
pub use resolve::{parse_entry, resolve_build, ResolvedBuild};
pub use types::*;
