//! Error types for configuration loading and validation.

/// Errors that can occur when loading or resolving an `ato.toml` configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// An I/O error occurred while reading the configuration file.
    #[error("failed to read configuration: {0}")]
    Io(#[from] std::io::Error),

    /// The TOML content could not be parsed.
    #[error("failed to parse configuration: {0}")]
    Parse(String),

    /// A required field is missing or empty.
    #[error("missing required field: {0}")]
    MissingField(String),

    /// The requested build is not configured.
    #[error("unknown build '{name}' (available: {})", available.join(", "))]
    UnknownBuild {
        /// The requested build name.
        name: String,
        /// Configured build names.
        available: Vec<String>,
    },

    /// A build's entry is not of the form `file.ato:Block.Path`.
    #[error("invalid entry '{entry}' for build '{build}': {reason}")]
    InvalidEntry {
        /// The build name.
        build: String,
        /// The entry as written.
        entry: String,
        /// What is wrong with it.
        reason: &'static str,
    },
}
