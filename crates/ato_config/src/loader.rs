//! Configuration file loading and validation.

use crate::error::ConfigError;
use crate::resolve::parse_entry;
use crate::types::ProjectConfig;
use std::path::Path;

/// Name of the project configuration file.
pub const CONFIG_FILENAME: &str = "ato.toml";

/// Loads and validates `<project_dir>/ato.toml`.
pub fn load_config(project_dir: &Path) -> Result<ProjectConfig, ConfigError> {
    let content = std::fs::read_to_string(project_dir.join(CONFIG_FILENAME))?;
    load_config_from_str(&content)
}

/// Parses and validates an `ato.toml` configuration from a string.
pub fn load_config_from_str(content: &str) -> Result<ProjectConfig, ConfigError> {
    let config: ProjectConfig =
        toml::from_str(content).map_err(|e| ConfigError::Parse(e.to_string()))?;
    validate_config(&config)?;
    Ok(config)
}

fn validate_config(config: &ProjectConfig) -> Result<(), ConfigError> {
    if config.project.name.is_empty() {
        return Err(ConfigError::MissingField("project.name".to_string()));
    }
    if config.paths.src.is_empty() {
        return Err(ConfigError::MissingField("paths.src".to_string()));
    }
    for (name, build) in &config.builds {
        parse_entry(name, &build.entry)?;
    }
    Ok(())
}
