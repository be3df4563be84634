//! Configuration types deserialized from `ato.toml`.

use serde::Deserialize;
use std::collections::BTreeMap;

/// The top-level project configuration parsed from `ato.toml`.
#[derive(Debug, Clone, Deserialize)]
pub struct ProjectConfig {
    /// Project metadata.
    pub project: ProjectMeta,
    /// Where sources and installed modules live.
    #[serde(default)]
    pub paths: PathsConfig,
    /// Named builds.
    #[serde(default)]
    pub builds: BTreeMap<String, BuildConfig>,
}

/// Project metadata.
#[derive(Debug, Clone, Deserialize)]
pub struct ProjectMeta {
    /// The project name.
    pub name: String,
    /// The project version string.
    #[serde(default)]
    pub version: String,
    /// Compiler version the project was written against.
    #[serde(default, rename = "ato-version")]
    pub ato_version: Option<String>,
    /// A brief description of the project.
    #[serde(default)]
    pub description: String,
}

/// Source and module directories, relative to the project directory.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PathsConfig {
    /// Directory holding the project's own `.ato` sources.
    #[serde(default = "default_src")]
    pub src: String,
    /// Directory holding installed modules.
    #[serde(default = "default_modules")]
    pub modules: String,
    /// Further directories searched for imports, in order.
    #[serde(default)]
    pub search: Vec<String>,
}

fn default_src() -> String {
    ".".to_string()
}

fn default_modules() -> String {
    ".ato/modules".to_string()
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            src: default_src(),
            modules: default_modules(),
            search: Vec::new(),
        }
    }
}

/// One named build.
#[derive(Debug, Clone, Deserialize)]
pub struct BuildConfig {
    /// Entry address: `path/to/file.ato:Block.Path`, or just the file for
    /// its root module.
    pub entry: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paths_default() {
        let p = PathsConfig::default();
        assert_eq!(p.src, ".");
        assert_eq!(p.modules, ".ato/modules");
        assert!(p.search.is_empty());
    }

    #[test]
    fn partial_paths_fill_defaults() {
        let p: PathsConfig = toml::from_str(r#"src = "elec/src""#).unwrap();
        assert_eq!(p.src, "elec/src");
        assert_eq!(p.modules, ".ato/modules");
    }
}
