//! Build resolution: turning a named build into front-end inputs.

use crate::error::ConfigError;
use crate::types::ProjectConfig;
use std::path::{Path, PathBuf};

/// A build ready to hand to the front end.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedBuild {
    /// The build name.
    pub name: String,
    /// Absolute (project-joined) path of the entry file.
    pub entry_file: PathBuf,
    /// Dotted block path inside the entry file; empty for the file root.
    pub entry_ref: Vec<String>,
    /// Directories tried for imports after the importing file's own
    /// directory: `paths.src`, `paths.modules`, then `paths.search`.
    pub search_paths: Vec<PathBuf>,
}

/// Splits a build entry into its file and block path.
pub fn parse_entry<'e>(build: &str, entry: &'e str) -> Result<(&'e str, Vec<String>), ConfigError> {
    let invalid = |reason| ConfigError::InvalidEntry {
        build: build.to_string(),
        entry: entry.to_string(),
        reason,
    };
    let (file, block) = match entry.rsplit_once(':') {
        Some((file, block)) => (file, Some(block)),
        None => (entry, None),
    };
    if file.is_empty() {
        return Err(invalid("entry has no file"));
    }
    if !file.ends_with(".ato") {
        return Err(invalid("entry file must end in .ato"));
    }
    let entry_ref = match block {
        None => Vec::new(),
        Some(block) => {
            let segments: Vec<String> = block.split('.').map(str::to_string).collect();
            if segments.iter().any(String::is_empty) {
                return Err(invalid("entry block path has an empty segment"));
            }
            segments
        }
    };
    Ok((file, entry_ref))
}

/// Resolves a build by name.
///
/// With no name, the build called `default` is used, or the only build if
/// there is exactly one.
pub fn resolve_build(
    config: &ProjectConfig,
    build_name: Option<&str>,
    project_dir: &Path,
) -> Result<ResolvedBuild, ConfigError> {
    let available = || config.builds.keys().cloned().collect::<Vec<_>>();
    let name = match build_name {
        Some(name) => name.to_string(),
        None if config.builds.contains_key("default") => "default".to_string(),
        None if config.builds.len() == 1 => available().remove(0),
        None if config.builds.is_empty() => {
            return Err(ConfigError::MissingField("builds".to_string()))
        }
        None => {
            return Err(ConfigError::UnknownBuild {
                name: "default".to_string(),
                available: available(),
            })
        }
    };
    let build = config
        .builds
        .get(&name)
        .ok_or_else(|| ConfigError::UnknownBuild {
            name: name.clone(),
            available: available(),
        })?;

    let (file, entry_ref) = parse_entry(&name, &build.entry)?;

    let paths = &config.paths;
    let search_paths = std::iter::once(&paths.src)
        .chain(std::iter::once(&paths.modules))
        .chain(paths.search.iter())
        .map(|p| project_dir.join(p))
        .collect();

    Ok(ResolvedBuild {
        entry_file: project_dir.join(file),
        entry_ref,
        search_paths,
        name,
    })
}
