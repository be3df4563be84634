//! Sources of parsed files.

use crate::ast::SourceFileAst;
use crate::error::AstError;
use ato_source::source_db::normalize_path;
use std::collections::HashMap;
use std::ffi::OsString;
use std::path::{Path, PathBuf};

/// Supplies parsed statement streams, one per source file.
///
/// The front end asks [`exists`](Self::exists) while searching for an
/// imported file and calls [`ast`](Self::ast) once per file it scoops.
pub trait AstProvider {
    /// Returns `true` if a parse of `path` can be supplied.
    fn exists(&self, path: &Path) -> bool;

    /// Returns the statements of `path`.
    fn ast(&self, path: &Path) -> Result<SourceFileAst, AstError>;
}

/// An in-memory provider keyed by normalized path.
#[derive(Default)]
pub struct MemoryAstProvider {
    files: HashMap<PathBuf, SourceFileAst>,
}

impl MemoryAstProvider {
    /// Creates an empty provider.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces the parse of a file.
    pub fn insert(&mut self, path: impl AsRef<Path>, file: SourceFileAst) {
        self.files.insert(normalize_path(path.as_ref()), file);
    }

    /// Builder-style [`insert`](Self::insert).
    pub fn with_file(mut self, path: impl AsRef<Path>, file: SourceFileAst) -> Self {
        self.insert(path, file);
        self
    }

    /// Number of files held.
    pub fn len(&self) -> usize {
        self.files.len()
    }

    /// Returns `true` if no file is held.
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

impl AstProvider for MemoryAstProvider {
    fn exists(&self, path: &Path) -> bool {
        self.files.contains_key(&normalize_path(path))
    }

    fn ast(&self, path: &Path) -> Result<SourceFileAst, AstError> {
        self.files
            .get(&normalize_path(path))
            .cloned()
            .ok_or_else(|| AstError::NotFound {
                path: path.to_path_buf(),
            })
    }
}

/// Reads the parser's JSON sidecars from disk.
///
/// The parse of `board/main.ato` is expected at `board/main.ato.json`.
#[derive(Clone, Copy, Debug, Default)]
pub struct JsonAstProvider;

impl JsonAstProvider {
    /// Creates a provider.
    pub fn new() -> Self {
        Self
    }

    /// Returns the sidecar path holding the parse of `source`.
    pub fn sidecar_path(source: &Path) -> PathBuf {
        let mut name = OsString::from(source.as_os_str());
        name.push(".json");
        PathBuf::from(name)
    }
}

impl AstProvider for JsonAstProvider {
    fn exists(&self, path: &Path) -> bool {
        Self::sidecar_path(path).is_file()
    }

    fn ast(&self, path: &Path) -> Result<SourceFileAst, AstError> {
        let sidecar = Self::sidecar_path(path);
        tracing::trace!(path = %sidecar.display(), "reading statement sidecar");
        let text = std::fs::read_to_string(&sidecar).map_err(|source| {
            if source.kind() == std::io::ErrorKind::NotFound {
                AstError::NotFound {
                    path: path.to_path_buf(),
                }
            } else {
                AstError::Io {
                    path: sidecar.clone(),
                    source,
                }
            }
        })?;
        serde_json::from_str(&text).map_err(|source| AstError::Json {
            path: sidecar,
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::build::*;

    #[test]
    fn memory_lookup_normalizes() {
        let provider = MemoryAstProvider::new().with_file("/p/src/app.ato", file(vec![pin("1")]));
        assert!(provider.exists(Path::new("/p/src/lib/../app.ato")));
        assert!(!provider.exists(Path::new("/p/src/other.ato")));
        assert_eq!(provider.ast(Path::new("/p/src/app.ato")).unwrap().stmts.len(), 1);
    }

    #[test]
    fn memory_missing_is_not_found() {
        let provider = MemoryAstProvider::new();
        assert!(matches!(
            provider.ast(Path::new("x.ato")),
            Err(AstError::NotFound { .. })
        ));
    }

    #[test]
    fn sidecar_path_appends_json() {
        assert_eq!(
            JsonAstProvider::sidecar_path(Path::new("elec/src/main.ato")),
            PathBuf::from("elec/src/main.ato.json")
        );
    }

    #[test]
    fn json_reads_sidecar() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("main.ato");
        let parsed = file(vec![component("R", None, vec![pin("1"), pin("2")])]);
        std::fs::write(
            JsonAstProvider::sidecar_path(&source),
            serde_json::to_string(&parsed).unwrap(),
        )
        .unwrap();

        let provider = JsonAstProvider::new();
        assert!(provider.exists(&source));
        assert_eq!(provider.ast(&source).unwrap(), parsed);
    }

    #[test]
    fn json_errors() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("bad.ato");
        let provider = JsonAstProvider::new();
        assert!(!provider.exists(&source));
        assert!(matches!(provider.ast(&source), Err(AstError::NotFound { .. })));

        std::fs::write(JsonAstProvider::sidecar_path(&source), "{ not json").unwrap();
        let err = provider.ast(&source).unwrap_err();
        assert!(matches!(err, AstError::Json { .. }));
        assert!(err.to_string().contains("bad.ato.json"));
    }
}
