//! Shared pipeline helpers for CLI commands.
//!
//! Finds the project, resolves the requested build, runs the front end over
//! the parser's JSON sidecars, and renders any failure as a diagnostic.

use std::error::Error;
use std::path::{Path, PathBuf};

use ato_ast::JsonAstProvider;
use ato_common::Interner;
use ato_config::{ConfigError, ResolvedBuild, CONFIG_FILENAME};
use ato_diagnostics::{
    Category, Diagnostic, DiagnosticCode, DiagnosticRenderer, DiagnosticSink, TerminalRenderer,
};
use ato_front::{FrontEnd, FrontEndError, Instance};
use ato_source::{FileId, SourceDb, Span};
use tracing::{debug, warn};

use crate::GlobalArgs;

/// The project configuration could not be loaded or resolved.
pub const K001: DiagnosticCode = DiagnosticCode::new(Category::Config, 1);

/// What running a build produced.
pub enum Outcome<R> {
    /// The build resolved; carries the caller's result.
    Built(R),
    /// An error was reported to the terminal.
    Failed,
}

/// Walks up from `start` looking for the nearest directory containing `ato.toml`.
pub fn find_project_root(start: &Path) -> Result<PathBuf, Box<dyn Error>> {
    let mut current = start.to_path_buf();
    loop {
        if current.join(CONFIG_FILENAME).exists() {
            return Ok(current);
        }
        if !current.pop() {
            return Err(format!(
                "could not find {CONFIG_FILENAME} in {} or any parent directory",
                start.display()
            )
            .into());
        }
    }
}

/// Resolves the project root directory from global CLI args.
///
/// If `--config` is specified, uses that path (file → parent dir, dir → itself).
/// Otherwise walks up from the current directory looking for `ato.toml`.
pub fn resolve_project_root(global: &GlobalArgs) -> Result<PathBuf, Box<dyn Error>> {
    match &global.config {
        Some(config_path) => {
            let p = PathBuf::from(config_path);
            if p.is_file() {
                Ok(p.parent()
                    .map(Path::to_path_buf)
                    .unwrap_or_else(|| PathBuf::from(".")))
            } else {
                Ok(p)
            }
        }
        None => find_project_root(&std::env::current_dir()?),
    }
}

/// Loads `ato.toml` from `project_dir` and resolves one build.
pub fn load_build(project_dir: &Path, build: Option<&str>) -> Result<ResolvedBuild, ConfigError> {
    let config = ato_config::load_config(project_dir)?;
    let build = ato_config::resolve_build(&config, build, project_dir)?;
    debug!(
        build = %build.name,
        entry = %build.entry_file.display(),
        search_paths = build.search_paths.len(),
        "resolved build"
    );
    Ok(build)
}

/// Resolves and instantiates a build, handing the result to `f`.
///
/// Configuration and front-end errors are rendered to stderr and reported
/// as [`Outcome::Failed`]; only failures to locate the project are returned
/// as errors.
pub fn run_build<R>(
    global: &GlobalArgs,
    build_name: Option<&str>,
    f: impl FnOnce(&FrontEnd<'_>, &Instance) -> R,
) -> Result<Outcome<R>, Box<dyn Error>> {
    let project_dir = resolve_project_root(global)?;
    let build = match load_build(&project_dir, build_name) {
        Ok(build) => build,
        Err(e) => {
            report_config_error(&e, &project_dir, global.color);
            return Ok(Outcome::Failed);
        }
    };

    if !global.quiet {
        eprintln!(
            "   Resolving {} ({})",
            build.name,
            build.entry_file.display()
        );
    }

    let interner = Interner::new();
    let provider = JsonAstProvider::new();
    let mut front = FrontEnd::new(&interner, &provider, build.search_paths.clone());
    let entry = front.address(&build.entry_file, &build.entry_ref);

    match front.build(&entry) {
        Ok(instance) => Ok(Outcome::Built(f(&front, &instance))),
        Err(e) => {
            report_front_error(front.source_db_mut(), &e, global.color);
            Ok(Outcome::Failed)
        }
    }
}

/// Renders a configuration error as a `K001` diagnostic.
pub fn report_config_error(err: &ConfigError, project_dir: &Path, color: bool) {
    let diag = Diagnostic::error(K001, err.to_string(), Span::DUMMY).with_note(format!(
        "while reading {}",
        project_dir.join(CONFIG_FILENAME).display()
    ));
    let sink = DiagnosticSink::new();
    sink.emit(diag);
    render_diagnostics(&sink, &SourceDb::new(), color);
}

/// Renders a front-end error, attaching the text of every file it points at.
pub fn report_front_error(source_db: &mut SourceDb, err: &FrontEndError, color: bool) {
    let diag = err.to_diagnostic();
    let files = std::iter::once(diag.primary_span.file).chain(diag.labels.iter().map(|l| l.span.file));
    for file in files {
        attach_text(source_db, file);
    }
    let sink = DiagnosticSink::new();
    sink.emit(diag);
    render_diagnostics(&sink, source_db, color);
}

fn attach_text(source_db: &mut SourceDb, file: FileId) {
    if file.is_dummy() || source_db.get_file(file).has_text() {
        return;
    }
    let Some(path) = source_db.path(file).map(Path::to_path_buf) else {
        return;
    };
    if let Err(e) = source_db.load_file(&path) {
        warn!(path = %path.display(), error = %e, "source text unavailable for diagnostics");
    }
}

/// Renders all diagnostics from a sink to stderr using the terminal renderer.
///
/// Returns the number of diagnostics rendered.
pub fn render_diagnostics(sink: &DiagnosticSink, source_db: &SourceDb, color: bool) -> usize {
    let diagnostics = sink.diagnostics();
    let renderer = TerminalRenderer::new(color);
    for diag in &diagnostics {
        eprintln!("{}", renderer.render(diag, source_db));
    }
    diagnostics.len()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn find_project_root_in_parent() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("ato.toml"), "").unwrap();
        let sub = dir.path().join("elec").join("src");
        fs::create_dir_all(&sub).unwrap();
        assert_eq!(find_project_root(&sub).unwrap(), dir.path());
    }

    #[test]
    fn find_project_root_not_found() {
        let dir = TempDir::new().unwrap();
        // An ancestor of the temp dir may hold its own ato.toml.
        if let Err(err) = find_project_root(dir.path()) {
            assert!(err.to_string().contains("could not find ato.toml"));
        }
    }

    #[test]
    fn config_flag_pointing_at_file() {
        let dir = TempDir::new().unwrap();
        let config = dir.path().join("ato.toml");
        fs::write(&config, "").unwrap();
        let global = GlobalArgs {
            quiet: true,
            color: false,
            config: Some(config.display().to_string()),
        };
        assert_eq!(resolve_project_root(&global).unwrap(), dir.path());
    }

    #[test]
    fn load_build_reports_unknown_build() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join("ato.toml"),
            "[project]\nname = \"p\"\nversion = \"0.1.0\"\n\n[builds.default]\nentry = \"main.ato:App\"\n",
        )
        .unwrap();
        assert!(load_build(dir.path(), None).is_ok());
        assert!(matches!(
            load_build(dir.path(), Some("release")),
            Err(ConfigError::UnknownBuild { .. })
        ));
    }

    #[test]
    fn front_error_text_is_attached() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("main.ato");
        fs::write(&path, "module App:\n    x = new Missing\n").unwrap();
        let mut db = SourceDb::new();
        let file = db.intern_path(&path);
        let err = FrontEndError::UnknownReference {
            reference: "Missing".into(),
            span: Span::new(file, 24, 31),
        };
        report_front_error(&mut db, &err, false);
        assert!(db.get_file(file).has_text());
        assert_eq!(db.snippet(Span::new(file, 24, 31)), "Missing");
    }
}
