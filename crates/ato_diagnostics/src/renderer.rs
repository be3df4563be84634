//! Diagnostic rendering.

use crate::diagnostic::Diagnostic;
use crate::label::LabelStyle;
use ato_source::SourceDb;

/// Formats diagnostics for output.
pub trait DiagnosticRenderer {
    /// Renders a single diagnostic into a formatted string.
    fn render(&self, diag: &Diagnostic, source_db: &SourceDb) -> String;
}

/// Renders diagnostics in a rustc-style terminal format:
///
/// ```text
/// error[E302]: unknown reference `Resistr`
///   --> elec/src/app.ato:4:5
///    |
///  4 |     r1 = new Resistr
///    |     ^^^^^^^^^^^^^^^^ not defined in any enclosing scope
///    |
///    = help: ...
/// ```
///
/// When the file text is not loaded only the location line is printed.
pub struct TerminalRenderer {
    /// Whether to use ANSI color codes in output.
    pub color: bool,
}

impl TerminalRenderer {
    /// Creates a new terminal renderer.
    pub fn new(color: bool) -> Self {
        Self { color }
    }

    fn paint(&self, code: &str, text: &str) -> String {
        if self.color {
            format!("{code}{text}\x1b[0m")
        } else {
            text.to_string()
        }
    }
}

impl DiagnosticRenderer for TerminalRenderer {
    fn render(&self, diag: &Diagnostic, source_db: &SourceDb) -> String {
        let mut out = String::new();

        let head = format!("{}[{}]", diag.severity, diag.code);
        out.push_str(&format!(
            "{}: {}\n",
            self.paint(diag.severity.ansi_color(), &head),
            diag.message
        ));

        let span = diag.primary_span;
        if !span.is_dummy() && source_db.path(span.file).is_some() {
            let resolved = source_db.resolve_span(span);
            out.push_str(&format!("  --> {resolved}\n"));

            let file = source_db.get_file(span.file);
            if file.has_text() {
                let (line, col) = file.line_col(span.start);
                let line_num = line.to_string();
                let padding = " ".repeat(line_num.len());
                let line_content = source_line(&file.content, span.start);

                out.push_str(&format!("{padding} |\n"));
                out.push_str(&format!("{line_num} | {line_content}\n"));

                let width = span.len().max(1) as usize;
                let carets = "^".repeat(width.min(line_content.len().max(1)));
                let col_padding = " ".repeat((col as usize).saturating_sub(1));
                let primary_msg = diag
                    .labels
                    .iter()
                    .find(|l| l.style == LabelStyle::Primary)
                    .map(|l| format!(" {}", l.message))
                    .unwrap_or_default();
                out.push_str(&format!(
                    "{padding} | {col_padding}{}{primary_msg}\n",
                    self.paint(diag.severity.ansi_color(), &carets)
                ));
            }
        }

        for label in diag.labels.iter().filter(|l| l.style == LabelStyle::Secondary) {
            if label.span.is_dummy() || source_db.path(label.span.file).is_none() {
                out.push_str(&format!("   = note: {}\n", label.message));
            } else {
                let resolved = source_db.resolve_span(label.span);
                out.push_str(&format!("   = note: {}: {resolved}\n", label.message));
            }
        }
        for note in &diag.notes {
            out.push_str(&format!("   = note: {note}\n"));
        }
        for help in &diag.help {
            out.push_str(&format!("   = help: {help}\n"));
        }

        out
    }
}

fn source_line(content: &str, byte_offset: u32) -> &str {
    let offset = (byte_offset as usize).min(content.len());
    let start = content[..offset].rfind('\n').map_or(0, |pos| pos + 1);
    let end = content[offset..]
        .find('\n')
        .map_or(content.len(), |pos| offset + pos);
    &content[start..end]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::code::{Category, DiagnosticCode};
    use crate::label::Label;
    use ato_source::Span;
    use std::path::Path;

    #[test]
    fn render_error_with_text() {
        let mut db = SourceDb::new();
        let id = db.add_source("app.ato", "module App:\n    r1 = new Resistr\n".to_string());
        let span = Span::new(id, 16, 32);
        let diag = Diagnostic::error(
            DiagnosticCode::new(Category::Error, 302),
            "unknown reference `Resistr`",
            span,
        )
        .with_label(Label::primary(span, "not defined"));

        let out = TerminalRenderer::new(false).render(&diag, &db);
        assert!(out.contains("error[E302]: unknown reference `Resistr`"));
        assert!(out.contains("--> app.ato:2:5"));
        assert!(out.contains("r1 = new Resistr"));
        assert!(out.contains("^^^^ not defined") || out.contains("^ not defined"));
    }

    #[test]
    fn render_without_text_prints_location_only() {
        let mut db = SourceDb::new();
        let id = db.intern_path(Path::new("lib.ato"));
        let diag = Diagnostic::error(
            DiagnosticCode::new(Category::Error, 303),
            "name collision",
            Span::new(id, 0, 4),
        );
        let out = TerminalRenderer::new(false).render(&diag, &db);
        assert!(out.contains("--> lib.ato:1:1"));
        assert!(!out.contains(" | "));
    }

    #[test]
    fn render_dummy_span() {
        let db = SourceDb::new();
        let diag = Diagnostic::warning(
            DiagnosticCode::new(Category::Warning, 1),
            "no builds configured",
            Span::DUMMY,
        )
        .with_help("add a [builds.default] table");
        let out = TerminalRenderer::new(false).render(&diag, &db);
        assert!(out.starts_with("warning[W001]: no builds configured"));
        assert!(!out.contains("-->"));
        assert!(out.contains("= help: add a [builds.default] table"));
    }

    #[test]
    fn color_wraps_header() {
        let db = SourceDb::new();
        let diag = Diagnostic::error(
            DiagnosticCode::new(Category::Error, 300),
            "x",
            Span::DUMMY,
        );
        let out = TerminalRenderer::new(true).render(&diag, &db);
        assert!(out.starts_with("\x1b[1;31merror[E300]\x1b[0m: x"));
    }
}
