//! Front-end errors and their diagnostic codes.
//!
//! Every failure is fatal to the class or instantiation being resolved and
//! propagates to the caller unchanged. Codes `E300`--`E307` identify each
//! kind when the driver reports it.

use ato_ast::AstError;
use ato_diagnostics::{Category, Diagnostic, DiagnosticCode, Label};
use ato_source::Span;
use std::path::PathBuf;

/// An imported file was not found in any search location.
pub const E300: DiagnosticCode = DiagnosticCode::new(Category::Error, 300);

/// A name matches both a local definition and an import in one scope.
pub const E301: DiagnosticCode = DiagnosticCode::new(Category::Error, 301);

/// A reference resolves nowhere.
pub const E302: DiagnosticCode = DiagnosticCode::new(Category::Error, 302);

/// Two registrations under one key.
pub const E303: DiagnosticCode = DiagnosticCode::new(Category::Error, 303);

/// A construct the front end deliberately does not implement.
pub const E304: DiagnosticCode = DiagnosticCode::new(Category::Error, 304);

/// A class inherits from itself.
pub const E305: DiagnosticCode = DiagnosticCode::new(Category::Error, 305);

/// A class instantiates itself.
pub const E306: DiagnosticCode = DiagnosticCode::new(Category::Error, 306);

/// The statements of a file could not be obtained.
pub const E307: DiagnosticCode = DiagnosticCode::new(Category::Error, 307);

/// Errors raised by Scoop, Dizzy and Lofty.
///
/// References and addresses are carried already rendered, so the error
/// outlives the front end that produced it.
#[derive(Debug, thiserror::Error)]
pub enum FrontEndError {
    /// No search location holds the imported file.
    #[error("cannot find `{path}` imported from `{importer}`")]
    ImportNotFound {
        /// The path as written in the import.
        path: String,
        /// The importing file.
        importer: String,
        /// Every location tried, in order.
        searched: Vec<PathBuf>,
        /// The import statement.
        span: Span,
    },

    /// A name names both a local definition and an import in one scope.
    #[error("`{name}` is ambiguous in `{scope}`: it is both defined locally and imported")]
    AmbiguousReference {
        /// The ambiguous leading name.
        name: String,
        /// The scope holding both.
        scope: String,
        /// The reference being resolved.
        span: Span,
    },

    /// A reference resolves nowhere.
    #[error("unknown reference `{reference}`")]
    UnknownReference {
        /// The reference or address.
        reference: String,
        /// Where it was used.
        span: Span,
    },

    /// Two registrations under one key.
    #[error("`{name}` is declared more than once in `{scope}`")]
    NameCollision {
        /// The clashing key.
        name: String,
        /// The block holding both.
        scope: String,
        /// The later declaration.
        span: Span,
        /// The earlier declaration.
        previous: Span,
    },

    /// A construct the front end deliberately does not implement.
    #[error("unsupported: {what}")]
    Unsupported {
        /// What was attempted.
        what: String,
        /// Where.
        span: Span,
    },

    /// A class appears in its own inheritance chain.
    #[error("circular inheritance through `{address}`")]
    CircularInheritance {
        /// The class found on the chain twice.
        address: String,
        /// Its definition.
        span: Span,
    },

    /// A class instantiates itself, directly or through its children.
    #[error("`{address}` instantiates itself")]
    CircularInstantiation {
        /// The class being instantiated again.
        address: String,
        /// The `new` that closed the cycle.
        span: Span,
    },

    /// The AST provider failed.
    #[error(transparent)]
    Ast(#[from] AstError),
}

/// Result alias for front-end operations.
pub type FrontEndResult<T> = Result<T, FrontEndError>;

impl FrontEndError {
    /// Creates an [`Unsupported`](Self::Unsupported) error.
    pub fn unsupported(what: impl Into<String>, span: Span) -> Self {
        FrontEndError::Unsupported {
            what: what.into(),
            span,
        }
    }

    /// The primary source location.
    pub fn span(&self) -> Span {
        match self {
            FrontEndError::ImportNotFound { span, .. }
            | FrontEndError::AmbiguousReference { span, .. }
            | FrontEndError::UnknownReference { span, .. }
            | FrontEndError::NameCollision { span, .. }
            | FrontEndError::Unsupported { span, .. }
            | FrontEndError::CircularInheritance { span, .. }
            | FrontEndError::CircularInstantiation { span, .. } => *span,
            FrontEndError::Ast(_) => Span::DUMMY,
        }
    }

    /// The diagnostic code for this kind of error.
    pub fn code(&self) -> DiagnosticCode {
        match self {
            FrontEndError::ImportNotFound { .. } => E300,
            FrontEndError::AmbiguousReference { .. } => E301,
            FrontEndError::UnknownReference { .. } => E302,
            FrontEndError::NameCollision { .. } => E303,
            FrontEndError::Unsupported { .. } => E304,
            FrontEndError::CircularInheritance { .. } => E305,
            FrontEndError::CircularInstantiation { .. } => E306,
            FrontEndError::Ast(_) => E307,
        }
    }

    /// Converts into a diagnostic for rendering.
    pub fn to_diagnostic(&self) -> Diagnostic {
        let diag = Diagnostic::error(self.code(), self.to_string(), self.span());
        match self {
            FrontEndError::ImportNotFound { searched, .. } => {
                let tried: Vec<String> = searched.iter().map(|p| p.display().to_string()).collect();
                diag.with_note(format!("searched: {}", tried.join(", ")))
                    .with_help("add the directory to `[paths] search` in ato.toml")
            }
            FrontEndError::AmbiguousReference { .. } => {
                diag.with_help("rename the local block or the import")
            }
            FrontEndError::NameCollision { previous, .. } => {
                diag.with_label(Label::secondary(*previous, "previously declared here"))
            }
            _ => diag,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ato_diagnostics::LabelStyle;

    #[test]
    fn codes_are_distinct() {
        let codes = [E300, E301, E302, E303, E304, E305, E306, E307];
        for (i, a) in codes.iter().enumerate() {
            for b in &codes[i + 1..] {
                assert_ne!(a, b);
            }
        }
        assert_eq!(E304.to_string(), "E304");
    }

    #[test]
    fn unknown_reference_diagnostic() {
        let err = FrontEndError::UnknownReference {
            reference: "Resistr".into(),
            span: Span::DUMMY,
        };
        let diag = err.to_diagnostic();
        assert_eq!(diag.code, E302);
        assert_eq!(diag.message, "unknown reference `Resistr`");
    }

    #[test]
    fn collision_points_at_previous() {
        let err = FrontEndError::NameCollision {
            name: "R1".into(),
            scope: "app.ato:App".into(),
            span: Span::DUMMY,
            previous: Span::DUMMY,
        };
        let diag = err.to_diagnostic();
        assert_eq!(diag.labels.len(), 1);
        assert_eq!(diag.labels[0].style, LabelStyle::Secondary);
    }

    #[test]
    fn import_not_found_lists_search() {
        let err = FrontEndError::ImportNotFound {
            path: "generics/resistors.ato".into(),
            importer: "app.ato".into(),
            searched: vec![PathBuf::from("/p/src/generics/resistors.ato")],
            span: Span::DUMMY,
        };
        let diag = err.to_diagnostic();
        assert!(diag.notes[0].contains("/p/src/generics/resistors.ato"));
    }

    #[test]
    fn ast_errors_wrap() {
        let err: FrontEndError = AstError::NotFound {
            path: PathBuf::from("x.ato"),
        }
        .into();
        assert_eq!(err.code(), E307);
        assert!(err.span().is_dummy());
    }
}
