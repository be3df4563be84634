//! Statement and literal types.

use ato_source::Span;
use serde::{Deserialize, Serialize};
use std::fmt;

/// One parsed `.ato` file: its top-level statements in source order.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SourceFileAst {
    /// Top-level statements.
    pub stmts: Vec<Stmt>,
}

impl SourceFileAst {
    /// Creates a file from its top-level statements.
    pub fn new(stmts: Vec<Stmt>) -> Self {
        Self { stmts }
    }
}

/// A statement with its source location.
///
/// `span` may be omitted in JSON, in which case it is [`Span::DUMMY`]. The
/// `file` half of a span is rebound by the front end when the file is loaded.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Stmt {
    /// What the statement says.
    #[serde(flatten)]
    pub kind: StmtKind,
    /// Where it was written.
    #[serde(default)]
    pub span: Span,
}

impl Stmt {
    /// Wraps a statement kind with a dummy span.
    pub fn new(kind: StmtKind) -> Self {
        Self {
            kind,
            span: Span::DUMMY,
        }
    }

    /// Sets the span.
    pub fn at(mut self, span: Span) -> Self {
        self.span = span;
        self
    }
}

/// Every statement form of the language.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StmtKind {
    /// `import Name from "path/to/file.ato"`
    Import {
        /// The (possibly dotted) name imported and bound locally.
        name: Vec<String>,
        /// The file path as written.
        from: String,
    },
    /// `target -> NewClass`
    Retype {
        /// The relative reference being retyped.
        target: Vec<String>,
        /// The class to instantiate there instead.
        new_class: Vec<String>,
    },
    /// `module Name from Super:` and friends.
    BlockDef(BlockDef),
    /// `pin Name`
    Pin {
        /// Pin name; numeric pin names are kept as their text.
        name: String,
    },
    /// `signal Name`
    Signal {
        /// Signal name.
        name: String,
    },
    /// `target = new Class`
    New {
        /// The assigned name.
        target: Vec<String>,
        /// The class to instantiate.
        class: Vec<String>,
    },
    /// `target = literal`
    Assign {
        /// The assigned name, dotted for overrides of a descendant.
        target: Vec<String>,
        /// The value.
        value: Literal,
    },
    /// `target: type` declares an attribute without giving it a value.
    Declare {
        /// The declared name.
        target: Vec<String>,
        /// The declared type or unit as written, if any.
        #[serde(default)]
        ty: Option<String>,
    },
    /// `target += literal`
    CumAssign {
        /// The assigned name.
        target: Vec<String>,
        /// The value.
        value: Literal,
    },
    /// `target |= literal`
    SetAssign {
        /// The assigned name.
        target: Vec<String>,
        /// The value.
        value: Literal,
    },
    /// `source ~ target` or `source ~> target`
    Connect {
        /// Left endpoint.
        source: Connectable,
        /// Right endpoint.
        target: Connectable,
        /// Link direction.
        #[serde(default)]
        direction: LinkDirection,
    },
    /// `assert a < b <= c`, kept as a chain of pairwise comparisons.
    Assert {
        /// Leftmost operand.
        lhs: Operand,
        /// Each following operator and operand.
        chain: Vec<(CompareOp, Operand)>,
    },
}

/// The keyword introducing a block definition.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlockKind {
    /// `module`
    Module,
    /// `component`
    Component,
    /// `interface`
    Interface,
}

impl fmt::Display for BlockKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BlockKind::Module => write!(f, "module"),
            BlockKind::Component => write!(f, "component"),
            BlockKind::Interface => write!(f, "interface"),
        }
    }
}

/// A nested block definition.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BlockDef {
    /// `module`, `component` or `interface`.
    pub block_kind: BlockKind,
    /// Block name as written.
    pub name: String,
    /// Explicit `from` reference, if present.
    #[serde(default)]
    pub super_ref: Option<Vec<String>>,
    /// Block body.
    #[serde(default)]
    pub body: Vec<Stmt>,
}

/// One side of a `connect` statement.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Connectable {
    /// An existing (possibly dotted) child.
    Ref(Vec<String>),
    /// A pin declared inline: `pin 1 ~ gnd`.
    Pin(String),
    /// A signal declared inline: `signal vcc ~ p1`.
    Signal(String),
}

/// Whether a connection has a direction.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LinkDirection {
    /// `~`
    #[default]
    Undirected,
    /// `~>`
    Directed,
}

/// An assignable literal.
///
/// Physical quantities are not evaluated here; their text is carried through
/// for the unit evaluator downstream.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Literal {
    /// An integer.
    Int(i64),
    /// A float.
    Float(f64),
    /// A string.
    Str(String),
    /// `true` / `false`.
    Bool(bool),
    /// A physical quantity such as `10kohm +/- 5%`, as written.
    Physical(String),
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Literal::Int(v) => write!(f, "{v}"),
            Literal::Float(v) => write!(f, "{v}"),
            Literal::Str(v) => write!(f, "\"{v}\""),
            Literal::Bool(v) => write!(f, "{v}"),
            Literal::Physical(v) => write!(f, "{v}"),
        }
    }
}

/// An operand of an assertion.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operand {
    /// A reference to an attribute.
    Ref(Vec<String>),
    /// A literal.
    Literal(Literal),
}

/// Comparison operators usable in `assert`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompareOp {
    /// `<`
    Lt,
    /// `>`
    Gt,
    /// `<=`
    Le,
    /// `>=`
    Ge,
    /// `within`
    Within,
}

impl fmt::Display for CompareOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            CompareOp::Lt => "<",
            CompareOp::Gt => ">",
            CompareOp::Le => "<=",
            CompareOp::Ge => ">=",
            CompareOp::Within => "within",
        };
        f.write_str(s)
    }
}
