//! Shorthand constructors for statement trees.
//!
//! Mostly for tests and embedders that generate designs programmatically:
//!
//! ```
//! use ato_ast::build::*;
//!
//! let f = file(vec![
//!     component("Base", None, vec![pin("P1")]),
//!     component("Derived", Some("Base"), vec![pin("P2")]),
//! ]);
//! assert_eq!(f.stmts.len(), 2);
//! ```

use crate::ast::*;

/// Splits `"a.b.c"` into its segments.
pub fn dotted(text: &str) -> Vec<String> {
    text.split('.').map(str::to_string).collect()
}

/// A file from its top-level statements.
pub fn file(stmts: Vec<Stmt>) -> SourceFileAst {
    SourceFileAst::new(stmts)
}

fn block(kind: BlockKind, name: &str, super_ref: Option<&str>, body: Vec<Stmt>) -> Stmt {
    Stmt::new(StmtKind::BlockDef(BlockDef {
        block_kind: kind,
        name: name.to_string(),
        super_ref: super_ref.map(dotted),
        body,
    }))
}

/// `module name [from super]:`
pub fn module(name: &str, super_ref: Option<&str>, body: Vec<Stmt>) -> Stmt {
    block(BlockKind::Module, name, super_ref, body)
}

/// `component name [from super]:`
pub fn component(name: &str, super_ref: Option<&str>, body: Vec<Stmt>) -> Stmt {
    block(BlockKind::Component, name, super_ref, body)
}

/// `interface name [from super]:`
pub fn interface(name: &str, super_ref: Option<&str>, body: Vec<Stmt>) -> Stmt {
    block(BlockKind::Interface, name, super_ref, body)
}

/// `import name from "from"`
pub fn import(name: &str, from: &str) -> Stmt {
    Stmt::new(StmtKind::Import {
        name: dotted(name),
        from: from.to_string(),
    })
}

/// `target -> new_class`
pub fn retype(target: &str, new_class: &str) -> Stmt {
    Stmt::new(StmtKind::Retype {
        target: dotted(target),
        new_class: dotted(new_class),
    })
}

/// `pin name`
pub fn pin(name: &str) -> Stmt {
    Stmt::new(StmtKind::Pin {
        name: name.to_string(),
    })
}

/// `signal name`
pub fn signal(name: &str) -> Stmt {
    Stmt::new(StmtKind::Signal {
        name: name.to_string(),
    })
}

/// `target = new class`
pub fn new(target: &str, class: &str) -> Stmt {
    Stmt::new(StmtKind::New {
        target: dotted(target),
        class: dotted(class),
    })
}

/// `target = value`
pub fn assign(target: &str, value: Literal) -> Stmt {
    Stmt::new(StmtKind::Assign {
        target: dotted(target),
        value,
    })
}

/// `target: ty`
pub fn declare(target: &str, ty: Option<&str>) -> Stmt {
    Stmt::new(StmtKind::Declare {
        target: dotted(target),
        ty: ty.map(str::to_string),
    })
}

/// An endpoint referring to an existing child.
pub fn at(text: &str) -> Connectable {
    Connectable::Ref(dotted(text))
}

/// `source ~ target`
pub fn connect(source: Connectable, target: Connectable) -> Stmt {
    Stmt::new(StmtKind::Connect {
        source,
        target,
        direction: LinkDirection::Undirected,
    })
}

/// `source ~> target`
pub fn connect_directed(source: Connectable, target: Connectable) -> Stmt {
    Stmt::new(StmtKind::Connect {
        source,
        target,
        direction: LinkDirection::Directed,
    })
}

/// `assert lhs op rhs`
pub fn assert_cmp(lhs: Operand, op: CompareOp, rhs: Operand) -> Stmt {
    Stmt::new(StmtKind::Assert {
        lhs,
        chain: vec![(op, rhs)],
    })
}

/// An integer literal.
pub fn int(v: i64) -> Literal {
    Literal::Int(v)
}

/// A string literal.
pub fn string(v: &str) -> Literal {
    Literal::Str(v.to_string())
}

/// A physical quantity literal.
pub fn physical(v: &str) -> Literal {
    Literal::Physical(v.to_string())
}
