//! Conformance test helpers for the ato front end.
//!
//! A [`Fixture`] is a small in-memory project: parsed files plus search
//! paths. Every [`Fixture::build`] runs a fresh pipeline, so tests can
//! compare independent runs. The render helpers turn instance trees into
//! plain strings for assertions.

#![warn(missing_docs)]

use ato_ast::{Literal, MemoryAstProvider, SourceFileAst};
use ato_common::{Ident, Interner};
use ato_front::{AddrStr, FrontEnd, FrontEndResult, Instance, Ref};
use std::fmt::Write;
use std::path::{Path, PathBuf};

/// An in-memory project.
pub struct Fixture {
    interner: Interner,
    provider: MemoryAstProvider,
    search_paths: Vec<PathBuf>,
}

impl Default for Fixture {
    fn default() -> Self {
        Self::new()
    }
}

impl Fixture {
    /// Creates an empty project.
    pub fn new() -> Self {
        Self {
            interner: Interner::new(),
            provider: MemoryAstProvider::new(),
            search_paths: Vec::new(),
        }
    }

    /// Adds a parsed file.
    pub fn file(mut self, path: &str, ast: SourceFileAst) -> Self {
        self.provider.insert(path, ast);
        self
    }

    /// Appends an import search directory.
    pub fn search_path(mut self, dir: &str) -> Self {
        self.search_paths.push(PathBuf::from(dir));
        self
    }

    /// The shared interner.
    pub fn interner(&self) -> &Interner {
        &self.interner
    }

    /// Interns a name.
    pub fn name(&self, name: &str) -> Ident {
        self.interner.get_or_intern(name)
    }

    /// Parses a dotted reference.
    pub fn dotted(&self, text: &str) -> Ref {
        Ref::parse(&self.interner, text)
    }

    /// A fresh pipeline over this project.
    pub fn front(&self) -> FrontEnd<'_> {
        FrontEnd::new(&self.interner, &self.provider, self.search_paths.clone())
    }

    /// Builds `entry` (`file.ato:Block.Inner`) in a fresh pipeline.
    pub fn build(&self, entry: &str) -> FrontEndResult<Instance> {
        let mut front = self.front();
        let addr = entry_address(&mut front, entry);
        front.build(&addr)
    }

    /// Builds `entry` and renders the resulting tree with [`render_tree`].
    pub fn build_tree(&self, entry: &str) -> FrontEndResult<String> {
        let mut front = self.front();
        let addr = entry_address(&mut front, entry);
        let instance = front.build(&addr)?;
        Ok(render_tree(&front, &instance))
    }
}

/// Registers the file of `file.ato:Block.Inner` and returns its address.
/// Without a `:` the address is the file root.
pub fn entry_address(front: &mut FrontEnd<'_>, entry: &str) -> AddrStr {
    let (file, block) = entry.split_once(':').unwrap_or((entry, ""));
    let segments: Vec<&str> = block.split('.').filter(|s| !s.is_empty()).collect();
    front.address(Path::new(file), &segments)
}

/// Names of an instance's direct children, in order.
pub fn child_names(interner: &Interner, instance: &Instance) -> Vec<String> {
    instance
        .children
        .keys()
        .map(|&name| interner.resolve(name).to_string())
        .collect()
}

/// The effective value of `path.attr` below `instance`.
pub fn value_at(interner: &Interner, instance: &Instance, path: &str) -> Option<Literal> {
    let r = Ref::parse(interner, path);
    let (descendant, attr) = r.split_last()?;
    instance
        .descendant(&descendant)?
        .assignments
        .value(attr)
        .cloned()
}

/// Renders an instance tree, one node per line, children indented:
///
/// ```text
/// main.ato:App (App < MODULE)
///   r1 (Resistor < COMPONENT) value=10kohm
///     1 (PIN)
///   link r1.1 ~ r2.1
/// ```
pub fn render_tree(front: &FrontEnd<'_>, instance: &Instance) -> String {
    let mut out = String::new();
    render_node(front, instance, 0, &mut out);
    out
}

fn render_node(front: &FrontEnd<'_>, instance: &Instance, depth: usize, out: &mut String) {
    let interner = front.interner();
    let indent = "  ".repeat(depth);
    let name = if depth == 0 {
        front.render_addr(&instance.address)
    } else {
        instance
            .address
            .path
            .last()
            .map(|n| interner.resolve(n).to_string())
            .unwrap_or_default()
    };
    let chain: Vec<String> = instance
        .supers
        .iter()
        .map(|s| front.render_ref(&s.path))
        .collect();
    let _ = write!(out, "{indent}{name} ({})", chain.join(" < "));
    for attr in instance.assignments.effective().into_keys() {
        if let Some(value) = instance.assignments.value(attr) {
            let _ = write!(out, " {}={value}", interner.resolve(attr));
        }
    }
    out.push('\n');
    for child in instance.children.values() {
        render_node(front, child, depth + 1, out);
    }
    for link in &instance.links {
        let rel = |a: &AddrStr| front.render_ref(&a.path.suffix(instance.address.path.len()));
        let arrow = match link.direction {
            ato_ast::LinkDirection::Undirected => "~",
            ato_ast::LinkDirection::Directed => "~>",
        };
        let _ = writeln!(
            out,
            "{indent}  link {} {arrow} {}",
            rel(&link.source),
            rel(&link.target)
        );
    }
}
