//! Class skeletons, resolved layers, and materialized instances.

use crate::address::{AddrStr, Ref};
use crate::ids::{ClassDefId, LayerId};
use ato_ast::{BlockKind, CompareOp, LinkDirection, Literal, Stmt};
use ato_common::Ident;
use ato_source::Span;
use indexmap::IndexMap;
use std::rc::Rc;

/// The fixed classes every inheritance chain ends at.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum Builtin {
    /// `MODULE`
    Module,
    /// `COMPONENT`
    Component,
    /// `INTERFACE`
    Interface,
    /// `PIN`
    Pin,
    /// `SIGNAL`
    Signal,
}

impl Builtin {
    /// All builtins.
    pub const ALL: [Builtin; 5] = [
        Builtin::Module,
        Builtin::Component,
        Builtin::Interface,
        Builtin::Pin,
        Builtin::Signal,
    ];

    /// The name a builtin is referred to by.
    pub fn name(self) -> &'static str {
        match self {
            Builtin::Module => "MODULE",
            Builtin::Component => "COMPONENT",
            Builtin::Interface => "INTERFACE",
            Builtin::Pin => "PIN",
            Builtin::Signal => "SIGNAL",
        }
    }

    /// Looks a builtin up by name.
    pub fn from_name(name: &str) -> Option<Builtin> {
        Self::ALL.into_iter().find(|b| b.name() == name)
    }

    /// The default superclass of a block keyword.
    pub fn for_block(kind: BlockKind) -> Builtin {
        match kind {
            BlockKind::Module => Builtin::Module,
            BlockKind::Component => Builtin::Component,
            BlockKind::Interface => Builtin::Interface,
        }
    }
}

/// What kind of source construct a [`ClassDef`] came from.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum DefKind {
    /// A whole file, which behaves as a module.
    File,
    /// A block definition.
    Block(BlockKind),
    /// A builtin class with no source.
    Builtin(Builtin),
}

/// How a class names its superclass.
#[derive(Clone, PartialEq, Eq, Debug)]
pub enum SuperRef {
    /// An explicit `from` reference, resolved through the closure.
    Explicit(Ref),
    /// The keyword default.
    Default(Builtin),
}

/// `import Name from "file.ato"`
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Import {
    /// The locally bound name.
    pub name: Ref,
    /// The imported class.
    pub target: AddrStr,
    /// Where the import was written.
    pub span: Span,
}

/// `target -> NewClass`: instantiate `NewClass` at `target` instead of the
/// declared type.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Replacement {
    /// Reference relative to the declaring class.
    pub target: Ref,
    /// The substitute class, resolved in the declaring class's scope.
    pub new_class: Ref,
    /// Where the retype was written.
    pub span: Span,
}

/// The immutable skeleton of one block or file.
///
/// Address and closure are assigned when the def is registered and never
/// change afterwards. The body is kept unevaluated for Lofty.
#[derive(Clone, Debug)]
pub struct ClassDef {
    /// Source construct.
    pub kind: DefKind,
    /// Superclass reference; `None` only for builtins.
    pub super_ref: Option<SuperRef>,
    /// Imports by local name, in source order.
    pub imports: IndexMap<Ref, Import>,
    /// Nested block definitions by name, in source order.
    pub local_defs: IndexMap<Ident, ClassDefId>,
    /// Retypes by relative reference, in source order.
    pub replacements: IndexMap<Ref, Replacement>,
    /// Global address.
    pub address: AddrStr,
    /// Enclosing definitions, innermost first; excludes the def itself.
    pub closure: Vec<ClassDefId>,
    /// The statements of the block.
    pub body: Rc<[Stmt]>,
    /// Where the block was defined.
    pub span: Span,
}

/// One level of a class's inheritance chain.
#[derive(Clone, Debug)]
pub struct ClassLayer {
    /// This layer's id.
    pub id: LayerId,
    /// The class definition.
    pub def: ClassDefId,
    /// Address of the class.
    pub address: AddrStr,
    /// The superclass layer; `None` only for builtins.
    pub super_layer: Option<LayerId>,
}

/// A value given to an attribute.
#[derive(Clone, PartialEq, Debug)]
pub struct Assignment {
    /// The value; `None` when only declared.
    pub value: Option<Literal>,
    /// The declared type or unit, if any.
    pub declared_type: Option<String>,
    /// Class (or overriding instance) the assignment was written in.
    pub declared_in: AddrStr,
    /// Where it was written.
    pub span: Span,
}

/// One layer of attribute data and where it came from.
#[derive(Clone, PartialEq, Debug)]
pub struct AssignmentLayer {
    /// The class layer or the overriding ancestor instance.
    pub origin: AddrStr,
    /// Assignments by attribute name, in source order.
    pub entries: IndexMap<Ident, Assignment>,
}

impl AssignmentLayer {
    /// An empty layer.
    pub fn new(origin: AddrStr) -> Self {
        Self {
            origin,
            entries: IndexMap::new(),
        }
    }
}

/// An instance's attribute data as an ordered list of layers.
///
/// Lookups search front to back. Overrides are added as new front layers;
/// no layer is modified once pushed, so inherited data is never mutated.
#[derive(Clone, PartialEq, Debug, Default)]
pub struct Assignments {
    layers: Vec<AssignmentLayer>,
}

impl Assignments {
    /// Creates from layers already ordered front to back.
    pub fn from_layers(layers: Vec<AssignmentLayer>) -> Self {
        Self { layers }
    }

    /// Looks up the front-most record of an attribute, valued or not.
    pub fn get(&self, name: Ident) -> Option<&Assignment> {
        self.layers.iter().find_map(|layer| layer.entries.get(&name))
    }

    /// Looks up the effective value of an attribute.
    ///
    /// A type-only declaration does not override; the search continues
    /// toward the back until a layer carries a value.
    pub fn value(&self, name: Ident) -> Option<&Literal> {
        self.layers
            .iter()
            .find_map(|layer| layer.entries.get(&name).and_then(|a| a.value.as_ref()))
    }

    /// Looks up the front-most declared type of an attribute.
    pub fn declared_type(&self, name: Ident) -> Option<&str> {
        self.layers.iter().find_map(|layer| {
            layer
                .entries
                .get(&name)
                .and_then(|a| a.declared_type.as_deref())
        })
    }

    /// Adds a layer that shadows all existing ones.
    pub fn push_front(&mut self, layer: AssignmentLayer) {
        self.layers.insert(0, layer);
    }

    /// The layers, front first.
    pub fn layers(&self) -> &[AssignmentLayer] {
        &self.layers
    }

    /// Every visible attribute with its effective assignment, ordered by
    /// first appearance from the back (base) layer forwards.
    pub fn effective(&self) -> IndexMap<Ident, &Assignment> {
        let mut names: IndexMap<Ident, ()> = IndexMap::new();
        for layer in self.layers.iter().rev() {
            for name in layer.entries.keys() {
                names.insert(*name, ());
            }
        }
        names
            .into_keys()
            .filter_map(|name| self.get(name).map(|a| (name, a)))
            .collect()
    }
}

/// A resolved connection between two descendants of `parent`.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Link {
    /// Address of the left endpoint.
    pub source: AddrStr,
    /// Address of the right endpoint.
    pub target: AddrStr,
    /// The instance whose block held the `connect`.
    pub parent: AddrStr,
    /// Whether the link is directed.
    pub direction: LinkDirection,
    /// Where the `connect` was written.
    pub span: Span,
}

/// An assertion operand.
#[derive(Clone, PartialEq, Debug)]
pub enum Operand {
    /// A reference to an attribute, relative to the owning instance.
    Ref(Ref),
    /// A literal.
    Literal(Literal),
}

/// One recorded comparison; evaluation belongs to the solver.
#[derive(Clone, PartialEq, Debug)]
pub struct Assertion {
    /// Left operand.
    pub lhs: Operand,
    /// Operator.
    pub op: CompareOp,
    /// Right operand.
    pub rhs: Operand,
    /// Class the assertion was written in.
    pub declared_in: AddrStr,
    /// Where it was written.
    pub span: Span,
}

/// A materialized node of the object graph.
///
/// Built once per `new` (or build root) and never mutated afterwards.
#[derive(Clone, PartialEq, Debug)]
pub struct Instance {
    /// The build-root file and the absolute path to this node.
    pub address: AddrStr,
    /// Class addresses, most-derived first, ending at a builtin.
    pub supers: Vec<AddrStr>,
    /// Owned children in declaration order.
    pub children: IndexMap<Ident, Instance>,
    /// Connections made in this instance's blocks.
    pub links: Vec<Link>,
    /// Layered attribute data.
    pub assignments: Assignments,
    /// Recorded assertions.
    pub assertions: Vec<Assertion>,
    /// Where the instance was created.
    pub span: Span,
}

impl Instance {
    /// The most-derived class.
    pub fn class(&self) -> &AddrStr {
        &self.supers[0]
    }

    /// The builtin the chain ends at.
    pub fn base(&self) -> &AddrStr {
        &self.supers[self.supers.len() - 1]
    }

    /// Returns `true` if `class` is anywhere in the super chain.
    pub fn is_instance_of(&self, class: &AddrStr) -> bool {
        self.supers.iter().any(|s| s == class)
    }

    /// A direct child.
    pub fn child(&self, name: Ident) -> Option<&Instance> {
        self.children.get(&name)
    }

    /// A descendant by relative dotted path; the empty path is `self`.
    pub fn descendant(&self, path: &Ref) -> Option<&Instance> {
        path.segments()
            .iter()
            .try_fold(self, |inst, seg| inst.children.get(seg))
    }

    pub(crate) fn descendant_mut(&mut self, path: &Ref) -> Option<&mut Instance> {
        path.segments()
            .iter()
            .try_fold(self, |inst, seg| inst.children.get_mut(seg))
    }

    /// Number of instances in this subtree, including `self`.
    pub fn subtree_len(&self) -> usize {
        1 + self
            .children
            .values()
            .map(Instance::subtree_len)
            .sum::<usize>()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ato_common::Interner;
    use ato_source::FileId;

    fn assignment(v: i64, origin: &AddrStr) -> Assignment {
        Assignment {
            value: Some(Literal::Int(v)),
            declared_type: None,
            declared_in: origin.clone(),
            span: Span::DUMMY,
        }
    }

    #[test]
    fn builtin_names() {
        assert_eq!(Builtin::from_name("SIGNAL"), Some(Builtin::Signal));
        assert_eq!(Builtin::from_name("signal"), None);
        assert_eq!(Builtin::for_block(BlockKind::Component), Builtin::Component);
    }

    #[test]
    fn front_layer_shadows() {
        let i = Interner::new();
        let x = i.get_or_intern("x");
        let y = i.get_or_intern("y");
        let parent = AddrStr::new(FileId::from_raw(0), Ref::parse(&i, "Parent"));
        let child = AddrStr::new(FileId::from_raw(0), Ref::parse(&i, "Child"));

        let mut base = AssignmentLayer::new(parent.clone());
        base.entries.insert(x, assignment(1, &parent));
        base.entries.insert(y, assignment(5, &parent));
        let mut derived = AssignmentLayer::new(child.clone());
        derived.entries.insert(x, assignment(2, &child));

        let mut data = Assignments::from_layers(vec![derived, base.clone()]);
        assert_eq!(data.value(x), Some(&Literal::Int(2)));
        assert_eq!(data.value(y), Some(&Literal::Int(5)));

        let mut over = AssignmentLayer::new(child.clone());
        over.entries.insert(y, assignment(9, &child));
        data.push_front(over);
        assert_eq!(data.value(y), Some(&Literal::Int(9)));
        assert_eq!(data.layers().len(), 3);
        assert_eq!(data.layers()[2], base);

        let names: Vec<_> = data.effective().keys().copied().collect();
        assert_eq!(names, vec![x, y]);
    }

    #[test]
    fn declared_only_has_no_value() {
        let i = Interner::new();
        let v = i.get_or_intern("voltage");
        let origin = AddrStr::file_root(FileId::from_raw(0));
        let mut layer = AssignmentLayer::new(origin.clone());
        layer.entries.insert(
            v,
            Assignment {
                value: None,
                declared_type: Some("V".into()),
                declared_in: origin,
                span: Span::DUMMY,
            },
        );
        let data = Assignments::from_layers(vec![layer]);
        assert!(data.get(v).is_some());
        assert!(data.value(v).is_none());
        assert_eq!(data.declared_type(v), Some("V"));
    }

    #[test]
    fn declaration_does_not_hide_inherited_value() {
        let i = Interner::new();
        let x = i.get_or_intern("x");
        let parent = AddrStr::new(FileId::from_raw(0), Ref::parse(&i, "Parent"));
        let child = AddrStr::new(FileId::from_raw(0), Ref::parse(&i, "Child"));

        let mut base = AssignmentLayer::new(parent.clone());
        base.entries.insert(x, assignment(1, &parent));
        let mut derived = AssignmentLayer::new(child.clone());
        derived.entries.insert(
            x,
            Assignment {
                value: None,
                declared_type: Some("V".into()),
                declared_in: child.clone(),
                span: Span::DUMMY,
            },
        );

        let data = Assignments::from_layers(vec![derived, base]);
        assert_eq!(data.value(x), Some(&Literal::Int(1)));
        assert_eq!(data.declared_type(x), Some("V"));
        assert_eq!(data.get(x).map(|a| &a.declared_in), Some(&child));
    }
}
