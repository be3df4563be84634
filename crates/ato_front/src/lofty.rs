//! Lofty: instance materialization.
//!
//! Walks a layer chain base-first, visiting every body once per instance,
//! and assembles the children, links, layered assignments and assertions of
//! a fresh [`Instance`]. Retypes declared anywhere in the chain, or by an
//! enclosing instantiation, are kept in `known_replacements` for exactly
//! the duration of the call that declared them.

use crate::address::{AddrStr, Ref};
use crate::datamodel::{
    Assertion, Assignment, AssignmentLayer, Assignments, Builtin, Instance, Link, Operand,
};
use crate::errors::{FrontEndError, FrontEndResult};
use crate::front::FrontEnd;
use crate::ids::{ClassDefId, LayerId};
use ato_ast::{Connectable, LinkDirection, StmtKind};
use ato_common::Ident;
use ato_source::{FileId, Span};
use indexmap::IndexMap;
use tracing::debug;

/// A retype in force while its declaring instantiation is being built.
#[derive(Clone, Debug)]
pub(crate) struct PendingReplacement {
    pub(crate) new_class: Ref,
    pub(crate) declared_in: ClassDefId,
    pub(crate) span: Span,
}

struct PendingLink {
    source: Ref,
    target: Ref,
    direction: LinkDirection,
    span: Span,
}

struct Override {
    target: Ref,
    descendant: Ref,
    name: Ident,
    assignment: Assignment,
}

#[derive(Default)]
struct Collected {
    children: IndexMap<Ident, Instance>,
    links: Vec<PendingLink>,
    layers: Vec<AssignmentLayer>,
    overrides: Vec<Override>,
    assertions: Vec<Assertion>,
}

impl<'a> FrontEnd<'a> {
    /// Instantiates `layer` at the absolute path `new_ref`.
    ///
    /// The instance is addressed in the file the layer's class lives in.
    /// Fails without producing anything if any reference in the subtree
    /// does not resolve.
    pub fn make_instance(&mut self, new_ref: &Ref, layer: LayerId) -> FrontEndResult<Instance> {
        let root = self.layers[layer].address.file;
        self.instantiate(root, new_ref.clone(), layer, Span::DUMMY)
    }

    pub(crate) fn instantiate(
        &mut self,
        root: FileId,
        new_ref: Ref,
        layer: LayerId,
        span: Span,
    ) -> FrontEndResult<Instance> {
        let class = self.layers[layer].address.clone();
        if self.instantiating.contains(&class) {
            return Err(FrontEndError::CircularInstantiation {
                address: self.render_addr(&class),
                span,
            });
        }

        let supers = self.layer_chain(layer);
        self.instantiating.push(class);
        let added = self.push_replacements(&new_ref, &supers);
        let result = self.materialize(root, &new_ref, &supers, span);
        for key in added {
            self.known_replacements.remove(&key);
        }
        self.instantiating.pop();
        result
    }

    /// Registers the retypes of every layer in the chain under absolute
    /// keys. Keys already present belong to an enclosing instantiation or a
    /// more-derived layer and win. Returns the keys this call added.
    fn push_replacements(&mut self, new_ref: &Ref, supers: &[LayerId]) -> Vec<Ref> {
        let mut added = Vec::new();
        for &layer in supers {
            let def_id = self.layers[layer].def;
            let def = &self.defs[def_id];
            for (rel, replacement) in &def.replacements {
                let key = new_ref.join(rel);
                if self.known_replacements.contains_key(&key) {
                    continue;
                }
                self.known_replacements.insert(
                    key.clone(),
                    PendingReplacement {
                        new_class: replacement.new_class.clone(),
                        declared_in: def_id,
                        span: replacement.span,
                    },
                );
                added.push(key);
            }
        }
        added
    }

    fn materialize(
        &mut self,
        root: FileId,
        new_ref: &Ref,
        supers: &[LayerId],
        span: Span,
    ) -> FrontEndResult<Instance> {
        let mut collected = Collected::default();
        for &layer in supers.iter().rev() {
            self.visit_layer(root, new_ref, layer, &mut collected)?;
        }

        let Collected {
            children,
            links,
            mut layers,
            overrides,
            assertions,
        } = collected;
        layers.reverse();

        let mut instance = Instance {
            address: AddrStr::new(root, new_ref.clone()),
            supers: supers
                .iter()
                .map(|&l| self.layers[l].address.clone())
                .collect(),
            children,
            links: Vec::with_capacity(links.len()),
            assignments: Assignments::from_layers(layers),
            assertions,
            span,
        };

        for link in links {
            let source = self.link_endpoint(&instance, &link.source, link.span)?;
            let target = self.link_endpoint(&instance, &link.target, link.span)?;
            instance.links.push(Link {
                source,
                target,
                parent: instance.address.clone(),
                direction: link.direction,
                span: link.span,
            });
        }

        self.apply_overrides(&mut instance, overrides)?;

        debug!(
            instance = %self.render_addr(&instance.address),
            class = %self.render_addr(instance.class()),
            children = instance.children.len(),
            links = instance.links.len(),
            "materialized instance"
        );
        Ok(instance)
    }

    fn visit_layer(
        &mut self,
        root: FileId,
        new_ref: &Ref,
        layer: LayerId,
        collected: &mut Collected,
    ) -> FrontEndResult<()> {
        let def_id = self.layers[layer].def;
        let def = &self.defs[def_id];
        let body = def.body.clone();
        let class_addr = def.address.clone();
        let file = class_addr.file;
        let mut data = AssignmentLayer::new(class_addr.clone());

        for stmt in body.iter() {
            let span = self.locate(file, stmt.span);
            match &stmt.kind {
                StmtKind::Import { .. } | StmtKind::Retype { .. } | StmtKind::BlockDef(_) => {}

                StmtKind::Pin { name } => {
                    let name = self.interner.get_or_intern(name);
                    let pin = self.leaf(root, new_ref, name, Builtin::Pin, span);
                    collected.children.insert(name, pin);
                }
                StmtKind::Signal { name } => {
                    let name = self.interner.get_or_intern(name);
                    let signal = self.leaf(root, new_ref, name, Builtin::Signal, span);
                    collected.children.insert(name, signal);
                }

                StmtKind::New { target, class } => {
                    let target = Ref::intern(self.interner, target);
                    let name = match target.segments() {
                        [name] => *name,
                        _ => {
                            return Err(FrontEndError::unsupported(
                                format!(
                                    "cannot assign a new object to the multi-part reference `{}`",
                                    self.render_ref(&target)
                                ),
                                span,
                            ))
                        }
                    };
                    let child_ref = new_ref.child(name);
                    let class_addr = match self.known_replacements.get(&child_ref).cloned() {
                        Some(replacement) => {
                            debug!(
                                at = %self.render_ref(&child_ref),
                                class = %self.render_ref(&replacement.new_class),
                                "applying replacement"
                            );
                            let scopes = self.scopes_of(replacement.declared_in);
                            self.lookup_class_in_closure(
                                &scopes,
                                &replacement.new_class,
                                replacement.span,
                            )?
                        }
                        None => {
                            let class = Ref::intern(self.interner, class);
                            let scopes = self.scopes_of(def_id);
                            self.lookup_class_in_closure(&scopes, &class, span)?
                        }
                    };
                    let child_layer = self.layer_id(&class_addr, span)?;
                    let child = self.instantiate(root, child_ref, child_layer, span)?;
                    collected.children.insert(name, child);
                }

                StmtKind::Assign { target, value } => {
                    let target = Ref::intern(self.interner, target);
                    let assignment = Assignment {
                        value: Some(value.clone()),
                        declared_type: None,
                        declared_in: class_addr.clone(),
                        span,
                    };
                    match target.split_last() {
                        None => {
                            return Err(FrontEndError::unsupported("empty assignment target", span))
                        }
                        Some((descendant, name)) if descendant.is_empty() => {
                            match data.entries.get_mut(&name) {
                                Some(existing) => {
                                    existing.value = assignment.value;
                                    existing.span = span;
                                }
                                None => {
                                    data.entries.insert(name, assignment);
                                }
                            }
                        }
                        Some((descendant, name)) => collected.overrides.push(Override {
                            target,
                            descendant,
                            name,
                            assignment,
                        }),
                    }
                }

                StmtKind::Declare { target, ty } => {
                    let target = Ref::intern(self.interner, target);
                    let name = match target.segments() {
                        [name] => *name,
                        _ => {
                            return Err(FrontEndError::unsupported(
                                format!(
                                    "cannot declare fields in the nested object `{}`",
                                    self.render_ref(&target)
                                ),
                                span,
                            ))
                        }
                    };
                    data.entries
                        .entry(name)
                        .and_modify(|a| a.declared_type = ty.clone())
                        .or_insert_with(|| Assignment {
                            value: None,
                            declared_type: ty.clone(),
                            declared_in: class_addr.clone(),
                            span,
                        });
                }

                StmtKind::CumAssign { target, .. } => {
                    return Err(FrontEndError::unsupported(
                        format!("cumulative assignment (`+=`) to `{}`", target.join(".")),
                        span,
                    ))
                }
                StmtKind::SetAssign { target, .. } => {
                    return Err(FrontEndError::unsupported(
                        format!("set assignment (`|=`) to `{}`", target.join(".")),
                        span,
                    ))
                }

                StmtKind::Connect {
                    source,
                    target,
                    direction,
                } => {
                    let source = self.connectable(root, new_ref, source, span, collected);
                    let target = self.connectable(root, new_ref, target, span, collected);
                    collected.links.push(PendingLink {
                        source,
                        target,
                        direction: *direction,
                        span,
                    });
                }

                StmtKind::Assert { lhs, chain } => {
                    let mut left = self.operand(lhs);
                    for (op, rhs) in chain {
                        let right = self.operand(rhs);
                        collected.assertions.push(Assertion {
                            lhs: left,
                            op: *op,
                            rhs: right.clone(),
                            declared_in: class_addr.clone(),
                            span,
                        });
                        left = right;
                    }
                }
            }
        }

        collected.layers.push(data);
        Ok(())
    }

    /// The lexical scopes visible inside a class: itself, then its closure.
    fn scopes_of(&self, def: ClassDefId) -> Vec<ClassDefId> {
        std::iter::once(def)
            .chain(self.defs[def].closure.iter().copied())
            .collect()
    }

    fn leaf(&self, root: FileId, parent: &Ref, name: Ident, builtin: Builtin, span: Span) -> Instance {
        let class = self.builtin_address(builtin);
        Instance {
            address: AddrStr::new(root, parent.child(name)),
            supers: vec![class.clone()],
            children: IndexMap::new(),
            links: Vec::new(),
            assignments: Assignments::from_layers(vec![AssignmentLayer::new(class)]),
            assertions: Vec::new(),
            span,
        }
    }

    fn connectable(
        &self,
        root: FileId,
        new_ref: &Ref,
        endpoint: &Connectable,
        span: Span,
        collected: &mut Collected,
    ) -> Ref {
        match endpoint {
            Connectable::Ref(path) => Ref::intern(self.interner, path),
            Connectable::Pin(name) | Connectable::Signal(name) => {
                let builtin = match endpoint {
                    Connectable::Pin(_) => Builtin::Pin,
                    _ => Builtin::Signal,
                };
                let name = self.interner.get_or_intern(name);
                let leaf = self.leaf(root, new_ref, name, builtin, span);
                collected.children.insert(name, leaf);
                Ref::from_one(name)
            }
        }
    }

    fn operand(&self, operand: &ato_ast::Operand) -> Operand {
        match operand {
            ato_ast::Operand::Ref(path) => Operand::Ref(Ref::intern(self.interner, path)),
            ato_ast::Operand::Literal(lit) => Operand::Literal(lit.clone()),
        }
    }

    fn link_endpoint(&self, instance: &Instance, path: &Ref, span: Span) -> FrontEndResult<AddrStr> {
        match instance.descendant(path) {
            Some(endpoint) if !path.is_empty() => Ok(endpoint.address.clone()),
            _ => Err(FrontEndError::UnknownReference {
                reference: self.render_ref(path),
                span,
            }),
        }
    }

    /// Pushes one front layer per overridden descendant, in statement order.
    fn apply_overrides(&self, instance: &mut Instance, overrides: Vec<Override>) -> FrontEndResult<()> {
        let mut grouped: IndexMap<Ref, AssignmentLayer> = IndexMap::new();
        for o in overrides {
            if instance.descendant(&o.descendant).is_none() {
                return Err(FrontEndError::UnknownReference {
                    reference: self.render_ref(&o.target),
                    span: o.assignment.span,
                });
            }
            grouped
                .entry(o.descendant)
                .or_insert_with(|| AssignmentLayer::new(instance.address.clone()))
                .entries
                .insert(o.name, o.assignment);
        }
        for (path, layer) in grouped {
            if let Some(target) = instance.descendant_mut(&path) {
                target.assignments.push_front(layer);
            }
        }
        Ok(())
    }
}
