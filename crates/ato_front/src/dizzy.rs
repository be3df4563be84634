//! Dizzy: inheritance layering.
//!
//! Resolves each class's single superclass through its lexical closure and
//! caches the resulting [`ClassLayer`](crate::datamodel::ClassLayer) by
//! address. Bodies are not visited here.

use crate::address::{AddrStr, Ref};
use crate::datamodel::{Builtin, ClassLayer, SuperRef};
use crate::errors::{FrontEndError, FrontEndResult};
use crate::front::FrontEnd;
use crate::ids::{ClassDefId, LayerId};
use ato_source::{FileId, Span};
use tracing::{debug, trace};

impl<'a> FrontEnd<'a> {
    /// Returns the layer of the class at `addr`, building and caching it
    /// together with its whole super chain on first use.
    pub(crate) fn layer_id(&mut self, addr: &AddrStr, span: Span) -> FrontEndResult<LayerId> {
        if let Some(&id) = self.layer_index.get(addr) {
            return Ok(id);
        }
        let def_id = self.class_def_id(addr, span)?;
        if !self.resolving.insert(addr.clone()) {
            return Err(FrontEndError::CircularInheritance {
                address: self.render_addr(addr),
                span: self.defs[def_id].span,
            });
        }
        let super_layer = self.resolve_super(def_id);
        self.resolving.remove(addr);
        let super_layer = super_layer?;

        let id = self.layers.next_id();
        self.layers.alloc(ClassLayer {
            id,
            def: def_id,
            address: addr.clone(),
            super_layer,
        });
        self.layer_index.insert(addr.clone(), id);
        debug!(class = %self.render_addr(addr), "built class layer");
        Ok(id)
    }

    fn resolve_super(&mut self, def_id: ClassDefId) -> FrontEndResult<Option<LayerId>> {
        let def = &self.defs[def_id];
        let span = def.span;
        let target = match &def.super_ref {
            None => return Ok(None),
            Some(SuperRef::Default(builtin)) => self.builtin_address(*builtin),
            Some(SuperRef::Explicit(r)) => {
                let r = r.clone();
                let closure = def.closure.clone();
                self.lookup_class_in_closure(&closure, &r, span)?
            }
        };
        Ok(Some(self.layer_id(&target, span)?))
    }

    /// Resolves a class reference through a chain of scopes, innermost first.
    ///
    /// In each scope the reference's first segment is checked against the
    /// local definitions and the imports. Matching both is ambiguous. A local
    /// definition composes its address with the remaining segments. A
    /// missing last segment is an unknown reference; a missing inner
    /// segment could be an instance, and chasing through one is
    /// unsupported. An import must match the whole reference. Unmatched
    /// references fall back to the builtins.
    pub fn lookup_class_in_closure(
        &self,
        scopes: &[ClassDefId],
        r: &Ref,
        span: Span,
    ) -> FrontEndResult<AddrStr> {
        let (first, rest) = match r.split_first() {
            Some(split) => split,
            None => return Err(FrontEndError::unsupported("empty class reference", span)),
        };

        for &scope_id in scopes {
            let scope = &self.defs[scope_id];
            let local = scope.local_defs.get(&first).copied();
            let import_lead = scope.imports.keys().any(|k| k.first() == Some(first));

            if local.is_some() && import_lead {
                return Err(FrontEndError::AmbiguousReference {
                    name: self.interner.resolve(first).to_string(),
                    scope: self.render_addr(&scope.address),
                    span,
                });
            }

            if let Some(local) = local {
                let base = &self.defs[local].address;
                let missing = (1..=rest.len())
                    .find(|&n| !self.def_index.contains_key(&base.join(&rest.prefix(n))));
                return match missing {
                    None => {
                        let target = base.join(&rest);
                        trace!(reference = %self.render_ref(r), target = %self.render_addr(&target), "resolved local");
                        Ok(target)
                    }
                    Some(n) if n == rest.len() => Err(FrontEndError::UnknownReference {
                        reference: self.render_ref(r),
                        span,
                    }),
                    Some(n) => Err(FrontEndError::unsupported(
                        format!(
                            "`{}` reaches past `{}`; only nested blocks can follow a local block",
                            self.render_ref(r),
                            self.render_ref(&r.prefix(n + 1))
                        ),
                        span,
                    )),
                };
            }

            if let Some(import) = scope.imports.get(r) {
                let target = import.target.clone();
                trace!(reference = %self.render_ref(r), target = %self.render_addr(&target), "resolved import");
                return Ok(target);
            }

            if import_lead {
                return Err(FrontEndError::unsupported(
                    format!(
                        "`{}` reaches into an import; import the inner name directly",
                        self.render_ref(r)
                    ),
                    span,
                ));
            }
        }

        if rest.is_empty() && Builtin::from_name(self.interner.resolve(first)).is_some() {
            return Ok(AddrStr::new(FileId::DUMMY, Ref::from_one(first)));
        }

        Err(FrontEndError::UnknownReference {
            reference: self.render_ref(r),
            span,
        })
    }

    /// The ids of a layer and all its supers, most-derived first.
    pub fn layer_chain(&self, layer: LayerId) -> Vec<LayerId> {
        std::iter::successors(Some(layer), |&id| self.layers[id].super_layer).collect()
    }
}
