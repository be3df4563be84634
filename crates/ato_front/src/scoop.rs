//! Scoop: skeleton extraction.
//!
//! Turns one file's statements into a tree of [`ClassDef`]s without
//! evaluating anything: imports, retypes and nested blocks are recorded, all
//! other statements are left in the body for Lofty. A file is scooped in two
//! steps. The skeleton is built and checked for collisions first, and only
//! a clean skeleton is registered, so a failing file leaves no defs behind.

use crate::address::{AddrStr, Ref};
use crate::datamodel::{Builtin, ClassDef, DefKind, Import, Replacement, SuperRef};
use crate::errors::{FrontEndError, FrontEndResult};
use crate::front::FrontEnd;
use crate::ids::ClassDefId;
use ato_ast::{Stmt, StmtKind};
use ato_common::Ident;
use ato_source::{FileId, Span};
use indexmap::IndexMap;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use tracing::debug;

/// A class definition before registration.
struct Skeleton {
    kind: DefKind,
    super_ref: SuperRef,
    imports: IndexMap<Ref, Import>,
    local_defs: IndexMap<Ident, Skeleton>,
    replacements: IndexMap<Ref, Replacement>,
    body: Rc<[Stmt]>,
    span: Span,
}

/// Where in the file a skeleton is being built, for error messages.
struct BlockScope<'p> {
    file: FileId,
    dir: &'p Path,
    path: Ref,
}

impl<'a> FrontEnd<'a> {
    /// Returns the id of the class at `addr`, scooping its file on first use.
    pub(crate) fn class_def_id(&mut self, addr: &AddrStr, span: Span) -> FrontEndResult<ClassDefId> {
        if let Some(&id) = self.def_index.get(addr) {
            return Ok(id);
        }
        if !addr.is_builtin() && !self.scooped.contains(&addr.file) {
            self.scoop_file(addr.file)?;
            if let Some(&id) = self.def_index.get(addr) {
                return Ok(id);
            }
        }
        Err(FrontEndError::UnknownReference {
            reference: self.render_addr(addr),
            span,
        })
    }

    /// Scoops and registers every definition in a file.
    pub(crate) fn scoop_file(&mut self, file: FileId) -> FrontEndResult<()> {
        let path = match self.source_db.path(file) {
            Some(path) => path.to_path_buf(),
            None => {
                return Err(FrontEndError::UnknownReference {
                    reference: format!("<file {}>", file.as_raw()),
                    span: Span::DUMMY,
                })
            }
        };
        let ast = self.provider.ast(&path)?;
        let dir = path.parent().map(Path::to_path_buf).unwrap_or_default();
        let scope = BlockScope {
            file,
            dir: &dir,
            path: Ref::empty(),
        };
        let skeleton = self.scoop_block(
            &scope,
            DefKind::File,
            SuperRef::Default(Builtin::Module),
            ast.stmts.into(),
            Span::DUMMY,
        )?;

        let before = self.defs.len();
        self.register_obj_tree(skeleton, AddrStr::file_root(file), Vec::new());
        self.scooped.insert(file);
        debug!(
            file = %path.display(),
            defs = self.defs.len() - before,
            "scooped file"
        );
        Ok(())
    }

    fn scoop_block(
        &mut self,
        scope: &BlockScope<'_>,
        kind: DefKind,
        super_ref: SuperRef,
        body: Rc<[Stmt]>,
        span: Span,
    ) -> FrontEndResult<Skeleton> {
        let mut imports: IndexMap<Ref, Import> = IndexMap::new();
        let mut local_defs: IndexMap<Ident, Skeleton> = IndexMap::new();
        let mut replacements: IndexMap<Ref, Replacement> = IndexMap::new();

        for stmt in body.iter() {
            let stmt_span = self.locate(scope.file, stmt.span);
            match &stmt.kind {
                StmtKind::Import { name, from } => {
                    let name = Ref::intern(self.interner, name);
                    if let Some(prev) = imports.get(&name) {
                        return Err(self.collision(scope, &name, stmt_span, prev.span));
                    }
                    let target_file = self.find_import(scope, from, stmt_span)?;
                    imports.insert(
                        name.clone(),
                        Import {
                            target: AddrStr::new(target_file, name.clone()),
                            name,
                            span: stmt_span,
                        },
                    );
                }
                StmtKind::Retype { target, new_class } => {
                    let target = Ref::intern(self.interner, target);
                    if let Some(prev) = replacements.get(&target) {
                        return Err(self.collision(scope, &target, stmt_span, prev.span));
                    }
                    replacements.insert(
                        target.clone(),
                        Replacement {
                            target,
                            new_class: Ref::intern(self.interner, new_class),
                            span: stmt_span,
                        },
                    );
                }
                StmtKind::BlockDef(block) => {
                    if block.name.is_empty() || block.name.contains('.') {
                        return Err(FrontEndError::unsupported(
                            format!("block name `{}` must be a single identifier", block.name),
                            stmt_span,
                        ));
                    }
                    let name = self.interner.get_or_intern(&block.name);
                    if let Some(prev) = local_defs.get(&name) {
                        return Err(self.collision(scope, &Ref::from_one(name), stmt_span, prev.span));
                    }
                    let super_ref = match &block.super_ref {
                        Some(r) => SuperRef::Explicit(Ref::intern(self.interner, r)),
                        None => SuperRef::Default(Builtin::for_block(block.block_kind)),
                    };
                    let inner = BlockScope {
                        file: scope.file,
                        dir: scope.dir,
                        path: scope.path.child(name),
                    };
                    let child = self.scoop_block(
                        &inner,
                        DefKind::Block(block.block_kind),
                        super_ref,
                        block.body.clone().into(),
                        stmt_span,
                    )?;
                    local_defs.insert(name, child);
                }
                _ => {}
            }
        }

        // A retype may only name an instantiation, never a definition or import.
        for (key, replacement) in &replacements {
            if let Some(import) = imports.get(key) {
                return Err(self.collision(scope, key, replacement.span, import.span));
            }
            if key.len() == 1 {
                if let Some(def) = key.first().and_then(|k| local_defs.get(&k)) {
                    return Err(self.collision(scope, key, replacement.span, def.span));
                }
            }
        }

        Ok(Skeleton {
            kind,
            super_ref,
            imports,
            local_defs,
            replacements,
            body,
            span,
        })
    }

    /// Locates an imported file: the importing file's directory first, then
    /// each search path in order.
    fn find_import(&mut self, scope: &BlockScope<'_>, from: &str, span: Span) -> FrontEndResult<FileId> {
        let candidates: Vec<PathBuf> = std::iter::once(scope.dir)
            .chain(self.search_paths.iter().map(PathBuf::as_path))
            .map(|dir| dir.join(from))
            .collect();
        let found = candidates.iter().find(|p| self.provider.exists(p)).cloned();
        match found {
            Some(found) => Ok(self.source_db.intern_path(&found)),
            None => Err(FrontEndError::ImportNotFound {
                path: from.to_string(),
                importer: self.render_addr(&AddrStr::file_root(scope.file)),
                searched: candidates,
                span,
            }),
        }
    }

    fn collision(&self, scope: &BlockScope<'_>, key: &Ref, span: Span, previous: Span) -> FrontEndError {
        FrontEndError::NameCollision {
            name: self.render_ref(key),
            scope: self.render_addr(&AddrStr::new(scope.file, scope.path.clone())),
            span,
            previous,
        }
    }

    /// Assigns addresses and closures to a skeleton tree and caches every node.
    fn register_obj_tree(&mut self, skeleton: Skeleton, address: AddrStr, closure: Vec<ClassDefId>) -> ClassDefId {
        let id = self.defs.alloc(ClassDef {
            kind: skeleton.kind,
            super_ref: Some(skeleton.super_ref),
            imports: skeleton.imports,
            local_defs: IndexMap::new(),
            replacements: skeleton.replacements,
            address: address.clone(),
            closure: closure.clone(),
            body: skeleton.body,
            span: skeleton.span,
        });
        self.def_index.insert(address.clone(), id);

        let mut child_closure = Vec::with_capacity(closure.len() + 1);
        child_closure.push(id);
        child_closure.extend(closure);
        for (name, child) in skeleton.local_defs {
            let child_id = self.register_obj_tree(child, address.add_node(name), child_closure.clone());
            self.defs[id].local_defs.insert(name, child_id);
        }
        id
    }
}
