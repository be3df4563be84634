//! The [`FrontEnd`]: caches and entry points of one pipeline run.

use crate::address::{AddrStr, Ref};
use crate::arena::Arena;
use crate::datamodel::{Builtin, ClassDef, ClassLayer, DefKind, Instance};
use crate::errors::FrontEndResult;
use crate::ids::{ClassDefId, LayerId};
use crate::lofty::PendingReplacement;
use ato_ast::AstProvider;
use ato_common::{Ident, Interner};
use ato_source::{FileId, SourceDb, Span};
use indexmap::IndexMap;
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::rc::Rc;
use tracing::instrument;

/// One run of the resolution pipeline.
///
/// Owns every cache: class definitions and layers are stored in arenas and
/// found by [`AddrStr`], so the super and import graph holds only ids.
/// Definitions and layers are created on first request and kept for the
/// whole run. Instances are built fresh on every call.
///
/// Not thread-safe; independent builds each get their own `FrontEnd`.
pub struct FrontEnd<'a> {
    pub(crate) interner: &'a Interner,
    pub(crate) provider: &'a dyn AstProvider,
    pub(crate) search_paths: Vec<PathBuf>,
    pub(crate) source_db: SourceDb,

    pub(crate) defs: Arena<ClassDefId, ClassDef>,
    pub(crate) def_index: HashMap<AddrStr, ClassDefId>,
    pub(crate) scooped: HashSet<FileId>,

    pub(crate) layers: Arena<LayerId, ClassLayer>,
    pub(crate) layer_index: HashMap<AddrStr, LayerId>,
    pub(crate) resolving: HashSet<AddrStr>,

    pub(crate) known_replacements: HashMap<Ref, PendingReplacement>,
    pub(crate) instantiating: Vec<AddrStr>,
}

impl<'a> FrontEnd<'a> {
    /// Creates a pipeline reading files through `provider` and resolving
    /// imports against `search_paths` after the importing file's directory.
    pub fn new(
        interner: &'a Interner,
        provider: &'a dyn AstProvider,
        search_paths: Vec<PathBuf>,
    ) -> Self {
        let mut front = Self {
            interner,
            provider,
            search_paths,
            source_db: SourceDb::new(),
            defs: Arena::new(),
            def_index: HashMap::new(),
            scooped: HashSet::new(),
            layers: Arena::new(),
            layer_index: HashMap::new(),
            resolving: HashSet::new(),
            known_replacements: HashMap::new(),
            instantiating: Vec::new(),
        };
        front.register_builtins();
        front
    }

    fn register_builtins(&mut self) {
        for builtin in Builtin::ALL {
            let name = self.interner.get_or_intern(builtin.name());
            let address = Self::builtin_address_of(name);
            let def = self.defs.alloc(ClassDef {
                kind: DefKind::Builtin(builtin),
                super_ref: None,
                imports: IndexMap::new(),
                local_defs: IndexMap::new(),
                replacements: IndexMap::new(),
                address: address.clone(),
                closure: Vec::new(),
                body: Rc::from(Vec::new()),
                span: Span::DUMMY,
            });
            self.def_index.insert(address.clone(), def);
            let id = self.layers.next_id();
            self.layers.alloc(ClassLayer {
                id,
                def,
                address: address.clone(),
                super_layer: None,
            });
            self.layer_index.insert(address, id);
        }
    }

    fn builtin_address_of(name: Ident) -> AddrStr {
        AddrStr::new(FileId::DUMMY, Ref::from_one(name))
    }

    /// Address of a builtin class.
    pub fn builtin_address(&self, builtin: Builtin) -> AddrStr {
        Self::builtin_address_of(self.interner.get_or_intern(builtin.name()))
    }

    /// The interner names are resolved with.
    pub fn interner(&self) -> &'a Interner {
        self.interner
    }

    /// Registered source files.
    pub fn source_db(&self) -> &SourceDb {
        &self.source_db
    }

    /// Mutable access to the source database, for attaching file text
    /// before rendering diagnostics.
    pub fn source_db_mut(&mut self) -> &mut SourceDb {
        &mut self.source_db
    }

    /// The address of a block inside a file, registering the file.
    pub fn address(&mut self, file: &Path, path: &[impl AsRef<str>]) -> AddrStr {
        let file = self.source_db.intern_path(file);
        AddrStr::new(file, Ref::intern(self.interner, path))
    }

    /// The skeleton of the class at `addr`, scooping its file if needed.
    pub fn get_class_def(&mut self, addr: &AddrStr) -> FrontEndResult<&ClassDef> {
        let id = self.class_def_id(addr, Span::DUMMY)?;
        Ok(&self.defs[id])
    }

    /// The layer of the class at `addr`, resolving its super chain if needed.
    pub fn get_layer(&mut self, addr: &AddrStr) -> FrontEndResult<&ClassLayer> {
        let id = self.layer_id(addr, Span::DUMMY)?;
        Ok(&self.layers[id])
    }

    /// A registered class definition.
    pub fn class_def(&self, id: ClassDefId) -> &ClassDef {
        &self.defs[id]
    }

    /// A built layer.
    pub fn layer(&self, id: LayerId) -> &ClassLayer {
        &self.layers[id]
    }

    /// The layer registered for an address, if already built.
    pub fn cached_layer(&self, addr: &AddrStr) -> Option<&ClassLayer> {
        self.layer_index.get(addr).map(|&id| &self.layers[id])
    }

    /// The layers named by an instance's super chain, most-derived first.
    pub fn supers<'s>(&'s self, instance: &'s Instance) -> impl Iterator<Item = &'s ClassLayer> + 's {
        instance
            .supers
            .iter()
            .filter_map(move |addr| self.cached_layer(addr))
    }

    /// Resolves the class at `entry` and instantiates it at its own path.
    #[instrument(skip_all, fields(file = entry.file.as_raw()))]
    pub fn build(&mut self, entry: &AddrStr) -> FrontEndResult<Instance> {
        let layer = self.layer_id(entry, Span::DUMMY)?;
        let instance = self.instantiate(entry.file, entry.path.clone(), layer, Span::DUMMY)?;
        tracing::debug!(
            entry = %self.render_addr(entry),
            instances = instance.subtree_len(),
            "build materialized"
        );
        Ok(instance)
    }

    /// Renders a reference with its names.
    pub fn render_ref(&self, r: &Ref) -> String {
        r.display(self.interner).to_string()
    }

    /// Renders an address as `path/to/file.ato:Block.Inner`.
    ///
    /// Builtins render as their bare name and file roots as their path.
    pub fn render_addr(&self, addr: &AddrStr) -> String {
        let path = self.render_ref(&addr.path);
        match self.source_db.path(addr.file) {
            None => path,
            Some(file) if addr.path.is_empty() => file.display().to_string(),
            Some(file) => format!("{}:{path}", file.display()),
        }
    }

    pub(crate) fn locate(&self, file: FileId, span: Span) -> Span {
        if span == Span::DUMMY {
            span
        } else {
            span.in_file(file)
        }
    }
}
