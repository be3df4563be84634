//! Qualified names: [`Ref`] for dotted paths and [`AddrStr`] for global
//! class and instance addresses.

use ato_common::{Ident, Interner};
use ato_source::FileId;
use std::fmt;

/// A dotted path of interned name segments, such as `power.vcc`.
///
/// Used both for references written in source and as the key of imports,
/// local definitions, replacements and instance children. The empty ref
/// denotes a file root.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Default)]
pub struct Ref(Vec<Ident>);

impl Ref {
    /// The empty reference.
    pub fn empty() -> Self {
        Self(Vec::new())
    }

    /// A single-segment reference.
    pub fn from_one(ident: Ident) -> Self {
        Self(vec![ident])
    }

    /// Interns each segment of a written reference.
    pub fn intern<S: AsRef<str>>(interner: &Interner, segments: &[S]) -> Self {
        Self(
            segments
                .iter()
                .map(|s| interner.get_or_intern(s.as_ref()))
                .collect(),
        )
    }

    /// Interns a dotted string such as `"a.b"`.
    pub fn parse(interner: &Interner, dotted: &str) -> Self {
        if dotted.is_empty() {
            return Self::empty();
        }
        Self(dotted.split('.').map(|s| interner.get_or_intern(s)).collect())
    }

    /// The segments, outermost first.
    pub fn segments(&self) -> &[Ident] {
        &self.0
    }

    /// Number of segments.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` for the empty reference.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The first segment.
    pub fn first(&self) -> Option<Ident> {
        self.0.first().copied()
    }

    /// The last segment.
    pub fn last(&self) -> Option<Ident> {
        self.0.last().copied()
    }

    /// `self` followed by `other`.
    pub fn join(&self, other: &Ref) -> Ref {
        let mut segments = Vec::with_capacity(self.len() + other.len());
        segments.extend_from_slice(&self.0);
        segments.extend_from_slice(&other.0);
        Ref(segments)
    }

    /// `self` followed by one more segment.
    pub fn child(&self, ident: Ident) -> Ref {
        let mut segments = self.0.clone();
        segments.push(ident);
        Ref(segments)
    }

    /// The first `n` segments (all of them if `n` exceeds the length).
    pub fn prefix(&self, n: usize) -> Ref {
        Ref(self.0[..n.min(self.len())].to_vec())
    }

    /// Everything after the first `n` segments.
    pub fn suffix(&self, n: usize) -> Ref {
        Ref(self.0[n.min(self.len())..].to_vec())
    }

    /// Splits into the first segment and the rest.
    pub fn split_first(&self) -> Option<(Ident, Ref)> {
        let (first, rest) = self.0.split_first()?;
        Some((*first, Ref(rest.to_vec())))
    }

    /// Splits into everything but the last segment, and the last segment.
    pub fn split_last(&self) -> Option<(Ref, Ident)> {
        let (last, init) = self.0.split_last()?;
        Some((Ref(init.to_vec()), *last))
    }

    /// Renders the reference with its names, e.g. `power.vcc`.
    pub fn display<'r>(&'r self, interner: &'r Interner) -> RefDisplay<'r> {
        RefDisplay {
            segments: &self.0,
            interner,
        }
    }
}

impl FromIterator<Ident> for Ref {
    fn from_iter<T: IntoIterator<Item = Ident>>(iter: T) -> Self {
        Ref(iter.into_iter().collect())
    }
}

/// Dotted rendering of a [`Ref`], see [`Ref::display`].
pub struct RefDisplay<'r> {
    segments: &'r [Ident],
    interner: &'r Interner,
}

impl fmt::Display for RefDisplay<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, seg) in self.segments.iter().enumerate() {
            if i > 0 {
                f.write_str(".")?;
            }
            f.write_str(self.interner.resolve(*seg))?;
        }
        Ok(())
    }
}

/// A global address: a source file plus a path inside it.
///
/// The only identity used for caching class definitions and layers. Builtin
/// classes live at [`FileId::DUMMY`]. Instances are addressed by the file of
/// the build root and their absolute path from it.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct AddrStr {
    /// Source file identity.
    pub file: FileId,
    /// Path inside the file.
    pub path: Ref,
}

impl AddrStr {
    /// Creates an address.
    pub fn new(file: FileId, path: Ref) -> Self {
        Self { file, path }
    }

    /// The root of a file.
    pub fn file_root(file: FileId) -> Self {
        Self::new(file, Ref::empty())
    }

    /// The address of a nested name.
    pub fn add_node(&self, ident: Ident) -> AddrStr {
        AddrStr::new(self.file, self.path.child(ident))
    }

    /// This address extended by a relative path.
    pub fn join(&self, rest: &Ref) -> AddrStr {
        AddrStr::new(self.file, self.path.join(rest))
    }

    /// Returns `true` for builtin class addresses.
    pub fn is_builtin(&self) -> bool {
        self.file.is_dummy()
    }
}
