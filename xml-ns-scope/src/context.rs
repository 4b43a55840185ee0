// Copyright (C) 2021 Scott Lamb <slamb@slamb.org>
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Namespace bindings and tag names for the elements currently open.

use log::{debug, trace};

use crate::bindings::{Binding, BindingTable};
use crate::known::KnownUris;
use crate::mapper::{DefaultPrefixMapper, PrefixMapper};
use crate::name::{Name, QName, TagName};
use crate::output::XmlOutput;
use crate::Error;

/// The namespace context of one open element.
///
/// Scopes are pooled: once a scope is exited, the next sibling opened at the
/// same depth reuses it, clearing everything on entry.
#[derive(Debug)]
pub struct Scope<H> {
    /// The number of bindings declared by ancestors.
    base: usize,

    /// Side-table slots this scope redirected, each with the value it held
    /// before. Replayed in reverse on exit.
    known_restore: Vec<(usize, Option<usize>)>,

    tag: Option<TagName>,

    /// Caller's handles for the object this element represents.
    outer_peer: Option<H>,
    inner_peer: Option<H>,
}

impl<H> Scope<H> {
    fn new(base: usize) -> Self {
        Self {
            base,
            known_restore: Vec::new(),
            tag: None,
            outer_peer: None,
            inner_peer: None,
        }
    }

    fn reenter(&mut self, base: usize) {
        self.base = base;
        self.known_restore.clear();
        self.tag = None;
        self.outer_peer = None;
        self.inner_peer = None;
    }

    /// Returns the index of the first binding declared by this scope.
    #[inline]
    pub fn base(&self) -> usize {
        self.base
    }

    #[inline]
    pub fn tag_name(&self) -> Option<&TagName> {
        self.tag.as_ref()
    }

    #[inline]
    pub fn outer_peer(&self) -> Option<&H> {
        self.outer_peer.as_ref()
    }

    #[inline]
    pub fn inner_peer(&self) -> Option<&H> {
        self.inner_peer.as_ref()
    }
}

/// Keeps track of in-scope namespace bindings and element tag names for a
/// serializer.
///
/// Maintains these invariants:
///
/// *   once a non-empty prefix is bound, it's never rebound to a different
///     URI while that binding is in scope.
/// *   the default (empty) prefix may be rebound by a nested scope, but the
///     outer binding is restored when that scope exits.
/// *   binding 0 is always `xml` -> [`crate::XML_NS`].
///
/// `H` is an opaque handle the serializer may attach to each element; the
/// context stores it and hands it back but never looks inside.
///
/// A context is reusable across documents via [`NamespaceContext::reset`],
/// which keeps its allocations.
pub struct NamespaceContext<H = ()> {
    bindings: BindingTable,

    /// `scopes[0]` is the root, which holds the implicit bindings and never
    /// exits. `scopes[depth]` is current; anything after it is pooled.
    scopes: Vec<Scope<H>>,
    depth: usize,

    known: KnownUris,
    mapper: Box<dyn PrefixMapper>,
    collection_mode: bool,
}

impl<H> NamespaceContext<H> {
    /// Creates a context using [`DefaultPrefixMapper`].
    pub fn new(known: KnownUris) -> Self {
        Self::with_mapper(known, Box::new(DefaultPrefixMapper))
    }

    pub fn with_mapper(known: KnownUris, mapper: Box<dyn PrefixMapper>) -> Self {
        Self {
            bindings: BindingTable::new(),
            scopes: vec![Scope::new(0)],
            depth: 0,
            known,
            mapper,
            collection_mode: false,
        }
    }

    pub fn set_prefix_mapper(&mut self, mapper: Box<dyn PrefixMapper>) {
        self.mapper = mapper;
    }

    pub fn prefix_mapper(&self) -> &dyn PrefixMapper {
        &*self.mapper
    }

    /// Returns to the just-constructed state for a new document.
    ///
    /// The binding table's capacity and the pooled scopes are kept. The side
    /// table forgets every recorded binding index.
    pub fn reset(&mut self) {
        self.bindings.truncate(1);
        self.depth = 0;
        self.scopes[0].reenter(0);
        self.known.clear();
        self.collection_mode = false;
    }

    #[inline]
    pub fn known(&self) -> &KnownUris {
        &self.known
    }

    /// True while a serializer is gathering declarations ahead of output.
    ///
    /// In this mode [`NamespaceContext::prefix_of`] declares namespaces it
    /// doesn't find instead of returning `None`.
    #[inline]
    pub fn collection_mode(&self) -> bool {
        self.collection_mode
    }

    pub fn set_collection_mode(&mut self, collection_mode: bool) {
        self.collection_mode = collection_mode;
    }

    /// Returns the index of a binding for `uri`, declaring one if necessary.
    ///
    /// `preferred_prefix` is passed through the [`PrefixMapper`] and used
    /// if it isn't already bound to something else. If `require_prefix`, the
    /// returned binding's prefix is non-empty, as needed by attributes.
    ///
    /// An empty `uri` asks for the default namespace to be "no namespace". If
    /// the default prefix is bound to some other URI, that URI is moved to a
    /// fresh prefix first.
    pub fn declare_ns_uri(
        &mut self,
        uri: &str,
        preferred_prefix: Option<&str>,
        require_prefix: bool,
    ) -> usize {
        if uri.is_empty() {
            return self.declare_no_namespace();
        }

        let mut preferred = self
            .mapper
            .preferred_prefix(uri, preferred_prefix, require_prefix);
        if require_prefix && preferred == Some("") {
            preferred = None;
        }

        for i in (0..self.bindings.len()).rev() {
            let b = self.bindings.get(i);
            if b.uri == uri {
                if !require_prefix || !b.prefix.is_empty() {
                    trace!("{:?} already bound to {:?} at #{}", uri, &b.prefix, i);
                    return i;
                }
                // bound to the default prefix; an outer binding might have one.
            }
            if preferred == Some(b.prefix.as_str()) {
                trace!(
                    "preferred prefix {:?} is taken by {:?}",
                    &b.prefix,
                    &b.uri
                );
                preferred = None;
            }
        }

        if require_prefix && preferred.is_none() {
            self.bindings.append_prefixed(uri)
        } else {
            self.bindings.append(uri, preferred)
        }
    }

    fn declare_no_namespace(&mut self) -> usize {
        for i in (0..self.bindings.len()).rev() {
            let b = self.bindings.get(i);
            if b.uri.is_empty() {
                return i;
            }
            if !b.prefix.is_empty() {
                continue;
            }

            // The default prefix is taken by another URI. Move that URI to
            // another prefix, then give "" to no namespace.
            let scope = &mut self.scopes[self.depth];
            if scope.base <= i {
                // Declared by this scope, so just reassign it.
                let old_uri = self.bindings.set_uri(i, String::new());
                let moved = self.bindings.append_prefixed(&old_uri);
                debug!(
                    "default namespace {:?} moved from #{} to #{} in place",
                    &old_uri, i, moved
                );
                if let Some(slot) = self.known.slot_of(&old_uri) {
                    let prev = self.known.set(slot, Some(moved));
                    scope.known_restore.push((slot, prev));
                }
                return i;
            }

            // Declared by an ancestor, which will expect it back.
            let old_uri = b.uri.clone();
            let moved = self.bindings.append_prefixed(&old_uri);
            if let Some(slot) = self.known.slot_of(&old_uri) {
                let prev = self.known.set(slot, Some(moved));
                debug!(
                    "known namespace #{} {:?} redirected from {:?} to #{}",
                    slot, &old_uri, prev, moved
                );
                scope.known_restore.push((slot, prev));
            }
            let i = self.bindings.append("", Some(""));
            debug!(
                "default namespace {:?} overridden at #{}; re-bound at #{}",
                &old_uri, i, moved
            );
            return i;
        }

        // "" isn't in use.
        self.bindings.append("", Some(""))
    }

    /// Like [`NamespaceContext::declare_ns_uri`] but returns the prefix.
    pub fn declare_namespace(
        &mut self,
        uri: &str,
        preferred_prefix: Option<&str>,
        require_prefix: bool,
    ) -> &str {
        let i = self.declare_ns_uri(uri, preferred_prefix, require_prefix);
        self.prefix_at(i)
    }

    /// Declares the well-known namespace in `slot` and points the side table
    /// at the result until the current scope exits.
    pub fn declare_known(
        &mut self,
        slot: usize,
        preferred_prefix: Option<&str>,
        require_prefix: bool,
    ) -> usize {
        let uri = self.known.uris()[slot].clone();
        let i = self.declare_ns_uri(&uri, preferred_prefix, require_prefix);
        let prev = self.known.set(slot, Some(i));
        if prev != Some(i) {
            self.scopes[self.depth].known_restore.push((slot, prev));
        }
        i
    }

    /// Opens a scope for a new element.
    pub fn enter(&mut self) {
        self.depth += 1;
        let base = self.bindings.len();
        if self.depth == self.scopes.len() {
            self.scopes.push(Scope::new(base));
        } else {
            self.scopes[self.depth].reenter(base);
        }
        trace!("enter scope {} at #{}", self.depth, base);
    }

    /// Closes the current scope, dropping its bindings and undoing its
    /// side-table redirects.
    ///
    /// Panics if called on the root scope.
    pub fn exit(&mut self) {
        assert!(self.depth > 0, "exit called on the root scope");
        let scope = &mut self.scopes[self.depth];
        for (slot, prev) in scope.known_restore.drain(..).rev() {
            self.known.set(slot, prev);
        }
        trace!(
            "exit scope {}, dropping {} bindings",
            self.depth,
            self.bindings.len() - scope.base
        );
        self.bindings.truncate(scope.base);
        self.depth -= 1;
    }

    /// Returns the nesting depth; 0 is the root scope.
    #[inline]
    pub fn depth(&self) -> usize {
        self.depth
    }

    #[inline]
    pub fn is_root(&self) -> bool {
        self.depth == 0
    }

    #[inline]
    pub fn current(&self) -> &Scope<H> {
        &self.scopes[self.depth]
    }

    /// The bindings declared by the current scope.
    pub fn declarations(&self) -> &[Binding] {
        self.bindings.slice(self.current().base..)
    }

    /// The bindings declared on the root scope, outside any element.
    ///
    /// Nothing closes the root scope, so a sink writes these on the
    /// outermost element.
    pub fn root_declarations(&self) -> &[Binding] {
        let end = match self.depth {
            0 => self.bindings.len(),
            _ => self.scopes[1].base,
        };
        self.bindings.slice(1..end)
    }

    /// Number of bindings in scope, including the implicit `xml` one.
    #[inline]
    pub fn count(&self) -> usize {
        self.bindings.len()
    }

    /// Returns the URI `prefix` had before the current scope declared
    /// anything.
    pub fn inherited_uri(&self, prefix: &str) -> Option<&str> {
        let base = self.current().base;
        (0..base)
            .rev()
            .map(|i| self.bindings.get(i))
            .find(|b| b.prefix == prefix)
            .map(|b| b.uri.as_str())
    }

    /// Records the name of the current element as a local name under the
    /// binding at index `prefix`.
    pub fn set_tag_name(&mut self, prefix: usize, local_name: impl Into<String>, outer_peer: H) {
        let scope = &mut self.scopes[self.depth];
        scope.tag = Some(TagName::Indexed {
            prefix,
            local_name: local_name.into(),
        });
        scope.outer_peer = Some(outer_peer);
    }

    /// Records the name of the current element as a precomputed name.
    pub fn set_known_tag_name(&mut self, name: Name, outer_peer: H) {
        let scope = &mut self.scopes[self.depth];
        scope.tag = Some(TagName::Known(name));
        scope.outer_peer = Some(outer_peer);
    }

    /// Writes the start of the current element's tag.
    pub fn start_element<O: XmlOutput>(&mut self, out: &mut O, inner_peer: H) -> Result<(), O::Error> {
        let depth = self.depth;
        self.scopes[depth].inner_peer = Some(inner_peer);
        let tag = self.scopes[depth]
            .tag
            .as_ref()
            .ok_or_else(|| Error::missing_tag_name(depth))?;
        out.begin_start_tag(self, tag)
    }

    /// Writes the end of the current element's tag.
    pub fn end_element<O: XmlOutput>(&mut self, out: &mut O) -> Result<(), O::Error> {
        let depth = self.depth;
        let tag = self.scopes[depth]
            .tag
            .as_ref()
            .ok_or_else(|| Error::missing_tag_name(depth))?;
        out.end_tag(self, tag)?;
        let scope = &mut self.scopes[depth];
        if let Some(TagName::Known(_)) = scope.tag {
            scope.tag = None;
        }
        Ok(())
    }

    #[inline]
    pub fn outer_peer(&self) -> Option<&H> {
        self.current().outer_peer()
    }

    #[inline]
    pub fn inner_peer(&self) -> Option<&H> {
        self.current().inner_peer()
    }

    /// Resolves `tag` against the bindings in scope.
    pub fn qualified_name<'a>(&'a self, tag: &'a TagName) -> Result<QName<'a>, Error> {
        let (index, local_name) = match tag {
            TagName::Known(n) => {
                let index = self.known.prefix_index(n.known_slot).ok_or_else(|| {
                    Error::undeclared_known_namespace(
                        n.known_slot,
                        &self.known.uris()[n.known_slot],
                    )
                })?;
                (index, &*n.local_name)
            }
            TagName::Indexed { prefix, local_name } => (*prefix, local_name.as_str()),
        };
        let b = self.bindings.get(index);
        Ok(QName {
            prefix: &b.prefix,
            local_name,
            namespace: &b.uri,
        })
    }

    /// Returns the innermost binding index for `uri`.
    ///
    /// It's an error to ask about a URI that was never declared.
    pub fn index_of(&self, uri: &str) -> Result<usize, Error> {
        self.bindings
            .rposition_uri(uri)
            .ok_or_else(|| Error::undeclared_namespace(uri))
    }

    /// Gets the prefix of binding `index`.
    ///
    /// Panics if the index isn't in scope.
    #[inline]
    pub fn prefix_at(&self, index: usize) -> &str {
        &self.bindings.get(index).prefix
    }

    /// Gets the URI of binding `index`.
    ///
    /// Panics if the index isn't in scope.
    #[inline]
    pub fn uri_at(&self, index: usize) -> &str {
        &self.bindings.get(index).uri
    }

    /// Returns the URI bound to `prefix`, if any.
    pub fn uri_of(&self, prefix: &str) -> Option<&str> {
        self.bindings
            .rposition_prefix(prefix)
            .map(|i| self.uri_at(i))
    }

    /// Returns the prefix bound to `uri`, if any, without declaring anything.
    pub fn lookup_prefix(&self, uri: &str) -> Option<&str> {
        self.bindings
            .rposition_uri(uri)
            .map(|i| self.prefix_at(i))
    }

    /// Returns the prefix bound to `uri`.
    ///
    /// In collection mode this declares `uri` if necessary and so always
    /// returns `Some`; otherwise it's [`NamespaceContext::lookup_prefix`].
    pub fn prefix_of(&mut self, uri: &str) -> Option<&str> {
        if self.collection_mode {
            Some(self.declare_namespace(uri, None, false))
        } else {
            self.lookup_prefix(uri)
        }
    }

    /// Returns every prefix bound to `uri`, which is at most one.
    pub fn prefixes(&mut self, uri: &str) -> std::option::IntoIter<&str> {
        self.prefix_of(uri).into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{XML_NS, XML_SCHEMA_INSTANCE_NS};
    use assert_matches::assert_matches;

    const A: &str = "http://example.com/a";
    const B: &str = "http://example.com/b";
    const C: &str = "http://example.com/c";

    fn init() {
        let _ = env_logger::Builder::new().is_test(true).try_init();
    }

    fn ctx() -> NamespaceContext<u32> {
        NamespaceContext::new(KnownUris::new([A, B]))
    }

    /// Records tags as text; optionally fails.
    #[derive(Default)]
    struct Recorder {
        events: Vec<String>,
        fail: bool,
    }

    impl XmlOutput for Recorder {
        type Error = Error;

        fn begin_start_tag<H>(
            &mut self,
            ctx: &NamespaceContext<H>,
            name: &TagName,
        ) -> Result<(), Error> {
            if self.fail {
                return Err(Error("sink failed".to_owned()));
            }
            let q = ctx.qualified_name(name)?;
            self.events.push(format!("<{} {{{}}}", q, q.namespace));
            Ok(())
        }

        fn end_tag<H>(&mut self, ctx: &NamespaceContext<H>, name: &TagName) -> Result<(), Error> {
            if self.fail {
                return Err(Error("sink failed".to_owned()));
            }
            let q = ctx.qualified_name(name)?;
            self.events.push(format!("</{}>", q));
            Ok(())
        }
    }

    #[test]
    fn fresh() {
        init();
        let c = ctx();
        assert_eq!(c.count(), 1);
        assert_eq!(c.prefix_at(0), "xml");
        assert_eq!(c.uri_at(0), XML_NS);
        assert!(c.is_root());
        assert_eq!(c.uri_of("xml"), Some(XML_NS));
    }

    #[test]
    fn same_uri_same_index() {
        init();
        let mut c = ctx();
        c.enter();
        let a = c.declare_ns_uri(A, None, false);
        assert_eq!(a, 1);
        assert_eq!(c.prefix_at(a), "");
        assert_eq!(c.declare_ns_uri(A, Some("a"), false), a);
        let b = c.declare_ns_uri(B, None, false);
        assert_eq!(b, 2);
        assert_eq!(c.prefix_at(b), "ns2");
        assert_eq!(c.declare_ns_uri(B, None, false), b);
        assert_eq!(c.count(), 3);
    }

    #[test]
    fn require_prefix_skips_default() {
        init();
        let mut c = ctx();
        c.enter();
        let a = c.declare_ns_uri(A, None, false);
        assert_eq!(c.prefix_at(a), "");
        let a2 = c.declare_ns_uri(A, None, true);
        assert_eq!(a2, 2);
        assert_eq!(c.prefix_at(a2), "ns2");
        assert_eq!(c.declare_ns_uri(A, None, true), a2);
        assert_eq!(c.declare_ns_uri(A, None, false), a2);
    }

    #[test]
    fn require_prefix_first_binding() {
        init();
        let mut c = ctx();
        c.enter();
        let a = c.declare_ns_uri(A, None, true);
        assert_eq!(c.prefix_at(a), "ns1");
        let b = c.declare_ns_uri(B, Some(""), true);
        assert_eq!(c.prefix_at(b), "ns2");
    }

    #[test]
    fn preferred_prefix() {
        init();
        let mut c = ctx();
        c.enter();
        let a = c.declare_ns_uri(A, Some("p"), false);
        assert_eq!(c.prefix_at(a), "p");
        c.enter();
        let b = c.declare_ns_uri(B, Some("p"), false);
        assert_eq!(b, 2);
        assert_eq!(c.prefix_at(b), "ns2");
        assert_eq!(c.uri_of("p"), Some(A));
        let xsi = c.declare_ns_uri(XML_SCHEMA_INSTANCE_NS, None, true);
        assert_eq!(c.prefix_at(xsi), "xsi");
    }

    #[test]
    fn custom_mapper() {
        init();
        struct Fixed;
        impl PrefixMapper for Fixed {
            fn preferred_prefix<'a>(
                &'a self,
                uri: &str,
                suggestion: Option<&'a str>,
                _require_prefix: bool,
            ) -> Option<&'a str> {
                if uri == C {
                    Some("c")
                } else {
                    suggestion
                }
            }
        }
        let mut c = ctx();
        c.set_prefix_mapper(Box::new(Fixed));
        c.enter();
        assert_eq!(c.declare_namespace(C, Some("other"), false), "c");
        assert_eq!(c.declare_namespace(XML_SCHEMA_INSTANCE_NS, None, true), "ns2");
        assert_eq!(c.prefix_mapper().preferred_prefix(C, None, false), Some("c"));
    }

    #[test]
    fn exit_truncates() {
        init();
        let mut c = ctx();
        c.enter();
        c.declare_ns_uri(A, None, false);
        let before = c.count();
        c.enter();
        c.declare_ns_uri(B, None, false);
        c.declare_ns_uri(C, Some("c"), true);
        c.enter();
        c.declare_ns_uri("http://example.com/d", None, false);
        c.exit();
        assert_eq!(c.count(), 4);
        assert_eq!(c.declarations().len(), 2);
        c.exit();
        assert_eq!(c.count(), before);
        assert_eq!(c.lookup_prefix(B), None);
        assert_eq!(c.uri_of("c"), None);
        assert_eq!(c.lookup_prefix(A), Some(""));
        c.exit();
        assert_eq!(c.count(), 1);
        assert!(c.is_root());
    }

    #[test]
    fn root_declarations() {
        init();
        let mut c = ctx();
        assert!(c.root_declarations().is_empty());
        c.declare_ns_uri(A, Some("a"), false);
        assert_eq!(c.root_declarations().len(), 1);
        c.enter();
        c.declare_ns_uri(B, None, false);
        c.enter();
        let roots: Vec<(&str, &str)> = c
            .root_declarations()
            .iter()
            .map(|b| (b.prefix.as_str(), b.uri.as_str()))
            .collect();
        assert_eq!(roots, [("a", A)]);
        c.exit();
        c.exit();
        assert_eq!(c.root_declarations().len(), 1);
    }

    /// Overriding a default namespace declared by an ancestor.
    #[test]
    fn no_namespace_under_ancestor_default() {
        init();
        let mut c = ctx();
        let a = c.declare_known(0, None, false);
        assert_eq!((a, c.prefix_at(a)), (1, ""));
        let b = c.declare_ns_uri(B, None, false);
        assert_eq!((b, c.prefix_at(b)), (2, "ns2"));
        assert_eq!(c.known().prefix_index(0), Some(1));

        c.enter();
        let none = c.declare_ns_uri("", None, false);
        assert_eq!(none, 4);
        assert_eq!(c.prefix_at(none), "");
        assert_eq!(c.uri_at(none), "");
        assert_eq!(c.uri_of(""), Some(""));
        assert_eq!(c.prefix_at(3), "ns3");
        assert_eq!(c.uri_at(3), A);
        assert_eq!(c.known().prefix_index(0), Some(3));
        assert_eq!(c.lookup_prefix(A), Some("ns3"));
        assert_eq!(c.inherited_uri(""), Some(A));

        // Asking again reuses the binding.
        assert_eq!(c.declare_ns_uri("", None, false), none);

        c.exit();
        assert_eq!(c.count(), 3);
        assert_eq!(c.uri_of(""), Some(A));
        assert_eq!(c.prefix_at(1), "");
        assert_eq!(c.known().prefix_index(0), Some(1));
    }

    /// Overriding a default namespace declared by the same scope.
    #[test]
    fn no_namespace_reassigns_own_default() {
        init();
        let mut c = ctx();
        c.enter();
        c.enter();
        let b = c.declare_known(1, None, false);
        assert_eq!((b, c.prefix_at(b)), (1, ""));
        let none = c.declare_ns_uri("", None, false);
        assert_eq!(none, b);
        assert_eq!(c.uri_at(none), "");
        assert_eq!(c.index_of(B).unwrap(), 2);
        assert_eq!(c.prefix_at(2), "ns2");
        assert_eq!(c.known().prefix_index(1), Some(2));
        c.exit();
        assert_eq!(c.count(), 1);
        assert_eq!(c.known().prefix_index(1), None);
    }

    #[test]
    fn no_namespace_unused_default() {
        init();
        let mut c = ctx();
        c.enter();
        c.declare_ns_uri(A, Some("a"), false);
        let none = c.declare_ns_uri("", None, false);
        assert_eq!(none, 2);
        assert_eq!(c.prefix_at(none), "");
        assert_eq!(c.inherited_uri(""), None);
    }

    #[test]
    fn declare_known_restored() {
        init();
        let mut c = ctx();
        c.enter();
        let a = c.declare_known(0, Some("a"), false);
        assert_eq!(c.known().prefix_index(0), Some(a));
        c.enter();
        let a2 = c.declare_known(0, None, true);
        assert_eq!(a2, a);
        let b = c.declare_known(1, None, true);
        assert_eq!(c.known().prefix_index(1), Some(b));
        c.exit();
        assert_eq!(c.known().prefix_index(0), Some(a));
        assert_eq!(c.known().prefix_index(1), None);
        c.exit();
        assert_eq!(c.known().prefix_index(0), None);
    }

    #[test]
    fn many_bindings() {
        init();
        let mut c = ctx();
        c.enter();
        let uris: Vec<String> = (0..20).map(|i| format!("http://example.com/{}", i)).collect();
        let mut seen: Vec<(usize, String, String)> = Vec::new();
        for u in &uris {
            let i = c.declare_ns_uri(u, None, false);
            seen.push((i, c.prefix_at(i).to_owned(), u.clone()));
        }
        for (i, p, u) in &seen {
            assert_eq!(c.prefix_at(*i), p);
            assert_eq!(c.uri_at(*i), u);
        }
        let mut prefixes: Vec<&str> = seen.iter().map(|(_, p, _)| p.as_str()).collect();
        assert_eq!(prefixes[0], "");
        prefixes.sort_unstable();
        prefixes.dedup();
        assert_eq!(prefixes.len(), uris.len());
    }

    #[test]
    fn index_of_undeclared() {
        init();
        let c = ctx();
        let e = c.index_of(A).unwrap_err();
        assert!(e.to_string().contains(A), "{}", e);
        assert_eq!(c.index_of(XML_NS).unwrap(), 0);
    }

    #[test]
    fn collection_mode() {
        init();
        let mut c = ctx();
        c.enter();
        assert_eq!(c.prefix_of(A), None);
        assert_eq!(c.count(), 1);
        c.set_collection_mode(true);
        assert_eq!(c.prefix_of(A), Some(""));
        assert_eq!(c.prefix_of(B), Some("ns2"));
        assert_eq!(c.prefix_of(A), Some(""));
        assert_eq!(c.count(), 3);
        c.set_collection_mode(false);
        assert_eq!(c.prefix_of(C), None);
        assert_eq!(c.count(), 3);

        let mut d = ctx();
        d.enter();
        assert_eq!(d.declare_namespace(A, None, false), "");
        assert_eq!(d.declare_namespace(B, None, false), "ns2");
    }

    #[test]
    fn prefixes_yields_prefix() {
        init();
        let mut c = ctx();
        c.enter();
        c.declare_ns_uri(A, Some("a"), false);
        assert_eq!(c.prefixes(A).collect::<Vec<_>>(), vec!["a"]);
        assert_eq!(c.prefixes(B).count(), 0);
    }

    #[test]
    fn pooled_scopes() {
        init();
        let mut c = ctx();
        c.enter();
        c.set_tag_name(0, "first", 1);
        c.exit();
        c.enter();
        assert_eq!(c.scopes.len(), 2);
        assert_eq!(c.current().tag_name(), None);
        assert_eq!(c.outer_peer(), None);
        assert_eq!(c.current().base(), 1);
        c.enter();
        c.exit();
        c.exit();
        c.enter();
        c.enter();
        assert_eq!(c.scopes.len(), 3);
        assert_eq!(c.depth(), 2);
    }

    #[test]
    #[should_panic(expected = "root scope")]
    fn exit_root() {
        let mut c = ctx();
        c.exit();
    }

    #[test]
    fn reset() {
        init();
        let mut c = ctx();
        c.declare_known(0, None, false);
        c.enter();
        c.declare_ns_uri(B, None, false);
        c.enter();
        c.set_collection_mode(true);
        c.reset();
        assert_eq!(c.count(), 1);
        assert!(c.is_root());
        assert!(!c.collection_mode());
        assert_eq!(c.known().prefix_index(0), None);
        assert_eq!(c.scopes.len(), 3);
        assert!(c.current().known_restore.is_empty());

        // Behaves like a fresh context.
        c.enter();
        assert_eq!(c.declare_namespace(B, None, false), "");
    }

    #[test]
    fn tags() {
        init();
        let mut c = ctx();
        let mut out = Recorder::default();
        c.enter();
        let a = c.declare_known(0, None, false);
        c.set_tag_name(a, "root", 10);
        c.start_element(&mut out, 11).unwrap();
        assert_eq!(c.outer_peer(), Some(&10));
        assert_eq!(c.inner_peer(), Some(&11));

        c.enter();
        c.declare_ns_uri(B, Some("b"), false);
        c.set_known_tag_name(Name::new(0, "child"), 20);
        c.start_element(&mut out, 21).unwrap();
        c.end_element(&mut out).unwrap();
        assert_eq!(c.current().tag_name(), None);
        c.exit();

        c.end_element(&mut out).unwrap();
        assert_matches!(c.current().tag_name(), Some(TagName::Indexed { prefix: 1, .. }));
        c.exit();

        assert_eq!(
            out.events,
            [
                format!("<root {{{}}}", A),
                format!("<child {{{}}}", A),
                "</child>".to_owned(),
                "</root>".to_owned(),
            ]
        );
    }

    #[test]
    fn known_tag_without_binding() {
        init();
        let mut c = ctx();
        let mut out = Recorder::default();
        c.enter();
        c.set_known_tag_name(Name::new(1, "b"), 0);
        let e = c.start_element(&mut out, 0).unwrap_err();
        assert!(e.to_string().contains(B), "{}", e);
    }

    #[test]
    fn missing_tag() {
        init();
        let mut c = ctx();
        let mut out = Recorder::default();
        c.enter();
        let e = c.start_element(&mut out, 0).unwrap_err();
        assert!(e.to_string().contains("no tag name"), "{}", e);
    }

    /// A failing sink leaves the context as it was.
    #[test]
    fn sink_failure() {
        init();
        let mut c = ctx();
        let mut out = Recorder {
            fail: true,
            ..Default::default()
        };
        c.enter();
        let a = c.declare_ns_uri(A, None, false);
        c.set_known_tag_name(Name::new(0, "x"), 1);
        c.start_element(&mut out, 2).unwrap_err();
        assert_eq!(c.count(), 2);
        assert_eq!(c.depth(), 1);
        c.set_tag_name(a, "x", 1);
        assert_eq!(c.end_element(&mut out).unwrap_err().0, "sink failed");
        assert_matches!(c.current().tag_name(), Some(TagName::Indexed { .. }));
        assert!(out.events.is_empty());
    }
}
