// Copyright (C) 2021 Scott Lamb <slamb@slamb.org>
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The table of every binding currently in scope.

use log::trace;

use crate::{XML_NS, XML_PREFIX};

/// A single `prefix -> uri` binding.
///
/// An empty `prefix` is the default namespace; an empty `uri` means "no
/// namespace".
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Binding {
    pub prefix: String,
    pub uri: String,
}

/// All bindings declared by the open scopes, outermost first.
///
/// Acts as a stack shared by every scope: each scope owns the suffix that
/// starts at the table length it saw on entry. Index 0 is always the
/// intrinsic `xml` binding.
#[derive(Debug)]
pub(crate) struct BindingTable {
    entries: Vec<Binding>,
}

impl BindingTable {
    pub(crate) fn new() -> Self {
        let mut entries = Vec::with_capacity(4);
        entries.push(Binding {
            prefix: XML_PREFIX.to_owned(),
            uri: XML_NS.to_owned(),
        });
        Self { entries }
    }

    #[inline]
    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub(crate) fn get(&self, i: usize) -> &Binding {
        &self.entries[i]
    }

    pub(crate) fn slice<R>(&self, range: R) -> &[Binding]
    where
        R: std::slice::SliceIndex<[Binding], Output = [Binding]>,
    {
        &self.entries[range]
    }

    /// Drops every binding at or after `len`, keeping the allocation.
    pub(crate) fn truncate(&mut self, len: usize) {
        debug_assert!(len >= 1, "the xml binding is permanent");
        self.entries.truncate(len);
    }

    /// Rebinds the entry at `i` to `uri`, returning the URI it had before.
    pub(crate) fn set_uri(&mut self, i: usize, uri: String) -> String {
        debug_assert!(i > 0, "the xml binding is permanent");
        std::mem::replace(&mut self.entries[i].uri, uri)
    }

    /// Returns the innermost index bound to `uri`.
    pub(crate) fn rposition_uri(&self, uri: &str) -> Option<usize> {
        self.entries.iter().rposition(|b| b.uri == uri)
    }

    /// Returns the innermost index bound to `prefix`.
    pub(crate) fn rposition_prefix(&self, prefix: &str) -> Option<usize> {
        self.entries.iter().rposition(|b| b.prefix == prefix)
    }

    /// Appends a binding for `uri`, returning its index.
    ///
    /// With no `prefix`, the very first user binding gets the default
    /// namespace; later ones get a synthesized prefix.
    pub(crate) fn append(&mut self, uri: &str, prefix: Option<&str>) -> usize {
        let prefix = match prefix {
            Some(p) => p.to_owned(),
            None if self.entries.len() == 1 => String::new(),
            None => self.synthesize_prefix(),
        };
        self.push(uri, prefix)
    }

    /// Appends a binding for `uri` under a synthesized, non-empty prefix.
    pub(crate) fn append_prefixed(&mut self, uri: &str) -> usize {
        let prefix = self.synthesize_prefix();
        self.push(uri, prefix)
    }

    fn push(&mut self, uri: &str, prefix: String) -> usize {
        let i = self.entries.len();
        trace!("binding #{}: {:?} -> {:?}", i, &prefix, uri);
        self.entries.push(Binding {
            prefix,
            uri: uri.to_owned(),
        });
        i
    }

    /// Returns `ns{N}` where `N` starts at the next index.
    ///
    /// Indexes are never reused while live, so the first candidate is free
    /// unless a caller explicitly asked for a prefix of the same shape.
    fn synthesize_prefix(&self) -> String {
        let mut n = self.entries.len();
        loop {
            let candidate = format!("ns{}", n);
            if self.rposition_prefix(&candidate).is_none() {
                return candidate;
            }
            n += 1;
        }
    }
}
