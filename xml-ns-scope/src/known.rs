// Copyright (C) 2021 Scott Lamb <slamb@slamb.org>
// SPDX-License-Identifier: MIT OR Apache-2.0

/// Namespaces the serializer knows about ahead of time, and where each is
/// currently bound.
///
/// Serializers typically number every namespace used by their schema so
/// that precomputed [`crate::Name`]s can find their prefix with one array
/// lookup instead of a search. The context keeps `prefix_index(slot)`
/// pointing at a live binding as default-namespace reassignments move
/// bindings around, and restores it when the moving scope closes.
#[derive(Clone, Debug, Default)]
pub struct KnownUris {
    uris: Vec<String>,

    /// Parallel to `uris`: the binding index representing each URI, if it has
    /// been declared.
    prefix_indexes: Vec<Option<usize>>,
}

impl KnownUris {
    pub fn new<I, S>(uris: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let uris: Vec<String> = uris.into_iter().map(Into::into).collect();
        let prefix_indexes = vec![None; uris.len()];
        Self {
            uris,
            prefix_indexes,
        }
    }

    #[inline]
    pub fn uris(&self) -> &[String] {
        &self.uris
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.uris.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.uris.is_empty()
    }

    /// Returns the binding index currently representing slot `slot`.
    #[inline]
    pub fn prefix_index(&self, slot: usize) -> Option<usize> {
        self.prefix_indexes[slot]
    }

    /// Returns the slot of `uri`, if it's well-known.
    pub fn slot_of(&self, uri: &str) -> Option<usize> {
        self.uris.iter().rposition(|u| u == uri)
    }

    /// Points `slot` at `index`, returning the old value.
    pub(crate) fn set(&mut self, slot: usize, index: Option<usize>) -> Option<usize> {
        std::mem::replace(&mut self.prefix_indexes[slot], index)
    }

    pub(crate) fn clear(&mut self) {
        self.prefix_indexes.iter_mut().for_each(|i| *i = None);
    }
}
