// Copyright (C) 2021 Scott Lamb <slamb@slamb.org>
// SPDX-License-Identifier: MIT OR Apache-2.0

use std::borrow::Cow;

/// A precomputed element name in one of the serializer's well-known
/// namespaces.
///
/// The namespace is identified by its slot in [`crate::KnownUris`], so the
/// prefix is found through the side table rather than by searching the
/// bindings.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct Name {
    pub known_slot: usize,
    pub local_name: Cow<'static, str>,
}

impl Name {
    pub fn new(known_slot: usize, local_name: impl Into<Cow<'static, str>>) -> Self {
        Self {
            known_slot,
            local_name: local_name.into(),
        }
    }
}

/// The name recorded for a not-yet-written element.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum TagName {
    /// A precomputed name.
    Known(Name),

    /// A local name under the binding at index `prefix`.
    Indexed { prefix: usize, local_name: String },
}

impl TagName {
    pub fn local_name(&self) -> &str {
        match self {
            TagName::Known(n) => &n.local_name,
            TagName::Indexed { local_name, .. } => local_name,
        }
    }
}

/// A tag name resolved against the bindings in scope.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct QName<'a> {
    pub prefix: &'a str,
    pub local_name: &'a str,
    pub namespace: &'a str,
}

impl<'a> std::fmt::Display for QName<'a> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.prefix.is_empty() {
            write!(f, "{}", self.local_name)
        } else {
            write!(f, "{}:{}", self.prefix, self.local_name)
        }
    }
}
