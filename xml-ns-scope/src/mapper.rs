// Copyright (C) 2021 Scott Lamb <slamb@slamb.org>
// SPDX-License-Identifier: MIT OR Apache-2.0

use crate::{XML_MIME_NS, XML_SCHEMA_INSTANCE_NS, XML_SCHEMA_NS};

/// Chooses the prefix to ask for when a namespace is declared.
///
/// The returned prefix is only a preference: if it's already bound to some
/// other URI in scope, [`crate::NamespaceContext`] ignores it and makes one
/// up.
pub trait PrefixMapper {
    /// Returns the preferred prefix for `uri`.
    ///
    /// `suggestion` is what the serializer asked for, if anything. `None`
    /// lets the context pick. When `require_prefix` is true the binding will
    /// be used by an attribute, so an empty prefix won't be honored.
    fn preferred_prefix<'a>(
        &'a self,
        uri: &str,
        suggestion: Option<&'a str>,
        require_prefix: bool,
    ) -> Option<&'a str>;
}

/// Uses the conventional prefixes for XML Schema infrastructure namespaces
/// and passes the suggestion through otherwise.
#[derive(Copy, Clone, Debug, Default)]
pub struct DefaultPrefixMapper;

impl PrefixMapper for DefaultPrefixMapper {
    fn preferred_prefix<'a>(
        &'a self,
        uri: &str,
        suggestion: Option<&'a str>,
        _require_prefix: bool,
    ) -> Option<&'a str> {
        match uri {
            XML_SCHEMA_INSTANCE_NS => Some("xsi"),
            XML_SCHEMA_NS => Some("xs"),
            XML_MIME_NS => Some("xmime"),
            _ => suggestion,
        }
    }
}
