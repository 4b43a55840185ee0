// Copyright (C) 2021 Scott Lamb <slamb@slamb.org>
// SPDX-License-Identifier: MIT OR Apache-2.0

//! In-scope namespace bookkeeping for streaming XML serializers.
//!
//! A serializer walks its tree depth-first. For each element it calls
//! [`NamespaceContext::enter`], declares the namespaces the element and its
//! attributes need via [`NamespaceContext::declare_ns_uri`], records the tag
//! name, and asks the context to start the element on an [`XmlOutput`]. When
//! the element is done it ends the tag and calls [`NamespaceContext::exit`],
//! which drops every binding declared since the matching `enter`.
//!
//! ```
//! use xml_ns_scope::{KnownUris, NamespaceContext};
//!
//! let mut ctx = NamespaceContext::<()>::new(KnownUris::default());
//! ctx.enter();
//! let a = ctx.declare_ns_uri("http://example.com/a", None, false);
//! assert_eq!(ctx.prefix_at(a), "");
//! let b = ctx.declare_ns_uri("http://example.com/b", None, false);
//! assert_eq!(ctx.prefix_at(b), "ns2");
//! ctx.exit();
//! assert_eq!(ctx.count(), 1);
//! ```

mod bindings;
mod context;
mod error;
mod known;
mod mapper;
mod name;
pub mod output;

pub use bindings::Binding;
pub use context::{NamespaceContext, Scope};
pub use error::Error;
pub use known::KnownUris;
pub use mapper::{DefaultPrefixMapper, PrefixMapper};
pub use name::{Name, QName, TagName};
pub use output::{EventWriterOutput, XmlOutput};

/// The namespace implicitly bound to the `xml` prefix.
pub const XML_NS: &str = "http://www.w3.org/XML/1998/namespace";

/// The prefix implicitly bound to [`XML_NS`].
pub const XML_PREFIX: &str = "xml";

/// XML Schema.
pub const XML_SCHEMA_NS: &str = "http://www.w3.org/2001/XMLSchema";

/// XML Schema instance, home of `xsi:type` and `xsi:nil`.
pub const XML_SCHEMA_INSTANCE_NS: &str = "http://www.w3.org/2001/XMLSchema-instance";

/// Describing Media Content of Binary Data in XML.
pub const XML_MIME_NS: &str = "http://www.w3.org/2005/05/xmlmime";
