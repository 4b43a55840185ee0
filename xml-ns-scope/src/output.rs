// Copyright (C) 2021 Scott Lamb <slamb@slamb.org>
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Where start and end tags go.

use std::{borrow::Cow, io::Write};

use log::trace;
use xml::writer::{EmitterConfig, XmlEvent};

use crate::{Binding, Error, NamespaceContext, TagName};

/// Receives tags from [`NamespaceContext::start_element`] and
/// [`NamespaceContext::end_element`].
///
/// `name` is resolved with [`NamespaceContext::qualified_name`]. When a
/// start tag begins, [`NamespaceContext::declarations`] are the bindings the
/// element itself must declare. The outermost element (depth 1) must also
/// declare [`NamespaceContext::root_declarations`].
pub trait XmlOutput {
    type Error: From<Error>;

    fn begin_start_tag<H>(
        &mut self,
        ctx: &NamespaceContext<H>,
        name: &TagName,
    ) -> Result<(), Self::Error>;

    fn end_tag<H>(&mut self, ctx: &NamespaceContext<H>, name: &TagName) -> Result<(), Self::Error>;
}

/// An [`XmlOutput`] which writes through `xml-rs`.
///
/// The start tag is held until the next text, tag, or [`EventWriterOutput::finish`]
/// so attributes can be added after [`NamespaceContext::start_element`].
pub struct EventWriterOutput<W: Write> {
    inner: xml::writer::EventWriter<W>,
    pending: Option<PendingStart>,

    /// When `Some`, all future writes and the overall operation should fail with this error.
    poison: Option<Error>,
}

struct PendingStart {
    prefix: String,
    local_name: String,
    namespace: xml::namespace::Namespace,
    attributes: Vec<PendingAttribute>,
}

struct PendingAttribute {
    prefix: String,
    local_name: String,
    value: String,
}

fn xml_name<'a>(prefix: &'a str, local_name: &'a str) -> xml::name::Name<'a> {
    xml::name::Name {
        local_name,
        namespace: None, // unused by xml::writer
        prefix: if prefix.is_empty() {
            None
        } else {
            Some(prefix)
        },
    }
}

impl<W: Write> EventWriterOutput<W> {
    pub fn new(writer: W, perform_indent: bool) -> Self {
        Self {
            inner: xml::writer::EventWriter::new_with_config(
                writer,
                EmitterConfig::new().perform_indent(perform_indent),
            ),
            pending: None,
            poison: None,
        }
    }

    /// Adds an attribute to the start tag begun most recently.
    ///
    /// `prefix` must be bound in scope; for a namespaced attribute it should
    /// come from a declaration with `require_prefix`.
    pub fn attribute(
        &mut self,
        prefix: &str,
        local_name: &str,
        value: impl Into<String>,
    ) -> Result<(), Error> {
        let pending = match self.pending.as_mut() {
            Some(p) => p,
            None => {
                let e = Error(format!(
                    "attribute {:?} written outside a start tag",
                    local_name
                ));
                self.poison.get_or_insert(e.clone());
                return Err(e);
            }
        };
        pending.attributes.push(PendingAttribute {
            prefix: prefix.to_owned(),
            local_name: local_name.to_owned(),
            value: value.into(),
        });
        Ok(())
    }

    pub fn text(&mut self, text: &str) -> Result<(), Error> {
        self.flush_start()?;
        self.write(XmlEvent::Characters(text))
    }

    /// Writes anything pending and returns the underlying writer.
    pub fn finish(mut self) -> Result<W, Error> {
        self.flush_start()?;
        if let Some(poison) = self.poison {
            return Err(poison);
        }
        Ok(self.inner.into_inner())
    }

    fn flush_start(&mut self) -> Result<(), Error> {
        let p = match self.pending.take() {
            Some(p) => p,
            None => return Ok(()),
        };
        self.write(XmlEvent::StartElement {
            name: xml_name(&p.prefix, &p.local_name),

            // TODO: better to reuse a Vec and amortize this allocation.
            attributes: Cow::Owned(
                p.attributes
                    .iter()
                    .map(|a| xml::attribute::Attribute {
                        name: xml_name(&a.prefix, &a.local_name),
                        value: &a.value,
                    })
                    .collect::<Vec<_>>(),
            ),

            namespace: Cow::Borrowed(&p.namespace),
        })
    }

    /// Writes the event, poisoning the writer on failure.
    fn write(&mut self, event: XmlEvent) -> Result<(), Error> {
        if let Some(ref poison) = self.poison {
            return Err(poison.clone());
        }
        if let Err(e) = self.inner.write(event) {
            let wrapped = Error::writer(&e);
            self.poison = Some(wrapped.clone());
            return Err(wrapped);
        }
        Ok(())
    }
}

impl<W: Write> XmlOutput for EventWriterOutput<W> {
    type Error = Error;

    fn begin_start_tag<H>(&mut self, ctx: &NamespaceContext<H>, name: &TagName) -> Result<(), Error> {
        self.flush_start()?;
        let q = ctx.qualified_name(name)?;
        let own = ctx.declarations();
        let outermost = ctx.depth() == 1;
        let hoisted: &[Binding] = if outermost {
            ctx.root_declarations()
        } else {
            &[]
        };
        let mut namespace = xml::namespace::Namespace::empty();
        let mut attributes = Vec::new();
        for b in hoisted
            .iter()
            .filter(|b| !own.iter().any(|o| o.prefix == b.prefix))
            .chain(own)
        {
            if b.prefix.is_empty() && b.uri.is_empty() {
                // xml-rs never writes xmlns="", so undeclaring an inherited
                // default needs a literal attribute.
                if !outermost && ctx.inherited_uri("").map_or(false, |u| !u.is_empty()) {
                    attributes.push(PendingAttribute {
                        prefix: String::new(),
                        local_name: "xmlns".to_owned(),
                        value: String::new(),
                    });
                }
                continue;
            }
            namespace.put(b.prefix.as_str(), b.uri.as_str());
        }
        trace!(
            "start tag {} with {} declarations, {} from the root scope",
            q,
            own.len(),
            hoisted.len()
        );
        self.pending = Some(PendingStart {
            prefix: q.prefix.to_owned(),
            local_name: q.local_name.to_owned(),
            namespace,
            attributes,
        });
        Ok(())
    }

    fn end_tag<H>(&mut self, ctx: &NamespaceContext<H>, name: &TagName) -> Result<(), Error> {
        self.flush_start()?;
        let q = ctx.qualified_name(name)?;
        self.write(XmlEvent::EndElement {
            name: Some(xml_name(q.prefix, q.local_name)),
        })
    }
}
