// Copyright (C) 2021 Scott Lamb <slamb@slamb.org>
// SPDX-License-Identifier: MIT OR Apache-2.0

//! A minimal tree serializer driving [`xml_ns_scope::NamespaceContext`], for
//! end-to-end tests.

use xml_ns_scope::{Error, EventWriterOutput, NamespaceContext};

#[derive(Clone, Debug, Default)]
pub struct Node {
    pub namespace: String,
    pub local_name: String,
    pub attributes: Vec<Attr>,
    pub children: Vec<Child>,
}

#[derive(Clone, Debug)]
pub struct Attr {
    pub namespace: String,
    pub local_name: String,
    pub value: String,
}

#[derive(Clone, Debug)]
pub enum Child {
    Element(Node),
    Text(String),
}

impl Node {
    pub fn new(namespace: &str, local_name: &str) -> Self {
        Self {
            namespace: namespace.to_owned(),
            local_name: local_name.to_owned(),
            ..Default::default()
        }
    }

    pub fn attr(mut self, namespace: &str, local_name: &str, value: &str) -> Self {
        self.attributes.push(Attr {
            namespace: namespace.to_owned(),
            local_name: local_name.to_owned(),
            value: value.to_owned(),
        });
        self
    }

    pub fn child(mut self, child: Node) -> Self {
        self.children.push(Child::Element(child));
        self
    }

    pub fn text(mut self, text: &str) -> Self {
        self.children.push(Child::Text(text.to_owned()));
        self
    }
}

/// Handles attached to each scope: the node's preorder number.
pub type NodeId = usize;

/// Serializes `root`, declaring namespaces on the elements that first need
/// them.
pub fn to_string(ctx: &mut NamespaceContext<NodeId>, root: &Node) -> Result<String, Error> {
    ctx.reset();
    let mut out = EventWriterOutput::new(Vec::new(), false);
    let mut next_id = 0;
    write_element(ctx, &mut out, root, &mut next_id)?;
    finish(out)
}

/// Serializes `root`, declaring every namespace used anywhere in the tree on
/// the root element.
pub fn to_string_hoisted(
    ctx: &mut NamespaceContext<NodeId>,
    root: &Node,
) -> Result<String, Error> {
    ctx.reset();
    let mut out = EventWriterOutput::new(Vec::new(), false);
    let mut next_id = 0;
    ctx.enter();
    ctx.set_collection_mode(true);
    collect(ctx, root);
    ctx.set_collection_mode(false);
    write_body(ctx, &mut out, root, &mut next_id)?;
    ctx.exit();
    finish(out)
}

fn finish(out: EventWriterOutput<Vec<u8>>) -> Result<String, Error> {
    let bytes = out.finish()?;
    String::from_utf8(bytes).map_err(|e| Error::writer(&e))
}

fn collect(ctx: &mut NamespaceContext<NodeId>, node: &Node) {
    if !node.namespace.is_empty() {
        ctx.prefix_of(&node.namespace);
    }
    for a in &node.attributes {
        if !a.namespace.is_empty() {
            ctx.declare_ns_uri(&a.namespace, None, true);
        }
    }
    for c in &node.children {
        if let Child::Element(n) = c {
            collect(ctx, n);
        }
    }
}

fn write_element(
    ctx: &mut NamespaceContext<NodeId>,
    out: &mut EventWriterOutput<Vec<u8>>,
    node: &Node,
    next_id: &mut NodeId,
) -> Result<(), Error> {
    ctx.enter();
    write_body(ctx, out, node, next_id)?;
    ctx.exit();
    Ok(())
}

fn write_body(
    ctx: &mut NamespaceContext<NodeId>,
    out: &mut EventWriterOutput<Vec<u8>>,
    node: &Node,
    next_id: &mut NodeId,
) -> Result<(), Error> {
    let element_prefix = ctx.declare_ns_uri(&node.namespace, None, false);
    let attribute_prefixes: Vec<Option<usize>> = node
        .attributes
        .iter()
        .map(|a| {
            if a.namespace.is_empty() {
                None
            } else {
                Some(ctx.declare_ns_uri(&a.namespace, None, true))
            }
        })
        .collect();

    let id = *next_id;
    *next_id += 1;
    ctx.set_tag_name(element_prefix, node.local_name.as_str(), id);
    ctx.start_element(out, id)?;
    for (a, p) in node.attributes.iter().zip(attribute_prefixes) {
        let prefix = p.map_or("", |i| ctx.prefix_at(i));
        out.attribute(prefix, &a.local_name, a.value.as_str())?;
    }
    for c in &node.children {
        match c {
            Child::Element(n) => write_element(ctx, out, n, next_id)?,
            Child::Text(t) => out.text(t)?,
        }
    }
    ctx.end_element(out)?;
    Ok(())
}
