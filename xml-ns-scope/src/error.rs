// Copyright (C) 2021 Scott Lamb <slamb@slamb.org>
// SPDX-License-Identifier: MIT OR Apache-2.0

/// An error while resolving namespaces or writing tags.
///
/// Errors raised by the context itself are programmer errors in the calling
/// serializer (asking about a namespace it never declared, starting an
/// element without a name); the serializer should abandon the document.
#[derive(Clone, Debug)]
pub struct Error(pub String);

impl Error {
    pub fn undeclared_namespace(uri: &str) -> Error {
        Error(format!("namespace {:?} is not declared in scope", uri))
    }

    pub fn undeclared_known_namespace(slot: usize, uri: &str) -> Error {
        Error(format!(
            "well-known namespace #{} ({:?}) has no binding in scope",
            slot, uri
        ))
    }

    pub fn missing_tag_name(depth: usize) -> Error {
        Error(format!("no tag name recorded for element at depth {}", depth))
    }

    pub fn writer(e: &dyn std::error::Error) -> Error {
        Error(e.to_string())
    }
}

impl std::error::Error for Error {}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> Result<(), std::fmt::Error> {
        self.0.fmt(f)
    }
}
