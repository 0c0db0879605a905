//! Purpose: Convert between XML documents and the generic `Value` model.
//! Exports: `XmlOptions`, `DEFAULT_MAX_DEPTH`, `decode`, `encode`.
//! Role: Fallible XML tier; the crate-root `xml_*_no_error` functions adapt it.
//! Invariants: Element nesting beyond `max_depth` fails closed in both directions.
//! Invariants: Attributes and namespaces are ignored; only element text and structure survive.

mod decode;
mod encode;

pub use decode::decode;
pub use encode::encode;

use crate::core::error::{Error, ErrorKind};

pub const DEFAULT_MAX_DEPTH: usize = 256;

#[derive(Clone, Debug)]
pub struct XmlOptions {
    /// Element name wrapping encoded documents.
    pub root_name: String,
    /// Element name used for arrays that have no key of their own.
    pub item_name: String,
    pub max_depth: usize,
}

impl XmlOptions {
    pub fn new() -> Self {
        Self {
            root_name: "xml".to_string(),
            item_name: "item".to_string(),
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }

    pub fn with_root_name(mut self, root_name: impl Into<String>) -> Self {
        self.root_name = root_name.into();
        self
    }

    pub fn with_item_name(mut self, item_name: impl Into<String>) -> Self {
        self.item_name = item_name.into();
        self
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }
}

impl Default for XmlOptions {
    fn default() -> Self {
        Self::new()
    }
}

fn depth_error(kind: ErrorKind, max_depth: usize) -> Error {
    Error::new(kind)
        .with_message(format!("xml nesting exceeds max depth {max_depth}"))
        .with_hint("parse category: depth-limit; context: xml")
}
