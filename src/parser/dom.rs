//! HTML parser built on html5ever.
//!
//! html5ever does the lenient parsing and error recovery; its
//! reference-counted DOM is then copied into the crate's arena [`Tree`],
//! which the render stages mutate.

use html5ever::driver::ParseOpts;
use html5ever::parse_document;
use html5ever::tendril::{StrTendril, TendrilSink};
use html5ever::tree_builder::TreeBuilderOpts;
use markup5ever_rcdom::{Handle, NodeData, RcDom};

use crate::model::{Element, NodeId, Source, Tree};

use super::encoding::{decode_bytes, Decoded};

/// HTML document parser.
pub struct HtmlParser {
    decoded: Decoded,
}

impl HtmlParser {
    /// Prepare a parser for bytes in an unknown encoding.
    pub fn from_bytes(data: &[u8]) -> Self {
        Self {
            decoded: decode_bytes(data, None),
        }
    }

    /// Prepare a parser for a crawled source, honoring its declared encoding.
    pub fn from_source(source: &Source) -> Self {
        Self {
            decoded: decode_bytes(&source.bytes, source.declared_encoding.as_deref()),
        }
    }

    /// Prepare a parser for text that is already decoded.
    pub fn from_text(text: impl Into<String>) -> Self {
        Self {
            decoded: Decoded {
                text: text.into(),
                encoding: None,
                confident: true,
            },
        }
    }

    /// The decoded input.
    pub fn decoded(&self) -> &Decoded {
        &self.decoded
    }

    /// Parse the input into a tree.
    pub fn parse(&self) -> Tree {
        parse_html(&self.decoded.text)
    }
}

/// Parse HTML text into a tree.
///
/// Scripting is treated as disabled, so `<noscript>` content is parsed as
/// markup: it is what a reader without JavaScript sees.
pub fn parse_html(text: &str) -> Tree {
    let opts = ParseOpts {
        tree_builder: TreeBuilderOpts {
            scripting_enabled: false,
            ..Default::default()
        },
        ..Default::default()
    };
    let dom = parse_document(RcDom::default(), opts).one(StrTendril::from_slice(text));
    copy_dom(&dom)
}

fn copy_dom(dom: &RcDom) -> Tree {
    let mut tree = Tree::new();
    let root = tree.root();

    // Iterative to survive pathologically deep documents
    let mut stack: Vec<(Handle, NodeId)> = dom
        .document
        .children
        .borrow()
        .iter()
        .rev()
        .map(|child| (child.clone(), root))
        .collect();

    while let Some((handle, parent)) = stack.pop() {
        let id = match &handle.data {
            NodeData::Element { name, attrs, .. } => {
                let element = Element {
                    name: name.local.to_string(),
                    attrs: attrs
                        .borrow()
                        .iter()
                        .map(|attr| (attr.name.local.to_string(), attr.value.to_string()))
                        .collect(),
                };
                tree.create_element(element)
            }
            NodeData::Text { contents } => tree.create_text(contents.borrow().to_string()),
            NodeData::Comment { contents } => tree.create_comment(contents.to_string()),
            NodeData::Document => parent,
            NodeData::Doctype { .. } | NodeData::ProcessingInstruction { .. } => continue,
        };

        if id != parent {
            tree.append(parent, id);
        }
        stack.extend(
            handle
                .children
                .borrow()
                .iter()
                .rev()
                .map(|child| (child.clone(), id)),
        );
    }

    tree
}
