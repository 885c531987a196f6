//! HTML5 Parser implementation
//!
//! Uses html5ever's RcDom and converts it into a `DomTree`. html5ever never
//! rejects input: malformed markup is repaired by the tree builder the same
//! way a browser would repair it, and SVG/MathML content is placed in its
//! own namespace.

use std::panic::{self, AssertUnwindSafe};

use html5ever::parse_document;
use html5ever::tendril::TendrilSink;
use markup5ever_rcdom::{Handle, NodeData as RcNodeData, RcDom};
use scour_dom::{Attribute, DomTree, ElementData, Namespace, NodeData, NodeId};

use crate::ParseError;

/// HTML5 parser
pub struct HtmlParser;

impl HtmlParser {
    /// Create a new HTML parser
    pub fn new() -> Self {
        Self
    }

    /// Parse an HTML string into a DOM tree.
    ///
    /// The input is parsed as a whole document, so the tree contains the
    /// `html`/`head`/`body` elements the tree builder synthesizes.
    pub fn parse(&self, html: &str) -> Result<DomTree, ParseError> {
        tracing::debug!("Parsing HTML input ({} bytes)", html.len());

        let dom = panic::catch_unwind(AssertUnwindSafe(|| {
            parse_document(RcDom::default(), Default::default()).one(html)
        }))
        .map_err(|payload| ParseError::ParserPanicked(panic_message(payload.as_ref())))?;

        let mut tree = DomTree::new();
        self.convert(&dom.document, &mut tree);

        tracing::debug!("Parsed {} nodes", tree.len());
        Ok(tree)
    }

    /// Convert an RcDom document into `tree`, depth-first without recursion
    fn convert(&self, document: &Handle, tree: &mut DomTree) {
        let mut stack: Vec<(Handle, NodeId)> = document
            .children
            .borrow()
            .iter()
            .rev()
            .map(|child| (child.clone(), NodeId::ROOT))
            .collect();

        while let Some((handle, parent)) = stack.pop() {
            let Some(id) = self.convert_node(&handle, tree) else {
                continue;
            };
            tree.append_child(parent, id);

            for child in handle.children.borrow().iter().rev() {
                stack.push((child.clone(), id));
            }
        }
    }

    /// Allocate the `DomTree` counterpart of a single RcDom node
    fn convert_node(&self, handle: &Handle, tree: &mut DomTree) -> Option<NodeId> {
        let id = match &handle.data {
            RcNodeData::Document => return None,
            RcNodeData::Doctype { name, .. } => tree.create_node(NodeData::Doctype {
                name: name.to_string(),
            }),
            RcNodeData::Text { contents } => tree.create_text(&contents.borrow()),
            RcNodeData::Comment { contents } => tree.create_comment(contents),
            RcNodeData::Element { name, attrs, .. } => {
                let mut elem =
                    ElementData::new(name.local.to_string(), Namespace::from_uri(&name.ns));
                for attr in attrs.borrow().iter() {
                    let qualified = match &attr.name.prefix {
                        Some(prefix) => format!("{}:{}", prefix, attr.name.local),
                        None => attr.name.local.to_string(),
                    };
                    elem.attrs.push(Attribute::new(qualified, attr.value.to_string()));
                }
                tree.create_element(elem)
            }
            RcNodeData::ProcessingInstruction { target, contents } => {
                tree.create_node(NodeData::ProcessingInstruction {
                    target: target.to_string(),
                    data: contents.to_string(),
                })
            }
        };
        Some(id)
    }
}

impl Default for HtmlParser {
    fn default() -> Self {
        Self::new()
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}
