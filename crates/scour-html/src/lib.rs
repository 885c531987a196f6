//! scour HTML
//!
//! HTML5 parsing built on html5ever, plus a serializer that writes a
//! `DomTree` back out as markup.

mod parser;
mod serializer;

pub use parser::HtmlParser;
pub use serializer::{HtmlSerializer, escape_attribute, escape_text};

use scour_dom::DomTree;

/// Parse an HTML string into a DOM tree
pub fn parse(html: &str) -> Result<DomTree, ParseError> {
    HtmlParser::new().parse(html)
}

/// Serialize the children of the document root
pub fn serialize(tree: &DomTree) -> String {
    HtmlSerializer::new().serialize_inner(tree, tree.root())
}

/// Parse error
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("HTML parser aborted: {0}")]
    ParserPanicked(String),
}
