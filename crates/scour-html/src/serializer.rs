//! HTML Serialization
//!
//! Serializes DOM nodes to HTML strings.
//!
//! - Text is always escaped, including inside elements a browser would treat
//!   as raw text, so the output never contains markup that was text in the
//!   tree
//! - Attribute values are always double-quoted and escaped
//! - Void elements (HTML namespace only) get no end tag

use scour_dom::{DomTree, Namespace, NodeData, NodeId};

/// HTML serializer
#[derive(Debug, Default)]
pub struct HtmlSerializer;

/// Void elements (no end tag)
const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input",
    "link", "meta", "param", "source", "track", "wbr",
];

/// Elements whose leading newline is swallowed by the parser
const NEWLINE_SENSITIVE_ELEMENTS: &[&str] = &["pre", "textarea", "listing"];

enum Step {
    Open(NodeId),
    Close(NodeId),
}

impl HtmlSerializer {
    pub fn new() -> Self {
        Self
    }

    /// Serialize the children of a node
    pub fn serialize_inner(&self, tree: &DomTree, node_id: NodeId) -> String {
        let mut output = String::new();
        let mut stack: Vec<Step> = Vec::new();
        push_children(tree, node_id, &mut stack);
        self.run(tree, &mut stack, &mut output);
        output
    }

    /// Serialize a node including the node itself
    pub fn serialize_outer(&self, tree: &DomTree, node_id: NodeId) -> String {
        let mut output = String::new();
        let mut stack = vec![Step::Open(node_id)];
        self.run(tree, &mut stack, &mut output);
        output
    }

    fn run(&self, tree: &DomTree, stack: &mut Vec<Step>, output: &mut String) {
        while let Some(step) = stack.pop() {
            match step {
                Step::Open(id) => self.open_node(tree, id, stack, output),
                Step::Close(id) => {
                    if let Some(elem) = tree.get(id).and_then(|n| n.as_element()) {
                        output.push_str("</");
                        output.push_str(&elem.name);
                        output.push('>');
                    }
                }
            }
        }
    }

    fn open_node(
        &self,
        tree: &DomTree,
        node_id: NodeId,
        stack: &mut Vec<Step>,
        output: &mut String,
    ) {
        let Some(node) = tree.get(node_id) else {
            return;
        };

        match &node.data {
            NodeData::Document => push_children(tree, node_id, stack),
            NodeData::Element(elem) => {
                let is_html = elem.namespace == Namespace::Html;
                let tag = elem.name.as_str();

                output.push('<');
                output.push_str(tag);
                for attr in &elem.attrs {
                    output.push(' ');
                    output.push_str(&attr.name);
                    output.push_str("=\"");
                    escape_attribute(&attr.value, output);
                    output.push('"');
                }
                output.push('>');

                if is_html && VOID_ELEMENTS.contains(&tag) {
                    return;
                }

                if is_html && NEWLINE_SENSITIVE_ELEMENTS.contains(&tag) {
                    let leading_newline = tree
                        .get(node.first_child)
                        .and_then(|child| child.as_text())
                        .is_some_and(|text| text.starts_with('\n'));
                    if leading_newline {
                        output.push('\n');
                    }
                }

                stack.push(Step::Close(node_id));
                push_children(tree, node_id, stack);
            }
            NodeData::Text(text) => escape_text(&text.content, output),
            NodeData::Comment(text) => {
                output.push_str("<!--");
                output.push_str(text);
                output.push_str("-->");
            }
            NodeData::Doctype { name } => {
                output.push_str("<!DOCTYPE ");
                output.push_str(name);
                output.push('>');
            }
            NodeData::ProcessingInstruction { target, data } => {
                output.push_str("<?");
                output.push_str(target);
                if !data.is_empty() {
                    output.push(' ');
                    output.push_str(data);
                }
                output.push('>');
            }
        }
    }
}

fn push_children(tree: &DomTree, parent: NodeId, stack: &mut Vec<Step>) {
    let start = stack.len();
    stack.extend(tree.children(parent).map(|(id, _)| Step::Open(id)));
    stack[start..].reverse();
}

/// Escape text content for HTML
pub fn escape_text(text: &str, output: &mut String) {
    for c in text.chars() {
        match c {
            '&' => output.push_str("&amp;"),
            '<' => output.push_str("&lt;"),
            '>' => output.push_str("&gt;"),
            _ => output.push(c),
        }
    }
}

/// Escape attribute value
pub fn escape_attribute(text: &str, output: &mut String) {
    for c in text.chars() {
        match c {
            '&' => output.push_str("&amp;"),
            '"' => output.push_str("&quot;"),
            '<' => output.push_str("&lt;"),
            '>' => output.push_str("&gt;"),
            _ => output.push(c),
        }
    }
}
