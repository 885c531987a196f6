//! DOM Node
//!
//! Sibling-linked node record plus the element, text and attribute payloads.

use crate::NodeId;

/// DOM Node - Core structure
#[derive(Debug, Clone)]
pub struct Node {
    /// Parent node (NONE if root or detached)
    pub parent: NodeId,
    /// First child
    pub first_child: NodeId,
    /// Last child (for O(1) append)
    pub last_child: NodeId,
    /// Previous sibling
    pub prev_sibling: NodeId,
    /// Next sibling
    pub next_sibling: NodeId,
    /// Node-specific data
    pub data: NodeData,
}

impl Node {
    pub(crate) fn new(data: NodeData) -> Self {
        Self {
            parent: NodeId::NONE,
            first_child: NodeId::NONE,
            last_child: NodeId::NONE,
            prev_sibling: NodeId::NONE,
            next_sibling: NodeId::NONE,
            data,
        }
    }

    /// Get element data if this is an element
    #[inline]
    pub fn as_element(&self) -> Option<&ElementData> {
        match &self.data {
            NodeData::Element(e) => Some(e),
            _ => None,
        }
    }

    /// Get mutable element data
    #[inline]
    pub fn as_element_mut(&mut self) -> Option<&mut ElementData> {
        match &mut self.data {
            NodeData::Element(e) => Some(e),
            _ => None,
        }
    }

    /// Get text content if this is a text node
    #[inline]
    pub fn as_text(&self) -> Option<&str> {
        match &self.data {
            NodeData::Text(t) => Some(&t.content),
            _ => None,
        }
    }
}

/// Node-specific data
#[derive(Debug, Clone)]
pub enum NodeData {
    /// Document root
    Document,
    /// DOCTYPE
    Doctype { name: String },
    /// Element
    Element(ElementData),
    /// Text content
    Text(TextData),
    /// Comment
    Comment(String),
    /// Processing instruction
    ProcessingInstruction { target: String, data: String },
}

/// Element namespace, as assigned by the tree builder
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Namespace {
    Html,
    Svg,
    MathMl,
    Other,
}

impl Namespace {
    pub const HTML_URI: &'static str = "http://www.w3.org/1999/xhtml";
    pub const SVG_URI: &'static str = "http://www.w3.org/2000/svg";
    pub const MATHML_URI: &'static str = "http://www.w3.org/1998/Math/MathML";

    /// Map a namespace URI to a known namespace
    pub fn from_uri(uri: &str) -> Self {
        match uri {
            Self::HTML_URI => Self::Html,
            Self::SVG_URI => Self::Svg,
            Self::MATHML_URI => Self::MathMl,
            _ => Self::Other,
        }
    }
}

/// Element-specific data
#[derive(Debug, Clone)]
pub struct ElementData {
    /// Local name exactly as the tree builder produced it (SVG names keep
    /// their camelCase, e.g. `linearGradient`)
    pub name: String,
    /// Element namespace
    pub namespace: Namespace,
    /// Attributes in document order
    pub attrs: Vec<Attribute>,
}

impl ElementData {
    pub fn new(name: impl Into<String>, namespace: Namespace) -> Self {
        Self {
            name: name.into(),
            namespace,
            attrs: Vec::new(),
        }
    }

    /// ASCII-lowercased local name, the form every policy lookup uses
    pub fn tag_name(&self) -> String {
        self.name.to_ascii_lowercase()
    }

    /// Get an attribute value (names compare ASCII case-insensitively)
    pub fn get_attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|a| a.name.eq_ignore_ascii_case(name))
            .map(|a| a.value.as_str())
    }

    /// Set an attribute, overwriting an existing value in place
    pub fn set_attr(&mut self, name: &str, value: impl Into<String>) {
        let value = value.into();
        for attr in self.attrs.iter_mut() {
            if attr.name.eq_ignore_ascii_case(name) {
                attr.value = value;
                return;
            }
        }
        self.attrs.push(Attribute {
            name: name.to_string(),
            value,
        });
    }
}

/// Text node data
#[derive(Debug, Clone)]
pub struct TextData {
    pub content: String,
}

/// Attribute
///
/// `name` is the qualified name (`xlink:href`, `xmlns:xlink`) so it can be
/// matched against allow-lists and written back unchanged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    pub name: String,
    pub value: String,
}

impl Attribute {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_attr_overwrites_in_place() {
        let mut elem = ElementData::new("a", Namespace::Html);
        elem.set_attr("href", "/one");
        elem.set_attr("title", "t");
        elem.set_attr("HREF", "/two");

        assert_eq!(elem.attrs.len(), 2);
        assert_eq!(elem.attrs[0].name, "href");
        assert_eq!(elem.get_attr("href"), Some("/two"));
    }

    #[test]
    fn test_tag_name_lowercases_svg_names() {
        let elem = ElementData::new("linearGradient", Namespace::Svg);
        assert_eq!(elem.tag_name(), "lineargradient");
        assert_eq!(elem.name, "linearGradient");
    }

    #[test]
    fn test_namespace_from_uri() {
        assert_eq!(Namespace::from_uri(Namespace::SVG_URI), Namespace::Svg);
        assert_eq!(Namespace::from_uri(Namespace::HTML_URI), Namespace::Html);
        assert_eq!(Namespace::from_uri("urn:custom"), Namespace::Other);
    }
}
