//! DOM Tree (arena-based allocation)
//!
//! Nodes are never freed: detaching a node only unlinks it, so a `NodeId`
//! stays valid for the lifetime of the tree. Traversal helpers are iterative,
//! which keeps pathological nesting from exhausting the stack.

use crate::{ElementData, Node, NodeData, NodeId, TextData};

/// Arena-based DOM tree
#[derive(Debug, Clone)]
pub struct DomTree {
    nodes: Vec<Node>,
}

impl DomTree {
    /// Create a tree holding only the document root
    pub fn new() -> Self {
        Self {
            nodes: vec![Node::new(NodeData::Document)],
        }
    }

    /// The document root
    #[inline]
    pub fn root(&self) -> NodeId {
        NodeId::ROOT
    }

    /// Get a node by ID
    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.index())
    }

    /// Get a mutable node by ID
    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(id.index())
    }

    /// Number of nodes ever allocated (detached nodes included)
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Check if tree is empty
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Allocate a detached node
    pub fn create_node(&mut self, data: NodeData) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(Node::new(data));
        id
    }

    /// Allocate a detached element
    pub fn create_element(&mut self, element: ElementData) -> NodeId {
        self.create_node(NodeData::Element(element))
    }

    /// Allocate a detached text node
    pub fn create_text(&mut self, content: &str) -> NodeId {
        self.create_node(NodeData::Text(TextData {
            content: content.to_string(),
        }))
    }

    /// Allocate a detached comment
    pub fn create_comment(&mut self, content: &str) -> NodeId {
        self.create_node(NodeData::Comment(content.to_string()))
    }

    /// Append `child` as the last child of `parent`
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) {
        self.detach(child);
        let last = self.nodes[parent.index()].last_child;

        {
            let node = &mut self.nodes[child.index()];
            node.parent = parent;
            node.prev_sibling = last;
            node.next_sibling = NodeId::NONE;
        }

        if last.is_valid() {
            self.nodes[last.index()].next_sibling = child;
        } else {
            self.nodes[parent.index()].first_child = child;
        }
        self.nodes[parent.index()].last_child = child;
    }

    /// Insert `child` immediately before `reference` under the same parent
    pub fn insert_before(&mut self, reference: NodeId, child: NodeId) {
        let parent = self.nodes[reference.index()].parent;
        if !parent.is_valid() {
            return;
        }
        self.detach(child);
        let prev = self.nodes[reference.index()].prev_sibling;

        {
            let node = &mut self.nodes[child.index()];
            node.parent = parent;
            node.prev_sibling = prev;
            node.next_sibling = reference;
        }
        self.nodes[reference.index()].prev_sibling = child;

        if prev.is_valid() {
            self.nodes[prev.index()].next_sibling = child;
        } else {
            self.nodes[parent.index()].first_child = child;
        }
    }

    /// Unlink a node (and with it its whole subtree) from its parent
    pub fn detach(&mut self, id: NodeId) {
        let (parent, prev, next) = {
            let node = &self.nodes[id.index()];
            (node.parent, node.prev_sibling, node.next_sibling)
        };
        if !parent.is_valid() {
            return;
        }

        if prev.is_valid() {
            self.nodes[prev.index()].next_sibling = next;
        } else {
            self.nodes[parent.index()].first_child = next;
        }
        if next.is_valid() {
            self.nodes[next.index()].prev_sibling = prev;
        } else {
            self.nodes[parent.index()].last_child = prev;
        }

        let node = &mut self.nodes[id.index()];
        node.parent = NodeId::NONE;
        node.prev_sibling = NodeId::NONE;
        node.next_sibling = NodeId::NONE;
    }

    /// Replace a node by its children, keeping their position and order.
    ///
    /// Returns the first spliced child, or `NodeId::NONE` when the node had
    /// no children.
    pub fn unwrap(&mut self, id: NodeId) -> NodeId {
        let first = self.nodes[id.index()].first_child;
        if !self.nodes[id.index()].parent.is_valid() {
            return first;
        }

        let mut child = first;
        while child.is_valid() {
            let next = self.nodes[child.index()].next_sibling;
            self.insert_before(id, child);
            child = next;
        }
        self.detach(id);
        first
    }

    /// Iterate over the direct children of a node
    pub fn children(&self, parent: NodeId) -> Children<'_> {
        let next = self
            .get(parent)
            .map(|node| node.first_child)
            .unwrap_or(NodeId::NONE);
        Children { tree: self, next }
    }

    /// Next node in document order after the subtree rooted at `id`.
    ///
    /// Climbing stops at the document root, so the result is `NONE` once the
    /// walk has left the last subtree.
    pub fn next_after_subtree(&self, id: NodeId) -> NodeId {
        let mut current = id;
        while current.is_valid() && current != NodeId::ROOT {
            let node = &self.nodes[current.index()];
            if node.next_sibling.is_valid() {
                return node.next_sibling;
            }
            current = node.parent;
        }
        NodeId::NONE
    }

    /// Next node in document order (pre-order)
    pub fn next_in_preorder(&self, id: NodeId) -> NodeId {
        let first = self.nodes[id.index()].first_child;
        if first.is_valid() {
            first
        } else {
            self.next_after_subtree(id)
        }
    }

    /// Concatenated text of all text descendants
    pub fn text_content(&self, id: NodeId) -> String {
        let mut output = String::new();
        let Some(node) = self.get(id) else {
            return output;
        };
        if let Some(text) = node.as_text() {
            output.push_str(text);
            return output;
        }

        let mut current = node.first_child;
        while current.is_valid() {
            if let Some(text) = self.nodes[current.index()].as_text() {
                output.push_str(text);
            }
            current = self.next_in_subtree(current, id);
        }
        output
    }

    /// Pre-order successor of `id` that stays inside the subtree of `scope`
    fn next_in_subtree(&self, id: NodeId, scope: NodeId) -> NodeId {
        let first = self.nodes[id.index()].first_child;
        if first.is_valid() {
            return first;
        }
        let mut current = id;
        while current.is_valid() && current != scope {
            let node = &self.nodes[current.index()];
            if node.next_sibling.is_valid() {
                return node.next_sibling;
            }
            current = node.parent;
        }
        NodeId::NONE
    }
}

impl Default for DomTree {
    fn default() -> Self {
        Self::new()
    }
}

/// Iterator over the children of a node
pub struct Children<'a> {
    tree: &'a DomTree,
    next: NodeId,
}

impl<'a> Iterator for Children<'a> {
    type Item = (NodeId, &'a Node);

    fn next(&mut self) -> Option<Self::Item> {
        if !self.next.is_valid() {
            return None;
        }
        let id = self.next;
        let node = self.tree.get(id)?;
        self.next = node.next_sibling;
        Some((id, node))
    }
}
