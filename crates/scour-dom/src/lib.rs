//! scour DOM
//!
//! Arena-backed node tree the sanitizer filters in place.
//! Nodes are linked to their parent and siblings by index, so removing or
//! unwrapping an element never shifts the rest of the arena.

mod node;
mod tree;

pub use node::{Attribute, ElementData, Namespace, Node, NodeData, TextData};
pub use tree::{Children, DomTree};

/// Node identifier (index into arena)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(pub(crate) u32);

impl NodeId {
    /// Root node ID
    pub const ROOT: NodeId = NodeId(0);

    /// Sentinel for "no node"
    pub const NONE: NodeId = NodeId(u32::MAX);

    /// Check if this ID refers to a node
    #[inline]
    pub fn is_valid(self) -> bool {
        self != Self::NONE
    }

    /// Arena index of this node
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}
