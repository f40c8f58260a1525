//! folio DOM - Document Object Model
//!
//! Arena-allocated element/text tree that the typewriter writes into and the
//! effect engine mutates. Node ids are never reused, so an id is a stable
//! element identity for the whole life of a tree.

mod classlist;
mod dataset;
mod node;
mod operations;
mod style;
mod tree;

pub use classlist::ClassList;
pub use dataset::Dataset;
pub use node::{ElementData, Node, NodeData, TextData};
pub use operations::{DomError, DomResult};
pub use style::InlineStyle;
pub use tree::DomTree;

/// Node identifier (index into arena)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(pub(crate) u32);

impl NodeId {
    /// Root node ID
    pub const ROOT: NodeId = NodeId(0);

    /// Raw arena index
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}
