//! DOM Node Operations errors

use crate::NodeId;

/// Result type for DOM operations
pub type DomResult<T> = Result<T, DomError>;

/// DOM operation errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DomError {
    /// Node not found
    #[error("node {0} not found")]
    NotFound(NodeId),

    /// Inserting a node under itself or one of its descendants
    #[error("hierarchy request error: {child} cannot be appended to {parent}")]
    HierarchyRequest { parent: NodeId, child: NodeId },

    /// Text nodes and the root cannot be used here
    #[error("invalid node type for {0}")]
    InvalidNodeType(NodeId),
}
