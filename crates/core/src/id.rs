//! Handles for nodes of a progress tree.

use serde::{Deserialize, Serialize};

/// Handle to a node inside one progress tree.
///
/// A handle is only meaningful for the tree that issued it. Using it with
/// another tree yields [`crate::ProgressError::UnknownNode`] or addresses an
/// unrelated node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(usize);

impl NodeId {
    /// The root of every tree.
    pub const ROOT: NodeId = NodeId(0);

    /// Create a handle from an arena index.
    pub fn from_index(index: usize) -> Self {
        Self(index)
    }

    /// Arena index behind this handle.
    pub fn index(&self) -> usize {
        self.0
    }

    /// Whether this handle addresses the root.
    pub fn is_root(&self) -> bool {
        self.0 == 0
    }
}

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}
