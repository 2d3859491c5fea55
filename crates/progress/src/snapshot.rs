//! Point-in-time view of a whole tree.

use crate::node::ProgressNode;
use chrono::{DateTime, Utc};
use progmon_core::{NodeId, NodeState};
use serde::{Deserialize, Serialize};

/// A snapshot of progress at a point in time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProgressSnapshot {
    /// When snapshot was taken
    pub timestamp: DateTime<Utc>,

    /// Nodes in pre-order, root first
    pub nodes: Vec<NodeSnapshot>,
}

impl ProgressSnapshot {
    /// The root entry.
    pub fn root(&self) -> Option<&NodeSnapshot> {
        self.nodes.first()
    }

    /// Entry for a given node.
    pub fn get(&self, id: NodeId) -> Option<&NodeSnapshot> {
        self.nodes.iter().find(|n| n.id == id)
    }
}

/// State of a single node inside a [`ProgressSnapshot`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeSnapshot {
    /// Node handle
    pub id: NodeId,

    /// Parent handle
    pub parent: Option<NodeId>,

    /// Distance from the root
    pub depth: usize,

    /// Lifecycle state
    pub state: NodeState,

    /// Declared size
    pub total: f64,

    /// Work done, direct and through children
    pub worked: f64,

    /// Percent complete (0-100)
    pub percent: f64,
}

impl NodeSnapshot {
    pub(crate) fn capture(id: NodeId, node: &ProgressNode) -> Self {
        Self {
            id,
            parent: node.parent(),
            depth: node.depth(),
            state: node.state(),
            total: node.total(),
            worked: node.worked(),
            percent: node.fraction() * 100.0,
        }
    }
}
