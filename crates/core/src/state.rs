//! Node lifecycle state.

use serde::{Deserialize, Serialize};

/// Lifecycle of a node: `Pending → Started → Done`, never backwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeState {
    /// Created, no work reported yet
    #[default]
    Pending,
    /// Has begun
    Started,
    /// Terminal
    Done,
}

impl NodeState {
    /// Whether the node has left `Pending`.
    pub fn is_started(&self) -> bool {
        !matches!(self, Self::Pending)
    }

    /// Whether the node reached its terminal state.
    pub fn is_done(&self) -> bool {
        matches!(self, Self::Done)
    }

    /// Get string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Started => "started",
            Self::Done => "done",
        }
    }
}

impl std::fmt::Display for NodeState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Flags orthogonal to [`NodeState`].
///
/// `cancelled` is reserved: no tree operation reads or sets it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct NodeFlags {
    /// Reserved
    pub cancelled: bool,
}
