//! Rejections reported by progress tree operations.

use crate::id::NodeId;

/// Result type for progress tree operations.
pub type Result<T> = std::result::Result<T, ProgressError>;

/// Reasons an operation was rejected.
///
/// A rejected operation leaves the tree untouched and notifies nobody.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ProgressError {
    /// Handle does not address a node of this tree
    #[error("Unknown node: {0}")]
    UnknownNode(NodeId),

    /// Total must be positive and finite
    #[error("Invalid total: {0}")]
    InvalidTotal(f64),

    /// Split amount must be positive and finite
    #[error("Invalid amount: {0}")]
    InvalidAmount(f64),

    /// Split asked for more than the unallocated capacity
    #[error("Capacity exceeded: requested {requested}, available {available}")]
    CapacityExceeded {
        /// Requested slice
        requested: f64,
        /// Capacity left at the time of the request
        available: f64,
    },

    /// Node already left pending
    #[error("Node {0} already started")]
    AlreadyStarted(NodeId),

    /// Node already split off children
    #[error("Node {0} has children")]
    HasChildren(NodeId),

    /// Node is done
    #[error("Node {0} already done")]
    AlreadyDone(NodeId),

    /// Split would nest deeper than allowed
    #[error("Depth exceeded: maximum is {max}")]
    DepthExceeded {
        /// Configured maximum depth
        max: usize,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = ProgressError::CapacityExceeded { requested: 60.0, available: 50.0 };
        assert_eq!(err.to_string(), "Capacity exceeded: requested 60, available 50");
        assert_eq!(
            ProgressError::AlreadyDone(NodeId::from_index(2)).to_string(),
            "Node #2 already done"
        );
    }
}
