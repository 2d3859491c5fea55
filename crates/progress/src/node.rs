//! A single unit of trackable work.

use progmon_core::{NodeFlags, NodeId, NodeState};

/// One node of a progress tree.
///
/// All counters are in the node's own scale, `0..=total`. Work reported
/// directly on the node and the capacity handed to children share the same
/// budget, so `current_worked + child_total <= total`.
#[derive(Debug, Clone)]
pub struct ProgressNode {
    /// Declared size of the work
    pub(crate) total: f64,

    /// Work reported directly on this node
    pub(crate) current_worked: f64,

    /// Capacity allocated to children
    pub(crate) child_total: f64,

    /// Work reported by children, in this node's scale
    pub(crate) child_worked: f64,

    /// Owning node (None for the root)
    pub(crate) parent: Option<NodeId>,

    /// Slice of the parent's total this node was allocated
    pub(crate) total_of_parent: f64,

    /// Amount already forwarded to the parent, in the parent's scale
    pub(crate) sent_to_parent: f64,

    /// Children in split order
    pub(crate) children: Vec<NodeId>,

    /// Lifecycle state
    pub(crate) state: NodeState,

    /// Reserved flags
    pub(crate) flags: NodeFlags,

    /// Distance from the root
    pub(crate) depth: usize,
}

impl ProgressNode {
    pub(crate) fn root(total: f64) -> Self {
        Self {
            total,
            current_worked: 0.0,
            child_total: 0.0,
            child_worked: 0.0,
            parent: None,
            total_of_parent: 0.0,
            sent_to_parent: 0.0,
            children: Vec::new(),
            state: NodeState::Pending,
            flags: NodeFlags::default(),
            depth: 0,
        }
    }

    pub(crate) fn child(parent: NodeId, parent_depth: usize, amount: f64) -> Self {
        Self {
            parent: Some(parent),
            total_of_parent: amount,
            depth: parent_depth + 1,
            ..Self::root(amount)
        }
    }

    /// Declared size of the work.
    pub fn total(&self) -> f64 {
        self.total
    }

    /// Work reported directly on this node.
    pub fn current_worked(&self) -> f64 {
        self.current_worked
    }

    /// Capacity allocated to children so far.
    pub fn child_total(&self) -> f64 {
        self.child_total
    }

    /// Children's work, in this node's scale.
    pub fn child_worked(&self) -> f64 {
        self.child_worked
    }

    /// Everything done so far, direct and through children.
    pub fn worked(&self) -> f64 {
        self.current_worked + self.child_worked
    }

    /// Capacity neither worked directly nor allocated to a child.
    pub fn available(&self) -> f64 {
        self.total - self.child_total - self.current_worked
    }

    /// Capacity reserved for children that they have not reported yet.
    pub fn child_available(&self) -> f64 {
        self.child_total - self.child_worked
    }

    /// Completed fraction in `0.0..=1.0`.
    pub fn fraction(&self) -> f64 {
        (self.worked() / self.total).clamp(0.0, 1.0)
    }

    /// Owning node, if any.
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    /// Slice of the parent's total allocated to this node (None for the root).
    pub fn total_of_parent(&self) -> Option<f64> {
        self.parent.map(|_| self.total_of_parent)
    }

    /// Amount forwarded to the parent so far.
    pub fn sent_to_parent(&self) -> f64 {
        self.sent_to_parent
    }

    /// Children in split order.
    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    /// Lifecycle state.
    pub fn state(&self) -> NodeState {
        self.state
    }

    /// Reserved flags.
    pub fn flags(&self) -> NodeFlags {
        self.flags
    }

    /// Distance from the root.
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Slack allowed on capacity and completion checks, relative to `total`.
    pub(crate) fn tolerance(&self, epsilon: f64) -> f64 {
        self.total * epsilon
    }

    pub(crate) fn is_full(&self, epsilon: f64) -> bool {
        self.worked() >= self.total - self.tolerance(epsilon)
    }

    /// Convert an amount in this node's scale into the parent's scale.
    pub(crate) fn share_of_parent(&self, value: f64) -> f64 {
        value * (self.total_of_parent / self.total)
    }
}

/// Clamp a reported amount into `0..=ceiling`. NaN counts as nothing.
pub(crate) fn clamp_report(value: f64, ceiling: f64) -> f64 {
    if value.is_nan() {
        return 0.0;
    }
    value.min(ceiling).max(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_root_node() {
        let node = ProgressNode::root(100.0);
        assert_eq!(node.total(), 100.0);
        assert_eq!(node.worked(), 0.0);
        assert_eq!(node.available(), 100.0);
        assert_eq!(node.state(), NodeState::Pending);
        assert!(node.parent().is_none());
        assert!(node.total_of_parent().is_none());
        assert_eq!(node.depth(), 0);
    }

    #[test]
    fn test_child_node() {
        let node = ProgressNode::child(NodeId::ROOT, 0, 25.0);
        assert_eq!(node.total(), 25.0);
        assert_eq!(node.parent(), Some(NodeId::ROOT));
        assert_eq!(node.total_of_parent(), Some(25.0));
        assert_eq!(node.depth(), 1);
    }

    #[test]
    fn test_share_of_parent_after_rescale() {
        let mut node = ProgressNode::child(NodeId::ROOT, 0, 50.0);
        node.total = 100.0;
        assert_eq!(node.share_of_parent(10.0), 5.0);
    }

    #[test]
    fn test_available_accounts_for_children_and_direct_work() {
        let mut node = ProgressNode::root(100.0);
        node.child_total = 30.0;
        node.current_worked = 20.0;
        node.child_worked = 10.0;
        assert_eq!(node.available(), 50.0);
        assert_eq!(node.child_available(), 20.0);
        assert_eq!(node.worked(), 30.0);
        assert!((node.fraction() - 0.3).abs() < 1e-12);
    }

    #[test]
    fn test_tiny_total_is_not_full() {
        let node = ProgressNode::root(1e-10);
        assert!(!node.is_full(1e-12));
        assert_eq!(node.tolerance(1e-12), 1e-10 * 1e-12);
    }

    #[test]
    fn test_clamp_report() {
        assert_eq!(clamp_report(5.0, 3.0), 3.0);
        assert_eq!(clamp_report(2.0, 3.0), 2.0);
        assert_eq!(clamp_report(-1.0, 3.0), 0.0);
        assert_eq!(clamp_report(f64::NAN, 3.0), 0.0);
        assert_eq!(clamp_report(1.0, -0.5), 0.0);
    }
}
