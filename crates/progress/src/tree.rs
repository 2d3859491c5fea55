//! The progress tree: allocation, reporting and propagation.
//!
//! A tree starts with a single root node of a given total. Callers carve
//! slices of a node's capacity into children with [`ProgressTree::split`],
//! report work on any node with [`ProgressTree::work`] and finish nodes with
//! [`ProgressTree::end`]. Work reported on a child is converted into the
//! parent's scale and forwarded hop by hop up to the root, so a child never
//! needs to know the root's absolute total:
//!
//! ```text
//! root (100) ── split(50) ──> child (50) ── adjust_total(100) ──> child (100)
//!                                 work(10) on child  =>  root +5
//! ```

use crate::config::TreeConfig;
use crate::node::{clamp_report, ProgressNode};
use crate::observer::{ObserverList, ProgressObserver, SubscriptionId};
use crate::snapshot::{NodeSnapshot, ProgressSnapshot};
use chrono::Utc;
use progmon_core::{NodeId, NodeState, ProgressError, ProgressEvent, Result};
use tracing::{debug, trace};

/// Default total of a tree created through [`Default`].
pub const DEFAULT_TOTAL: f64 = 100.0;

/// A tree of progress nodes owned by a single caller.
///
/// Nodes live in an arena and are addressed by [`NodeId`]. Parents own
/// their children; a child only keeps its parent's handle.
pub struct ProgressTree {
    nodes: Vec<ProgressNode>,
    observers: Vec<ObserverList>,
    next_subscription: u64,
    config: TreeConfig,
}

impl ProgressTree {
    /// Create a tree whose root has `total` amount of work.
    pub fn new(total: f64) -> Result<Self> {
        if !is_valid_total(total) {
            return Err(ProgressError::InvalidTotal(total));
        }
        Ok(Self::with_root(total))
    }

    fn with_root(total: f64) -> Self {
        Self {
            nodes: vec![ProgressNode::root(total)],
            observers: vec![ObserverList::default()],
            next_subscription: 0,
            config: TreeConfig::default(),
        }
    }

    /// Set the configuration.
    pub fn with_config(mut self, config: TreeConfig) -> Self {
        self.config = config;
        self
    }

    /// Current configuration.
    pub fn config(&self) -> &TreeConfig {
        &self.config
    }

    /// Handle of the root node.
    pub fn root(&self) -> NodeId {
        NodeId::ROOT
    }

    /// Number of nodes in the tree.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Always false: a tree has at least its root.
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Look up a node.
    pub fn node(&self, id: NodeId) -> Result<&ProgressNode> {
        self.nodes.get(id.index()).ok_or(ProgressError::UnknownNode(id))
    }

    fn node_mut(&mut self, id: NodeId) -> Result<&mut ProgressNode> {
        self.nodes.get_mut(id.index()).ok_or(ProgressError::UnknownNode(id))
    }

    /// Percent complete of a node, `0.0..=100.0`.
    pub fn percent(&self, id: NodeId) -> Result<f64> {
        Ok(self.node(id)?.fraction() * 100.0)
    }

    /// Attach an observer to a node's notifications.
    pub fn subscribe<O>(&mut self, id: NodeId, observer: O) -> Result<SubscriptionId>
    where
        O: ProgressObserver + 'static,
    {
        self.node(id)?;
        self.next_subscription += 1;
        let subscription = SubscriptionId::new(self.next_subscription);
        self.observers[id.index()].push(subscription, Box::new(observer));
        Ok(subscription)
    }

    /// Detach an observer. Returns false if it was not attached to `id`.
    pub fn unsubscribe(&mut self, id: NodeId, subscription: SubscriptionId) -> Result<bool> {
        self.node(id)?;
        Ok(self.observers[id.index()].remove(subscription))
    }

    /// Number of observers attached to a node.
    pub fn observer_count(&self, id: NodeId) -> Result<usize> {
        self.node(id)?;
        Ok(self.observers[id.index()].len())
    }

    /// Move a node out of pending.
    ///
    /// Returns `true` when the node transitioned, `false` when it had
    /// already started. A done node rejects the call.
    pub fn start(&mut self, id: NodeId) -> Result<bool> {
        let state = self.node(id)?.state;
        match state {
            NodeState::Done => Err(ProgressError::AlreadyDone(id)),
            NodeState::Started => Ok(false),
            NodeState::Pending => {
                self.mark_started(id);
                Ok(true)
            }
        }
    }

    fn mark_started(&mut self, id: NodeId) {
        self.nodes[id.index()].state = NodeState::Started;
        debug!("Started node {}", id);
        self.emit(id, ProgressEvent::Start);
    }

    /// Allocate `amount` of a node's unallocated capacity to a new child.
    pub fn split(&mut self, id: NodeId, amount: f64) -> Result<NodeId> {
        let epsilon = self.config.epsilon;
        let max_depth = self.config.max_depth;
        let child_id = NodeId::from_index(self.nodes.len());

        let parent = self.node(id)?;
        if parent.state.is_done() {
            return Err(ProgressError::AlreadyDone(id));
        }
        if !is_valid_total(amount) {
            return Err(ProgressError::InvalidAmount(amount));
        }
        if let Some(max) = max_depth {
            if parent.depth + 1 > max {
                return Err(ProgressError::DepthExceeded { max });
            }
        }
        let available = parent.available();
        if amount > available + parent.tolerance(epsilon) {
            return Err(ProgressError::CapacityExceeded {
                requested: amount,
                available,
            });
        }
        // Within tolerance of an exact fit: hand out what is actually left.
        let granted = amount.min(available);

        let child = ProgressNode::child(id, parent.depth, granted);
        let parent = self.node_mut(id)?;
        parent.child_total += granted;
        parent.children.push(child_id);

        self.nodes.push(child);
        self.observers.push(ObserverList::default());
        debug!(
            "Split {} from {} with {:.4} of {:.4} available",
            child_id, id, granted, available
        );

        Ok(child_id)
    }

    /// Rescale a node's total before it starts.
    ///
    /// Work already recorded directly on the node is scaled by
    /// `new_total / old_total`. The slice the node holds of its parent does
    /// not change, so later reports are converted with the new ratio.
    pub fn adjust_total(&mut self, id: NodeId, new_total: f64) -> Result<&ProgressNode> {
        let node = self.node(id)?;
        match node.state {
            NodeState::Done => return Err(ProgressError::AlreadyDone(id)),
            NodeState::Started => return Err(ProgressError::AlreadyStarted(id)),
            NodeState::Pending => {}
        }
        if !node.children.is_empty() {
            return Err(ProgressError::HasChildren(id));
        }
        if !is_valid_total(new_total) {
            return Err(ProgressError::InvalidTotal(new_total));
        }

        let node = self.node_mut(id)?;
        let old_total = node.total;
        let scale = new_total / old_total;
        node.total = new_total;
        node.current_worked *= scale;
        debug!("Adjusted total of {} from {:.4} to {:.4}", id, old_total, new_total);

        self.node(id)
    }

    /// Report `value` units of work done directly on a node.
    ///
    /// The value is clamped to the node's unallocated capacity. Returns the
    /// amount actually applied, which is `0.0` when the node is already
    /// full or nothing fits. The first report starts a pending node.
    /// Reaching the total does not end the node; call [`ProgressTree::end`].
    pub fn work(&mut self, id: NodeId, value: f64) -> Result<f64> {
        let epsilon = self.config.epsilon;
        let node = self.node(id)?;
        if node.state.is_done() {
            return Err(ProgressError::AlreadyDone(id));
        }
        if node.is_full(epsilon) {
            return Ok(0.0);
        }
        if node.state == NodeState::Pending {
            self.mark_started(id);
        }

        let node = &mut self.nodes[id.index()];
        let applied = clamp_report(value, node.available());
        if applied > 0.0 {
            node.current_worked += applied;
            trace!(
                "Node {} worked {:.4} ({:.4}/{:.4})",
                id,
                applied,
                node.worked(),
                node.total
            );
            self.emit(id, ProgressEvent::Work { value: applied, from_child: false });
            self.propagate(id, applied);
        }
        Ok(applied)
    }

    /// Finish a node.
    ///
    /// Starts it first if needed, then credits the parent with whatever part
    /// of the node's slice was never forwarded. Returns `false` if the node
    /// was already done.
    pub fn end(&mut self, id: NodeId) -> Result<bool> {
        let state = self.node(id)?.state;
        match state {
            NodeState::Done => return Ok(false),
            NodeState::Pending => self.mark_started(id),
            NodeState::Started => {}
        }

        let node = &mut self.nodes[id.index()];
        if let Some(parent) = node.parent {
            let remainder = (node.total_of_parent - node.sent_to_parent).max(0.0);
            node.sent_to_parent = node.total_of_parent;
            if remainder > 0.0 {
                trace!("Node {} reconciles {:.4} into {}", id, remainder, parent);
                let applied = self.absorb_child(parent, remainder);
                if applied > 0.0 {
                    self.propagate(parent, applied);
                }
            }
        }

        self.nodes[id.index()].state = NodeState::Done;
        debug!("Ended node {}", id);
        self.emit(id, ProgressEvent::End);
        Ok(true)
    }

    /// Forward `amount`, already applied to `from`, up the ancestor chain.
    fn propagate(&mut self, from: NodeId, amount: f64) {
        let mut current = from;
        let mut amount = amount;
        while let Some(parent) = self.nodes[current.index()].parent {
            let node = &mut self.nodes[current.index()];
            let share = node.share_of_parent(amount);
            node.sent_to_parent += share;
            trace!("Propagating {:.4} from {} to {}", share, current, parent);

            amount = self.absorb_child(parent, share);
            if amount <= 0.0 {
                break;
            }
            current = parent;
        }
    }

    /// Apply child-originated work to a node. Returns the applied amount.
    fn absorb_child(&mut self, id: NodeId, value: f64) -> f64 {
        let epsilon = self.config.epsilon;
        let node = &self.nodes[id.index()];
        if node.state.is_done() || node.is_full(epsilon) {
            return 0.0;
        }
        if node.state == NodeState::Pending {
            self.mark_started(id);
        }

        let node = &mut self.nodes[id.index()];
        let applied = clamp_report(value, node.child_available());
        if applied > 0.0 {
            node.child_worked += applied;
            self.emit(id, ProgressEvent::Work { value: applied, from_child: true });
        }
        applied
    }

    fn emit(&mut self, id: NodeId, event: ProgressEvent) {
        self.observers[id.index()].dispatch(id, &event);
    }

    /// Capture every node, root first, children in split order.
    pub fn snapshot(&self) -> ProgressSnapshot {
        let mut nodes = Vec::with_capacity(self.nodes.len());
        let mut stack = vec![NodeId::ROOT];
        while let Some(id) = stack.pop() {
            let node = &self.nodes[id.index()];
            nodes.push(NodeSnapshot::capture(id, node));
            stack.extend(node.children.iter().rev().copied());
        }

        ProgressSnapshot {
            timestamp: Utc::now(),
            nodes,
        }
    }
}

impl Default for ProgressTree {
    fn default() -> Self {
        Self::with_root(DEFAULT_TOTAL)
    }
}

impl std::fmt::Debug for ProgressTree {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProgressTree")
            .field("nodes", &self.nodes)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

fn is_valid_total(value: f64) -> bool {
    value.is_finite() && value > 0.0
}
