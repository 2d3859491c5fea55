//! Outside observers of a node's notifications.

use progmon_core::{NodeId, ProgressEvent};
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

/// Receives notifications from the nodes it is subscribed to.
///
/// Observers are called synchronously, after the state change they
/// describe. They only watch; they cannot change the tree.
pub trait ProgressObserver {
    /// Handle one notification from `node`.
    fn notify(&mut self, node: NodeId, event: &ProgressEvent);
}

impl<F> ProgressObserver for F
where
    F: FnMut(NodeId, &ProgressEvent),
{
    fn notify(&mut self, node: NodeId, event: &ProgressEvent) {
        self(node, event)
    }
}

/// Handle returned by `subscribe`, used to unsubscribe later.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SubscriptionId(u64);

impl SubscriptionId {
    pub(crate) fn new(raw: u64) -> Self {
        Self(raw)
    }
}

impl std::fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "sub-{}", self.0)
    }
}

/// Forwards notifications to `tracing`.
#[derive(Debug, Clone, Default)]
pub struct TracingObserver {
    label: String,
}

impl TracingObserver {
    /// Create an observer that tags its log lines with `label`.
    pub fn new(label: impl Into<String>) -> Self {
        Self { label: label.into() }
    }
}

impl ProgressObserver for TracingObserver {
    fn notify(&mut self, node: NodeId, event: &ProgressEvent) {
        match event {
            ProgressEvent::Work { value, from_child } => {
                trace!("[{}] {} work {:.4} (from child: {})", self.label, node, value, from_child);
            }
            other => debug!("[{}] {} {}", self.label, node, other.name()),
        }
    }
}

/// Observers attached to one node, in subscription order.
#[derive(Default)]
pub(crate) struct ObserverList {
    entries: Vec<(SubscriptionId, Box<dyn ProgressObserver>)>,
}

impl ObserverList {
    pub(crate) fn push(&mut self, id: SubscriptionId, observer: Box<dyn ProgressObserver>) {
        self.entries.push((id, observer));
    }

    pub(crate) fn remove(&mut self, id: SubscriptionId) -> bool {
        let before = self.entries.len();
        self.entries.retain(|(sub, _)| *sub != id);
        self.entries.len() != before
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }

    pub(crate) fn dispatch(&mut self, node: NodeId, event: &ProgressEvent) {
        for (_, observer) in self.entries.iter_mut() {
            observer.notify(node, event);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn test_closure_observer() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = seen.clone();
        let mut list = ObserverList::default();
        list.push(
            SubscriptionId::new(1),
            Box::new(move |node: NodeId, event: &ProgressEvent| {
                sink.borrow_mut().push((node, *event));
            }),
        );

        list.dispatch(NodeId::ROOT, &ProgressEvent::Start);
        assert_eq!(seen.borrow().as_slice(), &[(NodeId::ROOT, ProgressEvent::Start)]);
    }

    #[test]
    fn test_remove_subscription() {
        let mut list = ObserverList::default();
        list.push(SubscriptionId::new(1), Box::new(TracingObserver::new("a")));
        list.push(SubscriptionId::new(2), Box::new(TracingObserver::new("b")));

        assert!(list.remove(SubscriptionId::new(1)));
        assert!(!list.remove(SubscriptionId::new(1)));
        assert_eq!(list.len(), 1);
    }

    #[test]
    fn test_dispatch_order() {
        let order = Rc::new(RefCell::new(Vec::new()));
        let mut list = ObserverList::default();
        for tag in 0..3 {
            let order = order.clone();
            list.push(
                SubscriptionId::new(tag),
                Box::new(move |_: NodeId, _: &ProgressEvent| order.borrow_mut().push(tag)),
            );
        }

        list.dispatch(NodeId::ROOT, &ProgressEvent::End);
        assert_eq!(*order.borrow(), vec![0, 1, 2]);
    }
}
