//! Hierarchical progress tracking.
//!
//! A [`ProgressTree`] tracks one root unit of work split into nested
//! sub-units. Each sub-unit reports in its own scale and the tree converts
//! those reports into every ancestor's scale, so callers can watch the
//! root's percent-complete without any sub-unit knowing the root's total.

#![warn(missing_docs)]

pub mod config;
pub mod node;
pub mod observer;
pub mod snapshot;
pub mod tree;

pub use config::TreeConfig;
pub use node::ProgressNode;
pub use observer::{ProgressObserver, SubscriptionId, TracingObserver};
pub use snapshot::{NodeSnapshot, ProgressSnapshot};
pub use tree::{ProgressTree, DEFAULT_TOTAL};

pub use progmon_core::{NodeFlags, NodeId, NodeState, ProgressError, ProgressEvent, Result};
