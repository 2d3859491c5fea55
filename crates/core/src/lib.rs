//! Progmon core data models.
//!
//! This crate defines the plain data that the progress tree is built from:
//! node handles, lifecycle state, emitted events and rejection errors.

#![warn(missing_docs)]

// Core identities
mod id;

// Node lifecycle
mod state;

// Notifications and failures
mod event;
mod error;

// Re-exports
pub use id::NodeId;
pub use state::{NodeFlags, NodeState};
pub use event::ProgressEvent;
pub use error::{ProgressError, Result};
