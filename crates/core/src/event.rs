//! Notifications a node emits to its observers.

use serde::{Deserialize, Serialize};

/// Something observable that happened to a node.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ProgressEvent {
    /// First transition out of pending. Fires once per node.
    Start,

    /// Work was applied to the node.
    Work {
        /// Amount applied after clamping, in the node's own scale
        value: f64,
        /// Whether the amount arrived from a child
        #[serde(default)]
        from_child: bool,
    },

    /// Terminal transition. Fires once per node.
    End,
}

impl ProgressEvent {
    /// Event name as seen by subscribers.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::Work { .. } => "work",
            Self::End => "end",
        }
    }

    /// Applied amount for work events.
    pub fn work_value(&self) -> Option<f64> {
        match self {
            Self::Work { value, .. } => Some(*value),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_names() {
        assert_eq!(ProgressEvent::Start.name(), "start");
        assert_eq!(ProgressEvent::Work { value: 1.0, from_child: false }.name(), "work");
        assert_eq!(ProgressEvent::End.name(), "end");
    }

    #[test]
    fn test_work_value() {
        assert_eq!(ProgressEvent::Work { value: 2.5, from_child: true }.work_value(), Some(2.5));
        assert_eq!(ProgressEvent::End.work_value(), None);
    }

    #[test]
    fn test_from_child_defaults_to_false() {
        let event: ProgressEvent = serde_json::from_str(r#"{"kind":"work","value":3.0}"#).unwrap();
        assert_eq!(event, ProgressEvent::Work { value: 3.0, from_child: false });
    }
}
