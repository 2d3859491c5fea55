//! Progress tree configuration.

use serde::{Deserialize, Serialize};

/// Configuration for a progress tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TreeConfig {
    /// Relative tolerance for capacity and completion checks, as a fraction
    /// of the node's total
    #[serde(default = "default_epsilon")]
    pub epsilon: f64,

    /// Deepest level a split may create (root is depth 0, None = unlimited)
    #[serde(default)]
    pub max_depth: Option<usize>,
}

fn default_epsilon() -> f64 {
    1e-12
}

impl Default for TreeConfig {
    fn default() -> Self {
        Self {
            epsilon: default_epsilon(),
            max_depth: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = TreeConfig::default();
        assert_eq!(config.epsilon, 1e-12);
        assert!(config.max_depth.is_none());
    }

    #[test]
    fn test_config_deserialize_partial() {
        let config: TreeConfig = serde_json::from_str(r#"{"max_depth":3}"#).unwrap();
        assert_eq!(config.max_depth, Some(3));
        assert_eq!(config.epsilon, 1e-12);
    }
}
