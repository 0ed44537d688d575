//! Layout configuration.

use serde::{Deserialize, Serialize};

/// How vertical (order) positions are assigned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderMode {
    /// Leaves are numbered in traversal order, internal vertices take the
    /// mean of their children.
    #[default]
    LeafDriven,
    /// Every vertex but the root is numbered in traversal order, internal
    /// vertices right after their first child.
    InternalLabeled,
}

/// Direction of the optional children sort by subtree leaf count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    Ascending,
    Descending,
}

/// Configuration of a layout pass.
///
/// # Example
/// ```
/// use cladeshift::layout::{LayoutConfig, OrderMode, SortOrder};
///
/// let config = LayoutConfig::new()
///     .with_order(OrderMode::InternalLabeled)
///     .with_sort(Some(SortOrder::Descending));
///
/// let from_json = LayoutConfig::from_json(r#"{"order":"internal_labeled","sort":"descending"}"#).unwrap();
/// assert_eq!(config, from_json);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    pub order: OrderMode,
    pub sort: Option<SortOrder>,
}

impl LayoutConfig {
    /// Leaf-driven ordering, no sorting.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_order(mut self, order: OrderMode) -> Self {
        self.order = order;
        self
    }

    pub fn with_sort(mut self, sort: Option<SortOrder>) -> Self {
        self.sort = sort;
        self
    }

    /// Reads a configuration from JSON; missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_json_is_default() {
        assert_eq!(LayoutConfig::from_json("{}").unwrap(), LayoutConfig::default());
    }

    #[test]
    fn test_unknown_order_mode_rejected() {
        assert!(LayoutConfig::from_json(r#"{"order":"radial"}"#).is_err());
    }
}
