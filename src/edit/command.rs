//! Edit commands as sent by a UI layer.

use crate::model::NodeId;
use serde::{Deserialize, Serialize};

/// One edit command, addressable by textual node id.
///
/// # Example
/// ```
/// use cladeshift::edit::EditCommand;
/// use cladeshift::model::NodeId;
///
/// let command: EditCommand = serde_json::from_str(r#"{"command":"collapse","id":"4#0"}"#).unwrap();
/// assert_eq!(command, EditCommand::Collapse { id: NodeId::clade(4.0, 0) });
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum EditCommand {
    Collapse { id: NodeId },
    Expand { id: NodeId },
    Rename { id: NodeId, label: String },
    ThresholdCollapse { limit: f64 },
    MoveToRoot { id: NodeId },
}

impl EditCommand {
    /// Reads a list of commands from a JSON array.
    pub fn list_from_json(json: &str) -> Result<Vec<Self>, serde_json::Error> {
        serde_json::from_str(json)
    }
}
