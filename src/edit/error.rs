//! Errors of edit commands.

use crate::model::{InvalidNodeId, NodeId};
use crate::parser::ParsingError;
use thiserror::Error;

/// Reason an edit command was rejected.
///
/// A rejected command leaves the session unchanged.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EditError {
    #[error("Malformed Newick text: {0}")]
    Parse(#[from] ParsingError),
    #[error("No node with id {0}")]
    NodeNotFound(NodeId),
    #[error("Node {0} has not been merged (collapse and rename it first)")]
    NodeNotMerged(NodeId),
    #[error("Invalid threshold {0}: must be a finite, non-negative number")]
    InvalidThreshold(f64),
    #[error("Node {0} is a leaf")]
    LeafNode(NodeId),
    #[error("Node {0} is the root")]
    RootNode(NodeId),
    #[error("Node {0} is not collapsed")]
    NotCollapsed(NodeId),
    #[error(transparent)]
    InvalidNodeId(#[from] InvalidNodeId),
}
