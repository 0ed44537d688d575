//! Identifiers handed out to vertices by a layout pass.
//!
//! Leaves get a plain counter ([NodeId::Leaf]); internal vertices get a
//! composite `depth#rank` identifier ([NodeId::Clade]) that can be re-derived
//! after the tree has been written to text and parsed again.

use serde_with::{DeserializeFromStr, SerializeDisplay};
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;
use thiserror::Error;

// =#========================================================================#=
// DEPTH
// =#========================================================================#=
/// Horizontal position of a vertex, usable as a map key.
///
/// Equality, ordering and hashing follow [f64::total_cmp], with `-0.0`
/// normalized to `0.0` so that both land in the same depth bucket.
#[derive(Debug, Clone, Copy)]
pub struct Depth(f64);

impl Depth {
    pub fn new(value: f64) -> Self {
        Depth(if value == 0.0 { 0.0 } else { value })
    }

    pub fn value(self) -> f64 {
        self.0
    }
}

impl PartialEq for Depth {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Depth {}

impl PartialOrd for Depth {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Depth {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

impl Hash for Depth {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.to_bits().hash(state);
    }
}

impl fmt::Display for Depth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// =#========================================================================#=
// NODE ID
// =#========================================================================#=
/// Identifier of a vertex within one layout pass.
///
/// Ordered by kind first (leaves before clades), then clades by
/// `(depth, rank)`, which is the order merge-ledger entries are replayed in.
///
/// # Example
/// ```
/// use cladeshift::model::NodeId;
///
/// let id: NodeId = "4#0".parse().unwrap();
/// assert_eq!(id, NodeId::clade(4.0, 0));
/// assert_eq!(NodeId::Leaf(3).to_string(), "3");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, SerializeDisplay, DeserializeFromStr)]
pub enum NodeId {
    /// Leaf counter, assigned in traversal order starting at 1
    Leaf(usize),
    /// Internal vertex at `depth`, `rank`-th in its depth bucket by order position
    Clade { depth: Depth, rank: usize },
}

impl NodeId {
    /// Convenience constructor for [NodeId::Clade].
    pub fn clade(depth: f64, rank: usize) -> Self {
        NodeId::Clade {
            depth: Depth::new(depth),
            rank,
        }
    }

    pub fn is_clade(&self) -> bool {
        matches!(self, NodeId::Clade { .. })
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeId::Leaf(n) => write!(f, "{n}"),
            NodeId::Clade { depth, rank } => write!(f, "{depth}#{rank}"),
        }
    }
}

/// Error for text that is neither `n` nor `depth#rank`.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("Invalid node id '{0}'")]
pub struct InvalidNodeId(pub String);

impl FromStr for NodeId {
    type Err = InvalidNodeId;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || InvalidNodeId(s.to_string());
        match s.split_once('#') {
            Some((depth, rank)) => {
                let depth: f64 = depth.parse().map_err(|_| invalid())?;
                let rank: usize = rank.parse().map_err(|_| invalid())?;
                if !depth.is_finite() {
                    return Err(invalid());
                }
                Ok(NodeId::clade(depth, rank))
            }
            None => s.parse().map(NodeId::Leaf).map_err(|_| invalid()),
        }
    }
}
