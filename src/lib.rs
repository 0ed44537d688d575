//! Cladeshift is a library to lay out and edit phylogenetic trees whose only
//! durable state is a Newick string.
//!
//! Every edit cycle parses the text into a fresh node graph, lays it out,
//! applies a command and writes the result back to text. Since no node object
//! survives that round trip, nodes are addressed by identifiers re-derived on
//! each pass: a counter for leaves and `depth#rank` for internal nodes, kept
//! stable by a per-session identifier table and a merge ledger.
//! Core functionality provided:
//! - Newick: parse and write n-ary trees with internal names and branch
//!   lengths; the writer can replace collapsed clades by a label.
//!   See [crate::newick].
//! - Tree model: [PhyloTree], an arena of vertices with index-based parent
//!   links. See [crate::model].
//! - Layout: depth (x) and order (y) positions in two ordering modes, an
//!   optional children sort, and stable node ids. See [crate::layout].
//! - Editing: collapse, expand, rename, threshold collapse and move-to-root
//!   on a [TreeSession](edit::TreeSession). See [crate::edit].
//!
//! # Usage patterns
//! 1. Quick access with default settings: [parse_newick_str],
//!    [write_newick] and [layout_newick_str].
//! 2. A [TreeSession](edit::TreeSession) for interactive editing.
//!
//! ## Example Layout
//! ```
//! use cladeshift::layout::LayoutConfig;
//! use cladeshift::layout_newick_str;
//!
//! let layout = layout_newick_str("(A:1,(B:2,C:3)D:4)root;", &LayoutConfig::new()).unwrap();
//! assert_eq!(layout.max_x(), 7.0);
//! assert_eq!(layout.max_y(), 2.0);
//! ```
//!
//! ## Example Session
//! ```
//! use cladeshift::edit::TreeSession;
//! use cladeshift::layout::LayoutConfig;
//! use cladeshift::model::NodeId;
//!
//! let mut session = TreeSession::new("(A:1,(B:2,C:3)D:4)root;", LayoutConfig::new())?;
//! session.threshold_collapse(4.0)?;
//! assert!(session.collapsed().contains(&NodeId::clade(4.0, 0)));
//!
//! let text = session.rename("4#0".parse()?, "Clade1")?;
//! assert_eq!(text, "(A:1,Clade1:4)root;");
//! # Ok::<(), cladeshift::edit::EditError>(())
//! ```

pub mod edit;
pub mod layout;
pub mod model;
pub mod newick;
pub mod parser;

use crate::edit::MergeLedger;
use crate::layout::{LayoutConfig, ThresholdIdentifierTable, TreeLayout};
use crate::model::PhyloTree;
use crate::newick::NoOverrides;
use crate::parser::parsing_error::ParsingError;

// ============================================================================
// Quick Newick API
// ============================================================================
/// Parse a Newick string using default settings, returning a [PhyloTree].
///
/// See [`newick::parse_str`] for full documentation of this convenience function.
pub fn parse_newick_str<S: AsRef<str>>(newick: S) -> Result<PhyloTree, ParsingError> {
    newick::parse_str(newick)
}

/// Write a [PhyloTree] as a Newick string terminated by `;`.
pub fn write_newick(tree: &PhyloTree) -> String {
    newick::write_tree(tree, &NoOverrides)
}

// ============================================================================
// Quick Layout API
// ============================================================================
/// Parse a Newick string and run a single layout pass on it, with a fresh
/// identifier table and no merged clades.
pub fn layout_newick_str<S: AsRef<str>>(newick: S, config: &LayoutConfig) -> Result<TreeLayout, ParsingError> {
    let tree = newick::parse_str(newick)?;
    Ok(TreeLayout::compute(
        tree,
        config,
        &MergeLedger::new(),
        &mut ThresholdIdentifierTable::new(),
    ))
}
