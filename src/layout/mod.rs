//! Layout of a parsed tree: coordinates and stable identifiers.
//!
//! A layout pass takes a freshly parsed [PhyloTree] and computes, per vertex:
//! * a depth position (x), cumulative branch length or unit depth
//! * an order position (y), see [OrderMode]
//! * a [NodeId]: a counter for leaves, `depth#rank` for internal vertices
//!
//! Internal ids are kept stable across passes by a
//! [ThresholdIdentifierTable] together with the session's
//! [MergeLedger](crate::edit::MergeLedger).
//!
//! # Example
//! ```
//! use cladeshift::edit::MergeLedger;
//! use cladeshift::layout::{LayoutConfig, ThresholdIdentifierTable, TreeLayout};
//! use cladeshift::model::NodeId;
//! use cladeshift::newick::parse_str;
//!
//! let tree = parse_str("(A:1,(B:2,C:3)D:4)root;").unwrap();
//! let mut table = ThresholdIdentifierTable::new();
//! let layout = TreeLayout::compute(tree, &LayoutConfig::new(), &MergeLedger::new(), &mut table);
//!
//! let d = layout.find(NodeId::clade(4.0, 0)).unwrap();
//! assert_eq!(layout.tree()[d].name(), Some("D"));
//! assert_eq!(layout.max_x(), 7.0);
//! ```

pub mod config;
mod coordinates;
pub mod identifiers;

pub use config::{LayoutConfig, OrderMode, SortOrder};
pub use identifiers::ThresholdIdentifierTable;

use crate::edit::ledger::MergeLedger;
use crate::model::{NodeId, PhyloTree, VertexIndex};
use crate::newick::writer::NewickOverrides;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use tracing::debug;

// =#========================================================================#=
// TREE LAYOUT
// =#========================================================================#=
/// A laid-out tree: the node graph plus per-vertex ids and positions.
///
/// Positions and ids are indexed by [VertexIndex]. The layout is discarded
/// after each pass; only the identifier table outlives it.
#[derive(Debug, Clone)]
pub struct TreeLayout {
    tree: PhyloTree,
    /// Children in text order, kept only if `tree` was sorted
    unsorted: Option<PhyloTree>,
    ids: Vec<Option<NodeId>>,
    x: Vec<f64>,
    y: Vec<f64>,
    by_id: HashMap<NodeId, VertexIndex>,
    node_order: Vec<String>,
    uses_branch_lengths: bool,
    max_x: f64,
    max_y: f64,
}

impl TreeLayout {
    /// Runs one layout pass over `tree`.
    ///
    /// Children are sorted first if the config asks for it. `table` is
    /// re-initialized when `ledger` is empty and extended otherwise; while
    /// the ledger is not empty, the depth mode it recorded is kept.
    pub fn compute(
        mut tree: PhyloTree,
        config: &LayoutConfig,
        ledger: &MergeLedger,
        table: &mut ThresholdIdentifierTable,
    ) -> Self {
        let unsorted = config.sort.map(|sort| {
            let unsorted = tree.clone();
            tree.sort_children_by_leaf_count(sort == SortOrder::Descending);
            unsorted
        });
        let text_tree = unsorted.as_ref().unwrap_or(&tree);

        let coords = coordinates::compute(&tree, config.order, ledger.uses_branch_lengths());
        let mut ids = coords.leaf_ids;
        identifiers::assign_internal_ids(&tree, text_tree, &coords.x, &coords.y, &mut ids, ledger, table);

        let by_id = ids
            .iter()
            .enumerate()
            .filter_map(|(index, id)| id.map(|id| (id, index)))
            .collect();
        let max_x = tree.pre_order_iter().map(|v| coords.x[v.index()]).fold(0.0, f64::max);
        let max_y = tree.pre_order_iter().map(|v| coords.y[v.index()]).fold(0.0, f64::max);

        debug!(
            vertices = tree.num_vertices(),
            merged = ledger.len(),
            uses_branch_lengths = coords.uses_branch_lengths,
            "Computed layout"
        );

        TreeLayout {
            tree,
            unsorted,
            ids,
            x: coords.x,
            y: coords.y,
            by_id,
            node_order: coords.node_order,
            uses_branch_lengths: coords.uses_branch_lengths,
            max_x,
            max_y,
        }
    }

    /// Node graph as laid out, children sorted if configured.
    pub fn tree(&self) -> &PhyloTree {
        &self.tree
    }

    /// Node graph with children in text order.
    ///
    /// Shares vertex indices (and so ids) with [tree](Self::tree).
    pub fn text_tree(&self) -> &PhyloTree {
        self.unsorted.as_ref().unwrap_or(&self.tree)
    }

    /// Mutable text-order node graph, for structural edits before
    /// re-serializing.
    ///
    /// Vertices added through edits have no id or position.
    pub(crate) fn text_tree_mut(&mut self) -> &mut PhyloTree {
        self.unsorted.as_mut().unwrap_or(&mut self.tree)
    }

    /// Gives up the positions and ids, keeping the text-order node graph.
    pub fn into_text_tree(self) -> PhyloTree {
        self.unsorted.unwrap_or(self.tree)
    }

    pub fn id(&self, index: VertexIndex) -> Option<NodeId> {
        self.ids.get(index).copied().flatten()
    }

    /// Ids indexed by [VertexIndex].
    pub fn ids(&self) -> &[Option<NodeId>] {
        &self.ids
    }

    /// Looks up the vertex carrying `id` in this pass.
    pub fn find(&self, id: NodeId) -> Option<VertexIndex> {
        self.by_id.get(&id).copied()
    }

    pub fn depth_position(&self, index: VertexIndex) -> f64 {
        self.x[index]
    }

    pub fn order_position(&self, index: VertexIndex) -> f64 {
        self.y[index]
    }

    pub fn max_x(&self) -> f64 {
        self.max_x
    }

    pub fn max_y(&self) -> f64 {
        self.max_y
    }

    /// Names in numbering order; only filled in [OrderMode::InternalLabeled].
    pub fn node_order(&self) -> &[String] {
        &self.node_order
    }

    /// Whether x is cumulative branch length rather than unit depth.
    pub fn uses_branch_lengths(&self) -> bool {
        self.uses_branch_lengths
    }

    /// Whether any ancestor of `index` is collapsed.
    pub fn is_hidden(&self, index: VertexIndex, collapsed: &BTreeSet<NodeId>) -> bool {
        let mut current = self.tree[index].parent();
        while let Some(parent) = current {
            if self.id(parent).is_some_and(|id| collapsed.contains(&id)) {
                return true;
            }
            current = self.tree[parent].parent();
        }
        false
    }

    /// Overrides writing collapsed and renamed clades as their label.
    pub fn overrides<'a>(
        &'a self,
        collapsed: &'a BTreeSet<NodeId>,
        renames: &'a BTreeMap<NodeId, String>,
    ) -> CollapsedLabels<'a> {
        CollapsedLabels {
            ids: &self.ids,
            collapsed,
            renames,
        }
    }

    /// Renderer view of every reachable vertex, in pre-order.
    pub fn render_nodes(
        &self,
        collapsed: &BTreeSet<NodeId>,
        renames: &BTreeMap<NodeId, String>,
    ) -> Vec<RenderNode> {
        self.tree
            .pre_order_iter()
            .filter_map(|vertex| {
                let index = vertex.index();
                let id = self.id(index)?;
                let is_collapsed = collapsed.contains(&id);
                let name = vertex.name().map(str::to_string);
                let display_name = renames
                    .get(&id)
                    .filter(|_| is_collapsed)
                    .cloned()
                    .or_else(|| name.clone());
                Some(RenderNode {
                    id,
                    parent_id: vertex.parent().and_then(|p| self.id(p)),
                    name,
                    display_name,
                    depth_position: self.x[index],
                    order_position: self.y[index],
                    is_leaf: vertex.is_leaf(),
                    is_collapsed,
                    is_hidden: self.is_hidden(index, collapsed),
                })
            })
            .collect()
    }
}

// =#========================================================================#=
// RENDERER OUTPUT
// =#========================================================================#=
/// One vertex as handed to a renderer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderNode {
    pub id: NodeId,
    pub parent_id: Option<NodeId>,
    pub name: Option<String>,
    /// Rename label if collapsed and renamed, the name otherwise
    pub display_name: Option<String>,
    pub depth_position: f64,
    pub order_position: f64,
    pub is_leaf: bool,
    pub is_collapsed: bool,
    /// An ancestor is collapsed
    pub is_hidden: bool,
}

/// [NewickOverrides] replacing every collapsed and renamed clade by its label.
#[derive(Debug, Clone, Copy)]
pub struct CollapsedLabels<'a> {
    ids: &'a [Option<NodeId>],
    collapsed: &'a BTreeSet<NodeId>,
    renames: &'a BTreeMap<NodeId, String>,
}

impl NewickOverrides for CollapsedLabels<'_> {
    fn collapsed_label(&self, index: VertexIndex) -> Option<&str> {
        let id = self.ids.get(index).copied().flatten()?;
        if !self.collapsed.contains(&id) {
            return None;
        }
        self.renames.get(&id).map(String::as_str)
    }
}
