//! Stable `depth#rank` identifiers for internal vertices.
//!
//! Internal vertices are grouped by depth (x) and ranked by order position
//! (y). On a pass without merged clades the ranking is taken as-is and
//! recorded in a [ThresholdIdentifierTable]. While the [MergeLedger] is not
//! empty, later passes hand out the recorded ids instead, skipping the ids
//! absorbed into merged clades and the merged ids themselves. Each merged
//! clade's pseudo-leaf is found through its recorded parent id, sibling
//! index and label, and gets the merged id back.

use crate::edit::ledger::{MergeEntry, MergeLedger};
use crate::model::{Depth, NodeId, PhyloTree, VertexIndex};
use std::collections::{BTreeMap, HashSet};
use tracing::{debug, warn};

// =#========================================================================#=
// THRESHOLD IDENTIFIER TABLE
// =#========================================================================#=
/// Internal-vertex ids previously handed out, per depth, in rank order.
///
/// Owned by the session that runs the layout passes.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ThresholdIdentifierTable {
    by_depth: BTreeMap<Depth, Vec<NodeId>>,
}

impl ThresholdIdentifierTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.by_depth.is_empty()
    }

    pub fn clear(&mut self) {
        self.by_depth.clear();
    }

    /// Ids recorded at `depth`, empty if none.
    pub fn ids_at(&self, depth: Depth) -> &[NodeId] {
        self.by_depth.get(&depth).map_or(&[], Vec::as_slice)
    }

    /// Depths with recorded ids, ascending.
    pub fn depths(&self) -> impl Iterator<Item = Depth> + '_ {
        self.by_depth.keys().copied()
    }

    /// Appends `id` at `depth` unless already recorded there.
    pub fn record(&mut self, depth: Depth, id: NodeId) {
        let ids = self.by_depth.entry(depth).or_default();
        if !ids.contains(&id) {
            ids.push(id);
        }
    }

    /// Lowest rank not yet used at `depth`.
    fn next_rank(&self, depth: Depth) -> usize {
        self.ids_at(depth)
            .iter()
            .filter_map(|id| match id {
                NodeId::Clade { rank, .. } => Some(rank + 1),
                NodeId::Leaf(_) => None,
            })
            .max()
            .unwrap_or(0)
    }
}

// =#========================================================================#=
// ASSIGNMENT
// =#========================================================================#=
/// Assigns clade ids into `ids` for every internal vertex of `tree`.
///
/// `ids` must already hold the leaf ids; a merged pseudo-leaf found through
/// the ledger has its leaf id replaced by the merged id. `text_tree` is the
/// same node graph as `tree` with children in text order.
pub(crate) fn assign_internal_ids(
    tree: &PhyloTree,
    text_tree: &PhyloTree,
    x: &[f64],
    y: &[f64],
    ids: &mut [Option<NodeId>],
    ledger: &MergeLedger,
    table: &mut ThresholdIdentifierTable,
) {
    if ledger.is_empty() {
        table.clear();
        for (depth, bucket) in buckets(tree, x, y) {
            for (rank, index) in bucket.into_iter().enumerate() {
                let id = NodeId::Clade { depth, rank };
                ids[index] = Some(id);
                table.record(depth, id);
            }
        }
        debug!(depths = table.by_depth.len(), "Recorded fresh identifier table");
        return;
    }

    let absorbed: HashSet<NodeId> = ledger.absorbed_ids().into_iter().collect();
    let reserved: HashSet<NodeId> = absorbed.iter().copied().chain(ledger.iter().map(|(id, _)| id)).collect();

    for (depth, bucket) in buckets(tree, x, y) {
        let recorded: Vec<NodeId> = table
            .ids_at(depth)
            .iter()
            .copied()
            .filter(|id| !reserved.contains(id))
            .collect();
        let mut available = recorded.into_iter();
        let mut next_rank = table.next_rank(depth);
        for index in bucket {
            let id = available.next().unwrap_or_else(|| {
                next_rank += 1;
                NodeId::Clade {
                    depth,
                    rank: next_rank - 1,
                }
            });
            ids[index] = Some(id);
            table.record(depth, id);
        }
    }

    for (merged_id, entry) in ledger.iter() {
        if absorbed.contains(&merged_id) {
            continue;
        }
        let parent = ids.iter().position(|id| *id == Some(entry.parent_id));
        match parent.and_then(|p| find_pseudo_leaf(text_tree, p, entry)) {
            Some(index) => ids[index] = Some(merged_id),
            None => warn!(
                %merged_id,
                parent_id = %entry.parent_id,
                sibling_index = entry.sibling_index,
                label = %entry.label,
                "Merged clade has no matching vertex in this pass"
            ),
        }
    }
}

/// Internal vertices grouped by depth, each group sorted by y.
///
/// Ties on y keep pre-order.
fn buckets(tree: &PhyloTree, x: &[f64], y: &[f64]) -> BTreeMap<Depth, Vec<VertexIndex>> {
    let mut buckets: BTreeMap<Depth, Vec<VertexIndex>> = BTreeMap::new();
    for vertex in tree.pre_order_iter().filter(|v| v.is_internal()) {
        let index = vertex.index();
        buckets.entry(Depth::new(x[index])).or_default().push(index);
    }
    for bucket in buckets.values_mut() {
        bucket.sort_by(|a, b| y[*a].total_cmp(&y[*b]));
    }
    buckets
}

/// The leaf child of `parent` named like the merged clade's label: the one
/// at the recorded sibling index if it fits, else the first such child.
fn find_pseudo_leaf(text_tree: &PhyloTree, parent: VertexIndex, entry: &MergeEntry) -> Option<VertexIndex> {
    let children = text_tree[parent].children();
    let fits = |&index: &VertexIndex| {
        let vertex = &text_tree[index];
        vertex.is_leaf() && vertex.name() == Some(entry.label.as_str())
    };
    children
        .get(entry.sibling_index)
        .copied()
        .filter(fits)
        .or_else(|| children.iter().copied().find(fits))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::config::OrderMode;
    use crate::layout::coordinates;
    use crate::newick::parse_str;
    use std::collections::BTreeSet;

    fn run(newick: &str, ledger: &MergeLedger, table: &mut ThresholdIdentifierTable) -> (PhyloTree, Vec<Option<NodeId>>) {
        let tree = parse_str(newick).unwrap();
        let coords = coordinates::compute(&tree, OrderMode::LeafDriven, None);
        let mut ids = coords.leaf_ids.clone();
        assign_internal_ids(&tree, &tree, &coords.x, &coords.y, &mut ids, ledger, table);
        (tree, ids)
    }

    fn merged(label: &str, parent_id: NodeId, sibling_index: usize, absorbed: &[NodeId]) -> MergeEntry {
        MergeEntry {
            absorbed: absorbed.iter().copied().collect(),
            subtree_text: "(Q,R);".to_string(),
            label: label.to_string(),
            parent_id,
            sibling_index,
            uses_branch_lengths: true,
        }
    }

    fn clade_ids(ids: &[Option<NodeId>]) -> BTreeSet<NodeId> {
        ids.iter().flatten().filter(|id| id.is_clade()).copied().collect()
    }

    fn id_of(tree: &PhyloTree, ids: &[Option<NodeId>], name: &str) -> Option<NodeId> {
        let index = tree.pre_order_iter().find(|v| v.name() == Some(name))?.index();
        ids[index]
    }

    #[test]
    fn test_fresh_pass_ranks_by_order_position() {
        let mut table = ThresholdIdentifierTable::new();
        let (tree, ids) = run("((A:1,B:1)X:2,(C:1,D:1)Y:2)root;", &MergeLedger::new(), &mut table);
        assert_eq!(id_of(&tree, &ids, "root"), Some(NodeId::clade(0.0, 0)));
        assert_eq!(id_of(&tree, &ids, "X"), Some(NodeId::clade(2.0, 0)));
        assert_eq!(id_of(&tree, &ids, "Y"), Some(NodeId::clade(2.0, 1)));
        assert_eq!(table.ids_at(Depth::new(2.0)), &[NodeId::clade(2.0, 0), NodeId::clade(2.0, 1)]);
    }

    #[test]
    fn test_merged_pseudo_leaf_keeps_its_id() {
        let mut table = ThresholdIdentifierTable::new();
        let (_, _) = run("(A:1,(B:2,C:3)D:4)root;", &MergeLedger::new(), &mut table);

        let mut ledger = MergeLedger::new();
        ledger.insert(
            NodeId::clade(4.0, 0),
            merged("Clade1", NodeId::clade(0.0, 0), 1, &[NodeId::Leaf(2), NodeId::Leaf(3)]),
        );
        let (tree, ids) = run("(A:1,Clade1:4)root;", &ledger, &mut table);
        assert_eq!(id_of(&tree, &ids, "Clade1"), Some(NodeId::clade(4.0, 0)));
        assert_eq!(id_of(&tree, &ids, "root"), Some(NodeId::clade(0.0, 0)));
    }

    #[test]
    fn test_absorbed_ids_are_not_reused() {
        let mut table = ThresholdIdentifierTable::new();
        run("((A:1,B:1)X:1,(C:1,D:1)Y:1)root;", &MergeLedger::new(), &mut table);

        // X (1#0) merged, only Y remains internal at depth 1
        let mut ledger = MergeLedger::new();
        ledger.insert(
            NodeId::clade(1.0, 0),
            merged("M", NodeId::clade(0.0, 0), 0, &[NodeId::Leaf(1), NodeId::Leaf(2)]),
        );
        let (tree, ids) = run("(M:1,(C:1,D:1)Y:1)root;", &ledger, &mut table);
        assert_eq!(id_of(&tree, &ids, "M"), Some(NodeId::clade(1.0, 0)));
        assert_eq!(id_of(&tree, &ids, "Y"), Some(NodeId::clade(1.0, 1)));
    }

    #[test]
    fn test_extra_vertices_get_fresh_ranks() {
        let mut table = ThresholdIdentifierTable::new();
        table.record(Depth::new(0.0), NodeId::clade(0.0, 0));

        let mut ledger = MergeLedger::new();
        ledger.insert(NodeId::clade(5.0, 0), merged("Gone", NodeId::clade(9.0, 9), 0, &[]));
        let (tree, ids) = run("((A:1,B:1)X:1,(C:1,D:1)Y:1)root;", &ledger, &mut table);
        assert_eq!(id_of(&tree, &ids, "X"), Some(NodeId::clade(1.0, 0)));
        assert_eq!(id_of(&tree, &ids, "Y"), Some(NodeId::clade(1.0, 1)));
        assert_eq!(table.ids_at(Depth::new(1.0)).len(), 2);
        assert_eq!(clade_ids(&ids).len(), 3);
    }

    #[test]
    fn test_pseudo_leaf_found_by_label_when_slot_moved() {
        let mut table = ThresholdIdentifierTable::new();
        run("((A:1,B:1)X:1,(C:1,D:1)Y:1)root;", &MergeLedger::new(), &mut table);

        // Recorded at sibling 1, but the pseudo-leaf now sits at sibling 0
        let mut ledger = MergeLedger::new();
        ledger.insert(NodeId::clade(1.0, 1), merged("M", NodeId::clade(0.0, 0), 1, &[NodeId::Leaf(3), NodeId::Leaf(4)]));
        let (tree, ids) = run("(M:1,(A:1,B:1)X:1)root;", &ledger, &mut table);
        assert_eq!(id_of(&tree, &ids, "M"), Some(NodeId::clade(1.0, 1)));
        assert_eq!(id_of(&tree, &ids, "X"), Some(NodeId::clade(1.0, 0)));
    }

    #[test]
    fn test_unrelated_vertex_never_takes_merged_id() {
        let mut table = ThresholdIdentifierTable::new();
        run("((A:1,B:1)X:1,(C:1,D:1)Y:1)root;", &MergeLedger::new(), &mut table);

        // The slot holds the clade Y, not a leaf labeled M
        let mut ledger = MergeLedger::new();
        ledger.insert(NodeId::clade(1.0, 0), merged("M", NodeId::clade(0.0, 0), 0, &[NodeId::Leaf(1), NodeId::Leaf(2)]));
        let (tree, ids) = run("((C:1,D:1)Y:1,E:1)root;", &ledger, &mut table);
        assert_eq!(id_of(&tree, &ids, "Y"), Some(NodeId::clade(1.0, 1)));
        assert!(!clade_ids(&ids).contains(&NodeId::clade(1.0, 0)));
    }
}
