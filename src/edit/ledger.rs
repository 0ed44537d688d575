//! Merge ledger: what a collapsed and renamed clade replaced in the text.

use crate::model::NodeId;
use std::collections::{BTreeMap, BTreeSet};

/// Record of one durable collapse.
///
/// `parent_id`, `sibling_index` (in text order) and `label` locate the
/// pseudo-leaf that stands in for the clade after the text has been written
/// and parsed again.
#[derive(Debug, Clone, PartialEq)]
pub struct MergeEntry {
    /// Every id below the clade when it was merged
    pub absorbed: BTreeSet<NodeId>,
    /// Standalone Newick text (with `;`) of the merged subtree
    pub subtree_text: String,
    pub label: String,
    pub parent_id: NodeId,
    pub sibling_index: usize,
    /// Depth mode of the pass the clade was merged in
    pub uses_branch_lengths: bool,
}

/// Merged clades by id.
///
/// Iteration is in ascending `(depth, rank)` order of the clade ids.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MergeLedger {
    entries: BTreeMap<NodeId, MergeEntry>,
}

impl MergeLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.entries.contains_key(&id)
    }

    pub fn get(&self, id: NodeId) -> Option<&MergeEntry> {
        self.entries.get(&id)
    }

    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut MergeEntry> {
        self.entries.get_mut(&id)
    }

    pub fn insert(&mut self, id: NodeId, entry: MergeEntry) {
        self.entries.insert(id, entry);
    }

    pub fn remove(&mut self, id: NodeId) -> Option<MergeEntry> {
        self.entries.remove(&id)
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Entries in ascending `(depth, rank)` order.
    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &MergeEntry)> {
        self.entries.iter().map(|(id, entry)| (*id, entry))
    }

    /// Depth mode all later passes keep while any clade is merged.
    ///
    /// A pseudo-leaf may lack a branch length its clade never had, which
    /// would otherwise switch the whole tree to unit depths.
    pub fn uses_branch_lengths(&self) -> Option<bool> {
        self.entries.values().next().map(|entry| entry.uses_branch_lengths)
    }

    /// Union of all absorbed ids.
    pub fn absorbed_ids(&self) -> BTreeSet<NodeId> {
        self.entries
            .values()
            .flat_map(|entry| entry.absorbed.iter().copied())
            .collect()
    }
}
