//! Editing session over a single canonical Newick text.
//!
//! The text is the only durable state of a tree. Every command parses it,
//! runs a layout pass to find the addressed node, and on success replaces
//! the text and the collapse/rename/merge bookkeeping together. A rejected
//! command changes nothing.

use crate::edit::command::EditCommand;
use crate::edit::error::EditError;
use crate::edit::ledger::{MergeEntry, MergeLedger};
use crate::edit::matcher::NodeMatcher;
use crate::layout::{LayoutConfig, RenderNode, ThresholdIdentifierTable, TreeLayout};
use crate::model::{BranchLength, NodeId, PhyloTree, VertexIndex};
use crate::newick::{self, NoOverrides, to_newick, write_tree};
use std::collections::{BTreeMap, BTreeSet};
use tracing::info;

// =#========================================================================#=
// TREE SESSION
// =#========================================================================#=
/// Canonical text plus the collapse, rename and merge state of one tree.
///
/// # Example
/// ```
/// use cladeshift::edit::TreeSession;
/// use cladeshift::layout::LayoutConfig;
///
/// let mut session = TreeSession::new("(A:1,(B:2,C:3)D:4)root;", LayoutConfig::new()).unwrap();
/// let d = "4#0".parse().unwrap();
/// session.collapse(d).unwrap();
/// assert_eq!(session.rename(d, "Clade1").unwrap(), "(A:1,Clade1:4)root;");
/// assert_eq!(session.expand(d).unwrap(), "(A:1,(B:2,C:3)D:4)root;");
/// ```
#[derive(Debug, Clone)]
pub struct TreeSession {
    canonical_text: String,
    config: LayoutConfig,
    matcher: NodeMatcher,
    collapsed: BTreeSet<NodeId>,
    renames: BTreeMap<NodeId, String>,
    ledger: MergeLedger,
    table: ThresholdIdentifierTable,
}

// ============================================================================
// Construction & Accessors (pub)
// ============================================================================
impl TreeSession {
    /// Starts a session on `text`, which must parse.
    pub fn new(text: impl Into<String>, config: LayoutConfig) -> Result<Self, EditError> {
        let text = text.into();
        newick::parse_str(&text)?;
        Ok(TreeSession {
            canonical_text: text,
            config,
            matcher: NodeMatcher::new(),
            collapsed: BTreeSet::new(),
            renames: BTreeMap::new(),
            ledger: MergeLedger::new(),
            table: ThresholdIdentifierTable::new(),
        })
    }

    /// Sets the matcher used by [move_to_root](Self::move_to_root).
    pub fn with_matcher(mut self, matcher: NodeMatcher) -> Self {
        self.matcher = matcher;
        self
    }

    /// Replaces the tree with `text` and forgets all edit state.
    ///
    /// On a parse error the current tree is kept.
    pub fn load(&mut self, text: impl Into<String>) -> Result<(), EditError> {
        let text = text.into();
        newick::parse_str(&text)?;
        self.canonical_text = text;
        self.reset_edit_state();
        info!("Loaded new tree");
        Ok(())
    }

    pub fn canonical_text(&self) -> &str {
        &self.canonical_text
    }

    pub fn config(&self) -> &LayoutConfig {
        &self.config
    }

    /// Changes the layout configuration; ids are recomputed from scratch.
    pub fn set_config(&mut self, config: LayoutConfig) {
        self.config = config;
        self.table.clear();
    }

    pub fn collapsed(&self) -> &BTreeSet<NodeId> {
        &self.collapsed
    }

    pub fn renames(&self) -> &BTreeMap<NodeId, String> {
        &self.renames
    }

    pub fn ledger(&self) -> &MergeLedger {
        &self.ledger
    }

    pub fn identifier_table(&self) -> &ThresholdIdentifierTable {
        &self.table
    }
}

// ============================================================================
// Layout (pub)
// ============================================================================
impl TreeSession {
    /// Runs a layout pass over the canonical text and keeps its identifier table.
    pub fn layout(&mut self) -> Result<TreeLayout, EditError> {
        let mut table = self.table.clone();
        let layout = self.pass(&mut table)?;
        self.table = table;
        Ok(layout)
    }

    /// Runs a layout pass and returns the renderer view of it.
    pub fn render_nodes(&mut self) -> Result<Vec<RenderNode>, EditError> {
        let layout = self.layout()?;
        Ok(layout.render_nodes(&self.collapsed, &self.renames))
    }

    fn pass(&self, table: &mut ThresholdIdentifierTable) -> Result<TreeLayout, EditError> {
        let tree = newick::parse_str(&self.canonical_text)?;
        Ok(TreeLayout::compute(tree, &self.config, &self.ledger, table))
    }

    fn reset_edit_state(&mut self) {
        self.collapsed.clear();
        self.renames.clear();
        self.ledger.clear();
        self.table.clear();
    }
}

// ============================================================================
// Commands (pub)
// ============================================================================
impl TreeSession {
    /// Runs `command`, see the individual commands.
    pub fn apply(&mut self, command: EditCommand) -> Result<&str, EditError> {
        match command {
            EditCommand::Collapse { id } => self.collapse(id),
            EditCommand::Expand { id } => self.expand(id),
            EditCommand::Rename { id, label } => self.rename(id, &label),
            EditCommand::ThresholdCollapse { limit } => self.threshold_collapse(limit),
            EditCommand::MoveToRoot { id } => self.move_to_root(id),
        }
    }

    /// Hides the subtree of internal node `id` from rendering.
    ///
    /// The text is unchanged until the node is also renamed.
    pub fn collapse(&mut self, id: NodeId) -> Result<&str, EditError> {
        let mut table = self.table.clone();
        let layout = self.pass(&mut table)?;
        if layout.find(id).is_none() {
            return Err(EditError::NodeNotFound(id));
        }
        if !id.is_clade() {
            return Err(EditError::LeafNode(id));
        }

        self.table = table;
        self.collapsed.insert(id);
        info!(%id, "Collapsed node");
        Ok(&self.canonical_text)
    }

    /// Sets or clears the label of collapsed node `id`.
    ///
    /// The first non-empty label merges the clade: its subtree is recorded in
    /// the ledger and replaced by the label in the text. Later labels only
    /// change the text label. An empty (or blank) label drops the rename.
    pub fn rename(&mut self, id: NodeId, label: &str) -> Result<&str, EditError> {
        let label = label.trim();
        let mut table = self.table.clone();
        let layout = self.pass(&mut table)?;
        let index = layout.find(id).ok_or(EditError::NodeNotFound(id))?;
        let is_collapsed = self.collapsed.contains(&id);

        let mut renames = self.renames.clone();
        let mut ledger = self.ledger.clone();

        if label.is_empty() {
            renames.remove(&id);
            let text = if is_collapsed {
                write_tree(layout.text_tree(), &layout.overrides(&self.collapsed, &renames))
            } else {
                self.canonical_text.clone()
            };
            self.commit(text, table, renames, ledger);
            info!(%id, "Cleared rename");
            return Ok(&self.canonical_text);
        }

        if !is_collapsed {
            return Err(EditError::NotCollapsed(id));
        }

        match ledger.get_mut(id) {
            Some(entry) => entry.label = label.to_string(),
            None => {
                let entry = merge_entry(&layout, index, id, label)?;
                ledger.insert(id, entry);
            }
        }
        renames.insert(id, label.to_string());

        let text = write_tree(layout.text_tree(), &layout.overrides(&self.collapsed, &renames));
        self.commit(text, table, renames, ledger);
        info!(%id, label, "Renamed collapsed node");
        Ok(&self.canonical_text)
    }

    /// Puts the merged subtree of `id` back in place of its label.
    ///
    /// The restored subtree root takes over the current branch length of the
    /// pseudo-leaf.
    pub fn expand(&mut self, id: NodeId) -> Result<&str, EditError> {
        let entry = self.ledger.get(id).ok_or(EditError::NodeNotMerged(id))?;
        let subtree = newick::parse_str(&entry.subtree_text)?;

        let mut table = self.table.clone();
        let mut layout = self.pass(&mut table)?;
        let index = layout.find(id).ok_or(EditError::NodeNotFound(id))?;

        let branch_length = layout.text_tree()[index].branch_length();
        let tree = layout.text_tree_mut();
        let grafted = tree.graft(index, &subtree);
        tree.set_branch_length(grafted, branch_length);

        let mut collapsed = self.collapsed.clone();
        let mut renames = self.renames.clone();
        let mut ledger = self.ledger.clone();
        collapsed.remove(&id);
        renames.remove(&id);
        ledger.remove(id);

        let text = write_tree(layout.text_tree(), &layout.overrides(&collapsed, &renames));
        self.collapsed = collapsed;
        self.commit(text, table, renames, ledger);
        info!(%id, "Expanded merged node");
        Ok(&self.canonical_text)
    }

    /// Collapses every internal node at depth `limit` or beyond that is not
    /// below another node selected by the same call.
    pub fn threshold_collapse(&mut self, limit: f64) -> Result<&str, EditError> {
        if !limit.is_finite() || limit < 0.0 {
            return Err(EditError::InvalidThreshold(limit));
        }
        let mut table = self.table.clone();
        let layout = self.pass(&mut table)?;
        let tree = layout.tree();

        let mut collapsed = self.collapsed.clone();
        let mut selected = 0;
        let mut stack = vec![(tree.root_index(), false)];
        while let Some((index, below_selected)) = stack.pop() {
            let mut is_selected = below_selected;
            if !below_selected && tree[index].is_internal() && layout.depth_position(index) >= limit {
                if let Some(id) = layout.id(index) {
                    collapsed.insert(id);
                    selected += 1;
                }
                is_selected = true;
            }
            stack.extend(tree[index].children().iter().rev().map(|&c| (c, is_selected)));
        }

        self.table = table;
        self.collapsed = collapsed;
        info!(limit, selected, "Threshold collapse");
        Ok(&self.canonical_text)
    }

    /// Makes the clade `id` a top-level sibling of the rest of the tree:
    /// `(clade,remainder);` under a new unnamed root.
    ///
    /// A parent left with a single child is replaced by that child (branch
    /// lengths summed); a parent left without children is removed. All
    /// collapse, rename and merge state is reset afterwards.
    pub fn move_to_root(&mut self, id: NodeId) -> Result<&str, EditError> {
        let mut table = self.table.clone();
        let layout = self.pass(&mut table)?;
        let index = layout.find(id).ok_or(EditError::NodeNotFound(id))?;
        if index == layout.tree().root_index() {
            return Err(EditError::RootNode(id));
        }
        let subtree_text = to_newick(
            layout.text_tree(),
            index,
            &layout.overrides(&self.collapsed, &self.renames),
            false,
        );

        let fresh = TreeLayout::compute(
            newick::parse_str(&self.canonical_text)?,
            &self.config,
            &MergeLedger::new(),
            &mut ThresholdIdentifierTable::new(),
        );
        let target = self
            .matcher
            .find_equivalent(&layout, index, &fresh)
            .ok_or(EditError::NodeNotFound(id))?;

        let mut remainder = fresh.into_text_tree();
        detach_and_splice(&mut remainder, target);
        let remainder_text = to_newick(&remainder, remainder.root_index(), &NoOverrides, false);

        self.canonical_text = format!("({subtree_text},{remainder_text});");
        self.reset_edit_state();
        info!(%id, "Moved clade to root");
        Ok(&self.canonical_text)
    }

    fn commit(
        &mut self,
        text: String,
        table: ThresholdIdentifierTable,
        renames: BTreeMap<NodeId, String>,
        ledger: MergeLedger,
    ) {
        self.canonical_text = text;
        self.table = table;
        self.renames = renames;
        self.ledger = ledger;
    }
}

// ============================================================================
// Helpers
// ============================================================================
/// Snapshot of the clade at `index` and its place under its parent, in
/// text order.
fn merge_entry(layout: &TreeLayout, index: VertexIndex, id: NodeId, label: &str) -> Result<MergeEntry, EditError> {
    let tree = layout.text_tree();
    let parent = tree[index].parent().ok_or(EditError::RootNode(id))?;
    let parent_id = layout.id(parent).ok_or(EditError::NodeNotFound(id))?;
    let sibling_index = tree.sibling_index(index).ok_or(EditError::RootNode(id))?;

    Ok(MergeEntry {
        absorbed: tree
            .descendants(index)
            .into_iter()
            .filter_map(|d| layout.id(d))
            .collect(),
        subtree_text: to_newick(tree, index, &NoOverrides, true),
        label: label.to_string(),
        parent_id,
        sibling_index,
        uses_branch_lengths: layout.uses_branch_lengths(),
    })
}

/// Removes `target` from its parent and tidies up the parent: one remaining
/// child takes the parent's place, no remaining child removes the parent.
///
/// Only the direct parent is tidied up.
fn detach_and_splice(tree: &mut PhyloTree, target: VertexIndex) {
    let Some((parent, _)) = tree.detach(target) else {
        return;
    };
    match tree[parent].children().to_vec()[..] {
        [only] => {
            let merged = match (tree[only].branch_length(), tree[parent].branch_length()) {
                (Some(child), Some(former)) => BranchLength::try_new(*child + *former),
                (child, former) => child.or(former),
            };
            tree.replace(parent, only);
            tree.set_branch_length(only, merged);
        }
        [] => {
            tree.detach(parent);
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(tree: &PhyloTree) -> Vec<&str> {
        tree.pre_order_iter().filter_map(|v| v.name()).collect()
    }

    #[test]
    fn test_splice_sums_branch_lengths() {
        let mut tree = newick::parse_str("(A:1,(B:2,C:3)D:4)root;").unwrap();
        let d = tree.root().children()[1];
        let b = tree[d].children()[0];
        detach_and_splice(&mut tree, b);
        assert_eq!(write_tree(&tree, &NoOverrides), "(A:1,C:7)root;");
    }

    #[test]
    fn test_single_child_root_is_replaced() {
        let mut tree = newick::parse_str("(A:1,B:2)root;").unwrap();
        let a = tree.root().children()[0];
        detach_and_splice(&mut tree, a);
        assert_eq!(write_tree(&tree, &NoOverrides), "B:2;");
    }

    #[test]
    fn test_empty_parent_is_removed_one_level() {
        let mut tree = newick::parse_str("(A,((B)X)Y)root;").unwrap();
        let y = tree.root().children()[1];
        let x = tree[y].children()[0];
        let b = tree[x].children()[0];
        detach_and_splice(&mut tree, b);
        assert_eq!(names(&tree), vec!["root", "A", "Y"]);
    }
}
