//! Finding the same logical node in an independently parsed tree.

use crate::layout::TreeLayout;
use crate::model::{BranchLength, VertexIndex};

/// Heuristic equivalence of vertices across two layouts.
///
/// In priority order:
/// 1. if both names are non-empty, they must be equal
/// 2. otherwise equal branch lengths (missing counts as 0) match
/// 3. failing that, equal depth and order positions match
///
/// # Example
/// ```
/// use cladeshift::edit::{MergeLedger, NodeMatcher};
/// use cladeshift::layout::{LayoutConfig, ThresholdIdentifierTable, TreeLayout};
/// use cladeshift::newick::parse_str;
///
/// let lay_out = |text: &str| {
///     let tree = parse_str(text).unwrap();
///     TreeLayout::compute(tree, &LayoutConfig::new(), &MergeLedger::new(), &mut ThresholdIdentifierTable::new())
/// };
/// let current = lay_out("(A:1,B:2,C:3)root;");
/// let fresh = lay_out("(A:1,B:2,C:3)root;");
///
/// let b = current.tree().root().children()[1];
/// assert_eq!(NodeMatcher::new().find_equivalent(&current, b, &fresh), Some(b));
/// ```
#[derive(Debug, Clone, Copy)]
pub struct NodeMatcher {
    branch_length_tolerance: f64,
    coordinate_tolerance: f64,
}

impl Default for NodeMatcher {
    fn default() -> Self {
        Self {
            branch_length_tolerance: 1e-6,
            coordinate_tolerance: 1e-3,
        }
    }
}

impl NodeMatcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_branch_length_tolerance(mut self, tolerance: f64) -> Self {
        self.branch_length_tolerance = tolerance;
        self
    }

    pub fn with_coordinate_tolerance(mut self, tolerance: f64) -> Self {
        self.coordinate_tolerance = tolerance;
        self
    }

    /// First vertex of `fresh`, in pre-order, equivalent to `target` of `current`.
    ///
    /// Roots only match roots.
    pub fn find_equivalent(
        &self,
        current: &TreeLayout,
        target: VertexIndex,
        fresh: &TreeLayout,
    ) -> Option<VertexIndex> {
        let target_is_root = target == current.tree().root_index();
        fresh
            .tree()
            .pre_order_iter()
            .map(|v| v.index())
            .filter(|&candidate| (candidate == fresh.tree().root_index()) == target_is_root)
            .find(|&candidate| self.is_equivalent(current, target, fresh, candidate))
    }

    /// Whether vertex `a` of layout `left` matches vertex `b` of layout `right`.
    pub fn is_equivalent(&self, left: &TreeLayout, a: VertexIndex, right: &TreeLayout, b: VertexIndex) -> bool {
        let (va, vb) = (&left.tree()[a], &right.tree()[b]);
        if let (Some(name_a), Some(name_b)) = (va.name(), vb.name()) {
            return name_a == name_b;
        }

        let length = |bl: Option<BranchLength>| bl.map_or(0.0, |bl| *bl);
        if (length(va.branch_length()) - length(vb.branch_length())).abs() < self.branch_length_tolerance {
            return true;
        }

        (left.depth_position(a) - right.depth_position(b)).abs() < self.coordinate_tolerance
            && (left.order_position(a) - right.order_position(b)).abs() < self.coordinate_tolerance
    }
}
