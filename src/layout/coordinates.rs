//! Coordinate pass: depth (x) and order (y) positions plus leaf ids.

use crate::layout::config::OrderMode;
use crate::model::{NodeId, PhyloTree, VertexIndex};

/// Result of the coordinate pass, indexed by [VertexIndex].
#[derive(Debug, Clone)]
pub(crate) struct Coordinates {
    pub(crate) x: Vec<f64>,
    pub(crate) y: Vec<f64>,
    pub(crate) leaf_ids: Vec<Option<NodeId>>,
    pub(crate) node_order: Vec<String>,
    pub(crate) uses_branch_lengths: bool,
}

/// Computes x and y for every reachable vertex and numbers the leaves.
///
/// x is the cumulative branch length from the root if every leaf has a
/// branch length (a missing branch length counts as 0), unit depth
/// otherwise. `depth_mode` forces one of the two.
pub(crate) fn compute(tree: &PhyloTree, order: OrderMode, depth_mode: Option<bool>) -> Coordinates {
    let len = tree.arena_len();
    let uses_branch_lengths = depth_mode.unwrap_or_else(|| tree.leaves_have_branch_lengths());

    let mut x = vec![0.0; len];
    let mut leaf_ids = vec![None; len];
    let mut leaf_counter = 0;
    for vertex in tree.pre_order_iter() {
        if let Some(parent) = vertex.parent() {
            let step = if uses_branch_lengths {
                vertex.branch_length().map_or(0.0, |bl| *bl)
            } else {
                1.0
            };
            x[vertex.index()] = x[parent] + step;
        }
        if vertex.is_leaf() {
            leaf_counter += 1;
            leaf_ids[vertex.index()] = Some(NodeId::Leaf(leaf_counter));
        }
    }

    let mut node_order = Vec::new();
    let y = match order {
        OrderMode::LeafDriven => leaf_driven_y(tree),
        OrderMode::InternalLabeled => internal_labeled_y(tree, &mut node_order),
    };

    Coordinates {
        x,
        y,
        leaf_ids,
        node_order,
        uses_branch_lengths,
    }
}

fn leaf_driven_y(tree: &PhyloTree) -> Vec<f64> {
    let mut y = vec![0.0; tree.arena_len()];
    let mut next = 0.0;
    for vertex in tree.post_order_iter() {
        y[vertex.index()] = if vertex.is_leaf() {
            next += 1.0;
            next - 1.0
        } else {
            mean(vertex.children().iter().map(|&c| y[c]))
        };
    }
    y
}

fn internal_labeled_y(tree: &PhyloTree, node_order: &mut Vec<String>) -> Vec<f64> {
    let mut numbering = Numbering {
        tree,
        y: vec![None; tree.arena_len()],
        next: 0.0,
        node_order,
    };
    let root = tree.root_index();
    numbering.walk(root);

    let root_y = mean(tree[root].children().iter().map(|&c| numbering.y[c].unwrap_or(0.0)));
    numbering.y[root] = Some(root_y);
    numbering.y.into_iter().map(|y| y.unwrap_or(0.0)).collect()
}

/// State of the internal-labeled numbering walk.
struct Numbering<'a> {
    tree: &'a PhyloTree,
    y: Vec<Option<f64>>,
    next: f64,
    node_order: &'a mut Vec<String>,
}

impl Numbering<'_> {
    /// Numbers each child after its own subtree; the parent is numbered
    /// right after its first child, unless it is the root.
    fn walk(&mut self, root: VertexIndex) {
        let tree = self.tree;
        // (vertex, position of the next child to descend into)
        let mut stack = vec![(root, 0)];
        while let Some((index, next)) = stack.pop() {
            if next > 0 {
                self.number(tree[index].children()[next - 1]);
                if index != root {
                    self.number(index);
                }
            }
            if let Some(&child) = tree[index].children().get(next) {
                stack.push((index, next + 1));
                stack.push((child, 0));
            }
        }
    }

    fn number(&mut self, index: VertexIndex) {
        if self.y[index].is_none() {
            self.y[index] = Some(self.next);
            self.next += 1.0;
            self.node_order
                .push(self.tree[index].name().unwrap_or_default().to_string());
        }
    }
}

fn mean(values: impl Iterator<Item = f64>) -> f64 {
    let (sum, count) = values.fold((0.0, 0usize), |(sum, count), v| (sum + v, count + 1));
    if count == 0 { 0.0 } else { sum / count as f64 }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::newick::parse_str;

    fn index_of(tree: &PhyloTree, name: &str) -> VertexIndex {
        tree.pre_order_iter()
            .find(|v| v.name() == Some(name))
            .unwrap()
            .index()
    }

    #[test]
    fn test_branch_length_depths() {
        let tree = parse_str("(A:1,(B:2,C:3)D:4)root;").unwrap();
        let coords = compute(&tree, OrderMode::LeafDriven, None);
        assert!(coords.uses_branch_lengths);
        assert_eq!(coords.x[index_of(&tree, "D")], 4.0);
        assert_eq!(coords.x[index_of(&tree, "B")], 6.0);
        assert_eq!(coords.x[index_of(&tree, "C")], 7.0);
        assert_eq!(coords.x[tree.root_index()], 0.0);
    }

    #[test]
    fn test_unit_depths_when_a_leaf_lacks_length() {
        let tree = parse_str("(A:1,(B,C:3)D:4)root;").unwrap();
        let coords = compute(&tree, OrderMode::LeafDriven, None);
        assert!(!coords.uses_branch_lengths);
        assert_eq!(coords.x[index_of(&tree, "D")], 1.0);
        assert_eq!(coords.x[index_of(&tree, "C")], 2.0);
    }

    #[test]
    fn test_leaf_driven_means() {
        let tree = parse_str("(A,(B,C)D)root;").unwrap();
        let coords = compute(&tree, OrderMode::LeafDriven, None);
        assert_eq!(coords.y[index_of(&tree, "A")], 0.0);
        assert_eq!(coords.y[index_of(&tree, "B")], 1.0);
        assert_eq!(coords.y[index_of(&tree, "C")], 2.0);
        assert_eq!(coords.y[index_of(&tree, "D")], 1.5);
        assert_eq!(coords.y[tree.root_index()], 0.75);
        assert_eq!(coords.leaf_ids[index_of(&tree, "C")], Some(NodeId::Leaf(3)));
    }

    #[test]
    fn test_internal_labeled_numbers_parent_after_first_child() {
        let tree = parse_str("(A,(B,C)D)root;").unwrap();
        let coords = compute(&tree, OrderMode::InternalLabeled, None);
        assert_eq!(coords.y[index_of(&tree, "A")], 0.0);
        assert_eq!(coords.y[index_of(&tree, "B")], 1.0);
        assert_eq!(coords.y[index_of(&tree, "D")], 2.0);
        assert_eq!(coords.y[index_of(&tree, "C")], 3.0);
        assert_eq!(coords.y[tree.root_index()], 1.0);
        assert_eq!(coords.node_order, vec!["A", "B", "D", "C"]);
    }

    #[test]
    fn test_forced_depth_mode() {
        let tree = parse_str("(A:1,D)root;").unwrap();
        assert!(!compute(&tree, OrderMode::LeafDriven, None).uses_branch_lengths);

        let coords = compute(&tree, OrderMode::LeafDriven, Some(true));
        assert!(coords.uses_branch_lengths);
        assert_eq!(coords.x[index_of(&tree, "A")], 1.0);
        assert_eq!(coords.x[index_of(&tree, "D")], 0.0);
    }

    #[test]
    fn test_deep_nesting_internal_labeled() {
        let depth = 100_000;
        let newick = format!("{}A{};", "(".repeat(depth), ")".repeat(depth));
        let tree = parse_str(&newick).unwrap();
        let coords = compute(&tree, OrderMode::InternalLabeled, None);
        assert_eq!(coords.node_order.len(), depth);
        assert_eq!(coords.x[index_of(&tree, "A")], depth as f64);
    }
}
