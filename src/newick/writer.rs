//! Newick format writer for phylogenetic trees.
//!
//! Writes a [PhyloTree] (or one of its subtrees) back to Newick text. A
//! [NewickOverrides] implementation can replace whole subtrees by a single
//! label, which is how collapsed clades end up as pseudo-leaves in the
//! canonical text.

use crate::model::tree::{PhyloTree, VertexIndex};
use crate::newick::defs::BUFFER_CHARS;
use crate::parser::utils::quote_label;

// =#========================================================================#=
// OVERRIDES
// =#========================================================================T=
/// Per-vertex replacements applied while writing.
pub trait NewickOverrides {
    /// Label to write instead of the subtree rooted at `index`, if any.
    ///
    /// The branch length of `index` is still written after the label.
    fn collapsed_label(&self, index: VertexIndex) -> Option<&str>;
}

/// Writes every vertex as-is.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOverrides;

impl NewickOverrides for NoOverrides {
    fn collapsed_label(&self, _index: VertexIndex) -> Option<&str> {
        None
    }
}

// =#========================================================================#=
// WRITER
// =#========================================================================#=
/// Writes the whole tree as a Newick string terminated by `;`.
///
/// # Example
/// ```
/// use cladeshift::newick::{parse_str, writer::{write_tree, NoOverrides}};
///
/// let tree = parse_str("(A:1.0,(B:2,C:3)D:4)root;").unwrap();
/// assert_eq!(write_tree(&tree, &NoOverrides), "(A:1,(B:2,C:3)D:4)root;");
/// ```
pub fn write_tree<O: NewickOverrides + ?Sized>(tree: &PhyloTree, overrides: &O) -> String {
    to_newick(tree, tree.root_index(), overrides, true)
}

/// Writes the subtree rooted at `index`.
///
/// Vertices are written as `(c1,c2,...)name:branch_length`, leaves as
/// `name:branch_length`; names are quoted when needed, missing names and
/// branch lengths are omitted. A `;` is appended if `is_root` is set.
pub fn to_newick<O: NewickOverrides + ?Sized>(
    tree: &PhyloTree,
    index: VertexIndex,
    overrides: &O,
    is_root: bool,
) -> String {
    let mut newick = String::with_capacity(estimate_newick_len(tree));
    write_vertex(tree, index, overrides, &mut newick);
    if is_root {
        newick.push(';');
    }
    newick
}

/// Pending output while writing a subtree.
enum Step {
    /// Write the vertex, or open its group
    Enter(VertexIndex),
    /// Close the group of the vertex and write its name
    Close(VertexIndex),
    Separator,
}

/// Writes the vertex at `index` and its subtree.
fn write_vertex<O: NewickOverrides + ?Sized>(
    tree: &PhyloTree,
    index: VertexIndex,
    overrides: &O,
    newick: &mut String,
) {
    let mut steps = vec![Step::Enter(index)];
    while let Some(step) = steps.pop() {
        match step {
            Step::Separator => newick.push(','),
            Step::Enter(current) => {
                if let Some(label) = overrides.collapsed_label(current) {
                    newick.push_str(&quote_label(label));
                    write_branch_length(tree, current, newick);
                } else if tree[current].is_internal() {
                    newick.push('(');
                    steps.push(Step::Close(current));
                    for (position, &child) in tree[current].children().iter().enumerate().rev() {
                        steps.push(Step::Enter(child));
                        if position > 0 {
                            steps.push(Step::Separator);
                        }
                    }
                } else {
                    write_name_and_length(tree, current, newick);
                }
            }
            Step::Close(current) => {
                newick.push(')');
                write_name_and_length(tree, current, newick);
            }
        }
    }
}

fn write_name_and_length(tree: &PhyloTree, index: VertexIndex, newick: &mut String) {
    if let Some(name) = tree[index].name() {
        newick.push_str(&quote_label(name));
    }
    write_branch_length(tree, index, newick);
}

fn write_branch_length(tree: &PhyloTree, index: VertexIndex, newick: &mut String) {
    if let Some(branch_length) = tree[index].branch_length() {
        newick.push(':');
        newick.push_str(&branch_length.to_string());
    }
}

/// Rough guess of the output length: a name and a branch length per vertex
/// plus structural characters.
fn estimate_newick_len(tree: &PhyloTree) -> usize {
    tree.arena_len() * BUFFER_CHARS
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::newick::parse_str;

    struct CollapseAt(VertexIndex, &'static str);

    impl NewickOverrides for CollapseAt {
        fn collapsed_label(&self, index: VertexIndex) -> Option<&str> {
            (index == self.0).then_some(self.1)
        }
    }

    #[test]
    fn test_write_without_branch_lengths() {
        let tree = parse_str("((A,B),C);").unwrap();
        assert_eq!(write_tree(&tree, &NoOverrides), "((A,B),C);");
    }

    #[test]
    fn test_write_quotes_labels() {
        let tree = parse_str("('foo,bar':1,'it''s':2);").unwrap();
        assert_eq!(write_tree(&tree, &NoOverrides), "('foo,bar':1,'it''s':2);");
    }

    #[test]
    fn test_write_collapsed_subtree_keeps_branch_length() {
        let tree = parse_str("(A:1,(B:2,C:3)D:4)root;").unwrap();
        let d = tree
            .pre_order_iter()
            .find(|v| v.name() == Some("D"))
            .unwrap()
            .index();
        assert_eq!(write_tree(&tree, &CollapseAt(d, "Clade1")), "(A:1,Clade1:4)root;");
    }

    #[test]
    fn test_subtree_without_terminator() {
        let tree = parse_str("(A:1,(B:2,C:3)D:4)root;").unwrap();
        let d = tree.root().children()[1];
        assert_eq!(to_newick(&tree, d, &NoOverrides, false), "(B:2,C:3)D:4");
    }

    #[test]
    fn test_root_branch_length_is_written() {
        let tree = parse_str("(A,B)R:0.5;").unwrap();
        assert_eq!(write_tree(&tree, &NoOverrides), "(A,B)R:0.5;");
    }
}
