//! Trait for constructing trees during parsing.
//!
//! The [TreeBuilder] trait decouples the
//! [NewickParser](crate::newick::NewickParser) from the concrete tree
//! representation. The parser calls builder methods bottom-up as it reads
//! Newick syntax: children are always added before their parent.
//!
//! # Builder lifecycle
//! ```text
//! Empty ──→ init_next() ──→ Building ──→ add_leaf/add_internal ──→ finish_tree(root) ──→ Empty
//! ```

use crate::model::tree::{PhyloTree, VertexIndex};
use crate::model::vertex::BranchLength;

// =#========================================================================#=
// TREE BUILDER (trait)
// =#========================================================================T=
/// Abstraction for constructing trees during parsing.
pub trait TreeBuilder {
    /// Vertex reference handed back to the parser.
    type VertexIdx: Copy;
    /// Finished tree type.
    type Tree;

    /// Prepares the builder for a new tree.
    fn init_next(&mut self, num_vertices_guess: usize);

    /// Adds a vertex without children.
    fn add_leaf(&mut self, name: Option<String>, branch_length: Option<BranchLength>) -> Self::VertexIdx;

    /// Adds a vertex with the given ordered children.
    fn add_internal(
        &mut self,
        children: Vec<Self::VertexIdx>,
        name: Option<String>,
        branch_length: Option<BranchLength>,
    ) -> Self::VertexIdx;

    /// Finishes the current tree with `root` as its root.
    fn finish_tree(&mut self, root: Self::VertexIdx) -> Self::Tree;
}

// =#========================================================================#=
// PHYLO TREE BUILDER
// =#========================================================================$=
/// [TreeBuilder] producing a [PhyloTree].
#[derive(Debug, Default)]
pub struct PhyloTreeBuilder {
    tree: PhyloTree,
}

impl PhyloTreeBuilder {
    pub fn new() -> Self {
        Self::default()
    }
}

impl TreeBuilder for PhyloTreeBuilder {
    type VertexIdx = VertexIndex;
    type Tree = PhyloTree;

    fn init_next(&mut self, num_vertices_guess: usize) {
        self.tree = PhyloTree::with_capacity(num_vertices_guess);
    }

    fn add_leaf(&mut self, name: Option<String>, branch_length: Option<BranchLength>) -> VertexIndex {
        self.tree.add_vertex(name, branch_length)
    }

    fn add_internal(
        &mut self,
        children: Vec<VertexIndex>,
        name: Option<String>,
        branch_length: Option<BranchLength>,
    ) -> VertexIndex {
        let index = self.tree.add_vertex(name, branch_length);
        self.tree.attach_children(index, children);
        index
    }

    fn finish_tree(&mut self, root: VertexIndex) -> PhyloTree {
        self.tree.set_root(root);
        std::mem::take(&mut self.tree)
    }
}
