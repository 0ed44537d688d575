//! Vertex module for phylogenetic tree representation.

use crate::model::tree::VertexIndex;
use std::fmt;
use std::ops::Deref;

// =#========================================================================#=
// VERTEX
// =#========================================================================#=
/// Represents a vertex (node) in a phylogenetic tree.
///
/// Unlike a strictly binary model, a vertex may have any number of ordered
/// children. A vertex without children is a leaf; every other vertex,
/// including the root, is internal.
///
/// # Invariants
/// - `index` is the position of the vertex in its arena
/// - `parent` is `None` only for the root (and detached vertices)
/// - `children` are owned exclusively by this vertex, in Newick order
/// - `branch_length` is non-negative if set
#[derive(PartialEq, Debug, Clone)]
pub struct Vertex {
    /// Index of this vertex in the tree arena
    index: VertexIndex,
    /// Index of the parent vertex (back-reference, non-owning)
    parent: Option<VertexIndex>,
    /// Indices of the child vertices in order
    children: Vec<VertexIndex>,
    /// Optional label
    name: Option<String>,
    /// Distance to parent vertex
    branch_length: Option<BranchLength>,
}

impl Vertex {
    /// Creates a new, unattached vertex.
    ///
    /// # Arguments
    /// * `index` - The unique index of this vertex in the tree (arena)
    /// * `name` - Label of the vertex; empty labels are stored as `None`
    /// * `branch_length` - Distance to parent vertex
    pub fn new(index: VertexIndex, name: Option<String>, branch_length: Option<BranchLength>) -> Self {
        Vertex {
            index,
            parent: None,
            children: Vec::new(),
            name: name.filter(|n| !n.is_empty()),
            branch_length,
        }
    }

    /// Returns the index of this vertex.
    pub fn index(&self) -> VertexIndex {
        self.index
    }

    /// Returns the label of this vertex, if any.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Returns the branch length, if set.
    pub fn branch_length(&self) -> Option<BranchLength> {
        self.branch_length
    }

    /// Returns whether this vertex has a [BranchLength].
    pub fn has_branch_length(&self) -> bool {
        self.branch_length.is_some()
    }

    /// Returns the ordered child indices.
    pub fn children(&self) -> &[VertexIndex] {
        &self.children
    }

    /// Returns the index of the parent, or `None` for the root.
    pub fn parent(&self) -> Option<VertexIndex> {
        self.parent
    }

    /// Returns `true` if this vertex has no children.
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// Returns `true` if this vertex has at least one child.
    pub fn is_internal(&self) -> bool {
        !self.children.is_empty()
    }

    pub(crate) fn set_parent(&mut self, parent: Option<VertexIndex>) {
        self.parent = parent;
    }

    pub(crate) fn set_branch_length(&mut self, branch_length: Option<BranchLength>) {
        self.branch_length = branch_length;
    }

    pub(crate) fn children_mut(&mut self) -> &mut Vec<VertexIndex> {
        &mut self.children
    }
}

// =#========================================================================#=
// BRANCH LENGTH
// =#========================================================================#=
/// Branch length in a phylogenetic tree, enforced non-negative.
///
/// Represents the evolutionary distance between a vertex and its parent.
/// The value is guaranteed to be non-negative and finite.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct BranchLength(f64);

impl BranchLength {
    /// Creates a new branch length.
    ///
    /// # Panics
    /// Panics if `length` is negative or not finite.
    pub fn new(length: f64) -> Self {
        Self::try_new(length)
            .unwrap_or_else(|| panic!("Branch length must be non-negative and finite, got {length}"))
    }

    /// Creates a new branch length, or `None` if `length` is negative or not finite.
    pub fn try_new(length: f64) -> Option<Self> {
        (length >= 0.0 && length.is_finite()).then_some(BranchLength(length + 0.0))
    }
}

impl Deref for BranchLength {
    type Target = f64;
    fn deref(&self) -> &f64 {
        &self.0
    }
}

impl fmt::Display for BranchLength {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
