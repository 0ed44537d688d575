//! Tree module for phylogenetic tree representation.
//!
//! This module provides [PhyloTree], an arena of [Vertex] values referenced by
//! [VertexIndex], together with the structural edits the edit engine needs
//! (detaching, splicing and grafting subtrees) and stack-based traversals.

use crate::model::vertex::{BranchLength, Vertex};

/// Index of a vertex in a tree (arena).
pub type VertexIndex = usize;

/// *During construction only*, index for unset root.
const NO_ROOT_SET_INDEX: VertexIndex = usize::MAX;

// =#========================================================================#=
// TREE
// =#========================================================================#=
/// A rooted phylogenetic tree with ordered, arbitrarily many children per
/// vertex, represented using the arena pattern on [Vertex].
///
/// # Structure
/// - All vertices are stored in the arena and referenced by [VertexIndex]
/// - Parent links are indices, so no reference cycles exist
/// - Structural edits may leave unreachable vertices in the arena; all
///   counts and traversals start from the root and ignore them
///
/// # Example
/// ```
/// use cladeshift::model::{BranchLength, PhyloTree};
///
/// // (A:1,B:2)root;
/// let mut tree = PhyloTree::new();
/// let a = tree.add_vertex(Some("A".to_string()), Some(BranchLength::new(1.0)));
/// let b = tree.add_vertex(Some("B".to_string()), Some(BranchLength::new(2.0)));
/// let root = tree.add_vertex(Some("root".to_string()), None);
/// tree.attach_children(root, vec![a, b]);
/// tree.set_root(root);
///
/// assert_eq!(tree.num_leaves(), 2);
/// assert_eq!(tree[a].parent(), Some(root));
/// ```
#[derive(Debug, Clone)]
pub struct PhyloTree {
    /// Vertices of this tree (arena pattern)
    vertices: Vec<Vertex>,

    /// Index of the root of this tree
    root_index: VertexIndex,
}

impl Default for PhyloTree {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Construction, Getters / Accessors (pub)
// ============================================================================
impl PhyloTree {
    /// Creates a new, empty tree without root.
    pub fn new() -> Self {
        PhyloTree {
            vertices: Vec::new(),
            root_index: NO_ROOT_SET_INDEX,
        }
    }

    /// Creates a new, empty tree with capacity for `num_vertices` vertices.
    pub fn with_capacity(num_vertices: usize) -> Self {
        PhyloTree {
            vertices: Vec::with_capacity(num_vertices),
            root_index: NO_ROOT_SET_INDEX,
        }
    }

    /// Adds an unattached vertex to the arena and returns its index.
    pub fn add_vertex(&mut self, name: Option<String>, branch_length: Option<BranchLength>) -> VertexIndex {
        let index = self.vertices.len();
        self.vertices.push(Vertex::new(index, name, branch_length));
        index
    }

    /// Appends `children` (in order) to the children of `parent`.
    pub fn attach_children(&mut self, parent: VertexIndex, children: Vec<VertexIndex>) {
        for &child in &children {
            self[child].set_parent(Some(parent));
        }
        self[parent].children_mut().extend(children);
    }

    /// Makes `index` the root of this tree.
    pub fn set_root(&mut self, index: VertexIndex) {
        self[index].set_parent(None);
        self.root_index = index;
    }

    /// Returns whether root of tree has been set.
    pub fn is_root_set(&self) -> bool {
        self.root_index != NO_ROOT_SET_INDEX
    }

    /// Returns the index of the root.
    pub fn root_index(&self) -> VertexIndex {
        self.root_index
    }

    /// Returns a reference to the root vertex.
    ///
    /// # Panics
    /// Panics if the root hasn't been set and thus tree hasn't been fully constructed yet.
    pub fn root(&self) -> &Vertex {
        &self[self.root_index]
    }

    /// Returns a reference to the vertex at the given index.
    pub fn vertex(&self, index: VertexIndex) -> &Vertex {
        &self[index]
    }

    /// Returns the number of arena slots, including detached vertices.
    pub fn arena_len(&self) -> usize {
        self.vertices.len()
    }

    /// Returns the number of leaves reachable from the root.
    pub fn num_leaves(&self) -> usize {
        self.pre_order_iter().filter(|v| v.is_leaf()).count()
    }

    /// Returns the number of internal vertices reachable from the root, root included.
    pub fn num_internal(&self) -> usize {
        self.pre_order_iter().filter(|v| v.is_internal()).count()
    }

    /// Returns the number of vertices reachable from the root.
    pub fn num_vertices(&self) -> usize {
        self.pre_order_iter().count()
    }

    /// Checks if every reachable leaf has a branch length.
    pub fn leaves_have_branch_lengths(&self) -> bool {
        self.pre_order_iter()
            .filter(|v| v.is_leaf())
            .all(|v| v.has_branch_length())
    }

    /// Returns the position of `index` among its parent's children,
    /// or `None` for the root.
    pub fn sibling_index(&self, index: VertexIndex) -> Option<usize> {
        let parent = self[index].parent()?;
        self[parent].children().iter().position(|&c| c == index)
    }

    /// Returns all vertices strictly below `index`, in pre-order.
    pub fn descendants(&self, index: VertexIndex) -> Vec<VertexIndex> {
        let mut descendants = Vec::new();
        let mut stack: Vec<VertexIndex> = self[index].children().iter().rev().copied().collect();
        while let Some(current) = stack.pop() {
            descendants.push(current);
            stack.extend(self[current].children().iter().rev());
        }
        descendants
    }

    /// Returns the number of leaves in the subtree of every vertex,
    /// indexed by [VertexIndex] (zero for unreachable vertices).
    pub fn subtree_leaf_counts(&self) -> Vec<usize> {
        let mut counts = vec![0; self.vertices.len()];
        for vertex in self.post_order_iter() {
            counts[vertex.index()] = if vertex.is_leaf() {
                1
            } else {
                vertex.children().iter().map(|&c| counts[c]).sum()
            };
        }
        counts
    }
}

// ============================================================================
// Structural edits (pub)
// ============================================================================
impl PhyloTree {
    /// Removes `index` from its parent's children.
    ///
    /// # Returns
    /// The former parent and position, or `None` if `index` had no parent.
    pub fn detach(&mut self, index: VertexIndex) -> Option<(VertexIndex, usize)> {
        let parent = self[index].parent()?;
        let position = self[parent].children().iter().position(|&c| c == index)?;
        self[parent].children_mut().remove(position);
        self[index].set_parent(None);
        Some((parent, position))
    }

    /// Puts `replacement` in the slot `old` occupies in its parent's children,
    /// or makes it the root if `old` is the root.
    pub fn replace(&mut self, old: VertexIndex, replacement: VertexIndex) {
        match self[old].parent() {
            Some(parent) => {
                if let Some(slot) = self[parent].children_mut().iter_mut().find(|c| **c == old) {
                    *slot = replacement;
                }
                self[replacement].set_parent(Some(parent));
                self[old].set_parent(None);
            }
            None => self.set_root(replacement),
        }
    }

    /// Sets the branch length of the vertex at `index`.
    pub fn set_branch_length(&mut self, index: VertexIndex, branch_length: Option<BranchLength>) {
        self[index].set_branch_length(branch_length);
    }

    /// Copies the reachable part of `subtree` into this arena and puts its
    /// root in the slot of `at` (see [replace](Self::replace)).
    ///
    /// # Returns
    /// The index of the copied subtree root in this tree.
    pub fn graft(&mut self, at: VertexIndex, subtree: &PhyloTree) -> VertexIndex {
        let offset = self.vertices.len();
        let mut mapping = vec![NO_ROOT_SET_INDEX; subtree.vertices.len()];

        let order: Vec<VertexIndex> = subtree.pre_order_iter().map(|v| v.index()).collect();
        for (i, &old) in order.iter().enumerate() {
            mapping[old] = offset + i;
        }
        for &old in &order {
            let source = &subtree[old];
            let copied = self.add_vertex(source.name().map(str::to_string), source.branch_length());
            *self[copied].children_mut() = source.children().iter().map(|&c| mapping[c]).collect();
            if let Some(parent) = source.parent() {
                self[copied].set_parent(Some(mapping[parent]));
            }
        }

        let grafted_root = mapping[subtree.root_index];
        self.replace(at, grafted_root);
        grafted_root
    }

    /// Stable-sorts the children of every vertex by the number of leaves
    /// below them.
    pub fn sort_children_by_leaf_count(&mut self, descending: bool) {
        let counts = self.subtree_leaf_counts();
        let internal: Vec<VertexIndex> = self
            .pre_order_iter()
            .filter(|v| v.is_internal())
            .map(|v| v.index())
            .collect();
        for index in internal {
            let children = self[index].children_mut();
            if descending {
                children.sort_by(|a, b| counts[*b].cmp(&counts[*a]));
            } else {
                children.sort_by_key(|c| counts[*c]);
            }
        }
    }

    /// Returns an iterator over the tree in post-order (children before parents).
    pub fn post_order_iter(&self) -> PostOrderIter<'_> {
        PostOrderIter::new(self)
    }

    /// Returns an iterator over the tree in pre-order (parents before
    /// children, children left to right).
    pub fn pre_order_iter(&self) -> PreOrderIter<'_> {
        PreOrderIter::new(self)
    }
}

impl std::ops::Index<VertexIndex> for PhyloTree {
    type Output = Vertex;

    fn index(&self, index: VertexIndex) -> &Self::Output {
        &self.vertices[index]
    }
}

impl std::ops::IndexMut<VertexIndex> for PhyloTree {
    fn index_mut(&mut self, index: VertexIndex) -> &mut Self::Output {
        &mut self.vertices[index]
    }
}

// =#========================================================================#=
// ITERATORS
// =#========================================================================#=
/// Iterator for post-order traversal (children before parents).
///
/// This iterator uses a stack-based approach to traverse the tree without recursion.
pub struct PostOrderIter<'a> {
    tree: &'a PhyloTree,
    stack: Vec<(VertexIndex, bool)>, // (index, children_visited)
}

impl<'a> PostOrderIter<'a> {
    fn new(tree: &'a PhyloTree) -> Self {
        let mut stack = Vec::new();
        if tree.is_root_set() {
            stack.push((tree.root_index, false));
        }
        PostOrderIter { tree, stack }
    }
}

impl<'a> Iterator for PostOrderIter<'a> {
    type Item = &'a Vertex;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some((index, children_visited)) = self.stack.pop() {
            let vertex = &self.tree[index];

            if children_visited || vertex.is_leaf() {
                return Some(vertex);
            }

            self.stack.push((index, true));
            // Push children in reverse, so leftmost is processed first
            for &child in vertex.children().iter().rev() {
                self.stack.push((child, false));
            }
        }
        None
    }
}

/// Iterator for pre-order traversal (parents before children).
pub struct PreOrderIter<'a> {
    tree: &'a PhyloTree,
    stack: Vec<VertexIndex>,
}

impl<'a> PreOrderIter<'a> {
    fn new(tree: &'a PhyloTree) -> Self {
        let mut stack = Vec::new();
        if tree.is_root_set() {
            stack.push(tree.root_index);
        }
        PreOrderIter { tree, stack }
    }
}

impl<'a> Iterator for PreOrderIter<'a> {
    type Item = &'a Vertex;

    fn next(&mut self) -> Option<Self::Item> {
        let index = self.stack.pop()?;
        let vertex = &self.tree[index];
        self.stack.extend(vertex.children().iter().rev());
        Some(vertex)
    }
}
