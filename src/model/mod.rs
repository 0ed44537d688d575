//! Data model for rooted phylogenetic trees.
//!
//! # Tree representation
//! Trees are represented by [PhyloTree], which uses the arena pattern to
//! store [Vertex] nodes referenced by [VertexIndex]. Vertices have any number
//! of ordered children, an optional name and an optional [BranchLength].
//! Parent links are indices, never references.
//!
//! # Building trees
//! Trees are constructed during parsing via the [TreeBuilder] trait, which
//! decouples the Newick parser from the tree type; [PhyloTreeBuilder]
//! produces a [PhyloTree].
//!
//! # Identifiers
//! A [PhyloTree] carries no identifiers itself. Identifiers ([NodeId]) are
//! assigned per layout pass by [crate::layout] and kept in side tables.

pub mod node_id;
pub mod tree;
pub mod tree_builder;
pub mod vertex;

pub use node_id::{Depth, InvalidNodeId, NodeId};
pub use tree::{PhyloTree, VertexIndex};
pub use tree_builder::{PhyloTreeBuilder, TreeBuilder};
pub use vertex::{BranchLength, Vertex};
