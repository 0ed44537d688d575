//! Newick format parser and writer for phylogenetic trees.
//!
//! This module provides [`NewickParser`] to parse Newick format strings
//! into tree structures through a [`TreeBuilder`](crate::model::TreeBuilder),
//! and the [writer] to turn a tree back into text.
//!
//! # Quick API
//! For simple use cases with default settings:
//! * [`parse_str`] - parses a single string, returns a [`PhyloTree`]
//! * [`write_tree`] - writes a [`PhyloTree`] without overrides
//!
//! # Full API
//! For more control, configure a [`NewickParser`] and provide a [`ByteParser`]:
//! * [`NewickParser::parse_str`] - parse a single tree
//! * [`to_newick`] - write a subtree, optionally replacing collapsed subtrees
//!   via [`NewickOverrides`]
//!
//! # Format
//! The Newick format has the following simple grammar:
//! * `tree ::= vertex ';'`
//! * `vertex ::= leaf | internal_vertex`
//! * `internal_vertex ::= '(' vertex (',' vertex)* ')' [label] [branch_length]`
//! * `leaf ::= label [branch_length]`
//! * `branch_length ::= ':' number`
//!
//! Furthermore:
//! * Labels are unquoted (up to a delimiter) or single-quoted with `''` as
//!   escaped quote
//! * Whitespace can occur between elements,
//!   just not within an unquoted label or a branch_length
//! * Comments are square brackets and can occur anywhere where whitespace is allowed
//! * Branch lengths must be finite and non-negative

mod defs;
mod parser;
pub mod writer;

pub use self::parser::NewickParser;
pub use self::writer::{NewickOverrides, NoOverrides, to_newick, write_tree};

use crate::model::PhyloTree;
use crate::parser::ParsingError;
use crate::parser::byte_parser::ByteParser;

// ============================================================================
// QUICK PARSING API (pub)
// ============================================================================
/// Parses a single Newick string and returns a [`PhyloTree`].
///
/// # Arguments
/// * `newick` - Newick string terminated by `;`
///
/// # Returns
/// * [`PhyloTree`] - The parsed tree
/// * [`ParsingError`] - If the Newick format is invalid
///
/// # Example
/// ```
/// use cladeshift::newick::parse_str;
///
/// let tree = parse_str("((A:0.1,B:0.2):0.3,C:0.4);").unwrap();
/// assert_eq!(tree.num_leaves(), 3);
/// ```
pub fn parse_str<S: AsRef<str>>(newick: S) -> Result<PhyloTree, ParsingError> {
    let mut byte_parser = ByteParser::for_str(newick.as_ref());
    NewickParser::new_defaults().parse_str(&mut byte_parser)
}
