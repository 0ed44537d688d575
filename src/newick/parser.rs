//! Structs and logic to parse Newick strings.
//!
//! This module provides the [NewickParser] struct, which parses a single
//! Newick tree from a [ByteParser] into any [TreeBuilder] output.

use crate::model::tree_builder::{PhyloTreeBuilder, TreeBuilder};
use crate::model::vertex::BranchLength;
use crate::newick::defs::{DEFAULT_NUM_VERTICES_GUESS, NEWICK_LABEL_DELIMITERS};
use crate::parser::byte_parser::ByteParser;
use crate::parser::byte_source::ByteSource;
use crate::parser::parsing_error::ParsingError;

// =#========================================================================#=
// NEWICK PARSER
// =#========================================================================$=
/// Parser (configuration) for single Newick format phylogenetic trees.
///
/// Generic over [TreeBuilder] (construction). Accepts groups with any number
/// of children, names on internal vertices and the root, and optional branch
/// lengths everywhere including the root.
///
/// # Configuration
/// * [`with_num_vertices(num_vertices)`](Self::with_num_vertices)
///     - Capacity hint for the tree arena.
///
/// # Example
/// ```
/// use cladeshift::newick::NewickParser;
/// use cladeshift::parser::ByteParser;
///
/// let mut byte_parser = ByteParser::for_str("(A:1,(B:2,C:3)D:4)root;");
/// let tree = NewickParser::new_defaults().parse_str(&mut byte_parser).unwrap();
/// assert_eq!(tree.num_leaves(), 3);
/// assert_eq!(tree.root().name(), Some("root"));
/// ```
pub struct NewickParser<T: TreeBuilder> {
    num_vertices: usize,
    tree_builder: T,
}

// ============================================================================
// Construction & Configuration (pub)
// ============================================================================
impl<T: TreeBuilder> NewickParser<T> {
    /// Creates a new [NewickParser] with the given tree builder.
    pub fn new(tree_builder: T) -> Self {
        Self {
            num_vertices: DEFAULT_NUM_VERTICES_GUESS,
            tree_builder,
        }
    }

    /// Sets the expected number of vertices, used to pre-allocate the arena.
    pub fn with_num_vertices(mut self, num_vertices: usize) -> Self {
        self.num_vertices = num_vertices;
        self
    }
}

impl NewickParser<PhyloTreeBuilder> {
    /// Creates a new [NewickParser] producing [PhyloTree](crate::model::PhyloTree)s.
    pub fn new_defaults() -> Self {
        Self::new(PhyloTreeBuilder::new())
    }
}

impl Default for NewickParser<PhyloTreeBuilder> {
    fn default() -> Self {
        Self::new_defaults()
    }
}

// ============================================================================
// API Parsing (pub)
// ============================================================================
impl<T: TreeBuilder> NewickParser<T> {
    /// Parses a single Newick tree from the given [ByteParser].
    ///
    /// The tree must be terminated by `;` and only whitespace or comments
    /// may follow it.
    ///
    /// # Returns
    /// * `Ok(T::Tree)` - The parsed phylogenetic tree
    /// * `Err(ParsingError)` - If the Newick format is invalid
    pub fn parse_str<B: ByteSource>(
        &mut self,
        parser: &mut ByteParser<B>,
    ) -> Result<T::Tree, ParsingError> {
        self.tree_builder.init_next(self.num_vertices);

        parser.skip_comment_and_whitespace()?;
        if parser.is_eof() {
            return Err(ParsingError::unexpected_eof(parser));
        }

        let root = self.parse_vertex(parser)?;

        // Consume the terminating semicolon
        parser.skip_comment_and_whitespace()?;
        if !parser.consume_if(b';') {
            let next_char = parser.peek().map(char::from);
            return Err(ParsingError::invalid_newick_string(
                parser,
                format!("Expected ';' at end of tree but found {:?}", next_char),
            ));
        }

        parser.skip_comment_and_whitespace()?;
        if !parser.is_eof() {
            return Err(ParsingError::invalid_newick_string(
                parser,
                "Unexpected content after ';'".to_string(),
            ));
        }

        Ok(self.tree_builder.finish_tree(root))
    }
}

// ============================================================================
// Parsing
// ============================================================================
impl<T: TreeBuilder> NewickParser<T> {
    /// Parses a vertex (either internal vertex or leaf) with its subtree and
    /// returns its index:
    /// - `(children)[name][:branch_length]` if it starts with `(`
    /// - `name[:branch_length]` otherwise
    ///
    /// Nesting is tracked on an explicit stack of open groups, so depth is
    /// bounded by memory only.
    fn parse_vertex<B: ByteSource>(
        &mut self,
        parser: &mut ByteParser<B>,
    ) -> Result<T::VertexIdx, ParsingError> {
        // Children read so far, one entry per unclosed '('
        let mut open_groups: Vec<Vec<T::VertexIdx>> = Vec::new();

        loop {
            parser.skip_comment_and_whitespace()?;
            if parser.consume_if(b'(') {
                open_groups.push(Vec::new());
                continue;
            }

            let name = self.parse_name(parser)?;
            let branch_length = self.parse_branch_length(parser)?;
            let mut vertex = self.tree_builder.add_leaf(name, branch_length);

            // Close groups until a sibling follows or the outermost vertex is done
            loop {
                let Some(mut children) = open_groups.pop() else {
                    return Ok(vertex);
                };
                children.push(vertex);

                parser.skip_comment_and_whitespace()?;
                match parser.peek() {
                    Some(b',') => {
                        parser.next_byte();
                        open_groups.push(children);
                        break;
                    }
                    Some(b')') => {
                        parser.next_byte();
                        let name = self.parse_name(parser)?;
                        let branch_length = self.parse_branch_length(parser)?;
                        vertex = self.tree_builder.add_internal(children, name, branch_length);
                    }
                    None => return Err(ParsingError::unexpected_eof(parser)),
                    Some(other) => {
                        return Err(ParsingError::invalid_newick_string(
                            parser,
                            format!("Expected ',' or ')' between children but found {:?}", char::from(other)),
                        ));
                    }
                }
            }
        }
    }

    /// Parses an optional (quoted or unquoted) name; empty names become `None`.
    fn parse_name<B: ByteSource>(
        &mut self,
        parser: &mut ByteParser<B>,
    ) -> Result<Option<String>, ParsingError> {
        let label = parser.parse_label(NEWICK_LABEL_DELIMITERS)?;
        Ok(Some(label).filter(|l| !l.is_empty()))
    }

    /// Parses optional branch length `[:number]`:
    /// - Skips comments/whitespace before and after `:`
    /// - Supports scientific notation (e.g., `1.5e-10`)
    ///
    /// # Returns
    /// - `Ok(Some(branch_length))` if found a branch length and was able to parse it
    /// - `Ok(None)` if no branch length found
    /// - [ParsingError] if the value is malformed, negative or not finite
    fn parse_branch_length<B: ByteSource>(
        &mut self,
        parser: &mut ByteParser<B>,
    ) -> Result<Option<BranchLength>, ParsingError> {
        parser.skip_comment_and_whitespace()?;
        if !parser.consume_if(b':') {
            return Ok(None);
        }
        parser.skip_comment_and_whitespace()?;

        let mut branch_length_str = String::new();
        while let Some(b) = parser.peek() {
            // Valid characters for a float: digits, '.', '-', '+', 'e', 'E'
            if b.is_ascii_digit() || matches!(b, b'.' | b'-' | b'+' | b'e' | b'E') {
                branch_length_str.push(char::from(b));
                parser.next_byte();
            } else {
                break;
            }
        }

        let value: f64 = branch_length_str.parse().map_err(|_| {
            ParsingError::invalid_branch_length(parser, format!("cannot parse {:?}", branch_length_str))
        })?;

        BranchLength::try_new(value).map(Some).ok_or_else(|| {
            ParsingError::invalid_branch_length(parser, format!("{value} is negative or not finite"))
        })
    }
}
