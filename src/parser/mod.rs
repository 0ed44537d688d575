//! Low-level parsing infrastructure for Newick text.
//!
//! Provides the [ByteParser] with its byte sources, error reporting via
//! [ParsingError], and label quoting utilities shared with the writer.

pub mod byte_parser;
pub mod byte_source;
pub mod parsing_error;
pub mod utils;

pub use byte_parser::ByteParser;
pub use parsing_error::{ParsingError, ParsingErrorType};
