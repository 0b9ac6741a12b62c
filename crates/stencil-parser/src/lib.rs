//! Stencil parser: tokens -> chunks -> statement tree.
//!
//! The chunker groups the lexer's token stream into one chunk per marker
//! (or run of free text), parsing path expressions along the way. The
//! statement parser then nests those chunks into blocks and clauses,
//! checking that every block is closed by a tag of the same name.

pub mod ast;
pub mod error;
mod parser;

pub use ast::{debug_tree, Block, Chunk, Clause, PathChunk, Statement};
pub use error::ParseError;
pub use parser::chunker::{chunk, Chunks};
pub use parser::{parse_statements, MAX_DEPTH};

use stencil_lexer::Lexer;

/// Parse template source into its statement tree.
///
/// This is the main entry point for the parser. It lexes the source,
/// chunks the token stream and nests the chunks, stopping at the first
/// lexical or syntax error.
pub fn parse(source: &str) -> Result<Vec<Statement>, ParseError> {
    let Chunks { chunks, end } = chunk(Lexer::tokenize(source))?;
    parse_statements(chunks, end)
}
