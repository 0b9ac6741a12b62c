//! Recursive statement parser over the chunk stream.
//!
//! Text and inline chunks become leaf statements. A block-open chunk
//! recurses for its body, then collects `{{:clause}}` sections (each with its
//! own body) until the matching `{{/name}}`. Parsing is fail-fast: the first
//! error ends the parse.
//!
//! Every later stage recurses once per path segment, so the parser bounds
//! nesting. The depth of a marker is its own path length plus, for each
//! enclosing block, that block's path length and one more for the block
//! itself. This is never less than the length of the path the marker
//! resolves to, nor than the number of enclosing blocks.

pub(crate) mod chunker;

use std::collections::VecDeque;

use stencil_common::path::Path;
use stencil_common::span::{Position, Span};

use crate::ast::{Block, Chunk, Clause, Statement};
use crate::error::ParseError;

/// The deepest a marker may be nested, as measured above.
pub const MAX_DEPTH: usize = 256;

/// Build the statement tree for a chunk stream that ended at `end`.
pub fn parse_statements(chunks: Vec<Chunk>, end: Position) -> Result<Vec<Statement>, ParseError> {
    let mut parser = Parser {
        chunks: chunks.into(),
        end,
    };
    let statements = parser.body(0)?;
    match parser.chunks.pop_front() {
        None => Ok(statements),
        Some(Chunk::BlockClause { name, span }) => Err(ParseError::StrayClause { name, span }),
        Some(Chunk::BlockClose { name, span }) => Err(ParseError::StrayClose { name, span }),
        Some(other) => unreachable!("body() stops only at clause, close or end: {other:?}"),
    }
}

struct Parser {
    chunks: VecDeque<Chunk>,
    /// Where input ran out, for unclosed-block errors.
    end: Position,
}

impl Parser {
    /// Statements up to (not including) the next clause, close or end of
    /// input, for a body nested `depth` deep.
    fn body(&mut self, depth: usize) -> Result<Vec<Statement>, ParseError> {
        let mut statements = Vec::new();
        loop {
            match self.chunks.front() {
                None | Some(Chunk::BlockClause { .. }) | Some(Chunk::BlockClose { .. }) => {
                    return Ok(statements)
                }
                Some(_) => {}
            }
            let statement = match self.chunks.pop_front() {
                Some(Chunk::Text { text, span }) => Statement::Text { text, span },
                Some(Chunk::Inline { name, path, span }) => {
                    let path = path.to_path();
                    check_depth(depth + path.len(), span)?;
                    Statement::Inline { name, path, span }
                }
                Some(Chunk::BlockOpen { name, path, span }) => {
                    let path = path.to_path();
                    let inner = depth + path.len() + 1;
                    check_depth(inner, span)?;
                    Statement::Block(self.block(name, path, span, inner)?)
                }
                other => unreachable!("checked above: {other:?}"),
            };
            statements.push(statement);
        }
    }

    fn block(
        &mut self,
        name: String,
        path: Path,
        open: Span,
        depth: usize,
    ) -> Result<Block, ParseError> {
        let statements = self.body(depth)?;
        let mut clauses = Vec::new();

        loop {
            match self.chunks.pop_front() {
                Some(Chunk::BlockClause {
                    name: clause_name,
                    span,
                }) => {
                    let body = self.body(depth)?;
                    let span = body.iter().fold(span, |acc, s| acc.merge(s.span()));
                    clauses.push(Clause {
                        name: clause_name,
                        statements: body,
                        span,
                    });
                }
                Some(Chunk::BlockClose {
                    name: close_name,
                    span,
                }) => {
                    if close_name != name {
                        return Err(ParseError::MismatchedClosingTag {
                            expected: name,
                            found: close_name,
                            open,
                            span,
                        });
                    }
                    return Ok(Block {
                        name,
                        path,
                        statements,
                        clauses,
                        open,
                        span: open.merge(span),
                    });
                }
                None => {
                    return Err(ParseError::UnclosedBlock {
                        name,
                        open,
                        span: Span::point(self.end),
                    })
                }
                Some(other) => unreachable!("body() stops only at clause, close or end: {other:?}"),
            }
        }
    }
}

fn check_depth(depth: usize, span: Span) -> Result<(), ParseError> {
    if depth > MAX_DEPTH {
        return Err(ParseError::TooDeep {
            limit: MAX_DEPTH,
            span,
        });
    }
    Ok(())
}
