//! Chunk and statement trees produced by the parser.
//!
//! Chunks are the flat, one-per-marker view of a template; statements nest
//! them into blocks. Both keep exact source spans so later stages can point
//! back at the template.

use std::fmt::Write;

use serde::Serialize;
use stencil_common::path::{Path, Segment};
use stencil_common::span::Span;

/// A path expression as written inside a marker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum PathChunk {
    /// The path `.` itself.
    Root,
    /// One or more `.word` / `[integer]` segments.
    Chain(Vec<Segment>),
}

impl PathChunk {
    pub fn to_path(&self) -> Path {
        match self {
            PathChunk::Root => Path::root(),
            PathChunk::Chain(segments) => Path::new(segments.clone()),
        }
    }
}

/// One syntactic unit of a template: free text or a single marker.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Chunk {
    Text {
        text: String,
        span: Span,
    },
    /// `{{>name path}}`
    Inline {
        name: String,
        path: PathChunk,
        span: Span,
    },
    /// `{{#name path}}`
    BlockOpen {
        name: String,
        path: PathChunk,
        span: Span,
    },
    /// `{{:name}}`
    BlockClause {
        name: String,
        span: Span,
    },
    /// `{{/name}}`
    BlockClose {
        name: String,
        span: Span,
    },
}

impl Chunk {
    pub fn span(&self) -> Span {
        match self {
            Chunk::Text { span, .. }
            | Chunk::Inline { span, .. }
            | Chunk::BlockOpen { span, .. }
            | Chunk::BlockClause { span, .. }
            | Chunk::BlockClose { span, .. } => *span,
        }
    }
}

/// A node of the statement tree.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Statement {
    Text {
        text: String,
        span: Span,
    },
    Inline {
        name: String,
        path: Path,
        span: Span,
    },
    Block(Block),
}

impl Statement {
    pub fn span(&self) -> Span {
        match self {
            Statement::Text { span, .. } | Statement::Inline { span, .. } => *span,
            Statement::Block(block) => block.span,
        }
    }
}

/// `{{#name path}} statements {{:clause}} ... {{/name}}`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Block {
    pub name: String,
    pub path: Path,
    pub statements: Vec<Statement>,
    pub clauses: Vec<Clause>,
    /// Span of the opening tag alone.
    pub open: Span,
    /// Span from the opening tag through the closing tag.
    pub span: Span,
}

/// An alternate section of a block, introduced by `{{:name}}`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Clause {
    pub name: String,
    pub statements: Vec<Statement>,
    pub span: Span,
}

/// Render a statement tree as an indented outline, one node per line.
///
/// Used for snapshot tests and the `dump` command.
pub fn debug_tree(statements: &[Statement]) -> String {
    let mut out = String::new();
    for statement in statements {
        write_statement(&mut out, statement, 0);
    }
    out
}

fn write_statement(out: &mut String, statement: &Statement, depth: usize) {
    let indent = "  ".repeat(depth);
    let span = statement.span();
    match statement {
        Statement::Text { text, .. } => {
            let _ = writeln!(
                out,
                "{indent}Text {text:?} @{}..{}",
                span.start.offset, span.end.offset
            );
        }
        Statement::Inline { name, path, .. } => {
            let _ = writeln!(
                out,
                "{indent}Inline {name} {path} @{}..{}",
                span.start.offset, span.end.offset
            );
        }
        Statement::Block(block) => {
            let _ = writeln!(
                out,
                "{indent}Block {} {} @{}..{}",
                block.name, block.path, span.start.offset, span.end.offset
            );
            for child in &block.statements {
                write_statement(out, child, depth + 1);
            }
            for clause in &block.clauses {
                let _ = writeln!(
                    out,
                    "{indent}  Clause {} @{}..{}",
                    clause.name, clause.span.start.offset, clause.span.end.offset
                );
                for child in &clause.statements {
                    write_statement(out, child, depth + 2);
                }
            }
        }
    }
}
