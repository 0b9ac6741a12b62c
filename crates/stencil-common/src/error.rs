use std::fmt;

use serde::Serialize;

use crate::span::Span;

/// A lexical error with location information.
///
/// The lexer itself never fails: it emits a `TokenKind::Error` token and
/// stops. The chunker turns that token into a `LexError`, which is fatal to
/// the parse.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LexError {
    pub kind: LexErrorKind,
    pub span: Span,
}

impl LexError {
    pub fn new(kind: LexErrorKind, span: Span) -> Self {
        Self { kind, span }
    }

    /// Stable diagnostic code.
    pub fn code(&self) -> &'static str {
        match self.kind {
            LexErrorKind::UnclosedAction => "L0001",
            LexErrorKind::UnknownSymbol(_) => "L0002",
        }
    }

    /// One-line headline for reports.
    pub fn title(&self) -> &'static str {
        match self.kind {
            LexErrorKind::UnclosedAction => "Unclosed action",
            LexErrorKind::UnknownSymbol(_) => "Unknown symbol",
        }
    }
}

/// The specific kind of lexical error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum LexErrorKind {
    /// A `{{` was not followed by `}}` before a newline or end of input.
    UnclosedAction,
    /// A character outside the in-marker vocabulary appeared inside `{{ }}`.
    UnknownSymbol(char),
}

impl fmt::Display for LexErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnclosedAction => write!(f, "unclosed action"),
            Self::UnknownSymbol(c) => write!(f, "unknown symbol {c:?}"),
        }
    }
}

impl fmt::Display for LexError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.kind)
    }
}

impl std::error::Error for LexError {}
