//! Parse error types for the Stencil chunker and statement parser.

use std::fmt;

use stencil_common::error::LexError;
use stencil_common::span::Span;
use stencil_common::token::TokenKind;

/// Everything that can stop a template from parsing.
///
/// Lexical failures surface here too: the lexer only emits an `Error`
/// token, and the chunker is the first stage to act on it.
#[derive(Debug, Clone, PartialEq)]
pub enum ParseError {
    /// The lexer could not scan the input.
    Lex(LexError),
    /// A token appeared where the marker grammar does not allow it.
    UnexpectedToken {
        found: TokenKind,
        expected: Vec<&'static str>,
        span: Span,
    },
    /// An offset literal does not fit in an index.
    InvalidOffset { lexeme: String, span: Span },
    /// Input ran out before `{{/name}}` closed the block opened at `open`.
    UnclosedBlock { name: String, open: Span, span: Span },
    /// `{{/found}}` closed a block opened as `{{#expected}}`.
    MismatchedClosingTag {
        expected: String,
        found: String,
        open: Span,
        span: Span,
    },
    /// `{{:name}}` outside any block.
    StrayClause { name: String, span: Span },
    /// `{{/name}}` with no open block.
    StrayClose { name: String, span: Span },
    /// Blocks and path segments nest deeper than `limit`.
    TooDeep { limit: usize, span: Span },
}

impl ParseError {
    /// Primary source location.
    pub fn span(&self) -> Span {
        match self {
            ParseError::Lex(err) => err.span,
            ParseError::UnexpectedToken { span, .. }
            | ParseError::InvalidOffset { span, .. }
            | ParseError::UnclosedBlock { span, .. }
            | ParseError::MismatchedClosingTag { span, .. }
            | ParseError::StrayClause { span, .. }
            | ParseError::StrayClose { span, .. }
            | ParseError::TooDeep { span, .. } => *span,
        }
    }

    /// Secondary location with its label, when the error has one.
    pub fn related(&self) -> Option<(&'static str, Span)> {
        match self {
            ParseError::UnclosedBlock { open, .. }
            | ParseError::MismatchedClosingTag { open, .. } => Some(("block opened here", *open)),
            _ => None,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            ParseError::Lex(err) => err.code(),
            ParseError::UnexpectedToken { .. } => "P0001",
            ParseError::InvalidOffset { .. } => "P0002",
            ParseError::UnclosedBlock { .. } => "P0003",
            ParseError::MismatchedClosingTag { .. } => "P0004",
            ParseError::StrayClause { .. } => "P0005",
            ParseError::StrayClose { .. } => "P0006",
            ParseError::TooDeep { .. } => "P0007",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            ParseError::Lex(err) => err.title(),
            ParseError::UnexpectedToken { .. } => "Unexpected token",
            ParseError::InvalidOffset { .. } => "Invalid offset",
            ParseError::UnclosedBlock { .. } => "Unclosed block",
            ParseError::MismatchedClosingTag { .. } => "Mismatched closing tag",
            ParseError::StrayClause { .. } => "Clause outside of a block",
            ParseError::StrayClose { .. } => "Unmatched closing tag",
            ParseError::TooDeep { .. } => "Nesting too deep",
        }
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseError::Lex(err) => write!(f, "{err}"),
            ParseError::UnexpectedToken {
                found, expected, ..
            } => match expected.as_slice() {
                [] => write!(f, "unexpected {found}"),
                [only] => write!(f, "unexpected {found}, expected {only}"),
                many => write!(f, "unexpected {found}, expected one of: {}", many.join(", ")),
            },
            ParseError::InvalidOffset { lexeme, .. } => {
                write!(f, "offset `{lexeme}` is too large")
            }
            ParseError::UnclosedBlock { name, .. } => {
                write!(f, "unclosed block `{name}`, expected `{{{{/{name}}}}}`")
            }
            ParseError::MismatchedClosingTag {
                expected, found, ..
            } => write!(
                f,
                "mismatched closing tag: expected `{{{{/{expected}}}}}`, found `{{{{/{found}}}}}`"
            ),
            ParseError::StrayClause { name, .. } => {
                write!(f, "clause `{name}` appears outside of a block")
            }
            ParseError::StrayClose { name, .. } => {
                write!(f, "closing tag `{name}` has no matching block")
            }
            ParseError::TooDeep { limit, .. } => {
                write!(f, "template nests deeper than the limit of {limit}")
            }
        }
    }
}

impl std::error::Error for ParseError {}

impl From<LexError> for ParseError {
    fn from(err: LexError) -> Self {
        ParseError::Lex(err)
    }
}
