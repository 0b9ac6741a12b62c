use std::fmt;

use serde::Serialize;

use crate::error::LexErrorKind;
use crate::span::Span;

/// A token produced by the Stencil lexer.
///
/// The lexeme is kept alongside the span so that later stages never need
/// to go back to the source text to read a word or an integer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Token {
    pub kind: TokenKind,
    pub lexeme: String,
    pub span: Span,
}

impl Token {
    pub fn new(kind: TokenKind, lexeme: impl Into<String>, span: Span) -> Self {
        Self {
            kind,
            lexeme: lexeme.into(),
            span,
        }
    }
}

/// Every kind of token a template can contain.
///
/// Text outside markers becomes a single `Text` token; everything between
/// `{{` and `}}` is split into the small in-marker vocabulary below.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum TokenKind {
    // ── Marker delimiters ──────────────────────────────────────────────
    /// `{{`
    LeftMeta,
    /// `}}`
    RightMeta,

    // ── In-marker atoms ────────────────────────────────────────────────
    /// Alphanumeric run, e.g. `with`, `title`, `item_2`.
    Word,
    /// Run of ASCII digits.
    Integer,
    /// `.`
    Dot,
    /// `[`
    LBracket,
    /// `]`
    RBracket,
    /// `/`
    Slash,
    /// `:`
    Colon,
    /// `#`
    Hash,
    /// `$`
    Dollar,
    /// `>`
    Gt,
    /// Run of spaces and tabs inside a marker.
    Whitespace,

    // ── Outside markers ────────────────────────────────────────────────
    /// Free text between markers.
    Text,

    // ── Special ────────────────────────────────────────────────────────
    /// End of input.
    Eof,
    /// Scan failure. Carries what went wrong instead of aborting the scan;
    /// its `Display` is the human-readable message.
    Error(LexErrorKind),
}

impl TokenKind {
    /// Short human-readable name used in "unexpected token" messages.
    pub fn describe(&self) -> &'static str {
        match self {
            TokenKind::LeftMeta => "`{{`",
            TokenKind::RightMeta => "`}}`",
            TokenKind::Word => "word",
            TokenKind::Integer => "integer",
            TokenKind::Dot => "`.`",
            TokenKind::LBracket => "`[`",
            TokenKind::RBracket => "`]`",
            TokenKind::Slash => "`/`",
            TokenKind::Colon => "`:`",
            TokenKind::Hash => "`#`",
            TokenKind::Dollar => "`$`",
            TokenKind::Gt => "`>`",
            TokenKind::Whitespace => "whitespace",
            TokenKind::Text => "text",
            TokenKind::Eof => "end of input",
            TokenKind::Error(_) => "invalid input",
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.describe())
    }
}

/// Look up a single-character in-marker punctuation token.
///
/// Returns `None` for characters outside the closed punctuation set; the
/// lexer reports those as unknown symbols.
pub fn punct_from_char(c: char) -> Option<TokenKind> {
    match c {
        '$' => Some(TokenKind::Dollar),
        '#' => Some(TokenKind::Hash),
        '.' => Some(TokenKind::Dot),
        '[' => Some(TokenKind::LBracket),
        ']' => Some(TokenKind::RBracket),
        '>' => Some(TokenKind::Gt),
        '/' => Some(TokenKind::Slash),
        ':' => Some(TokenKind::Colon),
        _ => None,
    }
}
