//! Token stream -> chunk stream.
//!
//! Each iteration expects either a `Text` token or a `{{`; markers are
//! dispatched on their sigil (`>` inline, `#` block open, `:` clause,
//! `/` close). Inline and block-open markers also carry a path expression:
//!
//! ```text
//! path    := "." | segment+
//! segment := "." word | "[" integer "]"
//! ```

use stencil_common::error::LexError;
use stencil_common::path::Segment;
use stencil_common::span::{Position, Span};
use stencil_common::token::{Token, TokenKind};

use crate::ast::{Chunk, PathChunk};
use crate::error::ParseError;

/// The chunker's output: chunks in source order plus where input ended.
#[derive(Debug, Clone, PartialEq)]
pub struct Chunks {
    pub chunks: Vec<Chunk>,
    pub end: Position,
}

/// Group a token stream (as produced by `Lexer::tokenize`) into chunks.
pub fn chunk(tokens: Vec<Token>) -> Result<Chunks, ParseError> {
    Chunker::new(tokens).run()
}

struct Chunker {
    /// All tokens from the lexer (including Eof).
    tokens: Vec<Token>,
    /// Current position in the token stream.
    pos: usize,
}

impl Chunker {
    fn new(mut tokens: Vec<Token>) -> Self {
        if tokens.last().map(|t| &t.kind) != Some(&TokenKind::Eof) {
            let end = tokens.last().map_or(Position::START, |t| t.span.end);
            tokens.push(Token::new(TokenKind::Eof, "", Span::point(end)));
        }
        Self { tokens, pos: 0 }
    }

    fn run(mut self) -> Result<Chunks, ParseError> {
        let mut chunks = Vec::new();
        loop {
            let kind = self.current()?.kind.clone();
            match kind {
                TokenKind::Eof => {
                    let end = self.bump().span.start;
                    return Ok(Chunks { chunks, end });
                }
                TokenKind::Text => {
                    let token = self.bump();
                    chunks.push(Chunk::Text {
                        text: token.lexeme,
                        span: token.span,
                    });
                }
                TokenKind::LeftMeta => chunks.push(self.action()?),
                _ => return Err(self.unexpected(&["text", "`{{`"])),
            }
        }
    }

    // ── Markers ────────────────────────────────────────────────────────

    fn action(&mut self) -> Result<Chunk, ParseError> {
        let open = self.expect(TokenKind::LeftMeta, "`{{`")?;
        self.skip_whitespace()?;

        let sigil = self.current()?.kind.clone();
        match sigil {
            TokenKind::Gt | TokenKind::Hash => {
                self.bump();
                self.skip_whitespace()?;
                let name = self.expect(TokenKind::Word, "word")?.lexeme;
                self.expect(TokenKind::Whitespace, "whitespace")?;
                let path = self.path()?;
                let span = open.span.merge(self.close()?);
                Ok(if sigil == TokenKind::Gt {
                    Chunk::Inline { name, path, span }
                } else {
                    Chunk::BlockOpen { name, path, span }
                })
            }
            TokenKind::Colon | TokenKind::Slash => {
                self.bump();
                self.skip_whitespace()?;
                let name = self.expect(TokenKind::Word, "word")?.lexeme;
                let span = open.span.merge(self.close()?);
                Ok(if sigil == TokenKind::Colon {
                    Chunk::BlockClause { name, span }
                } else {
                    Chunk::BlockClose { name, span }
                })
            }
            _ => Err(self.unexpected(&["`>`", "`#`", "`:`", "`/`"])),
        }
    }

    /// Optional whitespace, then `}}`. Returns the span of the `}}`.
    fn close(&mut self) -> Result<Span, ParseError> {
        self.skip_whitespace()?;
        Ok(self.expect(TokenKind::RightMeta, "`}}`")?.span)
    }

    fn path(&mut self) -> Result<PathChunk, ParseError> {
        // A lone `.` is the root; `.` followed by a word starts a field.
        if self.at(TokenKind::Dot)? && self.nth_kind(1) != Some(&TokenKind::Word) {
            self.bump();
            return Ok(PathChunk::Root);
        }

        let mut segments = Vec::new();
        loop {
            let kind = self.current()?.kind.clone();
            match kind {
                TokenKind::Dot => {
                    self.bump();
                    let name = self.expect(TokenKind::Word, "word")?.lexeme;
                    segments.push(Segment::Field(name));
                }
                TokenKind::LBracket => {
                    self.bump();
                    let digits = self.expect(TokenKind::Integer, "integer")?;
                    let value = digits.lexeme.parse::<u32>().map_err(|_| {
                        ParseError::InvalidOffset {
                            lexeme: digits.lexeme.clone(),
                            span: digits.span,
                        }
                    })?;
                    self.expect(TokenKind::RBracket, "`]`")?;
                    segments.push(Segment::Offset(Some(value)));
                }
                _ if segments.is_empty() => return Err(self.unexpected(&["`.`", "`[`"])),
                _ => return Ok(PathChunk::Chain(segments)),
            }
        }
    }

    // ── Token access ───────────────────────────────────────────────────

    /// The current token. A lexer `Error` token is surfaced here, so every
    /// lookahead is also where lexical failures become fatal.
    fn current(&self) -> Result<&Token, ParseError> {
        let token = &self.tokens[self.pos.min(self.tokens.len() - 1)];
        match &token.kind {
            TokenKind::Error(kind) => Err(LexError::new(kind.clone(), token.span).into()),
            _ => Ok(token),
        }
    }

    fn nth_kind(&self, n: usize) -> Option<&TokenKind> {
        self.tokens.get(self.pos + n).map(|t| &t.kind)
    }

    fn at(&self, kind: TokenKind) -> Result<bool, ParseError> {
        Ok(self.current()?.kind == kind)
    }

    /// Consume the current token. Never moves past `Eof`.
    fn bump(&mut self) -> Token {
        let token = self.tokens[self.pos.min(self.tokens.len() - 1)].clone();
        if token.kind != TokenKind::Eof {
            self.pos += 1;
        }
        token
    }

    fn expect(&mut self, kind: TokenKind, describe: &'static str) -> Result<Token, ParseError> {
        if self.at(kind)? {
            Ok(self.bump())
        } else {
            Err(self.unexpected(&[describe]))
        }
    }

    fn skip_whitespace(&mut self) -> Result<(), ParseError> {
        while self.at(TokenKind::Whitespace)? {
            self.bump();
        }
        Ok(())
    }

    fn unexpected(&self, expected: &[&'static str]) -> ParseError {
        match self.current() {
            Ok(token) => ParseError::UnexpectedToken {
                found: token.kind.clone(),
                expected: expected.to_vec(),
                span: token.span,
            },
            Err(err) => err,
        }
    }
}
