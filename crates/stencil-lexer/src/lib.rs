// Stencil lexer -- tokenizer for template source text.

mod cursor;

use cursor::Cursor;
use stencil_common::error::LexErrorKind;
use stencil_common::span::{Position, Span};
use stencil_common::token::{punct_from_char, Token, TokenKind};

/// Opening marker delimiter.
pub const LEFT_META: &str = "{{";
/// Closing marker delimiter.
pub const RIGHT_META: &str = "}}";

/// Which side of a marker the lexer is on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    /// Free text, scanning for the next `{{`.
    Text,
    /// Between `{{` and `}}`. Holds where the marker opened.
    Action(Position),
}

/// The Stencil lexer. Converts template text into a stream of tokens.
///
/// A single left-to-right pass with one character of lookahead plus the
/// fixed-length delimiter comparisons. Scan failures do not abort: an
/// `Error` token is produced, followed by `Eof`, and the stream ends.
pub struct Lexer<'src> {
    cursor: Cursor<'src>,
    mode: Mode,
    /// Whether we have already emitted the `Eof` token.
    emitted_eof: bool,
    /// Set after an `Error` token; the next call yields `Eof`.
    failed: bool,
}

impl<'src> Lexer<'src> {
    /// Create a new lexer for the given source text.
    pub fn new(source: &'src str) -> Self {
        Self {
            cursor: Cursor::new(source),
            mode: Mode::Text,
            emitted_eof: false,
            failed: false,
        }
    }

    /// Convenience: tokenize the entire source into a `Vec<Token>`.
    ///
    /// The returned vector always ends with the `Eof` token.
    pub fn tokenize(source: &str) -> Vec<Token> {
        Lexer::new(source).collect()
    }

    fn next_token(&mut self) -> Token {
        if self.failed {
            return self.eof();
        }
        match self.mode {
            Mode::Text => self.lex_text(),
            Mode::Action(opened) => self.lex_action(opened),
        }
    }

    fn eof(&self) -> Token {
        Token::new(TokenKind::Eof, "", Span::point(self.cursor.pos()))
    }

    // ── Outside markers ──────────────────────────────────────────────────

    fn lex_text(&mut self) -> Token {
        let start = self.cursor.pos();

        if self.cursor.starts_with(LEFT_META) {
            self.cursor.advance_by(LEFT_META.len());
            self.mode = Mode::Action(start);
            return self.token(TokenKind::LeftMeta, start);
        }
        if self.cursor.is_eof() {
            return self.eof();
        }

        // Accumulate until the next opening marker. Non-empty by construction
        // since we are neither at `{{` nor at end of input.
        while !self.cursor.is_eof() && !self.cursor.starts_with(LEFT_META) {
            self.cursor.advance();
        }
        self.token(TokenKind::Text, start)
    }

    // ── Inside markers ───────────────────────────────────────────────────

    fn lex_action(&mut self, opened: Position) -> Token {
        let start = self.cursor.pos();

        if self.cursor.starts_with(RIGHT_META) {
            self.cursor.advance_by(RIGHT_META.len());
            self.mode = Mode::Text;
            return self.token(TokenKind::RightMeta, start);
        }

        let Some(c) = self.cursor.peek() else {
            return self.error(LexErrorKind::UnclosedAction, opened);
        };

        match c {
            '\n' | '\r' => self.error(LexErrorKind::UnclosedAction, opened),
            ' ' | '\t' => {
                self.cursor.eat_while(|c| c == ' ' || c == '\t');
                self.token(TokenKind::Whitespace, start)
            }
            '0'..='9' => {
                self.cursor.eat_while(|c| c.is_ascii_digit());
                self.token(TokenKind::Integer, start)
            }
            c if is_word_char(c) => {
                self.cursor.eat_while(is_word_char);
                self.token(TokenKind::Word, start)
            }
            c => match punct_from_char(c) {
                Some(kind) => {
                    self.cursor.advance();
                    self.token(kind, start)
                }
                None => {
                    self.cursor.advance();
                    self.error(LexErrorKind::UnknownSymbol(c), start)
                }
            },
        }
    }

    // ── Helpers ──────────────────────────────────────────────────────────

    /// Build a token covering `start..current position`.
    fn token(&self, kind: TokenKind, start: Position) -> Token {
        let end = self.cursor.pos();
        Token::new(kind, self.cursor.slice(start, end), Span::new(start, end))
    }

    fn error(&mut self, kind: LexErrorKind, start: Position) -> Token {
        self.failed = true;
        self.token(TokenKind::Error(kind), start)
    }
}

impl<'src> Iterator for Lexer<'src> {
    type Item = Token;

    fn next(&mut self) -> Option<Token> {
        if self.emitted_eof {
            return None;
        }

        let token = self.next_token();
        if token.kind == TokenKind::Eof {
            self.emitted_eof = true;
        }
        Some(token)
    }
}

/// Whether a character belongs in a word run.
fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}
