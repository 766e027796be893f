//! Lexical analysis for Cypher.
//!
//! This module implements an error-tolerant lexer that converts Cypher source
//! text into a stream of tokens. Scanning continues after errors so that a
//! single pass reports every lexical problem.

pub mod keywords;
pub mod token;

use crate::diag::Diag;
use token::{Token, TokenKind};

/// Result of lexical analysis.
///
/// Contains both the tokens produced and any diagnostics encountered during scanning.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LexerResult {
    /// The tokens produced, including an EOF token at the end.
    pub tokens: Vec<Token>,
    /// Diagnostics (errors, warnings) encountered during lexing.
    pub diagnostics: Vec<Diag>,
}

/// A lexical analyzer for Cypher source text.
pub struct Lexer<'a> {
    /// The source text being lexed.
    source: &'a str,
    /// Current byte position in source.
    pos: usize,
    /// Accumulated tokens.
    tokens: Vec<Token>,
    /// Accumulated diagnostics.
    diagnostics: Vec<Diag>,
}

impl<'a> Lexer<'a> {
    /// Creates a new lexer for the given source text.
    pub fn new(source: &'a str) -> Self {
        Self {
            source,
            pos: 0,
            tokens: Vec::new(),
            diagnostics: Vec::new(),
        }
    }

    /// Tokenizes the source text and returns the result.
    pub fn tokenize(mut self) -> LexerResult {
        while !self.is_at_end() {
            self.skip_whitespace_and_comments();
            if self.is_at_end() {
                break;
            }
            self.scan_token();
        }

        // Always add EOF token
        let eof_pos = self.source.len();
        self.tokens
            .push(Token::new(TokenKind::Eof, eof_pos..eof_pos));

        LexerResult {
            tokens: self.tokens,
            diagnostics: self.diagnostics,
        }
    }

    /// Scans a single token.
    fn scan_token(&mut self) {
        let start = self.pos;
        let ch = self.advance();

        match ch {
            // Single-character tokens
            '(' => self.add_token(TokenKind::LParen, start),
            ')' => self.add_token(TokenKind::RParen, start),
            '[' => self.add_token(TokenKind::LBracket, start),
            ']' => self.add_token(TokenKind::RBracket, start),
            '{' => self.add_token(TokenKind::LBrace, start),
            '}' => self.add_token(TokenKind::RBrace, start),
            ',' => self.add_token(TokenKind::Comma, start),
            ';' => self.add_token(TokenKind::Semicolon, start),
            ':' => self.add_token(TokenKind::Colon, start),
            '|' => self.add_token(TokenKind::Pipe, start),
            '+' => self.add_token(TokenKind::Plus, start),
            '*' => self.add_token(TokenKind::Star, start),
            '/' => self.add_token(TokenKind::Slash, start),
            '%' => self.add_token(TokenKind::Percent, start),
            '^' => self.add_token(TokenKind::Caret, start),

            // Multi-character operators
            '-' => {
                if self.match_char('>') {
                    self.add_token(TokenKind::Arrow, start);
                } else {
                    self.add_token(TokenKind::Minus, start);
                }
            }
            '<' => {
                if self.match_char('-') {
                    self.add_token(TokenKind::LeftArrow, start);
                } else if self.match_char('=') {
                    self.add_token(TokenKind::LtEq, start);
                } else if self.match_char('>') {
                    self.add_token(TokenKind::NotEq, start);
                } else {
                    self.add_token(TokenKind::Lt, start);
                }
            }
            '>' => {
                if self.match_char('=') {
                    self.add_token(TokenKind::GtEq, start);
                } else {
                    self.add_token(TokenKind::Gt, start);
                }
            }
            '=' => {
                if self.match_char('~') {
                    self.add_token(TokenKind::RegexMatch, start);
                } else {
                    self.add_token(TokenKind::Eq, start);
                }
            }
            '!' => {
                if self.match_char('=') {
                    self.add_token(TokenKind::NotEqBang, start);
                } else {
                    self.error(start, "unexpected character '!'");
                }
            }
            '.' => {
                if self.match_char('.') {
                    self.add_token(TokenKind::DotDot, start);
                } else {
                    self.add_token(TokenKind::Dot, start);
                }
            }

            // String literals
            '\'' | '"' => self.scan_string_literal(start, ch),

            // Parameter tokens
            '$' => self.scan_parameter(start),

            // Delimited identifiers
            '`' => self.scan_delimited_identifier(start),

            // Numbers
            '0'..='9' => self.scan_number(start),

            // Identifiers and keywords
            c if self.is_identifier_start(c) => self.scan_identifier_or_keyword(start),

            // Invalid character
            _ => {
                self.error(start, &format!("invalid character '{}'", ch));
            }
        }
    }

    /// Scans an identifier or keyword.
    fn scan_identifier_or_keyword(&mut self, start: usize) {
        while self.is_identifier_continue(self.peek()) {
            self.advance();
        }

        let text = &self.source[start..self.pos];
        if let Some(kind) = keywords::lookup_keyword(text) {
            self.add_token(kind, start);
        } else {
            self.add_token(TokenKind::Identifier(text.into()), start);
        }
    }

    /// Scans a string literal delimited by `quote`.
    fn scan_string_literal(&mut self, start: usize, quote: char) {
        let mut value = String::new();

        while self.peek() != quote && !self.is_at_end() {
            if self.peek() == '\\' {
                self.advance(); // consume backslash
                if self.is_at_end() {
                    break;
                }
                let escaped = self.advance();
                match escaped {
                    'n' => value.push('\n'),
                    't' => value.push('\t'),
                    'r' => value.push('\r'),
                    '\'' => value.push('\''),
                    '"' => value.push('"'),
                    '\\' => value.push('\\'),
                    'u' => {
                        let mut hex = String::new();
                        for _ in 0..4 {
                            if self.peek().is_ascii_hexdigit() {
                                hex.push(self.advance());
                            }
                        }
                        match u32::from_str_radix(&hex, 16).ok().and_then(char::from_u32) {
                            Some(ch) if hex.len() == 4 => value.push(ch),
                            _ => self.error(self.pos.saturating_sub(1), "invalid unicode escape sequence"),
                        }
                    }
                    _ => {
                        self.error(
                            self.pos - 1,
                            &format!("invalid escape sequence '\\{}'", escaped),
                        );
                        value.push(escaped);
                    }
                }
            } else {
                value.push(self.advance());
            }
        }

        if self.is_at_end() {
            self.error(start, "unclosed string literal");
        } else {
            self.advance(); // consume closing quote
        }

        self.add_token(TokenKind::StringLiteral(value.into()), start);
    }

    /// Scans a delimited identifier (backtick-quoted).
    ///
    /// A doubled backtick inside the identifier stands for one backtick.
    fn scan_delimited_identifier(&mut self, start: usize) {
        let mut value = String::new();

        loop {
            if self.is_at_end() {
                self.error(start, "unclosed delimited identifier");
                break;
            }
            let ch = self.advance();
            if ch == '`' {
                if self.peek() == '`' {
                    self.advance();
                    value.push('`');
                } else {
                    break;
                }
            } else {
                value.push(ch);
            }
        }

        if value.is_empty() {
            self.error(start, "empty delimited identifier");
        }
        self.add_token(TokenKind::DelimitedIdentifier(value.into()), start);
    }

    /// Scans a number (integer or float).
    fn scan_number(&mut self, start: usize) {
        while self.peek().is_ascii_digit() {
            self.advance();
        }

        let mut is_float = false;

        // `1..3` is a range, not a float
        if self.peek() == '.' && self.peek_next().is_ascii_digit() {
            is_float = true;
            self.advance(); // consume '.'
            while self.peek().is_ascii_digit() {
                self.advance();
            }
        }

        if matches!(self.peek(), 'e' | 'E') {
            let saved_pos = self.pos;
            self.advance();
            if matches!(self.peek(), '+' | '-') {
                self.advance();
            }
            if self.peek().is_ascii_digit() {
                is_float = true;
                while self.peek().is_ascii_digit() {
                    self.advance();
                }
            } else {
                self.pos = saved_pos;
            }
        }

        if self.is_identifier_continue(self.peek()) {
            while self.is_identifier_continue(self.peek()) {
                self.advance();
            }
            let text = &self.source[start..self.pos];
            self.error_span(
                start..self.pos,
                &format!("malformed numeric literal '{}'", text),
                "L002",
            );
            return;
        }

        let text = &self.source[start..self.pos];
        let kind = if is_float {
            TokenKind::FloatLiteral(text.into())
        } else {
            TokenKind::IntegerLiteral(text.into())
        };
        self.add_token(kind, start);
    }

    /// Scans a parameter token ($name or $123).
    fn scan_parameter(&mut self, start: usize) {
        if self.is_at_end() {
            self.error(start, "unexpected end of input after '$'");
            return;
        }

        if self.peek().is_ascii_digit() {
            while self.peek().is_ascii_digit() {
                self.advance();
            }
        } else if self.is_identifier_start(self.peek()) {
            while self.is_identifier_continue(self.peek()) {
                self.advance();
            }
        } else {
            self.error(start, "expected identifier or number after '$'");
            return;
        }

        let text = &self.source[start + 1..self.pos]; // Skip the '$'
        self.add_token(TokenKind::Parameter(text.into()), start);
    }

    /// Skips whitespace and comments.
    fn skip_whitespace_and_comments(&mut self) {
        loop {
            match self.peek() {
                c if c.is_whitespace() => {
                    self.advance();
                }
                '/' => {
                    if self.peek_next() == '/' {
                        self.advance();
                        self.advance();
                        while self.peek() != '\n' && !self.is_at_end() {
                            self.advance();
                        }
                    } else if self.peek_next() == '*' {
                        let comment_start = self.pos;
                        self.advance();
                        self.advance();

                        let mut closed = false;
                        while !self.is_at_end() {
                            if self.peek() == '*' && self.peek_next() == '/' {
                                self.advance();
                                self.advance();
                                closed = true;
                                break;
                            }
                            self.advance();
                        }

                        if !closed {
                            self.error(comment_start, "unclosed block comment");
                        }
                    } else {
                        break;
                    }
                }
                _ => break,
            }
        }
    }

    /// Returns true if the character can start an identifier.
    fn is_identifier_start(&self, ch: char) -> bool {
        ch.is_alphabetic() || ch == '_'
    }

    /// Returns true if the character can continue an identifier.
    fn is_identifier_continue(&self, ch: char) -> bool {
        ch.is_alphanumeric() || ch == '_'
    }

    /// Adds a token to the token stream.
    fn add_token(&mut self, kind: TokenKind, start: usize) {
        self.tokens.push(Token::new(kind, start..self.pos));
    }

    /// Adds an error diagnostic.
    fn error(&mut self, pos: usize, message: &str) {
        let span = pos..pos.saturating_add(1).min(self.source.len());
        self.error_span(span, message, "L001");
    }

    /// Adds an error diagnostic with an explicit span and code.
    fn error_span(&mut self, span: std::ops::Range<usize>, message: &str, code: &str) {
        self.diagnostics.push(
            Diag::error(message)
                .with_primary_label(span, "here")
                .with_code(code),
        );
    }

    /// Returns the current character without advancing.
    fn peek(&self) -> char {
        self.source[self.pos..].chars().next().unwrap_or('\0')
    }

    /// Returns the next character without advancing.
    fn peek_next(&self) -> char {
        let mut chars = self.source[self.pos..].chars();
        chars.next();
        chars.next().unwrap_or('\0')
    }

    /// Advances and returns the current character.
    fn advance(&mut self) -> char {
        let ch = self.peek();
        if ch != '\0' {
            self.pos += ch.len_utf8();
        }
        ch
    }

    /// Matches and consumes a character if it matches the expected one.
    fn match_char(&mut self, expected: char) -> bool {
        if self.peek() == expected {
            self.advance();
            true
        } else {
            false
        }
    }

    /// Returns true if at end of input.
    fn is_at_end(&self) -> bool {
        self.pos >= self.source.len()
    }
}

/// Convenience function to tokenize a source string.
pub fn tokenize(source: &str) -> LexerResult {
    Lexer::new(source).tokenize()
}
