//! Shared parser infrastructure for token stream navigation and error handling.

use crate::ast::Span;
use crate::diag::Diag;
use crate::lexer::token::{Token, TokenKind};
use smol_str::SmolStr;

/// Common error type for parsing operations.
pub type ParseError = Box<Diag>;

/// Common result type for parsing operations.
pub type ParseResult<T> = Result<T, ParseError>;

/// Token stream navigator used by every parsing routine.
pub struct TokenStream<'a> {
    tokens: &'a [Token],
    source: &'a str,
    pos: usize,
    eof: Token,
}

impl<'a> TokenStream<'a> {
    /// Creates a new token stream over `tokens`, which were scanned from `source`.
    pub fn new(tokens: &'a [Token], source: &'a str) -> Self {
        let end = source.len();
        Self {
            tokens,
            source,
            pos: 0,
            eof: Token::new(TokenKind::Eof, end..end),
        }
    }

    /// Returns the current token.
    ///
    /// Past the end this keeps returning the final token, or a synthetic EOF
    /// for an empty slice.
    pub fn current(&self) -> &Token {
        self.tokens
            .get(self.pos)
            .or_else(|| self.tokens.last())
            .unwrap_or(&self.eof)
    }

    /// Returns the kind of the token `offset` positions ahead.
    pub fn peek_kind(&self, offset: usize) -> &TokenKind {
        self.tokens
            .get(self.pos + offset)
            .map(|t| &t.kind)
            .unwrap_or(&TokenKind::Eof)
    }

    /// Advances to the next token. Does nothing at EOF.
    pub fn advance(&mut self) {
        if self.pos < self.tokens.len().saturating_sub(1) {
            self.pos += 1;
        }
    }

    pub fn check(&self, kind: &TokenKind) -> bool {
        &self.current().kind == kind
    }

    pub fn at_eof(&self) -> bool {
        self.check(&TokenKind::Eof)
    }

    /// Consumes the current token if it matches the given kind.
    pub fn consume(&mut self, kind: &TokenKind) -> bool {
        if self.check(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    /// Expects a specific token kind and returns its span.
    pub fn expect(&mut self, kind: TokenKind) -> ParseResult<Span> {
        if self.check(&kind) {
            let span = self.current().span.clone();
            self.advance();
            Ok(span)
        } else {
            Err(self.error_here(format!("expected {kind}, found {}", self.current().kind)))
        }
    }

    /// Consumes a name: an identifier, a delimited identifier or a keyword
    /// used as a name. Keywords keep the spelling they were written with.
    pub fn expect_name(&mut self, what: &str) -> ParseResult<(SmolStr, Span)> {
        let token = self.current().clone();
        let name = match &token.kind {
            TokenKind::Identifier(name) | TokenKind::DelimitedIdentifier(name) => name.clone(),
            kind if kind.is_keyword() => SmolStr::new(token.slice(self.source)),
            other => {
                return Err(self.error_here_with_code(
                    format!("expected {what}, found {other}"),
                    "P001",
                ));
            }
        };
        self.advance();
        Ok((name, token.span))
    }

    /// Creates an error at the current token position.
    pub fn error_here(&self, message: impl Into<String>) -> ParseError {
        self.error_here_with_code(message, "P001")
    }

    /// Creates an error at the current token position with a specific error code.
    pub fn error_here_with_code(&self, message: impl Into<String>, code: &str) -> ParseError {
        Box::new(
            Diag::error(message.into())
                .with_primary_label(self.current().span.clone(), "here")
                .with_code(code),
        )
    }

    /// Returns the span of the previous token (useful after consuming a token).
    pub fn previous_span(&self) -> Span {
        if self.pos > 0 {
            self.tokens[self.pos - 1].span.clone()
        } else {
            self.current().span.clone()
        }
    }
}

/// Merges two spans into a single span covering both.
pub fn merge_spans(start: &Span, end: &Span) -> Span {
    start.start..end.end
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::tokenize;

    #[test]
    fn current_never_runs_past_eof() {
        let source = "MATCH";
        let tokens = tokenize(source).tokens;
        let mut stream = TokenStream::new(&tokens, source);
        stream.advance();
        stream.advance();
        stream.advance();
        assert!(stream.at_eof());
    }

    #[test]
    fn empty_slice_yields_synthetic_eof() {
        let stream = TokenStream::new(&[], "abc");
        assert_eq!(stream.current().kind, TokenKind::Eof);
        assert_eq!(stream.current().span, 3..3);
    }

    #[test]
    fn expect_reports_found_token() {
        let source = "RETURN";
        let tokens = tokenize(source).tokens;
        let mut stream = TokenStream::new(&tokens, source);
        let err = stream.expect(TokenKind::Match).unwrap_err();
        assert_eq!(err.message, "expected MATCH, found RETURN");
        assert_eq!(err.labels[0].span, 0..6);
    }

    #[test]
    fn keywords_are_accepted_as_names() {
        let source = "count";
        let tokens = tokenize(source).tokens;
        let mut stream = TokenStream::new(&tokens, source);
        assert_eq!(stream.expect_name("a name").unwrap().0, "count");

        let source = "Return";
        let tokens = tokenize(source).tokens;
        let mut stream = TokenStream::new(&tokens, source);
        assert_eq!(stream.expect_name("a name").unwrap().0, "Return");
    }

    #[test]
    fn merge_spans_covers_both() {
        assert_eq!(merge_spans(&(2..4), &(7..9)), 2..9);
    }
}
