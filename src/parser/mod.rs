//! Recursive-descent parser for the Cypher read-query subset.
//!
//! Parsing stops at the first error: a query that does not parse is
//! reported once and never analyzed further, so there is no recovery pass.

pub mod base;
mod clause;
mod expression;
mod pattern;

use crate::ast::{Expression, Program, Span};
use crate::diag::{Diag, SourceFile, convert_diagnostics_to_reports};
use crate::lexer::Lexer;
use crate::lexer::token::{Token, TokenKind};
use base::{ParseResult, TokenStream};
use miette::Report;
use thiserror::Error;

/// A query or expression that failed to lex or parse.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{}", first_message(.diagnostics))]
pub struct ParseFailure {
    /// Every diagnostic produced, lexer diagnostics first.
    pub diagnostics: Vec<Diag>,
}

fn first_message(diagnostics: &[Diag]) -> &str {
    diagnostics
        .first()
        .map(|d| d.message.as_str())
        .unwrap_or("query could not be parsed")
}

impl ParseFailure {
    fn single(diag: Diag) -> Self {
        Self {
            diagnostics: vec![diag],
        }
    }

    /// The primary span of the first diagnostic, if it has one.
    pub fn primary_span(&self) -> Option<Span> {
        let first = self.diagnostics.first()?;
        first
            .labels
            .iter()
            .find(|label| label.primary)
            .map(|label| label.span.clone())
    }

    /// Renders every diagnostic against the query text.
    pub fn reports(&self, source: &SourceFile) -> Vec<Report> {
        convert_diagnostics_to_reports(&self.diagnostics, source)
    }
}

/// Cypher parser over a token slice.
pub struct Parser<'a> {
    stream: TokenStream<'a>,
}

impl<'a> Parser<'a> {
    pub fn new(tokens: &'a [Token], source: &'a str) -> Self {
        Self {
            stream: TokenStream::new(tokens, source),
        }
    }

    /// Parses a whole query. An optional trailing `;` is accepted.
    pub fn parse_program(&mut self) -> ParseResult<Program> {
        let start = self.stream.current().span.start;
        if self.stream.at_eof() || self.stream.check(&TokenKind::Semicolon) {
            return Err(self.stream.error_here_with_code("empty query", "P003"));
        }

        let mut clauses = Vec::new();
        while !self.stream.at_eof() && !self.stream.check(&TokenKind::Semicolon) {
            clauses.push(self.parse_clause()?);
        }
        let end = self.stream.previous_span().end;

        self.stream.consume(&TokenKind::Semicolon);
        if !self.stream.at_eof() {
            return Err(self.stream.error_here_with_code(
                "only a single statement is supported",
                "P004",
            ));
        }

        Ok(Program {
            clauses,
            span: start..end,
        })
    }

    /// Parses a single expression spanning the whole input.
    pub fn parse_standalone_expression(&mut self) -> ParseResult<Expression> {
        let expression = self.parse_expression()?;
        if !self.stream.at_eof() {
            return Err(self.stream.error_here(format!(
                "unexpected {} after expression",
                self.stream.current().kind
            )));
        }
        Ok(expression)
    }
}

fn run<T>(
    source: &str,
    parse_fn: impl FnOnce(&mut Parser<'_>) -> ParseResult<T>,
) -> Result<T, ParseFailure> {
    let lexed = Lexer::new(source).tokenize();
    if !lexed.diagnostics.is_empty() {
        return Err(ParseFailure {
            diagnostics: lexed.diagnostics,
        });
    }

    let mut parser = Parser::new(&lexed.tokens, source);
    parse_fn(&mut parser).map_err(|diag| ParseFailure::single(*diag))
}

/// Parses Cypher query text into a [`Program`].
pub fn parse(source: &str) -> Result<Program, ParseFailure> {
    let result = run(source, |parser| parser.parse_program());
    if let Err(failure) = &result {
        tracing::debug!(error = %failure, "query failed to parse");
    }
    result
}

/// Parses a standalone expression such as a `WHERE` predicate.
pub fn parse_expression(source: &str) -> Result<Expression, ParseFailure> {
    run(source, |parser| parser.parse_standalone_expression())
}
