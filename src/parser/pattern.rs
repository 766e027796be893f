//! Path, node and relationship pattern parsing.

use super::Parser;
use super::base::{ParseResult, merge_spans};
use crate::ast::{
    Direction, LabelRef, LengthRange, NodePattern, PathPattern, PathStep, PropertyEntry,
    PropertyKeyRef, RelationshipDetail, Span,
};
use crate::lexer::token::TokenKind;
use smol_str::SmolStr;

impl Parser<'_> {
    /// `[p =] (node) (rel (node))*`
    pub(super) fn parse_path_pattern(&mut self) -> ParseResult<PathPattern> {
        let start = self.stream.current().span.clone();

        let variable = if self.stream.current().kind.is_identifier()
            && self.stream.peek_kind(1) == &TokenKind::Eq
        {
            let (name, _) = self.stream.expect_name("a path variable")?;
            self.stream.advance();
            Some(name)
        } else {
            None
        };

        let start_node = self.parse_node_pattern()?;
        let mut steps = Vec::new();
        while matches!(
            self.stream.current().kind,
            TokenKind::Minus | TokenKind::LeftArrow
        ) {
            let relationship = self.parse_relationship_detail()?;
            let node = self.parse_node_pattern()?;
            steps.push(PathStep { relationship, node });
        }

        Ok(PathPattern {
            variable,
            start: start_node,
            steps,
            span: merge_spans(&start, &self.stream.previous_span()),
        })
    }

    /// `(var:Label:Other {key: value})`
    pub(super) fn parse_node_pattern(&mut self) -> ParseResult<NodePattern> {
        let start = self.stream.expect(TokenKind::LParen)?;

        let variable = self.parse_optional_variable();
        let mut labels = Vec::new();
        while self.stream.consume(&TokenKind::Colon) {
            labels.push(self.parse_label_ref("a label name")?);
        }
        let properties = if self.stream.check(&TokenKind::LBrace) {
            self.parse_property_map()?
        } else {
            Vec::new()
        };

        if !self.stream.check(&TokenKind::RParen) {
            return Err(self.stream.error_here(format!(
                "expected ')' to close node pattern, found {}",
                self.stream.current().kind
            )));
        }
        let end = self.stream.expect(TokenKind::RParen)?;

        Ok(NodePattern {
            variable,
            labels,
            properties,
            span: merge_spans(&start, &end),
        })
    }

    /// Parses the connector between two nodes, including abbreviated forms.
    fn parse_relationship_detail(&mut self) -> ParseResult<RelationshipDetail> {
        let start = self.stream.current().span.clone();
        let points_left = match self.stream.current().kind {
            TokenKind::LeftArrow => true,
            TokenKind::Minus => false,
            ref other => {
                return Err(self
                    .stream
                    .error_here(format!("expected a relationship, found {other}")));
            }
        };
        self.stream.advance();

        let mut variable = None;
        let mut types = Vec::new();
        let mut length = None;
        let mut properties = Vec::new();

        if self.stream.consume(&TokenKind::LBracket) {
            variable = self.parse_optional_variable();
            if self.stream.consume(&TokenKind::Colon) {
                types.push(self.parse_label_ref("a relationship type")?);
                while self.stream.consume(&TokenKind::Pipe) {
                    self.stream.consume(&TokenKind::Colon);
                    types.push(self.parse_label_ref("a relationship type")?);
                }
            }
            if self.stream.consume(&TokenKind::Star) {
                length = Some(self.parse_length_range()?);
            }
            if self.stream.check(&TokenKind::LBrace) {
                properties = self.parse_property_map()?;
            }
            if !self.stream.check(&TokenKind::RBracket) {
                return Err(self.stream.error_here(format!(
                    "expected ']' to close relationship pattern, found {}",
                    self.stream.current().kind
                )));
            }
            self.stream.advance();
        }

        let points_right = match self.stream.current().kind {
            TokenKind::Arrow => true,
            TokenKind::Minus => false,
            ref other => {
                return Err(self.stream.error_here(format!(
                    "expected '-' or '->' to finish relationship, found {other}"
                )));
            }
        };
        self.stream.advance();

        let direction = match (points_left, points_right) {
            (false, true) => Direction::Forward,
            (true, false) => Direction::Backward,
            _ => Direction::Undirected,
        };

        Ok(RelationshipDetail {
            variable,
            types,
            direction,
            length,
            properties,
            span: merge_spans(&start, &self.stream.previous_span()),
        })
    }

    /// After `*`: nothing, `n`, `n..`, `..m` or `n..m`.
    fn parse_length_range(&mut self) -> ParseResult<LengthRange> {
        let min = self.parse_optional_bound()?;
        if self.stream.consume(&TokenKind::DotDot) {
            let max = self.parse_optional_bound()?;
            Ok(LengthRange { min, max })
        } else {
            Ok(LengthRange { min, max: min })
        }
    }

    fn parse_optional_bound(&mut self) -> ParseResult<Option<u32>> {
        let TokenKind::IntegerLiteral(text) = &self.stream.current().kind else {
            return Ok(None);
        };
        let bound = text
            .parse::<u32>()
            .map_err(|_| self.stream.error_here(format!("invalid path length '{text}'")))?;
        self.stream.advance();
        Ok(Some(bound))
    }

    /// `{key: value, ...}` in node and relationship patterns.
    fn parse_property_map(&mut self) -> ParseResult<Vec<PropertyEntry>> {
        self.stream.expect(TokenKind::LBrace)?;
        let mut entries = Vec::new();
        if !self.stream.check(&TokenKind::RBrace) {
            loop {
                let (name, span) = self.stream.expect_name("a property key")?;
                self.stream.expect(TokenKind::Colon)?;
                let value = self.parse_expression()?;
                entries.push(PropertyEntry {
                    key: PropertyKeyRef { name, span },
                    value,
                });
                if !self.stream.consume(&TokenKind::Comma) {
                    break;
                }
            }
        }
        self.stream.expect(TokenKind::RBrace)?;
        Ok(entries)
    }

    fn parse_optional_variable(&mut self) -> Option<SmolStr> {
        match &self.stream.current().kind {
            TokenKind::Identifier(name) | TokenKind::DelimitedIdentifier(name) => {
                let name = name.clone();
                self.stream.advance();
                Some(name)
            }
            _ => None,
        }
    }

    pub(super) fn parse_label_ref(&mut self, what: &str) -> ParseResult<LabelRef> {
        let (name, span): (SmolStr, Span) = self.stream.expect_name(what)?;
        Ok(LabelRef { name, span })
    }
}
