//! Clause parsing: MATCH, WITH, UNWIND and RETURN.

use super::Parser;
use super::base::{ParseResult, merge_spans};
use crate::ast::{
    Clause, MatchClause, Projection, ProjectionItem, ProjectionItems, ReturnClause, SortDirection,
    SortItem, UnwindClause, WithClause,
};
use crate::lexer::token::TokenKind;

impl Parser<'_> {
    pub(super) fn parse_clause(&mut self) -> ParseResult<Clause> {
        match self.stream.current().kind {
            TokenKind::Match | TokenKind::Optional => self.parse_match_clause().map(Clause::Match),
            TokenKind::With => self.parse_with_clause().map(Clause::With),
            TokenKind::Unwind => self.parse_unwind_clause().map(Clause::Unwind),
            TokenKind::Return => {
                let clause = self.parse_return_clause()?;
                if !self.stream.at_eof() && !self.stream.check(&TokenKind::Semicolon) {
                    return Err(self
                        .stream
                        .error_here_with_code("RETURN must be the last clause", "P002"));
                }
                Ok(Clause::Return(clause))
            }
            ref other => Err(self.stream.error_here_with_code(
                format!("expected a clause such as MATCH or RETURN, found {other}"),
                "P002",
            )),
        }
    }

    fn parse_match_clause(&mut self) -> ParseResult<MatchClause> {
        let start = self.stream.current().span.clone();
        let optional = self.stream.consume(&TokenKind::Optional);
        self.stream.expect(TokenKind::Match)?;

        let mut patterns = vec![self.parse_path_pattern()?];
        while self.stream.consume(&TokenKind::Comma) {
            patterns.push(self.parse_path_pattern()?);
        }

        let where_clause = if self.stream.consume(&TokenKind::Where) {
            Some(self.parse_expression()?)
        } else {
            None
        };

        Ok(MatchClause {
            optional,
            patterns,
            where_clause,
            span: merge_spans(&start, &self.stream.previous_span()),
        })
    }

    fn parse_with_clause(&mut self) -> ParseResult<WithClause> {
        let start = self.stream.expect(TokenKind::With)?;
        let projection = self.parse_projection()?;
        let where_clause = if self.stream.consume(&TokenKind::Where) {
            Some(self.parse_expression()?)
        } else {
            None
        };
        Ok(WithClause {
            projection,
            where_clause,
            span: merge_spans(&start, &self.stream.previous_span()),
        })
    }

    fn parse_unwind_clause(&mut self) -> ParseResult<UnwindClause> {
        let start = self.stream.expect(TokenKind::Unwind)?;
        let expression = self.parse_expression()?;
        self.stream.expect(TokenKind::As)?;
        let (variable, _) = self.stream.expect_name("a variable after AS")?;
        Ok(UnwindClause {
            expression,
            variable,
            span: merge_spans(&start, &self.stream.previous_span()),
        })
    }

    fn parse_return_clause(&mut self) -> ParseResult<ReturnClause> {
        let start = self.stream.expect(TokenKind::Return)?;
        let projection = self.parse_projection()?;
        Ok(ReturnClause {
            projection,
            span: merge_spans(&start, &self.stream.previous_span()),
        })
    }

    fn parse_projection(&mut self) -> ParseResult<Projection> {
        let distinct = self.stream.consume(&TokenKind::Distinct);

        let items = if self.stream.consume(&TokenKind::Star) {
            ProjectionItems::Star
        } else {
            let mut items = vec![self.parse_projection_item()?];
            while self.stream.consume(&TokenKind::Comma) {
                items.push(self.parse_projection_item()?);
            }
            ProjectionItems::Items(items)
        };

        let mut order_by = Vec::new();
        if self.stream.consume(&TokenKind::Order) {
            self.stream.expect(TokenKind::By)?;
            loop {
                let expression = self.parse_expression()?;
                let direction = match self.stream.current().kind {
                    TokenKind::Asc | TokenKind::Ascending => {
                        self.stream.advance();
                        SortDirection::Ascending
                    }
                    TokenKind::Desc | TokenKind::Descending => {
                        self.stream.advance();
                        SortDirection::Descending
                    }
                    _ => SortDirection::Ascending,
                };
                order_by.push(SortItem {
                    expression,
                    direction,
                });
                if !self.stream.consume(&TokenKind::Comma) {
                    break;
                }
            }
        }

        let skip = if self.stream.consume(&TokenKind::Skip) {
            Some(self.parse_expression()?)
        } else {
            None
        };
        let limit = if self.stream.consume(&TokenKind::Limit) {
            Some(self.parse_expression()?)
        } else {
            None
        };

        Ok(Projection {
            distinct,
            items,
            order_by,
            skip,
            limit,
        })
    }

    fn parse_projection_item(&mut self) -> ParseResult<ProjectionItem> {
        let expression = self.parse_expression()?;
        let alias = if self.stream.consume(&TokenKind::As) {
            Some(self.stream.expect_name("an alias after AS")?.0)
        } else {
            None
        };
        Ok(ProjectionItem { expression, alias })
    }
}
