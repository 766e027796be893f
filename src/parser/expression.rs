//! Expression parsing with precedence climbing.
//!
//! Precedence from loosest to tightest: OR, XOR, AND, NOT, comparison,
//! additive, multiplicative, power, unary sign, postfix, atom.

use super::Parser;
use super::base::{ParseResult, merge_spans};
use crate::ast::{
    BinaryOperator, Comparison, ComparisonOperator, Expression, FunctionCall, Literal,
    LogicalOperator, MapEntry, PropertyKeyRef, UnaryOperator,
};
use crate::lexer::token::TokenKind;
use smol_str::SmolStr;

impl Parser<'_> {
    pub(crate) fn parse_expression(&mut self) -> ParseResult<Expression> {
        self.parse_or_expression()
    }

    fn parse_or_expression(&mut self) -> ParseResult<Expression> {
        let mut left = self.parse_xor_expression()?;
        while self.stream.consume(&TokenKind::Or) {
            let right = self.parse_xor_expression()?;
            left = logical(LogicalOperator::Or, left, right);
        }
        Ok(left)
    }

    fn parse_xor_expression(&mut self) -> ParseResult<Expression> {
        let mut left = self.parse_and_expression()?;
        while self.stream.consume(&TokenKind::Xor) {
            let right = self.parse_and_expression()?;
            left = logical(LogicalOperator::Xor, left, right);
        }
        Ok(left)
    }

    fn parse_and_expression(&mut self) -> ParseResult<Expression> {
        let mut left = self.parse_not_expression()?;
        while self.stream.consume(&TokenKind::And) {
            let right = self.parse_not_expression()?;
            left = logical(LogicalOperator::And, left, right);
        }
        Ok(left)
    }

    fn parse_not_expression(&mut self) -> ParseResult<Expression> {
        if self.stream.check(&TokenKind::Not) {
            let start = self.stream.current().span.clone();
            self.stream.advance();
            let operand = self.parse_not_expression()?;
            let span = merge_spans(&start, &operand.span());
            return Ok(Expression::Unary(
                UnaryOperator::Not,
                Box::new(operand),
                span,
            ));
        }
        self.parse_comparison_expression()
    }

    fn parse_comparison_expression(&mut self) -> ParseResult<Expression> {
        let mut left = self.parse_additive_expression()?;

        loop {
            let operator = match self.stream.current().kind {
                TokenKind::Eq => ComparisonOperator::Eq,
                TokenKind::NotEq | TokenKind::NotEqBang => ComparisonOperator::NotEq,
                TokenKind::Lt => ComparisonOperator::Lt,
                TokenKind::LtEq => ComparisonOperator::LtEq,
                TokenKind::Gt => ComparisonOperator::Gt,
                TokenKind::GtEq => ComparisonOperator::GtEq,
                TokenKind::RegexMatch => ComparisonOperator::RegexMatch,
                TokenKind::In => ComparisonOperator::In,
                TokenKind::Contains => ComparisonOperator::Contains,
                TokenKind::Starts => {
                    self.stream.advance();
                    if !self.stream.check(&TokenKind::With) {
                        return Err(self.stream.error_here("expected WITH after STARTS"));
                    }
                    ComparisonOperator::StartsWith
                }
                TokenKind::Ends => {
                    self.stream.advance();
                    if !self.stream.check(&TokenKind::With) {
                        return Err(self.stream.error_here("expected WITH after ENDS"));
                    }
                    ComparisonOperator::EndsWith
                }
                TokenKind::Is => {
                    self.stream.advance();
                    let negated = self.stream.consume(&TokenKind::Not);
                    if !self.stream.check(&TokenKind::Null) {
                        return Err(self.stream.error_here(format!(
                            "expected NULL after IS, found {}",
                            self.stream.current().kind
                        )));
                    }
                    if negated {
                        ComparisonOperator::IsNotNull
                    } else {
                        ComparisonOperator::IsNull
                    }
                }
                TokenKind::LeftArrow => {
                    // `a<-1` scans as `<-` followed by `1`.
                    let arrow = self.stream.current().span.clone();
                    self.stream.advance();
                    let operand = self.parse_additive_expression()?;
                    let minus_span = arrow.start + 1..operand.span().end;
                    let right = Expression::Unary(
                        UnaryOperator::Minus,
                        Box::new(operand),
                        minus_span,
                    );
                    left = comparison(ComparisonOperator::Lt, left, Some(right));
                    continue;
                }
                _ => break,
            };
            self.stream.advance();

            if operator.is_postfix() {
                let span = merge_spans(&left.span(), &self.stream.previous_span());
                left = Expression::Comparison(Comparison {
                    operator,
                    left: Box::new(left),
                    right: None,
                    span,
                });
            } else {
                let right = self.parse_additive_expression()?;
                left = comparison(operator, left, Some(right));
            }
        }

        Ok(left)
    }

    fn parse_additive_expression(&mut self) -> ParseResult<Expression> {
        let mut left = self.parse_multiplicative_expression()?;
        loop {
            let operator = match self.stream.current().kind {
                TokenKind::Plus => BinaryOperator::Add,
                TokenKind::Minus => BinaryOperator::Subtract,
                _ => break,
            };
            self.stream.advance();
            let right = self.parse_multiplicative_expression()?;
            left = binary(operator, left, right);
        }
        Ok(left)
    }

    fn parse_multiplicative_expression(&mut self) -> ParseResult<Expression> {
        let mut left = self.parse_power_expression()?;
        loop {
            let operator = match self.stream.current().kind {
                TokenKind::Star => BinaryOperator::Multiply,
                TokenKind::Slash => BinaryOperator::Divide,
                TokenKind::Percent => BinaryOperator::Modulo,
                _ => break,
            };
            self.stream.advance();
            let right = self.parse_power_expression()?;
            left = binary(operator, left, right);
        }
        Ok(left)
    }

    fn parse_power_expression(&mut self) -> ParseResult<Expression> {
        let mut left = self.parse_unary_expression()?;
        while self.stream.consume(&TokenKind::Caret) {
            let right = self.parse_unary_expression()?;
            left = binary(BinaryOperator::Power, left, right);
        }
        Ok(left)
    }

    fn parse_unary_expression(&mut self) -> ParseResult<Expression> {
        let operator = match self.stream.current().kind {
            TokenKind::Minus => UnaryOperator::Minus,
            TokenKind::Plus => UnaryOperator::Plus,
            _ => return self.parse_postfix_expression(),
        };
        let start = self.stream.current().span.clone();
        self.stream.advance();

        // i64::MIN only exists negated; its magnitude alone is out of range.
        if operator == UnaryOperator::Minus {
            let token = self.stream.current().clone();
            if let TokenKind::IntegerLiteral(text) = &token.kind {
                if text.parse::<u64>() == Ok(i64::MIN.unsigned_abs()) {
                    self.stream.advance();
                    let span = merge_spans(&start, &token.span);
                    return Ok(Expression::Literal(Literal::Integer(i64::MIN), span));
                }
            }
        }
        let operand = self.parse_unary_expression()?;

        // Fold `-3` into a negative literal so it renders and compares as one.
        if operator == UnaryOperator::Minus {
            let span = merge_spans(&start, &operand.span());
            match operand {
                Expression::Literal(Literal::Integer(value), _) if value != i64::MIN => {
                    return Ok(Expression::Literal(Literal::Integer(-value), span));
                }
                Expression::Literal(Literal::Float(value), _) => {
                    return Ok(Expression::Literal(Literal::Float(-value), span));
                }
                operand => {
                    return Ok(Expression::Unary(operator, Box::new(operand), span));
                }
            }
        }

        let span = merge_spans(&start, &operand.span());
        Ok(Expression::Unary(operator, Box::new(operand), span))
    }

    fn parse_postfix_expression(&mut self) -> ParseResult<Expression> {
        let mut expr = self.parse_atom()?;
        loop {
            match self.stream.current().kind {
                TokenKind::Dot => {
                    self.stream.advance();
                    let (name, key_span) = self.stream.expect_name("a property key after '.'")?;
                    let span = merge_spans(&expr.span(), &key_span);
                    expr = Expression::Property(
                        Box::new(expr),
                        PropertyKeyRef {
                            name,
                            span: key_span,
                        },
                        span,
                    );
                }
                TokenKind::LBracket => {
                    self.stream.advance();
                    let index = self.parse_expression()?;
                    let end = self.stream.expect(TokenKind::RBracket)?;
                    let span = merge_spans(&expr.span(), &end);
                    expr = Expression::Index(Box::new(expr), Box::new(index), span);
                }
                TokenKind::Colon => {
                    let mut labels = Vec::new();
                    while self.stream.consume(&TokenKind::Colon) {
                        labels.push(self.parse_label_ref("a label name")?);
                    }
                    let span = merge_spans(&expr.span(), &self.stream.previous_span());
                    expr = Expression::HasLabels(Box::new(expr), labels, span);
                }
                _ => break,
            }
        }
        Ok(expr)
    }

    fn parse_atom(&mut self) -> ParseResult<Expression> {
        let token = self.stream.current().clone();
        let span = token.span.clone();

        let literal = match &token.kind {
            TokenKind::IntegerLiteral(text) => Some(Literal::Integer(text.parse().map_err(
                |_| self.stream.error_here(format!("integer literal '{text}' is out of range")),
            )?)),
            TokenKind::FloatLiteral(text) => {
                let value: f64 = text.parse().map_err(|_| {
                    self.stream.error_here(format!("invalid float literal '{text}'"))
                })?;
                if !value.is_finite() {
                    return Err(self
                        .stream
                        .error_here(format!("float literal '{text}' is out of range")));
                }
                Some(Literal::Float(value))
            }
            TokenKind::StringLiteral(value) => Some(Literal::String(value.clone())),
            TokenKind::True => Some(Literal::Boolean(true)),
            TokenKind::False => Some(Literal::Boolean(false)),
            TokenKind::Null => Some(Literal::Null),
            _ => None,
        };
        if let Some(literal) = literal {
            self.stream.advance();
            return Ok(Expression::Literal(literal, span));
        }

        match token.kind {
            TokenKind::Parameter(name) => {
                self.stream.advance();
                Ok(Expression::Parameter(name, span))
            }
            TokenKind::LParen => {
                self.stream.advance();
                let inner = self.parse_expression()?;
                let end = self.stream.expect(TokenKind::RParen)?;
                Ok(Expression::Parenthesized(
                    Box::new(inner),
                    merge_spans(&span, &end),
                ))
            }
            TokenKind::LBracket => self.parse_list(),
            TokenKind::LBrace => self.parse_map(),
            TokenKind::Identifier(_) | TokenKind::DelimitedIdentifier(_) => {
                if self.function_call_ahead() {
                    return self.parse_function_call();
                }
                let (name, span) = self.stream.expect_name("a variable")?;
                Ok(Expression::Variable(name, span))
            }
            ref kind if kind.is_keyword() && self.function_call_ahead() => {
                self.parse_function_call()
            }
            other => Err(self
                .stream
                .error_here(format!("expected an expression, found {other}"))),
        }
    }

    /// True when the tokens ahead read `name(.name)* (`.
    fn function_call_ahead(&self) -> bool {
        let is_name = |kind: &TokenKind| kind.is_identifier() || kind.is_keyword();
        let mut offset = 1;
        while self.stream.peek_kind(offset) == &TokenKind::Dot
            && is_name(self.stream.peek_kind(offset + 1))
        {
            offset += 2;
        }
        self.stream.peek_kind(offset) == &TokenKind::LParen
    }

    fn parse_function_call(&mut self) -> ParseResult<Expression> {
        let (first, start) = self.stream.expect_name("a function name")?;
        let mut name = first.to_string();
        while self.stream.consume(&TokenKind::Dot) {
            let (segment, _) = self.stream.expect_name("a function name")?;
            name.push('.');
            name.push_str(&segment);
        }
        self.stream.expect(TokenKind::LParen)?;

        let mut distinct = false;
        let mut star = false;
        let mut args = Vec::new();
        if self.stream.consume(&TokenKind::Star) {
            star = true;
        } else if !self.stream.check(&TokenKind::RParen) {
            distinct = self.stream.consume(&TokenKind::Distinct);
            args.push(self.parse_expression()?);
            while self.stream.consume(&TokenKind::Comma) {
                args.push(self.parse_expression()?);
            }
        }
        let end = self.stream.expect(TokenKind::RParen)?;

        Ok(Expression::FunctionCall(FunctionCall {
            name: SmolStr::new(name),
            distinct,
            args,
            star,
            span: merge_spans(&start, &end),
        }))
    }

    fn parse_list(&mut self) -> ParseResult<Expression> {
        let start = self.stream.expect(TokenKind::LBracket)?;
        let mut items = Vec::new();
        if !self.stream.check(&TokenKind::RBracket) {
            items.push(self.parse_expression()?);
            while self.stream.consume(&TokenKind::Comma) {
                items.push(self.parse_expression()?);
            }
        }
        let end = self.stream.expect(TokenKind::RBracket)?;
        Ok(Expression::List(items, merge_spans(&start, &end)))
    }

    fn parse_map(&mut self) -> ParseResult<Expression> {
        let start = self.stream.expect(TokenKind::LBrace)?;
        let mut entries = Vec::new();
        if !self.stream.check(&TokenKind::RBrace) {
            loop {
                let (name, span) = self.stream.expect_name("a map key")?;
                self.stream.expect(TokenKind::Colon)?;
                let value = self.parse_expression()?;
                entries.push(MapEntry {
                    key: PropertyKeyRef { name, span },
                    value,
                });
                if !self.stream.consume(&TokenKind::Comma) {
                    break;
                }
            }
        }
        let end = self.stream.expect(TokenKind::RBrace)?;
        Ok(Expression::Map(entries, merge_spans(&start, &end)))
    }
}

fn logical(operator: LogicalOperator, left: Expression, right: Expression) -> Expression {
    let span = merge_spans(&left.span(), &right.span());
    Expression::Logical(operator, Box::new(left), Box::new(right), span)
}

fn binary(operator: BinaryOperator, left: Expression, right: Expression) -> Expression {
    let span = merge_spans(&left.span(), &right.span());
    Expression::Binary(operator, Box::new(left), Box::new(right), span)
}

fn comparison(
    operator: ComparisonOperator,
    left: Expression,
    right: Option<Expression>,
) -> Expression {
    let end = right.as_ref().map(Expression::span).unwrap_or(left.span());
    let span = merge_spans(&left.span(), &end);
    Expression::Comparison(Comparison {
        operator,
        left: Box::new(left),
        right: right.map(Box::new),
        span,
    })
}
