//! Expression nodes.
//!
//! Every expression renders back to canonical Cypher text through `Display`.
//! The debugger relies on that rendering when it hands a single `WHERE`
//! condition to the graph for a satisfiability probe, so the output must
//! re-parse to the same tree.

use super::Span;
use super::query::{LabelRef, PropertyKeyRef};
use smol_str::SmolStr;
use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
    Literal(Literal, Span),
    Variable(SmolStr, Span),
    /// `$name`, stored without the dollar sign.
    Parameter(SmolStr, Span),
    /// `base.key`
    Property(Box<Expression>, PropertyKeyRef, Span),
    /// `base[index]`
    Index(Box<Expression>, Box<Expression>, Span),
    Unary(UnaryOperator, Box<Expression>, Span),
    Binary(BinaryOperator, Box<Expression>, Box<Expression>, Span),
    Comparison(Comparison),
    Logical(LogicalOperator, Box<Expression>, Box<Expression>, Span),
    /// `n:Label:Other`
    HasLabels(Box<Expression>, Vec<LabelRef>, Span),
    FunctionCall(FunctionCall),
    List(Vec<Expression>, Span),
    Map(Vec<MapEntry>, Span),
    Parenthesized(Box<Expression>, Span),
}

impl Expression {
    pub fn span(&self) -> Span {
        match self {
            Expression::Literal(_, span)
            | Expression::Variable(_, span)
            | Expression::Parameter(_, span)
            | Expression::Property(_, _, span)
            | Expression::Index(_, _, span)
            | Expression::Unary(_, _, span)
            | Expression::Binary(_, _, _, span)
            | Expression::Logical(_, _, _, span)
            | Expression::HasLabels(_, _, span)
            | Expression::List(_, span)
            | Expression::Map(_, span)
            | Expression::Parenthesized(_, span) => span.clone(),
            Expression::Comparison(cmp) => cmp.span.clone(),
            Expression::FunctionCall(call) => call.span.clone(),
        }
    }

    /// Returns `(variable, key)` when this is `variable.key`.
    pub fn as_variable_property(&self) -> Option<(&SmolStr, &PropertyKeyRef)> {
        match self {
            Expression::Property(base, key, _) => match base.as_ref() {
                Expression::Variable(name, _) => Some((name, key)),
                _ => None,
            },
            _ => None,
        }
    }

    /// Strips any number of enclosing parentheses.
    pub fn unparenthesized(&self) -> &Expression {
        let mut current = self;
        while let Expression::Parenthesized(inner, _) = current {
            current = inner;
        }
        current
    }

    /// Splits a chain of `AND`s into its conjuncts, left to right.
    ///
    /// Parentheses around a conjunct are looked through, so
    /// `(a AND b) AND c` yields three items.
    pub fn conjuncts(&self) -> Vec<&Expression> {
        let mut out = Vec::new();
        collect_conjuncts(self, &mut out);
        out
    }
}

fn collect_conjuncts<'a>(expr: &'a Expression, out: &mut Vec<&'a Expression>) {
    match expr.unparenthesized() {
        Expression::Logical(LogicalOperator::And, left, right, _) => {
            collect_conjuncts(left, out);
            collect_conjuncts(right, out);
        }
        _ => out.push(expr),
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    Integer(i64),
    Float(f64),
    String(SmolStr),
    Boolean(bool),
    Null,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOperator {
    Not,
    Minus,
    Plus,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOperator {
    Add,
    Subtract,
    Multiply,
    Divide,
    Modulo,
    Power,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogicalOperator {
    And,
    Or,
    Xor,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComparisonOperator {
    Eq,
    /// Both `<>` and `!=`.
    NotEq,
    Lt,
    LtEq,
    Gt,
    GtEq,
    RegexMatch,
    In,
    StartsWith,
    EndsWith,
    Contains,
    IsNull,
    IsNotNull,
}

impl ComparisonOperator {
    /// Postfix null tests take no right operand.
    pub fn is_postfix(self) -> bool {
        matches!(self, ComparisonOperator::IsNull | ComparisonOperator::IsNotNull)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ComparisonOperator::Eq => "=",
            ComparisonOperator::NotEq => "<>",
            ComparisonOperator::Lt => "<",
            ComparisonOperator::LtEq => "<=",
            ComparisonOperator::Gt => ">",
            ComparisonOperator::GtEq => ">=",
            ComparisonOperator::RegexMatch => "=~",
            ComparisonOperator::In => "IN",
            ComparisonOperator::StartsWith => "STARTS WITH",
            ComparisonOperator::EndsWith => "ENDS WITH",
            ComparisonOperator::Contains => "CONTAINS",
            ComparisonOperator::IsNull => "IS NULL",
            ComparisonOperator::IsNotNull => "IS NOT NULL",
        }
    }
}

/// A binary comparison or postfix null test.
#[derive(Debug, Clone, PartialEq)]
pub struct Comparison {
    pub operator: ComparisonOperator,
    pub left: Box<Expression>,
    /// `None` exactly when the operator is postfix.
    pub right: Option<Box<Expression>>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FunctionCall {
    /// Possibly namespaced, e.g. `apoc.meta.type`.
    pub name: SmolStr,
    pub distinct: bool,
    pub args: Vec<Expression>,
    /// `count(*)`
    pub star: bool,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MapEntry {
    pub key: PropertyKeyRef,
    pub value: Expression,
}

/// Writes a name, backtick-quoting it unless it is a plain identifier.
pub(crate) fn write_name(f: &mut fmt::Formatter<'_>, name: &str) -> fmt::Result {
    let mut chars = name.chars();
    let plain = match chars.next() {
        Some(first) => {
            (first.is_alphabetic() || first == '_')
                && chars.all(|c| c.is_alphanumeric() || c == '_')
        }
        None => false,
    };
    if plain {
        write!(f, "{name}")
    } else {
        write!(f, "`{}`", name.replace('`', "``"))
    }
}

/// Displays a schema name, backtick-quoted when it is not a plain identifier.
#[derive(Debug, Clone, Copy)]
pub struct Name<'a>(pub &'a str);

impl fmt::Display for Name<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_name(f, self.0)
    }
}

impl fmt::Display for Comparison {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.right {
            Some(right) => write!(f, "{} {} {}", self.left, self.operator, right),
            None => write!(f, "{} {}", self.left, self.operator),
        }
    }
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Literal::Integer(value) => write!(f, "{value}"),
            Literal::Float(value) => write!(f, "{value:?}"),
            Literal::String(value) => {
                write!(f, "'")?;
                for ch in value.chars() {
                    match ch {
                        '\'' => write!(f, "\\'")?,
                        '\\' => write!(f, "\\\\")?,
                        '\n' => write!(f, "\\n")?,
                        '\t' => write!(f, "\\t")?,
                        '\r' => write!(f, "\\r")?,
                        other => write!(f, "{other}")?,
                    }
                }
                write!(f, "'")
            }
            Literal::Boolean(true) => write!(f, "true"),
            Literal::Boolean(false) => write!(f, "false"),
            Literal::Null => write!(f, "null"),
        }
    }
}

impl fmt::Display for ComparisonOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expression::Literal(literal, _) => write!(f, "{literal}"),
            Expression::Variable(name, _) => write_name(f, name),
            Expression::Parameter(name, _) => write!(f, "${name}"),
            Expression::Property(base, key, _) => {
                write!(f, "{base}.")?;
                write_name(f, &key.name)
            }
            Expression::Index(base, index, _) => write!(f, "{base}[{index}]"),
            Expression::Unary(op, operand, _) => match op {
                UnaryOperator::Not => write!(f, "NOT {operand}"),
                UnaryOperator::Minus => write!(f, "-{operand}"),
                UnaryOperator::Plus => write!(f, "+{operand}"),
            },
            Expression::Binary(op, left, right, _) => {
                let symbol = match op {
                    BinaryOperator::Add => "+",
                    BinaryOperator::Subtract => "-",
                    BinaryOperator::Multiply => "*",
                    BinaryOperator::Divide => "/",
                    BinaryOperator::Modulo => "%",
                    BinaryOperator::Power => "^",
                };
                write!(f, "{left} {symbol} {right}")
            }
            Expression::Comparison(cmp) => write!(f, "{cmp}"),
            Expression::Logical(op, left, right, _) => {
                let keyword = match op {
                    LogicalOperator::And => "AND",
                    LogicalOperator::Or => "OR",
                    LogicalOperator::Xor => "XOR",
                };
                write!(f, "{left} {keyword} {right}")
            }
            Expression::HasLabels(base, labels, _) => {
                write!(f, "{base}")?;
                for label in labels {
                    write!(f, ":")?;
                    write_name(f, &label.name)?;
                }
                Ok(())
            }
            Expression::FunctionCall(call) => {
                write!(f, "{}(", call.name)?;
                if call.star {
                    write!(f, "*")?;
                } else {
                    if call.distinct {
                        write!(f, "DISTINCT ")?;
                    }
                    for (i, arg) in call.args.iter().enumerate() {
                        if i > 0 {
                            write!(f, ", ")?;
                        }
                        write!(f, "{arg}")?;
                    }
                }
                write!(f, ")")
            }
            Expression::List(items, _) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{item}")?;
                }
                write!(f, "]")
            }
            Expression::Map(entries, _) => {
                write!(f, "{{")?;
                for (i, entry) in entries.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write_name(f, &entry.key.name)?;
                    write!(f, ": {}", entry.value)?;
                }
                write!(f, "}}")
            }
            Expression::Parenthesized(inner, _) => write!(f, "({inner})"),
        }
    }
}
