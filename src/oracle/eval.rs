//! Predicate evaluation for the in-memory graph.
//!
//! Follows Cypher's three-valued logic: `null` propagates through
//! comparisons and arithmetic, and a row only passes `WHERE` when the
//! predicate is exactly `true`.

use std::cmp::Ordering;
use std::ops::ControlFlow;

use super::Satisfiability;
use super::memory::{Node, Value};
use crate::ast::visitor::{AstVisitor, walk_expression};
use crate::ast::{
    BinaryOperator, Comparison, ComparisonOperator, Expression, Literal, LogicalOperator,
    UnaryOperator,
};
use crate::parser::parse_expression;
use regex::Regex;

const FUNCTIONS: &[&str] = &[
    "tolower", "toupper", "size", "tostring", "tointeger", "tofloat", "abs", "coalesce", "trim",
];

/// Decides whether any node, bound to `variable`, satisfies `predicate`.
pub(super) fn satisfiable(nodes: &[Node], predicate: &str, variable: &str) -> Satisfiability {
    let expression = match parse_expression(predicate) {
        Ok(expression) => expression,
        Err(failure) => {
            return Satisfiability::Indeterminate(format!("predicate does not parse: {failure}"));
        }
    };

    let mut check = SupportCheck { variable };
    if let ControlFlow::Break(reason) = check.visit_expression(&expression) {
        return Satisfiability::Indeterminate(reason);
    }

    for node in nodes {
        let evaluator = Evaluator { variable, node };
        match evaluator.eval(&expression) {
            Ok(Value::Boolean(true)) => return Satisfiability::Satisfiable,
            Ok(Value::Boolean(false) | Value::Null) => {}
            Ok(other) => {
                return Satisfiability::Indeterminate(format!(
                    "predicate evaluates to a non-boolean value {other:?}"
                ));
            }
            Err(EvalError(reason)) => return Satisfiability::Indeterminate(reason),
        }
    }
    Satisfiability::Unsatisfiable
}

/// Rejects predicates that cannot be evaluated against a single node.
struct SupportCheck<'a> {
    variable: &'a str,
}

impl AstVisitor for SupportCheck<'_> {
    type Break = String;

    fn visit_expression(&mut self, expression: &Expression) -> ControlFlow<String> {
        match expression {
            Expression::Variable(name, _) if name != self.variable => {
                ControlFlow::Break(format!("unknown variable '{name}'"))
            }
            Expression::Parameter(name, _) => {
                ControlFlow::Break(format!("parameter ${name} has no value"))
            }
            Expression::FunctionCall(call)
                if !FUNCTIONS.contains(&call.name.to_ascii_lowercase().as_str()) =>
            {
                ControlFlow::Break(format!("function {}() is not supported", call.name))
            }
            Expression::Map(..) => ControlFlow::Break("map values are not supported".into()),
            _ => walk_expression(self, expression),
        }
    }
}

#[derive(Debug)]
struct EvalError(String);

type EvalResult = Result<Value, EvalError>;

struct Evaluator<'g> {
    variable: &'g str,
    node: &'g Node,
}

impl Evaluator<'_> {
    fn eval(&self, expression: &Expression) -> EvalResult {
        match expression {
            Expression::Literal(literal, _) => Ok(literal_value(literal)),
            Expression::Variable(name, _) => Err(EvalError(format!(
                "variable '{name}' is a node, not a value"
            ))),
            Expression::Parameter(name, _) => {
                Err(EvalError(format!("parameter ${name} has no value")))
            }
            Expression::Property(base, key, _) => match base.as_ref() {
                Expression::Variable(name, _) if name == self.variable => Ok(self
                    .node
                    .property(&key.name)
                    .cloned()
                    .unwrap_or(Value::Null)),
                _ => Err(EvalError("nested property access is not supported".into())),
            },
            Expression::Index(base, index, _) => {
                match (self.eval(base)?, self.eval(index)?) {
                    (Value::List(items), Value::Integer(i)) => {
                        let len = items.len() as i64;
                        let position = if i < 0 { len + i } else { i };
                        Ok(usize::try_from(position)
                            .ok()
                            .and_then(|p| items.get(p).cloned())
                            .unwrap_or(Value::Null))
                    }
                    (Value::Null, _) | (_, Value::Null) => Ok(Value::Null),
                    _ => Err(EvalError("invalid index expression".into())),
                }
            }
            Expression::Unary(op, operand, _) => {
                let value = self.eval(operand)?;
                match (op, value) {
                    (_, Value::Null) => Ok(Value::Null),
                    (UnaryOperator::Not, Value::Boolean(b)) => Ok(Value::Boolean(!b)),
                    (UnaryOperator::Minus, Value::Integer(i)) => i
                        .checked_neg()
                        .map(Value::Integer)
                        .ok_or_else(|| EvalError("integer overflow".into())),
                    (UnaryOperator::Minus, Value::Float(f)) => Ok(Value::Float(-f)),
                    (UnaryOperator::Plus, v @ (Value::Integer(_) | Value::Float(_))) => Ok(v),
                    (op, v) => Err(EvalError(format!("cannot apply {op:?} to {v:?}"))),
                }
            }
            Expression::Binary(op, left, right, _) => {
                arithmetic(*op, self.eval(left)?, self.eval(right)?)
            }
            Expression::Comparison(comparison) => self.compare(comparison),
            Expression::Logical(op, left, right, _) => {
                let left = truth(self.eval(left)?)?;
                let right = truth(self.eval(right)?)?;
                let result = match op {
                    LogicalOperator::And => match (left, right) {
                        (Some(false), _) | (_, Some(false)) => Some(false),
                        (Some(true), Some(true)) => Some(true),
                        _ => None,
                    },
                    LogicalOperator::Or => match (left, right) {
                        (Some(true), _) | (_, Some(true)) => Some(true),
                        (Some(false), Some(false)) => Some(false),
                        _ => None,
                    },
                    LogicalOperator::Xor => match (left, right) {
                        (Some(a), Some(b)) => Some(a != b),
                        _ => None,
                    },
                };
                Ok(result.map(Value::Boolean).unwrap_or(Value::Null))
            }
            Expression::HasLabels(base, labels, _) => match base.as_ref() {
                Expression::Variable(name, _) if name == self.variable => Ok(Value::Boolean(
                    labels.iter().all(|label| self.node.has_label(&label.name)),
                )),
                _ => Err(EvalError("label test on a non-node value".into())),
            },
            Expression::FunctionCall(call) => {
                let args = call
                    .args
                    .iter()
                    .map(|arg| self.eval(arg))
                    .collect::<Result<Vec<_>, _>>()?;
                call_function(&call.name, args)
            }
            Expression::List(items, _) => items
                .iter()
                .map(|item| self.eval(item))
                .collect::<Result<Vec<_>, _>>()
                .map(Value::List),
            Expression::Map(..) => Err(EvalError("map values are not supported".into())),
            Expression::Parenthesized(inner, _) => self.eval(inner),
        }
    }

    fn compare(&self, comparison: &Comparison) -> EvalResult {
        let left = self.eval(&comparison.left)?;
        let right = match &comparison.right {
            Some(right) => self.eval(right)?,
            None => Value::Null,
        };

        use ComparisonOperator as Op;
        let result = match comparison.operator {
            Op::IsNull => return Ok(Value::Boolean(left == Value::Null)),
            Op::IsNotNull => return Ok(Value::Boolean(left != Value::Null)),
            _ if left == Value::Null || right == Value::Null => return Ok(Value::Null),
            Op::Eq => equals(&left, &right),
            Op::NotEq => equals(&left, &right).map(|eq| !eq),
            Op::Lt => order(&left, &right).map(|o| o == Ordering::Less),
            Op::LtEq => order(&left, &right).map(|o| o != Ordering::Greater),
            Op::Gt => order(&left, &right).map(|o| o == Ordering::Greater),
            Op::GtEq => order(&left, &right).map(|o| o != Ordering::Less),
            Op::RegexMatch => match (&left, &right) {
                (Value::String(text), Value::String(pattern)) => {
                    let regex = Regex::new(&format!("^(?:{pattern})$"))
                        .map_err(|e| EvalError(format!("invalid regular expression: {e}")))?;
                    Some(regex.is_match(text))
                }
                _ => None,
            },
            Op::In => match &right {
                Value::List(items) => {
                    if items.iter().any(|item| equals(&left, item) == Some(true)) {
                        Some(true)
                    } else if items.iter().any(|item| *item == Value::Null) {
                        None
                    } else {
                        Some(false)
                    }
                }
                _ => return Err(EvalError("IN expects a list".into())),
            },
            Op::StartsWith | Op::EndsWith | Op::Contains => match (&left, &right) {
                (Value::String(text), Value::String(needle)) => Some(match comparison.operator {
                    Op::StartsWith => text.starts_with(needle.as_str()),
                    Op::EndsWith => text.ends_with(needle.as_str()),
                    _ => text.contains(needle.as_str()),
                }),
                _ => None,
            },
        };
        Ok(result.map(Value::Boolean).unwrap_or(Value::Null))
    }
}

fn literal_value(literal: &Literal) -> Value {
    match literal {
        Literal::Integer(i) => Value::Integer(*i),
        Literal::Float(f) => Value::Float(*f),
        Literal::String(s) => Value::String(s.to_string()),
        Literal::Boolean(b) => Value::Boolean(*b),
        Literal::Null => Value::Null,
    }
}

fn truth(value: Value) -> Result<Option<bool>, EvalError> {
    match value {
        Value::Boolean(b) => Ok(Some(b)),
        Value::Null => Ok(None),
        other => Err(EvalError(format!("expected a boolean, found {other:?}"))),
    }
}

fn as_float(value: &Value) -> Option<f64> {
    match value {
        Value::Integer(i) => Some(*i as f64),
        Value::Float(f) => Some(*f),
        _ => None,
    }
}

/// Cypher equality: values of different kinds are simply unequal,
/// `None` when a null is involved inside a list.
fn equals(left: &Value, right: &Value) -> Option<bool> {
    match (left, right) {
        (Value::Null, _) | (_, Value::Null) => None,
        (Value::List(a), Value::List(b)) => {
            if a.len() != b.len() {
                return Some(false);
            }
            let mut unknown = false;
            for (x, y) in a.iter().zip(b) {
                match equals(x, y) {
                    Some(false) => return Some(false),
                    None => unknown = true,
                    Some(true) => {}
                }
            }
            if unknown { None } else { Some(true) }
        }
        _ => match (as_float(left), as_float(right)) {
            (Some(a), Some(b)) => Some(a == b),
            _ => Some(left == right),
        },
    }
}

/// Ordering for `<`-style comparisons; `None` for incomparable kinds.
fn order(left: &Value, right: &Value) -> Option<Ordering> {
    match (left, right) {
        (Value::Integer(a), Value::Integer(b)) => Some(a.cmp(b)),
        (Value::String(a), Value::String(b)) => Some(a.cmp(b)),
        (Value::Boolean(a), Value::Boolean(b)) => Some(a.cmp(b)),
        _ => match (as_float(left), as_float(right)) {
            (Some(a), Some(b)) => a.partial_cmp(&b),
            _ => None,
        },
    }
}

fn arithmetic(op: BinaryOperator, left: Value, right: Value) -> EvalResult {
    if left == Value::Null || right == Value::Null {
        return Ok(Value::Null);
    }
    let overflow = || EvalError("integer overflow".into());

    match (op, &left, &right) {
        (BinaryOperator::Add, Value::String(a), Value::String(b)) => {
            Ok(Value::String(format!("{a}{b}")))
        }
        (BinaryOperator::Add, Value::List(a), Value::List(b)) => {
            Ok(Value::List(a.iter().chain(b).cloned().collect()))
        }
        (_, Value::Integer(a), Value::Integer(b)) => {
            let (a, b) = (*a, *b);
            let result = match op {
                BinaryOperator::Add => a.checked_add(b),
                BinaryOperator::Subtract => a.checked_sub(b),
                BinaryOperator::Multiply => a.checked_mul(b),
                BinaryOperator::Divide if b == 0 => {
                    return Err(EvalError("division by zero".into()));
                }
                BinaryOperator::Divide => a.checked_div(b),
                BinaryOperator::Modulo if b == 0 => {
                    return Err(EvalError("division by zero".into()));
                }
                BinaryOperator::Modulo => a.checked_rem(b),
                BinaryOperator::Power => return Ok(Value::Float((a as f64).powf(b as f64))),
            };
            result.map(Value::Integer).ok_or_else(overflow)
        }
        _ => match (as_float(&left), as_float(&right)) {
            (Some(a), Some(b)) => Ok(Value::Float(match op {
                BinaryOperator::Add => a + b,
                BinaryOperator::Subtract => a - b,
                BinaryOperator::Multiply => a * b,
                BinaryOperator::Divide => a / b,
                BinaryOperator::Modulo => a % b,
                BinaryOperator::Power => a.powf(b),
            })),
            _ => Err(EvalError(format!(
                "cannot apply {op:?} to {left:?} and {right:?}"
            ))),
        },
    }
}

fn call_function(name: &str, args: Vec<Value>) -> EvalResult {
    let lowered = name.to_ascii_lowercase();
    if lowered == "coalesce" {
        return Ok(args
            .into_iter()
            .find(|v| *v != Value::Null)
            .unwrap_or(Value::Null));
    }

    let [arg] = <[Value; 1]>::try_from(args)
        .map_err(|_| EvalError(format!("{name}() takes exactly one argument")))?;
    if arg == Value::Null {
        return Ok(Value::Null);
    }

    let result = match (lowered.as_str(), arg) {
        ("tolower", Value::String(s)) => Value::String(s.to_lowercase()),
        ("toupper", Value::String(s)) => Value::String(s.to_uppercase()),
        ("trim", Value::String(s)) => Value::String(s.trim().to_string()),
        ("size", Value::String(s)) => Value::Integer(s.chars().count() as i64),
        ("size", Value::List(items)) => Value::Integer(items.len() as i64),
        ("tostring", Value::String(s)) => Value::String(s),
        ("tostring", Value::Integer(i)) => Value::String(i.to_string()),
        ("tostring", Value::Float(f)) => Value::String(format!("{f:?}")),
        ("tostring", Value::Boolean(b)) => Value::String(b.to_string()),
        ("tointeger", Value::Integer(i)) => Value::Integer(i),
        ("tointeger", Value::Float(f)) => Value::Integer(f.trunc() as i64),
        ("tointeger", Value::String(s)) => s
            .trim()
            .parse::<i64>()
            .map(Value::Integer)
            .unwrap_or(Value::Null),
        ("tofloat", Value::Integer(i)) => Value::Float(i as f64),
        ("tofloat", Value::Float(f)) => Value::Float(f),
        ("tofloat", Value::String(s)) => {
            s.trim().parse::<f64>().map(Value::Float).unwrap_or(Value::Null)
        }
        ("abs", Value::Integer(i)) => Value::Integer(i.checked_abs().ok_or_else(|| {
            EvalError("integer overflow".into())
        })?),
        ("abs", Value::Float(f)) => Value::Float(f.abs()),
        (_, arg) => {
            return Err(EvalError(format!("{name}() cannot be applied to {arg:?}")));
        }
    };
    Ok(result)
}
