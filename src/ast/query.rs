//! Clause and pattern nodes.

use super::Span;
use super::expression::Expression;
use smol_str::SmolStr;
use std::fmt;

/// A parsed query: a sequence of clauses, at most one statement.
#[derive(Debug, Clone, PartialEq)]
pub struct Program {
    pub clauses: Vec<Clause>,
    pub span: Span,
}

impl Program {
    /// Iterates over every `MATCH` / `OPTIONAL MATCH` clause in source order.
    pub fn match_clauses(&self) -> impl Iterator<Item = &MatchClause> {
        self.clauses.iter().filter_map(|clause| match clause {
            Clause::Match(m) => Some(m),
            _ => None,
        })
    }
}

/// A top-level query clause.
#[derive(Debug, Clone, PartialEq)]
pub enum Clause {
    Match(MatchClause),
    With(WithClause),
    Unwind(UnwindClause),
    Return(ReturnClause),
}

impl Clause {
    pub fn span(&self) -> Span {
        match self {
            Clause::Match(c) => c.span.clone(),
            Clause::With(c) => c.span.clone(),
            Clause::Unwind(c) => c.span.clone(),
            Clause::Return(c) => c.span.clone(),
        }
    }
}

/// `[OPTIONAL] MATCH pattern, pattern ... [WHERE expr]`
#[derive(Debug, Clone, PartialEq)]
pub struct MatchClause {
    pub optional: bool,
    pub patterns: Vec<PathPattern>,
    pub where_clause: Option<Expression>,
    pub span: Span,
}

/// `WITH projection [WHERE expr]`
#[derive(Debug, Clone, PartialEq)]
pub struct WithClause {
    pub projection: Projection,
    pub where_clause: Option<Expression>,
    pub span: Span,
}

/// `UNWIND expr AS variable`
#[derive(Debug, Clone, PartialEq)]
pub struct UnwindClause {
    pub expression: Expression,
    pub variable: SmolStr,
    pub span: Span,
}

/// `RETURN projection`
#[derive(Debug, Clone, PartialEq)]
pub struct ReturnClause {
    pub projection: Projection,
    pub span: Span,
}

/// The body shared by `WITH` and `RETURN`.
#[derive(Debug, Clone, PartialEq)]
pub struct Projection {
    pub distinct: bool,
    pub items: ProjectionItems,
    pub order_by: Vec<SortItem>,
    pub skip: Option<Expression>,
    pub limit: Option<Expression>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ProjectionItems {
    /// `*`
    Star,
    Items(Vec<ProjectionItem>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProjectionItem {
    pub expression: Expression,
    pub alias: Option<SmolStr>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SortItem {
    pub expression: Expression,
    pub direction: SortDirection,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    #[default]
    Ascending,
    Descending,
}

/// A path: a start node followed by zero or more relationship/node steps.
#[derive(Debug, Clone, PartialEq)]
pub struct PathPattern {
    /// Path variable in `p = (a)-->(b)`.
    pub variable: Option<SmolStr>,
    pub start: NodePattern,
    pub steps: Vec<PathStep>,
    pub span: Span,
}

impl PathPattern {
    /// Iterates over every relationship in the path with its two endpoints
    /// in written (left, right) order.
    pub fn relationships(&self) -> impl Iterator<Item = Relationship<'_>> {
        let mut left = &self.start;
        self.steps.iter().map(move |step| {
            let rel = Relationship {
                left,
                detail: &step.relationship,
                right: &step.node,
            };
            left = &step.node;
            rel
        })
    }

    /// Iterates over every node in the path in written order.
    pub fn nodes(&self) -> impl Iterator<Item = &NodePattern> {
        std::iter::once(&self.start).chain(self.steps.iter().map(|step| &step.node))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PathStep {
    pub relationship: RelationshipDetail,
    pub node: NodePattern,
}

/// `(variable:Label:Other {key: value})`
#[derive(Debug, Clone, PartialEq)]
pub struct NodePattern {
    pub variable: Option<SmolStr>,
    pub labels: Vec<LabelRef>,
    pub properties: Vec<PropertyEntry>,
    pub span: Span,
}

/// A label or relationship type name as written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelRef {
    pub name: SmolStr,
    pub span: Span,
}

/// A property key as written, either in a map or after a `.`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropertyKeyRef {
    pub name: SmolStr,
    pub span: Span,
}

/// One `key: value` entry in an inline property map.
#[derive(Debug, Clone, PartialEq)]
pub struct PropertyEntry {
    pub key: PropertyKeyRef,
    pub value: Expression,
}

/// The `-[r:TYPE|OTHER*1..3 {k: v}]->` part of a path step.
#[derive(Debug, Clone, PartialEq)]
pub struct RelationshipDetail {
    pub variable: Option<SmolStr>,
    pub types: Vec<LabelRef>,
    pub direction: Direction,
    pub length: Option<LengthRange>,
    pub properties: Vec<PropertyEntry>,
    pub span: Span,
}

/// Arrow direction as written, relative to the left node of the step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    /// `(a)-->(b)`
    Forward,
    /// `(a)<--(b)`
    Backward,
    /// `(a)--(b)` or `(a)<-->(b)`
    Undirected,
}

impl Direction {
    pub fn is_directed(self) -> bool {
        !matches!(self, Direction::Undirected)
    }

    /// The opposite arrow, undirected stays undirected.
    pub fn reversed(self) -> Self {
        match self {
            Direction::Forward => Direction::Backward,
            Direction::Backward => Direction::Forward,
            Direction::Undirected => Direction::Undirected,
        }
    }
}

/// Variable-length bounds: `*` is `{None, None}`, `*2` is `{2, 2}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LengthRange {
    pub min: Option<u32>,
    pub max: Option<u32>,
}

/// A borrowed view of one relationship with its endpoints.
#[derive(Debug, Clone, Copy)]
pub struct Relationship<'a> {
    pub left: &'a NodePattern,
    pub detail: &'a RelationshipDetail,
    pub right: &'a NodePattern,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Forward => write!(f, "->"),
            Direction::Backward => write!(f, "<-"),
            Direction::Undirected => write!(f, "--"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(label: &str, start: usize) -> NodePattern {
        NodePattern {
            variable: None,
            labels: vec![LabelRef {
                name: label.into(),
                span: start..start + label.len(),
            }],
            properties: Vec::new(),
            span: start..start + label.len() + 3,
        }
    }

    fn rel(direction: Direction) -> RelationshipDetail {
        RelationshipDetail {
            variable: None,
            types: Vec::new(),
            direction,
            length: None,
            properties: Vec::new(),
            span: 0..0,
        }
    }

    #[test]
    fn relationships_pair_adjacent_nodes() {
        let path = PathPattern {
            variable: None,
            start: node("A", 0),
            steps: vec![
                PathStep {
                    relationship: rel(Direction::Forward),
                    node: node("B", 10),
                },
                PathStep {
                    relationship: rel(Direction::Backward),
                    node: node("C", 20),
                },
            ],
            span: 0..30,
        };

        let pairs: Vec<_> = path
            .relationships()
            .map(|r| {
                (
                    r.left.labels[0].name.clone(),
                    r.detail.direction,
                    r.right.labels[0].name.clone(),
                )
            })
            .collect();
        assert_eq!(
            pairs,
            vec![
                ("A".into(), Direction::Forward, "B".into()),
                ("B".into(), Direction::Backward, "C".into()),
            ]
        );
        assert_eq!(path.nodes().count(), 3);
    }

    #[test]
    fn direction_reversal() {
        assert_eq!(Direction::Forward.reversed(), Direction::Backward);
        assert_eq!(Direction::Undirected.reversed(), Direction::Undirected);
        assert!(!Direction::Undirected.is_directed());
    }
}
