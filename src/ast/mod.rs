//! Abstract syntax tree for the Cypher read-query subset.
//!
//! The tree keeps a byte span on every node that can be named in a finding,
//! so debugger output can always point back into the query text.

use std::ops::Range;

pub mod expression;
pub mod query;
pub mod visitor;

/// A byte range in the query text.
pub type Span = Range<usize>;

pub use expression::{
    BinaryOperator, Comparison, ComparisonOperator, Expression, FunctionCall, Literal,
    LogicalOperator, MapEntry, Name, UnaryOperator,
};
pub use query::{
    Clause, Direction, LabelRef, LengthRange, MatchClause, NodePattern, PathPattern, PathStep,
    Program, Projection, ProjectionItem, ProjectionItems, PropertyEntry, PropertyKeyRef,
    Relationship, RelationshipDetail, ReturnClause, SortDirection, SortItem, UnwindClause,
    WithClause,
};
pub use visitor::{AstVisitor, VisitResult};
