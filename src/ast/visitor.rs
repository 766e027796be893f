//! Read-only AST traversal.
//!
//! Implementors override the `visit_*` hooks they care about and call the
//! matching `walk_*` function to keep descending. Returning
//! `ControlFlow::Break` stops the whole traversal.

use std::ops::ControlFlow;

use super::expression::{Comparison, Expression};
use super::query::{
    Clause, LabelRef, NodePattern, PathPattern, Program, Projection, ProjectionItems,
    PropertyKeyRef, Relationship, RelationshipDetail,
};

pub type VisitResult<B> = ControlFlow<B>;

macro_rules! try_visit {
    ($expr:expr) => {
        match $expr {
            ControlFlow::Continue(()) => {}
            ControlFlow::Break(b) => return ControlFlow::Break(b),
        }
    };
}

pub trait AstVisitor {
    /// Early-exit payload produced when traversal stops.
    type Break;

    fn visit_program(&mut self, program: &Program) -> VisitResult<Self::Break> {
        walk_program(self, program)
    }

    fn visit_clause(&mut self, clause: &Clause) -> VisitResult<Self::Break> {
        walk_clause(self, clause)
    }

    fn visit_path_pattern(&mut self, pattern: &PathPattern) -> VisitResult<Self::Break> {
        walk_path_pattern(self, pattern)
    }

    fn visit_node_pattern(&mut self, node: &NodePattern) -> VisitResult<Self::Break> {
        walk_node_pattern(self, node)
    }

    /// Called once per relationship, before its detail and right node.
    fn visit_relationship(&mut self, _relationship: Relationship<'_>) -> VisitResult<Self::Break> {
        ControlFlow::Continue(())
    }

    fn visit_relationship_detail(
        &mut self,
        detail: &RelationshipDetail,
    ) -> VisitResult<Self::Break> {
        walk_relationship_detail(self, detail)
    }

    /// Called for node labels and for `n:Label` predicates.
    fn visit_label(&mut self, _label: &LabelRef) -> VisitResult<Self::Break> {
        ControlFlow::Continue(())
    }

    /// Called for relationship type names.
    fn visit_relationship_type(&mut self, _rel_type: &LabelRef) -> VisitResult<Self::Break> {
        ControlFlow::Continue(())
    }

    /// Called for map keys in patterns and for every `.key` access.
    fn visit_property_key(&mut self, _key: &PropertyKeyRef) -> VisitResult<Self::Break> {
        ControlFlow::Continue(())
    }

    /// Called with the full `WHERE` expression of a `MATCH` or `WITH`.
    fn visit_where(&mut self, predicate: &Expression) -> VisitResult<Self::Break> {
        self.visit_expression(predicate)
    }

    fn visit_expression(&mut self, expression: &Expression) -> VisitResult<Self::Break> {
        walk_expression(self, expression)
    }

    fn visit_comparison(&mut self, comparison: &Comparison) -> VisitResult<Self::Break> {
        walk_comparison(self, comparison)
    }
}

pub fn walk_program<V: AstVisitor + ?Sized>(
    visitor: &mut V,
    program: &Program,
) -> VisitResult<V::Break> {
    for clause in &program.clauses {
        try_visit!(visitor.visit_clause(clause));
    }
    ControlFlow::Continue(())
}

pub fn walk_clause<V: AstVisitor + ?Sized>(
    visitor: &mut V,
    clause: &Clause,
) -> VisitResult<V::Break> {
    match clause {
        Clause::Match(m) => {
            for pattern in &m.patterns {
                try_visit!(visitor.visit_path_pattern(pattern));
            }
            if let Some(predicate) = &m.where_clause {
                try_visit!(visitor.visit_where(predicate));
            }
        }
        Clause::With(w) => {
            try_visit!(walk_projection(visitor, &w.projection));
            if let Some(predicate) = &w.where_clause {
                try_visit!(visitor.visit_where(predicate));
            }
        }
        Clause::Unwind(u) => try_visit!(visitor.visit_expression(&u.expression)),
        Clause::Return(r) => try_visit!(walk_projection(visitor, &r.projection)),
    }
    ControlFlow::Continue(())
}

pub fn walk_projection<V: AstVisitor + ?Sized>(
    visitor: &mut V,
    projection: &Projection,
) -> VisitResult<V::Break> {
    if let ProjectionItems::Items(items) = &projection.items {
        for item in items {
            try_visit!(visitor.visit_expression(&item.expression));
        }
    }
    for sort in &projection.order_by {
        try_visit!(visitor.visit_expression(&sort.expression));
    }
    if let Some(skip) = &projection.skip {
        try_visit!(visitor.visit_expression(skip));
    }
    if let Some(limit) = &projection.limit {
        try_visit!(visitor.visit_expression(limit));
    }
    ControlFlow::Continue(())
}

/// Visits the start node, then for each step the relationship, its detail
/// and the step's node. Every node is visited exactly once.
pub fn walk_path_pattern<V: AstVisitor + ?Sized>(
    visitor: &mut V,
    pattern: &PathPattern,
) -> VisitResult<V::Break> {
    try_visit!(visitor.visit_node_pattern(&pattern.start));
    for (relationship, step) in pattern.relationships().zip(&pattern.steps) {
        try_visit!(visitor.visit_relationship(relationship));
        try_visit!(visitor.visit_relationship_detail(&step.relationship));
        try_visit!(visitor.visit_node_pattern(&step.node));
    }
    ControlFlow::Continue(())
}

pub fn walk_node_pattern<V: AstVisitor + ?Sized>(
    visitor: &mut V,
    node: &NodePattern,
) -> VisitResult<V::Break> {
    for label in &node.labels {
        try_visit!(visitor.visit_label(label));
    }
    for entry in &node.properties {
        try_visit!(visitor.visit_property_key(&entry.key));
        try_visit!(visitor.visit_expression(&entry.value));
    }
    ControlFlow::Continue(())
}

pub fn walk_relationship_detail<V: AstVisitor + ?Sized>(
    visitor: &mut V,
    detail: &RelationshipDetail,
) -> VisitResult<V::Break> {
    for rel_type in &detail.types {
        try_visit!(visitor.visit_relationship_type(rel_type));
    }
    for entry in &detail.properties {
        try_visit!(visitor.visit_property_key(&entry.key));
        try_visit!(visitor.visit_expression(&entry.value));
    }
    ControlFlow::Continue(())
}

pub fn walk_expression<V: AstVisitor + ?Sized>(
    visitor: &mut V,
    expression: &Expression,
) -> VisitResult<V::Break> {
    match expression {
        Expression::Literal(..) | Expression::Variable(..) | Expression::Parameter(..) => {}
        Expression::Property(base, key, _) => {
            try_visit!(visitor.visit_expression(base));
            try_visit!(visitor.visit_property_key(key));
        }
        Expression::Index(base, index, _) => {
            try_visit!(visitor.visit_expression(base));
            try_visit!(visitor.visit_expression(index));
        }
        Expression::Unary(_, operand, _) | Expression::Parenthesized(operand, _) => {
            try_visit!(visitor.visit_expression(operand));
        }
        Expression::Binary(_, left, right, _) | Expression::Logical(_, left, right, _) => {
            try_visit!(visitor.visit_expression(left));
            try_visit!(visitor.visit_expression(right));
        }
        Expression::Comparison(comparison) => try_visit!(visitor.visit_comparison(comparison)),
        Expression::HasLabels(base, labels, _) => {
            try_visit!(visitor.visit_expression(base));
            for label in labels {
                try_visit!(visitor.visit_label(label));
            }
        }
        Expression::FunctionCall(call) => {
            for arg in &call.args {
                try_visit!(visitor.visit_expression(arg));
            }
        }
        Expression::List(items, _) => {
            for item in items {
                try_visit!(visitor.visit_expression(item));
            }
        }
        Expression::Map(entries, _) => {
            // Map literal keys name result fields, not stored properties.
            for entry in entries {
                try_visit!(visitor.visit_expression(&entry.value));
            }
        }
    }
    ControlFlow::Continue(())
}

pub fn walk_comparison<V: AstVisitor + ?Sized>(
    visitor: &mut V,
    comparison: &Comparison,
) -> VisitResult<V::Break> {
    try_visit!(visitor.visit_expression(&comparison.left));
    if let Some(right) = &comparison.right {
        try_visit!(visitor.visit_expression(right));
    }
    ControlFlow::Continue(())
}
