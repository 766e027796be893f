//! Collects the schema names, conditions and relationship patterns a query
//! refers to.

use crate::ast::visitor::{VisitResult, walk_comparison, walk_node_pattern};
use crate::ast::{
    AstVisitor, Comparison, ComparisonOperator, Direction, Expression, LabelRef, Literal,
    NodePattern, Program, PropertyKeyRef, Relationship, Span,
};
use crate::oracle::SchemaCategory;
use smol_str::SmolStr;
use std::collections::{BTreeSet, HashMap};
use std::convert::Infallible;
use std::ops::ControlFlow;

/// Everything the debugger checks, pulled out of one query.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractedComponents {
    pub labels: BTreeSet<SmolStr>,
    pub relationship_types: BTreeSet<SmolStr>,
    pub property_keys: BTreeSet<SmolStr>,
    /// Comparisons in traversal order.
    pub conditions: Vec<RawCondition>,
    /// Fixed-length relationships in traversal order.
    pub patterns: Vec<RelationshipPattern>,
    locations: HashMap<(SchemaCategory, SmolStr), Span>,
}

impl ExtractedComponents {
    /// The names referenced in `category`, sorted.
    pub fn names(&self, category: SchemaCategory) -> &BTreeSet<SmolStr> {
        match category {
            SchemaCategory::Label => &self.labels,
            SchemaCategory::RelationshipType => &self.relationship_types,
            SchemaCategory::PropertyKey => &self.property_keys,
        }
    }

    /// Where `name` is first referenced in the query.
    pub fn location(&self, category: SchemaCategory, name: &str) -> Option<Span> {
        self.locations.get(&(category, SmolStr::new(name))).cloned()
    }

    fn record(&mut self, category: SchemaCategory, name: &SmolStr, span: &Span) {
        let set = match category {
            SchemaCategory::Label => &mut self.labels,
            SchemaCategory::RelationshipType => &mut self.relationship_types,
            SchemaCategory::PropertyKey => &mut self.property_keys,
        };
        set.insert(name.clone());
        self.locations
            .entry((category, name.clone()))
            .or_insert_with(|| span.clone());
    }
}

/// A comparison as written, plus its operands when they have a simple shape.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawCondition {
    /// Canonical Cypher text of the comparison.
    pub text: String,
    pub shape: Option<ComparisonShape>,
    pub span: Span,
}

/// `variable.property <op> literal`, in either operand order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComparisonShape {
    pub variable: SmolStr,
    pub property: SmolStr,
    pub operator: ComparisonOperator,
    pub literal: LiteralClass,
}

/// What the non-property side of a comparison is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LiteralClass {
    Integer,
    Float,
    String,
    Boolean,
    Null,
    /// Anything that is not a literal: a parameter, a call, another property.
    Other,
}

impl LiteralClass {
    fn of(expression: &Expression) -> Self {
        match expression.unparenthesized() {
            Expression::Literal(Literal::Integer(_), _) => Self::Integer,
            Expression::Literal(Literal::Float(_), _) => Self::Float,
            Expression::Literal(Literal::String(_), _) => Self::String,
            Expression::Literal(Literal::Boolean(_), _) => Self::Boolean,
            Expression::Literal(Literal::Null, _) => Self::Null,
            _ => Self::Other,
        }
    }

    pub fn is_number(self) -> bool {
        matches!(self, Self::Integer | Self::Float)
    }
}

impl ComparisonShape {
    fn of(comparison: &Comparison) -> Option<Self> {
        let left = comparison.left.unparenthesized();
        let right = comparison.right.as_deref().map(Expression::unparenthesized);
        let ((variable, key), other) = match (left.as_variable_property(), right) {
            (Some(target), other) => (target, other),
            (None, Some(right)) => (right.as_variable_property()?, Some(left)),
            (None, None) => return None,
        };
        Some(Self {
            variable: variable.clone(),
            property: key.name.clone(),
            operator: comparison.operator,
            literal: other.map_or(LiteralClass::Other, LiteralClass::of),
        })
    }
}

/// A single relationship between two node patterns.
///
/// `source` and `target` are the left and right endpoints as written; the
/// arrow is carried separately in `direction`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelationshipPattern {
    pub source: Option<SmolStr>,
    pub rel_type: Option<SmolStr>,
    pub target: Option<SmolStr>,
    pub direction: Direction,
    pub span: Span,
}

impl RelationshipPattern {
    /// `(source, rel_type, target)` when all three are known.
    pub fn resolved(&self) -> Option<(&str, &str, &str)> {
        Some((
            self.source.as_deref()?,
            self.rel_type.as_deref()?,
            self.target.as_deref()?,
        ))
    }
}

/// Walks `program` once and returns what it references.
pub fn extract(program: &Program) -> ExtractedComponents {
    let mut extractor = Extractor::default();
    let _ = extractor.visit_program(program);
    extractor.finish()
}

#[derive(Debug, Default)]
struct Extractor {
    out: ExtractedComponents,
    /// First label each variable is bound to in a node pattern.
    bindings: HashMap<SmolStr, SmolStr>,
    pending: Vec<PendingPattern>,
}

#[derive(Debug)]
struct PendingPattern {
    source: Endpoint,
    rel_type: Option<SmolStr>,
    target: Endpoint,
    direction: Direction,
    span: Span,
}

#[derive(Debug)]
struct Endpoint {
    label: Option<SmolStr>,
    variable: Option<SmolStr>,
}

impl Endpoint {
    fn of(node: &NodePattern) -> Self {
        Self {
            label: node.labels.first().map(|label| label.name.clone()),
            variable: node.variable.clone(),
        }
    }

    fn resolve(self, bindings: &HashMap<SmolStr, SmolStr>) -> Option<SmolStr> {
        self.label
            .or_else(|| self.variable.and_then(|var| bindings.get(&var).cloned()))
    }
}

impl Extractor {
    fn finish(mut self) -> ExtractedComponents {
        // Labels bound later in the query still apply to earlier endpoints.
        for pending in self.pending {
            self.out.patterns.push(RelationshipPattern {
                source: pending.source.resolve(&self.bindings),
                rel_type: pending.rel_type,
                target: pending.target.resolve(&self.bindings),
                direction: pending.direction,
                span: pending.span,
            });
        }
        self.out
    }
}

impl AstVisitor for Extractor {
    type Break = Infallible;

    fn visit_node_pattern(&mut self, node: &NodePattern) -> VisitResult<Self::Break> {
        if let (Some(variable), Some(label)) = (&node.variable, node.labels.first()) {
            self.bindings
                .entry(variable.clone())
                .or_insert_with(|| label.name.clone());
        }
        walk_node_pattern(self, node)
    }

    fn visit_relationship(&mut self, relationship: Relationship<'_>) -> VisitResult<Self::Break> {
        let detail = relationship.detail;
        if detail.length.is_some() {
            tracing::debug!(
                span = ?detail.span,
                "variable-length relationship left out of connectivity checks"
            );
            return ControlFlow::Continue(());
        }
        self.pending.push(PendingPattern {
            source: Endpoint::of(relationship.left),
            rel_type: detail.types.first().map(|t| t.name.clone()),
            target: Endpoint::of(relationship.right),
            direction: detail.direction,
            span: relationship.left.span.start..relationship.right.span.end,
        });
        ControlFlow::Continue(())
    }

    fn visit_label(&mut self, label: &LabelRef) -> VisitResult<Self::Break> {
        self.out.record(SchemaCategory::Label, &label.name, &label.span);
        ControlFlow::Continue(())
    }

    fn visit_relationship_type(&mut self, rel_type: &LabelRef) -> VisitResult<Self::Break> {
        self.out
            .record(SchemaCategory::RelationshipType, &rel_type.name, &rel_type.span);
        ControlFlow::Continue(())
    }

    fn visit_property_key(&mut self, key: &PropertyKeyRef) -> VisitResult<Self::Break> {
        self.out.record(SchemaCategory::PropertyKey, &key.name, &key.span);
        ControlFlow::Continue(())
    }

    fn visit_comparison(&mut self, comparison: &Comparison) -> VisitResult<Self::Break> {
        self.out.conditions.push(RawCondition {
            text: comparison.to_string(),
            shape: ComparisonShape::of(comparison),
            span: comparison.span.clone(),
        });
        walk_comparison(self, comparison)
    }
}
