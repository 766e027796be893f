//! Type and satisfiability checks for individual comparisons.

use super::extract::RawCondition;
use super::finding::{Finding, FindingKind};
use super::report::Reporter;
use super::snapshot::TypeCache;
use crate::oracle::{Satisfiability, SchemaOracle, ValueTypeTag};
use regex::Regex;
use std::sync::OnceLock;

/// Variable assumed when a condition names none.
pub const DEFAULT_VARIABLE: &str = "n";

/// The variable and property a condition is about.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConditionTarget {
    pub variable: String,
    /// `None` when the condition has no dotted property path.
    pub property: Option<String>,
}

impl ConditionTarget {
    /// Uses the structural shape when there is one, the text rules otherwise.
    pub fn of(condition: &RawCondition) -> Self {
        match &condition.shape {
            Some(shape) => Self {
                variable: shape.variable.to_string(),
                property: Some(shape.property.to_string()),
            },
            None => decompose(&condition.text),
        }
    }
}

/// Splits condition text into variable and property.
///
/// The variable is everything before the first `.`, reduced to its ASCII
/// alphanumerics; the property runs from there to the first whitespace or
/// comparison character.
pub fn decompose(text: &str) -> ConditionTarget {
    let Some((head, rest)) = text.split_once('.') else {
        return ConditionTarget {
            variable: DEFAULT_VARIABLE.to_string(),
            property: None,
        };
    };
    let variable: String = head.chars().filter(char::is_ascii_alphanumeric).collect();
    let property: String = rest
        .chars()
        .take_while(|c| !c.is_whitespace() && !matches!(c, '>' | '<' | '=' | '!'))
        .collect();
    ConditionTarget {
        variable: if variable.is_empty() {
            DEFAULT_VARIABLE.to_string()
        } else {
            variable
        },
        property: (!property.is_empty()).then_some(property),
    }
}

fn dotted_number_comparison() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^.*\.\w+\s*[=><!]+\s*\d+.*$").expect("valid regex literal")
    })
}

/// What a mismatched condition compares against, if it is mismatched.
///
/// Only two pairs are recognized: an INTEGER property against a string and a
/// STRING property against a number.
pub fn type_mismatch(stored: ValueTypeTag, condition: &RawCondition) -> Option<&'static str> {
    let shape = condition.shape.as_ref();
    match stored {
        ValueTypeTag::Integer => {
            let quoted = match shape {
                Some(shape) => shape.literal == super::extract::LiteralClass::String,
                None => condition.text.contains(['\'', '"']),
            };
            quoted.then_some("a string")
        }
        ValueTypeTag::String => {
            let numeric = match shape {
                Some(shape) => shape.literal.is_number(),
                None => dotted_number_comparison().is_match(&condition.text),
            };
            numeric.then_some("a number")
        }
        _ => None,
    }
}

/// Runs both checks over every condition, in order.
pub(super) fn run_condition_checks<O: SchemaOracle + ?Sized>(
    oracle: &mut O,
    types: &mut TypeCache,
    conditions: &[RawCondition],
    reporter: &mut Reporter,
) {
    for condition in conditions {
        let target = ConditionTarget::of(condition);
        let span = Some(condition.span.clone());

        if let Some(property) = &target.property {
            if let Some(stored) = types.lookup(property, oracle) {
                if let Some(compared) = type_mismatch(stored, condition) {
                    reporter.push(
                        Finding::new(
                            FindingKind::TypeMismatch,
                            format!(
                                "property '{property}' is stored as {stored}, but `{}` compares it to {compared}",
                                condition.text
                            ),
                        )
                        .with_span(span.clone()),
                    );
                }
            }
        } else {
            tracing::debug!(condition = %condition.text, "no property path, type check skipped");
        }

        match oracle.test_satisfiable(&condition.text, &target.variable) {
            Satisfiability::Satisfiable => {}
            Satisfiability::Unsatisfiable => reporter.push(
                Finding::new(
                    FindingKind::LogicError,
                    format!("condition `{}` returns 0 results", condition.text),
                )
                .with_span(span),
            ),
            Satisfiability::Indeterminate(reason) => {
                tracing::debug!(condition = %condition.text, %reason, "satisfiability undecided");
                reporter.push(
                    Finding::new(
                        FindingKind::ComplexCondition,
                        format!("complex condition `{}` could not be checked", condition.text),
                    )
                    .with_span(span),
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::debugger::SessionOutcome;
    use crate::debugger::extract::extract;
    use crate::oracle::InMemoryGraph;
    use crate::parse;

    fn raw(text: &str) -> RawCondition {
        RawCondition {
            text: text.to_string(),
            shape: None,
            span: 0..text.len(),
        }
    }

    fn conditions(query: &str) -> Vec<RawCondition> {
        extract(&parse(query).unwrap()).conditions
    }

    fn movies() -> InMemoryGraph {
        let mut graph = InMemoryGraph::new();
        graph.add_node(
            &["Movie"],
            [("title", "The Matrix".into()), ("year", "1999".into())],
        );
        graph.add_node(&["Person"], [("name", "Keanu".into()), ("born", 1964.into())]);
        graph
    }

    fn run(query: &str, oracle: &mut InMemoryGraph) -> Vec<Finding> {
        let mut reporter = Reporter::new();
        run_condition_checks(
            oracle,
            &mut TypeCache::default(),
            &conditions(query),
            &mut reporter,
        );
        reporter.finish(query, SessionOutcome::Completed).findings
    }

    #[test]
    fn decomposes_dotted_conditions() {
        assert_eq!(
            decompose("m.year > 2010"),
            ConditionTarget {
                variable: "m".into(),
                property: Some("year".into())
            }
        );
        assert_eq!(decompose("(m.year>=2010").property.as_deref(), Some("year"));
        assert_eq!(decompose("(m.year>=2010").variable, "m");
        assert_eq!(decompose("n.name<>'x'").property.as_deref(), Some("name"));
    }

    #[test]
    fn undecomposable_conditions_fall_back_to_n() {
        let target = decompose("x = 1");
        assert_eq!(target.variable, "n");
        assert_eq!(target.property, None);
    }

    #[test]
    fn text_rules_detect_both_mismatches() {
        assert_eq!(
            type_mismatch(ValueTypeTag::Integer, &raw("n.born = '1964'")),
            Some("a string")
        );
        assert_eq!(
            type_mismatch(ValueTypeTag::String, &raw("m.year > 2010")),
            Some("a number")
        );
        assert_eq!(type_mismatch(ValueTypeTag::String, &raw("m.year > '2010'")), None);
        assert_eq!(type_mismatch(ValueTypeTag::Integer, &raw("n.born > 1960")), None);
        assert_eq!(type_mismatch(ValueTypeTag::Float, &raw("n.score = 'x'")), None);
        assert_eq!(type_mismatch(ValueTypeTag::Boolean, &raw("n.ok = 1")), None);
    }

    #[test]
    fn structural_shapes_take_precedence_over_text() {
        let parsed = conditions("MATCH (m) WHERE m.title = 'v2.0 >= 3' RETURN m");
        assert_eq!(type_mismatch(ValueTypeTag::String, &parsed[0]), None);

        let parsed = conditions("MATCH (m) WHERE m.year > 2010.5 RETURN m");
        assert_eq!(type_mismatch(ValueTypeTag::String, &parsed[0]), Some("a number"));
    }

    #[test]
    fn string_year_against_number_is_one_mismatch() {
        let findings = run("MATCH (m:Movie) WHERE m.year > 1990 RETURN m", &mut movies());
        let mismatches: Vec<_> = findings
            .iter()
            .filter(|f| f.kind == FindingKind::TypeMismatch)
            .collect();
        assert_eq!(mismatches.len(), 1);
        assert!(mismatches[0].message.contains("'year'"));
        assert!(mismatches[0].message.contains("STRING"));
    }

    #[test]
    fn impossible_conditions_are_logic_errors() {
        let findings = run("MATCH (p:Person) WHERE p.born > 3000 RETURN p", &mut movies());
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].kind, FindingKind::LogicError);
        assert_eq!(findings[0].message, "condition `p.born > 3000` returns 0 results");
    }

    #[test]
    fn satisfiable_conditions_are_silent() {
        let findings = run("MATCH (p:Person) WHERE p.name = 'Keanu' RETURN p", &mut movies());
        assert!(findings.is_empty());
    }

    #[test]
    fn undecidable_conditions_are_warnings() {
        let findings = run("MATCH (p:Person) WHERE p.name = $name RETURN p", &mut movies());
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].kind, FindingKind::ComplexCondition);
    }

    #[test]
    fn unsupported_introspection_skips_only_the_type_check() {
        let mut oracle = movies().without_type_introspection();
        let findings = run("MATCH (m:Movie) WHERE m.year > 3000 RETURN m", &mut oracle);
        let kinds: Vec<_> = findings.iter().map(|f| f.kind).collect();
        assert_eq!(kinds, vec![FindingKind::LogicError]);
    }
}
