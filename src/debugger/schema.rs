//! Existence checks for referenced labels, relationship types and property keys.

use super::extract::ExtractedComponents;
use super::finding::{Finding, FindingKind};
use super::fuzzy;
use super::report::Reporter;
use super::snapshot::SchemaSnapshot;
use crate::oracle::{OracleError, SchemaCategory, SchemaOracle};

/// Checks every referenced name, category by category in
/// [`SchemaCategory::ALL`] order and name by name in sorted order.
///
/// Names are compared case-sensitively; the suggestion search is not.
pub(super) fn run_schema_checks<O: SchemaOracle + ?Sized>(
    oracle: &mut O,
    snapshot: &mut SchemaSnapshot,
    components: &ExtractedComponents,
    report_existing: bool,
    reporter: &mut Reporter,
) -> Result<(), OracleError> {
    for category in SchemaCategory::ALL {
        let referenced = components.names(category);
        if referenced.is_empty() {
            continue;
        }
        let known = snapshot.names(category, oracle)?;

        for name in referenced {
            let span = components.location(category, name);
            if known.iter().any(|candidate| candidate == name.as_str()) {
                if report_existing {
                    reporter.push(
                        Finding::new(
                            FindingKind::SchemaItemFound,
                            format!("{category} '{name}' exists"),
                        )
                        .with_span(span),
                    );
                }
                continue;
            }

            let mut finding = Finding::new(
                FindingKind::SchemaItemNotFound,
                format!("{category} '{name}' not found"),
            )
            .with_span(span);
            if let Some(suggestion) = fuzzy::suggest(name, known.iter().map(String::as_str)) {
                finding = finding.with_suggestion(suggestion);
            }
            reporter.push(finding);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::debugger::extract::extract;
    use crate::oracle::InMemoryGraph;
    use crate::parse;

    fn movie_graph() -> InMemoryGraph {
        let mut graph = InMemoryGraph::new();
        let keanu = graph.add_node(&["Person"], [("name", "Keanu Reeves".into())]);
        let matrix = graph.add_node(&["Movie"], [("title", "The Matrix".into())]);
        graph.add_relationship(keanu, "ACTED_IN", matrix);
        graph
    }

    fn check(query: &str, oracle: &mut InMemoryGraph, report_existing: bool) -> Vec<Finding> {
        let components = extract(&parse(query).unwrap());
        let mut reporter = Reporter::new();
        run_schema_checks(
            oracle,
            &mut SchemaSnapshot::default(),
            &components,
            report_existing,
            &mut reporter,
        )
        .unwrap();
        reporter.finish(query, crate::debugger::SessionOutcome::Completed).findings
    }

    #[test]
    fn confirms_existing_names_in_category_order() {
        let findings = check(
            "MATCH (p:Person)-[:ACTED_IN]->(m:Movie) RETURN m.title",
            &mut movie_graph(),
            true,
        );
        let messages: Vec<&str> = findings.iter().map(|f| f.message.as_str()).collect();
        assert_eq!(
            messages,
            vec![
                "label 'Movie' exists",
                "label 'Person' exists",
                "relationship type 'ACTED_IN' exists",
                "property key 'title' exists",
            ]
        );
        assert!(findings.iter().all(|f| f.kind == FindingKind::SchemaItemFound));
    }

    #[test]
    fn missing_names_get_suggestions() {
        let query = "MATCH (p:Persn)-[:ACTED_IM]->(m:Movie) RETURN m.titel";
        let findings = check(query, &mut movie_graph(), false);
        assert_eq!(findings.len(), 3);

        assert_eq!(findings[0].kind, FindingKind::SchemaItemNotFound);
        assert_eq!(findings[0].message, "label 'Persn' not found");
        assert_eq!(findings[0].suggestion.as_deref(), Some("Person"));
        assert_eq!(&query[findings[0].span.clone().unwrap()], "Persn");

        assert_eq!(findings[1].suggestion.as_deref(), Some("ACTED_IN"));
        assert_eq!(findings[2].suggestion.as_deref(), Some("title"));
    }

    #[test]
    fn far_names_get_no_suggestion() {
        let findings = check("MATCH (x:Spaceship) RETURN x", &mut movie_graph(), false);
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].suggestion, None);
    }

    #[test]
    fn membership_is_case_sensitive() {
        let findings = check("MATCH (x:person) RETURN x", &mut movie_graph(), false);
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].suggestion.as_deref(), Some("Person"));
    }

    #[test]
    fn unreferenced_categories_are_not_fetched() {
        let mut oracle = movie_graph().fail_listing(SchemaCategory::PropertyKey);
        let findings = check("MATCH (p:Person) RETURN p", &mut oracle, true);
        assert_eq!(findings.len(), 1);
    }

    #[test]
    fn listing_failure_is_an_error() {
        let mut oracle = movie_graph().fail_listing(SchemaCategory::Label);
        let components = extract(&parse("MATCH (p:Person) RETURN p").unwrap());
        let result = run_schema_checks(
            &mut oracle,
            &mut SchemaSnapshot::default(),
            &components,
            true,
            &mut Reporter::new(),
        );
        assert!(result.is_err());
    }
}
