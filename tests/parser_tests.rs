//! Front-end tests over realistic queries through the public API.

use cypher_debugger::ast::{Clause, Direction, Expression, ProjectionItems};
use cypher_debugger::{SourceFile, parse, parse_expression, tokenize};

/// Queries of the kind the debugger is pointed at day to day.
const CORPUS: &[&str] = &[
    "MATCH (n) RETURN n",
    "MATCH (p:Person {name: 'Keanu Reeves'})-[:ACTED_IN]->(m:Movie) RETURN m.title",
    "MATCH (a:Person)-[r:KNOWS|FOLLOWS]-(b:Person) WHERE a.age > 30 AND b.age < 20 RETURN a, b, r",
    "OPTIONAL MATCH (m:Movie)<-[:DIRECTED]-(d:Person) RETURN m.title AS title, d.name AS director",
    "MATCH (p:Person) WITH p, count(*) AS c WHERE c > 1 RETURN p.name ORDER BY c DESC LIMIT 10",
    "MATCH p = (a:Station)-[:LINK*1..3]->(b:Station) RETURN p",
    "UNWIND [1, 2, 3] AS x RETURN x",
    "MATCH (n:Person) WHERE n.email IS NOT NULL AND n.name STARTS WITH 'A' RETURN DISTINCT n",
    "MATCH (n:`Odd Label`) WHERE n.`first name` = $first RETURN n",
    "MATCH (a)-->(b)<--(c) RETURN *",
    "match (n:Person) where n.born >= 1960 return n skip 5 limit 5",
];

#[test]
fn corpus_parses() {
    for query in CORPUS {
        if let Err(failure) = parse(query) {
            panic!("{query}\n  failed: {failure}");
        }
    }
}

#[test]
fn corpus_lexes_without_diagnostics() {
    for query in CORPUS {
        let lexed = tokenize(query);
        assert!(lexed.diagnostics.is_empty(), "{query}: {:?}", lexed.diagnostics);
    }
}

#[test]
fn relationships_keep_written_orientation() {
    let program = parse("MATCH (a:A)-[:R]->(b:B)<-[:S]-(c:C)-[:T]-(d:D) RETURN a").unwrap();
    let Clause::Match(clause) = &program.clauses[0] else {
        panic!("expected MATCH");
    };
    let steps: Vec<_> = clause.patterns[0]
        .relationships()
        .map(|rel| {
            (
                rel.left.labels[0].name.to_string(),
                rel.detail.direction,
                rel.right.labels[0].name.to_string(),
            )
        })
        .collect();
    assert_eq!(
        steps,
        vec![
            ("A".to_string(), Direction::Forward, "B".to_string()),
            ("B".to_string(), Direction::Backward, "C".to_string()),
            ("C".to_string(), Direction::Undirected, "D".to_string()),
        ]
    );
}

#[test]
fn spans_point_into_the_source() {
    let query = "MATCH (p:Person)-[:ACTED_IN]->(m:Movie) RETURN m.title";
    let program = parse(query).unwrap();
    let Clause::Match(clause) = &program.clauses[0] else {
        panic!("expected MATCH");
    };
    let pattern = &clause.patterns[0];
    assert_eq!(&query[pattern.start.labels[0].span.clone()], "Person");
    assert_eq!(&query[pattern.steps[0].relationship.types[0].span.clone()], "ACTED_IN");
    assert_eq!(&query[pattern.span.clone()], "(p:Person)-[:ACTED_IN]->(m:Movie)");
}

#[test]
fn return_star_and_aliases() {
    let program = parse("MATCH (a)-->(b) RETURN *").unwrap();
    let Some(Clause::Return(ret)) = program.clauses.last() else {
        panic!("expected RETURN");
    };
    assert_eq!(ret.projection.items, ProjectionItems::Star);
}

#[test]
fn where_clause_splits_into_conjuncts() {
    let expr = parse_expression("a.x > 1 AND (b.y = 'z' AND c.w < 2.5)").unwrap();
    let conjuncts: Vec<String> = expr.conjuncts().iter().map(|e| e.to_string()).collect();
    assert_eq!(conjuncts, vec!["a.x > 1", "b.y = 'z'", "c.w < 2.5"]);
}

#[test]
fn property_access_is_recognized() {
    let expr = parse_expression("movie.year").unwrap();
    let (variable, key) = expr.as_variable_property().unwrap();
    assert_eq!(variable, "movie");
    assert_eq!(key.name, "year");
    assert!(matches!(expr, Expression::Property(..)));
}

#[test]
fn unclosed_node_reports_position() {
    let query = "MATCH (p:Person RETURN p";
    let failure = parse(query).unwrap_err();
    assert!(failure.to_string().contains("expected ')'"), "{failure}");

    let span = failure.primary_span().unwrap();
    assert_eq!(&query[span], "RETURN");
}

#[test]
fn failures_render_through_miette() {
    let query = "MATCH (n) RETURN n LIMIT";
    let failure = parse(query).unwrap_err();
    let reports = failure.reports(&SourceFile::with_name(query, "query.cypher"));
    assert_eq!(reports.len(), 1);
    assert!(!format!("{:?}", reports[0]).is_empty());
}

#[test]
fn rejected_inputs() {
    let bad = [
        "",
        ";",
        "RETURN",
        "MATCH RETURN n",
        "MATCH (n)-[:R->(m) RETURN n",
        "MATCH (n) RETURN n MATCH (m) RETURN m",
        "MATCH (n) WHERE RETURN n",
    ];
    for query in bad {
        assert!(parse(query).is_err(), "accepted: {query:?}");
    }
}
