//! Common test utilities
//!
//! Shared fixtures and oracle wrappers used across the integration tests.
//!
//! # Fixtures
//! - [`movie_graph`] - a small movie graph with `(:Movie)-[:ACTED_IN]->(:Person)` edges
//! - [`MOVIE_FIXTURE_JSON`] - the same graph in fixture JSON form
//!
//! # Oracles
//! - [`CountingOracle`] - delegates to another oracle and counts every call
//! - [`FailingOracle`] - fails every call that can fail

#![allow(dead_code)]

use cypher_debugger::debugger::{DebugReport, Finding, FindingKind};
use cypher_debugger::oracle::{
    Bridge, Direction, InMemoryGraph, OracleError, Satisfiability, SchemaCategory, SchemaOracle,
    ValueTypeTag,
};

// ============================================================================
// Fixtures
// ============================================================================

/// People, movies and genres.
///
/// `ACTED_IN` points from the movie to the person, the opposite of the usual
/// convention, so queries written the usual way hit a direction error.
/// `Movie.year` is stored as a string. `Genre` nodes hang off movies through
/// `IN_GENRE`, so `Person`-`Genre` is only reachable in two hops.
/// `Studio` has no relationships at all.
pub fn movie_graph() -> InMemoryGraph {
    let mut graph = InMemoryGraph::new();
    let keanu = graph.add_node(
        &["Person"],
        [("name", "Keanu Reeves".into()), ("born", 1964.into())],
    );
    let carrie = graph.add_node(
        &["Person"],
        [("name", "Carrie-Anne Moss".into()), ("born", 1967.into())],
    );
    let matrix = graph.add_node(
        &["Movie"],
        [("title", "The Matrix".into()), ("year", "1999".into())],
    );
    let scifi = graph.add_node(&["Genre"], [("name", "Science Fiction".into())]);
    graph.add_node(&["Studio"], [("name", "Warner Bros.".into())]);

    graph.add_relationship(matrix, "ACTED_IN", keanu);
    graph.add_relationship(matrix, "ACTED_IN", carrie);
    graph.add_relationship(matrix, "IN_GENRE", scifi);
    graph
}

pub const MOVIE_FIXTURE_JSON: &str = r#"{
  "nodes": [
    {"id": "keanu", "labels": ["Person"], "properties": {"name": "Keanu Reeves", "born": 1964}},
    {"id": "matrix", "labels": ["Movie"], "properties": {"title": "The Matrix", "year": "1999"}},
    {"id": "scifi", "labels": ["Genre"], "properties": {"name": "Science Fiction"}},
    {"id": "wb", "labels": ["Studio"], "properties": {"name": "Warner Bros."}}
  ],
  "relationships": [
    {"type": "ACTED_IN", "from": "matrix", "to": "keanu"},
    {"type": "IN_GENRE", "from": "matrix", "to": "scifi"}
  ]
}"#;

// ============================================================================
// Report Helpers
// ============================================================================

/// Kinds of every finding, in report order.
pub fn kinds(report: &DebugReport) -> Vec<FindingKind> {
    report.findings.iter().map(|f| f.kind).collect()
}

/// Findings of one kind, in report order.
pub fn findings_of(report: &DebugReport, kind: FindingKind) -> Vec<&Finding> {
    report.findings.iter().filter(|f| f.kind == kind).collect()
}

/// Render findings for assertion messages.
pub fn format_findings(report: &DebugReport) -> String {
    report
        .findings
        .iter()
        .map(|f| f.to_string())
        .collect::<Vec<_>>()
        .join("\n")
}

// ============================================================================
// Oracle Wrappers
// ============================================================================

/// Counts calls per operation, delegating the answers.
#[derive(Debug)]
pub struct CountingOracle<O> {
    pub inner: O,
    pub list_calls: usize,
    pub type_calls: usize,
    pub satisfiable_calls: usize,
    pub exists_calls: usize,
    pub bridge_calls: usize,
}

impl<O> CountingOracle<O> {
    pub fn new(inner: O) -> Self {
        Self {
            inner,
            list_calls: 0,
            type_calls: 0,
            satisfiable_calls: 0,
            exists_calls: 0,
            bridge_calls: 0,
        }
    }

    pub fn total_calls(&self) -> usize {
        self.list_calls
            + self.type_calls
            + self.satisfiable_calls
            + self.exists_calls
            + self.bridge_calls
    }
}

impl<O: SchemaOracle> SchemaOracle for CountingOracle<O> {
    fn list_names(&mut self, category: SchemaCategory) -> Result<Vec<String>, OracleError> {
        self.list_calls += 1;
        self.inner.list_names(category)
    }

    fn infer_value_type(&mut self, property: &str) -> Result<Option<ValueTypeTag>, OracleError> {
        self.type_calls += 1;
        self.inner.infer_value_type(property)
    }

    fn test_satisfiable(&mut self, predicate: &str, variable: &str) -> Satisfiability {
        self.satisfiable_calls += 1;
        self.inner.test_satisfiable(predicate, variable)
    }

    fn relationship_exists(
        &mut self,
        source: &str,
        rel_type: &str,
        target: &str,
        direction: Direction,
    ) -> Result<bool, OracleError> {
        self.exists_calls += 1;
        self.inner
            .relationship_exists(source, rel_type, target, direction)
    }

    fn find_bridge(&mut self, source: &str, target: &str) -> Result<Option<Bridge>, OracleError> {
        self.bridge_calls += 1;
        self.inner.find_bridge(source, target)
    }
}

/// An oracle whose server has gone away.
#[derive(Debug, Default)]
pub struct FailingOracle;

impl FailingOracle {
    fn error() -> OracleError {
        OracleError::Unavailable("connection reset".into())
    }
}

impl SchemaOracle for FailingOracle {
    fn list_names(&mut self, _category: SchemaCategory) -> Result<Vec<String>, OracleError> {
        Err(Self::error())
    }

    fn infer_value_type(&mut self, _property: &str) -> Result<Option<ValueTypeTag>, OracleError> {
        Err(Self::error())
    }

    fn test_satisfiable(&mut self, _predicate: &str, _variable: &str) -> Satisfiability {
        Satisfiability::Indeterminate("connection reset".into())
    }

    fn relationship_exists(
        &mut self,
        _source: &str,
        _rel_type: &str,
        _target: &str,
        _direction: Direction,
    ) -> Result<bool, OracleError> {
        Err(Self::error())
    }

    fn find_bridge(
        &mut self,
        _source: &str,
        _target: &str,
    ) -> Result<Option<Bridge>, OracleError> {
        Err(Self::error())
    }
}
