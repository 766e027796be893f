//! Loading fixture graphs from disk and debugging against them.

mod common;

use common::{MOVIE_FIXTURE_JSON, kinds};
use cypher_debugger::debugger::{Debugger, FindingKind};
use cypher_debugger::oracle::{FixtureError, InMemoryGraph, SchemaCategory, SchemaOracle};
use std::io::Write;
use tempfile::NamedTempFile;

fn write_fixture(json: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(json.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

#[test]
fn loads_fixture_from_disk() {
    let file = write_fixture(MOVIE_FIXTURE_JSON);
    let mut graph = InMemoryGraph::from_json_file(file.path()).unwrap();

    assert_eq!(graph.node_count(), 4);
    assert_eq!(graph.relationship_count(), 2);
    assert_eq!(
        graph.list_names(SchemaCategory::Label).unwrap(),
        vec!["Person", "Movie", "Genre", "Studio"]
    );
    assert_eq!(
        graph.list_names(SchemaCategory::RelationshipType).unwrap(),
        vec!["ACTED_IN", "IN_GENRE"]
    );
}

#[test]
fn fixture_graph_drives_a_full_session() {
    let file = write_fixture(MOVIE_FIXTURE_JSON);
    let mut graph = InMemoryGraph::from_json_file(file.path()).unwrap();
    let report = Debugger::new()
        .with_report_existing(false)
        .debug("MATCH (p:Person)-[:ACTED_IN]->(m:Movie) RETURN m.title", &mut graph);

    assert_eq!(kinds(&report), vec![FindingKind::DirectionError]);
}

#[test]
fn missing_file_is_an_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("absent.json");
    let err = InMemoryGraph::from_json_file(&path).unwrap_err();
    assert!(matches!(err, FixtureError::Io { .. }));
    assert!(err.to_string().contains("absent.json"));
}

#[test]
fn malformed_json_is_rejected() {
    let file = write_fixture("{\"nodes\": [");
    let err = InMemoryGraph::from_json_file(file.path()).unwrap_err();
    assert!(matches!(err, FixtureError::Json(_)));
}

#[test]
fn unknown_fields_are_rejected() {
    let err = InMemoryGraph::from_json_str(r#"{"nodes": [], "edges": []}"#).unwrap_err();
    assert!(matches!(err, FixtureError::Json(_)));
}

#[test]
fn duplicate_node_ids_are_rejected() {
    let json = r#"{"nodes": [{"id": "a"}, {"id": "a"}]}"#;
    let err = InMemoryGraph::from_json_str(json).unwrap_err();
    assert!(matches!(err, FixtureError::DuplicateNode(ref id) if id == "a"));
}

#[test]
fn dangling_relationships_are_rejected() {
    let json = r#"{
        "nodes": [{"id": "a", "labels": ["A"]}],
        "relationships": [{"type": "R", "from": "a", "to": "b"}]
    }"#;
    let err = InMemoryGraph::from_json_str(json).unwrap_err();
    assert!(matches!(err, FixtureError::UnknownNode(ref id) if id == "b"));
}

#[test]
fn property_types_come_from_json_values() {
    use cypher_debugger::oracle::ValueTypeTag;

    let mut graph = InMemoryGraph::from_json_str(MOVIE_FIXTURE_JSON).unwrap();
    assert_eq!(
        graph.infer_value_type("born").unwrap(),
        Some(ValueTypeTag::Integer)
    );
    assert_eq!(
        graph.infer_value_type("year").unwrap(),
        Some(ValueTypeTag::String)
    );
    assert_eq!(graph.infer_value_type("rating").unwrap(), None);
}

#[test]
fn empty_document_is_an_empty_graph() {
    let mut graph = InMemoryGraph::from_json_str("{}").unwrap();
    assert_eq!(graph.node_count(), 0);
    assert!(graph.list_names(SchemaCategory::PropertyKey).unwrap().is_empty());
}
