//! A property graph held in memory that answers oracle questions directly.
//!
//! ```
//! use cypher_debugger::oracle::{Direction, InMemoryGraph, SchemaOracle};
//!
//! let mut graph = InMemoryGraph::new();
//! let keanu = graph.add_node(&["Person"], [("name", "Keanu Reeves".into())]);
//! let matrix = graph.add_node(&["Movie"], [("year", 1999.into())]);
//! graph.add_relationship(keanu, "ACTED_IN", matrix);
//!
//! assert!(graph
//!     .relationship_exists("Person", "ACTED_IN", "Movie", Direction::Forward)
//!     .unwrap());
//! ```

use super::eval;
use super::{
    Bridge, Direction, OracleError, Satisfiability, SchemaCategory, SchemaOracle, ValueTypeTag,
};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// A stored property value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Null,
    Boolean(bool),
    Integer(i64),
    Float(f64),
    String(String),
    List(Vec<Value>),
}

impl Value {
    /// The type tag the oracle reports for this value; `None` for null.
    pub fn type_tag(&self) -> Option<ValueTypeTag> {
        match self {
            Value::Null => None,
            Value::Boolean(_) => Some(ValueTypeTag::Boolean),
            Value::Integer(_) => Some(ValueTypeTag::Integer),
            Value::Float(_) => Some(ValueTypeTag::Float),
            Value::String(_) => Some(ValueTypeTag::String),
            Value::List(_) => Some(ValueTypeTag::Unknown),
        }
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::String(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::String(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Integer(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Value::Integer(i64::from(value))
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Float(value)
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Boolean(value)
    }
}

/// Handle to a node inside one [`InMemoryGraph`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub labels: Vec<String>,
    pub properties: BTreeMap<String, Value>,
}

impl Node {
    pub fn has_label(&self, label: &str) -> bool {
        self.labels.iter().any(|l| l == label)
    }

    pub fn property(&self, key: &str) -> Option<&Value> {
        self.properties.get(key)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Relationship {
    pub rel_type: String,
    pub from: NodeId,
    pub to: NodeId,
    pub properties: BTreeMap<String, Value>,
}

#[derive(Debug, Error)]
pub enum FixtureError {
    #[error("failed to read fixture {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid fixture JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("duplicate node id '{0}'")]
    DuplicateNode(String),

    #[error("relationship refers to unknown node '{0}'")]
    UnknownNode(String),
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct Fixture {
    #[serde(default)]
    nodes: Vec<FixtureNode>,
    #[serde(default)]
    relationships: Vec<FixtureRelationship>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct FixtureNode {
    id: String,
    #[serde(default)]
    labels: Vec<String>,
    #[serde(default)]
    properties: BTreeMap<String, Value>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct FixtureRelationship {
    #[serde(rename = "type")]
    rel_type: String,
    from: String,
    to: String,
    #[serde(default)]
    properties: BTreeMap<String, Value>,
}

/// Nodes and relationships in insertion order.
#[derive(Debug, Clone, Default)]
pub struct InMemoryGraph {
    nodes: Vec<Node>,
    relationships: Vec<Relationship>,
    failing_categories: HashSet<SchemaCategory>,
    failing_rel_types: HashSet<String>,
    type_introspection: bool,
}

impl InMemoryGraph {
    pub fn new() -> Self {
        Self {
            type_introspection: true,
            ..Self::default()
        }
    }

    /// Loads a graph from fixture JSON.
    ///
    /// The document has a `nodes` array of `{"id", "labels", "properties"}`
    /// and a `relationships` array of `{"type", "from", "to", "properties"}`
    /// where `from` and `to` name node ids.
    pub fn from_json_str(json: &str) -> Result<Self, FixtureError> {
        let fixture: Fixture = serde_json::from_str(json)?;
        let mut graph = Self::new();
        let mut ids = HashMap::new();

        for node in fixture.nodes {
            let labels: Vec<&str> = node.labels.iter().map(String::as_str).collect();
            let id = graph.add_node(&labels, node.properties);
            if ids.insert(node.id.clone(), id).is_some() {
                return Err(FixtureError::DuplicateNode(node.id));
            }
        }

        for rel in fixture.relationships {
            let from = *ids
                .get(&rel.from)
                .ok_or_else(|| FixtureError::UnknownNode(rel.from.clone()))?;
            let to = *ids
                .get(&rel.to)
                .ok_or_else(|| FixtureError::UnknownNode(rel.to.clone()))?;
            graph.add_relationship_with(from, &rel.rel_type, to, rel.properties);
        }

        tracing::debug!(
            nodes = graph.nodes.len(),
            relationships = graph.relationships.len(),
            "loaded fixture graph"
        );
        Ok(graph)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, FixtureError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| FixtureError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&json)
    }

    pub fn add_node<K, P>(&mut self, labels: &[&str], properties: P) -> NodeId
    where
        K: Into<String>,
        P: IntoIterator<Item = (K, Value)>,
    {
        self.nodes.push(Node {
            labels: labels.iter().map(|l| l.to_string()).collect(),
            properties: properties
                .into_iter()
                .map(|(k, v)| (k.into(), v))
                .collect(),
        });
        NodeId(self.nodes.len() - 1)
    }

    pub fn add_relationship(&mut self, from: NodeId, rel_type: &str, to: NodeId) {
        self.add_relationship_with(from, rel_type, to, BTreeMap::<String, Value>::new());
    }

    pub fn add_relationship_with<K, P>(
        &mut self,
        from: NodeId,
        rel_type: &str,
        to: NodeId,
        properties: P,
    ) where
        K: Into<String>,
        P: IntoIterator<Item = (K, Value)>,
    {
        self.relationships.push(Relationship {
            rel_type: rel_type.to_string(),
            from,
            to,
            properties: properties
                .into_iter()
                .map(|(k, v)| (k.into(), v))
                .collect(),
        });
    }

    /// Makes `list_names(category)` fail, as a dropped connection would.
    pub fn fail_listing(mut self, category: SchemaCategory) -> Self {
        self.failing_categories.insert(category);
        self
    }

    /// Makes `relationship_exists` fail for `rel_type`, as a query timing
    /// out on the server would.
    pub fn fail_probes_for(mut self, rel_type: &str) -> Self {
        self.failing_rel_types.insert(rel_type.to_string());
        self
    }

    /// Makes `infer_value_type` report that introspection is unsupported.
    pub fn without_type_introspection(mut self) -> Self {
        self.type_introspection = false;
        self
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn relationship_count(&self) -> usize {
        self.relationships.len()
    }

    fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.0)
    }

    fn endpoint_has_label(&self, id: NodeId, label: &str) -> bool {
        self.node(id).is_some_and(|n| n.has_label(label))
    }

    fn labels_in_order(&self) -> Vec<String> {
        let mut seen = Vec::new();
        for node in &self.nodes {
            for label in &node.labels {
                push_unique(&mut seen, label);
            }
        }
        seen
    }

    fn types_in_order(&self) -> Vec<String> {
        let mut seen = Vec::new();
        for rel in &self.relationships {
            push_unique(&mut seen, &rel.rel_type);
        }
        seen
    }

    fn keys_in_order(&self) -> Vec<String> {
        let mut seen = Vec::new();
        let node_keys = self.nodes.iter().flat_map(|n| n.properties.keys());
        let rel_keys = self.relationships.iter().flat_map(|r| r.properties.keys());
        for key in node_keys.chain(rel_keys) {
            push_unique(&mut seen, key);
        }
        seen
    }
}

fn push_unique(seen: &mut Vec<String>, name: &str) {
    if !seen.iter().any(|s| s == name) {
        seen.push(name.to_string());
    }
}

impl SchemaOracle for InMemoryGraph {
    fn list_names(&mut self, category: SchemaCategory) -> Result<Vec<String>, OracleError> {
        if self.failing_categories.contains(&category) {
            return Err(OracleError::Unavailable(format!(
                "listing {category} names failed"
            )));
        }
        Ok(match category {
            SchemaCategory::Label => self.labels_in_order(),
            SchemaCategory::RelationshipType => self.types_in_order(),
            SchemaCategory::PropertyKey => self.keys_in_order(),
        })
    }

    fn infer_value_type(&mut self, property: &str) -> Result<Option<ValueTypeTag>, OracleError> {
        if !self.type_introspection {
            return Err(OracleError::Unsupported {
                capability: "value type introspection",
            });
        }
        Ok(self
            .nodes
            .iter()
            .filter_map(|node| node.property(property))
            .find_map(Value::type_tag))
    }

    fn test_satisfiable(&mut self, predicate: &str, variable: &str) -> Satisfiability {
        eval::satisfiable(&self.nodes, predicate, variable)
    }

    fn relationship_exists(
        &mut self,
        source: &str,
        rel_type: &str,
        target: &str,
        direction: Direction,
    ) -> Result<bool, OracleError> {
        if self.failing_rel_types.contains(rel_type) {
            return Err(OracleError::Query {
                query: format!("relationship probe for :{rel_type}"),
                message: "probe failed".to_string(),
            });
        }
        let forward = |r: &Relationship| {
            self.endpoint_has_label(r.from, source) && self.endpoint_has_label(r.to, target)
        };
        let backward = |r: &Relationship| {
            self.endpoint_has_label(r.from, target) && self.endpoint_has_label(r.to, source)
        };

        Ok(self
            .relationships
            .iter()
            .filter(|r| r.rel_type == rel_type)
            .any(|r| match direction {
                Direction::Forward => forward(r),
                Direction::Backward => backward(r),
                Direction::Undirected => forward(r) || backward(r),
            }))
    }

    fn find_bridge(&mut self, source: &str, target: &str) -> Result<Option<Bridge>, OracleError> {
        let relationships = &self.relationships;
        let incident = move |node: NodeId| {
            relationships
                .iter()
                .enumerate()
                .filter_map(move |(index, rel)| {
                    if rel.from == node {
                        Some((index, rel, rel.to))
                    } else if rel.to == node {
                        Some((index, rel, rel.from))
                    } else {
                        None
                    }
                })
        };

        for (start_index, start) in self.nodes.iter().enumerate() {
            if !start.has_label(source) {
                continue;
            }
            for (first_index, first, mid_id) in incident(NodeId(start_index)) {
                let Some(mid_label) = self.node(mid_id).and_then(|m| m.labels.first()) else {
                    continue;
                };
                for (second_index, second, end_id) in incident(mid_id) {
                    if second_index != first_index && self.endpoint_has_label(end_id, target) {
                        return Ok(Some(Bridge {
                            mid_label: mid_label.clone(),
                            first_hop: first.rel_type.clone(),
                            second_hop: second.rel_type.clone(),
                        }));
                    }
                }
            }
        }
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn movies() -> InMemoryGraph {
        let mut graph = InMemoryGraph::new();
        let keanu = graph.add_node(
            &["Person"],
            [("name", Value::from("Keanu Reeves")), ("born", 1964.into())],
        );
        let matrix = graph.add_node(
            &["Movie"],
            [("title", Value::from("The Matrix")), ("year", 1999.into())],
        );
        let scifi = graph.add_node(&["Genre"], [("name", Value::from("Sci-Fi"))]);
        graph.add_relationship(keanu, "ACTED_IN", matrix);
        graph.add_relationship(matrix, "IN_GENRE", scifi);
        graph
    }

    #[test]
    fn lists_names_in_first_seen_order() {
        let mut graph = movies();
        assert_eq!(
            graph.list_names(SchemaCategory::Label).unwrap(),
            vec!["Person", "Movie", "Genre"]
        );
        assert_eq!(
            graph.list_names(SchemaCategory::RelationshipType).unwrap(),
            vec!["ACTED_IN", "IN_GENRE"]
        );
        assert_eq!(
            graph.list_names(SchemaCategory::PropertyKey).unwrap(),
            vec!["born", "name", "title", "year"]
        );
    }

    #[test]
    fn relationship_direction_is_respected() {
        let mut graph = movies();
        let mut exists = |s: &str, t: &str, e: &str, d: Direction| {
            graph.relationship_exists(s, t, e, d).unwrap()
        };
        assert!(exists("Person", "ACTED_IN", "Movie", Direction::Forward));
        assert!(!exists("Movie", "ACTED_IN", "Person", Direction::Forward));
        assert!(exists("Movie", "ACTED_IN", "Person", Direction::Backward));
        assert!(exists("Movie", "ACTED_IN", "Person", Direction::Undirected));
        assert!(!exists("Person", "DIRECTED", "Movie", Direction::Undirected));
    }

    #[test]
    fn bridge_goes_through_labeled_middle() {
        let mut graph = movies();
        let bridge = graph.find_bridge("Person", "Genre").unwrap().unwrap();
        assert_eq!(
            bridge,
            Bridge {
                mid_label: "Movie".into(),
                first_hop: "ACTED_IN".into(),
                second_hop: "IN_GENRE".into(),
            }
        );
        assert!(graph.find_bridge("Person", "Person").unwrap().is_none());
    }

    #[test]
    fn bridge_skips_unlabeled_middle_nodes() {
        let mut graph = InMemoryGraph::new();
        let a = graph.add_node(&["A"], Vec::<(String, Value)>::new());
        let hidden = graph.add_node(&[], Vec::<(String, Value)>::new());
        let b = graph.add_node(&["B"], Vec::<(String, Value)>::new());
        graph.add_relationship(a, "X", hidden);
        graph.add_relationship(hidden, "Y", b);
        assert!(graph.find_bridge("A", "B").unwrap().is_none());
    }

    #[test]
    fn bridge_never_reuses_a_relationship() {
        let mut graph = InMemoryGraph::new();
        let a = graph.add_node(&["A"], Vec::<(String, Value)>::new());
        let m = graph.add_node(&["M"], Vec::<(String, Value)>::new());
        graph.add_relationship(a, "X", m);
        assert!(graph.find_bridge("A", "A").unwrap().is_none());
    }

    #[test]
    fn infers_first_stored_type() {
        let mut graph = movies();
        assert_eq!(
            graph.infer_value_type("year").unwrap(),
            Some(ValueTypeTag::Integer)
        );
        assert_eq!(
            graph.infer_value_type("title").unwrap(),
            Some(ValueTypeTag::String)
        );
        assert_eq!(graph.infer_value_type("missing").unwrap(), None);
    }

    #[test]
    fn failure_injection() {
        let mut graph = movies()
            .fail_listing(SchemaCategory::PropertyKey)
            .fail_probes_for("IN_GENRE")
            .without_type_introspection();
        assert!(graph.list_names(SchemaCategory::Label).is_ok());
        assert!(matches!(
            graph.list_names(SchemaCategory::PropertyKey),
            Err(OracleError::Unavailable(_))
        ));
        assert!(matches!(
            graph.infer_value_type("year"),
            Err(OracleError::Unsupported { .. })
        ));
        assert!(matches!(
            graph.relationship_exists("Movie", "IN_GENRE", "Genre", Direction::Forward),
            Err(OracleError::Query { .. })
        ));
        assert!(graph
            .relationship_exists("Person", "ACTED_IN", "Movie", Direction::Forward)
            .unwrap());
    }

    #[test]
    fn loads_fixture_json() {
        let json = r#"{
            "nodes": [
                {"id": "keanu", "labels": ["Person"], "properties": {"name": "Keanu", "born": 1964}},
                {"id": "matrix", "labels": ["Movie"], "properties": {"year": 1999, "rating": 8.7, "tags": ["a"]}}
            ],
            "relationships": [
                {"type": "ACTED_IN", "from": "keanu", "to": "matrix", "properties": {"roles": ["Neo"]}}
            ]
        }"#;
        let mut graph = InMemoryGraph::from_json_str(json).unwrap();
        assert_eq!(graph.node_count(), 2);
        assert_eq!(graph.relationship_count(), 1);
        assert_eq!(
            graph.infer_value_type("rating").unwrap(),
            Some(ValueTypeTag::Float)
        );
        assert_eq!(
            graph.infer_value_type("born").unwrap(),
            Some(ValueTypeTag::Integer)
        );
        let keys = graph.list_names(SchemaCategory::PropertyKey).unwrap();
        assert!(keys.iter().any(|k| k == "roles"));
    }

    #[test]
    fn fixture_errors() {
        let unknown = r#"{"nodes": [], "relationships": [{"type": "R", "from": "a", "to": "b"}]}"#;
        assert!(matches!(
            InMemoryGraph::from_json_str(unknown),
            Err(FixtureError::UnknownNode(id)) if id == "a"
        ));

        let duplicate = r#"{"nodes": [{"id": "a"}, {"id": "a"}]}"#;
        assert!(matches!(
            InMemoryGraph::from_json_str(duplicate),
            Err(FixtureError::DuplicateNode(_))
        ));

        assert!(matches!(
            InMemoryGraph::from_json_str("{not json"),
            Err(FixtureError::Json(_))
        ));
    }
}
