//! Schema oracle: the debugger's only window onto the stored graph.
//!
//! [`SchemaOracle`] answers the five questions the debugger asks. Two
//! backends ship with the crate: [`Neo4jOracle`] talks Bolt to a live
//! server, [`InMemoryGraph`] evaluates everything against a graph held in
//! memory (tests, benches and `--fixture` runs).

pub mod cypher;
mod eval;
pub mod memory;
pub mod neo4j;

pub use crate::ast::Direction;
pub use memory::{FixtureError, InMemoryGraph, Value};
pub use neo4j::Neo4jOracle;

use serde::Serialize;
use std::fmt;
use thiserror::Error;

/// The three name catalogs a graph exposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SchemaCategory {
    Label,
    RelationshipType,
    PropertyKey,
}

impl SchemaCategory {
    pub const ALL: [SchemaCategory; 3] = [
        SchemaCategory::Label,
        SchemaCategory::RelationshipType,
        SchemaCategory::PropertyKey,
    ];
}

impl fmt::Display for SchemaCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SchemaCategory::Label => write!(f, "label"),
            SchemaCategory::RelationshipType => write!(f, "relationship type"),
            SchemaCategory::PropertyKey => write!(f, "property key"),
        }
    }
}

/// Coarse type of a stored property value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ValueTypeTag {
    Integer,
    String,
    Float,
    Boolean,
    Unknown,
}

impl ValueTypeTag {
    /// Maps a server type name (`"INTEGER"`, `"STRING NOT NULL"`, ...) to a tag.
    pub fn from_type_name(name: &str) -> Self {
        let head = name.split_whitespace().next().unwrap_or_default();
        match head.to_ascii_uppercase().as_str() {
            "INTEGER" | "LONG" | "INT" => ValueTypeTag::Integer,
            "STRING" => ValueTypeTag::String,
            "FLOAT" | "DOUBLE" => ValueTypeTag::Float,
            "BOOLEAN" => ValueTypeTag::Boolean,
            _ => ValueTypeTag::Unknown,
        }
    }
}

impl fmt::Display for ValueTypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ValueTypeTag::Integer => "INTEGER",
            ValueTypeTag::String => "STRING",
            ValueTypeTag::Float => "FLOAT",
            ValueTypeTag::Boolean => "BOOLEAN",
            ValueTypeTag::Unknown => "UNKNOWN",
        };
        f.write_str(name)
    }
}

/// Outcome of asking whether a predicate can match anything.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Satisfiability {
    Satisfiable,
    Unsatisfiable,
    /// The oracle could not decide; carries the reason.
    Indeterminate(String),
}

/// A two-hop path `(source)-[first_hop]-(mid_label)-[second_hop]-(target)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Bridge {
    pub mid_label: String,
    pub first_hop: String,
    pub second_hop: String,
}

#[derive(Debug, Error)]
pub enum OracleError {
    #[error("could not connect to the graph database: {0}")]
    Connection(String),

    #[error("oracle query failed: {message}")]
    Query { query: String, message: String },

    #[error("the graph database does not support {capability}")]
    Unsupported { capability: &'static str },

    #[error("schema oracle unavailable: {0}")]
    Unavailable(String),
}

/// Read-only questions about the stored graph.
///
/// Every method may block and may fail independently of the others.
pub trait SchemaOracle {
    /// Lists every known name in `category`.
    fn list_names(&mut self, category: SchemaCategory) -> Result<Vec<String>, OracleError>;

    /// Samples one stored value of `property`.
    ///
    /// Returns `Ok(None)` when no node stores the property and
    /// [`OracleError::Unsupported`] when the backend cannot introspect types.
    fn infer_value_type(&mut self, property: &str) -> Result<Option<ValueTypeTag>, OracleError>;

    /// Tests whether any node bound to `variable` satisfies `predicate`.
    ///
    /// A predicate the backend cannot run is [`Satisfiability::Indeterminate`].
    fn test_satisfiable(&mut self, predicate: &str, variable: &str) -> Satisfiability;

    /// Tests whether `(:source)-[:rel_type]-(:target)` exists with the
    /// arrow `direction` as written between `source` (left) and `target` (right).
    fn relationship_exists(
        &mut self,
        source: &str,
        rel_type: &str,
        target: &str,
        direction: Direction,
    ) -> Result<bool, OracleError>;

    /// Finds any two-hop path between the two labels through a labeled node.
    fn find_bridge(&mut self, source: &str, target: &str) -> Result<Option<Bridge>, OracleError>;
}
