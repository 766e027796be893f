//! Per-session caches in front of the oracle.

use crate::oracle::{OracleError, SchemaCategory, SchemaOracle, ValueTypeTag};
use std::collections::HashMap;
use std::collections::hash_map::Entry;

/// Known names per category, fetched on first use.
#[derive(Debug, Default)]
pub(crate) struct SchemaSnapshot {
    names: HashMap<SchemaCategory, Vec<String>>,
}

impl SchemaSnapshot {
    pub(crate) fn names<O: SchemaOracle + ?Sized>(
        &mut self,
        category: SchemaCategory,
        oracle: &mut O,
    ) -> Result<&[String], OracleError> {
        match self.names.entry(category) {
            Entry::Occupied(entry) => Ok(entry.into_mut()),
            Entry::Vacant(entry) => {
                let names = oracle.list_names(category)?;
                tracing::debug!(%category, count = names.len(), "fetched schema names");
                Ok(entry.insert(names))
            }
        }
    }
}

/// Inferred property types, memoized including failures.
#[derive(Debug, Default)]
pub(crate) struct TypeCache {
    types: HashMap<String, Option<ValueTypeTag>>,
}

impl TypeCache {
    /// The stored type of `property`, or `None` when it cannot be told.
    ///
    /// Lookup failures only disable the type check that asked.
    pub(crate) fn lookup<O: SchemaOracle + ?Sized>(
        &mut self,
        property: &str,
        oracle: &mut O,
    ) -> Option<ValueTypeTag> {
        if let Some(cached) = self.types.get(property) {
            return *cached;
        }
        let tag = match oracle.infer_value_type(property) {
            Ok(tag) => tag,
            Err(OracleError::Unsupported { capability }) => {
                tracing::warn!(property, capability, "type check skipped");
                None
            }
            Err(error) => {
                tracing::warn!(property, %error, "type lookup failed, type check skipped");
                None
            }
        };
        self.types.insert(property.to_string(), tag);
        tag
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::oracle::InMemoryGraph;

    fn graph() -> InMemoryGraph {
        let mut graph = InMemoryGraph::new();
        graph.add_node(&["Movie"], [("year", "1999".into())]);
        graph
    }

    #[test]
    fn names_are_fetched_once() {
        let mut oracle = graph();
        let mut snapshot = SchemaSnapshot::default();
        let first = snapshot
            .names(SchemaCategory::Label, &mut oracle)
            .unwrap()
            .to_vec();
        assert_eq!(first, vec!["Movie".to_string()]);

        oracle.add_node(&["Person"], [("name", "Keanu".into())]);
        let second = snapshot.names(SchemaCategory::Label, &mut oracle).unwrap();
        assert_eq!(second, ["Movie".to_string()].as_slice());
    }

    #[test]
    fn listing_failures_propagate() {
        let mut oracle = graph().fail_listing(SchemaCategory::PropertyKey);
        let mut snapshot = SchemaSnapshot::default();
        assert!(snapshot.names(SchemaCategory::PropertyKey, &mut oracle).is_err());
        assert!(snapshot.names(SchemaCategory::Label, &mut oracle).is_ok());
    }

    #[test]
    fn types_are_memoized() {
        let mut oracle = graph();
        let mut types = TypeCache::default();
        assert_eq!(types.lookup("year", &mut oracle), Some(ValueTypeTag::String));
        assert_eq!(types.lookup("missing", &mut oracle), None);
        assert_eq!(types.types.len(), 2);
    }

    #[test]
    fn unsupported_introspection_degrades_to_none() {
        let mut oracle = graph().without_type_introspection();
        let mut types = TypeCache::default();
        assert_eq!(types.lookup("year", &mut oracle), None);
    }
}
