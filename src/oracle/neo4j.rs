//! Neo4j backend over Bolt.
//!
//! The oracle trait is blocking, so the backend owns a private
//! current-thread tokio runtime and drives each neo4rs future to completion
//! on it. Dropping the oracle closes the pool and the runtime.

use super::{
    Bridge, Direction, OracleError, Satisfiability, SchemaCategory, SchemaOracle, ValueTypeTag,
    cypher,
};
use crate::config::ConnectionConfig;
use neo4rs::{ConfigBuilder, Graph, Row, query};
use tokio::runtime::{Builder, Runtime};

pub struct Neo4jOracle {
    // Fields drop in order: the pool must go before the runtime driving it.
    graph: Graph,
    runtime: Runtime,
}

impl std::fmt::Debug for Neo4jOracle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Neo4jOracle").finish_non_exhaustive()
    }
}

impl Neo4jOracle {
    /// Opens a connection pool and checks that the server answers.
    pub fn connect(config: &ConnectionConfig) -> Result<Self, OracleError> {
        let runtime = Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| OracleError::Connection(format!("failed to start runtime: {e}")))?;

        let mut builder = ConfigBuilder::default()
            .uri(config.uri.as_str())
            .user(config.user.as_str())
            .password(config.password.as_str());
        if let Some(database) = &config.database {
            builder = builder.db(database.as_str());
        }
        let neo4j_config = builder
            .build()
            .map_err(|e| OracleError::Connection(e.to_string()))?;

        tracing::info!(uri = %config.uri, user = %config.user, "connecting to Neo4j");
        let graph = runtime
            .block_on(Graph::connect(neo4j_config))
            .map_err(|e| OracleError::Connection(e.to_string()))?;

        let mut oracle = Self { graph, runtime };
        oracle.fetch("RETURN 1 AS ok")?;
        Ok(oracle)
    }

    /// Runs `cypher` and collects every row.
    fn fetch(&mut self, cypher: &str) -> Result<Vec<Row>, OracleError> {
        tracing::debug!(query = cypher, "oracle query");
        let graph = &self.graph;
        let to_error = |e: neo4rs::Error| OracleError::Query {
            query: cypher.to_string(),
            message: e.to_string(),
        };

        self.runtime.block_on(async {
            let mut stream = graph.execute(query(cypher)).await.map_err(to_error)?;
            let mut rows = Vec::new();
            while let Some(row) = stream.next().await.map_err(to_error)? {
                rows.push(row);
            }
            Ok(rows)
        })
    }

    /// Reads column `key` of the first row.
    fn first_column<T>(&mut self, cypher: &str, key: &str) -> Result<Option<T>, OracleError>
    where
        T: for<'de> serde::Deserialize<'de>,
    {
        let rows = self.fetch(cypher)?;
        let Some(row) = rows.into_iter().next() else {
            return Ok(None);
        };
        row.get::<T>(key)
            .map(Some)
            .map_err(|e| OracleError::Query {
                query: cypher.to_string(),
                message: format!("column '{key}': {e}"),
            })
    }
}

impl SchemaOracle for Neo4jOracle {
    fn list_names(&mut self, category: SchemaCategory) -> Result<Vec<String>, OracleError> {
        let cypher = cypher::list_names(category);
        self.fetch(cypher)?
            .into_iter()
            .map(|row| {
                row.get::<String>("name").map_err(|e| OracleError::Query {
                    query: cypher.to_string(),
                    message: e.to_string(),
                })
            })
            .collect()
    }

    fn infer_value_type(&mut self, property: &str) -> Result<Option<ValueTypeTag>, OracleError> {
        let apoc = cypher::apoc_value_type(property);
        let type_name = match self.first_column::<String>(&apoc, "type") {
            Ok(name) => name,
            Err(apoc_error) => {
                tracing::debug!(error = %apoc_error, "APOC type lookup failed, trying valueType()");
                let builtin = cypher::builtin_value_type(property);
                self.first_column::<String>(&builtin, "type")
                    .map_err(|_| OracleError::Unsupported {
                        capability: "value type introspection",
                    })?
            }
        };
        Ok(type_name.map(|name| ValueTypeTag::from_type_name(&name)))
    }

    fn test_satisfiable(&mut self, predicate: &str, variable: &str) -> Satisfiability {
        let cypher = cypher::satisfiability(predicate, variable);
        match self.first_column::<bool>(&cypher, "possible") {
            Ok(Some(true)) => Satisfiability::Satisfiable,
            Ok(Some(false)) => Satisfiability::Unsatisfiable,
            Ok(None) => Satisfiability::Indeterminate("server returned no rows".into()),
            Err(e) => Satisfiability::Indeterminate(e.to_string()),
        }
    }

    fn relationship_exists(
        &mut self,
        source: &str,
        rel_type: &str,
        target: &str,
        direction: Direction,
    ) -> Result<bool, OracleError> {
        let cypher = cypher::relationship_exists(source, rel_type, target, direction);
        Ok(self.first_column::<bool>(&cypher, "ok")?.unwrap_or(false))
    }

    fn find_bridge(&mut self, source: &str, target: &str) -> Result<Option<Bridge>, OracleError> {
        let cypher = cypher::bridge(source, target);
        let rows = self.fetch(&cypher)?;
        let Some(row) = rows.into_iter().next() else {
            return Ok(None);
        };
        let column = |key: &str| {
            row.get::<String>(key).map_err(|e| OracleError::Query {
                query: cypher.clone(),
                message: format!("column '{key}': {e}"),
            })
        };
        Ok(Some(Bridge {
            mid_label: column("midLabel")?,
            first_hop: column("t1")?,
            second_hop: column("t2")?,
        }))
    }
}
