//! Pre-execution debugger for Cypher queries.
//!
//! The crate parses a Cypher read query, pulls out every label,
//! relationship type, property key, comparison and relationship pattern it
//! refers to, and checks each of them against a [`SchemaOracle`]: a live
//! Neo4j server or an in-memory graph. Problems come back as ordered
//! [`Finding`]s that render through miette with the offending span
//! underlined.
//!
//! # Example
//!
//! ```
//! use cypher_debugger::{Debugger, FindingKind, InMemoryGraph};
//!
//! let mut graph = InMemoryGraph::new();
//! graph.add_node(&["Person"], [("name", "Keanu Reeves".into())]);
//!
//! let report = Debugger::new().debug("MATCH (p:Persn) RETURN p.name", &mut graph);
//!
//! let missing = report
//!     .findings
//!     .iter()
//!     .find(|f| f.kind == FindingKind::SchemaItemNotFound)
//!     .unwrap();
//! assert_eq!(missing.message, "label 'Persn' not found");
//! assert_eq!(missing.suggestion.as_deref(), Some("Person"));
//! ```
//!
//! The front end can also be used on its own:
//!
//! ```
//! use cypher_debugger::{parse, tokenize, TokenKind};
//!
//! let lexed = tokenize("MATCH (n:Person) WHERE n.age > 18 RETURN n");
//! assert_eq!(lexed.tokens[0].kind, TokenKind::Match);
//! assert!(lexed.diagnostics.is_empty());
//!
//! let program = parse("MATCH (n:Person) WHERE n.age > 18 RETURN n").unwrap();
//! assert_eq!(program.clauses.len(), 2);
//! ```

pub mod ast;
pub mod config;
pub mod debugger;
pub mod diag;
pub mod lexer;
pub mod oracle;
pub mod parser;

pub use ast::Span;
pub use config::{ConfigError, ConnectionConfig};
pub use debugger::{
    DebugConfig, DebugReport, Debugger, Finding, FindingKind, SessionOutcome, Severity,
};
pub use diag::{Diag, DiagLabel, DiagSeverity, SourceFile};
pub use lexer::token::{Token, TokenKind};
pub use lexer::{Lexer, LexerResult, tokenize};
pub use oracle::{InMemoryGraph, Neo4jOracle, OracleError, SchemaCategory, SchemaOracle};
pub use parser::{ParseFailure, parse, parse_expression};
