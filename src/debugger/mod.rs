//! The debug session: parse, extract, then check against the oracle.
//!
//! # Phases
//!
//! A session runs its phases strictly in sequence, and findings are reported
//! in the same order:
//!
//! 1. **Syntax** - the query must parse; otherwise the session aborts before
//!    the oracle is touched.
//! 2. **Schema** - every referenced label, relationship type and property key
//!    must exist, with a fuzzy suggestion for the ones that do not.
//! 3. **Conditions** - each comparison is checked for a type mismatch with
//!    the stored property and for satisfiability.
//! 4. **Connectivity** - each relationship pattern is classified as correct,
//!    reversed, indirect or disconnected.
//!
//! A failure to list schema names aborts the session with an
//! `OracleUnavailable` finding. A failed type lookup only disables its own
//! check, and a failed connectivity probe only skips its own pattern.
//!
//! # Example
//!
//! ```
//! use cypher_debugger::debugger::{Debugger, FindingKind};
//! use cypher_debugger::oracle::InMemoryGraph;
//!
//! let mut graph = InMemoryGraph::new();
//! let movie = graph.add_node(&["Movie"], [("title", "The Matrix".into())]);
//! let person = graph.add_node(&["Person"], [("name", "Keanu Reeves".into())]);
//! graph.add_relationship(movie, "ACTED_IN", person);
//!
//! let report = Debugger::new().debug("MATCH (p:Person)-[:ACTED_IN]->(m:Movie) RETURN m", &mut graph);
//! assert!(report.findings.iter().any(|f| f.kind == FindingKind::DirectionError));
//! assert_eq!(report.exit_code(false), 1);
//! ```

mod condition;
mod connectivity;
mod extract;
mod finding;
pub mod fuzzy;
mod report;
mod schema;
mod snapshot;

pub use condition::{ConditionTarget, DEFAULT_VARIABLE, decompose, type_mismatch};
pub use connectivity::{Connectivity, classify, pattern_text};
pub use extract::{
    ComparisonShape, ExtractedComponents, LiteralClass, RawCondition, RelationshipPattern, extract,
};
pub use finding::{Finding, FindingKind, Severity};
pub use report::{DebugReport, Reporter, SessionOutcome};

use crate::ast::Program;
use crate::oracle::{OracleError, SchemaOracle};
use crate::parser::{ParseFailure, parse};
use snapshot::{SchemaSnapshot, TypeCache};

/// Which phases run and what they report.
#[derive(Debug, Clone)]
pub struct DebugConfig {
    /// Report an Info finding for every referenced name that exists.
    pub report_existing: bool,

    /// Run type and satisfiability checks on comparisons.
    pub check_conditions: bool,

    /// Classify relationship patterns against the stored graph.
    pub check_connectivity: bool,
}

impl Default for DebugConfig {
    fn default() -> Self {
        Self {
            report_existing: true,
            check_conditions: true,
            check_connectivity: true,
        }
    }
}

/// Entry point for debugging queries against a schema oracle.
#[derive(Debug, Clone, Default)]
pub struct Debugger {
    config: DebugConfig,
}

impl Debugger {
    /// Creates a debugger with every phase enabled.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a debugger running only the phases `config` enables.
    pub fn with_config(config: DebugConfig) -> Self {
        Self { config }
    }

    /// Sets whether existing names are confirmed with Info findings.
    pub fn with_report_existing(mut self, enabled: bool) -> Self {
        self.config.report_existing = enabled;
        self
    }

    /// Sets whether comparisons are checked for type mismatches and
    /// satisfiability.
    pub fn with_condition_checks(mut self, enabled: bool) -> Self {
        self.config.check_conditions = enabled;
        self
    }

    /// Sets whether relationship patterns are classified.
    pub fn with_connectivity_checks(mut self, enabled: bool) -> Self {
        self.config.check_connectivity = enabled;
        self
    }

    /// Debugs `query` against `oracle`.
    pub fn debug<O: SchemaOracle + ?Sized>(&self, query: &str, oracle: &mut O) -> DebugReport {
        match parse(query) {
            Ok(program) => self.analyze(query, &program, oracle),
            Err(failure) => syntax_report(query, &failure),
        }
    }

    /// Debugs `query`, acquiring the oracle only once the query has parsed.
    ///
    /// The oracle is dropped before this returns. A failure to acquire it
    /// aborts the session.
    pub fn debug_with<O, F>(&self, query: &str, acquire: F) -> DebugReport
    where
        O: SchemaOracle,
        F: FnOnce() -> Result<O, OracleError>,
    {
        let program = match parse(query) {
            Ok(program) => program,
            Err(failure) => return syntax_report(query, &failure),
        };
        match acquire() {
            Ok(mut oracle) => self.analyze(query, &program, &mut oracle),
            Err(error) => abort(query, Reporter::new(), error),
        }
    }

    /// Runs every enabled phase over an already parsed query.
    pub fn analyze<O: SchemaOracle + ?Sized>(
        &self,
        query: &str,
        program: &Program,
        oracle: &mut O,
    ) -> DebugReport {
        let components = extract::extract(program);
        tracing::info!(
            labels = components.labels.len(),
            relationship_types = components.relationship_types.len(),
            property_keys = components.property_keys.len(),
            conditions = components.conditions.len(),
            patterns = components.patterns.len(),
            "extracted query components"
        );

        let mut reporter = Reporter::new();
        let mut snapshot = SchemaSnapshot::default();

        tracing::info!("checking schema references");
        if let Err(error) = schema::run_schema_checks(
            oracle,
            &mut snapshot,
            &components,
            self.config.report_existing,
            &mut reporter,
        ) {
            return abort(query, reporter, error);
        }

        if self.config.check_conditions {
            tracing::info!("checking conditions");
            let mut types = TypeCache::default();
            condition::run_condition_checks(
                oracle,
                &mut types,
                &components.conditions,
                &mut reporter,
            );
        }

        if self.config.check_connectivity {
            tracing::info!("checking relationship connectivity");
            connectivity::run_connectivity_checks(oracle, &components.patterns, &mut reporter);
        }

        tracing::info!(findings = reporter.len(), "debug session complete");
        reporter.finish(query, SessionOutcome::Completed)
    }
}

fn syntax_report(query: &str, failure: &ParseFailure) -> DebugReport {
    tracing::info!(error = %failure, "query does not parse");
    let mut reporter = Reporter::new();
    reporter.push(
        Finding::new(FindingKind::SyntaxError, failure.to_string())
            .with_span(failure.primary_span()),
    );
    reporter.finish(
        query,
        SessionOutcome::Aborted {
            reason: "syntax error".into(),
        },
    )
}

fn abort(query: &str, mut reporter: Reporter, error: OracleError) -> DebugReport {
    tracing::error!(%error, "debug session aborted");
    let reason = error.to_string();
    reporter.push(Finding::new(FindingKind::OracleUnavailable, reason.clone()));
    reporter.finish(query, SessionOutcome::Aborted { reason })
}
