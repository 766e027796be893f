//! Classifies relationship patterns against the stored graph.
//!
//! Each resolved pattern is probed in a fixed order and the first probe
//! that answers decides the classification:
//!
//! 1. the pattern as written exists: correct;
//! 2. the same type exists with the endpoints the other way round: the
//!    arrow is reversed (directed patterns only);
//! 3. some two-hop path links the endpoint labels: indirect;
//! 4. otherwise: disconnected.

use super::extract::RelationshipPattern;
use super::finding::{Finding, FindingKind};
use super::report::Reporter;
use crate::ast::{Direction, Name};
use crate::oracle::{Bridge, OracleError, SchemaOracle};
use std::collections::HashSet;

/// How a single pattern relates to the stored graph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Connectivity {
    Correct,
    Reversed,
    Indirect(Bridge),
    Disconnected,
}

/// Runs the probe sequence for one `(source)-[rel_type]-(target)` pattern.
pub fn classify<O: SchemaOracle + ?Sized>(
    oracle: &mut O,
    source: &str,
    rel_type: &str,
    target: &str,
    direction: Direction,
) -> Result<Connectivity, OracleError> {
    if oracle.relationship_exists(source, rel_type, target, direction)? {
        return Ok(Connectivity::Correct);
    }
    if direction.is_directed() && oracle.relationship_exists(target, rel_type, source, direction)? {
        return Ok(Connectivity::Reversed);
    }
    Ok(match oracle.find_bridge(source, target)? {
        Some(bridge) => Connectivity::Indirect(bridge),
        None => Connectivity::Disconnected,
    })
}

/// Writes `(:source)-[:rel_type]->(:target)` with the arrow for `direction`.
pub fn pattern_text(source: &str, rel_type: &str, target: &str, direction: Direction) -> String {
    let (left, right) = match direction {
        Direction::Forward => ("-", "->"),
        Direction::Backward => ("<-", "-"),
        Direction::Undirected => ("-", "-"),
    };
    format!(
        "(:{}){left}[:{}]{right}(:{})",
        Name(source),
        Name(rel_type),
        Name(target)
    )
}

fn bridge_text(source: &str, bridge: &Bridge, target: &str) -> String {
    format!(
        "(:{})-[:{}]-(:{})-[:{}]-(:{})",
        Name(source),
        Name(&bridge.first_hop),
        Name(&bridge.mid_label),
        Name(&bridge.second_hop),
        Name(target)
    )
}

/// Classifies every resolved pattern once, reporting all but correct ones.
///
/// Patterns missing a label or type are skipped, and so is a pattern whose
/// probes fail; the remaining patterns are still classified.
pub(super) fn run_connectivity_checks<O: SchemaOracle + ?Sized>(
    oracle: &mut O,
    patterns: &[RelationshipPattern],
    reporter: &mut Reporter,
) {
    let mut seen = HashSet::new();

    for pattern in patterns {
        let Some((source, rel_type, target)) = pattern.resolved() else {
            tracing::debug!(span = ?pattern.span, "unresolved pattern skipped");
            continue;
        };
        if !seen.insert((source, rel_type, target, pattern.direction)) {
            continue;
        }

        let written = pattern_text(source, rel_type, target, pattern.direction);
        let span = Some(pattern.span.clone());
        let connectivity = match classify(oracle, source, rel_type, target, pattern.direction) {
            Ok(connectivity) => connectivity,
            Err(error) => {
                tracing::warn!(
                    pattern = %written,
                    %error,
                    "connectivity probe failed, pattern skipped"
                );
                continue;
            }
        };
        let finding = match connectivity {
            Connectivity::Correct => {
                tracing::debug!(pattern = %written, "relationship pattern exists");
                continue;
            }
            Connectivity::Reversed => Finding::new(
                FindingKind::DirectionError,
                format!(
                    "{written} does not exist, but :{} relationships run the other way",
                    Name(rel_type)
                ),
            )
            .with_suggestion(pattern_text(
                source,
                rel_type,
                target,
                pattern.direction.reversed(),
            )),
            Connectivity::Indirect(bridge) => Finding::new(
                FindingKind::IndirectConnection,
                format!(
                    ":{} and :{} are not linked by :{}, but they share a :{} node",
                    Name(source),
                    Name(target),
                    Name(rel_type),
                    Name(&bridge.mid_label)
                ),
            )
            .with_suggestion(bridge_text(source, &bridge, target)),
            Connectivity::Disconnected => Finding::new(
                FindingKind::Disconnected,
                format!(
                    "{written} does not exist and no path of up to two hops links :{} to :{}",
                    Name(source),
                    Name(target)
                ),
            ),
        };
        reporter.push(finding.with_span(span));
    }
}
