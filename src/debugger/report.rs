//! Ordered collection of findings and the session's outcome.

use super::finding::{Finding, Severity};
use crate::diag::SourceFile;
use miette::Report;
use serde::Serialize;

/// Accumulates findings in the order they are discovered.
#[derive(Debug, Default)]
pub struct Reporter {
    findings: Vec<Finding>,
}

impl Reporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, finding: Finding) {
        tracing::trace!(kind = %finding.kind, message = %finding.message, "finding");
        self.findings.push(finding);
    }

    pub fn len(&self) -> usize {
        self.findings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.findings.is_empty()
    }

    pub fn finish(self, query: &str, outcome: SessionOutcome) -> DebugReport {
        DebugReport {
            query: query.to_string(),
            findings: self.findings,
            outcome,
        }
    }
}

/// How a session ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SessionOutcome {
    /// Every enabled phase ran.
    Completed,
    /// A fatal finding stopped the session early.
    Aborted { reason: String },
}

/// Result of one debug session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DebugReport {
    pub query: String,
    pub findings: Vec<Finding>,
    pub outcome: SessionOutcome,
}

impl DebugReport {
    pub fn is_aborted(&self) -> bool {
        matches!(self.outcome, SessionOutcome::Aborted { .. })
    }

    pub fn count(&self, severity: Severity) -> usize {
        self.findings
            .iter()
            .filter(|finding| finding.severity == severity)
            .count()
    }

    pub fn error_count(&self) -> usize {
        self.count(Severity::Error)
    }

    pub fn warning_count(&self) -> usize {
        self.count(Severity::Warning)
    }

    /// Findings at warning level or above.
    pub fn problems(&self) -> impl Iterator<Item = &Finding> {
        self.findings
            .iter()
            .filter(|finding| finding.severity > Severity::Info)
    }

    /// Process exit code: 2 when aborted, 1 on errors (or warnings when
    /// `deny_warnings`), 0 otherwise.
    pub fn exit_code(&self, deny_warnings: bool) -> u8 {
        if self.is_aborted() {
            2
        } else if self.error_count() > 0 || (deny_warnings && self.warning_count() > 0) {
            1
        } else {
            0
        }
    }

    /// Renders every warning and error against the query text.
    pub fn reports(&self, source: &SourceFile) -> Vec<Report> {
        self.problems()
            .map(|finding| finding.to_diag().to_report(source))
            .collect()
    }

    /// One-line tally, e.g. `2 errors, 1 warning`.
    pub fn summary(&self) -> String {
        let plural = |n: usize, word: &str| {
            if n == 1 {
                format!("{n} {word}")
            } else {
                format!("{n} {word}s")
            }
        };
        let mut summary = format!(
            "{}, {}",
            plural(self.error_count(), "error"),
            plural(self.warning_count(), "warning")
        );
        if let SessionOutcome::Aborted { reason } = &self.outcome {
            summary.push_str(&format!("; aborted: {reason}"));
        }
        summary
    }
}
