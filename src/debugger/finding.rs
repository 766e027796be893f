//! Findings produced by a debug session.

use crate::ast::Span;
use crate::diag::{Diag, DiagSeverity};
use serde::Serialize;
use std::fmt;

/// Categories of findings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FindingKind {
    /// The query text does not parse.
    SyntaxError,

    /// The schema oracle failed while answering a required question.
    OracleUnavailable,

    /// A referenced label, relationship type or property key exists.
    SchemaItemFound,

    /// A referenced label, relationship type or property key does not exist.
    SchemaItemNotFound,

    /// A property is compared against a literal of the wrong type.
    TypeMismatch,

    /// A condition can never be true against the stored data.
    LogicError,

    /// A condition the oracle could not decide.
    ComplexCondition,

    /// The relationship exists, but with its arrow the other way round.
    DirectionError,

    /// No direct relationship, but a two-hop path connects the endpoints.
    IndirectConnection,

    /// No direct relationship and no two-hop path.
    Disconnected,
}

impl FindingKind {
    pub fn severity(self) -> Severity {
        match self {
            Self::SchemaItemFound => Severity::Info,
            Self::TypeMismatch | Self::ComplexCondition | Self::IndirectConnection => {
                Severity::Warning
            }
            Self::SyntaxError
            | Self::OracleUnavailable
            | Self::SchemaItemNotFound
            | Self::LogicError
            | Self::DirectionError
            | Self::Disconnected => Severity::Error,
        }
    }

    /// Returns a human-readable name for this finding kind.
    pub fn name(self) -> &'static str {
        match self {
            Self::SyntaxError => "SYNTAX ERROR",
            Self::OracleUnavailable => "ORACLE UNAVAILABLE",
            Self::SchemaItemFound => "FOUND",
            Self::SchemaItemNotFound => "NOT FOUND",
            Self::TypeMismatch => "TYPE MISMATCH",
            Self::LogicError => "LOGIC ERROR",
            Self::ComplexCondition => "COMPLEX CONDITION",
            Self::DirectionError => "DIRECTION ERROR",
            Self::IndirectConnection => "INDIRECT CONNECTION",
            Self::Disconnected => "DISCONNECTED",
        }
    }

    /// Diagnostic code used when rendering through miette.
    pub fn code(self) -> &'static str {
        match self {
            Self::SyntaxError => "cypher::syntax_error",
            Self::OracleUnavailable => "cypher::oracle_unavailable",
            Self::SchemaItemFound => "cypher::schema_found",
            Self::SchemaItemNotFound => "cypher::schema_not_found",
            Self::TypeMismatch => "cypher::type_mismatch",
            Self::LogicError => "cypher::logic_error",
            Self::ComplexCondition => "cypher::complex_condition",
            Self::DirectionError => "cypher::direction_error",
            Self::IndirectConnection => "cypher::indirect_connection",
            Self::Disconnected => "cypher::disconnected",
        }
    }
}

impl fmt::Display for FindingKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Finding severity, ordered from least to most severe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Warning,
    Error,
}

impl From<Severity> for DiagSeverity {
    fn from(severity: Severity) -> Self {
        match severity {
            Severity::Info => DiagSeverity::Note,
            Severity::Warning => DiagSeverity::Warning,
            Severity::Error => DiagSeverity::Error,
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Info => write!(f, "info"),
            Severity::Warning => write!(f, "warning"),
            Severity::Error => write!(f, "error"),
        }
    }
}

/// One observation about the query.
///
/// The suggestion is the replacement itself (a name or a pattern), not a
/// sentence; [`Finding::help`] phrases it for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Finding {
    pub kind: FindingKind,
    pub severity: Severity,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub span: Option<Span>,
}

impl Finding {
    /// Creates a finding with the kind's default severity.
    pub fn new(kind: FindingKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            severity: kind.severity(),
            message: message.into(),
            suggestion: None,
            span: None,
        }
    }

    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    pub fn with_span(mut self, span: Option<Span>) -> Self {
        self.span = span;
        self
    }

    /// The suggestion phrased as advice.
    pub fn help(&self) -> Option<String> {
        let suggestion = self.suggestion.as_deref()?;
        Some(match self.kind {
            FindingKind::SchemaItemNotFound => format!("did you mean '{suggestion}'?"),
            FindingKind::DirectionError => format!("reverse the arrow: {suggestion}"),
            FindingKind::IndirectConnection => format!("go through the shared node: {suggestion}"),
            _ => suggestion.to_string(),
        })
    }

    /// Lowers the finding into a diagnostic for rendering.
    pub fn to_diag(&self) -> Diag {
        let mut diag =
            Diag::new(self.severity.into(), self.message.clone()).with_code(self.kind.code());
        if let Some(span) = &self.span {
            diag = diag.with_primary_label(span.clone(), self.kind.name().to_lowercase());
        }
        if let Some(help) = self.help() {
            diag = diag.with_help(help);
        }
        diag
    }
}

impl fmt::Display for Finding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind, self.message)?;
        if let Some(help) = self.help() {
            write!(f, " ({help})")?;
        }
        Ok(())
    }
}
