//! Diagnostics accumulated by the layout pipeline
//!
//! No pipeline stage fails hard on degraded input. Each stage falls back to a
//! default (or skips the single affected box/operation) and appends a
//! [`Diagnostic`] describing what it assumed. Callers inspect the collection
//! after the run.

use std::fmt;

use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

use crate::breakpoint::Breakpoint;

/// How serious a diagnostic is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
            Severity::Warning => write!(f, "warning"),
        }
    }
}

/// Pipeline component that produced a diagnostic
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Origin {
    BoxShape,
    LocalLayout,
    Transformation,
    SectionBounds,
    AbsoluteLayout,
    Overlap,
    Ordering,
}

impl Origin {
    pub fn as_str(self) -> &'static str {
        match self {
            Origin::BoxShape => "box-shape",
            Origin::LocalLayout => "local-layout",
            Origin::Transformation => "transformation",
            Origin::SectionBounds => "section-bounds",
            Origin::AbsoluteLayout => "absolute-layout",
            Origin::Overlap => "overlap",
            Origin::Ordering => "ordering",
        }
    }
}

impl fmt::Display for Origin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Machine-readable issue code
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum IssueCode {
    BoxShapeMissingBp,
    BoxShapeUnknown,
    BoxShapeInvalid,
    NoBoxesProcessed,
    SectionEmpty,
    UnknownNodeId,
    UnknownAnchor,
    InvalidTransformationParams,
    EmptyGrid,
    GridNormalizedToPositiveLines,
    OverlapNotAllowed,
    NodeOrderMismatch,
    DuplicateKind,
}

impl IssueCode {
    pub fn as_str(self) -> &'static str {
        match self {
            IssueCode::BoxShapeMissingBp => "BOX_SHAPE_MISSING_BP",
            IssueCode::BoxShapeUnknown => "BOX_SHAPE_UNKNOWN",
            IssueCode::BoxShapeInvalid => "BOX_SHAPE_INVALID",
            IssueCode::NoBoxesProcessed => "NO_BOXES_PROCESSED",
            IssueCode::SectionEmpty => "SECTION_EMPTY",
            IssueCode::UnknownNodeId => "UNKNOWN_NODE_ID",
            IssueCode::UnknownAnchor => "UNKNOWN_ANCHOR",
            IssueCode::InvalidTransformationParams => "INVALID_TRANSFORMATION_PARAMS",
            IssueCode::EmptyGrid => "EMPTY_GRID",
            IssueCode::GridNormalizedToPositiveLines => "GRID_NORMALIZED_TO_POSITIVE_LINES",
            IssueCode::OverlapNotAllowed => "OVERLAP_NOT_ALLOWED",
            IssueCode::NodeOrderMismatch => "NODE_ORDER_MISMATCH",
            IssueCode::DuplicateKind => "DUPLICATE_KIND",
        }
    }
}

impl fmt::Display for IssueCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What went wrong, with optional structured context
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Issue {
    pub code: IssueCode,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
}

/// A single severity- and origin-tagged issue
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Diagnostic {
    pub severity: Severity,
    pub origin: Origin,
    pub issue: Issue,
}

impl Diagnostic {
    pub fn new(
        severity: Severity,
        origin: Origin,
        code: IssueCode,
        message: impl Into<String>,
    ) -> Self {
        Self {
            severity,
            origin,
            issue: Issue {
                code,
                message: message.into(),
                details: None,
            },
        }
    }

    pub fn error(origin: Origin, code: IssueCode, message: impl Into<String>) -> Self {
        Self::new(Severity::Error, origin, code, message)
    }

    pub fn warning(origin: Origin, code: IssueCode, message: impl Into<String>) -> Self {
        Self::new(Severity::Warning, origin, code, message)
    }

    /// Attach structured details
    pub fn with_details(mut self, details: Value) -> Self {
        self.issue.details = Some(details);
        self
    }

    pub fn code(&self) -> IssueCode {
        self.issue.code
    }

    pub fn message(&self) -> &str {
        &self.issue.message
    }

    pub fn details(&self) -> Option<&Value> {
        self.issue.details.as_ref()
    }

    /// Breakpoint recorded under `details.bp`, if any
    pub fn breakpoint(&self) -> Option<Breakpoint> {
        self.details()?.get("bp")?.as_str()?.parse().ok()
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {} {}: {}",
            self.severity, self.origin, self.issue.code, self.issue.message
        )
    }
}

/// Append-only collection threaded through every pipeline stage
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Diagnostics {
    entries: Vec<Diagnostic>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a diagnostic and mirror it to the tracing subscriber
    pub fn push(&mut self, diagnostic: Diagnostic) {
        match diagnostic.severity {
            Severity::Error => tracing::warn!(
                code = %diagnostic.issue.code,
                origin = %diagnostic.origin,
                "{}",
                diagnostic.issue.message
            ),
            Severity::Warning => tracing::debug!(
                code = %diagnostic.issue.code,
                origin = %diagnostic.origin,
                "{}",
                diagnostic.issue.message
            ),
        }
        self.entries.push(diagnostic);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.entries.iter()
    }

    pub fn as_slice(&self) -> &[Diagnostic] {
        &self.entries
    }

    pub fn with_code(&self, code: IssueCode) -> impl Iterator<Item = &Diagnostic> {
        self.entries.iter().filter(move |d| d.issue.code == code)
    }

    pub fn with_severity(&self, severity: Severity) -> impl Iterator<Item = &Diagnostic> {
        self.entries.iter().filter(move |d| d.severity == severity)
    }

    pub fn at_breakpoint(&self, bp: Breakpoint) -> impl Iterator<Item = &Diagnostic> {
        self.entries
            .iter()
            .filter(move |d| d.breakpoint() == Some(bp))
    }

    pub fn has_errors(&self) -> bool {
        self.entries.iter().any(|d| d.severity == Severity::Error)
    }

    /// Fail if any error-severity diagnostic was recorded
    pub fn into_result(self) -> Result<Diagnostics, DiagnosticsError> {
        if !self.has_errors() {
            return Ok(self);
        }
        Err(DiagnosticsError(
            self.entries
                .into_iter()
                .filter(|d| d.severity == Severity::Error)
                .collect(),
        ))
    }
}

impl Extend<Diagnostic> for Diagnostics {
    fn extend<I: IntoIterator<Item = Diagnostic>>(&mut self, iter: I) {
        for diagnostic in iter {
            self.push(diagnostic);
        }
    }
}

impl<'a> IntoIterator for &'a Diagnostics {
    type Item = &'a Diagnostic;
    type IntoIter = std::slice::Iter<'a, Diagnostic>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

/// Error-severity diagnostics surfaced as a hard failure
#[derive(Debug, Error)]
#[error("{} layout error(s): {}", .0.len(), summarize(.0))]
pub struct DiagnosticsError(pub Vec<Diagnostic>);

fn summarize(diagnostics: &[Diagnostic]) -> String {
    diagnostics
        .iter()
        .map(|d| format!("{}: {}", d.issue.code, d.issue.message))
        .collect::<Vec<_>>()
        .join("; ")
}
