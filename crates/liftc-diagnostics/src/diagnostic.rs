//! Diagnostic types for compiler errors, warnings, and hints.

use crate::span::{Label, Span};
use serde::{Deserialize, Serialize};

/// Severity level of a diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Severity {
    /// Informational hint
    Hint,
    /// Warning (conversion proceeds, output is still well formed)
    Warning,
    /// Error (conversion proceeds best-effort, output should not be trusted)
    Error,
}

impl Severity {
    /// Get the string representation for display.
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Hint => "hint",
            Severity::Warning => "warning",
            Severity::Error => "error",
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Diagnostic codes organized by category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DiagnosticCode {
    // Local type lifting (L001-L099)
    /// A captured variable has more than one reachable declaration
    CannotCaptureMultiplyDeclared,
    /// A concrete type has members without an explicit visibility
    MissingMemberVisibility,
    /// A type's supertype graph loops back on itself
    SupertypeCycle,

    // Module loading (M001-M099)
    /// A serialized module violates the tree's structural invariants
    MalformedModule,

    // Internal errors (I001-I099)
    /// Internal compiler error
    InternalError,
}

impl DiagnosticCode {
    /// Get the code string (e.g., "L001").
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::CannotCaptureMultiplyDeclared => "L001",
            Self::MissingMemberVisibility => "L002",
            Self::SupertypeCycle => "L003",

            Self::MalformedModule => "M001",

            Self::InternalError => "I001",
        }
    }

    /// Parse a code string back into a code.
    pub fn from_code_str(code: &str) -> Option<Self> {
        [
            Self::CannotCaptureMultiplyDeclared,
            Self::MissingMemberVisibility,
            Self::SupertypeCycle,
            Self::MalformedModule,
            Self::InternalError,
        ]
        .into_iter()
        .find(|c| c.as_str().eq_ignore_ascii_case(code))
    }

    /// Get the default severity for this code.
    pub fn default_severity(&self) -> Severity {
        match self {
            Self::CannotCaptureMultiplyDeclared
            | Self::MissingMemberVisibility
            | Self::MalformedModule
            | Self::InternalError => Severity::Error,

            // Cycles are reported by the supertype checker; here they only degrade.
            Self::SupertypeCycle => Severity::Warning,
        }
    }
}

impl std::fmt::Display for DiagnosticCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Related information for a diagnostic.
#[derive(Debug, Clone)]
pub struct RelatedInfo {
    pub span: Span,
    pub message: String,
}

/// A compiler diagnostic with rich information.
#[derive(Debug, Clone)]
pub struct Diagnostic {
    /// Unique error code
    pub code: DiagnosticCode,
    /// Severity level
    pub severity: Severity,
    /// Short message (single line)
    pub message: String,
    /// Longer explanation (optional)
    pub explanation: Option<String>,
    /// Primary span (where the error is)
    pub span: Span,
    /// Additional labels (related locations)
    pub labels: Vec<Label>,
    /// Structured values the message was built from, for tooling
    pub values: Vec<String>,
    /// Related diagnostics
    pub related: Vec<RelatedInfo>,
}

impl Diagnostic {
    /// Create a new error diagnostic.
    pub fn error(code: DiagnosticCode, message: impl Into<String>) -> DiagnosticBuilder {
        DiagnosticBuilder::new(code, Severity::Error, message)
    }

    /// Create a new warning diagnostic.
    pub fn warning(code: DiagnosticCode, message: impl Into<String>) -> DiagnosticBuilder {
        DiagnosticBuilder::new(code, Severity::Warning, message)
    }

    /// Create a diagnostic with the code's default severity.
    pub fn new(code: DiagnosticCode, message: impl Into<String>) -> DiagnosticBuilder {
        DiagnosticBuilder::new(code, code.default_severity(), message)
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }

    pub fn is_warning(&self) -> bool {
        self.severity == Severity::Warning
    }

    pub fn is_hint(&self) -> bool {
        self.severity == Severity::Hint
    }
}

/// Builder for constructing diagnostics fluently.
pub struct DiagnosticBuilder {
    inner: Diagnostic,
}

impl DiagnosticBuilder {
    /// Create a new diagnostic builder.
    pub fn new(code: DiagnosticCode, severity: Severity, message: impl Into<String>) -> Self {
        Self {
            inner: Diagnostic {
                code,
                severity,
                message: message.into(),
                explanation: None,
                span: Span::DUMMY,
                labels: Vec::new(),
                values: Vec::new(),
                related: Vec::new(),
            },
        }
    }

    /// Set the primary span.
    pub fn with_span(mut self, span: Span) -> Self {
        self.inner.span = span;
        self
    }

    /// Point at a second location.
    pub fn with_label(mut self, span: Span, message: impl Into<String>) -> Self {
        self.inner.labels.push(Label::new(span, message));
        self
    }

    /// Attach a structured value (a name, a member list, ...).
    pub fn with_value(mut self, value: impl ToString) -> Self {
        self.inner.values.push(value.to_string());
        self
    }

    /// Add help text.
    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.inner.explanation = Some(help.into());
        self
    }

    /// Add related information.
    pub fn with_related(mut self, span: Span, message: impl Into<String>) -> Self {
        self.inner.related.push(RelatedInfo {
            span,
            message: message.into(),
        });
        self
    }

    /// Build the diagnostic.
    pub fn build(self) -> Diagnostic {
        self.inner
    }
}

/// Collection of diagnostics with summary statistics.
///
/// This is the log sink handed to passes.
#[derive(Debug, Clone, Default)]
pub struct Diagnostics {
    pub items: Vec<Diagnostic>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self { items: Vec::new() }
    }

    pub fn push(&mut self, diagnostic: Diagnostic) {
        self.items.push(diagnostic);
    }

    pub fn extend(&mut self, diagnostics: impl IntoIterator<Item = Diagnostic>) {
        self.items.extend(diagnostics);
    }

    pub fn has_errors(&self) -> bool {
        self.items.iter().any(|d| d.is_error())
    }

    pub fn error_count(&self) -> usize {
        self.items.iter().filter(|d| d.is_error()).count()
    }

    pub fn warning_count(&self) -> usize {
        self.items.iter().filter(|d| d.is_warning()).count()
    }

    pub fn hint_count(&self) -> usize {
        self.items.iter().filter(|d| d.is_hint()).count()
    }

    /// Diagnostics carrying the given code.
    pub fn with_code(&self, code: DiagnosticCode) -> impl Iterator<Item = &Diagnostic> {
        self.items.iter().filter(move |d| d.code == code)
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.items.iter()
    }
}

impl IntoIterator for Diagnostics {
    type Item = Diagnostic;
    type IntoIter = std::vec::IntoIter<Diagnostic>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}

impl<'a> IntoIterator for &'a Diagnostics {
    type Item = &'a Diagnostic;
    type IntoIter = std::slice::Iter<'a, Diagnostic>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_code_round_trips_through_string() {
        assert_eq!(
            DiagnosticCode::from_code_str("l001"),
            Some(DiagnosticCode::CannotCaptureMultiplyDeclared)
        );
        assert_eq!(DiagnosticCode::from_code_str("X999"), None);
    }

    #[test]
    fn test_counts_by_severity() {
        let mut sink = Diagnostics::new();
        sink.push(Diagnostic::new(DiagnosticCode::SupertypeCycle, "cycle").build());
        sink.push(
            Diagnostic::new(DiagnosticCode::CannotCaptureMultiplyDeclared, "twice")
                .with_value("x__1")
                .build(),
        );

        assert_eq!(sink.warning_count(), 1);
        assert_eq!(sink.error_count(), 1);
        assert!(sink.has_errors());
        let captured: Vec<_> = sink
            .with_code(DiagnosticCode::CannotCaptureMultiplyDeclared)
            .collect();
        assert_eq!(captured[0].values, vec!["x__1".to_string()]);
    }
}
