//! Core diagnostic types for structured error reporting.

use crate::ErrorCode;
use nexus_ir::Span;
use std::fmt;

/// Severity level for diagnostics.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum Severity {
    Error,
    Warning,
    Note,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
            Severity::Warning => write!(f, "warning"),
            Severity::Note => write!(f, "note"),
        }
    }
}

/// A labeled source location inside a diagnostic.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct Label {
    pub span: Span,
    pub message: String,
}

impl Label {
    pub fn new(span: Span, message: impl Into<String>) -> Self {
        Label {
            span,
            message: message.into(),
        }
    }
}

/// A structured diagnostic: severity, code, message, and span labels.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct Diagnostic {
    pub severity: Severity,
    pub code: ErrorCode,
    pub message: String,
    pub labels: Vec<Label>,
    pub notes: Vec<String>,
}

impl Diagnostic {
    /// Create an error diagnostic for the given code.
    pub fn error(code: ErrorCode) -> Self {
        Diagnostic {
            severity: Severity::Error,
            code,
            message: code.description().to_owned(),
            labels: Vec::new(),
            notes: Vec::new(),
        }
    }

    /// Replace the message.
    #[must_use]
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    /// Attach a labeled span.
    #[must_use]
    pub fn with_label(mut self, span: Span, message: impl Into<String>) -> Self {
        self.labels.push(Label::new(span, message));
        self
    }

    /// Attach a free-standing note.
    #[must_use]
    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.notes.push(note.into());
        self
    }

    /// The primary span, if any label was attached.
    pub fn primary_span(&self) -> Option<Span> {
        self.labels.first().map(|l| l.span)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder() {
        let diag = Diagnostic::error(ErrorCode::E2001)
            .with_message("undefined variable 'x'")
            .with_label(Span::new(4, 5), "not found in this scope")
            .with_note("declare it with 'var x = ...;'");

        assert_eq!(diag.severity, Severity::Error);
        assert_eq!(diag.code, ErrorCode::E2001);
        assert_eq!(diag.message, "undefined variable 'x'");
        assert_eq!(diag.primary_span(), Some(Span::new(4, 5)));
        assert_eq!(diag.notes.len(), 1);
    }

    #[test]
    fn test_default_message_is_description() {
        let diag = Diagnostic::error(ErrorCode::E2005);
        assert_eq!(diag.message, "arity mismatch");
        assert_eq!(diag.primary_span(), None);
    }
}
