//! Diagnostic types and constructor functions.
//!
//! Constructors exist for every semantic error the analyser can raise;
//! centralizing the message text here keeps wording consistent and gives
//! tests one place to match against.

use std::fmt;

use rill_ir::Span;

use crate::ErrorCode;

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

/// A secondary span with an explanatory message.
#[derive(Clone, Eq, PartialEq, Debug)]
pub struct Label {
    pub span: Span,
    pub message: String,
}

/// A compiler diagnostic.
///
/// Carries everything needed to render an error against source text:
/// the code, the message, the primary span, and context labels.
#[derive(Clone, Eq, PartialEq, Debug)]
pub struct Diagnostic {
    pub code: ErrorCode,
    pub severity: Severity,
    pub message: String,
    pub span: Span,
    pub labels: Vec<Label>,
}

impl Diagnostic {
    /// Create an error diagnostic.
    pub fn error(code: ErrorCode, message: impl Into<String>, span: Span) -> Self {
        Diagnostic {
            code,
            severity: Severity::Error,
            message: message.into(),
            span,
            labels: Vec::new(),
        }
    }

    /// Attach a context label.
    pub fn with_label(mut self, span: Span, message: impl Into<String>) -> Self {
        self.labels.push(Label {
            span,
            message: message.into(),
        });
        self
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}[{}]: {} at {:?}",
            self.severity, self.code, self.message, self.span
        )
    }
}

// Semantic analysis errors (E03xx)

/// E0301: no environment in the chain resolves the name.
pub fn unbound_identifier(name: &str, span: Span) -> Diagnostic {
    Diagnostic::error(
        ErrorCode::E0301,
        format!("unbound identifier `{name}`"),
        span,
    )
}

/// E0302: the binding exists but lies beyond the assignment horizon, so
/// assigning it would expose an unspecified evaluation order.
pub fn illegal_assignment_scope(name: &str, span: Span) -> Diagnostic {
    Diagnostic::error(
        ErrorCode::E0302,
        format!("`{name}` cannot be assigned here"),
        span,
    )
    .with_label(
        span,
        "the variable is defined outside the nearest phrase with an \
         unspecified evaluation order",
    )
}

/// E0302: the name resolves to a builtin, which is never an assignable
/// local.
pub fn assign_to_builtin(name: &str, span: Span) -> Diagnostic {
    Diagnostic::error(
        ErrorCode::E0302,
        format!("`{name}` is a builtin and cannot be assigned"),
        span,
    )
}

/// E0303: a phrase without run-time effect where an operation is required.
pub fn not_an_operation(span: Span) -> Diagnostic {
    Diagnostic::error(
        ErrorCode::E0303,
        "this phrase is not an operation; an expression or statement is \
         required here",
        span,
    )
}

/// E0304: the left side of `:=` is not an identifier.
pub fn illegal_assignment_target(span: Span) -> Diagnostic {
    Diagnostic::error(
        ErrorCode::E0304,
        "the left side of `:=` must be a local variable name",
        span,
    )
}

/// E0305: analysing or executing a compile-time constant expression failed.
pub fn nested_eval_failure(detail: &str, span: Span) -> Diagnostic {
    Diagnostic::error(
        ErrorCode::E0305,
        format!("constant expression evaluation failed: {detail}"),
        span,
    )
}

/// E0306: the same name bound twice in one binding form.
pub fn duplicate_definition(name: &str, span: Span, previous: Span) -> Diagnostic {
    Diagnostic::error(
        ErrorCode::E0306,
        format!("`{name}` is defined twice in this binding form"),
        span,
    )
    .with_label(previous, "previous definition is here")
}
