//! Runtime error types and constructor functions.
//!
//! Factory functions populate both `kind` and the span; the `Display` impl
//! renders the message the user sees. Callers match on [`EvalErrorKind`],
//! never on message text.

use std::fmt;

use rill_ir::Span;

use crate::Value;

/// Result of evaluation.
pub type EvalResult = Result<Value, EvalError>;

/// Typed error category for structured diagnostics.
#[derive(Clone, PartialEq, Eq, Debug)]
pub enum EvalErrorKind {
    /// An operand had the wrong type.
    TypeMismatch { expected: &'static str, got: String },
    /// An operator received an operand of the wrong type. Carries the
    /// operator's surface symbol for the message.
    OperandMismatch {
        op: &'static str,
        expected: &'static str,
        got: String,
    },
    /// Division by zero.
    DivisionByZero,
    /// Call target is not a function.
    NotCallable { got: String },
    /// A function received the wrong number of arguments.
    WrongArgCount { expected: usize, got: usize },
    /// An `if` or `while` condition was not a boolean.
    ConditionNotBool { got: String },
    /// A `for` sequence was not a list.
    ForOverNonList { got: String },
    /// A builtin function reported a failure.
    BuiltinFailed { message: String },
}

/// A runtime evaluation error, attributed to the failing operation's span.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct EvalError {
    pub kind: EvalErrorKind,
    pub span: Span,
}

impl fmt::Display for EvalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            EvalErrorKind::TypeMismatch { expected, got } => {
                write!(f, "expected {expected}, got {got}")
            }
            EvalErrorKind::OperandMismatch { op, expected, got } => {
                write!(f, "invalid operand for `{op}`: expected {expected}, got {got}")
            }
            EvalErrorKind::DivisionByZero => write!(f, "division by zero"),
            EvalErrorKind::NotCallable { got } => {
                write!(f, "value of type {got} is not callable")
            }
            EvalErrorKind::WrongArgCount { expected, got } => {
                write!(f, "expected {expected} argument(s), got {got}")
            }
            EvalErrorKind::ConditionNotBool { got } => {
                write!(f, "condition must be a boolean, got {got}")
            }
            EvalErrorKind::ForOverNonList { got } => {
                write!(f, "`for` expects a list, got {got}")
            }
            EvalErrorKind::BuiltinFailed { message } => f.write_str(message),
        }
    }
}

impl std::error::Error for EvalError {}

/// An operand had the wrong type.
pub fn type_mismatch(expected: &'static str, got: &Value, span: Span) -> EvalError {
    EvalError {
        kind: EvalErrorKind::TypeMismatch {
            expected,
            got: got.type_name().to_owned(),
        },
        span,
    }
}

/// An operator received an operand of the wrong type.
pub fn operand_mismatch(
    op: &'static str,
    expected: &'static str,
    got: &Value,
    span: Span,
) -> EvalError {
    EvalError {
        kind: EvalErrorKind::OperandMismatch {
            op,
            expected,
            got: got.type_name().to_owned(),
        },
        span,
    }
}

/// Division by zero.
pub fn division_by_zero(span: Span) -> EvalError {
    EvalError {
        kind: EvalErrorKind::DivisionByZero,
        span,
    }
}

/// Call target is not a function.
pub fn not_callable(got: &Value, span: Span) -> EvalError {
    EvalError {
        kind: EvalErrorKind::NotCallable {
            got: got.type_name().to_owned(),
        },
        span,
    }
}

/// Wrong number of call arguments.
pub fn wrong_arg_count(expected: usize, got: usize, span: Span) -> EvalError {
    EvalError {
        kind: EvalErrorKind::WrongArgCount { expected, got },
        span,
    }
}

/// Condition was not a boolean.
pub fn condition_not_bool(got: &Value, span: Span) -> EvalError {
    EvalError {
        kind: EvalErrorKind::ConditionNotBool {
            got: got.type_name().to_owned(),
        },
        span,
    }
}

/// `for` sequence was not a list.
pub fn for_over_non_list(got: &Value, span: Span) -> EvalError {
    EvalError {
        kind: EvalErrorKind::ForOverNonList {
            got: got.type_name().to_owned(),
        },
        span,
    }
}

/// A builtin reported a failure.
pub fn builtin_failed(message: String, span: Span) -> EvalError {
    EvalError {
        kind: EvalErrorKind::BuiltinFailed { message },
        span,
    }
}
