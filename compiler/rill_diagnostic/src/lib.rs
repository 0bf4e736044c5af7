//! Diagnostic system for rich error reporting.
//!
//! Every compile-time failure in the Rill front end is a [`Diagnostic`]:
//! an error code for searchability, a clear message, a primary span, and
//! optional context labels. Semantic errors are deterministic functions of
//! the input phrase tree, so a diagnostic always aborts the pass that
//! produced it — there is no recovery and no partial result.

mod diagnostic;
mod error_code;

pub use diagnostic::{
    assign_to_builtin, duplicate_definition, illegal_assignment_scope,
    illegal_assignment_target, nested_eval_failure, not_an_operation, unbound_identifier,
    Diagnostic, Label, Severity,
};
pub use error_code::ErrorCode;
