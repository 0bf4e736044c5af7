//! Tree-walking evaluator for the Rill compiler.
//!
//! Executes the resolved operation tree produced by `rill_analysis`. Local
//! variables live in a flat frame (`Vec<Value>`) indexed directly by the
//! slots analysis assigned; no name is ever resolved at run time.
//!
//! The evaluator is also a compile-time collaborator: constant expressions
//! (`rill_analysis::const_eval`) run through the same [`Machine`].

mod builtins;
mod error;
mod machine;
mod value;

pub use builtins::{standard_namespace, BuiltinDef, BuiltinFn, BuiltinRegistry};
pub use error::{
    builtin_failed, condition_not_bool, division_by_zero, for_over_non_list, not_callable,
    operand_mismatch, type_mismatch, wrong_arg_count, EvalError, EvalErrorKind, EvalResult,
};
pub use machine::{run_program, Machine};
pub use value::Value;
