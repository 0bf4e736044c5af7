//! Intermediate representation types for the Rill compiler.
//!
//! Two trees live here, one per side of semantic analysis:
//!
//! - [`phrase`] — the syntactic parse tree. A phrase node carries no
//!   semantic information; it is read-only input to analysis.
//! - [`meaning`] — the resolved, executable operation tree that analysis
//!   produces and the evaluator consumes. Local variables are resolved to
//!   frame [`Slot`]s, builtins to [`BuiltinId`]s.
//!
//! Both trees use arena storage with `u32` index newtypes: no `Box` per
//! node, contiguous arrays for cache locality, and cheap structural sharing
//! (an [`OpId`] may be referenced from several parents, so the operation
//! "tree" is really a DAG).

mod interner;
mod name;
mod operators;
mod span;

pub mod meaning;
pub mod phrase;

pub use interner::{SharedInterner, StringInterner};
pub use meaning::{
    Builtin, BuiltinId, ConstValue, Namespace, OpArena, OpId, OpKind, OpRange, Program, Slot,
    SlotInit, SlotInitRange,
};
pub use name::Name;
pub use operators::{BinaryOp, UnaryOp};
pub use phrase::{Binding, BindingRange, PhraseArena, PhraseId, PhraseKind, PhraseRange};
pub use span::Span;
