//! Semantic analysis for the Rill compiler.
//!
//! Transforms the syntactic phrase tree (`PhraseArena`) into the resolved
//! operation tree (`OpArena` + root + frame size) the evaluator executes:
//!
//! 1. **Identifier resolution** (`environ`): a borrowed chain of lexical
//!    scopes, rooted in the read-only builtin namespace, resolves every
//!    name at analysis time.
//! 2. **Slot assignment** (`environ::FrameShape`): each local-variable
//!    definition site gets a stable index into the runtime frame; the
//!    frame's high-water mark is recorded so the evaluator can allocate
//!    contiguous storage up front.
//! 3. **Assignability analysis** (`analyse`): an "assignment depth" is
//!    threaded through the recursion. Phrases without a language-defined
//!    evaluation order reset it to zero, which statically rejects any
//!    assignment whose effect could expose that order.
//! 4. **Constant evaluation** (`const_eval`): phrases that must resolve to
//!    a value before ordinary analysis can proceed are analysed in a fresh
//!    builtin environment and run through the evaluator immediately.
//!
//! Every failure is a `rill_diagnostic::Diagnostic` carrying the offending
//! span; the first error aborts the pass, and no partial program is ever
//! produced.

mod analyse;
mod const_eval;
mod environ;

pub use analyse::{analyse_program, Analyser};
pub use const_eval::const_eval;
pub use environ::{EnvKind, Environ, FrameShape, LvarError, Resolved, ScopeMap};
