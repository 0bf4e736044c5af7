//! Compile-time constant evaluation.
//!
//! Some phrases must resolve to a concrete value before ordinary analysis
//! can proceed — for example a source-inclusion form whose target path is
//! itself a computed expression. [`const_eval`] analyses such a phrase in a
//! fresh builtin root environment, then immediately executes the resulting
//! operation through the evaluator. The pass owns its own environment and
//! frame accounting; only the diagnostic origin is inherited from the
//! triggering context.

use rill_diagnostic::{nested_eval_failure, Diagnostic};
use rill_ir::{Namespace, PhraseArena, PhraseId, SharedInterner, Span};

use rill_eval::{BuiltinRegistry, Machine, Value};

use crate::analyse::Analyser;
use crate::environ::Environ;

/// Evaluate a phrase as a constant expression in the builtin environment.
///
/// `origin` is the span of the enclosing run-time call when evaluation was
/// triggered at run time; it is attached to every diagnostic this pass
/// produces so the failure can be traced back.
pub fn const_eval(
    phrases: &PhraseArena,
    ph: PhraseId,
    names: &Namespace,
    registry: &BuiltinRegistry,
    interner: &SharedInterner,
    origin: Option<Span>,
) -> Result<Value, Box<Diagnostic>> {
    tracing::debug!("evaluating constant expression");
    let mut analyser = Analyser::with_origin(phrases, interner, origin);
    let env = Environ::root(names);
    let root = analyser.analyse_op(ph, &env, 0)?;
    let program = analyser.finish(root);

    let mut machine = Machine::new(&program.ops, program.frame_slots, registry, interner);
    machine.run(program.root).map_err(|err| {
        let mut diagnostic = nested_eval_failure(&err.to_string(), err.span);
        if let Some(origin) = origin {
            diagnostic = diagnostic.with_label(
                origin,
                "required while evaluating this constant expression",
            );
        }
        Box::new(diagnostic)
    })
}
