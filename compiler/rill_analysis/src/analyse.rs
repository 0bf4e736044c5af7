//! Phrase → operation analysis.
//!
//! [`Analyser::analyse_op`] dispatches on the syntactic shape of each
//! phrase and produces a resolved operation, or fails with a semantic
//! diagnostic. The `edepth` parameter bounds how many enclosing scopes an
//! assignment target may reach; it is computed per subphrase by its parent
//! and has observable effect only at assignment phrases:
//!
//! - Binding forms (`let`, `for`) push a child environment and analyse
//!   their body at `edepth + 1`.
//! - Phrases with a language-defined left-to-right order (`;` sequences,
//!   `if`, `while`, the right side of `:=`, parentheses) pass their own
//!   edepth through unchanged.
//! - Everything else — operator operands, call arguments, list elements,
//!   `let` initialisers, `for` sequences — resets it to 0. Assigning a
//!   variable defined outside such a phrase would make the program's
//!   meaning depend on an evaluation order the language does not define,
//!   so those assignments are rejected statically.

use rustc_hash::FxHashMap;
use smallvec::SmallVec;

use rill_diagnostic::{
    assign_to_builtin, duplicate_definition, illegal_assignment_scope, illegal_assignment_target,
    not_an_operation, unbound_identifier, Diagnostic,
};
use rill_ir::{
    BindingRange, Builtin, ConstValue, Name, Namespace, OpArena, OpId, OpKind, OpRange,
    PhraseArena, PhraseId, PhraseKind, PhraseRange, Program, SharedInterner, SlotInit, Span,
};

use crate::environ::{Environ, FrameShape, LvarError, Resolved, ScopeMap};

#[cfg(test)]
mod tests;

type Analysed<T> = Result<T, Box<Diagnostic>>;

/// One analysis pass over a phrase tree.
///
/// Owns the operation arena being built and the frame-slot accounting;
/// the phrase tree and interner are borrowed read-only. Environments are
/// not stored here — they live on the recursion's stack.
pub struct Analyser<'a> {
    phrases: &'a PhraseArena,
    interner: &'a SharedInterner,
    ops: OpArena,
    frame: FrameShape,
    /// Span of an enclosing run-time call when analysis was triggered by
    /// constant evaluation; attached to diagnostics for context.
    origin: Option<Span>,
}

impl<'a> Analyser<'a> {
    /// Analyser for an ordinary top-level pass.
    pub fn new(phrases: &'a PhraseArena, interner: &'a SharedInterner) -> Self {
        Analyser::with_origin(phrases, interner, None)
    }

    /// Analyser for a pass triggered by evaluation-time constant
    /// evaluation; `origin` enriches its diagnostics.
    pub fn with_origin(
        phrases: &'a PhraseArena,
        interner: &'a SharedInterner,
        origin: Option<Span>,
    ) -> Self {
        Analyser {
            phrases,
            interner,
            ops: OpArena::new(),
            frame: FrameShape::new(),
            origin,
        }
    }

    /// Consume the analyser, producing the completed program.
    pub fn finish(self, root: OpId) -> Program {
        Program {
            ops: self.ops,
            root,
            frame_slots: self.frame.maxslots(),
        }
    }

    /// Analyse a phrase that must denote an operation.
    pub fn analyse_op(&mut self, ph: PhraseId, env: &Environ<'_>, edepth: u32) -> Analysed<OpId> {
        let span = self.phrases.span(ph);
        match self.phrases.kind(ph) {
            PhraseKind::Num(n) => Ok(self.ops.push(OpKind::Const(ConstValue::Num(n)), span)),
            PhraseKind::Bool(b) => Ok(self.ops.push(OpKind::Const(ConstValue::Bool(b)), span)),
            PhraseKind::Str(s) => Ok(self.ops.push(OpKind::Const(ConstValue::Str(s)), span)),
            PhraseKind::Unit => Ok(self.ops.push(OpKind::Const(ConstValue::Unit), span)),

            PhraseKind::Ident(name) => self.analyse_ident(name, span, env),

            // Parentheses are semantically transparent.
            PhraseKind::Paren(inner) => self.analyse_op(inner, env, edepth),

            // Unordered operand positions: edepth resets to 0.
            PhraseKind::Unary { op, arg } => {
                let arg = self.analyse_op(arg, env, 0)?;
                Ok(self.ops.push(OpKind::Unary { op, arg }, span))
            }
            PhraseKind::Binary { op, lhs, rhs } => {
                let lhs = self.analyse_op(lhs, env, 0)?;
                let rhs = self.analyse_op(rhs, env, 0)?;
                Ok(self.ops.push(OpKind::Binary { op, lhs, rhs }, span))
            }
            PhraseKind::Call { func, args } => {
                let func = self.analyse_op(func, env, 0)?;
                let args = self.analyse_each(args, env, 0)?;
                Ok(self.ops.push(OpKind::Call { func, args }, span))
            }
            PhraseKind::List(items) => {
                let items = self.analyse_each(items, env, 0)?;
                Ok(self.ops.push(OpKind::List(items), span))
            }

            // Sequential forms: evaluation order is defined and observable,
            // so each subphrase keeps the parent's edepth.
            PhraseKind::Seq(stmts) => {
                let stmts = self.analyse_each(stmts, env, edepth)?;
                Ok(self.ops.push(OpKind::Seq(stmts), span))
            }
            PhraseKind::If { cond, then_, else_ } => {
                let cond = self.analyse_op(cond, env, edepth)?;
                let then_ = self.analyse_op(then_, env, edepth)?;
                let else_ = if else_.is_valid() {
                    self.analyse_op(else_, env, edepth)?
                } else {
                    OpId::INVALID
                };
                Ok(self.ops.push(OpKind::If { cond, then_, else_ }, span))
            }
            PhraseKind::While { cond, body } => {
                let cond = self.analyse_op(cond, env, edepth)?;
                let body = self.analyse_op(body, env, edepth)?;
                Ok(self.ops.push(OpKind::While { cond, body }, span))
            }

            PhraseKind::Assign { target, value } => {
                self.analyse_assign(target, value, span, env, edepth)
            }

            // Binding forms: child environment, body at edepth + 1.
            PhraseKind::Let { bindings, body } => {
                self.analyse_let(bindings, body, span, env, edepth)
            }
            PhraseKind::For { var, seq, body } => {
                let seq = self.analyse_op(seq, env, 0)?;
                let mark = self.frame.mark();
                let slot = self.frame.make_slot();
                let mut scope = ScopeMap::new();
                scope.define(var, slot);
                let inner = Environ::nested(env, &scope);
                let body = self.analyse_op(body, &inner, edepth + 1)?;
                self.frame.restore(mark);
                Ok(self.ops.push(OpKind::For { slot, seq, body }, span))
            }

            PhraseKind::Def { .. } => Err(self.emit(not_an_operation(span))),
        }
    }

    fn analyse_ident(&mut self, name: Name, span: Span, env: &Environ<'_>) -> Analysed<OpId> {
        match env.lookup(name) {
            Some(Resolved::Local(slot)) => Ok(self.ops.push(OpKind::LocalRef { slot }, span)),
            Some(Resolved::Builtin(Builtin::Const(c))) => {
                Ok(self.ops.push(OpKind::Const(c), span))
            }
            Some(Resolved::Builtin(Builtin::Func(id))) => {
                Ok(self.ops.push(OpKind::BuiltinFunc(id), span))
            }
            None => {
                let text = self.interner.resolve(name);
                Err(self.emit(unbound_identifier(&text, span)))
            }
        }
    }

    fn analyse_assign(
        &mut self,
        target: PhraseId,
        value: PhraseId,
        span: Span,
        env: &Environ<'_>,
        edepth: u32,
    ) -> Analysed<OpId> {
        let target_span = self.phrases.span(target);
        let PhraseKind::Ident(name) = self.phrases.kind(target) else {
            return Err(self.emit(illegal_assignment_target(target_span)));
        };
        let slot = env
            .lookup_lvar(name, edepth)
            .map_err(|err| self.lvar_diagnostic(err, name, target_span))?;
        // The store happens strictly after its operand: a defined order,
        // so the value keeps the assignment's own edepth.
        let value = self.analyse_op(value, env, edepth)?;
        Ok(self.ops.push(OpKind::AssignLocal { slot, value }, span))
    }

    fn analyse_let(
        &mut self,
        bindings: BindingRange,
        body: PhraseId,
        span: Span,
        env: &Environ<'_>,
        edepth: u32,
    ) -> Analysed<OpId> {
        let bindings = self.phrases.bindings(bindings);
        let mark = self.frame.mark();

        // Initialisers are analysed in the enclosing environment (the form
        // is non-recursive) and in unordered position.
        let mut scope = ScopeMap::new();
        let mut seen: FxHashMap<Name, Span> = FxHashMap::default();
        let mut inits: SmallVec<[SlotInit; 8]> = SmallVec::with_capacity(bindings.len());
        for binding in bindings {
            if let Some(&previous) = seen.get(&binding.name) {
                let text = self.interner.resolve(binding.name);
                return Err(self.emit(duplicate_definition(&text, binding.span, previous)));
            }
            seen.insert(binding.name, binding.span);

            let init = self.analyse_op(binding.init, env, 0)?;
            let slot = self.frame.make_slot();
            scope.define(binding.name, slot);
            inits.push(SlotInit { slot, init });
        }

        let inner = Environ::nested(env, &scope);
        let body = self.analyse_op(body, &inner, edepth + 1)?;
        self.frame.restore(mark);

        let inits = self.ops.push_inits(&inits);
        Ok(self.ops.push(OpKind::Let { inits, body }, span))
    }

    fn analyse_each(
        &mut self,
        range: PhraseRange,
        env: &Environ<'_>,
        edepth: u32,
    ) -> Analysed<OpRange> {
        let items = self.phrases.list(range);
        let mut out: SmallVec<[OpId; 8]> = SmallVec::with_capacity(items.len());
        for &item in items {
            out.push(self.analyse_op(item, env, edepth)?);
        }
        Ok(self.ops.push_list(&out))
    }

    fn lvar_diagnostic(&self, err: LvarError, name: Name, span: Span) -> Box<Diagnostic> {
        let text = self.interner.resolve(name);
        let diagnostic = match err {
            LvarError::Unbound => unbound_identifier(&text, span),
            LvarError::OutOfReach => illegal_assignment_scope(&text, span),
            LvarError::NotAssignable => assign_to_builtin(&text, span),
        };
        self.emit(diagnostic)
    }

    fn emit(&self, diagnostic: Diagnostic) -> Box<Diagnostic> {
        let diagnostic = match self.origin {
            Some(origin) => diagnostic.with_label(
                origin,
                "required while evaluating this constant expression",
            ),
            None => diagnostic,
        };
        Box::new(diagnostic)
    }
}

/// Analyse a whole phrase tree into an executable program.
///
/// The namespace forms the root of the environment chain and is only read;
/// one namespace may serve any number of passes, concurrent included.
pub fn analyse_program(
    phrases: &PhraseArena,
    root: PhraseId,
    names: &Namespace,
    interner: &SharedInterner,
) -> Result<Program, Box<Diagnostic>> {
    tracing::debug!(phrases = phrases.len(), "analysing program");
    let mut analyser = Analyser::new(phrases, interner);
    let env = Environ::root(names);
    let root = analyser.analyse_op(root, &env, 0)?;
    let program = analyser.finish(root);
    tracing::debug!(
        ops = program.ops.len(),
        frame_slots = program.frame_slots,
        "analysis complete"
    );
    Ok(program)
}
