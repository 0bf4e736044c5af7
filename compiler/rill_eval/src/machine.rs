//! The operation-tree interpreter.
//!
//! A [`Machine`] walks an [`OpArena`] recursively. The frame is a flat
//! `Vec<Value>` sized to the analysis pass's slot high-water mark; reads
//! and writes index it directly with the statically assigned slots.

use rill_ir::{BinaryOp, OpArena, OpId, OpKind, Program, SharedInterner, UnaryOp};
use smallvec::SmallVec;

use crate::error::{
    builtin_failed, condition_not_bool, division_by_zero, for_over_non_list, not_callable,
    operand_mismatch, type_mismatch, wrong_arg_count,
};
use crate::{BuiltinRegistry, EvalResult, Value};

/// Interpreter over one operation arena.
pub struct Machine<'a> {
    ops: &'a OpArena,
    registry: &'a BuiltinRegistry,
    interner: &'a SharedInterner,
    frame: Vec<Value>,
}

impl<'a> Machine<'a> {
    /// Create a machine with a frame of `frame_slots` locals.
    ///
    /// Slots start as unit; analysis guarantees every slot is written at
    /// its binding form before any lexically reachable read.
    pub fn new(
        ops: &'a OpArena,
        frame_slots: u32,
        registry: &'a BuiltinRegistry,
        interner: &'a SharedInterner,
    ) -> Self {
        Machine {
            ops,
            registry,
            interner,
            frame: vec![Value::Unit; frame_slots as usize],
        }
    }

    /// Evaluate the operation rooted at `id`.
    pub fn run(&mut self, id: OpId) -> EvalResult {
        self.eval(id)
    }

    fn eval(&mut self, id: OpId) -> EvalResult {
        let ops = self.ops;
        let span = ops.span(id);
        match ops.kind(id) {
            OpKind::Const(c) => Ok(Value::from_const(c, self.interner)),
            OpKind::BuiltinFunc(bid) => Ok(Value::Func(bid)),
            OpKind::LocalRef { slot } => Ok(self.frame[slot.index()].clone()),
            OpKind::AssignLocal { slot, value } => {
                let v = self.eval(value)?;
                self.frame[slot.index()] = v;
                Ok(Value::Unit)
            }
            OpKind::Unary { op, arg } => {
                let v = self.eval(arg)?;
                match (op, v) {
                    (UnaryOp::Neg, Value::Num(n)) => Ok(Value::Num(-n)),
                    (UnaryOp::Not, Value::Bool(b)) => Ok(Value::Bool(!b)),
                    (UnaryOp::Neg, other) => {
                        Err(operand_mismatch(op.symbol(), "number", &other, span))
                    }
                    (UnaryOp::Not, other) => {
                        Err(operand_mismatch(op.symbol(), "boolean", &other, span))
                    }
                }
            }
            OpKind::Binary { op, lhs, rhs } => self.eval_binary(op, lhs, rhs, span),
            OpKind::Call { func, args } => {
                let callee = self.eval(func)?;
                let Value::Func(bid) = callee else {
                    return Err(not_callable(&callee, span));
                };
                let arg_ids = ops.list(args);
                let mut argv: SmallVec<[Value; 8]> = SmallVec::with_capacity(arg_ids.len());
                for &arg in arg_ids {
                    argv.push(self.eval(arg)?);
                }
                let Some(def) = self.registry.get(bid) else {
                    return Err(builtin_failed("unknown builtin function".to_owned(), span));
                };
                if argv.len() != def.arity {
                    return Err(wrong_arg_count(def.arity, argv.len(), span));
                }
                (def.func)(&argv).map_err(|message| builtin_failed(message, span))
            }
            OpKind::List(items) => {
                let item_ids = ops.list(items);
                let mut out = Vec::with_capacity(item_ids.len());
                for &item in item_ids {
                    out.push(self.eval(item)?);
                }
                Ok(Value::list(out))
            }
            OpKind::Seq(stmts) => {
                let mut last = Value::Unit;
                for &stmt in ops.list(stmts) {
                    last = self.eval(stmt)?;
                }
                Ok(last)
            }
            OpKind::If { cond, then_, else_ } => {
                if self.eval_condition(cond)? {
                    self.eval(then_)
                } else if else_.is_valid() {
                    self.eval(else_)
                } else {
                    Ok(Value::Unit)
                }
            }
            OpKind::While { cond, body } => {
                while self.eval_condition(cond)? {
                    self.eval(body)?;
                }
                Ok(Value::Unit)
            }
            OpKind::Let { inits, body } => {
                for &init in ops.inits(inits) {
                    let v = self.eval(init.init)?;
                    self.frame[init.slot.index()] = v;
                }
                self.eval(body)
            }
            OpKind::For { slot, seq, body } => {
                let seq_span = ops.span(seq);
                let seq_value = self.eval(seq)?;
                let Value::List(items) = seq_value else {
                    return Err(for_over_non_list(&seq_value, seq_span));
                };
                let mut out = Vec::with_capacity(items.len());
                for item in items.iter() {
                    self.frame[slot.index()] = item.clone();
                    out.push(self.eval(body)?);
                }
                Ok(Value::list(out))
            }
        }
    }

    fn eval_condition(&mut self, cond: OpId) -> Result<bool, crate::EvalError> {
        let span = self.ops.span(cond);
        match self.eval(cond)? {
            Value::Bool(b) => Ok(b),
            other => Err(condition_not_bool(&other, span)),
        }
    }

    fn eval_binary(
        &mut self,
        op: BinaryOp,
        lhs: OpId,
        rhs: OpId,
        span: rill_ir::Span,
    ) -> EvalResult {
        // Short-circuit operators evaluate the right side lazily.
        if matches!(op, BinaryOp::And | BinaryOp::Or) {
            let l = self.eval_bool(lhs)?;
            return match (op, l) {
                (BinaryOp::And, false) => Ok(Value::Bool(false)),
                (BinaryOp::Or, true) => Ok(Value::Bool(true)),
                _ => Ok(Value::Bool(self.eval_bool(rhs)?)),
            };
        }

        let l = self.eval(lhs)?;
        let r = self.eval(rhs)?;

        // Equality is defined on every value type.
        match op {
            BinaryOp::Eq => return Ok(Value::Bool(l == r)),
            BinaryOp::NotEq => return Ok(Value::Bool(l != r)),
            _ => {}
        }

        let (Value::Num(a), Value::Num(b)) = (&l, &r) else {
            let bad = if matches!(l, Value::Num(_)) { &r } else { &l };
            return Err(operand_mismatch(op.symbol(), "number", bad, span));
        };
        let (a, b) = (*a, *b);
        match op {
            BinaryOp::Add => Ok(Value::Num(a + b)),
            BinaryOp::Sub => Ok(Value::Num(a - b)),
            BinaryOp::Mul => Ok(Value::Num(a * b)),
            BinaryOp::Div => {
                if b == 0.0 {
                    Err(division_by_zero(span))
                } else {
                    Ok(Value::Num(a / b))
                }
            }
            BinaryOp::Pow => Ok(Value::Num(a.powf(b))),
            BinaryOp::Lt => Ok(Value::Bool(a < b)),
            BinaryOp::LtEq => Ok(Value::Bool(a <= b)),
            BinaryOp::Gt => Ok(Value::Bool(a > b)),
            BinaryOp::GtEq => Ok(Value::Bool(a >= b)),
            BinaryOp::Eq | BinaryOp::NotEq | BinaryOp::And | BinaryOp::Or => {
                unreachable!("handled before the numeric arms")
            }
        }
    }

    fn eval_bool(&mut self, id: OpId) -> Result<bool, crate::EvalError> {
        let span = self.ops.span(id);
        match self.eval(id)? {
            Value::Bool(b) => Ok(b),
            other => Err(type_mismatch("boolean", &other, span)),
        }
    }
}

/// Evaluate a complete analysed program.
pub fn run_program(
    program: &Program,
    registry: &BuiltinRegistry,
    interner: &SharedInterner,
) -> EvalResult {
    let mut machine = Machine::new(&program.ops, program.frame_slots, registry, interner);
    machine.run(program.root)
}
