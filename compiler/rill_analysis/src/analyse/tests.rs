#![allow(clippy::unwrap_used, clippy::expect_used)]

use pretty_assertions::assert_eq;

use rill_diagnostic::ErrorCode;
use rill_eval::{run_program, standard_namespace, Value};
use rill_ir::{
    BinaryOp, Binding, Name, Namespace, OpKind, PhraseArena, PhraseId, PhraseKind, Program,
    SharedInterner, Span,
};

use super::*;

/// Shared fixture: interner, standard namespace, and a phrase arena under
/// construction.
struct Fixture {
    interner: SharedInterner,
    names: Namespace,
    registry: rill_eval::BuiltinRegistry,
    phrases: PhraseArena,
}

impl Fixture {
    fn new() -> Self {
        let interner = SharedInterner::new();
        let (names, registry) = standard_namespace(&interner);
        Fixture {
            interner,
            names,
            registry,
            phrases: PhraseArena::new(),
        }
    }

    fn name(&self, text: &str) -> Name {
        self.interner.intern(text)
    }

    fn num(&mut self, n: f64) -> PhraseId {
        self.phrases.push(PhraseKind::Num(n), Span::DUMMY)
    }

    fn ident(&mut self, text: &str, span: Span) -> PhraseId {
        let name = self.name(text);
        self.phrases.push(PhraseKind::Ident(name), span)
    }

    fn binary(&mut self, op: BinaryOp, lhs: PhraseId, rhs: PhraseId) -> PhraseId {
        self.phrases
            .push(PhraseKind::Binary { op, lhs, rhs }, Span::DUMMY)
    }

    fn assign(&mut self, target: PhraseId, value: PhraseId) -> PhraseId {
        self.phrases
            .push(PhraseKind::Assign { target, value }, Span::DUMMY)
    }

    fn seq(&mut self, stmts: &[PhraseId]) -> PhraseId {
        let stmts = self.phrases.push_list(stmts);
        self.phrases.push(PhraseKind::Seq(stmts), Span::DUMMY)
    }

    /// `let <name> = <init> in <body>`
    fn let_one(&mut self, name: &str, init: PhraseId, body: PhraseId) -> PhraseId {
        let name = self.name(name);
        let bindings = self.phrases.push_bindings(&[Binding {
            name,
            init,
            span: Span::DUMMY,
        }]);
        self.phrases
            .push(PhraseKind::Let { bindings, body }, Span::DUMMY)
    }

    fn analyse(&self, root: PhraseId) -> Result<Program, Box<rill_diagnostic::Diagnostic>> {
        analyse_program(&self.phrases, root, &self.names, &self.interner)
    }

    fn analyse_and_run(&self, root: PhraseId) -> Value {
        let program = self.analyse(root).expect("analysis should succeed");
        run_program(&program, &self.registry, &self.interner).expect("evaluation should succeed")
    }
}

// Resolution

#[test]
fn literal_analyses_to_const_with_no_slots() {
    let mut fx = Fixture::new();
    let root = fx.num(7.0);
    let program = fx.analyse(root).unwrap();
    assert_eq!(program.frame_slots, 0);
    assert_eq!(program.ops.kind(program.root), OpKind::Const(ConstValue::Num(7.0)));
}

#[test]
fn builtin_constant_resolves_through_the_root() {
    let mut fx = Fixture::new();
    let root = fx.ident("pi", Span::new(0, 2));
    assert_eq!(fx.analyse_and_run(root), Value::num(std::f64::consts::PI));
}

#[test]
fn unbound_identifier_fails_at_its_exact_span() {
    let mut fx = Fixture::new();
    let root = fx.ident("missing", Span::new(14, 21));
    let err = fx.analyse(root).unwrap_err();
    assert_eq!(err.code, ErrorCode::E0301);
    assert_eq!(err.span, Span::new(14, 21));
}

#[test]
fn shadowing_resolves_to_the_inner_binding() {
    // let x = 1 in (let x = 2 in x)  =>  2
    let mut fx = Fixture::new();
    let x_use = fx.ident("x", Span::DUMMY);
    let two = fx.num(2.0);
    let inner = fx.let_one("x", two, x_use);
    let one = fx.num(1.0);
    let root = fx.let_one("x", one, inner);
    assert_eq!(fx.analyse_and_run(root), Value::num(2.0));
}

#[test]
fn let_body_sees_enclosing_bindings() {
    // let a = 2 in (let b = 3 in a * b)  =>  6
    let mut fx = Fixture::new();
    let a_use = fx.ident("a", Span::DUMMY);
    let b_use = fx.ident("b", Span::DUMMY);
    let product = fx.binary(BinaryOp::Mul, a_use, b_use);
    let three = fx.num(3.0);
    let inner = fx.let_one("b", three, product);
    let two = fx.num(2.0);
    let root = fx.let_one("a", two, inner);
    assert_eq!(fx.analyse_and_run(root), Value::num(6.0));
}

// Assignment and the edepth horizon

#[test]
fn assignment_in_sequential_body_succeeds() {
    // let x = 0 in (x := 1; x)  =>  1
    let mut fx = Fixture::new();
    let x_target = fx.ident("x", Span::DUMMY);
    let one = fx.num(1.0);
    let store = fx.assign(x_target, one);
    let x_use = fx.ident("x", Span::DUMMY);
    let body = fx.seq(&[store, x_use]);
    let zero = fx.num(0.0);
    let root = fx.let_one("x", zero, body);
    assert_eq!(fx.analyse_and_run(root), Value::num(1.0));
}

#[test]
fn assignment_uses_the_definition_site_slot() {
    let mut fx = Fixture::new();
    let x_target = fx.ident("x", Span::DUMMY);
    let one = fx.num(1.0);
    let store = fx.assign(x_target, one);
    let x_use = fx.ident("x", Span::DUMMY);
    let body = fx.seq(&[store, x_use]);
    let zero = fx.num(0.0);
    let root = fx.let_one("x", zero, body);

    let program = fx.analyse(root).unwrap();
    let OpKind::Let { inits, body } = program.ops.kind(program.root) else {
        panic!("root should be a let");
    };
    let defined = program.ops.inits(inits)[0].slot;
    let OpKind::Seq(stmts) = program.ops.kind(body) else {
        panic!("body should be a sequence");
    };
    let OpKind::AssignLocal { slot, .. } = program.ops.kind(program.ops.list(stmts)[0]) else {
        panic!("first statement should be the assignment");
    };
    assert_eq!(slot, defined);
}

#[test]
fn assignment_inside_unordered_operand_is_rejected() {
    // let x = 0 in (x := 1) + (x := 1): both operands are analysed at
    // edepth 0, so each assignment reaches across an unordered phrase.
    let mut fx = Fixture::new();
    let t1 = fx.ident("x", Span::new(10, 11));
    let one1 = fx.num(1.0);
    let lhs = fx.assign(t1, one1);
    let t2 = fx.ident("x", Span::new(20, 21));
    let one2 = fx.num(1.0);
    let rhs = fx.assign(t2, one2);
    let sum = fx.binary(BinaryOp::Add, lhs, rhs);
    let zero = fx.num(0.0);
    let root = fx.let_one("x", zero, sum);

    let err = fx.analyse(root).unwrap_err();
    assert_eq!(err.code, ErrorCode::E0302);
    // The first offending operand is reported; order of siblings does not
    // change the outcome.
    assert_eq!(err.span, Span::new(10, 11));
}

#[test]
fn assignment_in_second_operand_only_is_rejected() {
    // let x = 0 in 2 + (x := 1): the left operand is harmless; the
    // assignment sits only in the right one and is still rejected.
    let mut fx = Fixture::new();
    let two = fx.num(2.0);
    let target = fx.ident("x", Span::new(9, 10));
    let one = fx.num(1.0);
    let store = fx.assign(target, one);
    let sum = fx.binary(BinaryOp::Add, two, store);
    let zero = fx.num(0.0);
    let root = fx.let_one("x", zero, sum);

    let err = fx.analyse(root).unwrap_err();
    assert_eq!(err.code, ErrorCode::E0302);
    assert_eq!(err.span, Span::new(9, 10));
}

#[test]
fn operand_local_scope_may_still_assign_its_own_variable() {
    // let x = 0 in (let y = 0 in (y := 5; y)) + 1  =>  6
    let mut fx = Fixture::new();
    let y_target = fx.ident("y", Span::DUMMY);
    let five = fx.num(5.0);
    let store = fx.assign(y_target, five);
    let y_use = fx.ident("y", Span::DUMMY);
    let inner_body = fx.seq(&[store, y_use]);
    let zero_y = fx.num(0.0);
    let operand = fx.let_one("y", zero_y, inner_body);
    let one = fx.num(1.0);
    let sum = fx.binary(BinaryOp::Add, operand, one);
    let zero_x = fx.num(0.0);
    let root = fx.let_one("x", zero_x, sum);
    assert_eq!(fx.analyse_and_run(root), Value::num(6.0));
}

#[test]
fn assignment_reaching_through_two_binding_forms_succeeds() {
    // let x = 0 in (let y = 0 in (x := 3; x))  =>  3
    // The target sits two hops out but both hops are binding forms, so the
    // horizon is wide enough.
    let mut fx = Fixture::new();
    let x_target = fx.ident("x", Span::DUMMY);
    let three = fx.num(3.0);
    let store = fx.assign(x_target, three);
    let x_use = fx.ident("x", Span::DUMMY);
    let inner_body = fx.seq(&[store, x_use]);
    let zero_y = fx.num(0.0);
    let inner = fx.let_one("y", zero_y, inner_body);
    let zero_x = fx.num(0.0);
    let root = fx.let_one("x", zero_x, inner);
    assert_eq!(fx.analyse_and_run(root), Value::num(3.0));
}

#[test]
fn assigning_a_builtin_is_illegal_assignment() {
    // let x = 0 in (pi := 1; x)
    let mut fx = Fixture::new();
    let pi_target = fx.ident("pi", Span::new(5, 7));
    let one = fx.num(1.0);
    let store = fx.assign(pi_target, one);
    let x_use = fx.ident("x", Span::DUMMY);
    let body = fx.seq(&[store, x_use]);
    let zero = fx.num(0.0);
    let root = fx.let_one("x", zero, body);

    let err = fx.analyse(root).unwrap_err();
    assert_eq!(err.code, ErrorCode::E0302);
    assert_eq!(err.span, Span::new(5, 7));
}

#[test]
fn assigning_an_unbound_name_is_unbound_not_scope_error() {
    let mut fx = Fixture::new();
    let target = fx.ident("ghost", Span::new(0, 5));
    let one = fx.num(1.0);
    let store = fx.assign(target, one);
    let zero = fx.num(0.0);
    let root = fx.let_one("x", zero, store);

    let err = fx.analyse(root).unwrap_err();
    assert_eq!(err.code, ErrorCode::E0301);
}

#[test]
fn non_identifier_assignment_target_is_rejected() {
    let mut fx = Fixture::new();
    let target = fx.num(3.0);
    let one = fx.num(1.0);
    let store = fx.assign(target, one);
    let err = fx.analyse(store).unwrap_err();
    assert_eq!(err.code, ErrorCode::E0304);
}

#[test]
fn while_body_keeps_the_assignment_horizon() {
    // let i = 0 in (while i < 3: i := i + 1; i)  =>  3
    let mut fx = Fixture::new();
    let i_cond = fx.ident("i", Span::DUMMY);
    let three = fx.num(3.0);
    let cond = fx.binary(BinaryOp::Lt, i_cond, three);
    let i_target = fx.ident("i", Span::DUMMY);
    let i_read = fx.ident("i", Span::DUMMY);
    let one = fx.num(1.0);
    let plus = fx.binary(BinaryOp::Add, i_read, one);
    let step = fx.assign(i_target, plus);
    let loop_ = fx
        .phrases
        .push(PhraseKind::While { cond, body: step }, Span::DUMMY);
    let i_use = fx.ident("i", Span::DUMMY);
    let body = fx.seq(&[loop_, i_use]);
    let zero = fx.num(0.0);
    let root = fx.let_one("i", zero, body);
    assert_eq!(fx.analyse_and_run(root), Value::num(3.0));
}

#[test]
fn if_branches_keep_the_assignment_horizon() {
    // let x = 0 in (if true: x := 2 else x := 5; x)  =>  2
    let mut fx = Fixture::new();
    let t = fx.phrases.push(PhraseKind::Bool(true), Span::DUMMY);
    let x_then = fx.ident("x", Span::DUMMY);
    let two = fx.num(2.0);
    let store_then = fx.assign(x_then, two);
    let x_else = fx.ident("x", Span::DUMMY);
    let five = fx.num(5.0);
    let store_else = fx.assign(x_else, five);
    let branch = fx.phrases.push(
        PhraseKind::If {
            cond: t,
            then_: store_then,
            else_: store_else,
        },
        Span::DUMMY,
    );
    let x_use = fx.ident("x", Span::DUMMY);
    let body = fx.seq(&[branch, x_use]);
    let zero = fx.num(0.0);
    let root = fx.let_one("x", zero, body);
    assert_eq!(fx.analyse_and_run(root), Value::num(2.0));
}

#[test]
fn call_arguments_reset_the_horizon() {
    // let x = 0 in (max(x := 1, 2))
    let mut fx = Fixture::new();
    let max = fx.ident("max", Span::DUMMY);
    let x_target = fx.ident("x", Span::new(8, 9));
    let one = fx.num(1.0);
    let store = fx.assign(x_target, one);
    let two = fx.num(2.0);
    let args = fx.phrases.push_list(&[store, two]);
    let call = fx
        .phrases
        .push(PhraseKind::Call { func: max, args }, Span::DUMMY);
    let zero = fx.num(0.0);
    let root = fx.let_one("x", zero, call);

    let err = fx.analyse(root).unwrap_err();
    assert_eq!(err.code, ErrorCode::E0302);
    assert_eq!(err.span, Span::new(8, 9));
}

// Slot allocation

#[test]
fn sibling_scopes_reuse_slots_and_high_water_is_the_peak() {
    // let a = 1 in (let b = 2 in b) + (let c = 3 in (let d = 4 in c + d))
    // Peak of simultaneously defined locals: a, c, d  =>  3 slots.
    let mut fx = Fixture::new();

    let b_use = fx.ident("b", Span::DUMMY);
    let two = fx.num(2.0);
    let lhs = fx.let_one("b", two, b_use);

    let c_use = fx.ident("c", Span::DUMMY);
    let d_use = fx.ident("d", Span::DUMMY);
    let sum_cd = fx.binary(BinaryOp::Add, c_use, d_use);
    let four = fx.num(4.0);
    let inner_d = fx.let_one("d", four, sum_cd);
    let three = fx.num(3.0);
    let rhs = fx.let_one("c", three, inner_d);

    let sum = fx.binary(BinaryOp::Add, lhs, rhs);
    let one = fx.num(1.0);
    let root = fx.let_one("a", one, sum);

    let program = fx.analyse(root).unwrap();
    assert_eq!(program.frame_slots, 3);
    // 2 + (3 + 4)
    assert_eq!(
        run_program(&program, &fx.registry, &fx.interner),
        Ok(Value::num(9.0))
    );
}

#[test]
fn slots_within_one_frame_are_pairwise_distinct() {
    // let a = 1, b = 2, c = 3 in a: three distinct slots, all live at once.
    let mut fx = Fixture::new();
    let one = fx.num(1.0);
    let two = fx.num(2.0);
    let three = fx.num(3.0);
    let a = fx.name("a");
    let b = fx.name("b");
    let c = fx.name("c");
    let bindings = fx.phrases.push_bindings(&[
        Binding {
            name: a,
            init: one,
            span: Span::DUMMY,
        },
        Binding {
            name: b,
            init: two,
            span: Span::DUMMY,
        },
        Binding {
            name: c,
            init: three,
            span: Span::DUMMY,
        },
    ]);
    let a_use = fx.ident("a", Span::DUMMY);
    let root = fx
        .phrases
        .push(PhraseKind::Let { bindings, body: a_use }, Span::DUMMY);

    let program = fx.analyse(root).unwrap();
    assert_eq!(program.frame_slots, 3);
    let OpKind::Let { inits, .. } = program.ops.kind(program.root) else {
        panic!("root should be a let");
    };
    let slots: Vec<_> = program.ops.inits(inits).iter().map(|i| i.slot).collect();
    assert_eq!(slots.len(), 3);
    for (i, &s) in slots.iter().enumerate() {
        for &t in &slots[i + 1..] {
            assert_ne!(s, t);
        }
    }
}

// Binding-form edge cases

#[test]
fn duplicate_definition_in_one_let_is_rejected() {
    let mut fx = Fixture::new();
    let one = fx.num(1.0);
    let two = fx.num(2.0);
    let x = fx.name("x");
    let bindings = fx.phrases.push_bindings(&[
        Binding {
            name: x,
            init: one,
            span: Span::new(4, 9),
        },
        Binding {
            name: x,
            init: two,
            span: Span::new(11, 16),
        },
    ]);
    let x_use = fx.ident("x", Span::DUMMY);
    let root = fx
        .phrases
        .push(PhraseKind::Let { bindings, body: x_use }, Span::DUMMY);

    let err = fx.analyse(root).unwrap_err();
    assert_eq!(err.code, ErrorCode::E0306);
    assert_eq!(err.span, Span::new(11, 16));
    assert_eq!(err.labels[0].span, Span::new(4, 9));
}

#[test]
fn let_initialisers_do_not_see_their_own_bindings() {
    // let x = x in x: the initialiser resolves in the enclosing
    // environment, where x is unbound.
    let mut fx = Fixture::new();
    let x_init = fx.ident("x", Span::new(8, 9));
    let x_use = fx.ident("x", Span::DUMMY);
    let root = fx.let_one("x", x_init, x_use);

    let err = fx.analyse(root).unwrap_err();
    assert_eq!(err.code, ErrorCode::E0301);
    assert_eq!(err.span, Span::new(8, 9));
}

#[test]
fn definition_in_operation_position_is_not_an_operation() {
    let mut fx = Fixture::new();
    let one = fx.num(1.0);
    let name = fx.name("side");
    let def = fx
        .phrases
        .push(PhraseKind::Def { name, value: one }, Span::new(0, 8));
    let err = fx.analyse(def).unwrap_err();
    assert_eq!(err.code, ErrorCode::E0303);
    assert_eq!(err.span, Span::new(0, 8));
}

// Comprehensions

#[test]
fn for_comprehension_binds_per_element() {
    // [for v in [1, 2, 3]: v * v]  =>  [1, 4, 9]
    let mut fx = Fixture::new();
    let items: Vec<PhraseId> = [1.0, 2.0, 3.0].iter().map(|&n| fx.num(n)).collect();
    let list_range = fx.phrases.push_list(&items);
    let seq = fx.phrases.push(PhraseKind::List(list_range), Span::DUMMY);
    let v_use = fx.ident("v", Span::DUMMY);
    let square = fx.binary(BinaryOp::Mul, v_use, v_use);
    let v = fx.name("v");
    let root = fx.phrases.push(
        PhraseKind::For {
            var: v,
            seq,
            body: square,
        },
        Span::DUMMY,
    );

    assert_eq!(
        fx.analyse_and_run(root),
        Value::list(vec![Value::num(1.0), Value::num(4.0), Value::num(9.0)])
    );
}

#[test]
fn for_body_may_assign_locals_of_enclosing_binding_forms() {
    // let acc = 0 in ((for v in [1, 2, 3]: acc := acc + v); acc)  =>  6
    // `for` is a binding form, so its body's horizon still covers `acc`.
    let mut fx = Fixture::new();
    let items: Vec<PhraseId> = [1.0, 2.0, 3.0].iter().map(|&n| fx.num(n)).collect();
    let list_range = fx.phrases.push_list(&items);
    let seq = fx.phrases.push(PhraseKind::List(list_range), Span::DUMMY);

    let acc_target = fx.ident("acc", Span::DUMMY);
    let acc_read = fx.ident("acc", Span::DUMMY);
    let v_use = fx.ident("v", Span::DUMMY);
    let plus = fx.binary(BinaryOp::Add, acc_read, v_use);
    let store = fx.assign(acc_target, plus);

    let v = fx.name("v");
    let comp = fx.phrases.push(
        PhraseKind::For {
            var: v,
            seq,
            body: store,
        },
        Span::DUMMY,
    );
    let acc_use = fx.ident("acc", Span::DUMMY);
    let body = fx.seq(&[comp, acc_use]);
    let zero = fx.num(0.0);
    let root = fx.let_one("acc", zero, body);

    assert_eq!(fx.analyse_and_run(root), Value::num(6.0));
}

#[test]
fn for_sequence_expression_resets_the_horizon() {
    // let x = 0 in [for v in (x := 1; [1]): v]: the sequence is an
    // unordered position, so the assignment inside it is rejected.
    let mut fx = Fixture::new();
    let x_target = fx.ident("x", Span::new(18, 19));
    let one = fx.num(1.0);
    let store = fx.assign(x_target, one);
    let elem = fx.num(1.0);
    let list_range = fx.phrases.push_list(&[elem]);
    let list = fx.phrases.push(PhraseKind::List(list_range), Span::DUMMY);
    let seq_expr = fx.seq(&[store, list]);
    let v_use = fx.ident("v", Span::DUMMY);
    let v = fx.name("v");
    let comp = fx.phrases.push(
        PhraseKind::For {
            var: v,
            seq: seq_expr,
            body: v_use,
        },
        Span::DUMMY,
    );
    let zero = fx.num(0.0);
    let root = fx.let_one("x", zero, comp);

    let err = fx.analyse(root).unwrap_err();
    assert_eq!(err.code, ErrorCode::E0302);
    assert_eq!(err.span, Span::new(18, 19));
}

// Parentheses

#[test]
fn parentheses_are_transparent_to_the_horizon() {
    // let x = 0 in ((x := 1); x)  =>  1
    let mut fx = Fixture::new();
    let x_target = fx.ident("x", Span::DUMMY);
    let one = fx.num(1.0);
    let store = fx.assign(x_target, one);
    let wrapped = fx.phrases.push(PhraseKind::Paren(store), Span::DUMMY);
    let x_use = fx.ident("x", Span::DUMMY);
    let body = fx.seq(&[wrapped, x_use]);
    let zero = fx.num(0.0);
    let root = fx.let_one("x", zero, body);
    assert_eq!(fx.analyse_and_run(root), Value::num(1.0));
}
