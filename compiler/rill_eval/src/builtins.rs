//! Builtin function registry and the standard namespace.
//!
//! Analysis resolves builtin names against a read-only
//! [`Namespace`](rill_ir::Namespace); the registry holds the matching
//! function table the [`Machine`](crate::Machine) dispatches through.
//! The two are built together by [`standard_namespace`] so their
//! [`BuiltinId`]s stay in step.

use rill_ir::{Builtin, BuiltinId, ConstValue, Namespace, SharedInterner};

use crate::Value;

/// Native implementation of a builtin function.
///
/// Failures are plain strings; the machine attaches the call site span and
/// wraps them into an `EvalError`.
pub type BuiltinFn = fn(&[Value]) -> Result<Value, String>;

/// One registered builtin function.
#[derive(Clone, Copy)]
pub struct BuiltinDef {
    /// Surface name, for error messages.
    pub name: &'static str,
    /// Expected argument count.
    pub arity: usize,
    /// Native implementation.
    pub func: BuiltinFn,
}

/// Table of builtin functions, indexed by [`BuiltinId`].
#[derive(Default)]
pub struct BuiltinRegistry {
    defs: Vec<BuiltinDef>,
}

impl BuiltinRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        BuiltinRegistry::default()
    }

    /// Register a builtin, returning its ID.
    pub fn register(&mut self, name: &'static str, arity: usize, func: BuiltinFn) -> BuiltinId {
        let id = BuiltinId::new(self.defs.len() as u32);
        self.defs.push(BuiltinDef { name, arity, func });
        id
    }

    /// Look up a builtin definition.
    #[inline]
    pub fn get(&self, id: BuiltinId) -> Option<&BuiltinDef> {
        self.defs.get(id.index())
    }

    /// Number of registered builtins.
    pub fn len(&self) -> usize {
        self.defs.len()
    }

    /// Whether the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.defs.is_empty()
    }
}

fn want_num(v: &Value, builtin: &str) -> Result<f64, String> {
    match v {
        Value::Num(n) => Ok(*n),
        other => Err(format!("{builtin}: expected number, got {}", other.type_name())),
    }
}

fn builtin_abs(args: &[Value]) -> Result<Value, String> {
    Ok(Value::num(want_num(&args[0], "abs")?.abs()))
}

fn builtin_sqrt(args: &[Value]) -> Result<Value, String> {
    let n = want_num(&args[0], "sqrt")?;
    if n < 0.0 {
        return Err(format!("sqrt: argument is negative ({n})"));
    }
    Ok(Value::num(n.sqrt()))
}

fn builtin_floor(args: &[Value]) -> Result<Value, String> {
    Ok(Value::num(want_num(&args[0], "floor")?.floor()))
}

fn builtin_ceil(args: &[Value]) -> Result<Value, String> {
    Ok(Value::num(want_num(&args[0], "ceil")?.ceil()))
}

fn builtin_max(args: &[Value]) -> Result<Value, String> {
    let a = want_num(&args[0], "max")?;
    let b = want_num(&args[1], "max")?;
    Ok(Value::num(a.max(b)))
}

fn builtin_min(args: &[Value]) -> Result<Value, String> {
    let a = want_num(&args[0], "min")?;
    let b = want_num(&args[1], "min")?;
    Ok(Value::num(a.min(b)))
}

fn builtin_len(args: &[Value]) -> Result<Value, String> {
    match &args[0] {
        Value::List(items) => Ok(Value::num(items.len() as f64)),
        Value::Str(s) => Ok(Value::num(s.chars().count() as f64)),
        other => Err(format!("len: expected list or string, got {}", other.type_name())),
    }
}

fn builtin_not(args: &[Value]) -> Result<Value, String> {
    match &args[0] {
        Value::Bool(b) => Ok(Value::Bool(!b)),
        other => Err(format!("not: expected boolean, got {}", other.type_name())),
    }
}

/// Build the standard builtin namespace and its matching function table.
///
/// The namespace is the outermost scope of every ordinary analysis pass.
/// It is immutable from here on; analysis only reads it.
pub fn standard_namespace(interner: &SharedInterner) -> (Namespace, BuiltinRegistry) {
    let mut ns = Namespace::new();
    let mut registry = BuiltinRegistry::new();

    let consts: &[(&str, f64)] = &[
        ("pi", std::f64::consts::PI),
        ("tau", std::f64::consts::TAU),
        ("inf", f64::INFINITY),
    ];
    for &(name, value) in consts {
        ns.define(interner.intern(name), Builtin::Const(ConstValue::Num(value)));
    }

    let funcs: &[(&str, usize, BuiltinFn)] = &[
        ("abs", 1, builtin_abs),
        ("sqrt", 1, builtin_sqrt),
        ("floor", 1, builtin_floor),
        ("ceil", 1, builtin_ceil),
        ("max", 2, builtin_max),
        ("min", 2, builtin_min),
        ("len", 1, builtin_len),
        ("not", 1, builtin_not),
    ];
    for &(name, arity, func) in funcs {
        let id = registry.register(name, arity, func);
        ns.define(interner.intern(name), Builtin::Func(id));
    }

    (ns, registry)
}
