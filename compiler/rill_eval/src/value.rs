//! Runtime values.
//!
//! Heap values (strings, lists) are reference-counted with `Arc`; cloning a
//! value is cheap. Values are immutable once constructed — assignment
//! replaces the slot's value, never mutates in place.

use std::fmt;
use std::sync::Arc;

use rill_ir::{BuiltinId, ConstValue, SharedInterner};

/// Runtime value.
#[derive(Clone, PartialEq, Debug)]
pub enum Value {
    /// Number (all Rill numbers are f64).
    Num(f64),
    /// Boolean.
    Bool(bool),
    /// Immutable string.
    Str(Arc<str>),
    /// Immutable list.
    List(Arc<[Value]>),
    /// A builtin function value.
    Func(BuiltinId),
    /// Unit.
    Unit,
}

impl Value {
    /// Create a number value.
    #[inline]
    pub fn num(n: f64) -> Self {
        Value::Num(n)
    }

    /// Create a string value.
    pub fn string(s: impl Into<Arc<str>>) -> Self {
        Value::Str(s.into())
    }

    /// Create a list value.
    pub fn list(items: Vec<Value>) -> Self {
        Value::List(items.into())
    }

    /// Widen a compile-time constant to a runtime value.
    pub fn from_const(c: ConstValue, interner: &SharedInterner) -> Self {
        match c {
            ConstValue::Num(n) => Value::Num(n),
            ConstValue::Bool(b) => Value::Bool(b),
            ConstValue::Str(name) => Value::Str(interner.resolve(name)),
            ConstValue::Unit => Value::Unit,
        }
    }

    /// The value's type name, used in error messages.
    pub const fn type_name(&self) -> &'static str {
        match self {
            Value::Num(_) => "number",
            Value::Bool(_) => "boolean",
            Value::Str(_) => "string",
            Value::List(_) => "list",
            Value::Func(_) => "function",
            Value::Unit => "unit",
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Num(n) => write!(f, "{n}"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Str(s) => write!(f, "{s:?}"),
            Value::List(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{item}")?;
                }
                write!(f, "]")
            }
            Value::Func(_) => write!(f, "<builtin function>"),
            Value::Unit => write!(f, "()"),
        }
    }
}
