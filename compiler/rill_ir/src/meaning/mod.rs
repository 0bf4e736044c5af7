//! The resolved operation tree ("meaning" of a phrase).
//!
//! Semantic analysis turns a [`PhraseArena`](crate::PhraseArena) into an
//! [`OpArena`]: identifiers are resolved either to frame [`Slot`]s or to
//! entries of the builtin [`Namespace`], and every binding site carries the
//! slot it was assigned at analysis time. The evaluator indexes runtime
//! storage directly with those slots; it never resolves a name.
//!
//! Unlike the phrase tree, operations may be shared: the same [`OpId`] can
//! appear under several parents, making the structure a DAG.

use std::fmt;

use rustc_hash::FxHashMap;

use crate::{BinaryOp, Name, Span, UnaryOp};


/// Index into a runtime frame's local-variable storage, assigned statically.
#[derive(Copy, Clone, Eq, PartialEq, Hash)]
#[repr(transparent)]
pub struct Slot(u32);

impl Slot {
    /// Create a slot from a raw index.
    #[inline]
    pub const fn new(index: u32) -> Self {
        Slot(index)
    }

    /// Get the raw index into frame storage.
    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    /// Get the raw u32 value.
    #[inline]
    pub const fn raw(self) -> u32 {
        self.0
    }
}

impl fmt::Debug for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Slot({})", self.0)
    }
}

/// Index into an [`OpArena`]. Distinct from
/// [`PhraseId`](crate::PhraseId) — these reference resolved operations in a
/// separate index space.
#[derive(Copy, Clone, Eq, PartialEq, Hash)]
#[repr(transparent)]
pub struct OpId(u32);

impl OpId {
    /// Sentinel value indicating "no operation" (e.g. a missing `else`).
    pub const INVALID: OpId = OpId(u32::MAX);

    /// Create a new `OpId` from a raw index.
    #[inline]
    pub const fn new(index: u32) -> Self {
        Self(index)
    }

    /// Get the raw index into the arena.
    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    /// Whether this is a real operation (not the sentinel).
    #[inline]
    pub const fn is_valid(self) -> bool {
        self.0 != u32::MAX
    }
}

impl fmt::Debug for OpId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_valid() {
            write!(f, "OpId({})", self.0)
        } else {
            write!(f, "OpId(INVALID)")
        }
    }
}

/// Contiguous run of operation IDs in the arena's `op_lists` table.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct OpRange {
    pub start: u32,
    pub len: u32,
}

impl OpRange {
    /// An empty range.
    pub const EMPTY: OpRange = OpRange { start: 0, len: 0 };

    /// Whether the range holds no operations.
    #[inline]
    pub const fn is_empty(self) -> bool {
        self.len == 0
    }
}

/// One resolved `let` binding: the slot to fill and its initialiser.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct SlotInit {
    pub slot: Slot,
    pub init: OpId,
}

/// Contiguous run of [`SlotInit`]s in the arena's `inits` table.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct SlotInitRange {
    pub start: u32,
    pub len: u32,
}

/// Compile-time constant value.
///
/// Compact `Copy` representation used in the operation tree and in builtin
/// namespaces; the evaluator widens it to a runtime value.
#[derive(Copy, Clone, PartialEq, Debug)]
pub enum ConstValue {
    Num(f64),
    Bool(bool),
    /// String contents, interned.
    Str(Name),
    Unit,
}

/// Identifies a builtin function in the evaluator's registry.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
#[repr(transparent)]
pub struct BuiltinId(u32);

impl BuiltinId {
    /// Create from a raw index.
    #[inline]
    pub const fn new(index: u32) -> Self {
        BuiltinId(index)
    }

    /// Get the raw index into the registry.
    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

/// A pre-resolved meaning in the builtin namespace.
#[derive(Copy, Clone, PartialEq, Debug)]
pub enum Builtin {
    /// A builtin constant, e.g. `pi`.
    Const(ConstValue),
    /// A builtin function, e.g. `sqrt`.
    Func(BuiltinId),
}

/// Immutable name-to-meaning mapping forming the outermost scope.
///
/// Built once before analysis and shared read-only; analysis never writes
/// to it, so one namespace may serve many passes.
#[derive(Clone, Debug, Default)]
pub struct Namespace {
    entries: FxHashMap<Name, Builtin>,
}

impl Namespace {
    /// Create an empty namespace.
    pub fn new() -> Self {
        Namespace::default()
    }

    /// Bind a name, replacing any previous binding.
    pub fn define(&mut self, name: Name, builtin: Builtin) {
        self.entries.insert(name, builtin);
    }

    /// Look up a name.
    #[inline]
    pub fn get(&self, name: Name) -> Option<Builtin> {
        self.entries.get(&name).copied()
    }

    /// Number of bindings.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the namespace holds no bindings.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Resolved operation kinds (closed set).
///
/// Every variant has a defined run-time evaluation effect; phrases that
/// cannot denote one never make it past analysis.
#[derive(Copy, Clone, PartialEq, Debug)]
pub enum OpKind {
    /// Constant value.
    Const(ConstValue),
    /// Reference to a builtin function value.
    BuiltinFunc(BuiltinId),
    /// Read a local variable.
    LocalRef { slot: Slot },
    /// Store into a local variable; evaluates to unit.
    AssignLocal { slot: Slot, value: OpId },
    /// Unary operator application.
    Unary { op: UnaryOp, arg: OpId },
    /// Binary operator application.
    Binary { op: BinaryOp, lhs: OpId, rhs: OpId },
    /// Function call.
    Call { func: OpId, args: OpRange },
    /// List constructor.
    List(OpRange),
    /// Ordered sequence; value of the last operation, unit when empty.
    Seq(OpRange),
    /// Conditional. `else_` is [`OpId::INVALID`] when absent (unit result).
    If {
        cond: OpId,
        then_: OpId,
        else_: OpId,
    },
    /// Loop; evaluates to unit.
    While { cond: OpId, body: OpId },
    /// Fill the bound slots from their initialisers, then run the body.
    Let { inits: SlotInitRange, body: OpId },
    /// List comprehension: bind `slot` to each element of `seq`, collect
    /// the body's values.
    For { slot: Slot, seq: OpId, body: OpId },
}

/// Arena for resolved operations.
///
/// Same struct-of-arrays layout as [`PhraseArena`](crate::PhraseArena), with
/// side tables for operation lists and `let` initialisers.
#[derive(Clone, Debug, Default)]
pub struct OpArena {
    kinds: Vec<OpKind>,
    spans: Vec<Span>,
    op_lists: Vec<OpId>,
    inits: Vec<SlotInit>,
}

impl OpArena {
    /// Create an empty arena.
    pub fn new() -> Self {
        OpArena::default()
    }

    /// Allocate an operation, returning its ID.
    pub fn push(&mut self, kind: OpKind, span: Span) -> OpId {
        let id = OpId::new(self.kinds.len() as u32);
        self.kinds.push(kind);
        self.spans.push(span);
        id
    }

    /// Get the kind of an operation.
    #[inline]
    pub fn kind(&self, id: OpId) -> OpKind {
        self.kinds[id.index()]
    }

    /// Get the source span of an operation.
    #[inline]
    pub fn span(&self, id: OpId) -> Span {
        self.spans[id.index()]
    }

    /// Store a list of operation IDs, returning its range.
    pub fn push_list(&mut self, items: &[OpId]) -> OpRange {
        let start = self.op_lists.len() as u32;
        self.op_lists.extend_from_slice(items);
        OpRange {
            start,
            len: items.len() as u32,
        }
    }

    /// Get the operation IDs of a range.
    #[inline]
    pub fn list(&self, range: OpRange) -> &[OpId] {
        &self.op_lists[range.start as usize..(range.start + range.len) as usize]
    }

    /// Store a list of `let` initialisers, returning its range.
    pub fn push_inits(&mut self, items: &[SlotInit]) -> SlotInitRange {
        let start = self.inits.len() as u32;
        self.inits.extend_from_slice(items);
        SlotInitRange {
            start,
            len: items.len() as u32,
        }
    }

    /// Get the initialisers of a range.
    #[inline]
    pub fn inits(&self, range: SlotInitRange) -> &[SlotInit] {
        &self.inits[range.start as usize..(range.start + range.len) as usize]
    }

    /// Number of operations in the arena.
    pub fn len(&self) -> usize {
        self.kinds.len()
    }

    /// Whether the arena holds no operations.
    pub fn is_empty(&self) -> bool {
        self.kinds.is_empty()
    }
}

/// Complete output of one analysis pass: the operation arena, the root
/// operation, and the frame's slot high-water mark (the evaluator sizes
/// contiguous runtime storage from it).
#[derive(Clone, Debug)]
pub struct Program {
    pub ops: OpArena,
    pub root: OpId,
    /// High-water mark of simultaneously defined locals in the root frame.
    pub frame_slots: u32,
}
