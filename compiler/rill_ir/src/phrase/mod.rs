//! The syntactic parse tree ("phrase" tree).
//!
//! A phrase is purely syntactic: no names are resolved, no slots assigned.
//! The parser builds a [`PhraseArena`] and hands it to analysis read-only;
//! nothing here is ever mutated afterwards.
//!
//! # Index Spaces
//!
//! - `kinds`/`spans`: parallel arrays indexed by [`PhraseId`]
//! - `phrase_lists`: flat `Vec<PhraseId>` indexed by [`PhraseRange`]
//! - `bindings`: `let` binding lists indexed by [`BindingRange`]

use std::fmt;

use crate::{BinaryOp, Name, Span, UnaryOp};


/// Index into a [`PhraseArena`].
#[derive(Copy, Clone, Eq, PartialEq, Hash)]
#[repr(transparent)]
pub struct PhraseId(u32);

impl PhraseId {
    /// Sentinel value indicating "no phrase" (e.g. a missing `else` branch).
    pub const INVALID: PhraseId = PhraseId(u32::MAX);

    /// Create a new `PhraseId` from a raw index.
    #[inline]
    pub const fn new(index: u32) -> Self {
        Self(index)
    }

    /// Get the raw index into the arena.
    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    /// Whether this is a real phrase (not the sentinel).
    #[inline]
    pub const fn is_valid(self) -> bool {
        self.0 != u32::MAX
    }
}

impl fmt::Debug for PhraseId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_valid() {
            write!(f, "PhraseId({})", self.0)
        } else {
            write!(f, "PhraseId(INVALID)")
        }
    }
}

/// Contiguous run of phrase IDs in the arena's `phrase_lists` table.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct PhraseRange {
    pub start: u32,
    pub len: u32,
}

impl PhraseRange {
    /// An empty range.
    pub const EMPTY: PhraseRange = PhraseRange { start: 0, len: 0 };

    /// Whether the range holds no phrases.
    #[inline]
    pub const fn is_empty(self) -> bool {
        self.len == 0
    }
}

/// Contiguous run of `let` bindings in the arena's `bindings` table.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct BindingRange {
    pub start: u32,
    pub len: u32,
}

/// One `name = init` entry of a `let` phrase.
#[derive(Copy, Clone, PartialEq, Debug)]
pub struct Binding {
    /// The bound identifier.
    pub name: Name,
    /// The initialiser phrase.
    pub init: PhraseId,
    /// Span of the whole binding, for duplicate-definition diagnostics.
    pub span: Span,
}

/// Syntactic phrase kinds (closed set).
///
/// Every kind a parser for the full grammar can produce. Analysis dispatches
/// on this; anything that cannot denote a run-time effect (today only
/// [`PhraseKind::Def`]) is rejected there, not here.
#[derive(Copy, Clone, PartialEq, Debug)]
pub enum PhraseKind {
    /// Numeric literal.
    Num(f64),
    /// Boolean literal.
    Bool(bool),
    /// String literal (contents interned).
    Str(Name),
    /// Unit literal `()`.
    Unit,
    /// Identifier reference.
    Ident(Name),
    /// Parenthesised phrase; semantically transparent.
    Paren(PhraseId),
    /// Unary operator application.
    Unary { op: UnaryOp, arg: PhraseId },
    /// Binary operator application.
    Binary {
        op: BinaryOp,
        lhs: PhraseId,
        rhs: PhraseId,
    },
    /// Function call `f(a, b, ..)`.
    Call { func: PhraseId, args: PhraseRange },
    /// List constructor `[a, b, ..]`.
    List(PhraseRange),
    /// Ordered statement sequence `a; b; c`; value of the last statement.
    Seq(PhraseRange),
    /// Conditional. `else_` is [`PhraseId::INVALID`] when absent.
    If {
        cond: PhraseId,
        then_: PhraseId,
        else_: PhraseId,
    },
    /// Loop statement; evaluates to unit.
    While { cond: PhraseId, body: PhraseId },
    /// Local-variable assignment `target := value`.
    Assign { target: PhraseId, value: PhraseId },
    /// Non-recursive binding form `let a = .., b = .. in body`.
    Let {
        bindings: BindingRange,
        body: PhraseId,
    },
    /// List comprehension `[for var in seq: body]`; binds `var` per element.
    For {
        var: Name,
        seq: PhraseId,
        body: PhraseId,
    },
    /// A bare definition `name = value`. Not an operation by itself; only
    /// legal inside constructs that collect definitions.
    Def { name: Name, value: PhraseId },
}

/// Arena for phrases.
///
/// Struct-of-arrays layout: parallel `kinds` and `spans` vectors indexed by
/// [`PhraseId`], with side tables for phrase lists and binding lists.
#[derive(Clone, Debug, Default)]
pub struct PhraseArena {
    kinds: Vec<PhraseKind>,
    spans: Vec<Span>,
    phrase_lists: Vec<PhraseId>,
    bindings: Vec<Binding>,
}

impl PhraseArena {
    /// Create an empty arena.
    pub fn new() -> Self {
        PhraseArena::default()
    }

    /// Allocate a phrase, returning its ID.
    pub fn push(&mut self, kind: PhraseKind, span: Span) -> PhraseId {
        let id = PhraseId::new(self.kinds.len() as u32);
        self.kinds.push(kind);
        self.spans.push(span);
        id
    }

    /// Get the kind of a phrase.
    #[inline]
    pub fn kind(&self, id: PhraseId) -> PhraseKind {
        self.kinds[id.index()]
    }

    /// Get the source span of a phrase.
    #[inline]
    pub fn span(&self, id: PhraseId) -> Span {
        self.spans[id.index()]
    }

    /// Store a list of phrase IDs, returning its range.
    pub fn push_list(&mut self, items: &[PhraseId]) -> PhraseRange {
        let start = self.phrase_lists.len() as u32;
        self.phrase_lists.extend_from_slice(items);
        PhraseRange {
            start,
            len: items.len() as u32,
        }
    }

    /// Get the phrase IDs of a range.
    #[inline]
    pub fn list(&self, range: PhraseRange) -> &[PhraseId] {
        &self.phrase_lists[range.start as usize..(range.start + range.len) as usize]
    }

    /// Store a list of `let` bindings, returning its range.
    pub fn push_bindings(&mut self, items: &[Binding]) -> BindingRange {
        let start = self.bindings.len() as u32;
        self.bindings.extend_from_slice(items);
        BindingRange {
            start,
            len: items.len() as u32,
        }
    }

    /// Get the bindings of a range.
    #[inline]
    pub fn bindings(&self, range: BindingRange) -> &[Binding] {
        &self.bindings[range.start as usize..(range.start + range.len) as usize]
    }

    /// Number of phrases in the arena.
    pub fn len(&self) -> usize {
        self.kinds.len()
    }

    /// Whether the arena holds no phrases.
    pub fn is_empty(&self) -> bool {
        self.kinds.is_empty()
    }
}
