//! The environment chain: lexical scopes used only during analysis.
//!
//! An [`Environ`] is a node of a singly linked, borrowed scope chain built
//! as the analyser descends the phrase tree. A child never outlives its
//! parent — each node lives on the stack of the recursive call that
//! introduced it — so parents are plain shared references, no ownership.
//!
//! Frame slot accounting is deliberately *not* stored in the chain: the
//! analyser threads one [`FrameShape`] value through the whole recursion,
//! making slot allocation an explicit state transition that can be marked
//! and restored at scope boundaries.

use rustc_hash::FxHashMap;

use rill_ir::{Builtin, Name, Namespace, Slot};


/// Slot accounting for the runtime frame under construction.
///
/// Invariant: `nslots <= maxslots`, and `maxslots` is monotonically
/// non-decreasing — slots are assigned on first use and never reallocated
/// within one scope, but disjoint sibling scopes may reuse indices after a
/// [`restore`](FrameShape::restore).
#[derive(Debug, Default)]
pub struct FrameShape {
    nslots: u32,
    maxslots: u32,
}

impl FrameShape {
    /// Fresh frame with no slots allocated.
    pub fn new() -> Self {
        FrameShape::default()
    }

    /// Allocate the next unused local slot, raising the high-water mark if
    /// needed. Called exactly once per local-variable definition site.
    pub fn make_slot(&mut self) -> Slot {
        let slot = Slot::new(self.nslots);
        self.nslots += 1;
        if self.maxslots < self.nslots {
            self.maxslots = self.nslots;
        }
        slot
    }

    /// Current allocation point, to be passed to [`restore`](Self::restore)
    /// when the scope being built ends.
    pub fn mark(&self) -> u32 {
        self.nslots
    }

    /// Roll allocation back to a previous [`mark`](Self::mark). The
    /// high-water mark is unaffected.
    pub fn restore(&mut self, mark: u32) {
        debug_assert!(mark <= self.nslots);
        self.nslots = mark;
    }

    /// Number of currently allocated slots.
    pub fn nslots(&self) -> u32 {
        self.nslots
    }

    /// High-water mark of simultaneously allocated slots.
    pub fn maxslots(&self) -> u32 {
        self.maxslots
    }
}

/// Name-to-slot bindings of one local scope.
#[derive(Debug, Default)]
pub struct ScopeMap {
    bindings: FxHashMap<Name, Slot>,
}

impl ScopeMap {
    /// Empty scope.
    pub fn new() -> Self {
        ScopeMap::default()
    }

    /// Bind a name to a slot, returning the previously bound slot if the
    /// name was already defined in this scope.
    pub fn define(&mut self, name: Name, slot: Slot) -> Option<Slot> {
        self.bindings.insert(name, slot)
    }

    /// Look up a name in this scope only.
    pub fn get(&self, name: Name) -> Option<Slot> {
        self.bindings.get(&name).copied()
    }
}

/// How a particular kind of scope stores its bindings.
///
/// This is the variant-specific seam under the shared chain-walking logic:
/// the builtin root resolves against the supplied [`Namespace`], local
/// scopes against their own [`ScopeMap`].
#[derive(Clone, Copy, Debug)]
pub enum EnvKind<'a> {
    /// Terminal root environment backed by the builtin namespace.
    Builtin(&'a Namespace),
    /// Local scope introduced by a binding form.
    Scope(&'a ScopeMap),
}

/// A node in the scope chain.
#[derive(Clone, Copy, Debug)]
pub struct Environ<'a> {
    parent: Option<&'a Environ<'a>>,
    kind: EnvKind<'a>,
}

/// Successful resolution of a name.
#[derive(Clone, Copy, PartialEq, Debug)]
pub enum Resolved {
    /// A local variable, with the slot assigned at its definition site.
    Local(Slot),
    /// An entry of the builtin namespace.
    Builtin(Builtin),
}

/// Why an assignment-target lookup failed.
#[derive(Clone, Copy, Eq, PartialEq, Debug)]
pub enum LvarError {
    /// No environment in the chain binds the name.
    Unbound,
    /// The binding exists but lies beyond the permitted horizon.
    OutOfReach,
    /// The name resolves to a builtin, which is never an assignable local.
    NotAssignable,
}

impl<'a> Environ<'a> {
    /// Root environment over the builtin namespace.
    pub fn root(names: &'a Namespace) -> Self {
        Environ {
            parent: None,
            kind: EnvKind::Builtin(names),
        }
    }

    /// Child environment for a local scope. The parent must outlive the
    /// child, which the borrow guarantees.
    pub fn nested(parent: &'a Environ<'a>, scope: &'a ScopeMap) -> Self {
        Environ {
            parent: Some(parent),
            kind: EnvKind::Scope(scope),
        }
    }

    /// Resolve a name using only this environment's own bindings.
    pub fn single_lookup(&self, name: Name) -> Option<Resolved> {
        match self.kind {
            EnvKind::Builtin(names) => names.get(name).map(Resolved::Builtin),
            EnvKind::Scope(scope) => scope.get(name).map(Resolved::Local),
        }
    }

    /// Ordinary (non-assignable) lookup: walk outward from the innermost
    /// scope. `None` means no environment in the chain binds the name.
    pub fn lookup(&self, name: Name) -> Option<Resolved> {
        let mut env = Some(self);
        while let Some(e) = env {
            if let Some(resolved) = e.single_lookup(name) {
                return Some(resolved);
            }
            env = e.parent;
        }
        None
    }

    /// Resolve a name for use as an assignment target.
    ///
    /// The binding must be a local found within `edepth` enclosing-scope
    /// hops (hop 0 is this environment). A binding that exists but lies
    /// beyond that horizon is *not* downgraded to an ordinary lookup — it
    /// is reported as out of reach, which is what keeps assignment from
    /// escaping into phrases with unspecified evaluation order.
    pub fn lookup_lvar(&self, name: Name, edepth: u32) -> Result<Slot, LvarError> {
        let mut env = self;
        let mut hops = 0u32;
        loop {
            if let Some(resolved) = env.single_lookup(name) {
                return match resolved {
                    Resolved::Local(slot) if hops < edepth => Ok(slot),
                    Resolved::Local(_) => Err(LvarError::OutOfReach),
                    Resolved::Builtin(_) => Err(LvarError::NotAssignable),
                };
            }
            match env.parent {
                Some(parent) => {
                    env = parent;
                    hops += 1;
                }
                None => return Err(LvarError::Unbound),
            }
        }
    }
}
