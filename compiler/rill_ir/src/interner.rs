//! String interner for identifier storage.
//!
//! Provides O(1) interning and lookup. [`SharedInterner`] wraps the interner
//! in `Arc<RwLock<..>>` so the analyser and the evaluator can share one
//! instance; interning is rare after parsing, so a single lock is enough.

use parking_lot::RwLock;
use rustc_hash::FxHashMap;
use std::sync::Arc;

use crate::Name;

/// Owning string interner.
///
/// Strings are stored once in `strings`; `map` gives reverse lookup from
/// content to [`Name`]. Index 0 is always the empty string, matching
/// [`Name::EMPTY`].
pub struct StringInterner {
    map: FxHashMap<Arc<str>, Name>,
    strings: Vec<Arc<str>>,
}

impl StringInterner {
    /// Create an interner holding only the pre-interned empty string.
    pub fn new() -> Self {
        let empty: Arc<str> = Arc::from("");
        let mut map = FxHashMap::default();
        map.insert(Arc::clone(&empty), Name::EMPTY);
        StringInterner {
            map,
            strings: vec![empty],
        }
    }

    /// Intern a string, returning its stable [`Name`].
    pub fn intern(&mut self, text: &str) -> Name {
        if let Some(&name) = self.map.get(text) {
            return name;
        }
        let stored: Arc<str> = Arc::from(text);
        // Storage is bounded by the source text, which Span already limits
        // to u32 offsets.
        let name = Name::from_raw(self.strings.len() as u32);
        self.strings.push(Arc::clone(&stored));
        self.map.insert(stored, name);
        name
    }

    /// Resolve a name to its string content.
    ///
    /// Returns the empty string for a name this interner never produced.
    pub fn resolve(&self, name: Name) -> Arc<str> {
        self.strings
            .get(name.index())
            .map_or_else(|| Arc::from(""), Arc::clone)
    }

    /// Number of interned strings (including the empty string).
    pub fn len(&self) -> usize {
        self.strings.len()
    }

    /// Whether only the empty string is interned.
    pub fn is_empty(&self) -> bool {
        self.strings.len() == 1
    }
}

impl Default for StringInterner {
    fn default() -> Self {
        StringInterner::new()
    }
}

/// Thread-safe shared handle to a [`StringInterner`].
#[derive(Clone)]
pub struct SharedInterner(Arc<RwLock<StringInterner>>);

impl SharedInterner {
    /// Create a fresh shared interner.
    pub fn new() -> Self {
        SharedInterner(Arc::new(RwLock::new(StringInterner::new())))
    }

    /// Intern a string.
    pub fn intern(&self, text: &str) -> Name {
        self.0.write().intern(text)
    }

    /// Resolve a name to its string content.
    pub fn resolve(&self, name: Name) -> Arc<str> {
        self.0.read().resolve(name)
    }
}

impl Default for SharedInterner {
    fn default() -> Self {
        SharedInterner::new()
    }
}
