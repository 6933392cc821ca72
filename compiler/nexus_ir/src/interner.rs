//! String interner for identifiers and string literals.
//!
//! Provides O(1) interning and lookup. The interner is a single table
//! behind a `parking_lot::RwLock`: evaluation is single-threaded, so the
//! lock only arbitrates between the lexer and the evaluator's occasional
//! `intern` calls within one thread of execution.

use crate::Name;
use parking_lot::RwLock;
use rustc_hash::FxHashMap;

struct Inner {
    /// Map from string content to index.
    map: FxHashMap<&'static str, u32>,
    /// Storage for string contents, indexed by `Name`.
    strings: Vec<&'static str>,
}

/// String interner.
///
/// Interned strings are leaked to `'static` and live for the process
/// lifetime; the set of distinct identifiers and string literals in a
/// program is small and bounded by the source text.
pub struct StringInterner {
    inner: RwLock<Inner>,
}

impl StringInterner {
    /// Create a new interner with the empty string and all Nexus keywords
    /// pre-interned.
    pub fn new() -> Self {
        let interner = StringInterner {
            inner: RwLock::new(Inner {
                map: FxHashMap::default(),
                strings: Vec::with_capacity(64),
            }),
        };
        interner.intern("");
        interner.pre_intern_keywords();
        interner
    }

    /// Intern a string, returning its Name.
    #[inline]
    pub fn intern(&self, s: &str) -> Name {
        // Fast path: already interned
        {
            let guard = self.inner.read();
            if let Some(&idx) = guard.map.get(s) {
                return Name::from_raw(idx);
            }
        }
        self.intern_owned(s.to_owned())
    }

    /// Intern an owned String, avoiding a second allocation when the
    /// caller already holds one (e.g. a string literal's body).
    pub fn intern_owned(&self, s: String) -> Name {
        let mut guard = self.inner.write();

        // Double-check after acquiring the write lock
        if let Some(&idx) = guard.map.get(s.as_str()) {
            return Name::from_raw(idx);
        }

        // Leak the string to get a 'static lifetime
        let leaked: &'static str = Box::leak(s.into_boxed_str());
        let idx = u32::try_from(guard.strings.len()).unwrap_or_else(|_| {
            // Over four billion distinct strings cannot come from a real
            // source file; treat it as a corrupt input.
            panic!("string interner exceeded u32::MAX entries")
        });
        guard.strings.push(leaked);
        guard.map.insert(leaked, idx);
        Name::from_raw(idx)
    }

    /// Look up the string for a Name.
    ///
    /// Interned strings are never deallocated, so the returned reference
    /// is `'static`.
    pub fn lookup(&self, name: Name) -> &'static str {
        let guard = self.inner.read();
        guard.strings[name.index()]
    }

    /// Number of interned strings.
    pub fn len(&self) -> usize {
        self.inner.read().strings.len()
    }

    /// Check if the interner holds only the empty string and keywords.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Snapshot every interned string in index order.
    ///
    /// Used by the compiled-AST cache: restoring the dump with
    /// [`StringInterner::from_dump`] reproduces identical `Name`
    /// assignments, so a serialized AST's names resolve unchanged.
    pub fn dump(&self) -> Vec<String> {
        let guard = self.inner.read();
        guard.strings.iter().map(|s| (*s).to_owned()).collect()
    }

    /// Rebuild an interner from a [`StringInterner::dump`] snapshot.
    pub fn from_dump(strings: Vec<String>) -> Self {
        let interner = StringInterner {
            inner: RwLock::new(Inner {
                map: FxHashMap::default(),
                strings: Vec::with_capacity(strings.len()),
            }),
        };
        {
            let mut guard = interner.inner.write();
            for s in strings {
                let leaked: &'static str = Box::leak(s.into_boxed_str());
                let idx = guard.strings.len() as u32;
                guard.strings.push(leaked);
                guard.map.insert(leaked, idx);
            }
        }
        interner
    }

    /// Pre-intern all Nexus keywords and well-known identifiers.
    fn pre_intern_keywords(&self) {
        const KEYWORDS: &[&str] = &[
            // Reserved keywords
            "var", "const", "func", "if", "elif", "else", "while", "for", "break", "continue",
            "return", "class", "try", "catch", "throw", "true", "false", "null",
            // Well-known identifiers
            "this", "init", "print", "input", "type", "str", "num", "len",
        ];
        for kw in KEYWORDS {
            self.intern(kw);
        }
    }
}

impl Default for StringInterner {
    fn default() -> Self {
        Self::new()
    }
}
