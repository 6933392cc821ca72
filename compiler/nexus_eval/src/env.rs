//! Environment for variable scoping in the interpreter.
//!
//! Scopes live in an arena owned by [`Environment`] and reference their
//! parents by [`ScopeId`]. Closures capture the id of the scope that was
//! active at their declaration, so two closures over the same scope
//! observe each other's mutations. Id links cannot form ownership
//! cycles; every scope is reclaimed when the environment is dropped.

use rustc_hash::FxHashMap;

use crate::Value;
use nexus_ir::Name;

/// Id of a scope in the environment's arena.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
#[repr(transparent)]
pub struct ScopeId(u32);

impl ScopeId {
    #[inline]
    const fn index(self) -> usize {
        self.0 as usize
    }
}

/// Whether a variable binding can be reassigned.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Mutability {
    /// Binding can be reassigned (`var x = ...`).
    Mutable,
    /// Binding cannot be reassigned (`const x = ...`).
    Const,
}

impl Mutability {
    /// Returns `true` if this is `Mutable`.
    #[inline]
    pub fn is_mutable(self) -> bool {
        matches!(self, Mutability::Mutable)
    }
}

/// Error returned by [`Environment::declare`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DeclareError {
    /// The name is already bound as `const` in this exact scope.
    ConstRedeclaration,
}

/// Error returned by [`Environment::assign`], letting callers produce the
/// correct diagnostic for each failure mode.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AssignError {
    /// Variable exists but is `const`.
    Immutable,
    /// Variable not found in any enclosing scope.
    Undefined,
}

/// A variable binding.
#[derive(Clone, Debug)]
struct Binding {
    value: Value,
    mutability: Mutability,
}

/// A single scope containing variable bindings.
#[derive(Clone, Debug)]
struct Scope {
    /// `FxHashMap` for faster hashing with `Name` keys.
    bindings: FxHashMap<Name, Binding>,
    /// Parent scope (lexical enclosing scope).
    parent: Option<ScopeId>,
}

/// Scope arena for the interpreter.
///
/// Scopes are allocated per block, function call, `for` header, and
/// `catch` clause, and swept wholesale when the environment is dropped:
/// deferred sweeping keeps closure-reachable scopes alive for as long as
/// any holder can still reach them.
pub struct Environment {
    scopes: Vec<Scope>,
}

impl Environment {
    /// Create an environment containing only the root (global) scope.
    pub fn new() -> Self {
        Environment {
            scopes: vec![Scope {
                bindings: FxHashMap::default(),
                parent: None,
            }],
        }
    }

    /// The root scope.
    #[inline]
    pub fn root(&self) -> ScopeId {
        ScopeId(0)
    }

    /// Allocate a fresh scope whose parent is `parent`.
    pub fn push_child(&mut self, parent: ScopeId) -> ScopeId {
        let id = ScopeId(self.scopes.len() as u32);
        self.scopes.push(Scope {
            bindings: FxHashMap::default(),
            parent: Some(parent),
        });
        id
    }

    /// Create a binding in `scope`.
    ///
    /// Shadowing an existing binding, in this scope or any enclosing
    /// one, binds a new slot, except that redeclaring over a `const` in
    /// this exact scope fails.
    pub fn declare(
        &mut self,
        scope: ScopeId,
        name: Name,
        value: Value,
        mutability: Mutability,
    ) -> Result<(), DeclareError> {
        let bindings = &mut self.scopes[scope.index()].bindings;
        if let Some(existing) = bindings.get(&name) {
            if !existing.mutability.is_mutable() {
                return Err(DeclareError::ConstRedeclaration);
            }
        }
        bindings.insert(name, Binding { value, mutability });
        Ok(())
    }

    /// Assign to the nearest existing binding, walking the parent chain.
    pub fn assign(&mut self, scope: ScopeId, name: Name, value: Value) -> Result<(), AssignError> {
        let mut current = Some(scope);
        while let Some(id) = current {
            let scope = &mut self.scopes[id.index()];
            if let Some(binding) = scope.bindings.get_mut(&name) {
                if !binding.mutability.is_mutable() {
                    return Err(AssignError::Immutable);
                }
                binding.value = value;
                return Ok(());
            }
            current = scope.parent;
        }
        Err(AssignError::Undefined)
    }

    /// Look up a name, walking the parent chain from innermost outward.
    pub fn get(&self, scope: ScopeId, name: Name) -> Option<Value> {
        let mut current = Some(scope);
        while let Some(id) = current {
            let scope = &self.scopes[id.index()];
            if let Some(binding) = scope.bindings.get(&name) {
                return Some(binding.value.clone());
            }
            current = scope.parent;
        }
        None
    }

    /// Number of allocated scopes (root included).
    pub fn scope_count(&self) -> usize {
        self.scopes.len()
    }
}

impl Default for Environment {
    fn default() -> Self {
        Self::new()
    }
}
