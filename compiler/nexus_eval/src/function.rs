//! Function values (closures).

use std::rc::Rc;

use nexus_ir::{Module, Name, StmtRange};

use crate::env::ScopeId;

/// A user-declared function or class method, paired with the scope that
/// was active at its declaration.
///
/// The `Rc<Module>` keeps the defining arena alive: in a REPL session
/// every line parses into its own module, and a closure must outlive the
/// line that defined it. The `closure` scope id is live: calls layer
/// their frame above it, so mutations of captured variables are visible
/// to every closure sharing that scope.
#[derive(Clone, Debug)]
pub struct FunctionValue {
    /// Declared name; `None` for synthesized functions.
    pub name: Option<Name>,
    /// Parameter names, in order.
    pub params: Vec<Name>,
    /// Body statements in the defining module's arena.
    pub body: StmtRange,
    /// The module whose arena `body` indexes into.
    pub module: Rc<Module>,
    /// Scope active at the declaration site.
    pub closure: ScopeId,
    /// True for methods named `init`; their call result is discarded by
    /// instantiation.
    pub is_initializer: bool,
}

impl FunctionValue {
    /// Number of declared parameters.
    #[inline]
    pub fn arity(&self) -> usize {
        self.params.len()
    }

    /// Rebind this function to a different closure scope.
    ///
    /// Used for method binding: the new scope holds `this` and sits
    /// between the method body and its declaring class's scope.
    #[must_use]
    pub fn with_closure(&self, closure: ScopeId) -> FunctionValue {
        FunctionValue {
            name: self.name,
            params: self.params.clone(),
            body: self.body,
            module: Rc::clone(&self.module),
            closure,
            is_initializer: self.is_initializer,
        }
    }
}
