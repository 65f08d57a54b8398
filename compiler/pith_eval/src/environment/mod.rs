//! Lexical scopes and closure chains.
//!
//! A `Closure` is the chain of scopes visible to a piece of code, outermost
//! first. Entering a function or class body copies the *defining* chain
//! (the `Rc`s, not the scopes) and appends one fresh scope, so captured
//! scopes stay shared with the code that created them.
//!
//! Index 0 of a root chain is the builtin scope and index 1 the module
//! globals.

use rustc_hash::FxHashMap;
use std::cell::RefCell;
use std::fmt;
use std::ops::Deref;
use std::rc::Rc;

use pith_ir::Name;

use crate::builtins;
use crate::errors::{undefined_variable, EvalResult};
use crate::value::Members;
use crate::Value;

/// What created a scope.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum ScopeKind {
    /// A function body, the module globals, or the builtins.
    Function,
    /// A class body. Invisible to bare-name lookup from nested code.
    Class,
    /// An `except ... as name` handler. Assignments to other names fall
    /// through to the enclosing function scope.
    Block,
}

/// A single-threaded, shared, interiorly mutable scope.
///
/// This type wraps `Rc<RefCell<T>>` so that every scope allocation goes
/// through `LocalScope::new()`, and makes it clear that scopes are never
/// shared across threads.
#[repr(transparent)]
pub struct LocalScope<T>(Rc<RefCell<T>>);

impl<T> LocalScope<T> {
    #[inline]
    pub fn new(value: T) -> Self {
        LocalScope(Rc::new(RefCell::new(value)))
    }

    /// Whether both handles refer to the same scope.
    #[inline]
    pub fn ptr_eq(&self, other: &LocalScope<T>) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl<T> Clone for LocalScope<T> {
    #[inline]
    fn clone(&self) -> Self {
        LocalScope(Rc::clone(&self.0))
    }
}

impl<T: fmt::Debug> fmt::Debug for LocalScope<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("LocalScope").field(&self.0).finish()
    }
}

impl<T> Deref for LocalScope<T> {
    type Target = RefCell<T>;

    #[inline]
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

/// One flat layer of name bindings.
pub struct Scope {
    kind: ScopeKind,
    bindings: FxHashMap<Name, Value>,
}

impl Scope {
    pub fn new(kind: ScopeKind) -> Self {
        Scope {
            kind,
            bindings: FxHashMap::default(),
        }
    }

    #[inline]
    pub fn kind(&self) -> ScopeKind {
        self.kind
    }

    #[inline]
    pub fn get(&self, name: &str) -> Option<Value> {
        self.bindings.get(name).cloned()
    }

    #[inline]
    pub fn contains(&self, name: &str) -> bool {
        self.bindings.contains_key(name)
    }

    #[inline]
    pub fn define(&mut self, name: Name, value: Value) {
        self.bindings.insert(name, value);
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    /// Take all bindings out (used to turn a class body into members).
    pub fn take_bindings(&mut self) -> Members {
        std::mem::take(&mut self.bindings)
    }
}

impl fmt::Debug for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<&str> = self.bindings.keys().map(|n| &**n).collect();
        names.sort_unstable();
        f.debug_struct("Scope")
            .field("kind", &self.kind)
            .field("names", &names)
            .finish()
    }
}

/// A non-empty chain of scopes, outermost first.
#[derive(Clone)]
pub struct Closure {
    first: LocalScope<Scope>,
    rest: Vec<LocalScope<Scope>>,
}

impl Closure {
    /// A chain holding a single scope.
    pub fn new(scope: Scope) -> Self {
        Closure {
            first: LocalScope::new(scope),
            rest: Vec::new(),
        }
    }

    /// The seed chain for a compilation unit: `[builtins, globals]`.
    ///
    /// The builtin scope is created once per thread and shared by every root
    /// chain; the globals scope is fresh.
    pub fn new_root() -> Self {
        Closure {
            first: builtins::builtin_scope(),
            rest: vec![LocalScope::new(Scope::new(ScopeKind::Function))],
        }
    }

    /// Copy of this chain with one fresh scope appended.
    #[must_use]
    pub fn extend(&self, kind: ScopeKind) -> Closure {
        let mut rest = Vec::with_capacity(self.rest.len() + 1);
        rest.extend(self.rest.iter().cloned());
        rest.push(LocalScope::new(Scope::new(kind)));
        Closure {
            first: self.first.clone(),
            rest,
        }
    }

    /// Innermost scope.
    #[inline]
    pub fn top(&self) -> &LocalScope<Scope> {
        self.rest.last().unwrap_or(&self.first)
    }

    /// Number of scopes in the chain.
    #[inline]
    pub fn len(&self) -> usize {
        self.rest.len() + 1
    }

    /// Always false; kept for API symmetry with `len`.
    #[inline]
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Scopes from innermost to outermost.
    pub fn scopes_inner_first(&self) -> impl Iterator<Item = &LocalScope<Scope>> {
        self.rest.iter().rev().chain(std::iter::once(&self.first))
    }

    /// Resolve a bare name.
    ///
    /// Class scopes are skipped unless they are the innermost scope (the
    /// class body currently executing).
    pub fn lookup(&self, name: &str) -> Option<Value> {
        let top = self.top();
        self.scopes_inner_first().find_map(|scope| {
            let scope_ref = scope.borrow();
            if scope_ref.kind() == ScopeKind::Class && !scope.ptr_eq(top) {
                return None;
            }
            scope_ref.get(name)
        })
    }

    /// Resolve a bare name, raising `NameError` if it is unbound.
    pub fn get_variable(&self, name: &str) -> EvalResult {
        self.lookup(name).ok_or_else(|| undefined_variable(name))
    }

    /// Assign a bare name.
    ///
    /// An existing binding in the innermost scope, or in an enclosing block
    /// scope, is overwritten. Otherwise the name is bound in the nearest
    /// function or class scope. Outer function scopes are never written.
    pub fn set_variable(&self, name: Name, value: Value) {
        for scope in self.scopes_inner_first() {
            let mut scope_ref = scope.borrow_mut();
            if scope_ref.contains(&name) || scope_ref.kind() != ScopeKind::Block {
                scope_ref.define(name, value);
                return;
            }
        }
        self.define(name, value);
    }

    /// Bind a name in the innermost scope.
    pub fn define(&self, name: Name, value: Value) {
        self.top().borrow_mut().define(name, value);
    }
}

impl fmt::Debug for Closure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Closure").field("depth", &self.len()).finish()
    }
}

#[cfg(test)]
mod tests;
