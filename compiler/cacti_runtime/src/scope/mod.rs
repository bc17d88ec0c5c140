//! Scopes: symbol tables with optional read-through parent delegation.
//!
//! A scope exclusively owns its cells and holds a shared, read-only reference
//! to its parent. Lookup and assignment delegate to the parent when a symbol
//! is absent locally; declaration never does. Entity member and hook tables
//! are plain scopes whose parent is the super-entity's table, so member
//! inheritance is nothing more than this delegation.

use rustc_hash::FxHashMap;
use std::cell::RefCell;
use std::fmt;
use std::ops::Deref;
use std::rc::Rc;

use crate::cell::{Cell, CellKind, CellRead, CellWrite};
use crate::errors::{constant_assignment, duplicate_symbol, invalid_symbol, sealed_scope, unknown_symbol};
use crate::runtime::Runtime;
use crate::symbol::SymbolPolicy;
use crate::{EvalError, EvalResult, Value};

/// A single-threaded shared handle with interior mutability.
///
/// Scopes are shared by every holder (entities, bindings, call frames); a
/// mutation through one handle is visible through all of them.
#[repr(transparent)]
pub struct LocalScope<T>(Rc<RefCell<T>>);

impl<T> LocalScope<T> {
    #[inline]
    pub fn new(value: T) -> Self {
        LocalScope(Rc::new(RefCell::new(value)))
    }

    /// Whether both handles point at the same scope.
    #[inline]
    pub fn ptr_eq(&self, other: &Self) -> bool {
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

/// Shared handle to a [`Scope`].
pub type ScopeRef = LocalScope<Scope>;

/// An ordered table of cells.
#[derive(Debug)]
pub struct Scope {
    cells: FxHashMap<Rc<str>, Cell>,
    /// Declaration order of `cells`.
    order: Vec<Rc<str>>,
    parent: Option<ScopeRef>,
    policy: SymbolPolicy,
    sealed: bool,
}

impl Scope {
    /// Create an empty scope with no parent.
    pub fn new(policy: SymbolPolicy) -> Self {
        Scope {
            cells: FxHashMap::default(),
            order: Vec::new(),
            parent: None,
            policy,
            sealed: false,
        }
    }

    /// Create an empty scope that delegates unresolved symbols to `parent`.
    pub fn with_parent(parent: ScopeRef, policy: SymbolPolicy) -> Self {
        Scope {
            parent: Some(parent),
            ..Scope::new(policy)
        }
    }

    /// Insert a new cell. Never delegates.
    pub fn declare(&mut self, name: &str, cell: Cell) -> Result<(), EvalError> {
        if !self.policy.accepts(name) {
            return Err(invalid_symbol(name, self.policy));
        }
        if self.sealed {
            return Err(sealed_scope(name));
        }
        if self.cells.contains_key(name) {
            return Err(duplicate_symbol(name));
        }
        let name: Rc<str> = Rc::from(name);
        self.order.push(Rc::clone(&name));
        self.cells.insert(name, cell);
        Ok(())
    }

    /// Whether `name` resolves here or anywhere up the parent path.
    pub fn contains(&self, name: &str) -> bool {
        if self.cells.contains_key(name) {
            return true;
        }
        match &self.parent {
            Some(parent) => parent.borrow().contains(name),
            None => false,
        }
    }

    /// Whether `name` is declared in this scope itself.
    #[inline]
    pub fn contains_local(&self, name: &str) -> bool {
        self.cells.contains_key(name)
    }

    /// Access policy of the cell `name` resolves to.
    pub fn cell_kind(&self, name: &str) -> Option<CellKind> {
        if let Some(cell) = self.cells.get(name) {
            return Some(cell.kind());
        }
        self.parent.as_ref()?.borrow().cell_kind(name)
    }

    /// Local symbols in declaration order.
    pub fn symbols(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(AsRef::as_ref)
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn parent(&self) -> Option<&ScopeRef> {
        self.parent.as_ref()
    }

    pub fn policy(&self) -> SymbolPolicy {
        self.policy
    }

    /// Reject all further declarations.
    pub fn seal(&mut self) {
        self.sealed = true;
    }

    pub fn is_sealed(&self) -> bool {
        self.sealed
    }

    fn resolve(&self, name: &str) -> Option<CellRead> {
        if let Some(cell) = self.cells.get(name) {
            return Some(cell.read());
        }
        self.parent.as_ref()?.borrow().resolve(name)
    }

    fn resolve_write(&mut self, name: &str, value: Value) -> Option<CellWrite> {
        if let Some(cell) = self.cells.get_mut(name) {
            return Some(cell.write(value));
        }
        self.parent.as_ref()?.borrow_mut().resolve_write(name, value)
    }
}

impl LocalScope<Scope> {
    /// Create a shared root scope.
    pub fn root(policy: SymbolPolicy) -> Self {
        LocalScope::new(Scope::new(policy))
    }

    /// Create a shared scope delegating to `self`.
    #[must_use]
    pub fn child(&self, policy: SymbolPolicy) -> Self {
        LocalScope::new(Scope::with_parent(self.clone(), policy))
    }

    #[inline]
    pub fn declare(&self, name: &str, cell: Cell) -> Result<(), EvalError> {
        self.borrow_mut().declare(name, cell)
    }

    #[inline]
    pub fn contains(&self, name: &str) -> bool {
        self.borrow().contains(name)
    }

    /// Read the current value of `name`, running its getter if computed.
    ///
    /// The scope is not borrowed while a getter runs, so getters may freely
    /// read and write the table they live in.
    pub fn get(&self, rt: &mut Runtime, name: &str) -> EvalResult {
        let read = self.borrow().resolve(name);
        match read {
            Some(CellRead::Value(value)) => Ok(value),
            Some(CellRead::Getter(getter)) => getter.call(rt, &[]),
            None => Err(unknown_symbol(name)),
        }
    }

    /// Assign `value` to `name`, running its setter if computed.
    pub fn set(&self, rt: &mut Runtime, name: &str, value: Value) -> Result<(), EvalError> {
        let write = self.borrow_mut().resolve_write(name, value);
        match write {
            Some(CellWrite::Stored) => Ok(()),
            Some(CellWrite::Rejected) => Err(constant_assignment(name)),
            Some(CellWrite::Setter(setter, value)) => setter.call(rt, &[value]).map(|_| ()),
            None => Err(unknown_symbol(name)),
        }
    }
}
