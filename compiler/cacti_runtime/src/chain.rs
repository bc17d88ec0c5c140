//! Scope chains: flat, ordered lists of unrelated scopes.
//!
//! A chain composes sibling scopes (parameters, receiver identity, private
//! members, globals) into one resolution context. Position encodes shadowing:
//! the first scope that contains a symbol wins.

use smallvec::SmallVec;

use crate::errors::unknown_symbol;
use crate::runtime::Runtime;
use crate::scope::ScopeRef;
use crate::{EvalError, EvalResult, Value};

/// Ordered scopes, innermost first. Never owns the scopes it references.
#[derive(Clone, Debug, Default)]
pub struct ScopeChain {
    links: SmallVec<[ScopeRef; 6]>,
}

impl ScopeChain {
    pub fn new() -> Self {
        ScopeChain::default()
    }

    /// Build a chain from scopes given innermost first.
    pub fn from_scopes(scopes: impl IntoIterator<Item = ScopeRef>) -> Self {
        ScopeChain {
            links: scopes.into_iter().collect(),
        }
    }

    /// Add a scope that shadows every scope already in the chain.
    pub fn push_innermost(&mut self, scope: ScopeRef) {
        self.links.insert(0, scope);
    }

    /// Remove the most shadowing scope.
    pub fn pop_innermost(&mut self) -> Option<ScopeRef> {
        if self.links.is_empty() {
            return None;
        }
        Some(self.links.remove(0))
    }

    /// Add a scope consulted after every scope already in the chain.
    pub fn push_outermost(&mut self, scope: ScopeRef) {
        self.links.push(scope);
    }

    /// Scopes in search order.
    pub fn scopes(&self) -> impl Iterator<Item = &ScopeRef> {
        self.links.iter()
    }

    pub fn len(&self) -> usize {
        self.links.len()
    }

    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.links.iter().any(|scope| scope.contains(name))
    }

    fn find(&self, name: &str) -> Option<ScopeRef> {
        self.links.iter().find(|scope| scope.contains(name)).cloned()
    }

    /// Read `name` from the first scope that contains it.
    pub fn get(&self, rt: &mut Runtime, name: &str) -> EvalResult {
        match self.find(name) {
            Some(scope) => scope.get(rt, name),
            None => Err(unknown_symbol(name)),
        }
    }

    /// Assign `name` in the first scope that contains it.
    pub fn set(&self, rt: &mut Runtime, name: &str, value: Value) -> Result<(), EvalError> {
        match self.find(name) {
            Some(scope) => scope.set(rt, name, value),
            None => Err(unknown_symbol(name)),
        }
    }
}
