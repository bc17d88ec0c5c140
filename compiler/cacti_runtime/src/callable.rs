//! Callables: a parameter list plus an opaque host-supplied body.
//!
//! Bodies take no positional arguments. They read parameters and every other
//! free name through the Scope Chain of the active call environment, via
//! [`Runtime::lookup`] and [`Runtime::assign`].

use std::fmt;
use std::rc::Rc;

use rustc_hash::FxHashSet;

use crate::cell::{Cell, Mutability};
use crate::errors::{arity_mismatch, duplicate_symbol, invalid_symbol};
use crate::runtime::Runtime;
use crate::scope::{Scope, ScopeRef};
use crate::stack::ensure_sufficient_stack;
use crate::symbol::SymbolPolicy;
use crate::{EvalError, EvalResult, Value};

/// Host-supplied executable body.
pub type BodyFn = dyn Fn(&mut Runtime) -> EvalResult;

/// A parameterized body. Cheap to clone; stateless between invocations.
#[derive(Clone)]
pub struct Callable(Rc<CallableData>);

struct CallableData {
    name: Rc<str>,
    params: Vec<Rc<str>>,
    body: Box<BodyFn>,
}

impl Callable {
    /// Create a callable, validating its parameter names.
    pub fn new<I, S>(
        name: &str,
        params: I,
        body: impl Fn(&mut Runtime) -> EvalResult + 'static,
    ) -> Result<Self, EvalError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut seen = FxHashSet::default();
        let mut names = Vec::new();
        for param in params {
            let param = param.as_ref();
            if !SymbolPolicy::Identifier.accepts(param) {
                return Err(invalid_symbol(param, SymbolPolicy::Identifier));
            }
            if !seen.insert(param.to_string()) {
                return Err(duplicate_symbol(param));
            }
            names.push(Rc::from(param));
        }
        Ok(Callable(Rc::new(CallableData {
            name: Rc::from(name),
            params: names,
            body: Box::new(body),
        })))
    }

    /// Create a callable without parameters.
    pub fn nullary(name: &str, body: impl Fn(&mut Runtime) -> EvalResult + 'static) -> Self {
        Callable(Rc::new(CallableData {
            name: Rc::from(name),
            params: Vec::new(),
            body: Box::new(body),
        }))
    }

    pub fn name(&self) -> &str {
        &self.0.name
    }

    pub fn params(&self) -> impl Iterator<Item = &str> {
        self.0.params.iter().map(AsRef::as_ref)
    }

    pub fn arity(&self) -> usize {
        self.0.params.len()
    }

    /// Run the body with `args` bound to the parameters.
    ///
    /// The arity is checked before anything is bound. Parameters live in a
    /// fresh scope of constant cells pushed onto the active frame's chain for
    /// the duration of the body; it is popped on every exit path.
    pub fn invoke(&self, rt: &mut Runtime, args: &[Value]) -> EvalResult {
        if args.len() != self.arity() {
            return Err(arity_mismatch(self.name(), self.arity(), args.len()));
        }
        let params = self.bind_parameters(args)?;
        rt.with_scope(params, |rt| ensure_sufficient_stack(|| (self.0.body)(rt)))
    }

    fn bind_parameters(&self, args: &[Value]) -> Result<ScopeRef, EvalError> {
        let mut scope = Scope::new(SymbolPolicy::Identifier);
        for (param, arg) in self.0.params.iter().zip(args) {
            scope.declare(param, Cell::new(arg.clone(), Mutability::Immutable))?;
        }
        Ok(ScopeRef::new(scope))
    }
}

impl fmt::Debug for Callable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Callable")
            .field("name", &self.0.name)
            .field("params", &self.0.params)
            .finish_non_exhaustive()
    }
}
