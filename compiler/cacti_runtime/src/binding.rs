//! Bindings: a callable paired with the strategy that decides what "the
//! receiver" and "the enclosing scope" mean when its body runs.
//!
//! - **Function**: fresh frame owned by the function; chain is the optional
//!   enclosing scope followed by the globals.
//! - **Method**: fresh frame owned by the most-derived receiver; chain is the
//!   declaring entity's private view followed by the globals, with a `self` /
//!   `super` scope shadowing both.
//! - **Closure**: re-activates the call environment that was live when the
//!   closure was created, whoever invokes it later.

use std::fmt;
use std::rc::Rc;

use crate::call_env::CallEnvironment;
use crate::entity::{Entity, WeakEntity};
use crate::errors::detached_receiver;
use crate::runtime::Runtime;
use crate::scope::ScopeRef;
use crate::{Callable, EvalResult, ScopeChain, Value};

/// Which strategy a binding uses.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BindingKind {
    Function,
    Method,
    Closure,
}

impl fmt::Display for BindingKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BindingKind::Function => f.write_str("function"),
            BindingKind::Method => f.write_str("method"),
            BindingKind::Closure => f.write_str("closure"),
        }
    }
}

/// An immutable callable-plus-strategy pair. Equality is identity.
#[derive(Clone)]
pub struct Binding(Rc<BindingData>);

struct BindingData {
    callable: Callable,
    strategy: Strategy,
}

enum Strategy {
    Function { enclosing: Option<ScopeRef> },
    Method { owner: Owner },
    Closure { captured: CallEnvironment },
}

/// Method owner. Tables store `Declared` so an entity does not keep itself
/// alive through its own methods; values handed out to callers are `Attached`.
enum Owner {
    Attached(Entity),
    Declared(WeakEntity),
}

impl Owner {
    fn upgrade(&self) -> Option<Entity> {
        match self {
            Owner::Attached(entity) => Some(entity.clone()),
            Owner::Declared(weak) => weak.upgrade(),
        }
    }
}

impl Binding {
    fn from_parts(callable: Callable, strategy: Strategy) -> Self {
        Binding(Rc::new(BindingData { callable, strategy }))
    }

    /// Plain function resolving free names in `enclosing`, then the globals.
    pub fn function(callable: Callable, enclosing: Option<ScopeRef>) -> Self {
        Binding::from_parts(callable, Strategy::Function { enclosing })
    }

    /// Method declared on `owner`.
    pub fn method(callable: Callable, owner: &Entity) -> Self {
        Binding::from_parts(
            callable,
            Strategy::Method {
                owner: Owner::Attached(owner.clone()),
            },
        )
    }

    /// Method stored in `owner`'s own tables.
    pub(crate) fn declared_method(callable: Callable, owner: &Entity) -> Self {
        Binding::from_parts(
            callable,
            Strategy::Method {
                owner: Owner::Declared(owner.downgrade()),
            },
        )
    }

    /// Closure over the call environment active right now.
    pub fn closure(rt: &Runtime, callable: Callable) -> Self {
        let captured = rt
            .call_stack()
            .current()
            .cloned()
            .unwrap_or_else(|| rt.toplevel_frame());
        Binding::from_parts(callable, Strategy::Closure { captured })
    }

    pub fn kind(&self) -> BindingKind {
        match self.0.strategy {
            Strategy::Function { .. } => BindingKind::Function,
            Strategy::Method { .. } => BindingKind::Method,
            Strategy::Closure { .. } => BindingKind::Closure,
        }
    }

    pub fn callable(&self) -> &Callable {
        &self.0.callable
    }

    pub fn name(&self) -> &str {
        self.0.callable.name()
    }

    pub fn arity(&self) -> usize {
        self.0.callable.arity()
    }

    /// The entity a method is declared on, if it still exists.
    pub fn owner(&self) -> Option<Entity> {
        match &self.0.strategy {
            Strategy::Method { owner } => owner.upgrade(),
            Strategy::Function { .. } | Strategy::Closure { .. } => None,
        }
    }

    /// The environment a closure captured.
    pub fn captured(&self) -> Option<&CallEnvironment> {
        match &self.0.strategy {
            Strategy::Closure { captured } => Some(captured),
            Strategy::Function { .. } | Strategy::Method { .. } => None,
        }
    }

    #[inline]
    pub fn ptr_eq(&self, other: &Binding) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    /// Same binding with a strong owner, for handing out of a table.
    pub(crate) fn attached(&self) -> Binding {
        match &self.0.strategy {
            Strategy::Method {
                owner: Owner::Declared(weak),
            } => match weak.upgrade() {
                Some(owner) => Binding::method(self.0.callable.clone(), &owner),
                None => self.clone(),
            },
            _ => self.clone(),
        }
    }

    /// Invoke the binding. The frame it pushes is popped on every exit path.
    #[tracing::instrument(level = "debug", skip_all, fields(kind = %self.kind(), name = self.name()))]
    pub fn call(&self, rt: &mut Runtime, args: &[Value]) -> EvalResult {
        rt.count_invocation(self.kind())?;
        let callable = &self.0.callable;
        match &self.0.strategy {
            Strategy::Function { enclosing } => {
                let mut chain = ScopeChain::new();
                if let Some(scope) = enclosing {
                    chain.push_outermost(scope.clone());
                }
                chain.push_outermost(rt.globals().clone());
                let frame =
                    CallEnvironment::new(Value::Binding(self.clone()), callable.name(), chain);
                rt.with_frame(frame, |rt| callable.invoke(rt, args))
            }
            Strategy::Method { owner } => {
                let owner = owner
                    .upgrade()
                    .ok_or_else(|| detached_receiver(callable.name()))?;
                let mut chain = owner.private_view();
                chain.push_outermost(rt.globals().clone());
                let frame =
                    CallEnvironment::new(Value::Entity(owner.receiver()), callable.name(), chain);
                let identity = owner.self_scope()?;
                rt.with_frame(frame, |rt| {
                    rt.with_scope(identity, |rt| callable.invoke(rt, args))
                })
            }
            Strategy::Closure { captured } => {
                rt.with_frame(captured.clone(), |rt| {
                    callable.invoke(rt, args)
                })
            }
        }
    }
}

impl fmt::Debug for Binding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Binding")
            .field("kind", &self.kind())
            .field("name", &self.name())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, reason = "tests use unwrap for brevity")]
mod tests;
