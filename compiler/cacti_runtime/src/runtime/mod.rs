//! The execution context threaded through every body.
//!
//! A `Runtime` owns one [`CallEnvStack`] plus a handle to the shared
//! [`Builtins`]. Bodies resolve their free names with [`Runtime::lookup`] and
//! [`Runtime::assign`], which go through the Scope Chain of the active frame.
//! There is no process-global stack: independent executions each build their
//! own `Runtime`.

mod builder;
mod eval_mode;
mod scope_guard;

pub use builder::RuntimeBuilder;
pub use eval_mode::{EvalCounters, EvalMode};
pub use scope_guard::ScopedFrame;

use std::mem;

use crate::binding::BindingKind;
use crate::builtins::Builtins;
use crate::call_env::{CallEnvStack, CallEnvironment};
use crate::errors::not_callable;
use crate::scope::ScopeRef;
use crate::symbol::CALL_HOOK;
use crate::{EvalError, EvalResult, ScopeChain, Value};
use eval_mode::ModeState;

/// Name of the frame used when a body runs outside any invocation.
const TOPLEVEL: &str = "<toplevel>";

/// One program execution.
pub struct Runtime {
    pub(crate) call_stack: CallEnvStack,
    builtins: Builtins,
    mode: EvalMode,
    mode_state: ModeState,
}

impl Runtime {
    /// Runtime in `Interpret` mode over `builtins`.
    pub fn new(builtins: Builtins) -> Self {
        RuntimeBuilder::new(builtins).build()
    }

    pub fn builder(builtins: Builtins) -> RuntimeBuilder {
        RuntimeBuilder::new(builtins)
    }

    pub fn builtins(&self) -> &Builtins {
        &self.builtins
    }

    /// The outermost link of every chain.
    pub fn globals(&self) -> &ScopeRef {
        self.builtins.scope()
    }

    pub fn mode(&self) -> &EvalMode {
        &self.mode
    }

    /// Invocation counters, when profiling is enabled.
    pub fn counters(&self) -> Option<&EvalCounters> {
        self.mode_state.counters()
    }

    /// Binding invocations performed so far.
    pub fn call_count(&self) -> usize {
        self.mode_state.call_count()
    }

    pub fn call_stack(&self) -> &CallEnvStack {
        &self.call_stack
    }

    /// Raw stack access for hosts managing frames themselves.
    pub fn call_stack_mut(&mut self) -> &mut CallEnvStack {
        &mut self.call_stack
    }

    /// Frame for code running outside any invocation: globals only.
    pub fn toplevel_frame(&self) -> CallEnvironment {
        CallEnvironment::new(
            Value::Void,
            TOPLEVEL,
            ScopeChain::from_scopes([self.globals().clone()]),
        )
    }

    /// Chain of the active frame, or the globals alone.
    pub fn current_chain(&self) -> ScopeChain {
        match self.call_stack.current() {
            Some(frame) => frame.chain().clone(),
            None => ScopeChain::from_scopes([self.globals().clone()]),
        }
    }

    /// Resolve a free name for the running body.
    pub fn lookup(&mut self, name: &str) -> EvalResult {
        let chain = self.current_chain();
        chain.get(self, name)
    }

    /// Assign a free name for the running body.
    pub fn assign(&mut self, name: &str, value: Value) -> Result<(), EvalError> {
        let chain = self.current_chain();
        chain.set(self, name, value)
    }

    /// Call a value: bindings directly, entities through their `()` hook.
    pub fn call(&mut self, callee: &Value, args: &[Value]) -> EvalResult {
        match callee {
            Value::Binding(binding) => binding.call(self, args),
            Value::Entity(entity) if entity.supports_hook(CALL_HOOK) => {
                entity.invoke_hook(self, CALL_HOOK, args)
            }
            Value::Entity(entity) => Err(not_callable(entity.type_name())),
            other => Err(not_callable(other.type_name())),
        }
    }

    /// Detach the whole call environment stack, leaving an empty one.
    ///
    /// Hosts implementing suspension (generators, coroutines) capture the
    /// stack with this and hand it back through [`Runtime::resume`].
    pub fn suspend(&mut self) -> CallEnvStack {
        let empty = CallEnvStack::new(self.call_stack.max_depth());
        mem::replace(&mut self.call_stack, empty)
    }

    /// Reinstall a suspended stack, returning the one it replaces.
    pub fn resume(&mut self, stack: CallEnvStack) -> CallEnvStack {
        mem::replace(&mut self.call_stack, stack)
    }

    pub(crate) fn count_invocation(&mut self, kind: BindingKind) -> Result<(), EvalError> {
        self.mode_state.count_call(kind)
    }
}
