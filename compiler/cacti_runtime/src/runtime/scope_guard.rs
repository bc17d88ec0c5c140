//! RAII guards for call environment management.
//!
//! Frames and per-invocation scopes are always released by `Drop`, so a frame
//! pushed for an invocation is popped exactly once whether the body returns,
//! fails, or panics. Guards hold `&mut Runtime` and implement
//! `Deref`/`DerefMut`, so bodies keep full access to the runtime.
//!
//! ```text
//! rt.with_frame(frame, |rt| {
//!     rt.with_scope(params, |rt| body(rt))
//! }) // scope popped, then frame popped, even on panic
//! ```

use std::ops::{Deref, DerefMut};

use super::Runtime;
use crate::call_env::CallEnvironment;
use crate::scope::ScopeRef;
use crate::EvalError;

/// Guard that pops the frame it pushed.
pub struct ScopedFrame<'rt> {
    runtime: &'rt mut Runtime,
}

impl Drop for ScopedFrame<'_> {
    fn drop(&mut self) {
        self.runtime.call_stack.pop();
    }
}

impl Deref for ScopedFrame<'_> {
    type Target = Runtime;

    fn deref(&self) -> &Self::Target {
        self.runtime
    }
}

impl DerefMut for ScopedFrame<'_> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.runtime
    }
}

/// Guard that pops the innermost scope of the current frame's chain.
pub(crate) struct ScopedChain<'rt> {
    runtime: &'rt mut Runtime,
}

impl Drop for ScopedChain<'_> {
    fn drop(&mut self) {
        if let Some(frame) = self.runtime.call_stack.current_mut() {
            frame.chain_mut().pop_innermost();
            tracing::trace!(frame = frame.name(), "pop scope");
        }
    }
}

impl Deref for ScopedChain<'_> {
    type Target = Runtime;

    fn deref(&self) -> &Self::Target {
        self.runtime
    }
}

impl DerefMut for ScopedChain<'_> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.runtime
    }
}

impl Runtime {
    /// Push `frame` and return a guard that pops it on drop.
    ///
    /// Fails without pushing when the depth limit is reached.
    pub fn enter_frame(&mut self, frame: CallEnvironment) -> Result<ScopedFrame<'_>, EvalError> {
        self.call_stack.push(frame)?;
        Ok(ScopedFrame { runtime: self })
    }

    /// Run `f` inside `frame`.
    ///
    /// A failure leaving the frame gets the live stack attached as its
    /// backtrace (unless a deeper frame already attached one).
    pub fn with_frame<T, F>(&mut self, frame: CallEnvironment, f: F) -> Result<T, EvalError>
    where
        F: FnOnce(&mut Runtime) -> Result<T, EvalError>,
    {
        let mut scoped = self.enter_frame(frame)?;
        let result = f(&mut *scoped);
        result.map_err(|err| scoped.call_stack.attach_backtrace(err))
    }

    /// Run `f` with `scope` shadowing the current frame's chain.
    ///
    /// Without an active frame, a top-level frame is entered first.
    pub fn with_scope<T, F>(&mut self, scope: ScopeRef, f: F) -> Result<T, EvalError>
    where
        F: FnOnce(&mut Runtime) -> Result<T, EvalError>,
    {
        let Some(frame) = self.call_stack.current_mut() else {
            let toplevel = self.toplevel_frame();
            return self.with_frame(toplevel, |rt| rt.with_scope(scope, f));
        };
        frame.chain_mut().push_innermost(scope);
        tracing::trace!(frame = frame.name(), "push scope");
        let mut scoped = ScopedChain { runtime: self };
        f(&mut *scoped)
    }
}
