//! Call environments and the per-execution stack that holds them.
//!
//! Each invocation pushes one [`CallEnvironment`] carrying the Scope Chain
//! visible to its body. The stack is owned by a [`Runtime`](crate::Runtime)
//! instance, never by the process, so independent executions cannot observe
//! each other's frames.

use std::rc::Rc;

use crate::errors::{recursion_limit_exceeded, BacktraceFrame, EvalBacktrace, EvalError};
use crate::{ScopeChain, Value};

/// One stack frame.
#[derive(Clone, Debug)]
pub struct CallEnvironment {
    owner: Value,
    name: Rc<str>,
    chain: ScopeChain,
}

impl CallEnvironment {
    pub fn new(owner: Value, name: &str, chain: ScopeChain) -> Self {
        CallEnvironment {
            owner,
            name: Rc::from(name),
            chain,
        }
    }

    /// The function itself, the receiving entity, or `Void` at top level.
    pub fn owner(&self) -> &Value {
        &self.owner
    }

    /// Invocation name, for diagnostics.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn chain(&self) -> &ScopeChain {
        &self.chain
    }

    pub fn chain_mut(&mut self) -> &mut ScopeChain {
        &mut self.chain
    }
}

/// Strictly LIFO stack of active call environments.
///
/// Prefer the guarded entry points on [`Runtime`](crate::Runtime)
/// (`with_frame`, `with_scope`); raw `push`/`pop` exist for hosts that manage
/// frames themselves and must pair them on every exit path.
#[derive(Debug, Default)]
pub struct CallEnvStack {
    frames: Vec<CallEnvironment>,
    max_depth: Option<usize>,
}

impl CallEnvStack {
    /// `max_depth` is `None` for unlimited depth.
    pub fn new(max_depth: Option<usize>) -> Self {
        CallEnvStack {
            frames: Vec::new(),
            max_depth,
        }
    }

    /// Push a frame, checking the depth limit.
    ///
    /// The frame is not pushed on overflow.
    pub fn push(&mut self, frame: CallEnvironment) -> Result<(), EvalError> {
        if let Some(max) = self.max_depth {
            if self.frames.len() >= max {
                return Err(recursion_limit_exceeded(max));
            }
        }
        tracing::trace!(name = frame.name(), depth = self.frames.len() + 1, "push frame");
        self.frames.push(frame);
        Ok(())
    }

    pub fn pop(&mut self) -> Option<CallEnvironment> {
        let frame = self.frames.pop();
        if let Some(frame) = &frame {
            tracing::trace!(name = frame.name(), depth = self.frames.len(), "pop frame");
        }
        frame
    }

    #[inline]
    pub fn current(&self) -> Option<&CallEnvironment> {
        self.frames.last()
    }

    #[inline]
    pub fn current_mut(&mut self) -> Option<&mut CallEnvironment> {
        self.frames.last_mut()
    }

    #[inline]
    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn max_depth(&self) -> Option<usize> {
        self.max_depth
    }

    /// Frames from the outermost to the current one.
    pub fn frames(&self) -> &[CallEnvironment] {
        &self.frames
    }

    /// Snapshot the live stack, most recent frame first.
    pub fn capture(&self) -> EvalBacktrace {
        let frames = self
            .frames
            .iter()
            .rev()
            .map(|frame| BacktraceFrame {
                name: frame.name().to_string(),
                owner: frame.owner().to_string(),
            })
            .collect();
        EvalBacktrace::new(frames)
    }

    /// Attach a backtrace unless the error already carries one from a deeper frame.
    pub fn attach_backtrace(&self, err: EvalError) -> EvalError {
        if err.backtrace.is_some() || self.frames.is_empty() {
            return err;
        }
        err.with_backtrace(self.capture())
    }
}
