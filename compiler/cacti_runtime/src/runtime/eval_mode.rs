//! Evaluation modes.
//!
//! The mode fixes the policy a [`Runtime`](super::Runtime) enforces on
//! invocations: how deep the call environment stack may grow and how many
//! invocations a run may perform.

use crate::binding::BindingKind;
use crate::errors::{budget_exceeded, EvalError};

/// Evaluation mode. Enum dispatch, no generics.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum EvalMode {
    /// Standard mode: unbounded depth on native targets, the machine stack
    /// grows on demand.
    #[default]
    Interpret,
    /// Untrusted or compile-time evaluation: shallow and budget-limited.
    Bounded {
        /// Maximum number of binding invocations before aborting.
        budget: u32,
    },
    /// Test execution: generous but bounded depth.
    TestRun,
}

impl EvalMode {
    /// Maximum call depth, or `None` for unlimited.
    ///
    /// - `Interpret`: `None` on native, 200 on WASM
    /// - `Bounded`: 64
    /// - `TestRun`: 500
    #[inline]
    pub fn max_call_depth(&self) -> Option<usize> {
        match self {
            Self::Interpret => {
                #[cfg(target_arch = "wasm32")]
                {
                    Some(200)
                }
                #[cfg(not(target_arch = "wasm32"))]
                {
                    None
                }
            }
            Self::Bounded { .. } => Some(64),
            Self::TestRun => Some(500),
        }
    }

    #[inline]
    pub fn call_budget(&self) -> Option<u32> {
        match self {
            Self::Bounded { budget } => Some(*budget),
            Self::Interpret | Self::TestRun => None,
        }
    }
}

/// Invocation counters, enabled by [`RuntimeBuilder::profile`](super::RuntimeBuilder::profile).
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct EvalCounters {
    pub function_calls: u64,
    pub method_calls: u64,
    pub closure_calls: u64,
}

impl EvalCounters {
    fn count(&mut self, kind: BindingKind) {
        let slot = match kind {
            BindingKind::Function => &mut self.function_calls,
            BindingKind::Method => &mut self.method_calls,
            BindingKind::Closure => &mut self.closure_calls,
        };
        *slot = slot.wrapping_add(1);
    }

    /// Format a summary report.
    pub fn report(&self) -> String {
        format!(
            "Invocation profile:\n  \
             Function calls: {}\n  \
             Method calls:   {}\n  \
             Closure calls:  {}",
            self.function_calls, self.method_calls, self.closure_calls,
        )
    }
}

/// Per-run mutable state derived from the mode.
#[derive(Debug)]
pub(crate) struct ModeState {
    call_count: usize,
    budget: Option<u32>,
    counters: Option<EvalCounters>,
}

impl ModeState {
    pub(crate) fn new(mode: &EvalMode, profile: bool) -> Self {
        ModeState {
            call_count: 0,
            budget: mode.call_budget(),
            counters: profile.then(EvalCounters::default),
        }
    }

    /// Record one invocation, failing once the budget is exhausted.
    pub(crate) fn count_call(&mut self, kind: BindingKind) -> Result<(), EvalError> {
        self.call_count = self.call_count.saturating_add(1);
        if let Some(counters) = &mut self.counters {
            counters.count(kind);
        }
        match self.budget {
            Some(budget) if self.call_count > budget as usize => {
                Err(budget_exceeded(self.call_count, budget))
            }
            _ => Ok(()),
        }
    }

    pub(crate) fn call_count(&self) -> usize {
        self.call_count
    }

    pub(crate) fn counters(&self) -> Option<&EvalCounters> {
        self.counters.as_ref()
    }
}
