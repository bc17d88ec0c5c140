//! `RuntimeBuilder` for creating `Runtime` instances with various configurations.

use super::eval_mode::{EvalMode, ModeState};
use super::Runtime;
use crate::builtins::Builtins;
use crate::call_env::CallEnvStack;

/// Builder for [`Runtime`].
///
/// The mode decides the default depth limit and call budget:
/// - `EvalMode::Interpret` for ordinary program runs
/// - `EvalMode::Bounded { .. }` for untrusted or compile-time evaluation
/// - `EvalMode::TestRun` for test harnesses
pub struct RuntimeBuilder {
    builtins: Builtins,
    mode: EvalMode,
    max_call_depth: Option<Option<usize>>,
    profile: bool,
}

impl RuntimeBuilder {
    pub fn new(builtins: Builtins) -> Self {
        RuntimeBuilder {
            builtins,
            mode: EvalMode::default(),
            max_call_depth: None,
            profile: false,
        }
    }

    #[must_use]
    pub fn mode(mut self, mode: EvalMode) -> Self {
        self.mode = mode;
        self
    }

    /// Override the mode's depth limit (`None` = unlimited).
    #[must_use]
    pub fn max_call_depth(mut self, depth: Option<usize>) -> Self {
        self.max_call_depth = Some(depth);
        self
    }

    /// Count invocations by binding kind.
    #[must_use]
    pub fn profile(mut self, enabled: bool) -> Self {
        self.profile = enabled;
        self
    }

    pub fn build(self) -> Runtime {
        let max_depth = self
            .max_call_depth
            .unwrap_or_else(|| self.mode.max_call_depth());
        Runtime {
            call_stack: CallEnvStack::new(max_depth),
            builtins: self.builtins,
            mode_state: ModeState::new(&self.mode, self.profile),
            mode: self.mode,
        }
    }
}
