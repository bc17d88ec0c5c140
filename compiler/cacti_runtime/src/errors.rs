//! Error types for scope resolution, entity dispatch and invocation.
//!
//! # Structured Error Categories
//!
//! `EvalErrorKind` carries typed data for each failure so hosts can match on
//! the kind instead of parsing messages. Factory functions (e.g.
//! [`unknown_symbol`]) are the canonical construction path.
//!
//! None of these errors is ever recovered from inside this crate: they surface
//! to the host evaluator, which decides whether a failure becomes a language
//! exception, a diagnostic, or a fatal abort.

use std::fmt;

use crate::symbol::SymbolPolicy;
use crate::value::Value;

/// Result of evaluation.
pub type EvalResult = Result<Value, EvalError>;

/// Typed error category.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum EvalErrorKind {
    // Symbols
    #[error("invalid {policy} symbol '{symbol}'")]
    InvalidSymbol {
        symbol: String,
        policy: SymbolPolicy,
    },
    #[error("symbol '{symbol}' is already declared in this scope")]
    DuplicateSymbol { symbol: String },
    #[error("unknown symbol '{symbol}'")]
    UnknownSymbol { symbol: String },
    #[error("cannot assign to constant '{symbol}'")]
    ConstantAssignment { symbol: String },
    #[error("cannot declare '{symbol}': scope is sealed")]
    SealedScope { symbol: String },

    // Invocation
    #[error("{name} expects {expected} {}, got {got}", plural_args(.expected))]
    ArityMismatch {
        name: String,
        expected: usize,
        got: usize,
    },
    #[error("{type_name} is not callable")]
    NotCallable { type_name: String },
    #[error("maximum call depth exceeded (limit: {depth})")]
    StackOverflow { depth: usize },
    #[error("call budget exceeded ({calls} calls, budget {budget})")]
    BudgetExceeded { calls: usize, budget: u32 },

    // Entities
    #[error("'{entity}' does not support hook '{hook}'")]
    UnsupportedHook { hook: String, entity: String },
    #[error("no member '{member}' on '{entity}'")]
    UnknownMember { member: String, entity: String },
    #[error("'{entity}' already has a derived entity")]
    AlreadyDerived { entity: String },
    #[error("receiver of '{method}' no longer exists")]
    DetachedReceiver { method: String },

    /// Failure raised by a host-supplied body.
    #[error("{message}")]
    Custom { message: String },
}

fn plural_args(count: &usize) -> &'static str {
    if *count == 1 {
        "argument"
    } else {
        "arguments"
    }
}

/// A single frame in an evaluation backtrace.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BacktraceFrame {
    /// Invocation name of the frame.
    pub name: String,
    /// Display form of the frame owner.
    pub owner: String,
}

/// Immutable snapshot of the call environment stack at an error site.
///
/// Frames are stored most recent first.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct EvalBacktrace {
    frames: Vec<BacktraceFrame>,
}

impl EvalBacktrace {
    pub fn new(frames: Vec<BacktraceFrame>) -> Self {
        Self { frames }
    }

    pub fn frames(&self) -> &[BacktraceFrame] {
        &self.frames
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }
}

impl fmt::Display for EvalBacktrace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.frames.is_empty() {
            return Ok(());
        }
        writeln!(f, "call backtrace:")?;
        for (i, frame) in self.frames.iter().enumerate() {
            writeln!(f, "  {i}: {} (owner {})", frame.name, frame.owner)?;
        }
        Ok(())
    }
}

/// Evaluation error.
#[derive(Clone, Debug, thiserror::Error)]
#[error("{kind}")]
pub struct EvalError {
    /// Structured error category.
    pub kind: EvalErrorKind,
    /// Call environment stack at the innermost failing frame.
    pub backtrace: Option<EvalBacktrace>,
    /// Additional context notes.
    pub notes: Vec<String>,
}

impl EvalError {
    /// Create a host error with just a message.
    pub fn new(message: impl Into<String>) -> Self {
        Self::from_kind(EvalErrorKind::Custom {
            message: message.into(),
        })
    }

    fn from_kind(kind: EvalErrorKind) -> Self {
        Self {
            kind,
            backtrace: None,
            notes: Vec::new(),
        }
    }

    /// Attach a backtrace to this error.
    #[must_use]
    pub fn with_backtrace(mut self, backtrace: EvalBacktrace) -> Self {
        self.backtrace = Some(backtrace);
        self
    }

    /// Add a context note to this error.
    #[must_use]
    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.notes.push(note.into());
        self
    }
}

impl From<EvalErrorKind> for EvalError {
    fn from(kind: EvalErrorKind) -> Self {
        Self::from_kind(kind)
    }
}

// Symbol Errors

/// Name rejected by a scope's validator.
#[cold]
pub fn invalid_symbol(symbol: &str, policy: SymbolPolicy) -> EvalError {
    EvalError::from_kind(EvalErrorKind::InvalidSymbol {
        symbol: symbol.to_string(),
        policy,
    })
}

/// Name already declared in the same scope.
#[cold]
pub fn duplicate_symbol(symbol: &str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::DuplicateSymbol {
        symbol: symbol.to_string(),
    })
}

/// Name absent from the whole delegation path or chain.
#[cold]
pub fn unknown_symbol(symbol: &str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::UnknownSymbol {
        symbol: symbol.to_string(),
    })
}

/// Assignment to a constant or getter-only cell.
#[cold]
pub fn constant_assignment(symbol: &str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::ConstantAssignment {
        symbol: symbol.to_string(),
    })
}

/// Declaration into a sealed scope.
#[cold]
pub fn sealed_scope(symbol: &str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::SealedScope {
        symbol: symbol.to_string(),
    })
}

// Invocation Errors

/// Wrong number of arguments.
#[cold]
pub fn arity_mismatch(name: &str, expected: usize, got: usize) -> EvalError {
    EvalError::from_kind(EvalErrorKind::ArityMismatch {
        name: name.to_string(),
        expected,
        got,
    })
}

/// Value is not callable.
#[cold]
pub fn not_callable(type_name: &str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::NotCallable {
        type_name: type_name.to_string(),
    })
}

/// Maximum call depth exceeded.
#[cold]
pub fn recursion_limit_exceeded(limit: usize) -> EvalError {
    EvalError::from_kind(EvalErrorKind::StackOverflow { depth: limit })
}

/// Invocation budget exhausted.
#[cold]
pub fn budget_exceeded(calls: usize, budget: u32) -> EvalError {
    EvalError::from_kind(EvalErrorKind::BudgetExceeded { calls, budget })
}

// Entity Errors

/// Hook absent from the whole delegation chain.
#[cold]
pub fn unsupported_hook(hook: &str, entity: &str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::UnsupportedHook {
        hook: hook.to_string(),
        entity: entity.to_string(),
    })
}

/// Member absent from the whole delegation chain.
#[cold]
pub fn unknown_member(member: &str, entity: &str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::UnknownMember {
        member: member.to_string(),
        entity: entity.to_string(),
    })
}

/// Second redirection of an already derived entity.
#[cold]
pub fn already_derived(entity: &str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::AlreadyDerived {
        entity: entity.to_string(),
    })
}

/// Method binding whose owning entity was dropped.
#[cold]
pub fn detached_receiver(method: &str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::DetachedReceiver {
        method: method.to_string(),
    })
}
