//! Cacti Runtime - object model, scoping and call binding for the Cacti language.
//!
//! This crate is the part of the interpreter that decides what a name means
//! and what `self` is. The lexer, parser and tree-walking evaluator live
//! outside it and drive it through the API re-exported here.
//!
//! # Architecture
//!
//! - `Cell`: one storage slot (mutable, constant, or computed)
//! - `Scope`: cells plus an optional parent scope for read-through delegation
//! - `ScopeChain`: unrelated scopes searched in order
//! - `Entity`: object with delegated member/hook tables and a local field table
//! - `Callable` / `Binding`: a body plus function, method or closure binding
//! - `CallEnvStack`: the active invocations of one `Runtime`
//! - `Builtins`: the sealed global registry every chain ends with
//!
//! # Host contract
//!
//! A body is a closure `Fn(&mut Runtime) -> EvalResult`. It reads parameters
//! and free variables with [`Runtime::lookup`] and writes them with
//! [`Runtime::assign`]; arguments are never passed to it directly.

mod binding;
mod builtins;
mod call_env;
mod callable;
mod cell;
mod chain;
mod entity;
pub mod errors;
mod runtime;
mod scope;
mod stack;
mod symbol;
mod value;

pub use binding::{Binding, BindingKind};
pub use builtins::{Builtins, BuiltinsBuilder, BUILTIN_TYPES};
pub use call_env::{CallEnvStack, CallEnvironment};
pub use callable::{BodyFn, Callable};
pub use cell::{Cell, CellKind, Mutability};
pub use chain::ScopeChain;
pub use entity::{Entity, PropertyAccessors, WeakEntity};
pub use errors::{BacktraceFrame, EvalBacktrace, EvalError, EvalErrorKind, EvalResult};
pub use runtime::{EvalCounters, EvalMode, Runtime, RuntimeBuilder, ScopedFrame};
pub use scope::{LocalScope, Scope, ScopeRef};
pub use stack::ensure_sufficient_stack;
pub use symbol::{is_hook, is_identifier, SymbolPolicy, CALL_HOOK};
pub use value::Value;

use std::sync::Once;

static TRACING_INIT: Once = Once::new();

/// Initialize tracing output.
///
/// Safe to call multiple times. Enabled only when `RUST_LOG` is set, e.g.
/// `RUST_LOG=cacti_runtime=debug` for invocation spans or `=trace` for every
/// frame and scope push/pop.
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{fmt, prelude::*, EnvFilter};

        if std::env::var("RUST_LOG").is_ok() {
            tracing_subscriber::registry()
                .with(fmt::layer().with_target(true).with_level(true))
                .with(EnvFilter::from_default_env())
                .init();
        }
    });
}
