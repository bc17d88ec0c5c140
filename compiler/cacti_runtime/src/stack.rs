//! Machine stack headroom for nested invocations.
//!
//! Every body runs through [`ensure_sufficient_stack`], so deep recursion in
//! user programs grows the native stack instead of overflowing it. The call
//! depth itself is still bounded by the runtime's configured limit.

/// Headroom that must remain before a body starts.
///
/// One binding invocation stacks `Binding::call`, the frame and scope guards,
/// a host body and, through getters and setters, possibly a second
/// invocation before the next check; the margin covers that whole span.
#[cfg(not(target_arch = "wasm32"))]
const RED_ZONE: usize = 128 * 1024;

/// Size of each new stack segment, enough for several such spans.
#[cfg(not(target_arch = "wasm32"))]
const SEGMENT_SIZE: usize = 2 * 1024 * 1024;

/// Run `f` with at least `RED_ZONE` bytes of stack available.
#[inline]
#[cfg(not(target_arch = "wasm32"))]
pub fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    stacker::maybe_grow(RED_ZONE, SEGMENT_SIZE, f)
}

/// WASM cannot switch stacks; depth is capped by `EvalMode` instead.
#[inline]
#[cfg(target_arch = "wasm32")]
pub fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    f()
}
