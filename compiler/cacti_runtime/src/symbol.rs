//! Symbol validation.
//!
//! Every [`Scope`](crate::Scope) carries a [`SymbolPolicy`] that decides which
//! names may be declared in it. Ordinary tables (fields, members, parameters)
//! accept identifiers; hook tables accept operator-like dispatch keys.

use std::fmt;

/// Invocation hook: makes an entity callable through [`Runtime::call`](crate::Runtime::call).
pub const CALL_HOOK: &str = "()";

/// Operator tokens accepted as hook names.
const OPERATOR_HOOKS: &[&str] = &[
    "+", "-", "*", "/", "%", "==", "!=", "<", "<=", ">", ">=", "!", "()", "[]", "[]=",
];

/// Which names a scope accepts.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SymbolPolicy {
    /// `[A-Za-z_][A-Za-z0-9_]*`
    Identifier,
    /// `@identifier` or one of the operator tokens (`+`, `==`, `()`, ...).
    Hook,
}

impl SymbolPolicy {
    /// Returns `true` if `symbol` may be declared under this policy.
    #[inline]
    pub fn accepts(self, symbol: &str) -> bool {
        match self {
            SymbolPolicy::Identifier => is_identifier(symbol),
            SymbolPolicy::Hook => is_hook(symbol),
        }
    }
}

impl fmt::Display for SymbolPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SymbolPolicy::Identifier => f.write_str("identifier"),
            SymbolPolicy::Hook => f.write_str("hook"),
        }
    }
}

/// Check an ordinary name: a letter or underscore, then letters, digits or underscores.
pub fn is_identifier(symbol: &str) -> bool {
    let mut bytes = symbol.bytes();
    match bytes.next() {
        Some(first) if first.is_ascii_alphabetic() || first == b'_' => {
            bytes.all(|b| b.is_ascii_alphanumeric() || b == b'_')
        }
        _ => false,
    }
}

/// Check a hook name.
pub fn is_hook(symbol: &str) -> bool {
    if let Some(named) = symbol.strip_prefix('@') {
        return is_identifier(named);
    }
    OPERATOR_HOOKS.contains(&symbol)
}

#[cfg(test)]
mod tests;
