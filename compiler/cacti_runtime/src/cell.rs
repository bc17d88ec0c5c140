//! Symbol cells: single named storage slots with a fixed access policy.

use crate::binding::Binding;
use crate::value::Value;

/// Whether a stored binding can be reassigned.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Mutability {
    Mutable,
    Immutable,
}

impl Mutability {
    /// Returns `true` if this is `Mutable`.
    #[inline]
    pub fn is_mutable(self) -> bool {
        matches!(self, Mutability::Mutable)
    }
}

/// Access policy of a cell, observable without reading it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CellKind {
    Mutable,
    Constant,
    ReadOnlyComputed,
    ReadWriteComputed,
}

/// A single storage slot.
///
/// The variant is fixed at creation: writes replace the held value of a
/// `Mutable` cell or run the setter of a `Computed` one, never the variant.
#[derive(Clone, Debug)]
pub enum Cell {
    Mutable(Value),
    Constant(Value),
    /// No stored value; reads run `getter`, writes run `setter` when present.
    Computed {
        getter: Binding,
        setter: Option<Binding>,
    },
}

/// Outcome of reading a cell while its scope is borrowed.
///
/// Getters are returned rather than run so the borrow can be released before
/// user code executes.
pub(crate) enum CellRead {
    Value(Value),
    Getter(Binding),
}

/// Outcome of writing a cell while its scope is borrowed.
pub(crate) enum CellWrite {
    Stored,
    Rejected,
    Setter(Binding, Value),
}

impl Cell {
    pub fn new(value: Value, mutability: Mutability) -> Self {
        if mutability.is_mutable() {
            Cell::Mutable(value)
        } else {
            Cell::Constant(value)
        }
    }

    pub fn computed(getter: Binding, setter: Option<Binding>) -> Self {
        Cell::Computed { getter, setter }
    }

    pub fn kind(&self) -> CellKind {
        match self {
            Cell::Mutable(_) => CellKind::Mutable,
            Cell::Constant(_) => CellKind::Constant,
            Cell::Computed { setter: None, .. } => CellKind::ReadOnlyComputed,
            Cell::Computed { setter: Some(_), .. } => CellKind::ReadWriteComputed,
        }
    }

    pub(crate) fn read(&self) -> CellRead {
        match self {
            Cell::Mutable(v) | Cell::Constant(v) => CellRead::Value(v.clone()),
            Cell::Computed { getter, .. } => CellRead::Getter(getter.clone()),
        }
    }

    pub(crate) fn write(&mut self, value: Value) -> CellWrite {
        match self {
            Cell::Mutable(slot) => {
                *slot = value;
                CellWrite::Stored
            }
            Cell::Constant(_) | Cell::Computed { setter: None, .. } => CellWrite::Rejected,
            Cell::Computed {
                setter: Some(setter),
                ..
            } => CellWrite::Setter(setter.clone(), value),
        }
    }
}
