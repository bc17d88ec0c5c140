//! Builtin registry: the read-only scope consulted as the outermost link of
//! every Scope Chain.
//!
//! Types are registered before any user entity exists, because redirection
//! and member inheritance assume a complete super-chain up to a root object.
//! Once built, the registry scope is sealed and every cell in it is constant.

use std::rc::Rc;

use rustc_hash::FxHashMap;

use crate::cell::{Cell, Mutability};
use crate::errors::invalid_symbol;
use crate::runtime::Runtime;
use crate::scope::ScopeRef;
use crate::symbol::SymbolPolicy;
use crate::{Callable, Entity, EvalError, Value};

/// Type definitions registered by [`Builtins::bootstrap`].
pub const BUILTIN_TYPES: &[&str] = &["Type", "Object", "Trait", "Function", "Method", "Closure"];

/// Frozen builtin registry. Cheap to clone; clones share the same scope.
#[derive(Clone, Debug)]
pub struct Builtins {
    scope: ScopeRef,
    types: Rc<FxHashMap<Rc<str>, Entity>>,
    root_protocol: Rc<[(Rc<str>, Callable)]>,
}

/// Mutable registry under construction.
#[derive(Debug)]
pub struct BuiltinsBuilder {
    scope: ScopeRef,
    types: FxHashMap<Rc<str>, Entity>,
    root_protocol: Vec<(Rc<str>, Callable)>,
}

impl BuiltinsBuilder {
    pub fn new() -> Self {
        BuiltinsBuilder {
            scope: ScopeRef::root(SymbolPolicy::Identifier),
            types: FxHashMap::default(),
            root_protocol: Vec::new(),
        }
    }

    /// Declare a constant global.
    pub fn register(&mut self, name: &str, value: Value) -> Result<(), EvalError> {
        self.scope
            .declare(name, Cell::new(value, Mutability::Immutable))
    }

    /// Declare a type definition under its own name.
    pub fn register_type(&mut self, type_def: &Entity) -> Result<(), EvalError> {
        self.register(type_def.name(), Value::Entity(type_def.clone()))?;
        self.types.insert(Rc::from(type_def.name()), type_def.clone());
        Ok(())
    }

    /// Add a method every root object carries.
    pub fn root_method(&mut self, name: &str, callable: Callable) -> Result<(), EvalError> {
        if !SymbolPolicy::Identifier.accepts(name) {
            return Err(invalid_symbol(name, SymbolPolicy::Identifier));
        }
        self.root_protocol.push((Rc::from(name), callable));
        Ok(())
    }

    /// Seal the registry.
    pub fn build(self) -> Builtins {
        self.scope.borrow_mut().seal();
        Builtins {
            scope: self.scope,
            types: Rc::new(self.types),
            root_protocol: self.root_protocol.into(),
        }
    }
}

impl Default for BuiltinsBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl Builtins {
    pub fn builder() -> BuiltinsBuilder {
        BuiltinsBuilder::new()
    }

    /// Registry with no globals and no root protocol.
    pub fn empty() -> Self {
        BuiltinsBuilder::new().build()
    }

    /// Registry with the core type definitions and the root object protocol:
    /// `id()`, `type()`, `super()`, `to_string()` and `has_member(name)`.
    pub fn bootstrap() -> Result<Self, EvalError> {
        let mut builder = BuiltinsBuilder::new();
        let type_type = Entity::new(None, None, "Type")?;
        builder.register_type(&type_type)?;
        for name in BUILTIN_TYPES.iter().filter(|name| **name != "Type") {
            builder.register_type(&Entity::new(None, Some(&type_type), name)?)?;
        }

        builder.root_method(
            "id",
            Callable::nullary("id", |rt| {
                let receiver = receiver(rt)?;
                i64::try_from(receiver.id())
                    .map(Value::Int)
                    .map_err(|_| EvalError::new("entity id out of range"))
            }),
        )?;
        builder.root_method(
            "type",
            Callable::nullary("type", |rt| {
                Ok(receiver(rt)?
                    .type_def()
                    .map_or(Value::Void, |t| Value::Entity(t.clone())))
            }),
        )?;
        builder.root_method(
            "super",
            Callable::nullary("super", |rt| {
                Ok(receiver(rt)?
                    .super_entity()
                    .map_or(Value::Void, |base| Value::Entity(base.clone())))
            }),
        )?;
        builder.root_method(
            "to_string",
            Callable::nullary("to_string", |rt| {
                Ok(Value::string(format!("<{}>", receiver(rt)?.type_name())))
            }),
        )?;
        builder.root_method(
            "has_member",
            Callable::new("has_member", ["name"], |rt| {
                let receiver = receiver(rt)?;
                match rt.lookup("name")? {
                    Value::Str(name) => Ok(Value::Bool(receiver.has_member(&name))),
                    other => Err(EvalError::new(format!(
                        "has_member expects a str argument, got {}",
                        other.type_name()
                    ))),
                }
            })?,
        )?;
        Ok(builder.build())
    }

    /// The sealed global scope.
    pub fn scope(&self) -> &ScopeRef {
        &self.scope
    }

    pub fn type_def(&self, name: &str) -> Option<&Entity> {
        self.types.get(name)
    }

    /// A fresh root object carrying the root protocol.
    ///
    /// Every delegation chain needs its own root: redirection is write-once,
    /// so a root can be the base of exactly one derived entity.
    pub fn instantiate_root(&self) -> Result<Entity, EvalError> {
        let root = Entity::new(None, self.type_def("Object"), "Object")?;
        for (name, callable) in self.root_protocol.iter() {
            root.declare_method(name, callable.clone())?;
        }
        Ok(root)
    }

    /// Build one instance layer per type definition on a fresh root.
    ///
    /// `type_defs` runs from the most basic type to the most derived one, and
    /// layers are created in that order, so each layer is redirected to the
    /// next. Returns the layers (root excluded) in the same order; the last
    /// one is the receiver of the whole chain.
    pub fn instantiate_chain(&self, type_defs: &[&Entity]) -> Result<Vec<Entity>, EvalError> {
        let mut layers: Vec<Entity> = Vec::with_capacity(type_defs.len());
        let root = self.instantiate_root()?;
        for type_def in type_defs {
            let base = layers.last().unwrap_or(&root);
            let layer = Entity::new(Some(base), Some(*type_def), type_def.name())?;
            layers.push(layer);
        }
        Ok(layers)
    }
}

/// The `self` of the running method.
fn receiver(rt: &mut Runtime) -> Result<Entity, EvalError> {
    match rt.lookup("self")? {
        Value::Entity(entity) => Ok(entity),
        other => Err(EvalError::new(format!(
            "expected an entity receiver, got {}",
            other.type_name()
        ))),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, reason = "tests use unwrap for brevity")]
mod tests;
