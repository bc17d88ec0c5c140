//! Entities: runtime objects with single inheritance by delegation.
//!
//! Each entity owns three tables:
//!
//! - a **field table**, always local and never chained into inheritance,
//! - a **hook table** delegating to the super-entity's hook table,
//! - a **member table** delegating to the super-entity's member table.
//!
//! The *public view* is the member table alone; the *private view* (used by
//! the entity's own methods) chains the field table in front of it.
//!
//! # Redirection
//!
//! Constructing `B` with super-entity `A` redirects `A`'s receiver to `B`,
//! once. Methods declared on `A` therefore see `B` as `self`, which gives
//! override-aware dispatch without a vtable. Chains are built bottom-up and
//! [`Entity::receiver`] follows the links to the most-derived entity.

use std::cell::OnceCell;
use std::fmt;
use std::rc::{Rc, Weak};

use crate::binding::Binding;
use crate::cell::{Cell, Mutability};
use crate::errors::{already_derived, arity_mismatch, not_callable, unknown_member, unsupported_hook};
use crate::runtime::Runtime;
use crate::scope::ScopeRef;
use crate::symbol::SymbolPolicy;
use crate::{Callable, EvalError, EvalResult, ScopeChain, Value};

/// How a property member stores or computes its value.
#[derive(Clone, Debug)]
pub enum PropertyAccessors {
    /// Ordinary mutable slot exposed as a member.
    Stored(Value),
    /// Read-only computed member.
    Getter(Callable),
    /// Read/write computed member.
    GetterSetter(Callable, Callable),
}

/// Shared handle to an entity. Equality is identity.
#[derive(Clone)]
pub struct Entity(Rc<EntityData>);

/// Non-owning entity handle.
#[derive(Clone)]
pub struct WeakEntity(Weak<EntityData>);

struct EntityData {
    name: Rc<str>,
    type_def: Option<Entity>,
    super_entity: Option<Entity>,
    fields: ScopeRef,
    hooks: ScopeRef,
    members: ScopeRef,
    /// Write-once link to the entity built on top of this one.
    derived: OnceCell<WeakEntity>,
}

impl WeakEntity {
    pub fn upgrade(&self) -> Option<Entity> {
        self.0.upgrade().map(Entity)
    }
}

impl Entity {
    /// Build an entity, redirecting `super_entity`'s receiver to it.
    ///
    /// Fails with `AlreadyDerived` if `super_entity` was already redirected.
    pub fn new(
        super_entity: Option<&Entity>,
        type_def: Option<&Entity>,
        name: &str,
    ) -> Result<Entity, EvalError> {
        let (hooks, members) = match super_entity {
            Some(base) => {
                if base.0.derived.get().is_some() {
                    return Err(already_derived(base.name()));
                }
                (
                    base.0.hooks.child(SymbolPolicy::Hook),
                    base.0.members.child(SymbolPolicy::Identifier),
                )
            }
            None => (
                ScopeRef::root(SymbolPolicy::Hook),
                ScopeRef::root(SymbolPolicy::Identifier),
            ),
        };
        let entity = Entity(Rc::new(EntityData {
            name: Rc::from(name),
            type_def: type_def.cloned(),
            super_entity: super_entity.cloned(),
            fields: ScopeRef::root(SymbolPolicy::Identifier),
            hooks,
            members,
            derived: OnceCell::new(),
        }));
        if let Some(base) = super_entity {
            base.0
                .derived
                .set(entity.downgrade())
                .map_err(|_| already_derived(base.name()))?;
            tracing::debug!(base = base.name(), derived = name, "redirected receiver");
        }
        Ok(entity)
    }

    pub fn name(&self) -> &str {
        &self.0.name
    }

    /// Identity of this entity, stable for its lifetime.
    pub fn id(&self) -> usize {
        Rc::as_ptr(&self.0) as usize
    }

    pub fn type_def(&self) -> Option<&Entity> {
        self.0.type_def.as_ref()
    }

    /// Name of the type definition, or the entity's own name when untyped.
    pub fn type_name(&self) -> &str {
        self.0.type_def.as_ref().map_or(self.name(), Entity::name)
    }

    pub fn super_entity(&self) -> Option<&Entity> {
        self.0.super_entity.as_ref()
    }

    #[inline]
    pub fn ptr_eq(&self, other: &Entity) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    pub fn downgrade(&self) -> WeakEntity {
        WeakEntity(Rc::downgrade(&self.0))
    }

    /// The most-derived live entity of this delegation chain.
    pub fn receiver(&self) -> Entity {
        let mut current = self.clone();
        while let Some(next) = current.0.derived.get().and_then(WeakEntity::upgrade) {
            current = next;
        }
        current
    }

    pub fn is_most_derived(&self) -> bool {
        self.receiver().ptr_eq(self)
    }

    pub fn fields(&self) -> &ScopeRef {
        &self.0.fields
    }

    pub fn hooks(&self) -> &ScopeRef {
        &self.0.hooks
    }

    pub fn members(&self) -> &ScopeRef {
        &self.0.members
    }

    /// Inherited methods and properties only.
    pub fn public_view(&self) -> ScopeRef {
        self.0.members.clone()
    }

    /// Own fields, then inherited members. For the entity's own code.
    pub fn private_view(&self) -> ScopeChain {
        ScopeChain::from_scopes([self.0.fields.clone(), self.0.members.clone()])
    }

    /// `self` (the most-derived receiver) and `super` (this layer's super-entity).
    pub fn self_scope(&self) -> Result<ScopeRef, EvalError> {
        let scope = ScopeRef::root(SymbolPolicy::Identifier);
        scope.declare(
            "self",
            Cell::new(Value::Entity(self.receiver()), Mutability::Immutable),
        )?;
        let base = self
            .super_entity()
            .map_or(Value::Void, |base| Value::Entity(base.clone()));
        scope.declare("super", Cell::new(base, Mutability::Immutable))?;
        Ok(scope)
    }

    pub fn declare_hook(&self, name: &str, callable: Callable) -> Result<(), EvalError> {
        let binding = Binding::declared_method(callable, self);
        self.0
            .hooks
            .declare(name, Cell::new(Value::Binding(binding), Mutability::Immutable))
    }

    pub fn declare_method(&self, name: &str, callable: Callable) -> Result<(), EvalError> {
        let binding = Binding::declared_method(callable, self);
        self.0
            .members
            .declare(name, Cell::new(Value::Binding(binding), Mutability::Immutable))
    }

    /// Declare a property member. Getters take no arguments, setters one.
    pub fn declare_property(
        &self,
        name: &str,
        accessors: PropertyAccessors,
    ) -> Result<(), EvalError> {
        let cell = match accessors {
            PropertyAccessors::Stored(value) => Cell::new(value, Mutability::Mutable),
            PropertyAccessors::Getter(getter) => {
                check_accessor_arity(&getter, 0)?;
                Cell::computed(Binding::declared_method(getter, self), None)
            }
            PropertyAccessors::GetterSetter(getter, setter) => {
                check_accessor_arity(&getter, 0)?;
                check_accessor_arity(&setter, 1)?;
                Cell::computed(
                    Binding::declared_method(getter, self),
                    Some(Binding::declared_method(setter, self)),
                )
            }
        };
        self.0.members.declare(name, cell)
    }

    pub fn declare_field(
        &self,
        name: &str,
        value: Value,
        mutability: Mutability,
    ) -> Result<(), EvalError> {
        self.0.fields.declare(name, Cell::new(value, mutability))
    }

    pub fn has_member(&self, name: &str) -> bool {
        self.0.members.contains(name)
    }

    pub fn supports_hook(&self, name: &str) -> bool {
        self.0.hooks.contains(name)
    }

    /// Read a member through the public view.
    ///
    /// Methods come back as bindings that keep their entity alive; properties
    /// yield their stored or computed value.
    pub fn get_member(&self, rt: &mut Runtime, name: &str) -> EvalResult {
        if !self.has_member(name) {
            return Err(unknown_member(name, self.name()));
        }
        let value = self.0.members.get(rt, name)?;
        Ok(match value {
            Value::Binding(binding) => Value::Binding(binding.attached()),
            other => other,
        })
    }

    pub fn set_member(&self, rt: &mut Runtime, name: &str, value: Value) -> Result<(), EvalError> {
        if !self.has_member(name) {
            return Err(unknown_member(name, self.name()));
        }
        self.0.members.set(rt, name, value)
    }

    /// Read a member and call it.
    pub fn invoke_member(&self, rt: &mut Runtime, name: &str, args: &[Value]) -> EvalResult {
        let member = self.get_member(rt, name)?;
        rt.call(&member, args)
    }

    pub fn invoke_hook(&self, rt: &mut Runtime, name: &str, args: &[Value]) -> EvalResult {
        if !self.supports_hook(name) {
            return Err(unsupported_hook(name, self.name()));
        }
        match self.0.hooks.get(rt, name)? {
            Value::Binding(binding) => binding.call(rt, args),
            other => Err(not_callable(other.type_name())),
        }
    }
}

fn check_accessor_arity(accessor: &Callable, expected: usize) -> Result<(), EvalError> {
    if accessor.arity() == expected {
        Ok(())
    } else {
        Err(arity_mismatch(accessor.name(), expected, accessor.arity()))
    }
}

impl fmt::Debug for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Entity")
            .field("name", &self.name())
            .field("id", &self.id())
            .field("super", &self.super_entity().map(Entity::name))
            .finish_non_exhaustive()
    }
}

impl fmt::Debug for WeakEntity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("WeakEntity")
    }
}
