use super::*;
use crate::{EvalErrorKind, ScopeChain};
use pretty_assertions::assert_eq;

#[test]
fn bootstrap_registers_core_types() {
    let builtins = Builtins::bootstrap().unwrap();
    for name in BUILTIN_TYPES {
        let ty = builtins.type_def(name).unwrap();
        assert_eq!(ty.name(), *name);
        assert!(builtins.scope().contains(name));
    }
    let object = builtins.type_def("Object").unwrap();
    assert_eq!(object.type_name(), "Type");
}

#[test]
fn registry_is_sealed_and_constant() {
    let builtins = Builtins::bootstrap().unwrap();
    let mut rt = Runtime::new(builtins.clone());
    let err = builtins
        .scope()
        .declare("extra", Cell::new(Value::Int(1), Mutability::Mutable))
        .unwrap_err();
    assert!(matches!(err.kind, EvalErrorKind::SealedScope { .. }));

    let err = rt.assign("Object", Value::Void).unwrap_err();
    assert!(matches!(err.kind, EvalErrorKind::ConstantAssignment { .. }));
}

#[test]
fn builder_rejects_duplicates_and_bad_names() {
    let mut builder = Builtins::builder();
    builder.register("print", Value::Void).unwrap();
    let err = builder.register("print", Value::Void).unwrap_err();
    assert!(matches!(err.kind, EvalErrorKind::DuplicateSymbol { .. }));

    let err = builder
        .root_method("not valid", Callable::nullary("x", |_| Ok(Value::Void)))
        .unwrap_err();
    assert!(matches!(err.kind, EvalErrorKind::InvalidSymbol { .. }));
}

#[test]
fn clones_share_the_scope() {
    let builtins = Builtins::empty();
    let copy = builtins.clone();
    assert!(builtins.scope().ptr_eq(copy.scope()));
}

#[test]
fn roots_carry_the_protocol() {
    let builtins = Builtins::bootstrap().unwrap();
    let mut rt = Runtime::new(builtins.clone());
    let root = builtins.instantiate_root().unwrap();

    assert_eq!(root.type_name(), "Object");
    assert_eq!(
        root.invoke_member(&mut rt, "to_string", &[]).unwrap(),
        Value::string("<Object>")
    );
    assert_eq!(
        root.invoke_member(&mut rt, "type", &[]).unwrap(),
        Value::Entity(builtins.type_def("Object").unwrap().clone())
    );
    assert_eq!(
        root.invoke_member(&mut rt, "has_member", &[Value::string("id")])
            .unwrap(),
        Value::Bool(true)
    );
    assert_eq!(
        root.invoke_member(&mut rt, "has_member", &[Value::string("nope")])
            .unwrap(),
        Value::Bool(false)
    );
}

#[test]
fn id_is_stable_and_distinct() {
    let builtins = Builtins::bootstrap().unwrap();
    let mut rt = Runtime::new(builtins.clone());
    let first = builtins.instantiate_root().unwrap();
    let second = builtins.instantiate_root().unwrap();

    let a = first.invoke_member(&mut rt, "id", &[]).unwrap();
    let again = first.invoke_member(&mut rt, "id", &[]).unwrap();
    let b = second.invoke_member(&mut rt, "id", &[]).unwrap();
    assert_eq!(a, again);
    assert_ne!(a, b);
}

#[test]
fn protocol_dispatches_on_most_derived() {
    let builtins = Builtins::bootstrap().unwrap();
    let mut rt = Runtime::new(builtins.clone());
    let point_type = Entity::new(None, builtins.type_def("Type"), "Point").unwrap();
    let root = builtins.instantiate_root().unwrap();
    let point = Entity::new(Some(&root), Some(&point_type), "p").unwrap();

    // Inherited from the root, but `self` is the point.
    assert_eq!(
        point.invoke_member(&mut rt, "to_string", &[]).unwrap(),
        Value::string("<Point>")
    );
    assert_eq!(
        point.invoke_member(&mut rt, "id", &[]).unwrap(),
        root.invoke_member(&mut rt, "id", &[]).unwrap()
    );
}

#[test]
fn has_member_checks_argument_type() {
    let builtins = Builtins::bootstrap().unwrap();
    let mut rt = Runtime::new(builtins.clone());
    let root = builtins.instantiate_root().unwrap();
    let err = root
        .invoke_member(&mut rt, "has_member", &[Value::Int(1)])
        .unwrap_err();
    assert!(err.to_string().contains("expects a str"));
}

#[test]
fn each_root_can_be_derived_once() {
    let builtins = Builtins::bootstrap().unwrap();
    let root = builtins.instantiate_root().unwrap();
    let _first = Entity::new(Some(&root), None, "First").unwrap();
    assert!(Entity::new(Some(&root), None, "Second").is_err());

    let fresh = builtins.instantiate_root().unwrap();
    assert!(Entity::new(Some(&fresh), None, "Second").is_ok());
}

#[test]
fn globals_end_every_chain() {
    let builtins = Builtins::bootstrap().unwrap();
    let rt = Runtime::new(builtins);
    let chain: ScopeChain = rt.current_chain();
    assert!(chain.contains("Function"));
}

#[test]
fn super_method_returns_the_layer_below() {
    let builtins = Builtins::bootstrap().unwrap();
    let mut rt = Runtime::new(builtins.clone());
    let root = builtins.instantiate_root().unwrap();
    assert_eq!(root.invoke_member(&mut rt, "super", &[]).unwrap(), Value::Void);

    let derived = Entity::new(Some(&root), None, "Derived").unwrap();
    assert_eq!(
        derived.invoke_member(&mut rt, "super", &[]).unwrap(),
        Value::Entity(root.clone())
    );
    // Reached through the root, `self` is still the derived layer.
    assert_eq!(
        root.invoke_member(&mut rt, "super", &[]).unwrap(),
        Value::Entity(root)
    );
}

#[test]
fn chain_is_built_base_first() {
    let builtins = Builtins::bootstrap().unwrap();
    let mut rt = Runtime::new(builtins.clone());
    let type_type = builtins.type_def("Type");
    let shape = Entity::new(None, type_type, "Shape").unwrap();
    let circle = Entity::new(None, type_type, "Circle").unwrap();

    let layers = builtins.instantiate_chain(&[&shape, &circle]).unwrap();
    assert_eq!(layers.len(), 2);
    let (base, top) = (&layers[0], &layers[1]);
    assert_eq!(base.type_name(), "Shape");
    assert_eq!(top.type_name(), "Circle");
    assert!(top.super_entity().unwrap().ptr_eq(base));
    assert!(base.receiver().ptr_eq(top));
    assert_eq!(
        base.super_entity().map(Entity::type_name),
        Some("Object")
    );
    assert_eq!(
        top.invoke_member(&mut rt, "to_string", &[]).unwrap(),
        Value::string("<Circle>")
    );
}

#[test]
fn empty_chain_has_no_layers() {
    let builtins = Builtins::bootstrap().unwrap();
    assert!(builtins.instantiate_chain(&[]).unwrap().is_empty());
}
