use super::*;
use crate::cell::{Cell, Mutability};
use crate::symbol::SymbolPolicy;
use crate::{Builtins, EvalError, EvalErrorKind};
use pretty_assertions::assert_eq;

fn runtime() -> Runtime {
    Runtime::new(Builtins::empty())
}

fn int(rt: &mut Runtime, name: &str) -> Result<i64, EvalError> {
    match rt.lookup(name)? {
        Value::Int(n) => Ok(n),
        other => Err(EvalError::new(format!("{name} is {}", other.type_name()))),
    }
}

#[test]
fn function_sees_params_then_enclosing() {
    let mut rt = runtime();
    let enclosing = ScopeRef::root(SymbolPolicy::Identifier);
    enclosing
        .declare("offset", Cell::new(Value::Int(100), Mutability::Immutable))
        .unwrap();
    enclosing
        .declare("x", Cell::new(Value::Int(-1), Mutability::Immutable))
        .unwrap();

    let add = Callable::new("add", ["x"], |rt| {
        Ok(Value::Int(int(rt, "x")? + int(rt, "offset")?))
    })
    .unwrap();
    let binding = Binding::function(add, Some(enclosing));

    // The parameter `x` shadows the enclosing `x`.
    assert_eq!(binding.call(&mut rt, &[Value::Int(5)]).unwrap(), Value::Int(105));
    assert_eq!(binding.kind(), BindingKind::Function);
    assert!(rt.call_stack().is_empty());
}

#[test]
fn function_frame_owner_is_the_binding() {
    let mut rt = runtime();
    let body = Callable::nullary("who", |rt| {
        Ok(rt
            .call_stack()
            .current()
            .map_or(Value::Void, |frame| frame.owner().clone()))
    });
    let binding = Binding::function(body, None);
    let owner = binding.call(&mut rt, &[]).unwrap();
    assert_eq!(owner, Value::Binding(binding));
}

#[test]
fn arity_mismatch_binds_nothing() {
    let mut rt = runtime();
    let ran = std::rc::Rc::new(std::cell::Cell::new(false));
    let flag = ran.clone();
    let pair = Callable::new("pair", ["x", "y"], move |_| {
        flag.set(true);
        Ok(Value::Void)
    })
    .unwrap();
    let binding = Binding::function(pair, None);

    let err = binding.call(&mut rt, &[Value::Int(1)]).unwrap_err();
    assert_eq!(
        err.kind,
        EvalErrorKind::ArityMismatch {
            name: "pair".to_string(),
            expected: 2,
            got: 1,
        }
    );
    assert!(!ran.get());
    assert!(rt.call_stack().is_empty());
    // Raised inside the frame, so the frame appears in the backtrace.
    let backtrace = err.backtrace.unwrap();
    assert_eq!(backtrace.frames()[0].name, "pair");
}

#[test]
fn parameters_are_constant() {
    let mut rt = runtime();
    let body = Callable::new("bump", ["n"], |rt| {
        rt.assign("n", Value::Int(0))?;
        Ok(Value::Void)
    })
    .unwrap();
    let err = Binding::function(body, None)
        .call(&mut rt, &[Value::Int(1)])
        .unwrap_err();
    assert!(matches!(err.kind, EvalErrorKind::ConstantAssignment { .. }));
}

#[test]
fn method_resolves_self_and_private_view() {
    let mut rt = runtime();
    let entity = Entity::new(None, None, "Point").unwrap();
    entity
        .declare_field("x", Value::Int(3), Mutability::Mutable)
        .unwrap();

    let body = Callable::nullary("x_of_self", |rt| {
        let field = int(rt, "x")?;
        let is_self = matches!(rt.lookup("self")?, Value::Entity(_));
        Ok(Value::Bool(field == 3 && is_self))
    });
    let method = Binding::method(body, &entity);
    assert_eq!(method.call(&mut rt, &[]).unwrap(), Value::Bool(true));
    assert_eq!(method.kind(), BindingKind::Method);
    assert!(method.owner().unwrap().ptr_eq(&entity));
}

#[test]
fn method_frame_owner_is_most_derived() {
    let mut rt = runtime();
    let base = Entity::new(None, None, "A").unwrap();
    let derived = Entity::new(Some(&base), None, "B").unwrap();

    let owner = Callable::nullary("owner", |rt| {
        Ok(rt
            .call_stack()
            .current()
            .map_or(Value::Void, |frame| frame.owner().clone()))
    });
    let method = Binding::method(owner, &base);
    assert_eq!(
        method.call(&mut rt, &[]).unwrap(),
        Value::Entity(derived.clone())
    );
}

#[test]
fn detached_method_fails() {
    let mut rt = runtime();
    let entity = Entity::new(None, None, "Gone").unwrap();
    entity
        .declare_method("ping", Callable::nullary("ping", |_| Ok(Value::Void)))
        .unwrap();
    let stored = entity
        .members()
        .borrow()
        .symbols()
        .map(str::to_string)
        .collect::<Vec<_>>();
    assert_eq!(stored, vec!["ping"]);

    let declared = match entity.members().get(&mut rt, "ping").unwrap() {
        Value::Binding(binding) => binding,
        other => panic!("expected binding, got {other:?}"),
    };
    drop(entity);
    let err = declared.call(&mut rt, &[]).unwrap_err();
    assert_eq!(
        err.kind,
        EvalErrorKind::DetachedReceiver {
            method: "ping".to_string()
        }
    );
}

#[test]
fn closure_outlives_defining_call() {
    let mut rt = runtime();
    // make_counter() declares a mutable local and returns a closure over it.
    let make_counter = Callable::nullary("make_counter", |rt| {
        let locals = ScopeRef::root(SymbolPolicy::Identifier);
        locals.declare("count", Cell::new(Value::Int(0), Mutability::Mutable))?;
        rt.with_scope(locals, |rt| {
            let step = Callable::nullary("step", |rt| {
                let next = int(rt, "count")? + 1;
                rt.assign("count", Value::Int(next))?;
                Ok(Value::Int(next))
            });
            Ok(Value::Binding(Binding::closure(rt, step)))
        })
    });
    let counter = Binding::function(make_counter, None)
        .call(&mut rt, &[])
        .unwrap();
    assert!(rt.call_stack().is_empty());

    let counter = counter.as_binding().unwrap().clone();
    assert_eq!(counter.kind(), BindingKind::Closure);
    assert_eq!(counter.call(&mut rt, &[]).unwrap(), Value::Int(1));
    assert_eq!(counter.call(&mut rt, &[]).unwrap(), Value::Int(2));
    assert!(rt.call_stack().is_empty());
}

#[test]
fn closure_reactivates_captured_owner() {
    let mut rt = runtime();
    let entity = Entity::new(None, None, "Holder").unwrap();
    let make = Callable::nullary("make", |rt| {
        let inner = Callable::nullary("inner", |rt| {
            Ok(rt
                .call_stack()
                .current()
                .map_or(Value::Void, |frame| frame.owner().clone()))
        });
        Ok(Value::Binding(Binding::closure(rt, inner)))
    });
    let closure = Binding::method(make, &entity).call(&mut rt, &[]).unwrap();

    // Invoked from an unrelated function, the closure still sees its owner.
    let caller = Callable::new("caller", ["f"], |rt| {
        let f = rt.lookup("f")?;
        rt.call(&f, &[])
    })
    .unwrap();
    let owner = Binding::function(caller, None)
        .call(&mut rt, &[closure])
        .unwrap();
    assert_eq!(owner, Value::Entity(entity));
}

#[test]
fn closure_at_toplevel_captures_globals() {
    let builtins = {
        let mut builder = Builtins::builder();
        builder.register("answer", Value::Int(42)).unwrap();
        builder.build()
    };
    let mut rt = Runtime::new(builtins);
    let closure = Binding::closure(&rt, Callable::nullary("f", |rt| rt.lookup("answer")));
    assert_eq!(closure.captured().map(CallEnvironment::name), Some("<toplevel>"));
    assert_eq!(closure.call(&mut rt, &[]).unwrap(), Value::Int(42));
}

#[test]
fn bindings_compare_by_identity() {
    let callable = Callable::nullary("f", |_| Ok(Value::Void));
    let a = Binding::function(callable.clone(), None);
    let b = Binding::function(callable, None);
    assert!(a.ptr_eq(&a.clone()));
    assert!(!a.ptr_eq(&b));
    assert_eq!(format!("{}", Value::Binding(a)), "<function f>");
}
