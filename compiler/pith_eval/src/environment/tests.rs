use std::rc::Rc;

use pretty_assertions::assert_eq;

use super::*;
use crate::errors::ExcType;

fn n(v: f64) -> Value {
    Value::Number(v)
}

#[test]
fn root_chain_sees_builtins() {
    let closure = Closure::new_root();
    assert_eq!(closure.len(), 2);
    assert!(closure.lookup("print").is_some());
    assert!(closure.lookup("ValueError").is_some());
}

#[test]
fn root_chains_share_builtins_but_not_globals() {
    let a = Closure::new_root();
    let b = Closure::new_root();
    a.define(Rc::from("x"), n(1.0));
    assert!(b.lookup("x").is_none());
    assert!(a.scopes_inner_first().last().is_some_and(|first| {
        b.scopes_inner_first().last().is_some_and(|other| first.ptr_eq(other))
    }));
}

#[test]
fn unbound_name_is_name_error() {
    let err = Closure::new_root().get_variable("missing").unwrap_err();
    assert_eq!(err.kind, ExcType::NameError);
    assert_eq!(err.message, "name 'missing' is not defined");
}

#[test]
fn inner_scopes_shadow_outer_ones() {
    let outer = Closure::new_root();
    outer.define(Rc::from("x"), n(1.0));
    let inner = outer.extend(ScopeKind::Function);
    inner.define(Rc::from("x"), n(2.0));
    assert_eq!(inner.lookup("x"), Some(n(2.0)));
    assert_eq!(outer.lookup("x"), Some(n(1.0)));
}

#[test]
fn extended_chains_share_existing_scopes() {
    let outer = Closure::new_root();
    let inner = outer.extend(ScopeKind::Function);
    outer.define(Rc::from("late"), n(3.0));
    assert_eq!(inner.lookup("late"), Some(n(3.0)));
}

#[test]
fn assignment_in_function_stays_local() {
    let globals = Closure::new_root();
    globals.define(Rc::from("x"), n(1.0));
    let local = globals.extend(ScopeKind::Function);
    local.set_variable(Rc::from("x"), n(2.0));
    assert_eq!(globals.lookup("x"), Some(n(1.0)));
    assert_eq!(local.lookup("x"), Some(n(2.0)));
}

#[test]
fn assignment_in_block_reaches_enclosing_function_scope() {
    let function = Closure::new_root().extend(ScopeKind::Function);
    let block = function.extend(ScopeKind::Block);
    block.set_variable(Rc::from("y"), n(1.0));
    assert_eq!(function.lookup("y"), Some(n(1.0)));
    assert!(block.top().borrow().is_empty());
}

#[test]
fn block_bindings_are_overwritten_in_place() {
    let function = Closure::new_root().extend(ScopeKind::Function);
    let block = function.extend(ScopeKind::Block);
    block.define(Rc::from("e"), n(1.0));
    block.set_variable(Rc::from("e"), n(2.0));
    assert_eq!(block.top().borrow().get("e"), Some(n(2.0)));
    assert!(function.lookup("e").is_none());
}

#[test]
fn enclosing_class_scope_is_invisible() {
    let class_body = Closure::new_root().extend(ScopeKind::Class);
    class_body.define(Rc::from("attr"), n(1.0));
    assert_eq!(class_body.lookup("attr"), Some(n(1.0)));

    let method = class_body.extend(ScopeKind::Function);
    assert!(method.lookup("attr").is_none());
}

#[test]
fn take_bindings_empties_the_scope() {
    let mut scope = Scope::new(ScopeKind::Class);
    scope.define(Rc::from("a"), n(1.0));
    let members = scope.take_bindings();
    assert_eq!(members.len(), 1);
    assert!(scope.is_empty());
}
