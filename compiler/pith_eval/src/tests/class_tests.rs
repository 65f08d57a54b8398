//! Classes, instances and method resolution.

use pith_ir::build::{
    assign, binary, call, def_class, def_function, int, keyword, member, name, param, params,
    pass_stmt, positional, return_stmt, string, tuple,
};
use pith_ir::{BinaryOp, Instruction};
use pretty_assertions::assert_eq;

use super::{call_named, num, run};
use crate::Value;

fn method_returning(ident: &str, value: Instruction) -> Instruction {
    def_function(ident, params(vec![param("self")]), vec![return_stmt(Some(value))])
}

fn call_method(target: &str, method: &str, args: Vec<Instruction>) -> Instruction {
    name(target)
        .then(member(method))
        .then(call(args.into_iter().map(positional).collect()))
}

#[test]
fn leftmost_base_wins_method_resolution() {
    let out = run(&[
        def_class("A", vec![], vec![method_returning("m", string("A"))]),
        def_class("B", vec![], vec![method_returning("m", string("B"))]),
        def_class("C", vec![name("A"), name("B")], vec![pass_stmt()]),
        assign(name("c"), call_named("C", vec![])),
        assign(name("y"), call_method("c", "m", vec![])),
    ]);
    out.assert_ok();
    assert_eq!(out.var("y"), Value::string("A"));
}

#[test]
fn resolution_is_depth_first() {
    let out = run(&[
        def_class("Root", vec![], vec![method_returning("m", string("Root"))]),
        def_class("Left", vec![name("Root")], vec![pass_stmt()]),
        def_class("Right", vec![], vec![method_returning("m", string("Right"))]),
        def_class("D", vec![name("Left"), name("Right")], vec![pass_stmt()]),
        assign(name("y"), call_named("D", vec![]).then(member("m")).then(call(vec![]))),
    ]);
    out.assert_ok();
    assert_eq!(out.var("y"), Value::string("Root"));
}

#[test]
fn methods_receive_self_and_arguments() {
    let out = run(&[
        def_class(
            "Counter",
            vec![],
            vec![
                def_function(
                    "__init__",
                    params(vec![param("self"), param("start")]),
                    vec![assign(name("self").then(member("n")), name("start"))],
                ),
                def_function(
                    "add",
                    params(vec![param("self"), param("by")]),
                    vec![
                        assign(
                            name("self").then(member("n")),
                            binary(BinaryOp::Add, name("self").then(member("n")), name("by")),
                        ),
                        return_stmt(Some(name("self").then(member("n")))),
                    ],
                ),
            ],
        ),
        assign(name("c"), call_named("Counter", vec![int(1)])),
        call_method("c", "add", vec![int(2)]),
        assign(
            name("y"),
            name("c")
                .then(member("add"))
                .then(call(vec![keyword("by", int(10))])),
        ),
    ]);
    out.assert_ok();
    assert_eq!(out.var("y"), num(13.0));
}

#[test]
fn instances_snapshot_class_attributes() {
    let out = run(&[
        def_class("K", vec![], vec![assign(name("v"), int(1))]),
        assign(name("a"), call_named("K", vec![])),
        assign(name("K").then(member("v")), int(2)),
        assign(name("b"), call_named("K", vec![])),
        assign(name("av"), name("a").then(member("v"))),
        assign(name("bv"), name("b").then(member("v"))),
    ]);
    out.assert_ok();
    assert_eq!(out.var("av"), num(1.0));
    assert_eq!(out.var("bv"), num(2.0));
}

#[test]
fn class_members_are_shared_not_copied() {
    let out = run(&[
        def_class("Base", vec![], vec![pass_stmt()]),
        def_class("Sub", vec![name("Base")], vec![pass_stmt()]),
        assign(name("s"), call_named("Sub", vec![])),
        def_function(
            "late",
            params(vec![param("self")]),
            vec![return_stmt(Some(string("added later")))],
        ),
        assign(name("Base").then(member("late")), name("late")),
        assign(name("y"), call_method("s", "late", vec![])),
    ]);
    out.assert_ok();
    assert_eq!(out.var("y"), Value::string("added later"));
}

#[test]
fn inherited_attributes_are_copied_into_instances() {
    let out = run(&[
        def_class("A", vec![], vec![assign(name("x"), int(1)), assign(name("y"), int(1))]),
        def_class("B", vec![name("A")], vec![assign(name("y"), int(2))]),
        assign(name("b"), call_named("B", vec![])),
        assign(name("x"), name("b").then(member("x"))),
        assign(name("y"), name("b").then(member("y"))),
    ]);
    out.assert_ok();
    assert_eq!(out.var("x"), num(1.0));
    assert_eq!(out.var("y"), num(2.0));
}

#[test]
fn class_body_names_do_not_leak_into_methods() {
    let out = run(&[
        def_class(
            "K",
            vec![],
            vec![
                assign(name("hidden"), int(1)),
                method_returning("peek", name("hidden")),
            ],
        ),
        assign(name("k"), call_named("K", vec![])),
        call_method("k", "peek", vec![]),
    ]);
    assert_eq!(out.exception().type_name(), "NameError");
    assert!(out.closure.get_variable("hidden").is_err());
}

#[test]
fn constructor_without_init_rejects_arguments() {
    let out = run(&[
        def_class("E", vec![], vec![pass_stmt()]),
        call_named("E", vec![int(1)]),
    ]);
    assert_eq!(out.exception().type_name(), "TypeError");
    assert_eq!(out.exception().message(), "E() takes no arguments");
}

#[test]
fn subclass_without_init_anywhere_rejects_arguments() {
    let out = run(&[
        def_class("Base", vec![], vec![pass_stmt()]),
        def_class("Child", vec![name("Base")], vec![pass_stmt()]),
        assign(name("ok"), call_named("Child", vec![])),
        call_named("Child", vec![int(1)]),
    ]);
    assert!(out.closure.get_variable("ok").is_ok());
    assert_eq!(out.exception().type_name(), "TypeError");
    assert_eq!(out.exception().message(), "Child() takes no arguments");
}

#[test]
fn base_must_be_a_class() {
    let out = run(&[def_class("Bad", vec![int(1)], vec![pass_stmt()])]);
    assert_eq!(out.exception().type_name(), "TypeError");
}

#[test]
fn missing_attribute_is_an_attribute_error() {
    let out = run(&[
        def_class("E", vec![], vec![pass_stmt()]),
        assign(name("e"), call_named("E", vec![])),
        assign(name("y"), name("e").then(member("nope"))),
    ]);
    assert_eq!(out.exception().type_name(), "AttributeError");
    assert_eq!(
        out.exception().message(),
        "'E' object has no attribute 'nope'"
    );
}

#[test]
fn isinstance_follows_the_class_chain() {
    let out = run(&[
        def_class("A", vec![], vec![pass_stmt()]),
        def_class("B", vec![name("A")], vec![pass_stmt()]),
        def_class("Other", vec![], vec![pass_stmt()]),
        assign(name("b"), call_named("B", vec![])),
        assign(name("yes"), call_named("isinstance", vec![name("b"), name("A")])),
        assign(name("no"), call_named("isinstance", vec![name("b"), name("Other")])),
        assign(
            name("any"),
            call_named(
                "isinstance",
                vec![name("b"), tuple(vec![name("Other"), name("B")])],
            ),
        ),
    ]);
    out.assert_ok();
    assert_eq!(out.var("yes"), Value::Bool(true));
    assert_eq!(out.var("no"), Value::Bool(false));
    assert_eq!(out.var("any"), Value::Bool(true));
}

#[test]
fn methods_display_as_bound() {
    let out = run(&[
        def_class("C", vec![], vec![method_returning("m", int(1))]),
        assign(name("c"), call_named("C", vec![])),
        assign(name("bound"), call_named("str", vec![name("c").then(member("m"))])),
        assign(name("cls"), call_named("str", vec![name("C")])),
    ]);
    out.assert_ok();
    assert_eq!(out.var("bound"), Value::string("<bound method C.m>"));
    assert_eq!(out.var("cls"), Value::string("<class 'C'>"));
}
