//! Interpreter behaviour tests.
//!
//! Programs are built with `pith_ir::build` and run against a fresh root
//! closure with captured output.

mod class_tests;

use pith_ir::build::{call, name, positional};
use pith_ir::Instruction;

use crate::{buffer_handler, Closure, Exception, InterpreterBuilder, RunError, Value};

/// Result of running a program.
pub(crate) struct Outcome {
    pub closure: Closure,
    pub output: String,
    pub result: Result<(), RunError>,
}

impl Outcome {
    /// A global binding; panics if unbound.
    pub fn var(&self, ident: &str) -> Value {
        match self.closure.get_variable(ident) {
            Ok(value) => value,
            Err(err) => panic!("{ident} is unbound: {err}"),
        }
    }

    /// The uncaught exception; panics if the run did not raise.
    pub fn exception(&self) -> &Exception {
        match &self.result {
            Err(RunError::Uncaught(exc)) => exc,
            other => panic!("expected an uncaught exception, got {other:?}"),
        }
    }

    pub fn assert_ok(&self) {
        if let Err(err) = &self.result {
            panic!("program failed: {err}");
        }
    }
}

pub(crate) fn run(program: &[Instruction]) -> Outcome {
    run_with_depth(program, Some(crate::DEFAULT_MAX_CALL_DEPTH))
}

pub(crate) fn run_with_depth(program: &[Instruction], depth: Option<usize>) -> Outcome {
    let handler = buffer_handler();
    let interpreter = InterpreterBuilder::new()
        .print_handler(handler.clone())
        .max_call_depth(depth)
        .file_name("test.pith")
        .build();
    let closure = Closure::new_root();
    let mut call_stack = interpreter.new_call_stack();
    let result = interpreter.run(program, &mut call_stack, &closure);
    assert_eq!(call_stack.depth(), 1, "frames leaked past the run");
    Outcome {
        closure,
        output: handler.get_output(),
        result,
    }
}

/// `ident(args...)`
pub(crate) fn call_named(ident: &str, args: Vec<Instruction>) -> Instruction {
    name(ident).then(call(args.into_iter().map(positional).collect()))
}

pub(crate) fn num(v: f64) -> Value {
    Value::Number(v)
}
