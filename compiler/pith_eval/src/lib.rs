//! Pith Eval - execution engine for the Pith scripting language.
//!
//! This crate provides the tree-walking interpreter that runs instruction
//! trees produced by an external parser (see `pith_ir`).
//!
//! # Architecture
//!
//! The evaluator uses:
//! - `Value`: the tagged runtime value with shared, aliased containers
//! - `Closure`: a chain of `Scope`s captured at definition time
//! - `CallStack`: frames recorded for trace rendering
//! - `ArgumentSet`: binds call-site arguments to declared parameters
//! - `ClassValue`/`ObjectValue`: classes with leftmost-first depth-first MRO
//! - `Interpreter`: context-sensitive dispatch of instruction chains
//! - `ControlAction`: structured unwinding for return/break/continue/raise
//!
//! # Host usage
//!
//! ```
//! use pith_eval::{CallStack, Closure, InterpreterBuilder, Value};
//! use pith_ir::build::{assign, name, num};
//!
//! let interpreter = InterpreterBuilder::new().build();
//! let closure = Closure::new_root();
//! let mut call_stack = CallStack::new("main.pith");
//!
//! interpreter
//!     .run(&[assign(name("x"), num(5.0))], &mut call_stack, &closure)
//!     .ok();
//! assert_eq!(closure.get_variable("x").ok(), Some(Value::Number(5.0)));
//! ```

mod builtins;
mod diagnostics;
mod environment;
pub mod errors;
pub mod exec;
pub mod interpreter;
mod logging;
mod operators;
mod print_handler;
mod stack;
mod unwind;
pub mod value;

pub use builtins::exception_class;
pub use diagnostics::{Backtrace, CallStack, StackFrame, MODULE_FRAME};
pub use environment::{Closure, LocalScope, Scope, ScopeKind};
pub use errors::{EvalError, EvalResult, ExcType};
pub use exec::args::ArgumentSet;
pub use interpreter::{Interpreter, InterpreterBuilder, DEFAULT_MAX_CALL_DEPTH};
pub use logging::init_tracing;
pub use operators::{evaluate_binary, evaluate_unary};
pub use print_handler::{
    buffer_handler, silent_handler, stdout_handler, BufferPrintHandler, PrintHandlerImpl,
    SharedPrintHandler, StdoutPrintHandler,
};
pub use stack::ensure_sufficient_stack;
pub use unwind::{ControlAction, Exception, ExecResult, RunError};
pub use value::{
    Builtin, Callee, ClassRef, ClassValue, FunctionValue, ItemKey, MapKey, MappingMethod,
    MappingValue, ObjectRef, ObjectValue, SequenceKind, SequenceMethod, SequenceValue,
    SliceBounds, UserFunction, Value,
};

#[cfg(test)]
mod tests;
