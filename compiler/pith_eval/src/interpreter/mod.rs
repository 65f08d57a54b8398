//! Tree-walking interpreter.
//!
//! Every node is evaluated through one entry point, `eval`, which takes the
//! call stack, the closure, and an optional *context*: the value produced by
//! the node before it in a suffix chain. The context decides what a
//! parenthesis, bracket or member node means:
//!
//! | Node       | No context            | Function | Class       | Other value |
//! |------------|-----------------------|----------|-------------|-------------|
//! | `( ... )`  | grouping / tuple      | call     | instantiate | TypeError   |
//! | `[ ... ]`  | list literal          | index    | index       | index       |
//! | `.name`    | SyntaxError           | member   | member      | member      |
//!
//! Statements are nodes too; they evaluate to `None`.

mod builder;
mod call;
mod frame_guard;
mod statements;

use std::cell::RefCell;
use std::rc::Rc;
use std::str::FromStr;

use pith_ir::{Arg, BinaryOp, InstrKind, Instruction, Literal};

use crate::diagnostics::CallStack;
use crate::environment::Closure;
use crate::errors::{invalid_literal_key, invalid_syntax, not_callable, slice_index_not_integer};
use crate::operators::{evaluate_binary, evaluate_unary};
use crate::print_handler::SharedPrintHandler;
use crate::stack::ensure_sufficient_stack;
use crate::unwind::{ControlAction, Exception, ExecResult, RunError};
use crate::value::{ItemKey, MapKey, MappingValue, SequenceMethod, SliceBounds, Value};

pub use builder::InterpreterBuilder;

/// Call depth limit applied unless the builder overrides it.
pub const DEFAULT_MAX_CALL_DEPTH: usize = 1000;

/// The execution engine.
///
/// An interpreter holds configuration and the stack of exceptions currently
/// being handled (for bare `raise`). Program state lives in the `Closure`
/// and `CallStack` handed to `run`, so one interpreter can run many units.
pub struct Interpreter {
    print_handler: SharedPrintHandler,
    max_call_depth: Option<usize>,
    file_name: Rc<str>,
    handling: RefCell<Vec<Box<Exception>>>,
}

impl Default for Interpreter {
    fn default() -> Self {
        InterpreterBuilder::new().build()
    }
}

impl Interpreter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn print_handler(&self) -> &SharedPrintHandler {
        &self.print_handler
    }

    pub fn max_call_depth(&self) -> Option<usize> {
        self.max_call_depth
    }

    /// A call stack rooted at the configured file name.
    pub fn new_call_stack(&self) -> CallStack {
        CallStack::new(&self.file_name)
    }

    /// Execute a compilation unit against `closure`.
    ///
    /// Bindings made by the unit stay in `closure` for the host to read.
    /// An unwind that escapes the unit is fatal and returned as `RunError`.
    #[tracing::instrument(level = "debug", skip_all, fields(statements = instructions.len()))]
    pub fn run(
        &self,
        instructions: &[Instruction],
        call_stack: &mut CallStack,
        closure: &Closure,
    ) -> Result<(), RunError> {
        self.exec_block(instructions, call_stack, closure)
            .map_err(|action| {
                let err = RunError::from(action);
                tracing::debug!(error = %err, "unwind reached the program boundary");
                err
            })
    }

    /// Execute statements in order, stopping at the first unwind.
    pub(crate) fn exec_block(
        &self,
        body: &[Instruction],
        call_stack: &mut CallStack,
        closure: &Closure,
    ) -> ExecResult<()> {
        for stmt in body {
            self.exec_statement(stmt, call_stack, closure)?;
        }
        Ok(())
    }

    /// Execute one statement, recording its position on the top frame.
    ///
    /// A raise that leaves the statement without a trace gets one here, while
    /// the frames it passed through are still on the stack.
    fn exec_statement(
        &self,
        stmt: &Instruction,
        call_stack: &mut CallStack,
        closure: &Closure,
    ) -> ExecResult<()> {
        if !stmt.location.is_dummy() {
            call_stack.set_location(stmt.location.line, Rc::clone(&stmt.source));
        }
        match ensure_sufficient_stack(|| self.eval(stmt, call_stack, closure, None)) {
            Ok(_) => Ok(()),
            Err(ControlAction::Raise(mut exception)) => {
                if exception.backtrace().is_none() {
                    exception.set_backtrace(call_stack.snapshot());
                }
                Err(ControlAction::Raise(exception))
            }
            Err(other) => Err(other),
        }
    }

    /// Evaluate a node and its whole suffix chain.
    pub fn eval(
        &self,
        instr: &Instruction,
        call_stack: &mut CallStack,
        closure: &Closure,
        context: Option<Value>,
    ) -> ExecResult {
        let mut value = self.eval_node(instr, call_stack, closure, context)?;
        let mut next = instr.next.as_deref();
        while let Some(node) = next {
            value = self.eval_node(node, call_stack, closure, Some(value))?;
            next = node.next.as_deref();
        }
        Ok(value)
    }

    /// Evaluate a single node, ignoring its `next` link.
    fn eval_node(
        &self,
        node: &Instruction,
        call_stack: &mut CallStack,
        closure: &Closure,
        context: Option<Value>,
    ) -> ExecResult {
        match &node.kind {
            InstrKind::Literal(literal) => Ok(literal_value(literal)),
            InstrKind::Name(name) => Ok(closure.get_variable(name)?),
            InstrKind::Member(name) => match context {
                Some(target) => Ok(target.get_member(name)?),
                None => Err(invalid_syntax("attribute access without a target").into()),
            },
            InstrKind::Parens { items, tuple } => match context {
                None => self.eval_group(items, *tuple, call_stack, closure),
                Some(Value::Function(func)) => {
                    self.call_function(&func, items, node, call_stack, closure)
                }
                Some(Value::Class(class)) => self
                    .construct(&class, items, node, call_stack, closure)
                    .map(Value::Object),
                Some(other) => Err(not_callable(&other.type_name()).into()),
            },
            InstrKind::Brackets(items) => match context {
                None => {
                    let mut values = Vec::with_capacity(items.len());
                    for item in items {
                        values.push(self.eval(item, call_stack, closure, None)?);
                    }
                    Ok(Value::list(values))
                }
                Some(target) => self.eval_index(&target, items, call_stack, closure),
            },
            InstrKind::Slice { .. } => Err(invalid_syntax("slice outside of an index").into()),
            InstrKind::Braces(pairs) => self.eval_mapping(pairs, call_stack, closure),
            InstrKind::Unary { op, operand } => {
                let value = self.eval(operand, call_stack, closure, None)?;
                Ok(evaluate_unary(*op, &value)?)
            }
            InstrKind::Binary { op, lhs, rhs } => {
                self.eval_binary(*op, lhs, rhs, call_stack, closure)
            }

            // Statements
            InstrKind::Assign { target, value } => {
                let value = self.eval(value, call_stack, closure, None)?;
                self.assign_to(target, value, call_stack, closure)?;
                Ok(Value::None)
            }
            InstrKind::AugAssign { target, op, value } => {
                self.exec_aug_assign(target, *op, value, call_stack, closure)?;
                Ok(Value::None)
            }
            InstrKind::If { test, body, orelse } => {
                self.exec_if(test, body, orelse, call_stack, closure)?;
                Ok(Value::None)
            }
            InstrKind::While { test, body, orelse } => {
                self.exec_while(test, body, orelse, call_stack, closure)?;
                Ok(Value::None)
            }
            InstrKind::For {
                target,
                iter,
                body,
                orelse,
            } => {
                self.exec_for(target, iter, body, orelse, call_stack, closure)?;
                Ok(Value::None)
            }
            InstrKind::FunctionDef(def) => {
                self.exec_function_def(def, call_stack, closure)?;
                Ok(Value::None)
            }
            InstrKind::ClassDef(def) => {
                self.exec_class_def(def, call_stack, closure)?;
                Ok(Value::None)
            }
            InstrKind::Return(value) => {
                let value = match value {
                    Some(expr) => self.eval(expr, call_stack, closure, None)?,
                    None => Value::None,
                };
                Err(ControlAction::Return(value))
            }
            InstrKind::Break => Err(ControlAction::Break),
            InstrKind::Continue => Err(ControlAction::Continue),
            InstrKind::Pass => Ok(Value::None),
            InstrKind::Raise(value) => {
                Err(self.exec_raise(value.as_deref(), node, call_stack, closure))
            }
            InstrKind::Try(block) => {
                self.exec_try(block, call_stack, closure)?;
                Ok(Value::None)
            }
        }
    }

    /// `( ... )` with no preceding value.
    fn eval_group(
        &self,
        items: &[Arg],
        tuple: bool,
        call_stack: &mut CallStack,
        closure: &Closure,
    ) -> ExecResult {
        let mut values = Vec::with_capacity(items.len());
        for item in items {
            match item {
                Arg::Positional(expr) => values.push(self.eval(expr, call_stack, closure, None)?),
                Arg::Keyword(..) => {
                    return Err(invalid_syntax("keyword argument outside of a call").into())
                }
            }
        }
        if values.len() == 1 && !tuple {
            return Ok(values.swap_remove(0));
        }
        Ok(Value::tuple(values))
    }

    /// `target[ ... ]`
    fn eval_index(
        &self,
        target: &Value,
        items: &[Instruction],
        call_stack: &mut CallStack,
        closure: &Closure,
    ) -> ExecResult {
        // seq["append"] names the method rather than indexing.
        if let (Value::Sequence(_), [only]) = (target, items) {
            if let Some(name) = only.as_str_literal() {
                if SequenceMethod::from_str(name).is_ok() {
                    return Ok(target.get_member(name)?);
                }
            }
        }
        let key = self.eval_key(items, call_stack, closure)?;
        Ok(target.get_item(&key)?)
    }

    /// Evaluate the contents of an index suffix.
    fn eval_key(
        &self,
        items: &[Instruction],
        call_stack: &mut CallStack,
        closure: &Closure,
    ) -> ExecResult<ItemKey> {
        match items {
            [] => Err(invalid_syntax("empty index").into()),
            [only] => match &only.kind {
                InstrKind::Slice { lower, upper, step } if only.next.is_none() => {
                    let mut bound = |expr: &Option<Box<Instruction>>| -> ExecResult<Option<i64>> {
                        let Some(expr) = expr else { return Ok(None) };
                        match self.eval(expr, call_stack, closure, None)? {
                            Value::None => Ok(None),
                            value => value
                                .as_index()
                                .map(Some)
                                .ok_or_else(|| slice_index_not_integer().into()),
                        }
                    };
                    Ok(ItemKey::Slice(SliceBounds {
                        start: bound(lower)?,
                        stop: bound(upper)?,
                        step: bound(step)?,
                    }))
                }
                _ => Ok(ItemKey::Value(self.eval(only, call_stack, closure, None)?)),
            },
            many => {
                let mut values = Vec::with_capacity(many.len());
                for item in many {
                    values.push(self.eval(item, call_stack, closure, None)?);
                }
                Ok(ItemKey::Value(Value::tuple(values)))
            }
        }
    }

    /// `{ key: value, ... }`. Each value is evaluated before its key.
    fn eval_mapping(
        &self,
        pairs: &[(Instruction, Instruction)],
        call_stack: &mut CallStack,
        closure: &Closure,
    ) -> ExecResult {
        let mapping = MappingValue::new();
        for (key_expr, value_expr) in pairs {
            let value = self.eval(value_expr, call_stack, closure, None)?;
            let key = self.eval(key_expr, call_stack, closure, None)?;
            match key {
                Value::Number(_) | Value::Str(_) => mapping.insert(MapKey::from_value(&key)?, value),
                other => return Err(invalid_literal_key(&other.type_name()).into()),
            }
        }
        Ok(Value::Mapping(mapping))
    }

    fn eval_binary(
        &self,
        op: BinaryOp,
        lhs: &Instruction,
        rhs: &Instruction,
        call_stack: &mut CallStack,
        closure: &Closure,
    ) -> ExecResult {
        let left = self.eval(lhs, call_stack, closure, None)?;
        match op {
            BinaryOp::And if !left.is_truthy() => Ok(left),
            BinaryOp::Or if left.is_truthy() => Ok(left),
            BinaryOp::And | BinaryOp::Or => self.eval(rhs, call_stack, closure, None),
            _ => {
                let right = self.eval(rhs, call_stack, closure, None)?;
                Ok(evaluate_binary(op, &left, &right)?)
            }
        }
    }
}

fn literal_value(literal: &Literal) -> Value {
    match literal {
        Literal::Number(n) => Value::Number(*n),
        Literal::Str(s) => Value::Str(Rc::clone(s)),
        Literal::Bool(b) => Value::Bool(*b),
        Literal::None => Value::None,
    }
}
