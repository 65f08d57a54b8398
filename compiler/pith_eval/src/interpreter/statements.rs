//! Statement execution: assignment, control flow, definitions, exceptions.

use std::rc::Rc;

use pith_ir::{BinaryOp, ClassDef, FunctionDef, InstrKind, Instruction, Name, TryBlock};

use super::Interpreter;
use crate::builtins::is_exception_class;
use crate::diagnostics::CallStack;
use crate::environment::{Closure, ScopeKind};
use crate::errors::{
    cannot_assign_call, cannot_assign_expression, cannot_assign_literal, invalid_aug_target,
    invalid_base, invalid_except_clause, no_active_exception, not_an_exception, unpack_mismatch,
    EvalResult,
};
use crate::exec::control::{to_loop_action, LoopAction};
use crate::operators::evaluate_binary;
use crate::unwind::{ControlAction, Exception, ExecResult};
use crate::value::{ClassValue, FunctionValue, Value};

impl Interpreter {
    /// Bind `value` to an assignment target.
    pub(super) fn assign_to(
        &self,
        target: &Instruction,
        value: Value,
        call_stack: &mut CallStack,
        closure: &Closure,
    ) -> ExecResult<()> {
        if target.next.is_some() {
            return self.assign_through_chain(target, value, call_stack, closure);
        }
        match &target.kind {
            InstrKind::Name(name) => {
                closure.set_variable(Name::clone(name), value);
                Ok(())
            }
            InstrKind::Literal(_) => Err(cannot_assign_literal().into()),
            InstrKind::Parens { items, tuple } => {
                if let ([only], false) = (items.as_slice(), *tuple) {
                    return self.assign_to(only.value(), value, call_stack, closure);
                }
                let targets: Vec<&Instruction> = items.iter().map(|arg| arg.value()).collect();
                self.unpack(&targets, value, call_stack, closure)
            }
            InstrKind::Brackets(items) => {
                let targets: Vec<&Instruction> = items.iter().collect();
                self.unpack(&targets, value, call_stack, closure)
            }
            _ => Err(cannot_assign_expression().into()),
        }
    }

    fn unpack(
        &self,
        targets: &[&Instruction],
        value: Value,
        call_stack: &mut CallStack,
        closure: &Closure,
    ) -> ExecResult<()> {
        let values = value.iterate()?;
        if values.len() != targets.len() {
            return Err(unpack_mismatch(targets.len(), values.len()).into());
        }
        for (target, value) in targets.iter().zip(values) {
            self.assign_to(target, value, call_stack, closure)?;
        }
        Ok(())
    }

    /// `a.b.c = v` or `a[i][j] = v`: evaluate everything but the last
    /// suffix, then store through it.
    fn assign_through_chain(
        &self,
        target: &Instruction,
        value: Value,
        call_stack: &mut CallStack,
        closure: &Closure,
    ) -> ExecResult<()> {
        match &target.last_suffix().kind {
            InstrKind::Member(name) => {
                let (object, _) = self.eval_prefix(target, call_stack, closure)?;
                Ok(object.set_member(name, value)?)
            }
            InstrKind::Brackets(items) => {
                let (container, _) = self.eval_prefix(target, call_stack, closure)?;
                let key = self.eval_key(items, call_stack, closure)?;
                Ok(container.set_item(&key, value)?)
            }
            InstrKind::Parens { .. } => Err(cannot_assign_call().into()),
            _ => Err(cannot_assign_expression().into()),
        }
    }

    /// Evaluate a chain up to, but excluding, its last suffix.
    fn eval_prefix<'i>(
        &self,
        target: &'i Instruction,
        call_stack: &mut CallStack,
        closure: &Closure,
    ) -> ExecResult<(Value, &'i Instruction)> {
        let mut value = self.eval_node(target, call_stack, closure, None)?;
        let mut node = target;
        while let Some(next) = node.next.as_deref() {
            if next.next.is_none() {
                return Ok((value, next));
            }
            value = self.eval_node(next, call_stack, closure, Some(value))?;
            node = next;
        }
        Err(cannot_assign_expression().into())
    }

    /// `target op= value`. The target's prefix is evaluated once.
    pub(super) fn exec_aug_assign(
        &self,
        target: &Instruction,
        op: BinaryOp,
        value: &Instruction,
        call_stack: &mut CallStack,
        closure: &Closure,
    ) -> ExecResult<()> {
        if target.next.is_none() {
            let InstrKind::Name(name) = &target.kind else {
                return Err(invalid_aug_target().into());
            };
            let current = closure.get_variable(name)?;
            let rhs = self.eval(value, call_stack, closure, None)?;
            closure.set_variable(Name::clone(name), apply_in_place(op, current, &rhs)?);
            return Ok(());
        }

        match &target.last_suffix().kind {
            InstrKind::Member(name) => {
                let (object, _) = self.eval_prefix(target, call_stack, closure)?;
                let current = object.get_member(name)?;
                let rhs = self.eval(value, call_stack, closure, None)?;
                Ok(object.set_member(name, apply_in_place(op, current, &rhs)?)?)
            }
            InstrKind::Brackets(items) => {
                let (container, _) = self.eval_prefix(target, call_stack, closure)?;
                let key = self.eval_key(items, call_stack, closure)?;
                let current = container.get_item(&key)?;
                let rhs = self.eval(value, call_stack, closure, None)?;
                Ok(container.set_item(&key, apply_in_place(op, current, &rhs)?)?)
            }
            _ => Err(invalid_aug_target().into()),
        }
    }

    pub(super) fn exec_if(
        &self,
        test: &Instruction,
        body: &[Instruction],
        orelse: &[Instruction],
        call_stack: &mut CallStack,
        closure: &Closure,
    ) -> ExecResult<()> {
        if self.eval(test, call_stack, closure, None)?.is_truthy() {
            self.exec_block(body, call_stack, closure)
        } else {
            self.exec_block(orelse, call_stack, closure)
        }
    }

    pub(super) fn exec_while(
        &self,
        test: &Instruction,
        body: &[Instruction],
        orelse: &[Instruction],
        call_stack: &mut CallStack,
        closure: &Closure,
    ) -> ExecResult<()> {
        while self.eval(test, call_stack, closure, None)?.is_truthy() {
            if to_loop_action(self.exec_block(body, call_stack, closure))? == LoopAction::Break {
                return Ok(());
            }
        }
        self.exec_block(orelse, call_stack, closure)
    }

    /// Iterates over a snapshot of the iterable taken before the first pass.
    pub(super) fn exec_for(
        &self,
        target: &Instruction,
        iter: &Instruction,
        body: &[Instruction],
        orelse: &[Instruction],
        call_stack: &mut CallStack,
        closure: &Closure,
    ) -> ExecResult<()> {
        let items = self.eval(iter, call_stack, closure, None)?.iterate()?;
        for item in items {
            self.assign_to(target, item, call_stack, closure)?;
            if to_loop_action(self.exec_block(body, call_stack, closure))? == LoopAction::Break {
                return Ok(());
            }
        }
        self.exec_block(orelse, call_stack, closure)
    }

    /// Defaults are evaluated once, here, in the defining scope.
    pub(super) fn exec_function_def(
        &self,
        def: &Rc<FunctionDef>,
        call_stack: &mut CallStack,
        closure: &Closure,
    ) -> ExecResult<()> {
        let mut defaults = Vec::with_capacity(def.params.positional.len());
        for param in &def.params.positional {
            defaults.push(match &param.default {
                Some(expr) => Some(self.eval(expr, call_stack, closure, None)?),
                None => None,
            });
        }
        let function = FunctionValue::user(Rc::clone(def), closure.clone(), defaults);
        closure.set_variable(Name::clone(&def.name), Value::function(function));
        Ok(())
    }

    /// Run the class body in its own scope and turn its bindings into members.
    pub(super) fn exec_class_def(
        &self,
        def: &ClassDef,
        call_stack: &mut CallStack,
        closure: &Closure,
    ) -> ExecResult<()> {
        let mut supers = Vec::with_capacity(def.bases.len());
        for base in &def.bases {
            match self.eval(base, call_stack, closure, None)? {
                Value::Class(class) => supers.push(class),
                other => return Err(invalid_base(&other.type_name()).into()),
            }
        }

        let body_closure = closure.extend(ScopeKind::Class);
        self.exec_block(&def.body, call_stack, &body_closure)?;
        let members = body_closure.top().borrow_mut().take_bindings();

        tracing::debug!(
            class = %def.name,
            bases = supers.len(),
            members = members.len(),
            "defined class"
        );
        let class = ClassValue::new(Name::clone(&def.name), members, supers);
        closure.set_variable(Name::clone(&def.name), Value::Class(class));
        Ok(())
    }

    /// Build the unwind for a `raise` statement.
    ///
    /// Always yields an action: either the raised exception or the error
    /// produced while building it.
    pub(super) fn exec_raise(
        &self,
        value: Option<&Instruction>,
        site: &Instruction,
        call_stack: &mut CallStack,
        closure: &Closure,
    ) -> ControlAction {
        let exception = match value {
            None => match self.handling.borrow().last().cloned() {
                Some(active) => active,
                None => return no_active_exception().into(),
            },
            Some(expr) => match self.new_exception(expr, site, call_stack, closure) {
                Ok(exception) => Box::new(exception),
                Err(action) => return action,
            },
        };
        tracing::trace!(exception = %exception, "raise");
        ControlAction::Raise(exception)
    }

    fn new_exception(
        &self,
        expr: &Instruction,
        site: &Instruction,
        call_stack: &mut CallStack,
        closure: &Closure,
    ) -> ExecResult<Exception> {
        match self.eval(expr, call_stack, closure, None)? {
            Value::Class(class) if is_exception_class(&class) => {
                let instance = self.construct(&class, &[], site, call_stack, closure)?;
                Ok(Exception::from_instance(instance))
            }
            Value::Object(object) if is_exception_class(object.class()) => {
                Ok(Exception::from_instance(object))
            }
            _ => Err(not_an_exception().into()),
        }
    }

    /// `try` / `except` / `else` / `finally`.
    ///
    /// `else` runs only when an exception was raised and no handler matched,
    /// before the exception continues to unwind. `finally` always runs; an
    /// unwind it starts replaces whatever was pending.
    pub(super) fn exec_try(
        &self,
        block: &TryBlock,
        call_stack: &mut CallStack,
        closure: &Closure,
    ) -> ExecResult<()> {
        let outcome = match self.exec_block(&block.body, call_stack, closure) {
            Err(ControlAction::Raise(exception)) => {
                self.handle_exception(block, exception, call_stack, closure)
            }
            other => other,
        };
        self.exec_block(&block.finalbody, call_stack, closure)?;
        outcome
    }

    fn handle_exception(
        &self,
        block: &TryBlock,
        exception: Box<Exception>,
        call_stack: &mut CallStack,
        closure: &Closure,
    ) -> ExecResult<()> {
        for handler in &block.handlers {
            let matched = match &handler.kind {
                None => true,
                Some(kind) => {
                    let target = self.eval(kind, call_stack, closure, None)?;
                    exception_matches(&exception, &target)?
                }
            };
            if !matched {
                continue;
            }

            let handler_closure = closure.extend(ScopeKind::Block);
            if let Some(name) = &handler.name {
                handler_closure.define(Name::clone(name), exception.value());
            }
            self.handling.borrow_mut().push(exception);
            let result = self.exec_block(&handler.body, call_stack, &handler_closure);
            self.handling.borrow_mut().pop();
            return result;
        }

        self.exec_block(&block.orelse, call_stack, closure)?;
        Err(ControlAction::Raise(exception))
    }
}

/// Does an `except` clause naming `target` catch `exception`?
fn exception_matches(exception: &Exception, target: &Value) -> EvalResult<bool> {
    match target {
        Value::Class(class) if is_exception_class(class) => Ok(exception.is_instance_of(class)),
        Value::Sequence(seq) if !seq.is_list() => {
            for candidate in seq.items().iter() {
                if exception_matches(exception, candidate)? {
                    return Ok(true);
                }
            }
            Ok(false)
        }
        _ => Err(invalid_except_clause()),
    }
}

/// `+=` on a list extends it in place; every other operator rebinds.
fn apply_in_place(op: BinaryOp, current: Value, rhs: &Value) -> EvalResult {
    if let (BinaryOp::Add, Value::Sequence(seq)) = (op, &current) {
        if seq.is_list() {
            seq.extend(rhs.iterate()?);
            return Ok(current);
        }
    }
    evaluate_binary(op, &current, rhs)
}
