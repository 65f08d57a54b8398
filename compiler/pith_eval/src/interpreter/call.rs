//! Function calls and class instantiation.

use std::rc::Rc;

use pith_ir::{Arg, Instruction, Name};

use super::frame_guard::FrameGuard;
use super::Interpreter;
use crate::builtins::{call_builtin, reject_keywords};
use crate::diagnostics::{CallStack, StackFrame};
use crate::environment::{Closure, ScopeKind};
use crate::errors::{not_callable, recursion_limit, takes_no_arguments};
use crate::exec::args::ArgumentSet;
use crate::unwind::{ControlAction, ExecResult};
use crate::value::{Builtin, Callee, ClassRef, ClassValue, FunctionValue, ObjectRef, UserFunction, Value};

impl Interpreter {
    /// Call `func` with the arguments at `site`, evaluated in the caller.
    pub(super) fn call_function(
        &self,
        func: &FunctionValue,
        args: &[Arg],
        site: &Instruction,
        call_stack: &mut CallStack,
        closure: &Closure,
    ) -> ExecResult {
        match func.callee() {
            Callee::Builtin(builtin) => {
                let values = self.eval_builtin_args(*builtin, args, call_stack, closure)?;
                Ok(call_builtin(*builtin, func.receiver(), values, &self.print_handler)?)
            }
            Callee::User(user) => {
                let mut binder = ArgumentSet::new(&user.def.name, &user.def.params);

                let mut positional: Vec<Value> = func.receiver().cloned().into_iter().collect();
                for arg in args {
                    if let Arg::Positional(expr) = arg {
                        positional.push(self.eval(expr, call_stack, closure, None)?);
                    }
                }
                binder.bind_positional(positional)?;

                for arg in args {
                    if let Arg::Keyword(name, expr) = arg {
                        let value = self.eval(expr, call_stack, closure, None)?;
                        binder.bind_keyword(Name::clone(name), value)?;
                    }
                }

                let bound = binder.finish(&user.defaults)?;
                self.invoke(user, bound, site, call_stack)
            }
        }
    }

    /// Builtins accept positional arguments only; they never push a frame.
    fn eval_builtin_args(
        &self,
        builtin: Builtin,
        args: &[Arg],
        call_stack: &mut CallStack,
        closure: &Closure,
    ) -> ExecResult<Vec<Value>> {
        let keyword_count = args
            .iter()
            .filter(|arg| matches!(arg, Arg::Keyword(..)))
            .count();
        reject_keywords(builtin, keyword_count)?;
        args.iter()
            .map(|arg| self.eval(arg.value(), call_stack, closure, None))
            .collect()
    }

    /// Run a user function body in a fresh scope on top of its captured closure.
    #[tracing::instrument(
        level = "debug",
        skip_all,
        fields(function = %user.def.name, depth = call_stack.call_depth())
    )]
    fn invoke(
        &self,
        user: &UserFunction,
        bound: Vec<(Name, Value)>,
        site: &Instruction,
        call_stack: &mut CallStack,
    ) -> ExecResult {
        if let Some(max) = self.max_call_depth {
            if call_stack.call_depth() >= max {
                return Err(recursion_limit().into());
            }
        }

        let scope = user.closure.extend(ScopeKind::Function);
        for (name, value) in bound {
            scope.define(name, value);
        }

        let (line, expression) = call_site(site, call_stack.current_frame());
        let mut frame = FrameGuard::enter(call_stack, line, expression, Name::clone(&user.def.name));
        match self.exec_block(&user.def.body, &mut frame, &scope) {
            Ok(()) => Ok(Value::None),
            Err(ControlAction::Return(value)) => Ok(value),
            Err(other) => Err(other),
        }
    }

    /// `Class(...)`: build the instance, then run `__init__` if one is found.
    ///
    /// A class with no `__init__` anywhere on its inheritance chain accepts no
    /// arguments; passing any raises `TypeError: C() takes no arguments`.
    pub(super) fn construct(
        &self,
        class: &ClassRef,
        args: &[Arg],
        site: &Instruction,
        call_stack: &mut CallStack,
        closure: &Closure,
    ) -> ExecResult<ObjectRef> {
        let object = ClassValue::create_object(class);
        match class.lookup("__init__") {
            Some(Value::Function(init)) => {
                let bound = init.bind(Value::Object(Rc::clone(&object)));
                self.call_function(&bound, args, site, call_stack, closure)?;
            }
            Some(other) => return Err(not_callable(&other.type_name()).into()),
            None if args.is_empty() => {}
            None => return Err(takes_no_arguments(class.name()).into()),
        }
        Ok(object)
    }
}

/// Line and source text recorded for a new frame.
fn call_site(site: &Instruction, current: &StackFrame) -> (u32, Rc<str>) {
    if site.location.is_dummy() {
        return (current.line, Rc::clone(&current.expression));
    }
    let expression = if site.source.is_empty() {
        Rc::clone(&current.expression)
    } else {
        Rc::clone(&site.source)
    };
    (site.location.line, expression)
}
