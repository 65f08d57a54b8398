//! Structured non-local exits.
//!
//! Statement execution returns `ExecResult`; the error side carries a
//! `ControlAction`. Function bodies absorb `Return`, loop bodies absorb
//! `Break`/`Continue`, and `try` only ever inspects `Raise`.

use std::fmt;
use std::rc::Rc;

use thiserror::Error;

use crate::builtins::{exception_class, to_str};
use crate::diagnostics::Backtrace;
use crate::errors::EvalError;
use crate::value::{ClassRef, ClassValue, ObjectRef, Value};

/// A pending unwind.
#[derive(Debug)]
pub enum ControlAction {
    Return(Value),
    Break,
    Continue,
    Raise(Box<Exception>),
}

impl From<EvalError> for ControlAction {
    #[cold]
    fn from(err: EvalError) -> Self {
        ControlAction::Raise(Box::new(Exception::from_error(&err)))
    }
}

/// Result of executing a statement or evaluating an expression.
pub type ExecResult<T = Value> = Result<T, ControlAction>;

/// A raised exception: an instance of a `BaseException` subclass plus the
/// call stack captured where it was raised.
#[derive(Clone)]
pub struct Exception {
    instance: ObjectRef,
    backtrace: Option<Backtrace>,
}

impl Exception {
    /// Wrap an engine error in an instance of the matching builtin class.
    pub fn from_error(err: &EvalError) -> Self {
        let class = exception_class(err.kind);
        let instance = ClassValue::create_object(&class);
        instance.set_attr(Rc::from("message"), Value::string(&err.message));
        instance.set_attr(
            Rc::from("args"),
            Value::tuple(vec![Value::string(&err.message)]),
        );
        Exception {
            instance,
            backtrace: None,
        }
    }

    /// Wrap a script-created exception instance.
    pub fn from_instance(instance: ObjectRef) -> Self {
        Exception {
            instance,
            backtrace: None,
        }
    }

    /// Class name of the exception.
    pub fn type_name(&self) -> &str {
        self.instance.class().name()
    }

    pub fn class(&self) -> &ClassRef {
        self.instance.class()
    }

    /// The exception's message (`str(e)`).
    pub fn message(&self) -> String {
        to_str(&self.value())
    }

    /// The instance as a script value.
    pub fn value(&self) -> Value {
        Value::Object(Rc::clone(&self.instance))
    }

    pub fn is_instance_of(&self, class: &ClassValue) -> bool {
        self.instance.is_instance_of(class)
    }

    pub fn backtrace(&self) -> Option<&Backtrace> {
        self.backtrace.as_ref()
    }

    pub(crate) fn set_backtrace(&mut self, backtrace: Backtrace) {
        self.backtrace = Some(backtrace);
    }
}

impl fmt::Display for Exception {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let message = self.message();
        if message.is_empty() {
            f.write_str(self.type_name())
        } else {
            write!(f, "{}: {message}", self.type_name())
        }
    }
}

impl fmt::Debug for Exception {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Exception")
            .field("type", &self.type_name())
            .field("message", &self.message())
            .finish_non_exhaustive()
    }
}

/// A fatal unwind that reached the program boundary.
#[derive(Debug, Error)]
pub enum RunError {
    #[error("{0}")]
    Uncaught(Box<Exception>),
    #[error("'return' outside function")]
    ReturnOutsideFunction,
    #[error("'break' outside loop")]
    BreakOutsideLoop,
    #[error("'continue' not properly in loop")]
    ContinueOutsideLoop,
}

impl RunError {
    /// The uncaught exception, if this is one.
    pub fn exception(&self) -> Option<&Exception> {
        match self {
            RunError::Uncaught(exc) => Some(exc.as_ref()),
            _ => None,
        }
    }
}

impl From<ControlAction> for RunError {
    fn from(action: ControlAction) -> Self {
        match action {
            ControlAction::Raise(exc) => RunError::Uncaught(exc),
            ControlAction::Return(_) => RunError::ReturnOutsideFunction,
            ControlAction::Break => RunError::BreakOutsideLoop,
            ControlAction::Continue => RunError::ContinueOutsideLoop,
        }
    }
}
