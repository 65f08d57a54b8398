//! Function values: user functions, builtins, and bound methods.

use std::fmt;
use std::rc::Rc;

use pith_ir::FunctionDef;

use crate::environment::Closure;

use super::{MappingMethod, SequenceMethod, Value};

/// Functions implemented by the engine.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Builtin {
    Print,
    Len,
    Range,
    Str,
    IsInstance,
    /// `BaseException.__init__`
    ExceptionInit,
    Sequence(SequenceMethod),
    Mapping(MappingMethod),
}

impl Builtin {
    /// Builtins bound by name in the builtin scope.
    pub const GLOBALS: [Builtin; 5] = [
        Builtin::Print,
        Builtin::Len,
        Builtin::Range,
        Builtin::Str,
        Builtin::IsInstance,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Builtin::Print => "print",
            Builtin::Len => "len",
            Builtin::Range => "range",
            Builtin::Str => "str",
            Builtin::IsInstance => "isinstance",
            Builtin::ExceptionInit => "__init__",
            Builtin::Sequence(method) => method.name(),
            Builtin::Mapping(method) => method.name(),
        }
    }
}

/// A function defined by a script.
pub struct UserFunction {
    pub def: Rc<FunctionDef>,
    /// The chain the function was defined in.
    pub closure: Closure,
    /// Default values, one slot per positional parameter, evaluated at
    /// definition time.
    pub defaults: Vec<Option<Value>>,
}

/// What a function value runs when called.
#[derive(Clone)]
pub enum Callee {
    User(Rc<UserFunction>),
    Builtin(Builtin),
}

/// A callable value, optionally bound to a receiver.
#[derive(Clone)]
pub struct FunctionValue {
    callee: Callee,
    receiver: Option<Value>,
}

impl FunctionValue {
    pub fn user(def: Rc<FunctionDef>, closure: Closure, defaults: Vec<Option<Value>>) -> Self {
        FunctionValue {
            callee: Callee::User(Rc::new(UserFunction {
                def,
                closure,
                defaults,
            })),
            receiver: None,
        }
    }

    pub fn builtin(builtin: Builtin) -> Self {
        FunctionValue {
            callee: Callee::Builtin(builtin),
            receiver: None,
        }
    }

    #[inline]
    pub fn callee(&self) -> &Callee {
        &self.callee
    }

    /// The pre-bound first argument (`self` for methods).
    #[inline]
    pub fn receiver(&self) -> Option<&Value> {
        self.receiver.as_ref()
    }

    pub fn name(&self) -> &str {
        match &self.callee {
            Callee::User(func) => &func.def.name,
            Callee::Builtin(builtin) => builtin.name(),
        }
    }

    /// Copy of this function with `receiver` pre-bound.
    #[must_use]
    pub fn bind(&self, receiver: Value) -> FunctionValue {
        FunctionValue {
            callee: self.callee.clone(),
            receiver: Some(receiver),
        }
    }

    /// Identity comparison. Two bound methods are the same when they wrap the
    /// same function and receiver.
    pub fn same_as(&self, other: &FunctionValue) -> bool {
        let same_callee = match (&self.callee, &other.callee) {
            (Callee::User(a), Callee::User(b)) => Rc::ptr_eq(a, b),
            (Callee::Builtin(a), Callee::Builtin(b)) => a == b,
            _ => false,
        };
        same_callee
            && match (&self.receiver, &other.receiver) {
                (None, None) => true,
                (Some(a), Some(b)) => a.is(b),
                _ => false,
            }
    }

    /// Stable identity of the wrapped function, ignoring the receiver.
    pub(crate) fn callee_addr(&self) -> usize {
        match &self.callee {
            Callee::User(func) => Rc::as_ptr(func) as usize,
            Callee::Builtin(_) => 0,
        }
    }
}

impl fmt::Debug for FunctionValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FunctionValue")
            .field("name", &self.name())
            .field("bound", &self.receiver.is_some())
            .finish()
    }
}
