//! Error taxonomy and factory functions.
//!
//! Value-level operations fail with an `EvalError`: an `ExcType` plus a
//! message. The interpreter turns these into catchable exceptions (instances
//! of the builtin class named by the kind) when they cross a statement.
//!
//! Factory functions are the public API for creating errors; they keep the
//! message wording in one place.

use std::fmt::Write;

use strum::{Display, EnumIter, EnumString, IntoStaticStr};
use thiserror::Error;

use crate::Value;

/// Result of a value-level operation.
pub type EvalResult<T = Value> = Result<T, EvalError>;

/// Builtin exception classes.
///
/// Declared parents-first: every kind's `parent()` precedes it, which lets
/// the builtin scope create the classes in iteration order.
#[derive(
    Copy, Clone, Debug, PartialEq, Eq, Hash, Display, EnumString, IntoStaticStr, EnumIter,
)]
pub enum ExcType {
    BaseException,
    Exception,
    NameError,
    TypeError,
    ValueError,
    SyntaxError,
    AttributeError,
    LookupError,
    IndexError,
    KeyError,
    ArithmeticError,
    ZeroDivisionError,
    RuntimeError,
    RecursionError,
    MemoryError,
    UnknownError,
}

impl ExcType {
    /// Direct superclass in the builtin hierarchy.
    pub const fn parent(self) -> Option<ExcType> {
        match self {
            Self::BaseException => None,
            Self::Exception => Some(Self::BaseException),
            Self::IndexError | Self::KeyError => Some(Self::LookupError),
            Self::ZeroDivisionError => Some(Self::ArithmeticError),
            Self::RecursionError => Some(Self::RuntimeError),
            Self::NameError
            | Self::TypeError
            | Self::ValueError
            | Self::SyntaxError
            | Self::AttributeError
            | Self::LookupError
            | Self::ArithmeticError
            | Self::RuntimeError
            | Self::MemoryError
            | Self::UnknownError => Some(Self::Exception),
        }
    }

    /// Class name as seen by scripts.
    #[inline]
    pub fn name(self) -> &'static str {
        self.into()
    }
}

/// A runtime error raised by a value-level operation.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("{kind}: {message}")]
pub struct EvalError {
    pub kind: ExcType,
    pub message: String,
}

impl EvalError {
    /// Create an error of the given kind.
    pub fn new(kind: ExcType, message: impl Into<String>) -> Self {
        EvalError {
            kind,
            message: message.into(),
        }
    }
}

// Name and attribute errors

/// Unbound identifier.
#[cold]
pub fn undefined_variable(name: &str) -> EvalError {
    EvalError::new(ExcType::NameError, format!("name '{name}' is not defined"))
}

/// Missing attribute on an object.
#[cold]
pub fn no_attribute(type_name: &str, attr: &str) -> EvalError {
    EvalError::new(
        ExcType::AttributeError,
        format!("'{type_name}' object has no attribute '{attr}'"),
    )
}

/// Missing attribute on a class.
#[cold]
pub fn class_no_attribute(class_name: &str, attr: &str) -> EvalError {
    EvalError::new(
        ExcType::AttributeError,
        format!("type object '{class_name}' has no attribute '{attr}'"),
    )
}

/// Member access on a variant that has no members.
#[cold]
pub fn no_members(type_name: &str, attr: &str) -> EvalError {
    EvalError::new(
        ExcType::TypeError,
        format!("'{type_name}' object has no attribute '{attr}'"),
    )
}

/// Attribute assignment on a variant that has no attribute map.
#[cold]
pub fn cannot_set_attribute(type_name: &str, attr: &str) -> EvalError {
    EvalError::new(
        ExcType::TypeError,
        format!("cannot set attribute '{attr}' on '{type_name}' object"),
    )
}

// Indexing errors

/// Indexing a variant that is not a container.
#[cold]
pub fn not_subscriptable(type_name: &str) -> EvalError {
    EvalError::new(
        ExcType::TypeError,
        format!("'{type_name}' object is not subscriptable"),
    )
}

/// Item assignment on an immutable or non-container variant.
#[cold]
pub fn unsupported_item_assignment(type_name: &str) -> EvalError {
    EvalError::new(
        ExcType::TypeError,
        format!("'{type_name}' object does not support item assignment"),
    )
}

/// Index of the wrong variant for a sequence or string.
#[cold]
pub fn invalid_index_type(container: &str, index_type: &str) -> EvalError {
    EvalError::new(
        ExcType::TypeError,
        format!("{container} indices must be integers or slices, not {index_type}"),
    )
}

/// Index outside a sequence.
#[cold]
pub fn index_out_of_range(container: &str) -> EvalError {
    EvalError::new(ExcType::IndexError, format!("{container} index out of range"))
}

/// Missing mapping key. The message is the key's repr.
#[cold]
pub fn key_not_found(key_repr: &str) -> EvalError {
    EvalError::new(ExcType::KeyError, key_repr)
}

/// Key variant not accepted by mappings.
#[cold]
pub fn unhashable(type_name: &str) -> EvalError {
    EvalError::new(ExcType::TypeError, format!("unhashable type: '{type_name}'"))
}

/// Mapping literal key other than a number or string.
#[cold]
pub fn invalid_literal_key(type_name: &str) -> EvalError {
    EvalError::new(
        ExcType::TypeError,
        format!("mapping literal keys must be numbers or strings, not '{type_name}'"),
    )
}

/// Slice bound that is not an integer.
#[cold]
pub fn slice_index_not_integer() -> EvalError {
    EvalError::new(
        ExcType::TypeError,
        "slice indices must be integers or None",
    )
}

/// Zero step in a slice.
#[cold]
pub fn slice_step_zero() -> EvalError {
    EvalError::new(ExcType::ValueError, "slice step cannot be zero")
}

/// Extended slice assignment with a differently sized sequence.
#[cold]
pub fn extended_slice_size_mismatch(given: usize, expected: usize) -> EvalError {
    EvalError::new(
        ExcType::ValueError,
        format!("attempt to assign sequence of size {given} to extended slice of size {expected}"),
    )
}

// Operator errors

/// Binary operator applied to unsupported operand variants.
#[cold]
pub fn unsupported_operands(op: &str, left: &str, right: &str) -> EvalError {
    EvalError::new(
        ExcType::TypeError,
        format!("unsupported operand type(s) for {op}: '{left}' and '{right}'"),
    )
}

/// Ordering comparison between incomparable variants.
#[cold]
pub fn not_comparable(op: &str, left: &str, right: &str) -> EvalError {
    EvalError::new(
        ExcType::TypeError,
        format!("'{op}' not supported between instances of '{left}' and '{right}'"),
    )
}

/// Unary operator applied to an unsupported operand.
#[cold]
pub fn bad_unary_operand(op: &str, type_name: &str) -> EvalError {
    EvalError::new(
        ExcType::TypeError,
        format!("bad operand type for unary {op}: '{type_name}'"),
    )
}

/// Membership test against a non-container.
#[cold]
pub fn not_a_container(type_name: &str) -> EvalError {
    EvalError::new(
        ExcType::TypeError,
        format!("argument of type '{type_name}' is not iterable"),
    )
}

/// Division by zero.
#[cold]
pub fn division_by_zero() -> EvalError {
    EvalError::new(ExcType::ZeroDivisionError, "division by zero")
}

/// Floor division or modulo by zero.
#[cold]
pub fn modulo_by_zero() -> EvalError {
    EvalError::new(ExcType::ZeroDivisionError, "integer division or modulo by zero")
}

/// Repetition count that is not an integer.
#[cold]
pub fn non_integer_repeat(type_name: &str) -> EvalError {
    EvalError::new(
        ExcType::TypeError,
        format!("can't multiply sequence by non-int of type '{type_name}'"),
    )
}

// Iteration and unpacking errors

/// Iterating a non-iterable variant.
#[cold]
pub fn not_iterable(type_name: &str) -> EvalError {
    EvalError::new(
        ExcType::TypeError,
        format!("'{type_name}' object is not iterable"),
    )
}

/// Unpacking into a different number of targets.
#[cold]
pub fn unpack_mismatch(expected: usize, got: usize) -> EvalError {
    let message = if got > expected {
        format!("too many values to unpack (expected {expected})")
    } else {
        format!("not enough values to unpack (expected {expected}, got {got})")
    };
    EvalError::new(ExcType::ValueError, message)
}

// Assignment target errors

/// `1 = x`
#[cold]
pub fn cannot_assign_literal() -> EvalError {
    EvalError::new(ExcType::SyntaxError, "cannot assign to literal")
}

/// `f() = x`
#[cold]
pub fn cannot_assign_call() -> EvalError {
    EvalError::new(ExcType::SyntaxError, "cannot assign to function call")
}

/// Any other invalid assignment target.
#[cold]
pub fn cannot_assign_expression() -> EvalError {
    EvalError::new(ExcType::SyntaxError, "cannot assign to expression")
}

/// Invalid target for `+=` and friends.
#[cold]
pub fn invalid_aug_target() -> EvalError {
    EvalError::new(
        ExcType::SyntaxError,
        "illegal expression for augmented assignment",
    )
}

/// A node that cannot appear where it was found (e.g. a slice outside `[]`).
#[cold]
pub fn invalid_syntax(detail: &str) -> EvalError {
    EvalError::new(ExcType::SyntaxError, format!("invalid syntax: {detail}"))
}

// Call errors

/// Calling a value that is not a function or class.
#[cold]
pub fn not_callable(type_name: &str) -> EvalError {
    EvalError::new(
        ExcType::TypeError,
        format!("'{type_name}' object is not callable"),
    )
}

/// Too many positional arguments and no `*args` collector.
#[cold]
pub fn too_many_positional(function: &str, expected: usize, got: usize) -> EvalError {
    let plural = if expected == 1 { "" } else { "s" };
    EvalError::new(
        ExcType::TypeError,
        format!("{function}() takes {expected} positional argument{plural} but {got} were given"),
    )
}

/// Keyword argument naming a parameter already bound positionally.
#[cold]
pub fn multiple_values(function: &str, param: &str) -> EvalError {
    EvalError::new(
        ExcType::TypeError,
        format!("{function}() got multiple values for argument '{param}'"),
    )
}

/// Keyword arguments matching no parameter, reported together.
#[cold]
pub fn unknown_keywords<S: AsRef<str>>(function: &str, names: &[S]) -> EvalError {
    let mut message = format!("{function}() got unknown keyword arguments: ");
    for (i, name) in names.iter().enumerate() {
        if i > 0 {
            message.push_str(", ");
        }
        let _ = write!(message, "{}", name.as_ref());
    }
    EvalError::new(ExcType::TypeError, message)
}

/// Parameter without a supplied value or default.
#[cold]
pub fn missing_argument(function: &str, param: &str) -> EvalError {
    EvalError::new(
        ExcType::TypeError,
        format!("{function}() missing required argument '{param}'"),
    )
}

/// Builtin called with keyword arguments.
#[cold]
pub fn no_keyword_arguments(function: &str) -> EvalError {
    EvalError::new(
        ExcType::TypeError,
        format!("{function}() takes no keyword arguments"),
    )
}

/// Builtin called with the wrong number of arguments.
#[cold]
pub fn wrong_arg_count(function: &str, expected: &str, got: usize) -> EvalError {
    EvalError::new(
        ExcType::TypeError,
        format!("{function}() takes {expected} ({got} given)"),
    )
}

/// Builtin argument of the wrong variant.
#[cold]
pub fn wrong_arg_type(function: &str, expected: &str, got: &str) -> EvalError {
    EvalError::new(
        ExcType::TypeError,
        format!("{function}() argument must be {expected}, not '{got}'"),
    )
}

/// Constructor arguments for a class without `__init__`.
#[cold]
pub fn takes_no_arguments(class_name: &str) -> EvalError {
    EvalError::new(
        ExcType::TypeError,
        format!("{class_name}() takes no arguments"),
    )
}

/// Call depth limit reached.
#[cold]
pub fn recursion_limit() -> EvalError {
    EvalError::new(ExcType::RecursionError, "maximum recursion depth exceeded")
}

/// Ordering two containers that lead back to the same comparison.
#[cold]
pub fn recursive_comparison() -> EvalError {
    EvalError::new(
        ExcType::RecursionError,
        "maximum recursion depth exceeded in comparison",
    )
}

// Class and exception errors

/// Class definition listing something other than a class as a base.
#[cold]
pub fn invalid_base(type_name: &str) -> EvalError {
    EvalError::new(
        ExcType::TypeError,
        format!("bases must be classes, not '{type_name}'"),
    )
}

/// `raise` with a value that does not derive from `BaseException`.
#[cold]
pub fn not_an_exception() -> EvalError {
    EvalError::new(
        ExcType::UnknownError,
        "unknown error: exceptions must derive from BaseException",
    )
}

/// `except` clause naming something that is not an exception class.
#[cold]
pub fn invalid_except_clause() -> EvalError {
    EvalError::new(
        ExcType::TypeError,
        "catching classes that do not inherit from BaseException is not allowed",
    )
}

/// Bare `raise` outside of an exception handler.
#[cold]
pub fn no_active_exception() -> EvalError {
    EvalError::new(ExcType::RuntimeError, "no active exception to reraise")
}

// Builtin method errors

/// `list.remove(x)`/`list.index(x)` for a missing element.
#[cold]
pub fn not_in_list(method: &str) -> EvalError {
    EvalError::new(
        ExcType::ValueError,
        format!("list.{method}(x): x not in list"),
    )
}

/// `pop()` on an empty list.
#[cold]
pub fn pop_from_empty() -> EvalError {
    EvalError::new(ExcType::IndexError, "pop from empty list")
}

/// Zero step given to `range()`.
#[cold]
pub fn range_step_zero() -> EvalError {
    EvalError::new(ExcType::ValueError, "range() arg 3 must not be zero")
}

// Resource errors

/// A string, list or tuple that would exceed `MAX_CONTAINER_LEN`.
#[cold]
pub fn result_too_large(operation: &str) -> EvalError {
    EvalError::new(
        ExcType::MemoryError,
        format!("{operation} result is too large"),
    )
}
