//! Binary and unary operator implementations for the evaluator.
//!
//! Operands arrive already evaluated. `and`/`or` are short-circuited by the
//! interpreter; if they reach here both sides have been evaluated and the
//! usual operand is selected.
//!
//! Number/number arithmetic follows floor semantics for `//` and `%` (the
//! result of `%` takes the sign of the divisor). Booleans are not numbers.

use std::cmp::Ordering;

use pith_ir::{BinaryOp, UnaryOp};

use crate::errors::{
    bad_unary_operand, division_by_zero, modulo_by_zero, non_integer_repeat, not_a_container,
    not_comparable, recursive_comparison, result_too_large, unsupported_operands, EvalResult,
};
use crate::value::{CycleGuard, SequenceValue, Value, Walk, MAX_CONTAINER_LEN};

/// Evaluate a binary operation on two evaluated operands.
pub fn evaluate_binary(op: BinaryOp, left: &Value, right: &Value) -> EvalResult {
    match op {
        BinaryOp::Eq => Ok(Value::Bool(left.equals(right))),
        BinaryOp::NotEq => Ok(Value::Bool(!left.equals(right))),
        BinaryOp::Is => Ok(Value::Bool(left.is(right))),
        BinaryOp::IsNot => Ok(Value::Bool(!left.is(right))),
        BinaryOp::In => contains(right, left).map(Value::Bool),
        BinaryOp::NotIn => contains(right, left).map(|found| Value::Bool(!found)),
        BinaryOp::Lt | BinaryOp::LtEq | BinaryOp::Gt | BinaryOp::GtEq => {
            let ordering = compare(op, left, right)?;
            Ok(Value::Bool(ordering.is_some_and(|ord| match op {
                BinaryOp::Lt => ord == Ordering::Less,
                BinaryOp::LtEq => ord != Ordering::Greater,
                BinaryOp::Gt => ord == Ordering::Greater,
                _ => ord != Ordering::Less,
            })))
        }
        BinaryOp::And => Ok(if left.is_truthy() { right.clone() } else { left.clone() }),
        BinaryOp::Or => Ok(if left.is_truthy() { left.clone() } else { right.clone() }),
        BinaryOp::Add
        | BinaryOp::Sub
        | BinaryOp::Mul
        | BinaryOp::Div
        | BinaryOp::FloorDiv
        | BinaryOp::Mod
        | BinaryOp::Pow => arithmetic(op, left, right),
    }
}

/// Evaluate a unary operation.
pub fn evaluate_unary(op: UnaryOp, operand: &Value) -> EvalResult {
    match (op, operand) {
        (UnaryOp::Not, value) => Ok(Value::Bool(!value.is_truthy())),
        (UnaryOp::Neg, Value::Number(n)) => Ok(Value::Number(-n)),
        (UnaryOp::Pos, Value::Number(n)) => Ok(Value::Number(*n)),
        (UnaryOp::Neg | UnaryOp::Pos, other) => {
            Err(bad_unary_operand(op.as_symbol(), &other.type_name()))
        }
    }
}

fn arithmetic(op: BinaryOp, left: &Value, right: &Value) -> EvalResult {
    match (left, right) {
        (Value::Number(a), Value::Number(b)) => number_binary(op, *a, *b),
        (Value::Str(a), Value::Str(b)) if op == BinaryOp::Add => {
            let mut joined = String::with_capacity(a.len() + b.len());
            joined.push_str(a);
            joined.push_str(b);
            Ok(Value::string(&joined))
        }
        (Value::Sequence(a), Value::Sequence(b))
            if op == BinaryOp::Add && a.kind() == b.kind() =>
        {
            let mut items = a.to_vec();
            items.extend(b.items().iter().cloned());
            Ok(Value::Sequence(SequenceValue::new(a.kind(), items)))
        }
        (Value::Str(s), count) | (count, Value::Str(s)) if op == BinaryOp::Mul => {
            let times = repeat_count(count)?;
            repeated_len(s.len(), times)?;
            Ok(Value::string(&s.repeat(times)))
        }
        (Value::Sequence(seq), count) | (count, Value::Sequence(seq)) if op == BinaryOp::Mul => {
            let times = repeat_count(count)?;
            let items = seq.items();
            let mut repeated = Vec::with_capacity(repeated_len(items.len(), times)?);
            if !items.is_empty() {
                for _ in 0..times {
                    repeated.extend(items.iter().cloned());
                }
            }
            Ok(Value::Sequence(SequenceValue::new(seq.kind(), repeated)))
        }
        _ => Err(unsupported_operands(
            op.as_symbol(),
            &left.type_name(),
            &right.type_name(),
        )),
    }
}

fn number_binary(op: BinaryOp, a: f64, b: f64) -> EvalResult {
    let result = match op {
        BinaryOp::Add => a + b,
        BinaryOp::Sub => a - b,
        BinaryOp::Mul => a * b,
        BinaryOp::Div => {
            if b == 0.0 {
                return Err(division_by_zero());
            }
            a / b
        }
        BinaryOp::FloorDiv => {
            if b == 0.0 {
                return Err(modulo_by_zero());
            }
            (a / b).floor()
        }
        BinaryOp::Mod => {
            if b == 0.0 {
                return Err(modulo_by_zero());
            }
            let r = a % b;
            if r != 0.0 && (r < 0.0) != (b < 0.0) {
                r + b
            } else {
                r
            }
        }
        BinaryOp::Pow => a.powf(b),
        _ => {
            return Err(unsupported_operands(op.as_symbol(), "number", "number"));
        }
    };
    Ok(Value::Number(result))
}

/// Repetition count for `*` on strings and sequences. Negative counts repeat
/// zero times.
fn repeat_count(count: &Value) -> EvalResult<usize> {
    match count {
        Value::Number(_) => count
            .as_index()
            .map(|n| usize::try_from(n).unwrap_or(0))
            .ok_or_else(|| non_integer_repeat(&count.type_name())),
        other => Err(non_integer_repeat(&other.type_name())),
    }
}

/// Length of a repetition result, refusing anything past `MAX_CONTAINER_LEN`.
fn repeated_len(len: usize, times: usize) -> EvalResult<usize> {
    len.checked_mul(times)
        .filter(|&total| total <= MAX_CONTAINER_LEN)
        .ok_or_else(|| result_too_large("repetition"))
}

/// Ordering for `<`, `<=`, `>`, `>=`. `None` means unordered (NaN involved),
/// which makes every ordering comparison false.
fn compare(op: BinaryOp, left: &Value, right: &Value) -> EvalResult<Option<Ordering>> {
    match (left, right) {
        (Value::Number(a), Value::Number(b)) => Ok(a.partial_cmp(b)),
        (Value::Str(a), Value::Str(b)) => Ok(Some(a.cmp(b))),
        (Value::Sequence(a), Value::Sequence(b)) if a.kind() == b.kind() => {
            let Some(_guard) = CycleGuard::enter(Walk::Ordering, a.addr(), b.addr()) else {
                return Err(recursive_comparison());
            };
            let (left_items, right_items) = (a.to_vec(), b.to_vec());
            for (x, y) in left_items.iter().zip(&right_items) {
                if !x.equals(y) {
                    return compare(op, x, y);
                }
            }
            Ok(Some(left_items.len().cmp(&right_items.len())))
        }
        _ => Err(not_comparable(
            op.as_symbol(),
            &left.type_name(),
            &right.type_name(),
        )),
    }
}

/// `needle in container`
fn contains(container: &Value, needle: &Value) -> EvalResult<bool> {
    match container {
        Value::Str(haystack) => match needle {
            Value::Str(sub) => Ok(haystack.contains(&**sub)),
            other => Err(unsupported_operands("in", &other.type_name(), "str")),
        },
        Value::Sequence(seq) => Ok(seq.items().iter().any(|item| item.equals(needle))),
        Value::Mapping(map) => map.contains(needle),
        other => Err(not_a_container(&other.type_name())),
    }
}
