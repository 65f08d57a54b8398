//! Mapping keys and index keys.

use std::rc::Rc;

use crate::errors::{unhashable, EvalResult};

use super::Value;

/// A hashable mapping key.
///
/// Numbers are stored by their bit pattern after normalisation, so `-0.0`
/// and `0.0` collide and every NaN is the same key.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum MapKey {
    Number(u64),
    Str(Rc<str>),
    Bool(bool),
}

impl MapKey {
    /// Convert a value into a key. Only numbers, strings and booleans qualify.
    pub fn from_value(value: &Value) -> EvalResult<MapKey> {
        match value {
            Value::Number(n) => Ok(MapKey::Number(normalized_bits(*n))),
            Value::Str(s) => Ok(MapKey::Str(Rc::clone(s))),
            Value::Bool(b) => Ok(MapKey::Bool(*b)),
            Value::None
            | Value::Sequence(_)
            | Value::Mapping(_)
            | Value::Function(_)
            | Value::Class(_)
            | Value::Object(_) => Err(unhashable(&value.type_name())),
        }
    }

    /// The value this key was made from.
    pub fn to_value(&self) -> Value {
        match self {
            MapKey::Number(bits) => Value::Number(f64::from_bits(*bits)),
            MapKey::Str(s) => Value::Str(Rc::clone(s)),
            MapKey::Bool(b) => Value::Bool(*b),
        }
    }
}

/// Bit pattern of a number with `-0.0` folded into `0.0` and NaNs unified.
pub(crate) fn normalized_bits(n: f64) -> u64 {
    if n == 0.0 {
        0.0_f64.to_bits()
    } else if n.is_nan() {
        f64::NAN.to_bits()
    } else {
        n.to_bits()
    }
}

/// Resolved `start:stop:step` bounds. `None` means omitted.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct SliceBounds {
    pub start: Option<i64>,
    pub stop: Option<i64>,
    pub step: Option<i64>,
}

impl SliceBounds {
    /// Clamp the bounds against a sequence length.
    ///
    /// Returns `(start, stop, step)` following the usual slice rules: negative
    /// bounds count from the end and out-of-range bounds are clamped.
    pub fn indices(&self, len: usize) -> EvalResult<(i64, i64, i64)> {
        let step = self.step.unwrap_or(1);
        if step == 0 {
            return Err(crate::errors::slice_step_zero());
        }
        let len = i64::try_from(len).unwrap_or(i64::MAX);
        let (lower, upper) = if step < 0 { (-1, len - 1) } else { (0, len) };

        let clamp = |bound: Option<i64>, default: i64| match bound {
            None => default,
            Some(b) if b < 0 => b.saturating_add(len).max(lower),
            Some(b) => b.min(upper),
        };

        let start = clamp(self.start, if step < 0 { upper } else { lower });
        let stop = clamp(self.stop, if step < 0 { lower } else { upper });
        Ok((start, stop, step))
    }

    /// Positions selected by this slice, in order.
    ///
    /// A step too large to take twice selects only the start position.
    pub fn positions(&self, len: usize) -> EvalResult<Vec<usize>> {
        let (start, stop, step) = self.indices(len)?;
        let mut positions = Vec::new();
        let mut cursor = Some(start);
        while let Some(i) = cursor {
            if !((step > 0 && i < stop) || (step < 0 && i > stop)) {
                break;
            }
            if let Ok(pos) = usize::try_from(i) {
                positions.push(pos);
            }
            cursor = i.checked_add(step);
        }
        Ok(positions)
    }
}

/// The key of an index operation: a plain value or a slice.
#[derive(Clone, Debug, PartialEq)]
pub enum ItemKey {
    Value(Value),
    Slice(SliceBounds),
}
