//! Lists and tuples.
//!
//! Both flavours share one representation: a reference-counted vector. Copies
//! of a `SequenceValue` alias the same storage, so `b = a; b.append(1)` is
//! visible through `a`. Tuples are never mutated after construction.

use std::cell::{Ref, RefCell};
use std::rc::Rc;

use strum::{Display, EnumIter, EnumString, IntoStaticStr};

use crate::errors::{
    extended_slice_size_mismatch, index_out_of_range, invalid_index_type, not_in_list,
    pop_from_empty, unsupported_item_assignment, wrong_arg_count, wrong_arg_type, EvalError,
    EvalResult, ExcType,
};

use super::{ItemKey, SliceBounds, Value};

/// Sequence flavour.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Display, IntoStaticStr)]
#[strum(serialize_all = "lowercase")]
pub enum SequenceKind {
    List,
    Tuple,
}

/// Builtin methods available on sequences.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, EnumString, IntoStaticStr, EnumIter)]
#[strum(serialize_all = "snake_case")]
pub enum SequenceMethod {
    Append,
    Extend,
    Insert,
    Pop,
    Remove,
    Index,
    Count,
    Reverse,
    Clear,
    Copy,
}

impl SequenceMethod {
    /// Method name as written in scripts.
    #[inline]
    pub fn name(self) -> &'static str {
        self.into()
    }

    /// Whether tuples expose this method.
    pub fn available_on_tuple(self) -> bool {
        matches!(self, Self::Index | Self::Count)
    }
}

/// A list or tuple.
#[derive(Clone)]
pub struct SequenceValue {
    kind: SequenceKind,
    items: Rc<RefCell<Vec<Value>>>,
}

impl SequenceValue {
    pub fn new(kind: SequenceKind, items: Vec<Value>) -> Self {
        SequenceValue {
            kind,
            items: Rc::new(RefCell::new(items)),
        }
    }

    pub fn list(items: Vec<Value>) -> Self {
        Self::new(SequenceKind::List, items)
    }

    pub fn tuple(items: Vec<Value>) -> Self {
        Self::new(SequenceKind::Tuple, items)
    }

    #[inline]
    pub fn kind(&self) -> SequenceKind {
        self.kind
    }

    /// `"list"` or `"tuple"`.
    #[inline]
    pub fn kind_name(&self) -> &'static str {
        self.kind.into()
    }

    #[inline]
    pub fn is_list(&self) -> bool {
        self.kind == SequenceKind::List
    }

    pub fn len(&self) -> usize {
        self.items.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.borrow().is_empty()
    }

    /// Borrow the elements.
    pub fn items(&self) -> Ref<'_, Vec<Value>> {
        self.items.borrow()
    }

    /// Snapshot of the elements.
    pub fn to_vec(&self) -> Vec<Value> {
        self.items.borrow().clone()
    }

    /// Whether both values alias the same storage.
    #[inline]
    pub fn ptr_eq(&self, other: &SequenceValue) -> bool {
        Rc::ptr_eq(&self.items, &other.items)
    }

    /// Address of the shared storage, for cycle tracking.
    #[inline]
    pub(crate) fn addr(&self) -> usize {
        Rc::as_ptr(&self.items) as usize
    }

    fn position(&self, index: &Value) -> EvalResult<usize> {
        let len = self.len();
        let Some(i) = index.as_index() else {
            return Err(invalid_index_type(self.kind_name(), &index.type_name()));
        };
        resolve_index(i, len).ok_or_else(|| index_out_of_range(self.kind_name()))
    }

    /// `seq[key]`
    pub fn get(&self, key: &ItemKey) -> EvalResult {
        match key {
            ItemKey::Value(index) => {
                let pos = self.position(index)?;
                Ok(self.items.borrow()[pos].clone())
            }
            ItemKey::Slice(bounds) => {
                let items = self.items.borrow();
                let picked = bounds
                    .positions(items.len())?
                    .into_iter()
                    .map(|p| items[p].clone())
                    .collect();
                Ok(Value::Sequence(SequenceValue::new(self.kind, picked)))
            }
        }
    }

    /// `seq[key] = value`
    pub fn set(&self, key: &ItemKey, value: Value) -> EvalResult<()> {
        if !self.is_list() {
            return Err(unsupported_item_assignment(self.kind_name()));
        }
        match key {
            ItemKey::Value(index) => {
                let pos = self.position(index)?;
                self.items.borrow_mut()[pos] = value;
                Ok(())
            }
            ItemKey::Slice(bounds) => self.set_slice(*bounds, &value),
        }
    }

    fn set_slice(&self, bounds: SliceBounds, value: &Value) -> EvalResult<()> {
        let len = self.len();
        let (start, stop, step) = bounds.indices(len)?;
        let replacement = value.iterate()?;

        if step == 1 {
            let start = usize::try_from(start).unwrap_or(0);
            let stop = usize::try_from(stop).unwrap_or(0).max(start);
            self.items.borrow_mut().splice(start..stop, replacement);
            return Ok(());
        }

        let positions = bounds.positions(len)?;
        if positions.len() != replacement.len() {
            return Err(extended_slice_size_mismatch(
                replacement.len(),
                positions.len(),
            ));
        }
        let mut items = self.items.borrow_mut();
        for (pos, item) in positions.into_iter().zip(replacement) {
            items[pos] = item;
        }
        Ok(())
    }

    /// Append in place (`list += other`).
    pub fn extend(&self, values: Vec<Value>) {
        self.items.borrow_mut().extend(values);
    }

    /// Invoke a builtin method with this sequence as receiver.
    pub fn call_method(&self, method: SequenceMethod, args: Vec<Value>) -> EvalResult {
        let name = method.name();
        match method {
            SequenceMethod::Append => {
                let [item] = exact::<1>(name, args)?;
                self.items.borrow_mut().push(item);
                Ok(Value::None)
            }
            SequenceMethod::Extend => {
                let [iterable] = exact::<1>(name, args)?;
                let values = iterable.iterate()?;
                self.extend(values);
                Ok(Value::None)
            }
            SequenceMethod::Insert => {
                let [index, item] = exact::<2>(name, args)?;
                let Some(i) = index.as_index() else {
                    return Err(wrong_arg_type("insert", "an integer", &index.type_name()));
                };
                let mut items = self.items.borrow_mut();
                let len = i64::try_from(items.len()).unwrap_or(i64::MAX);
                let i = if i < 0 { (i + len).max(0) } else { i.min(len) };
                items.insert(usize::try_from(i).unwrap_or(0), item);
                Ok(Value::None)
            }
            SequenceMethod::Pop => {
                if args.len() > 1 {
                    return Err(wrong_arg_count("pop", "at most 1 argument", args.len()));
                }
                if self.is_empty() {
                    return Err(pop_from_empty());
                }
                let index = args.into_iter().next().unwrap_or(Value::Number(-1.0));
                let pos = self.position(&index).map_err(|err| {
                    if err.kind == ExcType::IndexError {
                        EvalError::new(ExcType::IndexError, "pop index out of range")
                    } else {
                        err
                    }
                })?;
                Ok(self.items.borrow_mut().remove(pos))
            }
            SequenceMethod::Remove => {
                let [item] = exact::<1>(name, args)?;
                let found = self.items.borrow().iter().position(|v| v.equals(&item));
                match found {
                    Some(pos) => {
                        self.items.borrow_mut().remove(pos);
                        Ok(Value::None)
                    }
                    None => Err(not_in_list("remove")),
                }
            }
            SequenceMethod::Index => {
                let [item] = exact::<1>(name, args)?;
                let found = self.items.borrow().iter().position(|v| v.equals(&item));
                found
                    .map(|pos| Value::Number(pos as f64))
                    .ok_or_else(|| not_in_list("index"))
            }
            SequenceMethod::Count => {
                let [item] = exact::<1>(name, args)?;
                let count = self.items.borrow().iter().filter(|v| v.equals(&item)).count();
                Ok(Value::Number(count as f64))
            }
            SequenceMethod::Reverse => {
                exact::<0>(name, args)?;
                self.items.borrow_mut().reverse();
                Ok(Value::None)
            }
            SequenceMethod::Clear => {
                exact::<0>(name, args)?;
                self.items.borrow_mut().clear();
                Ok(Value::None)
            }
            SequenceMethod::Copy => {
                exact::<0>(name, args)?;
                Ok(Value::Sequence(SequenceValue::new(self.kind, self.to_vec())))
            }
        }
    }
}

/// Map a possibly negative index onto `0..len`.
pub(crate) fn resolve_index(index: i64, len: usize) -> Option<usize> {
    let len_i = i64::try_from(len).ok()?;
    let resolved = if index < 0 { index + len_i } else { index };
    usize::try_from(resolved).ok().filter(|&i| i < len)
}

/// Destructure an argument vector of exactly `N` values.
pub(crate) fn exact<const N: usize>(name: &str, args: Vec<Value>) -> EvalResult<[Value; N]> {
    let got = args.len();
    args.try_into().map_err(|_| {
        let expected = match N {
            0 => "no arguments".to_string(),
            1 => "exactly one argument".to_string(),
            n => format!("exactly {n} arguments"),
        };
        wrong_arg_count(name, &expected, got)
    })
}
