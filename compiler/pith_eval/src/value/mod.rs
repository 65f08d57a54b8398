//! Runtime values.
//!
//! `Value` is a closed sum type and every operation below matches all of its
//! variants explicitly. Containers, classes and objects are reference
//! counted; cloning a `Value` aliases them rather than copying.

mod class;
mod cycle;
mod function;
mod key;
mod mapping;
mod sequence;

use std::borrow::Cow;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::rc::Rc;
use std::str::FromStr;

use rustc_hash::FxHasher;

use crate::errors::{
    cannot_set_attribute, class_no_attribute, index_out_of_range, invalid_index_type,
    no_attribute, no_members, not_iterable, not_subscriptable, unhashable,
    unsupported_item_assignment, EvalResult,
};
use sequence::resolve_index;

pub(crate) use cycle::{CycleGuard, Walk};

pub use class::{ClassRef, ClassValue, Members, ObjectRef, ObjectValue};
pub use function::{Builtin, Callee, FunctionValue, UserFunction};
pub use key::{ItemKey, MapKey, SliceBounds};
pub use mapping::{MapEntries, MappingMethod, MappingValue};
pub(crate) use sequence::exact;
pub use sequence::{SequenceKind, SequenceMethod, SequenceValue};

/// Longest string (in bytes) or sequence an operation may build from a
/// count given by the script, such as `s * n` or `range(n)`.
pub const MAX_CONTAINER_LEN: usize = 1 << 26;

/// A runtime value.
#[derive(Clone)]
pub enum Value {
    Number(f64),
    Str(Rc<str>),
    Bool(bool),
    None,
    Sequence(SequenceValue),
    Mapping(MappingValue),
    Function(Rc<FunctionValue>),
    Class(ClassRef),
    Object(ObjectRef),
}

impl Value {
    // Factory methods

    pub fn string(s: &str) -> Value {
        Value::Str(Rc::from(s))
    }

    pub fn list(items: Vec<Value>) -> Value {
        Value::Sequence(SequenceValue::list(items))
    }

    pub fn tuple(items: Vec<Value>) -> Value {
        Value::Sequence(SequenceValue::tuple(items))
    }

    pub fn function(function: FunctionValue) -> Value {
        Value::Function(Rc::new(function))
    }

    // Queries

    /// Truthiness used by `if`, `while`, `and`, `or` and `not`.
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Number(n) => *n != 0.0,
            Value::Str(s) => !s.is_empty(),
            Value::Bool(b) => *b,
            Value::None => false,
            Value::Sequence(seq) => !seq.is_empty(),
            Value::Mapping(map) => !map.is_empty(),
            Value::Function(_) | Value::Class(_) | Value::Object(_) => true,
        }
    }

    /// Type name used in error messages. Objects report their class name.
    pub fn type_name(&self) -> Cow<'static, str> {
        match self {
            Value::Number(_) => Cow::Borrowed("number"),
            Value::Str(_) => Cow::Borrowed("str"),
            Value::Bool(_) => Cow::Borrowed("bool"),
            Value::None => Cow::Borrowed("NoneType"),
            Value::Sequence(seq) => Cow::Borrowed(seq.kind_name()),
            Value::Mapping(_) => Cow::Borrowed("dict"),
            Value::Function(_) => Cow::Borrowed("function"),
            Value::Class(_) => Cow::Borrowed("type"),
            Value::Object(obj) => Cow::Owned(obj.class().name().to_string()),
        }
    }

    /// The value as an integer index, if it is an integral number.
    pub fn as_index(&self) -> Option<i64> {
        match self {
            Value::Number(n) if n.is_finite() && n.fract() == 0.0 => Some(*n as i64),
            _ => None,
        }
    }

    #[inline]
    pub fn is_function(&self) -> bool {
        matches!(self, Value::Function(_))
    }

    /// Class of an object value.
    pub fn class_of(&self) -> Option<&ClassRef> {
        match self {
            Value::Object(obj) => Some(obj.class()),
            _ => None,
        }
    }

    // Equality and hashing

    /// `==`: structural for scalars, deep for containers, identity otherwise.
    pub fn equals(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Number(a), Value::Number(b)) => a == b,
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::None, Value::None) => true,
            (Value::Sequence(a), Value::Sequence(b)) => {
                if a.ptr_eq(b) {
                    return true;
                }
                // Re-entering a pair already being compared adds no evidence
                // of a difference.
                let Some(_guard) = CycleGuard::enter(Walk::Equality, a.addr(), b.addr()) else {
                    return true;
                };
                a.kind() == b.kind() && {
                    let (left, right) = (a.items(), b.items());
                    left.len() == right.len()
                        && left.iter().zip(right.iter()).all(|(x, y)| x.equals(y))
                }
            }
            (Value::Mapping(a), Value::Mapping(b)) => {
                if a.ptr_eq(b) {
                    return true;
                }
                let Some(_guard) = CycleGuard::enter(Walk::Equality, a.addr(), b.addr()) else {
                    return true;
                };
                let (left, right) = (a.entries(), b.entries());
                left.len() == right.len()
                    && left
                        .iter()
                        .all(|(k, v)| right.get(k).is_some_and(|w| v.equals(w)))
            }
            (Value::Function(a), Value::Function(b)) => a.same_as(b),
            (Value::Class(a), Value::Class(b)) => Rc::ptr_eq(a, b),
            (Value::Object(a), Value::Object(b)) => Rc::ptr_eq(a, b),
            (
                Value::Number(_)
                | Value::Str(_)
                | Value::Bool(_)
                | Value::None
                | Value::Sequence(_)
                | Value::Mapping(_)
                | Value::Function(_)
                | Value::Class(_)
                | Value::Object(_),
                _,
            ) => false,
        }
    }

    /// `is`: value comparison for scalars, identity for everything else.
    pub fn is(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Number(_) | Value::Str(_) | Value::Bool(_) | Value::None, _) => {
                self.equals(other)
            }
            (Value::Sequence(a), Value::Sequence(b)) => a.ptr_eq(b),
            (Value::Mapping(a), Value::Mapping(b)) => a.ptr_eq(b),
            (Value::Function(a), Value::Function(b)) => a.same_as(b),
            (Value::Class(a), Value::Class(b)) => Rc::ptr_eq(a, b),
            (Value::Object(a), Value::Object(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }

    /// Hash consistent with `equals`. Lists and mappings are unhashable.
    pub fn hash_value(&self) -> EvalResult<u64> {
        let mut hasher = FxHasher::default();
        self.hash_into(&mut hasher)?;
        Ok(hasher.finish())
    }

    fn hash_into(&self, state: &mut FxHasher) -> EvalResult<()> {
        match self {
            Value::Number(n) => {
                0u8.hash(state);
                key::normalized_bits(*n).hash(state);
            }
            Value::Str(s) => {
                1u8.hash(state);
                s.hash(state);
            }
            Value::Bool(b) => {
                2u8.hash(state);
                b.hash(state);
            }
            Value::None => 3u8.hash(state),
            Value::Sequence(seq) => {
                if seq.is_list() {
                    return Err(unhashable("list"));
                }
                4u8.hash(state);
                for item in seq.items().iter() {
                    item.hash_into(state)?;
                }
            }
            Value::Mapping(_) => return Err(unhashable("dict")),
            Value::Function(func) => {
                5u8.hash(state);
                func.callee_addr().hash(state);
                func.name().hash(state);
            }
            Value::Class(class) => {
                6u8.hash(state);
                (Rc::as_ptr(class) as usize).hash(state);
            }
            Value::Object(obj) => {
                7u8.hash(state);
                (Rc::as_ptr(obj) as usize).hash(state);
            }
        }
        Ok(())
    }

    // Iteration

    /// Elements produced by `for` loops and unpacking, snapshotted.
    pub fn iterate(&self) -> EvalResult<Vec<Value>> {
        match self {
            Value::Sequence(seq) => Ok(seq.to_vec()),
            Value::Str(s) => Ok(s
                .chars()
                .map(|c| Value::string(c.encode_utf8(&mut [0; 4])))
                .collect()),
            Value::Mapping(map) => Ok(map.keys()),
            Value::Number(_)
            | Value::Bool(_)
            | Value::None
            | Value::Function(_)
            | Value::Class(_)
            | Value::Object(_) => Err(not_iterable(&self.type_name())),
        }
    }

    // Indexing

    /// `value[key]`
    pub fn get_item(&self, key: &ItemKey) -> EvalResult {
        match self {
            Value::Sequence(seq) => seq.get(key),
            Value::Mapping(map) => map.get(key),
            Value::Str(s) => index_str(s, key),
            Value::Number(_)
            | Value::Bool(_)
            | Value::None
            | Value::Function(_)
            | Value::Class(_)
            | Value::Object(_) => Err(not_subscriptable(&self.type_name())),
        }
    }

    /// `value[key] = item`
    pub fn set_item(&self, key: &ItemKey, item: Value) -> EvalResult<()> {
        match self {
            Value::Sequence(seq) => seq.set(key, item),
            Value::Mapping(map) => map.set(key, item),
            Value::Str(_)
            | Value::Number(_)
            | Value::Bool(_)
            | Value::None
            | Value::Function(_)
            | Value::Class(_)
            | Value::Object(_) => Err(unsupported_item_assignment(&self.type_name())),
        }
    }

    // Members

    /// `value.name`
    ///
    /// Objects check their own attributes, then the class chain; functions
    /// found on the class come back bound to the object. Containers expose
    /// their builtin methods, bound to the container.
    pub fn get_member(&self, name: &str) -> EvalResult {
        match self {
            Value::Object(obj) => {
                if let Some(value) = obj.get_attr(name) {
                    return Ok(value);
                }
                if name == "__class__" {
                    return Ok(Value::Class(Rc::clone(obj.class())));
                }
                match obj.class().lookup(name) {
                    Some(Value::Function(func)) if func.receiver().is_none() => {
                        Ok(Value::function(func.bind(self.clone())))
                    }
                    Some(value) => Ok(value),
                    None => Err(no_attribute(obj.class().name(), name)),
                }
            }
            Value::Class(class) => {
                if name == "__name__" {
                    return Ok(Value::string(class.name()));
                }
                class
                    .lookup(name)
                    .ok_or_else(|| class_no_attribute(class.name(), name))
            }
            Value::Sequence(seq) => SequenceMethod::from_str(name)
                .ok()
                .filter(|method| seq.is_list() || method.available_on_tuple())
                .map(|method| {
                    Value::function(
                        FunctionValue::builtin(Builtin::Sequence(method)).bind(self.clone()),
                    )
                })
                .ok_or_else(|| no_attribute(seq.kind_name(), name)),
            Value::Mapping(_) => MappingMethod::from_str(name)
                .ok()
                .map(|method| {
                    Value::function(
                        FunctionValue::builtin(Builtin::Mapping(method)).bind(self.clone()),
                    )
                })
                .ok_or_else(|| no_attribute("dict", name)),
            Value::Number(_)
            | Value::Str(_)
            | Value::Bool(_)
            | Value::None
            | Value::Function(_) => Err(no_members(&self.type_name(), name)),
        }
    }

    /// `value.name = item`
    pub fn set_member(&self, name: &str, item: Value) -> EvalResult<()> {
        match self {
            Value::Object(obj) => {
                obj.set_attr(Rc::from(name), item);
                Ok(())
            }
            Value::Class(class) => {
                class.set_member(Rc::from(name), item);
                Ok(())
            }
            Value::Number(_)
            | Value::Str(_)
            | Value::Bool(_)
            | Value::None
            | Value::Sequence(_)
            | Value::Mapping(_)
            | Value::Function(_) => Err(cannot_set_attribute(&self.type_name(), name)),
        }
    }

    // Formatting

    /// Quoted form used inside containers and error messages.
    pub fn repr(&self) -> String {
        Repr(self).to_string()
    }
}

fn index_str(s: &str, key: &ItemKey) -> EvalResult {
    let chars: Vec<char> = s.chars().collect();
    match key {
        ItemKey::Value(index) => {
            let Some(i) = index.as_index() else {
                return Err(invalid_index_type("string", &index.type_name()));
            };
            let pos =
                resolve_index(i, chars.len()).ok_or_else(|| index_out_of_range("string"))?;
            Ok(Value::string(chars[pos].encode_utf8(&mut [0; 4])))
        }
        ItemKey::Slice(bounds) => {
            let picked: String = bounds
                .positions(chars.len())?
                .into_iter()
                .map(|p| chars[p])
                .collect();
            Ok(Value::string(&picked))
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Value) -> bool {
        self.equals(other)
    }
}

fn fmt_number(n: f64, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    if n.is_nan() {
        f.write_str("nan")
    } else if n.is_infinite() {
        f.write_str(if n > 0.0 { "inf" } else { "-inf" })
    } else if n.fract() == 0.0 && n.abs() < 1e16 {
        write!(f, "{}", n as i64)
    } else {
        write!(f, "{n}")
    }
}

fn fmt_items(items: &[Value], f: &mut fmt::Formatter<'_>) -> fmt::Result {
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        write!(f, "{}", Repr(item))?;
    }
    Ok(())
}

/// `str()` form.
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Number(n) => fmt_number(*n, f),
            Value::Str(s) => f.write_str(s),
            Value::Bool(true) => f.write_str("True"),
            Value::Bool(false) => f.write_str("False"),
            Value::None => f.write_str("None"),
            Value::Sequence(seq) => {
                let Some(_guard) = CycleGuard::enter(Walk::Render, seq.addr(), 0) else {
                    return f.write_str(if seq.is_list() { "[...]" } else { "(...)" });
                };
                let items = seq.items();
                if seq.is_list() {
                    f.write_str("[")?;
                    fmt_items(&items, f)?;
                    f.write_str("]")
                } else {
                    f.write_str("(")?;
                    fmt_items(&items, f)?;
                    if items.len() == 1 {
                        f.write_str(",")?;
                    }
                    f.write_str(")")
                }
            }
            Value::Mapping(map) => {
                let Some(_guard) = CycleGuard::enter(Walk::Render, map.addr(), 0) else {
                    return f.write_str("{...}");
                };
                f.write_str("{")?;
                for (i, (key, value)) in map.entries().iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}: {}", Repr(&key.to_value()), Repr(value))?;
                }
                f.write_str("}")
            }
            Value::Function(func) => match (func.callee(), func.receiver()) {
                (Callee::Builtin(_), None) => write!(f, "<built-in function {}>", func.name()),
                (Callee::Builtin(_), Some(receiver)) => write!(
                    f,
                    "<built-in method {} of {} object>",
                    func.name(),
                    receiver.type_name()
                ),
                (Callee::User(_), None) => write!(f, "<function {}>", func.name()),
                (Callee::User(_), Some(receiver)) => {
                    write!(f, "<bound method {}.{}>", receiver.type_name(), func.name())
                }
            },
            Value::Class(class) => write!(f, "<class '{}'>", class.name()),
            Value::Object(obj) => write!(f, "<{} object>", obj.class().name()),
        }
    }
}

/// `repr()` form: strings are quoted, everything else matches `Display`.
struct Repr<'a>(&'a Value);

impl fmt::Display for Repr<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Value::Str(s) => {
                f.write_str("'")?;
                for c in s.chars() {
                    match c {
                        '\\' => f.write_str("\\\\")?,
                        '\'' => f.write_str("\\'")?,
                        '\n' => f.write_str("\\n")?,
                        '\t' => f.write_str("\\t")?,
                        c => write!(f, "{c}")?,
                    }
                }
                f.write_str("'")
            }
            other => write!(f, "{other}"),
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", Repr(self))
    }
}

#[cfg(test)]
mod tests;
