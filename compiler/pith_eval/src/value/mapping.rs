//! Mappings (dictionaries).
//!
//! Entries keep insertion order. Like sequences, copies of a `MappingValue`
//! alias one table.

use std::cell::{Ref, RefCell};
use std::rc::Rc;

use indexmap::IndexMap;
use rustc_hash::FxBuildHasher;
use strum::{EnumIter, EnumString, IntoStaticStr};

use crate::errors::{key_not_found, unhashable, wrong_arg_count, EvalResult};

use super::sequence::exact;
use super::{ItemKey, MapKey, SequenceValue, Value};

/// Backing table of a mapping.
pub type MapEntries = IndexMap<MapKey, Value, FxBuildHasher>;

/// Builtin methods available on mappings.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, EnumString, IntoStaticStr, EnumIter)]
#[strum(serialize_all = "snake_case")]
pub enum MappingMethod {
    Get,
    Keys,
    Values,
    Items,
    Pop,
}

impl MappingMethod {
    #[inline]
    pub fn name(self) -> &'static str {
        self.into()
    }
}

/// A shared, insertion-ordered mapping.
#[derive(Clone, Default)]
pub struct MappingValue(Rc<RefCell<MapEntries>>);

impl MappingValue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_entries(entries: MapEntries) -> Self {
        MappingValue(Rc::new(RefCell::new(entries)))
    }

    pub fn len(&self) -> usize {
        self.0.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.borrow().is_empty()
    }

    /// Borrow the entries.
    pub fn entries(&self) -> Ref<'_, MapEntries> {
        self.0.borrow()
    }

    #[inline]
    pub fn ptr_eq(&self, other: &MappingValue) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    /// Address of the shared storage, for cycle tracking.
    #[inline]
    pub(crate) fn addr(&self) -> usize {
        Rc::as_ptr(&self.0) as usize
    }

    pub fn insert(&self, key: MapKey, value: Value) {
        self.0.borrow_mut().insert(key, value);
    }

    /// Keys as values, in insertion order.
    pub fn keys(&self) -> Vec<Value> {
        self.0.borrow().keys().map(MapKey::to_value).collect()
    }

    /// `key in mapping`
    pub fn contains(&self, key: &Value) -> EvalResult<bool> {
        let key = MapKey::from_value(key)?;
        Ok(self.0.borrow().contains_key(&key))
    }

    fn key_of(key: &ItemKey) -> EvalResult<MapKey> {
        match key {
            ItemKey::Value(value) => MapKey::from_value(value),
            ItemKey::Slice(_) => Err(unhashable("slice")),
        }
    }

    /// `mapping[key]`
    pub fn get(&self, key: &ItemKey) -> EvalResult {
        let map_key = Self::key_of(key)?;
        let found = self.0.borrow().get(&map_key).cloned();
        found.ok_or_else(|| key_not_found(&map_key.to_value().repr()))
    }

    /// `mapping[key] = value`
    pub fn set(&self, key: &ItemKey, value: Value) -> EvalResult<()> {
        let map_key = Self::key_of(key)?;
        self.insert(map_key, value);
        Ok(())
    }

    /// Invoke a builtin method with this mapping as receiver.
    pub fn call_method(&self, method: MappingMethod, args: Vec<Value>) -> EvalResult {
        let name = method.name();
        match method {
            MappingMethod::Get => {
                let (key, default) = key_and_default(name, args)?;
                let key = MapKey::from_value(&key)?;
                let found = self.0.borrow().get(&key).cloned();
                Ok(found.unwrap_or(default))
            }
            MappingMethod::Keys => {
                exact::<0>(name, args)?;
                Ok(Value::Sequence(SequenceValue::list(self.keys())))
            }
            MappingMethod::Values => {
                exact::<0>(name, args)?;
                let values = self.0.borrow().values().cloned().collect();
                Ok(Value::Sequence(SequenceValue::list(values)))
            }
            MappingMethod::Items => {
                exact::<0>(name, args)?;
                let items = self
                    .0
                    .borrow()
                    .iter()
                    .map(|(k, v)| {
                        Value::Sequence(SequenceValue::tuple(vec![k.to_value(), v.clone()]))
                    })
                    .collect();
                Ok(Value::Sequence(SequenceValue::list(items)))
            }
            MappingMethod::Pop => {
                let has_default = args.len() > 1;
                let (key, default) = key_and_default(name, args)?;
                let map_key = MapKey::from_value(&key)?;
                let removed = self.0.borrow_mut().shift_remove(&map_key);
                match removed {
                    Some(value) => Ok(value),
                    None if has_default => Ok(default),
                    None => Err(key_not_found(&key.repr())),
                }
            }
        }
    }
}

/// `(key[, default])` argument shape shared by `get` and `pop`.
fn key_and_default(name: &str, args: Vec<Value>) -> EvalResult<(Value, Value)> {
    let got = args.len();
    let mut args = args.into_iter();
    match (args.next(), args.next(), args.next()) {
        (Some(key), default, None) => Ok((key, default.unwrap_or(Value::None))),
        _ => Err(wrong_arg_count(name, "1 or 2 arguments", got)),
    }
}
