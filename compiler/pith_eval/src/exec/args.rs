//! Parameter binding.
//!
//! Positional arguments bind first, left to right. Keyword arguments follow
//! in source order and may not rebind a parameter already filled. Unknown
//! keywords are collected and reported together once all keywords are in;
//! only then are missing parameters filled from defaults or reported.
//!
//! Argument expressions are evaluated by the caller; this type only sees
//! values, in evaluation order.

use pith_ir::{Name, Params};

use crate::errors::{
    missing_argument, multiple_values, too_many_positional, unknown_keywords, EvalResult,
};
use crate::value::{MapEntries, MapKey, MappingValue, Value};

/// Arguments bound to the parameters of one call.
pub struct ArgumentSet<'a> {
    function: &'a str,
    params: &'a Params,
    slots: Vec<Option<Value>>,
    varargs: Vec<Value>,
    kwargs: Vec<(Name, Value)>,
    unknown: Vec<Name>,
}

impl<'a> ArgumentSet<'a> {
    /// Start binding a call to `function` declared with `params`.
    pub fn new(function: &'a str, params: &'a Params) -> Self {
        ArgumentSet {
            function,
            params,
            slots: vec![None; params.positional.len()],
            varargs: Vec::new(),
            kwargs: Vec::new(),
            unknown: Vec::new(),
        }
    }

    /// Bind all positional arguments (receiver first, for methods).
    pub fn bind_positional(&mut self, values: Vec<Value>) -> EvalResult<()> {
        let declared = self.slots.len();
        if values.len() > declared && self.params.varargs.is_none() {
            return Err(too_many_positional(self.function, declared, values.len()));
        }
        for (i, value) in values.into_iter().enumerate() {
            match self.slots.get_mut(i) {
                Some(slot) => *slot = Some(value),
                None => self.varargs.push(value),
            }
        }
        Ok(())
    }

    /// Bind one `name=value` argument.
    pub fn bind_keyword(&mut self, name: Name, value: Value) -> EvalResult<()> {
        if let Some(i) = self.params.position(&name) {
            let slot = &mut self.slots[i];
            if slot.is_some() {
                return Err(multiple_values(self.function, &name));
            }
            *slot = Some(value);
        } else if self.params.kwargs.is_some() {
            if self.kwargs.iter().any(|(existing, _)| *existing == name) {
                return Err(multiple_values(self.function, &name));
            }
            self.kwargs.push((name, value));
        } else {
            self.unknown.push(name);
        }
        Ok(())
    }

    /// Finish binding, filling defaults.
    ///
    /// `defaults` has one slot per positional parameter. Returns the
    /// bindings to define in the callee's scope, in declaration order.
    pub fn finish(self, defaults: &[Option<Value>]) -> EvalResult<Vec<(Name, Value)>> {
        if !self.unknown.is_empty() {
            return Err(unknown_keywords(self.function, &self.unknown));
        }

        let mut bound = Vec::with_capacity(self.slots.len() + 2);
        for (i, (param, slot)) in self.params.positional.iter().zip(self.slots).enumerate() {
            let value = match slot {
                Some(value) => value,
                None => defaults
                    .get(i)
                    .cloned()
                    .flatten()
                    .ok_or_else(|| missing_argument(self.function, &param.name))?,
            };
            bound.push((Name::clone(&param.name), value));
        }

        if let Some(name) = &self.params.varargs {
            bound.push((Name::clone(name), Value::tuple(self.varargs)));
        }
        if let Some(name) = &self.params.kwargs {
            let entries: MapEntries = self
                .kwargs
                .into_iter()
                .map(|(key, value)| (MapKey::Str(key), value))
                .collect();
            bound.push((
                Name::clone(name),
                Value::Mapping(MappingValue::from_entries(entries)),
            ));
        }
        Ok(bound)
    }
}
