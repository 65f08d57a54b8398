//! The builtin scope and builtin function implementations.
//!
//! The scope is built once per thread (values are `Rc`, so it cannot be
//! process-wide) and shared as the outermost scope of every root closure.
//! Scripts may shadow builtins in their globals but never write into the
//! builtin scope itself.

use std::rc::Rc;

use rustc_hash::FxHashMap;
use strum::IntoEnumIterator;

use crate::environment::{LocalScope, Scope, ScopeKind};
use crate::errors::{
    no_keyword_arguments, range_step_zero, result_too_large, wrong_arg_count, wrong_arg_type,
    EvalError, EvalResult, ExcType,
};
use crate::print_handler::PrintHandlerImpl;
use crate::value::{
    exact, Builtin, ClassRef, ClassValue, FunctionValue, Value, MAX_CONTAINER_LEN,
};

struct Builtins {
    scope: LocalScope<Scope>,
    /// Indexed by `ExcType as usize`.
    exceptions: Vec<ClassRef>,
}

impl Builtins {
    fn new() -> Self {
        let mut scope = Scope::new(ScopeKind::Function);
        let mut exceptions: Vec<ClassRef> = Vec::new();

        for kind in ExcType::iter() {
            let supers: Vec<ClassRef> = kind
                .parent()
                .and_then(|parent| exceptions.get(parent as usize).cloned())
                .into_iter()
                .collect();

            let mut members = FxHashMap::default();
            if kind == ExcType::BaseException {
                members.insert(
                    Rc::from("__init__"),
                    Value::function(FunctionValue::builtin(Builtin::ExceptionInit)),
                );
                members.insert(Rc::from("message"), Value::string(""));
                members.insert(Rc::from("args"), Value::tuple(Vec::new()));
            }

            let class = ClassValue::new(Rc::from(kind.name()), members, supers);
            scope.define(Rc::from(kind.name()), Value::Class(Rc::clone(&class)));
            exceptions.push(class);
        }

        for builtin in Builtin::GLOBALS {
            scope.define(
                Rc::from(builtin.name()),
                Value::function(FunctionValue::builtin(builtin)),
            );
        }

        Builtins {
            scope: LocalScope::new(scope),
            exceptions,
        }
    }
}

thread_local! {
    static BUILTINS: Builtins = Builtins::new();
}

/// The shared builtin scope of this thread.
pub(crate) fn builtin_scope() -> LocalScope<Scope> {
    BUILTINS.with(|builtins| builtins.scope.clone())
}

/// The builtin class for an exception kind.
pub fn exception_class(kind: ExcType) -> ClassRef {
    BUILTINS.with(|builtins| Rc::clone(&builtins.exceptions[kind as usize]))
}

/// Whether `class` derives from `BaseException`.
pub(crate) fn is_exception_class(class: &ClassValue) -> bool {
    class.is_subclass_of(&exception_class(ExcType::BaseException))
}

/// Run a builtin. Keyword arguments are rejected by the caller.
pub(crate) fn call_builtin(
    builtin: Builtin,
    receiver: Option<&Value>,
    mut args: Vec<Value>,
    print: &PrintHandlerImpl,
) -> EvalResult {
    match builtin {
        Builtin::Print => {
            let line = args
                .iter()
                .map(to_str)
                .collect::<Vec<_>>()
                .join(" ");
            print.println(&line);
            Ok(Value::None)
        }
        Builtin::Len => {
            let [value] = exact::<1>("len", args)?;
            let len = match &value {
                Value::Str(s) => s.chars().count(),
                Value::Sequence(seq) => seq.len(),
                Value::Mapping(map) => map.len(),
                Value::Number(_)
                | Value::Bool(_)
                | Value::None
                | Value::Function(_)
                | Value::Class(_)
                | Value::Object(_) => {
                    return Err(EvalError::new(
                        ExcType::TypeError,
                        format!("object of type '{}' has no len()", value.type_name()),
                    ))
                }
            };
            Ok(Value::Number(len as f64))
        }
        Builtin::Range => range(&args),
        Builtin::Str => match args.len() {
            0 => Ok(Value::string("")),
            1 => Ok(Value::string(&to_str(&args[0]))),
            got => Err(wrong_arg_count("str", "at most 1 argument", got)),
        },
        Builtin::IsInstance => {
            let [value, classinfo] = exact::<2>("isinstance", args)?;
            is_instance(&value, &classinfo).map(Value::Bool)
        }
        Builtin::ExceptionInit => {
            let receiver = match receiver {
                Some(receiver) => receiver.clone(),
                None if !args.is_empty() => args.remove(0),
                None => return Err(wrong_arg_count("__init__", "at least 1 argument", 0)),
            };
            let Value::Object(obj) = &receiver else {
                return Err(wrong_arg_type(
                    "__init__",
                    "an exception instance",
                    &receiver.type_name(),
                ));
            };
            let message = args.first().map(to_str).unwrap_or_default();
            obj.set_attr(Rc::from("message"), Value::string(&message));
            obj.set_attr(Rc::from("args"), Value::tuple(args));
            Ok(Value::None)
        }
        Builtin::Sequence(method) => match receiver {
            Some(Value::Sequence(seq)) => seq.call_method(method, args),
            other => Err(unbound_method(method.name(), "list", other)),
        },
        Builtin::Mapping(method) => match receiver {
            Some(Value::Mapping(map)) => map.call_method(method, args),
            other => Err(unbound_method(method.name(), "dict", other)),
        },
    }
}

/// Builtins never take keyword arguments.
pub(crate) fn reject_keywords(builtin: Builtin, keyword_count: usize) -> EvalResult<()> {
    if keyword_count == 0 {
        Ok(())
    } else {
        Err(no_keyword_arguments(builtin.name()))
    }
}

#[cold]
fn unbound_method(method: &str, owner: &str, receiver: Option<&Value>) -> EvalError {
    let got = receiver.map_or_else(|| "nothing".into(), Value::type_name);
    wrong_arg_type(&format!("{owner}.{method}"), owner, &got)
}

/// `str(value)`. Exception instances render as their message.
pub(crate) fn to_str(value: &Value) -> String {
    if let Value::Object(obj) = value {
        if is_exception_class(obj.class()) {
            return obj.get_attr("message").map(|m| m.to_string()).unwrap_or_default();
        }
    }
    value.to_string()
}

fn range(args: &[Value]) -> EvalResult {
    let ints = args
        .iter()
        .map(|arg| {
            arg.as_index()
                .ok_or_else(|| wrong_arg_type("range", "an integer", &arg.type_name()))
        })
        .collect::<EvalResult<Vec<i64>>>()?;

    let (start, stop, step) = match ints.as_slice() {
        [stop] => (0, *stop, 1),
        [start, stop] => (*start, *stop, 1),
        [start, stop, step] => (*start, *stop, *step),
        _ => return Err(wrong_arg_count("range", "1 to 3 arguments", args.len())),
    };
    if step == 0 {
        return Err(range_step_zero());
    }

    let span = if step > 0 {
        i128::from(stop) - i128::from(start)
    } else {
        i128::from(start) - i128::from(stop)
    };
    let count = if span > 0 {
        (span - 1) / i128::from(step).abs() + 1
    } else {
        0
    };
    let count = usize::try_from(count)
        .ok()
        .filter(|&count| count <= MAX_CONTAINER_LEN)
        .ok_or_else(|| result_too_large("range()"))?;

    let mut items = Vec::with_capacity(count);
    let mut cursor = Some(start);
    while let Some(i) = cursor {
        if !((step > 0 && i < stop) || (step < 0 && i > stop)) {
            break;
        }
        items.push(Value::Number(i as f64));
        cursor = i.checked_add(step);
    }
    Ok(Value::list(items))
}

fn is_instance(value: &Value, classinfo: &Value) -> EvalResult<bool> {
    match classinfo {
        Value::Class(class) => Ok(value
            .class_of()
            .is_some_and(|own| own.is_subclass_of(class))),
        Value::Sequence(seq) if !seq.is_list() => {
            for candidate in seq.items().iter() {
                if is_instance(value, candidate)? {
                    return Ok(true);
                }
            }
            Ok(false)
        }
        _ => Err(EvalError::new(
            ExcType::TypeError,
            "isinstance() arg 2 must be a type or tuple of types",
        )),
    }
}
