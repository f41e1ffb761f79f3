//! String conversion and concatenation.

use std::rc::Rc;

use pscript_runtime::{Callable, FunctionId, Payload, Registry, RuntimeError, RuntimeResult, Value};

use crate::args::{arg, bigint_arg, char_arg, list_arg, map_arg, pred_arg, str_arg};
use crate::predicates::BaseTypes;

#[derive(Debug, Clone, Copy)]
pub struct TextFunctions {
    pub str: FunctionId,
}

/// Dispatch `str` on `value` and return the resulting text.
pub fn to_text(registry: &mut Registry, str_fn: FunctionId, value: &Value) -> RuntimeResult<Rc<str>> {
    let text = registry.call(str_fn, std::slice::from_ref(value))?;
    match text.payload() {
        Payload::Str(s) => Ok(Rc::clone(s)),
        other => Err(RuntimeError::type_error(format!(
            "str returned {:?} instead of a string",
            other
        ))),
    }
}

fn join(registry: &mut Registry, str_fn: FunctionId, items: &[Value]) -> RuntimeResult<String> {
    let mut parts = Vec::with_capacity(items.len());
    for item in items {
        parts.push(to_text(registry, str_fn, item)?);
    }
    Ok(parts.join(", "))
}

pub(crate) fn install(registry: &mut Registry, types: &BaseTypes, add: FunctionId) -> RuntimeResult<TextFunctions> {
    let any = registry.kernel().any.clone();
    let function = registry.kernel().function.clone();
    let pred = registry.kernel().pred.clone();
    let string = types.string.clone();

    let str_fn = registry.create_generic_function("str");
    let text = move |s: String| Value::new(Payload::Str(Rc::from(s)), string.clone());

    let t = text.clone();
    registry.register_entry(str_fn, vec![any.clone()], types.string.clone(), move |_, args| {
        Ok(t(arg(args, 0)?.payload().to_string()))
    })?;
    let t = text.clone();
    registry.register_entry(str_fn, vec![types.int.clone()], types.string.clone(), move |_, args| {
        Ok(t(bigint_arg(args, 0)?.to_string()))
    })?;
    let t = text.clone();
    registry.register_entry(str_fn, vec![types.char.clone()], types.string.clone(), move |_, args| {
        Ok(t(char_arg(args, 0)?.to_string()))
    })?;
    let t = text.clone();
    registry.register_entry(str_fn, vec![function], types.string.clone(), move |_, args| {
        match arg(args, 0)?.payload() {
            Payload::Function(f) => Ok(t(format!("<fn {}>", f.name()))),
            Payload::Pred(p) => Ok(t(p.name().to_string())),
            other => Err(RuntimeError::type_error(format!("expected a function, got {:?}", other))),
        }
    })?;
    let t = text.clone();
    registry.register_entry(str_fn, vec![pred], types.string.clone(), move |_, args| {
        Ok(t(pred_arg(args, 0)?.name().to_string()))
    })?;
    let t = text.clone();
    registry.register_entry(str_fn, vec![types.list.clone()], types.string.clone(), move |r, args| {
        let items = list_arg(args, 0)?;
        Ok(t(format!("[{}]", join(r, str_fn, items)?)))
    })?;
    let t = text.clone();
    registry.register_entry(str_fn, vec![types.map.clone()], types.string.clone(), move |r, args| {
        let mut parts = Vec::new();
        for (key, value) in map_arg(args, 0)? {
            let key = to_text(r, str_fn, key)?;
            let value = to_text(r, str_fn, value)?;
            parts.push(format!("{}: {}", key, value));
        }
        Ok(t(format!("{{{}}}", parts.join(", "))))
    })?;

    // String concatenation. Non-string operands are converted with `str`.
    let t = text.clone();
    registry.register_entry(add, vec![types.string.clone(), types.string.clone()], types.string.clone(), move |_, args| {
        Ok(t(format!("{}{}", str_arg(args, 0)?, str_arg(args, 1)?)))
    })?;
    let t = text.clone();
    registry.register_entry(add, vec![types.string.clone(), any.clone()], types.string.clone(), move |r, args| {
        let rhs = to_text(r, str_fn, arg(args, 1)?)?;
        Ok(t(format!("{}{}", str_arg(args, 0)?, rhs)))
    })?;
    registry.register_entry(add, vec![any, types.string.clone()], types.string.clone(), move |r, args| {
        let lhs = to_text(r, str_fn, arg(args, 0)?)?;
        Ok(text(format!("{}{}", lhs, str_arg(args, 1)?)))
    })?;

    Ok(TextFunctions { str: str_fn })
}
