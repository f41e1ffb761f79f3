//! Lists, strings and maps as immutable collections.
//!
//! Indices are zero-based. `set` never mutates: it returns a new collection
//! sharing nothing with the original but its elements.

use num_bigint::BigInt;
use pscript_runtime::{FunctionId, Payload, Registry, RuntimeError, RuntimeResult, Value};

use crate::args::{arg, char_arg, index_arg, list_arg, map_arg, str_arg};
use crate::predicates::BaseTypes;

#[derive(Debug, Clone, Copy)]
pub struct CollectionFunctions {
    pub is_empty: FunctionId,
    pub size: FunctionId,
    pub get: FunctionId,
    pub set: FunctionId,
}

/// Number of elements: list items, map entries, or string characters.
pub fn length(payload: &Payload) -> RuntimeResult<usize> {
    match payload {
        Payload::List(items) => Ok(items.len()),
        Payload::Map(entries) => Ok(entries.len()),
        Payload::Str(s) => Ok(s.chars().count()),
        other => Err(RuntimeError::type_error(format!(
            "{:?} has no length",
            other
        ))),
    }
}

pub(crate) fn install(registry: &mut Registry, types: &BaseTypes) -> RuntimeResult<CollectionFunctions> {
    let any = registry.kernel().any.clone();
    let bool = registry.kernel().bool.clone();
    let sized = [types.list.clone(), types.string.clone(), types.map.clone()];

    // Every entry is a one-argument boolean test, so `isEmpty` is also a predicate.
    let is_empty = registry.create_generic_function("isEmpty");
    for ty in &sized {
        registry.register_entry(is_empty, vec![ty.clone()], bool.clone(), |r, args| {
            Ok(r.boolean(length(arg(args, 0)?.payload())? == 0))
        })?;
    }

    let size = registry.create_generic_function("size");
    for ty in &sized {
        let int = types.int.clone();
        registry.register_entry(size, vec![ty.clone()], types.int.clone(), move |_, args| {
            let n = length(arg(args, 0)?.payload())?;
            Ok(Value::new(Payload::Int(BigInt::from(n)), int.clone()))
        })?;
    }

    let get = registry.create_generic_function("get");
    registry.register_entry(get, vec![types.list.clone(), types.int.clone()], any.clone(), |_, args| {
        let items = list_arg(args, 0)?;
        let i = index_arg(args, 1, items.len())?;
        Ok(items[i].clone())
    })?;
    let t = types.clone();
    registry.register_entry(get, vec![types.string.clone(), types.int.clone()], types.char.clone(), move |_, args| {
        let s = str_arg(args, 0)?;
        let i = index_arg(args, 1, s.chars().count())?;
        let c = s
            .chars()
            .nth(i)
            .ok_or_else(|| RuntimeError::bounds_error(i as i64, s.len()))?;
        Ok(t.char(c))
    })?;
    registry.register_entry(get, vec![types.map.clone(), any.clone()], any.clone(), |r, args| {
        let key = arg(args, 1)?;
        let found = map_arg(args, 0)?
            .iter()
            .find(|(k, _)| k.payload() == key.payload())
            .map(|(_, v)| v.clone());
        Ok(found.unwrap_or_else(|| r.null()))
    })?;

    let set = registry.create_generic_function("set");
    let t = types.clone();
    registry.register_entry(
        set,
        vec![types.list.clone(), types.int.clone(), any.clone()],
        types.list.clone(),
        move |_, args| {
            let mut items = list_arg(args, 0)?.to_vec();
            let i = index_arg(args, 1, items.len())?;
            items[i] = arg(args, 2)?.clone();
            Ok(t.list(items))
        },
    )?;
    let t = types.clone();
    registry.register_entry(
        set,
        vec![types.string.clone(), types.int.clone(), types.char.clone()],
        types.string.clone(),
        move |_, args| {
            let mut chars: Vec<char> = str_arg(args, 0)?.chars().collect();
            let i = index_arg(args, 1, chars.len())?;
            chars[i] = char_arg(args, 2)?;
            Ok(t.string(&chars.into_iter().collect::<String>()))
        },
    )?;
    let t = types.clone();
    registry.register_entry(
        set,
        vec![types.map.clone(), any.clone(), any],
        types.map.clone(),
        move |_, args| {
            let key = arg(args, 1)?.clone();
            let value = arg(args, 2)?.clone();
            let mut entries = map_arg(args, 0)?.to_vec();
            match entries.iter_mut().find(|(k, _)| k.payload() == key.payload()) {
                Some(entry) => entry.1 = value,
                None => entries.push((key, value)),
            }
            Ok(t.map(entries))
        },
    )?;

    Ok(CollectionFunctions {
        is_empty,
        size,
        get,
        set,
    })
}
