//! Builtin predicates and their value constructors.

use std::rc::Rc;

use num_bigint::BigInt;
use num_traits::ToPrimitive;
use pscript_runtime::{FunctionId, Payload, Predicate, Registry, RuntimeError, RuntimeResult, Value};

/// Handles to the builtin predicates.
///
/// ```text
/// isAny ── isReal ── isInt ── isChar
///       ├─ isString
///       ├─ isList
///       └─ isMap
/// ```
#[derive(Debug, Clone)]
pub struct BaseTypes {
    pub real: Predicate,
    pub int: Predicate,
    pub char: Predicate,
    pub string: Predicate,
    pub list: Predicate,
    pub map: Predicate,
}

impl BaseTypes {
    pub fn int<N: Into<BigInt>>(&self, n: N) -> Value {
        Value::new(Payload::Int(n.into()), self.int.clone())
    }

    pub fn real(&self, x: f64) -> Value {
        Value::new(Payload::Real(x), self.real.clone())
    }

    pub fn char(&self, c: char) -> Value {
        Value::new(Payload::Int(BigInt::from(u32::from(c))), self.char.clone())
    }

    pub fn string(&self, s: &str) -> Value {
        Value::new(Payload::Str(Rc::from(s)), self.string.clone())
    }

    pub fn list(&self, items: Vec<Value>) -> Value {
        Value::new(Payload::List(Rc::new(items)), self.list.clone())
    }

    pub fn map(&self, entries: Vec<(Value, Value)>) -> Value {
        Value::new(Payload::Map(Rc::new(entries)), self.map.clone())
    }
}

pub(crate) fn install(registry: &mut Registry) -> RuntimeResult<BaseTypes> {
    let any = registry.kernel().any.clone();
    let bool = registry.kernel().bool.clone();

    let real = registry.define_predicate("isReal", &any)?;
    let int = registry.define_predicate("isInt", &real)?;
    let character = registry.define_predicate("isChar", &int)?;
    let string = registry.define_predicate("isString", &any)?;
    let list = registry.define_predicate("isList", &any)?;
    let map = registry.define_predicate("isMap", &any)?;

    // Reals with no fractional part are integers.
    let is_int = membership_test(registry, &int)?;
    registry.register_entry(is_int, vec![real.clone()], bool.clone(), |r, args| {
        let integral = args
            .first()
            .and_then(|v| v.payload().as_f64())
            .is_some_and(|x| x.fract() == 0.0);
        Ok(r.boolean(integral))
    })?;

    // Integers in the Unicode scalar range are characters.
    let is_char = membership_test(registry, &character)?;
    registry.register_entry(is_char, vec![int.clone()], bool, |r, args| {
        let scalar = args
            .first()
            .and_then(|v| v.payload().as_bigint())
            .and_then(|n| n.to_u32())
            .and_then(char::from_u32)
            .is_some();
        Ok(r.boolean(scalar))
    })?;

    Ok(BaseTypes {
        real,
        int,
        char: character,
        string,
        list,
        map,
    })
}

fn membership_test(registry: &Registry, pred: &Predicate) -> RuntimeResult<FunctionId> {
    registry
        .membership_test(pred)
        .ok_or_else(|| RuntimeError::UnknownFunction(pred.name().to_string()))
}
