//! Type-level primitives exposed as generic functions.

use pscript_runtime::{Callable, FunctionId, Payload, Registry, RuntimeError, RuntimeResult, Value};

use crate::args::{arg, list_arg, pred_arg};
use crate::predicates::BaseTypes;

#[derive(Debug, Clone, Copy)]
pub struct ReflectFunctions {
    pub type_of: FunctionId,
    pub derive: FunctionId,
    pub is_a: FunctionId,
    /// `AS`: re-tag without checking.
    pub retag: FunctionId,
    /// `as`: checked cast through the target's membership test.
    pub cast: FunctionId,
    pub apply: FunctionId,
}

/// Invoke a function value. Predicate values run their membership test.
pub fn apply_value(registry: &mut Registry, callee: &Value, args: &[Value]) -> RuntimeResult<Value> {
    match callee.payload() {
        Payload::Function(f) => f.invoke(registry, args),
        Payload::Pred(p) => {
            let test = registry
                .membership_test(p)
                .ok_or_else(|| RuntimeError::type_error(format!("{} has no membership test", p)))?;
            registry.call(test, args)
        }
        other => Err(RuntimeError::type_error(format!("{:?} is not callable", other))),
    }
}

pub(crate) fn install(registry: &mut Registry, types: &BaseTypes) -> RuntimeResult<ReflectFunctions> {
    let k = registry.kernel().clone();

    let type_of = registry.create_generic_function("type");
    registry.register_entry(type_of, vec![k.any.clone()], k.pred.clone(), |r, args| {
        let tag = r.type_of(arg(args, 0)?);
        Ok(r.predicate_value(&tag))
    })?;

    let derive = registry.create_generic_function("derive");
    registry.register_entry(derive, vec![k.pred.clone(), k.pred.clone()], k.null.clone(), |r, args| {
        r.derive(&pred_arg(args, 0)?, &pred_arg(args, 1)?)?;
        Ok(r.null())
    })?;

    let is_a = registry.create_generic_function("isA");
    registry.register_entry(is_a, vec![k.pred.clone(), k.pred.clone()], k.bool.clone(), |r, args| {
        let answer = r.is_a(&pred_arg(args, 0)?, &pred_arg(args, 1)?);
        Ok(r.boolean(answer))
    })?;

    let retag = registry.create_generic_function("AS");
    registry.register_entry(retag, vec![k.pred.clone(), k.any.clone()], k.any.clone(), |_, args| {
        Ok(arg(args, 1)?.with_tag(pred_arg(args, 0)?))
    })?;

    let cast = registry.create_generic_function("as");
    registry.register_entry(cast, vec![k.pred.clone(), k.any.clone()], k.any.clone(), |r, args| {
        r.cast(&pred_arg(args, 0)?, arg(args, 1)?.clone())
    })?;

    let apply = registry.create_generic_function("apply");
    registry.register_entry(apply, vec![k.function.clone(), types.list.clone()], k.any, |r, args| {
        let callee = arg(args, 0)?.clone();
        let list = list_arg(args, 1)?.to_vec();
        apply_value(r, &callee, &list)
    })?;

    Ok(ReflectFunctions {
        type_of,
        derive,
        is_a,
        retag,
        cast,
        apply,
    })
}
