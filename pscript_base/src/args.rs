//! Argument extraction for builtin implementations.
//!
//! Dispatch has already checked argument tags; these helpers check that the
//! payload behind a tag is the expected shape, since `AS` can re-tag freely.

use num_bigint::BigInt;
use num_traits::ToPrimitive;
use pscript_runtime::{Payload, Predicate, RuntimeError, RuntimeResult, Value};

pub(crate) fn arg(args: &[Value], index: usize) -> RuntimeResult<&Value> {
    args.get(index).ok_or_else(|| {
        RuntimeError::argument_error(format!(
            "expected at least {} arguments, got {}",
            index + 1,
            args.len()
        ))
    })
}

fn mismatch(expected: &str, value: &Value) -> RuntimeError {
    RuntimeError::type_error(format!("expected {}, got {:?}", expected, value.payload()))
}

pub(crate) fn bigint_arg(args: &[Value], index: usize) -> RuntimeResult<BigInt> {
    let value = arg(args, index)?;
    value
        .payload()
        .as_bigint()
        .ok_or_else(|| mismatch("an integer", value))
}

pub(crate) fn real_arg(args: &[Value], index: usize) -> RuntimeResult<f64> {
    let value = arg(args, index)?;
    value
        .payload()
        .as_f64()
        .ok_or_else(|| mismatch("a number", value))
}

pub(crate) fn str_arg(args: &[Value], index: usize) -> RuntimeResult<&str> {
    let value = arg(args, index)?;
    value
        .payload()
        .as_str()
        .ok_or_else(|| mismatch("a string", value))
}

pub(crate) fn list_arg(args: &[Value], index: usize) -> RuntimeResult<&[Value]> {
    let value = arg(args, index)?;
    value
        .payload()
        .as_list()
        .ok_or_else(|| mismatch("a list", value))
}

pub(crate) fn map_arg(args: &[Value], index: usize) -> RuntimeResult<&[(Value, Value)]> {
    let value = arg(args, index)?;
    value
        .payload()
        .as_map()
        .ok_or_else(|| mismatch("a map", value))
}

pub(crate) fn pred_arg(args: &[Value], index: usize) -> RuntimeResult<Predicate> {
    let value = arg(args, index)?;
    value
        .payload()
        .as_predicate()
        .cloned()
        .ok_or_else(|| mismatch("a predicate", value))
}

pub(crate) fn char_arg(args: &[Value], index: usize) -> RuntimeResult<char> {
    let value = arg(args, index)?;
    value
        .payload()
        .as_bigint()
        .and_then(|n| n.to_u32())
        .and_then(char::from_u32)
        .ok_or_else(|| mismatch("a character", value))
}

/// Zero-based index into a collection of `length` elements.
pub(crate) fn index_arg(args: &[Value], index: usize, length: usize) -> RuntimeResult<usize> {
    let n = bigint_arg(args, index)?;
    match n.to_usize() {
        Some(i) if i < length => Ok(i),
        _ => Err(RuntimeError::bounds_error(
            n.to_i64().unwrap_or(i64::MAX),
            length,
        )),
    }
}
