//! Arithmetic, comparison and numeric conversion.
//!
//! Every arithmetic function has an `(isInt, isInt) -> isInt` entry over
//! arbitrary precision integers and an `(isReal, isReal) -> isReal` entry over
//! `f64`. Mixed calls fall through to the real entry.

use std::cmp::Ordering;

use num_bigint::BigInt;
use num_integer::Integer;
use num_traits::{FromPrimitive, Signed, ToPrimitive, Zero};
use pscript_runtime::{FunctionId, Payload, Predicate, Registry, RuntimeError, RuntimeResult, Value};

use crate::args::{arg, bigint_arg, char_arg, real_arg};
use crate::predicates::BaseTypes;

/// Handles to the numeric generic functions.
#[derive(Debug, Clone, Copy)]
pub struct NumberFunctions {
    pub add: FunctionId,
    pub sub: FunctionId,
    pub times: FunctionId,
    pub divide: FunctionId,
    pub modulo: FunctionId,
    pub pow: FunctionId,
    pub neg: FunctionId,
    pub is: FunctionId,
    pub is_less_than: FunctionId,
    pub is_less_than_eq: FunctionId,
    pub is_greater_than: FunctionId,
    pub is_greater_than_eq: FunctionId,
    pub int: FunctionId,
}

// ========== Integer arithmetic ==========

/// Floored integer division.
pub fn int_divide(a: &BigInt, b: &BigInt) -> RuntimeResult<BigInt> {
    if b.is_zero() {
        return Err(RuntimeError::DivisionByZero);
    }
    Ok(a.div_floor(b))
}

/// Remainder truncated toward zero; takes the sign of the dividend.
pub fn int_modulo(a: &BigInt, b: &BigInt) -> RuntimeResult<BigInt> {
    if b.is_zero() {
        return Err(RuntimeError::DivisionByZero);
    }
    Ok(a % b)
}

pub fn int_pow(base: &BigInt, exponent: &BigInt) -> RuntimeResult<BigInt> {
    if exponent.is_negative() {
        return Err(RuntimeError::argument_error(format!(
            "cannot raise an integer to the negative power {}",
            exponent
        )));
    }
    let exponent = exponent
        .to_u32()
        .ok_or_else(|| RuntimeError::argument_error(format!("exponent {} is too large", exponent)))?;
    Ok(base.pow(exponent))
}

// ========== Real arithmetic ==========

pub fn real_divide(a: f64, b: f64) -> RuntimeResult<f64> {
    if b == 0.0 {
        return Err(RuntimeError::DivisionByZero);
    }
    Ok(a / b)
}

pub fn real_modulo(a: f64, b: f64) -> RuntimeResult<f64> {
    if b == 0.0 {
        return Err(RuntimeError::DivisionByZero);
    }
    Ok(a % b)
}

/// Round to the nearest integer, halves toward positive infinity.
pub fn round_half_up(x: f64) -> RuntimeResult<BigInt> {
    let floor = x.floor();
    let rounded = if x - floor >= 0.5 { floor + 1.0 } else { floor };
    BigInt::from_f64(rounded)
        .ok_or_else(|| RuntimeError::argument_error(format!("cannot convert {} to an integer", x)))
}

// ========== Comparison ==========

/// Numeric ordering. Integers compare exactly; anything involving a real
/// compares as `f64`, and NaN is unordered.
pub fn compare_numbers(a: &Payload, b: &Payload) -> RuntimeResult<Option<Ordering>> {
    match (a, b) {
        (Payload::Int(x), Payload::Int(y)) => Ok(Some(x.cmp(y))),
        _ => match (a.as_f64(), b.as_f64()) {
            (Some(x), Some(y)) => Ok(x.partial_cmp(&y)),
            _ => Err(RuntimeError::type_error(format!(
                "cannot compare {:?} and {:?}",
                a, b
            ))),
        },
    }
}

// ========== Registration ==========

fn register_int_op<F>(registry: &mut Registry, id: FunctionId, int: &Predicate, op: F) -> RuntimeResult<()>
where
    F: Fn(&BigInt, &BigInt) -> RuntimeResult<BigInt> + 'static,
{
    let tag = int.clone();
    registry.register_entry(id, vec![int.clone(), int.clone()], int.clone(), move |_, args| {
        let result = op(&bigint_arg(args, 0)?, &bigint_arg(args, 1)?)?;
        Ok(Value::new(Payload::Int(result), tag.clone()))
    })
}

fn register_real_op<F>(registry: &mut Registry, id: FunctionId, real: &Predicate, op: F) -> RuntimeResult<()>
where
    F: Fn(f64, f64) -> RuntimeResult<f64> + 'static,
{
    let tag = real.clone();
    registry.register_entry(id, vec![real.clone(), real.clone()], real.clone(), move |_, args| {
        let result = op(real_arg(args, 0)?, real_arg(args, 1)?)?;
        Ok(Value::new(Payload::Real(result), tag.clone()))
    })
}

fn register_comparison<F>(registry: &mut Registry, name: &str, real: &Predicate, test: F) -> RuntimeResult<FunctionId>
where
    F: Fn(Ordering) -> bool + 'static,
{
    let id = registry.create_generic_function(name);
    let bool = registry.kernel().bool.clone();
    registry.register_entry(id, vec![real.clone(), real.clone()], bool, move |r, args| {
        let ordering = compare_numbers(arg(args, 0)?.payload(), arg(args, 1)?.payload())?;
        Ok(r.boolean(ordering.is_some_and(&test)))
    })?;
    Ok(id)
}

pub(crate) fn install(registry: &mut Registry, types: &BaseTypes) -> RuntimeResult<NumberFunctions> {
    let (int, real) = (&types.int, &types.real);
    let any = registry.kernel().any.clone();
    let bool = registry.kernel().bool.clone();

    let add = registry.create_generic_function("add");
    register_int_op(registry, add, int, |a, b| Ok(a + b))?;
    register_real_op(registry, add, real, |a, b| Ok(a + b))?;

    let sub = registry.create_generic_function("sub");
    register_int_op(registry, sub, int, |a, b| Ok(a - b))?;
    register_real_op(registry, sub, real, |a, b| Ok(a - b))?;

    let times = registry.create_generic_function("times");
    register_int_op(registry, times, int, |a, b| Ok(a * b))?;
    register_real_op(registry, times, real, |a, b| Ok(a * b))?;

    let divide = registry.create_generic_function("divide");
    register_int_op(registry, divide, int, int_divide)?;
    register_real_op(registry, divide, real, real_divide)?;

    let modulo = registry.create_generic_function("mod");
    register_int_op(registry, modulo, int, int_modulo)?;
    register_real_op(registry, modulo, real, real_modulo)?;

    let pow = registry.create_generic_function("pow");
    register_int_op(registry, pow, int, int_pow)?;
    register_real_op(registry, pow, real, |a, b| Ok(a.powf(b)))?;

    let neg = registry.create_generic_function("neg");
    let (int_tag, real_tag) = (int.clone(), real.clone());
    registry.register_entry(neg, vec![real.clone()], real.clone(), move |_, args| {
        Ok(match arg(args, 0)?.payload() {
            Payload::Int(n) => Value::new(Payload::Int(-n), int_tag.clone()),
            _ => Value::new(Payload::Real(-real_arg(args, 0)?), real_tag.clone()),
        })
    })?;
    registry.register_entry(neg, vec![bool.clone()], bool.clone(), |r, args| {
        let b = arg(args, 0)?
            .payload()
            .as_bool()
            .ok_or_else(|| RuntimeError::type_error("expected a boolean"))?;
        Ok(r.boolean(!b))
    })?;

    let is = registry.create_generic_function("is");
    registry.register_entry(is, vec![any.clone(), any], bool.clone(), |r, args| {
        Ok(r.boolean(arg(args, 0)?.payload() == arg(args, 1)?.payload()))
    })?;
    registry.register_entry(is, vec![real.clone(), real.clone()], bool.clone(), |r, args| {
        let ordering = compare_numbers(arg(args, 0)?.payload(), arg(args, 1)?.payload())?;
        Ok(r.boolean(ordering == Some(Ordering::Equal)))
    })?;

    let is_less_than = register_comparison(registry, "isLessThan", real, |o| o == Ordering::Less)?;
    let is_less_than_eq = register_comparison(registry, "isLessThanEq", real, |o| o != Ordering::Greater)?;
    let is_greater_than = register_comparison(registry, "isGreaterThan", real, |o| o == Ordering::Greater)?;
    let is_greater_than_eq = register_comparison(registry, "isGreaterThanEq", real, |o| o != Ordering::Less)?;

    let int_fn = registry.create_generic_function("int");
    let tag = int.clone();
    registry.register_entry(int_fn, vec![bool], int.clone(), move |_, args| {
        let b = arg(args, 0)?.payload().as_bool().unwrap_or(false);
        Ok(Value::new(Payload::Int(BigInt::from(u8::from(b))), tag.clone()))
    })?;
    let tag = int.clone();
    registry.register_entry(int_fn, vec![types.char.clone()], int.clone(), move |_, args| {
        let c = char_arg(args, 0)?;
        Ok(Value::new(Payload::Int(BigInt::from(u32::from(c))), tag.clone()))
    })?;
    let tag = int.clone();
    registry.register_entry(int_fn, vec![real.clone()], int.clone(), move |_, args| {
        let n = match arg(args, 0)?.payload() {
            Payload::Int(n) => n.clone(),
            _ => round_half_up(real_arg(args, 0)?)?,
        };
        Ok(Value::new(Payload::Int(n), tag.clone()))
    })?;

    Ok(NumberFunctions {
        add,
        sub,
        times,
        divide,
        modulo,
        pow,
        neg,
        is,
        is_less_than,
        is_less_than_eq,
        is_greater_than,
        is_greater_than_eq,
        int: int_fn,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn big(n: i64) -> BigInt {
        BigInt::from(n)
    }

    #[test]
    fn test_int_division_floors() {
        assert_eq!(int_divide(&big(7), &big(2)).unwrap(), big(3));
        assert_eq!(int_divide(&big(-7), &big(2)).unwrap(), big(-4));
        assert!(matches!(
            int_divide(&big(1), &big(0)),
            Err(RuntimeError::DivisionByZero)
        ));
    }

    #[test]
    fn test_int_modulo_truncates() {
        assert_eq!(int_modulo(&big(7), &big(3)).unwrap(), big(1));
        assert_eq!(int_modulo(&big(-7), &big(3)).unwrap(), big(-1));
        assert!(matches!(
            int_modulo(&big(7), &big(0)),
            Err(RuntimeError::DivisionByZero)
        ));
    }

    #[test]
    fn test_int_pow() {
        assert_eq!(int_pow(&big(2), &big(10)).unwrap(), big(1024));
        assert_eq!(
            int_pow(&big(10), &big(30)).unwrap().to_string(),
            "1000000000000000000000000000000"
        );
        assert!(matches!(
            int_pow(&big(2), &big(-1)),
            Err(RuntimeError::ArgumentError(_))
        ));
    }

    #[test]
    fn test_round_half_up() {
        assert_eq!(round_half_up(2.5).unwrap(), big(3));
        assert_eq!(round_half_up(-2.5).unwrap(), big(-2));
        assert_eq!(round_half_up(-2.6).unwrap(), big(-3));
        assert_eq!(round_half_up(2.4).unwrap(), big(2));
        assert!(round_half_up(f64::NAN).is_err());
    }

    #[test]
    fn test_compare_numbers() {
        let huge = Payload::Int(big(i64::MAX));
        let huge_plus = Payload::Int(big(i64::MAX) + 1);
        assert_eq!(compare_numbers(&huge, &huge_plus).unwrap(), Some(Ordering::Less));
        assert_eq!(
            compare_numbers(&Payload::Int(big(2)), &Payload::Real(2.0)).unwrap(),
            Some(Ordering::Equal)
        );
        assert_eq!(
            compare_numbers(&Payload::Real(f64::NAN), &Payload::Real(1.0)).unwrap(),
            None
        );
        assert!(compare_numbers(&Payload::Null, &Payload::Real(1.0)).is_err());
    }
}
