//! End-to-end tests for the base library.

use std::cell::RefCell;
use std::rc::Rc;

use num_bigint::BigInt;
use pretty_assertions::assert_eq;
use pscript_base::{install, install_with_output, Base};
use pscript_runtime::prelude::*;

fn setup() -> (Registry, Base) {
    let mut registry = Registry::new();
    let base = install(&mut registry).unwrap();
    (registry, base)
}

fn call(registry: &mut Registry, name: &str, args: &[Value]) -> Value {
    registry
        .call_by_name(name, args)
        .unwrap_or_else(|e| panic!("{name} failed: {e}"))
}

fn call_err(registry: &mut Registry, name: &str, args: &[Value]) -> RuntimeError {
    match registry.call_by_name(name, args) {
        Ok(v) => panic!("{name} unexpectedly returned {v}"),
        Err(e) => e,
    }
}

// ==================== Numbers ====================

#[test]
fn test_integer_arithmetic() {
    let (mut r, base) = setup();
    let t = base.types.clone();
    assert_eq!(call(&mut r, "add", &[t.int(2), t.int(3)]), t.int(5));
    assert_eq!(call(&mut r, "sub", &[t.int(2), t.int(3)]), t.int(-1));
    assert_eq!(call(&mut r, "times", &[t.int(4), t.int(3)]), t.int(12));
    assert_eq!(call(&mut r, "divide", &[t.int(-7), t.int(2)]), t.int(-4));
    assert_eq!(call(&mut r, "mod", &[t.int(-7), t.int(2)]), t.int(-1));
    assert_eq!(call(&mut r, "pow", &[t.int(3), t.int(4)]), t.int(81));
}

#[test]
fn test_real_and_mixed_arithmetic() {
    let (mut r, base) = setup();
    let t = base.types.clone();
    assert_eq!(call(&mut r, "add", &[t.real(0.5), t.real(0.25)]), t.real(0.75));
    assert_eq!(call(&mut r, "divide", &[t.int(7), t.real(2.0)]), t.real(3.5));
    assert_eq!(call(&mut r, "pow", &[t.real(2.0), t.real(3.0)]), t.real(8.0));

    // Characters are integers, so a character plus an integer is an integer.
    let sum = call(&mut r, "add", &[t.char('a'), t.int(1)]);
    assert_eq!(sum, t.int(98));
}

#[test]
fn test_arithmetic_errors() {
    let (mut r, base) = setup();
    let t = base.types.clone();
    assert!(matches!(
        call_err(&mut r, "divide", &[t.int(1), t.int(0)]),
        RuntimeError::DivisionByZero
    ));
    assert!(matches!(
        call_err(&mut r, "mod", &[t.real(1.0), t.real(0.0)]),
        RuntimeError::DivisionByZero
    ));
    assert!(matches!(
        call_err(&mut r, "pow", &[t.int(2), t.int(-1)]),
        RuntimeError::ArgumentError(_)
    ));

    let err = call_err(&mut r, "sub", &[t.string("a"), t.int(1)]);
    assert!(err.is_no_implementation());
}

#[test]
fn test_neg_equality_and_comparison() {
    let (mut r, base) = setup();
    let t = base.types.clone();
    let yes = r.boolean(true);
    let no = r.boolean(false);

    assert_eq!(call(&mut r, "neg", &[t.int(5)]), t.int(-5));
    assert_eq!(call(&mut r, "neg", &[t.real(1.5)]), t.real(-1.5));
    assert_eq!(call(&mut r, "neg", &[yes.clone()]), no);
    let neg = r.generic_function(base.numbers.neg).unwrap();
    assert!(neg.predicate().is_none());

    assert_eq!(call(&mut r, "is", &[t.int(2), t.real(2.0)]), yes);
    assert_eq!(call(&mut r, "is", &[t.string("a"), t.string("a")]), yes);
    assert_eq!(call(&mut r, "is", &[t.string("a"), t.int(1)]), no);
    let list = t.list(vec![t.int(1)]);
    assert_eq!(call(&mut r, "is", &[list.clone(), list]), yes);

    assert_eq!(call(&mut r, "isLessThan", &[t.int(1), t.real(1.5)]), yes);
    assert_eq!(call(&mut r, "isLessThanEq", &[t.int(2), t.int(2)]), yes);
    assert_eq!(call(&mut r, "isGreaterThan", &[t.int(2), t.int(2)]), no);
    assert_eq!(call(&mut r, "isGreaterThanEq", &[t.real(f64::NAN), t.int(0)]), no);
}

#[test]
fn test_int_conversion() {
    let (mut r, base) = setup();
    let t = base.types.clone();
    let yes = r.boolean(true);
    assert_eq!(call(&mut r, "int", &[yes]), t.int(1));
    assert_eq!(call(&mut r, "int", &[t.char('A')]), t.int(65));
    assert_eq!(call(&mut r, "int", &[t.real(2.5)]), t.int(3));
    assert_eq!(call(&mut r, "int", &[t.real(-2.5)]), t.int(-2));
    assert_eq!(call(&mut r, "int", &[t.int(7)]), t.int(7));
}

// ==================== Text and collections ====================

#[test]
fn test_str() {
    let (mut r, base) = setup();
    let t = base.types.clone();
    let nested = t.list(vec![t.int(1), t.list(vec![t.char('c')]), r.null()]);
    assert_eq!(call(&mut r, "str", &[nested]), t.string("[1, [c], null]"));
    assert_eq!(call(&mut r, "str", &[t.real(3.0)]), t.string("3"));
    assert_eq!(call(&mut r, "add", &[t.string("x="), t.real(0.5)]), t.string("x=0.5"));
}

#[test]
fn test_collections() {
    let (mut r, base) = setup();
    let t = base.types.clone();
    let yes = r.boolean(true);
    let no = r.boolean(false);
    let list = t.list(vec![t.int(10), t.int(20)]);
    let text = t.string("héllo");
    let map = t.map(vec![(t.string("a"), t.int(1))]);

    assert_eq!(call(&mut r, "size", &[list.clone()]), t.int(2));
    assert_eq!(call(&mut r, "size", &[text.clone()]), t.int(5));
    assert_eq!(call(&mut r, "isEmpty", &[t.list(vec![])]), yes);
    assert_eq!(call(&mut r, "isEmpty", &[map.clone()]), no);

    assert_eq!(call(&mut r, "get", &[list.clone(), t.int(1)]), t.int(20));
    assert_eq!(call(&mut r, "get", &[text.clone(), t.int(1)]), t.char('é'));
    assert_eq!(call(&mut r, "get", &[map.clone(), t.string("a")]), t.int(1));
    assert_eq!(call(&mut r, "get", &[map.clone(), t.string("z")]), r.null());

    let updated = call(&mut r, "set", &[list.clone(), t.int(0), t.string("x")]);
    assert_eq!(updated, t.list(vec![t.string("x"), t.int(20)]));
    assert_eq!(call(&mut r, "get", &[list.clone(), t.int(0)]), t.int(10));

    let word = call(&mut r, "set", &[text, t.int(0), t.char('H')]);
    assert_eq!(word, t.string("Héllo"));

    let map2 = call(&mut r, "set", &[map.clone(), t.string("b"), t.int(2)]);
    assert_eq!(call(&mut r, "size", &[map2]), t.int(2));
    let map3 = call(&mut r, "set", &[map, t.string("a"), t.int(5)]);
    assert_eq!(map3, t.map(vec![(t.string("a"), t.int(5))]));

    assert!(matches!(
        call_err(&mut r, "get", &[list.clone(), t.int(2)]),
        RuntimeError::BoundsError { index: 2, length: 2 }
    ));
    assert!(matches!(
        call_err(&mut r, "set", &[list, t.int(-1), t.int(0)]),
        RuntimeError::BoundsError { index: -1, length: 2 }
    ));
}

#[test]
fn test_is_empty_is_a_predicate() {
    let (mut r, base) = setup();
    let t = base.types.clone();
    let gf = r.generic_function(base.collections.is_empty).unwrap();
    let empty = gf.predicate().cloned().unwrap();

    let cast = r.cast(&empty, t.string("")).unwrap();
    assert_eq!(cast.tag(), Some(&empty));
    assert!(r.cast(&empty, t.string("x")).is_err());
}

// ==================== Reflection ====================

#[test]
fn test_type_derive_and_is_a() {
    let (mut r, base) = setup();
    let t = base.types.clone();
    let int_value = r.predicate_value(&t.int);
    let real_value = r.predicate_value(&t.real);
    let yes = r.boolean(true);
    let no = r.boolean(false);

    assert_eq!(call(&mut r, "type", &[t.int(1)]), int_value);
    assert_eq!(call(&mut r, "isA", &[real_value.clone(), int_value.clone()]), yes);
    assert_eq!(call(&mut r, "isA", &[int_value.clone(), real_value]), no);

    let nat = r.create_predicate("isNat");
    let nat_value = r.predicate_value(&nat);
    assert_eq!(call(&mut r, "derive", &[int_value.clone(), nat_value.clone()]), r.null());
    assert!(r.is_a(&t.real, &nat));

    let err = call_err(&mut r, "derive", &[int_value, nat_value]);
    assert!(matches!(err, RuntimeError::Hierarchy(HierarchyError::Reparent { .. })));
}

#[test]
fn test_checked_and_unchecked_casts() {
    let (mut r, base) = setup();
    let t = base.types.clone();
    let int_value = r.predicate_value(&t.int);
    let string_value = r.predicate_value(&t.string);

    let four = call(&mut r, "as", &[int_value.clone(), t.real(4.0)]);
    assert_eq!(four.tag(), Some(&t.int));

    let err = call_err(&mut r, "as", &[int_value, t.real(4.5)]);
    assert_eq!(err.to_string(), "CastError: cannot cast isReal to isInt");

    let forced = call(&mut r, "AS", &[string_value, t.int(1)]);
    assert_eq!(forced.tag(), Some(&t.string));
    assert_eq!(forced.payload(), t.int(1).payload());
}

#[test]
fn test_apply() {
    let (mut r, base) = setup();
    let t = base.types.clone();
    let args = t.list(vec![t.int(2), t.int(5)]);

    let add = r.function_value(base.numbers.add).unwrap();
    assert_eq!(call(&mut r, "apply", &[add, args.clone()]), t.int(7));

    let times = base.numbers.times;
    let square = r.closure_value(Closure::new("square", move |r, args| {
        r.call(times, &[args[0].clone(), args[0].clone()])
    }));
    assert_eq!(call(&mut r, "apply", &[square, t.list(vec![t.int(9)])]), t.int(81));

    let is_int = r.predicate_value(&t.int);
    let yes = r.boolean(true);
    assert_eq!(call(&mut r, "apply", &[is_int, t.list(vec![t.real(2.0)])]), yes);

    assert!(call_err(&mut r, "apply", &[t.int(1), args]).is_no_implementation());
}

#[test]
fn test_println_writes_through_str() {
    let buffer = Rc::new(RefCell::new(Vec::<u8>::new()));
    let mut r = Registry::new();
    let base = install_with_output(&mut r, buffer.clone()).unwrap();
    let t = base.types.clone();

    assert_eq!(call(&mut r, "println", &[t.list(vec![t.char('h'), t.int(1)])]), r.null());
    assert_eq!(call(&mut r, "println", &[]), r.null());
    assert_eq!(call(&mut r, "println", &[t.string("done")]), r.null());

    let written = String::from_utf8(buffer.borrow().clone()).unwrap();
    assert_eq!(written, "[h, 1]\n\ndone\n");
}

// ==================== User-defined types ====================

#[test]
fn test_user_subtype_flows_through_builtins() {
    let (mut r, base) = setup();
    let t = base.types.clone();
    let even = r.define_predicate("isEven", &t.int).unwrap();
    let test = r.membership_test(&even).unwrap();
    r.register_entry(test, vec![t.int.clone()], r.kernel().bool.clone(), |r, args| {
        let even = args[0]
            .payload()
            .as_bigint()
            .is_some_and(|n| n % BigInt::from(2) == BigInt::from(0));
        Ok(r.boolean(even))
    })
    .unwrap();

    let even_value = r.predicate_value(&even);
    let two = call(&mut r, "as", &[even_value.clone(), t.int(2)]);
    let four = call(&mut r, "as", &[even_value.clone(), t.int(4)]);
    assert_eq!(two.tag(), Some(&even));
    assert!(call_err(&mut r, "as", &[even_value, t.int(3)]).to_string().starts_with("CastError"));

    let sum = call(&mut r, "add", &[two.clone(), four]);
    assert_eq!(sum, t.int(6));
    assert_eq!(call(&mut r, "str", &[two]), t.string("2"));
    assert_eq!(r.probe_return_type(base.numbers.add, &[even.clone(), even]).unwrap(), Some(t.int));
}
