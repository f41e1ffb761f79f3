//! Tagged values
//!
//! A [`Value`] is an immutable `(payload, type tag)` pair. The tag is the
//! predicate the dispatch engine sees; the payload is what builtins compute
//! with. An unset tag means `isAny`, resolved by the registry.

use std::fmt;
use std::rc::Rc;

use num_bigint::BigInt;
use num_traits::{FromPrimitive, ToPrimitive};

use crate::callable::{Callable, Function};
use crate::types::Predicate;

/// Raw data carried by a value.
#[derive(Debug, Clone)]
pub enum Payload {
    // ========== Primitive Types ==========
    Null,
    Bool(bool),
    /// Arbitrary precision integer. Characters are code points tagged `isChar`.
    Int(BigInt),
    /// 64-bit floating point
    Real(f64),

    // ========== Heap-Allocated Types ==========
    Str(Rc<str>),
    List(Rc<Vec<Value>>),
    /// Ordered key/value pairs; keys compare structurally.
    Map(Rc<Vec<(Value, Value)>>),

    // ========== First-class types and functions ==========
    Pred(Predicate),
    Function(Function),
}

impl Payload {
    /// Try to extract as bool
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Payload::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Try to extract as an integer. Integral reals convert.
    pub fn as_bigint(&self) -> Option<BigInt> {
        match self {
            Payload::Int(n) => Some(n.clone()),
            Payload::Real(r) if r.fract() == 0.0 => BigInt::from_f64(*r),
            _ => None,
        }
    }

    /// Try to extract as f64
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Payload::Real(r) => Some(*r),
            Payload::Int(n) => n.to_f64(),
            _ => None,
        }
    }

    /// Try to extract as string reference
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Payload::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Payload::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&[(Value, Value)]> {
        match self {
            Payload::Map(entries) => Some(entries),
            _ => None,
        }
    }

    pub fn as_predicate(&self) -> Option<&Predicate> {
        match self {
            Payload::Pred(p) => Some(p),
            _ => None,
        }
    }

    pub fn as_function(&self) -> Option<&Function> {
        match self {
            Payload::Function(f) => Some(f),
            _ => None,
        }
    }
}

// ========== PartialEq implementation ==========

impl PartialEq for Payload {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Payload::Null, Payload::Null) => true,
            (Payload::Bool(a), Payload::Bool(b)) => a == b,
            (Payload::Int(a), Payload::Int(b)) => a == b,
            (Payload::Real(a), Payload::Real(b)) => a == b,
            (Payload::Int(_), Payload::Real(b)) => self.as_f64() == Some(*b),
            (Payload::Real(a), Payload::Int(_)) => other.as_f64() == Some(*a),
            (Payload::Str(a), Payload::Str(b)) => a == b,
            (Payload::List(a), Payload::List(b)) => a == b,
            (Payload::Map(a), Payload::Map(b)) => a == b,
            (Payload::Pred(a), Payload::Pred(b)) => a == b,
            (Payload::Function(a), Payload::Function(b)) => a == b,
            _ => false,
        }
    }
}

/// An immutable payload paired with its type tag.
#[derive(Debug, Clone, PartialEq)]
pub struct Value {
    payload: Payload,
    tag: Option<Predicate>,
}

impl Value {
    pub fn new(payload: Payload, tag: Predicate) -> Self {
        Self {
            payload,
            tag: Some(tag),
        }
    }

    /// A value whose type is the registry's `isAny`.
    pub fn untagged(payload: Payload) -> Self {
        Self { payload, tag: None }
    }

    pub fn payload(&self) -> &Payload {
        &self.payload
    }

    /// The explicit tag, if one was set.
    pub fn tag(&self) -> Option<&Predicate> {
        self.tag.as_ref()
    }

    /// A copy sharing this payload, tagged `tag`.
    pub fn with_tag(&self, tag: Predicate) -> Value {
        Value {
            payload: self.payload.clone(),
            tag: Some(tag),
        }
    }
}

// ========== Display implementation ==========

impl fmt::Display for Payload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Payload::Null => write!(f, "null"),
            Payload::Bool(b) => write!(f, "{}", b),
            Payload::Int(n) => write!(f, "{}", n),
            Payload::Real(r) => write!(f, "{}", r),
            Payload::Str(s) => f.write_str(s),
            Payload::List(items) => {
                write!(f, "[")?;
                for (i, v) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", v)?;
                }
                write!(f, "]")
            }
            Payload::Map(entries) => {
                write!(f, "{{")?;
                for (i, (k, v)) in entries.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}: {}", k, v)?;
                }
                write!(f, "}}")
            }
            Payload::Pred(p) => write!(f, "{}", p),
            Payload::Function(func) => f.write_str(func.name()),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.payload)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::TypeHierarchy;

    #[test]
    fn test_with_tag_shares_payload() {
        let mut h = TypeHierarchy::new();
        let real = h.create_predicate("isReal");
        let int = h.create_predicate("isInt");

        let items = Rc::new(vec![Value::untagged(Payload::Null)]);
        let original = Value::new(Payload::List(items.clone()), real.clone());
        let retagged = original.with_tag(int.clone());

        assert_eq!(original.tag(), Some(&real));
        assert_eq!(retagged.tag(), Some(&int));
        assert_eq!(original.payload(), retagged.payload());
        assert_eq!(Rc::strong_count(&items), 3);
    }

    #[test]
    fn test_numeric_payload_equality() {
        assert_eq!(Payload::Int(BigInt::from(2)), Payload::Real(2.0));
        assert_ne!(Payload::Int(BigInt::from(2)), Payload::Real(2.5));
        assert_eq!(Payload::Real(3.0).as_bigint(), Some(BigInt::from(3)));
        assert_eq!(Payload::Real(3.5).as_bigint(), None);
    }

    #[test]
    fn test_value_display() {
        let list = Payload::List(Rc::new(vec![
            Value::untagged(Payload::Int(BigInt::from(1))),
            Value::untagged(Payload::Str(Rc::from("a"))),
        ]));
        assert_eq!(format!("{}", list), "[1, a]");
        assert_eq!(format!("{}", Payload::Real(2.5)), "2.5");
        assert_eq!(format!("{}", Payload::Real(3.0)), "3");
        assert_eq!(format!("{}", Payload::Null), "null");
    }
}
