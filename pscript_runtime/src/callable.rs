//! Callable values.
//!
//! Generic functions and plain closures are the two kinds of function value.
//! Both are invoked through [`Callable`], so builtins such as `apply` never
//! need to know which kind they hold.

use std::fmt;
use std::rc::Rc;

use crate::dispatch::FunctionId;
use crate::error::RuntimeResult;
use crate::registry::Registry;
use crate::value::Value;

/// Uniform invocation interface.
pub trait Callable {
    fn name(&self) -> &str;

    fn invoke(&self, registry: &mut Registry, args: &[Value]) -> RuntimeResult<Value>;
}

/// Handle to a generic function owned by a [`Registry`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenericRef {
    pub id: FunctionId,
    pub name: Rc<str>,
}

impl Callable for GenericRef {
    fn name(&self) -> &str {
        &self.name
    }

    fn invoke(&self, registry: &mut Registry, args: &[Value]) -> RuntimeResult<Value> {
        registry.call(self.id, args)
    }
}

type ClosureBody = dyn Fn(&mut Registry, &[Value]) -> RuntimeResult<Value>;

/// An anonymous function value that bypasses dispatch.
#[derive(Clone)]
pub struct Closure {
    name: Rc<str>,
    body: Rc<ClosureBody>,
}

impl Closure {
    pub fn new<F>(name: &str, body: F) -> Self
    where
        F: Fn(&mut Registry, &[Value]) -> RuntimeResult<Value> + 'static,
    {
        Self {
            name: Rc::from(name),
            body: Rc::new(body),
        }
    }
}

impl Callable for Closure {
    fn name(&self) -> &str {
        &self.name
    }

    fn invoke(&self, registry: &mut Registry, args: &[Value]) -> RuntimeResult<Value> {
        (self.body)(registry, args)
    }
}

impl PartialEq for Closure {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.body, &other.body)
    }
}

impl fmt::Debug for Closure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Closure").field("name", &self.name).finish()
    }
}

/// The closed set of function values.
#[derive(Debug, Clone, PartialEq)]
pub enum Function {
    Generic(GenericRef),
    Closure(Closure),
}

impl Callable for Function {
    fn name(&self) -> &str {
        match self {
            Function::Generic(g) => g.name(),
            Function::Closure(c) => c.name(),
        }
    }

    fn invoke(&self, registry: &mut Registry, args: &[Value]) -> RuntimeResult<Value> {
        match self {
            Function::Generic(g) => g.invoke(registry, args),
            Function::Closure(c) => c.invoke(registry, args),
        }
    }
}
