//! The registry: one type hierarchy plus every generic function.
//!
//! A [`Registry`] is passed explicitly instead of living in globals, so every
//! test can build an independent world. Usage is two-phase: a load phase of
//! `derive` / `register_entry` / `set_default` calls, then a call phase of
//! `call`, `resolve` and `is_a`.

use std::collections::{HashMap, HashSet};
use std::rc::Rc;

use crate::callable::{Closure, Function, GenericRef};
use crate::config::RegistryConfig;
use crate::dispatch::{DefaultEntry, FunctionId, GenericFunction, Implementation, MethodEntry};
use crate::error::{RuntimeError, RuntimeResult};
use crate::types::{Predicate, TypeHierarchy};
use crate::value::{Payload, Value};

/// Predicates every registry starts with.
///
/// `isAny` is the root; `isBool`, `isNull` and `isFn` derive from it and
/// `isPred` derives from `isFn`, since predicates are callable.
#[derive(Debug, Clone)]
pub struct Kernel {
    pub any: Predicate,
    pub pred: Predicate,
    pub function: Predicate,
    pub bool: Predicate,
    pub null: Predicate,
}

#[derive(Debug)]
pub struct Registry {
    config: RegistryConfig,
    hierarchy: TypeHierarchy,
    functions: Vec<GenericFunction>,
    /// Name -> newest generic function created under that name.
    names: HashMap<String, FunctionId>,
    /// Predicate -> its membership-test generic function.
    tests: HashMap<Predicate, FunctionId>,
    /// Functions that became predicates by promotion rather than definition.
    promoted: HashSet<FunctionId>,
    kernel: Kernel,
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

impl Registry {
    pub fn new() -> Self {
        Self::with_config(RegistryConfig::default())
    }

    pub fn with_config(config: RegistryConfig) -> Self {
        let mut hierarchy = TypeHierarchy::new();
        let any = hierarchy.create_predicate("isAny");
        let pred = hierarchy.create_predicate("isPred");
        let function = hierarchy.create_predicate("isFn");
        let bool = hierarchy.create_predicate("isBool");
        let null = hierarchy.create_predicate("isNull");

        for (parent, child) in [(&any, &bool), (&any, &null), (&any, &function), (&function, &pred)] {
            let linked = hierarchy.derive(parent, child);
            debug_assert!(linked.is_ok(), "kernel hierarchy must link");
        }

        let mut registry = Self {
            config,
            hierarchy,
            functions: Vec::new(),
            names: HashMap::new(),
            tests: HashMap::new(),
            promoted: HashSet::new(),
            kernel: Kernel {
                any,
                pred,
                function,
                bool,
                null,
            },
        };

        let kernel = registry.kernel.clone();
        for p in [&kernel.any, &kernel.pred, &kernel.function, &kernel.bool, &kernel.null] {
            registry.attach_membership_test(p);
        }
        registry
    }

    pub fn config(&self) -> &RegistryConfig {
        &self.config
    }

    pub fn kernel(&self) -> &Kernel {
        &self.kernel
    }

    pub fn hierarchy(&self) -> &TypeHierarchy {
        &self.hierarchy
    }

    // ========== Kernel values ==========

    pub fn boolean(&self, b: bool) -> Value {
        Value::new(Payload::Bool(b), self.kernel.bool.clone())
    }

    pub fn null(&self) -> Value {
        Value::new(Payload::Null, self.kernel.null.clone())
    }

    /// A predicate as a first-class value, tagged `isPred`.
    pub fn predicate_value(&self, pred: &Predicate) -> Value {
        Value::new(Payload::Pred(pred.clone()), self.kernel.pred.clone())
    }

    /// A generic function as a first-class value.
    ///
    /// Functions that serve as a predicate's membership test are that predicate.
    pub fn function_value(&self, id: FunctionId) -> RuntimeResult<Value> {
        let gf = self.generic_function(id)?;
        if let Some(pred) = gf.predicate() {
            return Ok(self.predicate_value(pred));
        }
        let func = Function::Generic(GenericRef {
            id,
            name: gf.shared_name(),
        });
        Ok(Value::new(Payload::Function(func), self.kernel.function.clone()))
    }

    /// A closure as a first-class value, tagged `isFn`.
    pub fn closure_value(&self, closure: Closure) -> Value {
        Value::new(
            Payload::Function(Function::Closure(closure)),
            self.kernel.function.clone(),
        )
    }

    /// The value's tag, or `isAny` when unset.
    pub fn type_of(&self, value: &Value) -> Predicate {
        value
            .tag()
            .cloned()
            .unwrap_or_else(|| self.kernel.any.clone())
    }

    // ========== Type hierarchy ==========

    pub fn create_predicate(&mut self, name: &str) -> Predicate {
        self.hierarchy.create_predicate(name)
    }

    /// Create a predicate with a membership test and link it under `parent`.
    ///
    /// The test answers `FALSE` for any value and `TRUE` for values of the new
    /// predicate (and therefore of everything later derived from it).
    pub fn define_predicate(&mut self, name: &str, parent: &Predicate) -> RuntimeResult<Predicate> {
        let pred = self.hierarchy.create_predicate(name);
        self.derive(parent, &pred)?;
        self.attach_membership_test(&pred);
        Ok(pred)
    }

    /// Link `child` under `parent`. Clears every dispatch cache.
    ///
    /// If `parent`'s membership test has no entry declared on `parent` or
    /// below it that accepts `child`, a `(child) -> TRUE` entry is added so
    /// the test answers yes for the child's values.
    pub fn derive(&mut self, parent: &Predicate, child: &Predicate) -> RuntimeResult<()> {
        self.hierarchy.derive(parent, child)?;
        for gf in &self.functions {
            gf.invalidate_cache();
        }

        let Some(test) = self.membership_test(parent) else {
            return Ok(());
        };
        let covered = self
            .resolve(test, std::slice::from_ref(child), true)?
            .and_then(|entry| entry.arg_types.first())
            .is_some_and(|declared| self.is_a(parent, declared));
        if !covered {
            self.add_true_entry(test, child)?;
        }
        Ok(())
    }

    pub fn is_a(&self, ancestor: &Predicate, descendant: &Predicate) -> bool {
        self.hierarchy.is_a(ancestor, descendant)
    }

    pub fn parent_of(&self, pred: &Predicate) -> Option<&Predicate> {
        self.hierarchy.parent_of(pred)
    }

    pub fn ancestors_of(&self, pred: &Predicate) -> HashSet<Predicate> {
        self.hierarchy.ancestors_of(pred)
    }

    pub fn descendants_of(&self, pred: &Predicate) -> HashSet<Predicate> {
        self.hierarchy.descendants_of(pred)
    }

    /// Distance between two predicates under the configured metric.
    pub fn type_distance(&self, actual: &Predicate, declared: &Predicate) -> u32 {
        self.hierarchy.distance(self.config.distance, actual, declared)
    }

    /// The generic function that tests membership in `pred`, if any.
    pub fn membership_test(&self, pred: &Predicate) -> Option<FunctionId> {
        self.tests.get(pred).copied()
    }

    // ========== Generic functions ==========

    /// Create an empty generic function. The name is rebound to the new function.
    pub fn create_generic_function(&mut self, name: &str) -> FunctionId {
        let id = FunctionId(u32::try_from(self.functions.len()).unwrap_or(u32::MAX));
        self.functions.push(GenericFunction::new(id, name));
        self.names.insert(name.to_string(), id);
        id
    }

    /// Look up the generic function currently bound to `name`.
    pub fn function(&self, name: &str) -> RuntimeResult<FunctionId> {
        self.names
            .get(name)
            .copied()
            .ok_or_else(|| RuntimeError::UnknownFunction(name.to_string()))
    }

    pub fn generic_function(&self, id: FunctionId) -> RuntimeResult<&GenericFunction> {
        self.functions
            .get(id.index())
            .ok_or_else(|| RuntimeError::UnknownFunction(id.to_string()))
    }

    fn generic_function_mut(&mut self, id: FunctionId) -> RuntimeResult<&mut GenericFunction> {
        self.functions
            .get_mut(id.index())
            .ok_or_else(|| RuntimeError::UnknownFunction(id.to_string()))
    }

    pub fn generic_functions(&self) -> &[GenericFunction] {
        &self.functions
    }

    /// Register `implementation` for `arg_types`, replacing any entry with the
    /// same argument types.
    ///
    /// The stored implementation is wrapped so that its result is checked
    /// against (or coerced to) `return_type`. A function whose entries are all
    /// one-argument `isBool` tests becomes a predicate, if it is not one already.
    /// A promoted function that later gains any other kind of entry loses its
    /// predicate link again, so the outcome does not depend on registration order.
    pub fn register_entry<F>(
        &mut self,
        id: FunctionId,
        arg_types: Vec<Predicate>,
        return_type: Predicate,
        implementation: F,
    ) -> RuntimeResult<()>
    where
        F: Fn(&mut Registry, &[Value]) -> RuntimeResult<Value> + 'static,
    {
        let name = self.generic_function(id)?.shared_name();
        let wrapped = typed(name, return_type.clone(), implementation);

        self.generic_function_mut(id)?
            .add_entry(MethodEntry::new(arg_types, return_type, wrapped));

        let gf = self.generic_function(id)?;
        let unary_test = gf
            .entries()
            .iter()
            .all(|e| e.arg_types.len() == 1 && e.return_type == self.kernel.bool);
        if unary_test && gf.predicate().is_none() {
            self.promote_to_predicate(id)?;
        } else if !unary_test && self.promoted.contains(&id) {
            self.demote_from_predicate(id)?;
        }
        Ok(())
    }

    /// Replace the entry used when nothing matches.
    pub fn set_default<F>(&mut self, id: FunctionId, return_type: Predicate, implementation: F) -> RuntimeResult<()>
    where
        F: Fn(&mut Registry, &[Value]) -> RuntimeResult<Value> + 'static,
    {
        let name = self.generic_function(id)?.shared_name();
        let wrapped = typed(name, return_type.clone(), implementation);
        self.generic_function_mut(id)?
            .set_default(DefaultEntry::new(return_type, wrapped));
        Ok(())
    }

    /// Select the entry for `arg_types` without invoking it.
    ///
    /// `Ok(None)` means no entry matched, so a call would use the default. With
    /// `dont_throw`, an ambiguous call also yields `Ok(None)` instead of an error.
    pub fn resolve(
        &self,
        id: FunctionId,
        arg_types: &[Predicate],
        dont_throw: bool,
    ) -> RuntimeResult<Option<&MethodEntry>> {
        let gf = self.generic_function(id)?;
        let selected = gf.select(
            &self.hierarchy,
            self.config.distance,
            self.config.dispatch_cache,
            arg_types,
            dont_throw,
        )?;
        Ok(selected.map(|i| &gf.entries()[i]))
    }

    /// Declared return type of whatever a call with `arg_types` would run:
    /// the selected entry, else the default. `None` if the call cannot succeed.
    pub fn probe_return_type(&self, id: FunctionId, arg_types: &[Predicate]) -> RuntimeResult<Option<Predicate>> {
        let gf = self.generic_function(id)?;
        let selected = gf.select(
            &self.hierarchy,
            self.config.distance,
            self.config.dispatch_cache,
            arg_types,
            false,
        );
        Ok(match selected {
            Ok(Some(i)) => Some(gf.entries()[i].return_type.clone()),
            Ok(None) => gf.default_entry().map(|d| d.return_type.clone()),
            Err(_) => None,
        })
    }

    /// Dispatch a call on the runtime types of `args`.
    pub fn call(&mut self, id: FunctionId, args: &[Value]) -> RuntimeResult<Value> {
        let actual: Vec<Predicate> = args.iter().map(|a| self.type_of(a)).collect();
        let implementation: Implementation = {
            let gf = self.generic_function(id)?;
            let selected = gf.select(
                &self.hierarchy,
                self.config.distance,
                self.config.dispatch_cache,
                &actual,
                false,
            )?;
            match (selected, gf.default_entry()) {
                (Some(i), _) => gf.entries()[i].implementation(),
                (None, Some(default)) => default.implementation(),
                (None, None) => return Err(gf.no_implementation(&actual).into()),
            }
        };
        implementation(self, args)
    }

    pub fn call_by_name(&mut self, name: &str, args: &[Value]) -> RuntimeResult<Value> {
        let id = self.function(name)?;
        self.call(id, args)
    }

    // ========== Typed invocation ==========

    /// Return `value` if it already satisfies `expected`, a re-tagged copy if
    /// `expected`'s membership test accepts it, else a `ReturnType` error.
    pub fn cast_or_fail(&mut self, function: &str, expected: &Predicate, value: Value) -> RuntimeResult<Value> {
        let actual = self.type_of(&value);
        if self.is_a(expected, &actual) {
            return Ok(value);
        }
        if self.is_coercible(expected, &value)? {
            return Ok(value.with_tag(expected.clone()));
        }
        Err(RuntimeError::ReturnType {
            function: function.to_string(),
            expected: expected.clone(),
            actual,
        })
    }

    /// Checked cast: like [`Registry::cast_or_fail`] but reports a `Cast` error.
    pub fn cast(&mut self, expected: &Predicate, value: Value) -> RuntimeResult<Value> {
        let actual = self.type_of(&value);
        if self.is_a(expected, &actual) {
            return Ok(value);
        }
        if self.is_coercible(expected, &value)? {
            return Ok(value.with_tag(expected.clone()));
        }
        Err(RuntimeError::Cast {
            from: actual,
            to: expected.clone(),
        })
    }

    /// Ask `expected`'s membership test whether `value` belongs to it.
    ///
    /// Predicates without a test, and tests with no entry for the value,
    /// answer no.
    pub fn is_coercible(&mut self, expected: &Predicate, value: &Value) -> RuntimeResult<bool> {
        let Some(test) = self.membership_test(expected) else {
            return Ok(false);
        };
        match self.call(test, std::slice::from_ref(value)) {
            Ok(answer) => Ok(answer.payload().as_bool() == Some(true)),
            Err(err) if err.is_no_implementation() => Ok(false),
            Err(err) => Err(err),
        }
    }

    // ========== Internals ==========

    /// Create `pred`'s membership test: `(isAny) -> FALSE`, `(pred) -> TRUE`.
    fn attach_membership_test(&mut self, pred: &Predicate) {
        let id = self.create_generic_function(pred.name());
        let bool = self.kernel.bool.clone();
        let name = self.functions[id.index()].shared_name();

        let any = self.kernel.any.clone();

        let gf = &mut self.functions[id.index()];
        gf.set_predicate(pred.clone());
        if *pred != any {
            gf.add_entry(MethodEntry::new(
                vec![any],
                bool.clone(),
                typed(name, bool, |r: &mut Registry, _: &[Value]| Ok(r.boolean(false))),
            ));
        }
        let added = self.add_true_entry(id, pred);
        debug_assert!(added.is_ok(), "membership test was just created");
        self.tests.insert(pred.clone(), id);
    }

    /// Add `(pred) -> TRUE` to the membership test `test`.
    fn add_true_entry(&mut self, test: FunctionId, pred: &Predicate) -> RuntimeResult<()> {
        let bool = self.kernel.bool.clone();
        let name = self.generic_function(test)?.shared_name();
        self.generic_function_mut(test)?.add_entry(MethodEntry::new(
            vec![pred.clone()],
            bool.clone(),
            typed(name, bool, |r: &mut Registry, _: &[Value]| Ok(r.boolean(true))),
        ));
        Ok(())
    }

    /// Give a one-argument boolean function a predicate of its own name.
    fn promote_to_predicate(&mut self, id: FunctionId) -> RuntimeResult<()> {
        let name = self.generic_function(id)?.shared_name();
        let pred = self.hierarchy.create_predicate(&name);
        let any = self.kernel.any.clone();
        self.derive(&any, &pred)?;
        self.generic_function_mut(id)?.set_predicate(pred.clone());
        self.tests.insert(pred, id);
        self.promoted.insert(id);
        Ok(())
    }

    /// Undo a promotion. The predicate stays in the hierarchy without a test.
    fn demote_from_predicate(&mut self, id: FunctionId) -> RuntimeResult<()> {
        if let Some(pred) = self.generic_function_mut(id)?.clear_predicate() {
            self.tests.remove(&pred);
        }
        self.promoted.remove(&id);
        Ok(())
    }
}

/// Wrap a raw implementation so its result is checked against `return_type`.
fn typed<F>(function: Rc<str>, return_type: Predicate, implementation: F) -> Implementation
where
    F: Fn(&mut Registry, &[Value]) -> RuntimeResult<Value> + 'static,
{
    Rc::new(move |registry: &mut Registry, args: &[Value]| {
        let raw = implementation(registry, args)?;
        registry.cast_or_fail(&function, &return_type, raw)
    })
}
