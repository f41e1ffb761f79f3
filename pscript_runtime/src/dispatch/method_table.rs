//! Generic functions: a named, ordered list of entries plus a default.
//!
//! Contains `MethodEntry` and `GenericFunction`, which registers entries and
//! selects one for a call's actual argument types.

use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use serde::{Deserialize, Serialize};

use super::resolution::{self, Resolution};
#[cfg(debug_assertions)]
use crate::debug::{dispatch_debug_enabled, dispatch_debug_log};
use crate::error::RuntimeResult;
use crate::registry::Registry;
use crate::types::{format_signature, DispatchError, DistanceMetric, Predicate, TypeHierarchy};
use crate::value::Value;

/// Index of a generic function inside its registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct FunctionId(pub(crate) u32);

impl FunctionId {
    pub(crate) fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for FunctionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Stored implementation: receives the registry so it can dispatch further.
pub type Implementation = Rc<dyn Fn(&mut Registry, &[Value]) -> RuntimeResult<Value>>;

/// One `(argument types -> implementation)` row of a generic function.
#[derive(Clone)]
pub struct MethodEntry {
    pub arg_types: Vec<Predicate>,
    pub return_type: Predicate,
    implementation: Implementation,
}

impl MethodEntry {
    pub fn new(arg_types: Vec<Predicate>, return_type: Predicate, implementation: Implementation) -> Self {
        Self {
            arg_types,
            return_type,
            implementation,
        }
    }

    pub fn implementation(&self) -> Implementation {
        Rc::clone(&self.implementation)
    }
}

impl fmt::Debug for MethodEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "MethodEntry{} -> {}",
            format_signature(&self.arg_types),
            self.return_type
        )
    }
}

/// Entry used when no registered entry matches.
#[derive(Clone)]
pub struct DefaultEntry {
    pub return_type: Predicate,
    implementation: Implementation,
}

impl DefaultEntry {
    pub fn new(return_type: Predicate, implementation: Implementation) -> Self {
        Self {
            return_type,
            implementation,
        }
    }

    pub fn implementation(&self) -> Implementation {
        Rc::clone(&self.implementation)
    }
}

impl fmt::Debug for DefaultEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DefaultEntry -> {}", self.return_type)
    }
}

/// A generic function (multimethod).
#[derive(Debug)]
pub struct GenericFunction {
    id: FunctionId,
    name: Rc<str>,
    entries: Vec<MethodEntry>,
    /// `None` means calls with no matching entry raise `NoImplementation`.
    default: Option<DefaultEntry>,
    /// Set when this function is the membership test of a predicate.
    predicate: Option<Predicate>,
    /// Dispatch result cache: maps actual argument types to the index of the
    /// selected entry (`None` for the default). Cleared on registration and
    /// whenever the hierarchy changes.
    dispatch_cache: RefCell<HashMap<Vec<Predicate>, Option<usize>>>,
}

impl GenericFunction {
    pub(crate) fn new(id: FunctionId, name: &str) -> Self {
        Self {
            id,
            name: Rc::from(name),
            entries: Vec::new(),
            default: None,
            predicate: None,
            dispatch_cache: RefCell::new(HashMap::new()),
        }
    }

    pub fn id(&self) -> FunctionId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub(crate) fn shared_name(&self) -> Rc<str> {
        Rc::clone(&self.name)
    }

    pub fn entries(&self) -> &[MethodEntry] {
        &self.entries
    }

    pub fn default_entry(&self) -> Option<&DefaultEntry> {
        self.default.as_ref()
    }

    /// The predicate this function is the membership test of, if any.
    pub fn predicate(&self) -> Option<&Predicate> {
        self.predicate.as_ref()
    }

    pub(crate) fn clear_predicate(&mut self) -> Option<Predicate> {
        self.predicate.take()
    }

    pub(crate) fn set_predicate(&mut self, predicate: Predicate) {
        self.predicate = Some(predicate);
    }

    /// Signatures of all registered entries, in registration order.
    pub fn signatures(&self) -> Vec<Vec<Predicate>> {
        self.entries.iter().map(|e| e.arg_types.clone()).collect()
    }

    /// Add an entry.
    /// If an entry with the same argument types already exists, replace it
    /// in place instead of adding a duplicate.
    pub fn add_entry(&mut self, entry: MethodEntry) {
        if let Some(pos) = self
            .entries
            .iter()
            .position(|existing| existing.arg_types == entry.arg_types)
        {
            self.entries[pos] = entry;
        } else {
            self.entries.push(entry);
        }
        self.invalidate_cache();
    }

    pub fn set_default(&mut self, default: DefaultEntry) {
        self.default = Some(default);
        self.invalidate_cache();
    }

    pub(crate) fn invalidate_cache(&self) {
        self.dispatch_cache.borrow_mut().clear();
    }

    #[cfg(test)]
    pub(crate) fn cache_len(&self) -> usize {
        self.dispatch_cache.borrow().len()
    }

    /// Select the entry for `actual` argument types.
    ///
    /// Returns `Ok(Some(index))` for a unique best entry and `Ok(None)` when
    /// nothing matched. A tie raises `Ambiguous`, unless `dont_throw` is set, in
    /// which case the tie is reported as `Ok(None)` and not cached.
    pub fn select(
        &self,
        hierarchy: &TypeHierarchy,
        metric: DistanceMetric,
        use_cache: bool,
        actual: &[Predicate],
        dont_throw: bool,
    ) -> Result<Option<usize>, DispatchError> {
        if use_cache {
            if let Some(&cached) = self.dispatch_cache.borrow().get(actual) {
                #[cfg(debug_assertions)]
                if dispatch_debug_enabled() {
                    dispatch_debug_log(format_args!(
                        "[DISPATCH] {}{}: cache hit -> {:?}",
                        self.name,
                        format_signature(actual),
                        cached
                    ));
                }
                return Ok(cached);
            }
        }

        let signatures = self.entries.iter().map(|e| e.arg_types.as_slice());
        let selected = match resolution::resolve(signatures, hierarchy, metric, actual) {
            Resolution::Unique(best) => Some(best.index),
            Resolution::NoMatch => None,
            Resolution::Ambiguous(tied) => {
                #[cfg(debug_assertions)]
                if dispatch_debug_enabled() {
                    dispatch_debug_log(format_args!(
                        "[DISPATCH] {}{}: {} entries tie at distance {}",
                        self.name,
                        format_signature(actual),
                        tied.len(),
                        tied.first().map_or(0, |c| c.distance)
                    ));
                }
                if dont_throw {
                    return Ok(None);
                }
                return Err(DispatchError::Ambiguous {
                    function: self.name.to_string(),
                    arg_types: actual.to_vec(),
                    candidates: tied
                        .iter()
                        .map(|c| self.entries[c.index].arg_types.clone())
                        .collect(),
                });
            }
        };

        #[cfg(debug_assertions)]
        if dispatch_debug_enabled() {
            dispatch_debug_log(format_args!(
                "[DISPATCH] {}{} -> {}",
                self.name,
                format_signature(actual),
                selected.map_or_else(
                    || "default".to_string(),
                    |i| format_signature(&self.entries[i].arg_types)
                )
            ));
        }

        if use_cache {
            self.dispatch_cache
                .borrow_mut()
                .insert(actual.to_vec(), selected);
        }
        Ok(selected)
    }

    /// The error raised when nothing matches and there is no default.
    pub fn no_implementation(&self, actual: &[Predicate]) -> DispatchError {
        DispatchError::NoImplementation {
            function: self.name.to_string(),
            arg_types: actual.to_vec(),
            candidates: self.signatures(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Payload;

    fn constant(payload: Payload) -> Implementation {
        Rc::new(move |_: &mut Registry, _: &[Value]| Ok(Value::untagged(payload.clone())))
    }

    fn setup() -> (TypeHierarchy, Predicate, Predicate) {
        let mut h = TypeHierarchy::new();
        let real = h.create_predicate("isReal");
        let int = h.create_predicate("isInt");
        h.derive(&real, &int).unwrap();
        (h, real, int)
    }

    #[test]
    fn test_add_entry_replaces_same_signature() {
        let (_h, real, int) = setup();
        let mut table = GenericFunction::new(FunctionId(0), "f");
        table.add_entry(MethodEntry::new(vec![int.clone()], int.clone(), constant(Payload::Null)));
        table.add_entry(MethodEntry::new(vec![real.clone()], real.clone(), constant(Payload::Null)));
        table.add_entry(MethodEntry::new(vec![int.clone()], real.clone(), constant(Payload::Bool(true))));

        assert_eq!(table.entries().len(), 2);
        // Replacement keeps the original position.
        assert_eq!(table.entries()[0].arg_types, vec![int]);
        assert_eq!(table.entries()[0].return_type, real);
    }

    /// Test that dispatch cache returns the same result on second call.
    #[test]
    fn test_dispatch_cache_hit() {
        let (mut h, real, int) = setup();
        let other = h.create_predicate("isOther");
        let mut table = GenericFunction::new(FunctionId(0), "g");
        table.add_entry(MethodEntry::new(vec![int.clone()], int.clone(), constant(Payload::Null)));
        table.add_entry(MethodEntry::new(vec![real.clone()], real.clone(), constant(Payload::Null)));

        let r1 = table.select(&h, DistanceMetric::Directed, true, &[int.clone()], false);
        assert_eq!(r1.unwrap(), Some(0));

        let r2 = table.select(&h, DistanceMetric::Directed, true, &[int.clone()], false);
        assert_eq!(r2.unwrap(), Some(0));
        assert_eq!(table.cache_len(), 1);

        // No-match results are cached too.
        assert_eq!(
            table.select(&h, DistanceMetric::Directed, true, &[other], false).unwrap(),
            None
        );
        assert_eq!(table.cache_len(), 2);
    }

    /// Test that dispatch cache is invalidated when an entry is added.
    #[test]
    fn test_dispatch_cache_invalidation() {
        let (h, real, int) = setup();
        let mut table = GenericFunction::new(FunctionId(0), "h");
        table.add_entry(MethodEntry::new(vec![real.clone()], real.clone(), constant(Payload::Null)));

        let _ = table.select(&h, DistanceMetric::Directed, true, &[int.clone()], false);
        assert_eq!(table.cache_len(), 1);

        // Add a more specific entry — cache should be cleared
        table.add_entry(MethodEntry::new(vec![int.clone()], int.clone(), constant(Payload::Null)));
        assert_eq!(table.cache_len(), 0, "Cache should be cleared after add_entry");

        let r = table.select(&h, DistanceMetric::Directed, true, &[int], false);
        assert_eq!(r.unwrap(), Some(1));
    }

    #[test]
    fn test_ambiguity_probe_is_not_cached() {
        let (h, real, int) = setup();
        let mut table = GenericFunction::new(FunctionId(0), "foo");
        table.add_entry(MethodEntry::new(
            vec![int.clone(), real.clone()],
            real.clone(),
            constant(Payload::Null),
        ));
        table.add_entry(MethodEntry::new(
            vec![real.clone(), int.clone()],
            real.clone(),
            constant(Payload::Null),
        ));

        let actual = [int.clone(), int.clone()];
        let probe = table.select(&h, DistanceMetric::Directed, true, &actual, true);
        assert_eq!(probe.unwrap(), None);
        assert_eq!(table.cache_len(), 0);

        let err = table
            .select(&h, DistanceMetric::Directed, true, &actual, false)
            .unwrap_err();
        match err {
            DispatchError::Ambiguous { candidates, .. } => assert_eq!(candidates.len(), 2),
            other => panic!("expected ambiguity, got {other}"),
        }
    }

    #[test]
    fn test_no_implementation_lists_candidates() {
        let (_h, real, int) = setup();
        let mut table = GenericFunction::new(FunctionId(0), "foo");
        table.add_entry(MethodEntry::new(vec![real.clone()], real.clone(), constant(Payload::Null)));
        let err = table.no_implementation(&[int.clone(), int]);
        assert_eq!(
            err.to_string(),
            "MethodError: no implementation of foo(::isInt, ::isInt)\nImplemented for:\n  foo(::isReal)"
        );
    }
}
