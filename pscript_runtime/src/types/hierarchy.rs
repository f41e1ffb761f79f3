//! Single-parent type hierarchy.
//!
//! Every predicate has at most one parent, assigned exactly once by
//! [`TypeHierarchy::derive`]. Ancestor and descendant sets are maintained
//! eagerly on every link so that `is_a` is a set lookup, never a walk.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use super::predicate::Predicate;
use crate::error::HierarchyError;

/// Distance reported when the declared type is not reachable from the actual type.
pub const UNREACHABLE_DISTANCE: u32 = 100;

/// How closeness between an actual argument type and a declared parameter
/// type is measured.
///
/// Resolution only ranks entries whose declared types are ancestors (or
/// equal) of the actual types, and there the two metrics agree, so the choice
/// never changes which entry a call selects. It does change what
/// [`TypeHierarchy::distance`] reports for pairs in the other direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum DistanceMetric {
    /// Links walked upward from the actual type to the declared type.
    #[default]
    Directed,
    /// The shorter of the two directed walks.
    Symmetric,
}

#[derive(Debug, Default)]
pub struct TypeHierarchy {
    predicates: Vec<Predicate>,
    parents: HashMap<Predicate, Predicate>,
    ancestors: HashMap<Predicate, HashSet<Predicate>>,
    descendants: HashMap<Predicate, HashSet<Predicate>>,
}

impl TypeHierarchy {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a standalone predicate: no parent, no ancestors, no descendants.
    pub fn create_predicate(&mut self, name: &str) -> Predicate {
        let id = u32::try_from(self.predicates.len()).unwrap_or(u32::MAX);
        let pred = Predicate::new(id, name);
        self.predicates.push(pred.clone());
        pred
    }

    /// All predicates in creation order.
    pub fn predicates(&self) -> &[Predicate] {
        &self.predicates
    }

    pub fn parent_of(&self, pred: &Predicate) -> Option<&Predicate> {
        self.parents.get(pred)
    }

    pub fn ancestors_of(&self, pred: &Predicate) -> HashSet<Predicate> {
        self.ancestors.get(pred).cloned().unwrap_or_default()
    }

    pub fn descendants_of(&self, pred: &Predicate) -> HashSet<Predicate> {
        self.descendants.get(pred).cloned().unwrap_or_default()
    }

    /// Link `child` under `parent`.
    ///
    /// Fails if `child` already has a parent, or if `child` is `parent` or one of
    /// its ancestors. On success `{parent} ∪ ancestors(parent)` is added to the
    /// ancestor set of `child` and of everything already below it, and that
    /// whole subtree joins the descendant set of each new ancestor.
    pub fn derive(&mut self, parent: &Predicate, child: &Predicate) -> Result<(), HierarchyError> {
        if let Some(existing) = self.parents.get(child) {
            return Err(HierarchyError::Reparent {
                child: child.clone(),
                parent: parent.clone(),
                existing: existing.clone(),
            });
        }
        if self.is_a(child, parent) {
            return Err(HierarchyError::Cycle {
                child: child.clone(),
                parent: parent.clone(),
            });
        }

        self.parents.insert(child.clone(), parent.clone());

        let mut lineage = self.ancestors_of(parent);
        lineage.insert(parent.clone());

        let mut subtree = self.descendants_of(child);
        subtree.insert(child.clone());

        for member in &subtree {
            self.ancestors
                .entry(member.clone())
                .or_default()
                .extend(lineage.iter().cloned());
        }
        for ancestor in &lineage {
            self.descendants
                .entry(ancestor.clone())
                .or_default()
                .extend(subtree.iter().cloned());
        }
        Ok(())
    }

    /// `ancestor == descendant` or `ancestor` is a (transitive) parent of `descendant`.
    pub fn is_a(&self, ancestor: &Predicate, descendant: &Predicate) -> bool {
        ancestor == descendant
            || self
                .ancestors
                .get(descendant)
                .is_some_and(|set| set.contains(ancestor))
    }

    /// Number of parent links from `from` up to `to`, or
    /// [`UNREACHABLE_DISTANCE`] when `to` is not an ancestor of `from`.
    pub fn type_distance(&self, from: &Predicate, to: &Predicate) -> u32 {
        if !self.is_a(to, from) {
            return UNREACHABLE_DISTANCE;
        }
        let mut distance = 0;
        let mut current = from;
        while current != to {
            match self.parents.get(current) {
                Some(parent) => {
                    current = parent;
                    distance += 1;
                }
                None => return UNREACHABLE_DISTANCE,
            }
        }
        distance
    }

    /// Distance between an actual argument type and a declared parameter type
    /// under the given metric.
    pub fn distance(&self, metric: DistanceMetric, actual: &Predicate, declared: &Predicate) -> u32 {
        match metric {
            DistanceMetric::Directed => self.type_distance(actual, declared),
            DistanceMetric::Symmetric => self
                .type_distance(actual, declared)
                .min(self.type_distance(declared, actual)),
        }
    }
}
