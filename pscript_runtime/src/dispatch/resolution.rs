//! Entry selection by hierarchy distance.
//!
//! Resolution runs in three steps over a function's entry signatures:
//!
//! 1. **Filter**: same arity, and each declared type is an ancestor-or-equal of
//!    the actual type at that position.
//! 2. **Rank**: sum the per-position distances from actual to declared type.
//! 3. **Select**: the unique minimum wins; a tie on the minimum is ambiguous.
//!
//! There is no secondary tie-breaker. Two entries at the same total distance are
//! ambiguous even if one is more specific on the leftmost argument.

use crate::types::{DistanceMetric, Predicate, TypeHierarchy};

/// A matching entry and its total distance from the actual types.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Candidate {
    /// Position of the entry in the function's entry list.
    pub index: usize,
    pub distance: u32,
}

/// Outcome of ranking a call against a function's entries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// Exactly one entry has the minimal distance.
    Unique(Candidate),
    /// Nothing matched; the default entry applies.
    NoMatch,
    /// Entries tied for the minimal distance, in registration order.
    Ambiguous(Vec<Candidate>),
}

/// Whether an entry with `declared` parameter types accepts `actual` argument types.
pub fn accepts(hierarchy: &TypeHierarchy, declared: &[Predicate], actual: &[Predicate]) -> bool {
    declared.len() == actual.len()
        && declared
            .iter()
            .zip(actual)
            .all(|(param, arg)| hierarchy.is_a(param, arg))
}

/// Sum of per-position distances from `actual` to `declared`.
pub fn total_distance(
    hierarchy: &TypeHierarchy,
    metric: DistanceMetric,
    declared: &[Predicate],
    actual: &[Predicate],
) -> u32 {
    declared
        .iter()
        .zip(actual)
        .map(|(param, arg)| hierarchy.distance(metric, arg, param))
        .sum()
}

/// Matching entries sorted by ascending total distance.
///
/// The sort is stable, so entries at equal distance keep registration order.
pub fn rank<'a, I>(
    signatures: I,
    hierarchy: &TypeHierarchy,
    metric: DistanceMetric,
    actual: &[Predicate],
) -> Vec<Candidate>
where
    I: IntoIterator<Item = &'a [Predicate]>,
{
    let mut candidates: Vec<Candidate> = signatures
        .into_iter()
        .enumerate()
        .filter(|(_, declared)| accepts(hierarchy, declared, actual))
        .map(|(index, declared)| Candidate {
            index,
            distance: total_distance(hierarchy, metric, declared, actual),
        })
        .collect();
    candidates.sort_by_key(|c| c.distance);
    candidates
}

/// Rank and select.
pub fn resolve<'a, I>(
    signatures: I,
    hierarchy: &TypeHierarchy,
    metric: DistanceMetric,
    actual: &[Predicate],
) -> Resolution
where
    I: IntoIterator<Item = &'a [Predicate]>,
{
    let ranked = rank(signatures, hierarchy, metric, actual);
    let Some(best) = ranked.first().copied() else {
        return Resolution::NoMatch;
    };
    let tied: Vec<Candidate> = ranked
        .into_iter()
        .take_while(|c| c.distance == best.distance)
        .collect();
    if tied.len() > 1 {
        Resolution::Ambiguous(tied)
    } else {
        Resolution::Unique(best)
    }
}
