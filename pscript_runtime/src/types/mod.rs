//! Predicates, the type hierarchy, and dispatch errors.

mod dispatch_error;
mod hierarchy;
mod predicate;

pub use dispatch_error::DispatchError;
pub use hierarchy::{DistanceMetric, TypeHierarchy, UNREACHABLE_DISTANCE};
pub use predicate::{format_signature, Predicate};
