//! PScript runtime: predicate types and multiple dispatch.
//!
//! This crate provides the core of the PScript type system:
//!
//! - `Predicate` handles arranged in a single-parent `TypeHierarchy`
//! - `GenericFunction` entry tables resolved by hierarchy distance
//! - `Registry`, which owns both and performs typed calls
//! - `Value`, an immutable payload paired with a predicate tag
//! - `RuntimeError` for error handling
//!
//! Builtin predicates and functions live in `pscript_base`.

pub mod callable;
pub mod config;
mod debug;
pub mod dispatch;
pub mod error;
pub mod registry;
pub mod report;
pub mod types;
pub mod value;

/// Prelude module for convenient imports
///
/// # Example
/// ```
/// use pscript_runtime::prelude::*;
///
/// let registry = Registry::new();
/// assert!(registry.is_a(&registry.kernel().any, &registry.kernel().bool));
/// ```
pub mod prelude {
    pub use super::callable::{Callable, Closure, Function, GenericRef};
    pub use super::config::RegistryConfig;
    pub use super::dispatch::{FunctionId, MethodEntry};
    pub use super::error::{HierarchyError, RuntimeError, RuntimeResult};
    pub use super::registry::{Kernel, Registry};
    pub use super::report::RegistryReport;
    pub use super::types::{DispatchError, DistanceMetric, Predicate};
    pub use super::value::{Payload, Value};
}

pub use prelude::*;
