//! Generic functions and the resolution algorithm.

mod method_table;
mod resolution;

pub use method_table::{DefaultEntry, FunctionId, GenericFunction, Implementation, MethodEntry};
pub use resolution::{accepts, rank, resolve, total_distance, Candidate, Resolution};
