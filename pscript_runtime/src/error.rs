//! Runtime error types
//!
//! Every engine and base-library operation returns [`RuntimeResult`]. Dispatch
//! failures and hierarchy violations have their own enums so the type-checker
//! can match on them without parsing messages.

use thiserror::Error;

use crate::types::{DispatchError, Predicate};

/// Violations of the single-parent, acyclic type hierarchy.
#[derive(Debug, Clone, Error)]
pub enum HierarchyError {
    /// The child already has a parent; positions are immutable once linked.
    #[error("HierarchyError: cannot derive {child} from {parent}: it already derives from {existing}")]
    Reparent {
        child: Predicate,
        parent: Predicate,
        existing: Predicate,
    },

    /// Linking would make a predicate its own ancestor.
    #[error("HierarchyError: cannot derive {child} from {parent}: the link would create a cycle")]
    Cycle { child: Predicate, parent: Predicate },
}

/// Runtime error type
#[derive(Debug, Clone, Error)]
pub enum RuntimeError {
    #[error(transparent)]
    Hierarchy(#[from] HierarchyError),

    #[error(transparent)]
    Dispatch(#[from] DispatchError),

    /// An implementation returned a value outside its declared return type.
    #[error("ReturnTypeError: {function} must return {expected}, got {actual}")]
    ReturnType {
        function: String,
        expected: Predicate,
        actual: Predicate,
    },

    /// Checked cast (`as`) failed.
    #[error("CastError: cannot cast {from} to {to}")]
    Cast { from: Predicate, to: Predicate },

    /// Type mismatch inside a builtin
    #[error("TypeError: {0}")]
    TypeError(String),

    /// Invalid argument error
    #[error("ArgumentError: {0}")]
    ArgumentError(String),

    /// Index out of bounds error
    #[error("BoundsError: attempt to access index {index} of collection with length {length}")]
    BoundsError { index: i64, length: usize },

    /// Division by zero error
    #[error("DivideError: integer division error")]
    DivisionByZero,

    /// No generic function is bound to the name.
    #[error("UndefVarError: no generic function named {0}")]
    UnknownFunction(String),

    #[error("IOError: {0}")]
    Io(String),

    #[error("SerializationError: {0}")]
    Serialization(String),
}

impl RuntimeError {
    /// Create a type error
    pub fn type_error<S: Into<String>>(msg: S) -> Self {
        RuntimeError::TypeError(msg.into())
    }

    /// Create an argument error
    pub fn argument_error<S: Into<String>>(msg: S) -> Self {
        RuntimeError::ArgumentError(msg.into())
    }

    /// Create a bounds error
    pub fn bounds_error(index: i64, length: usize) -> Self {
        RuntimeError::BoundsError { index, length }
    }

    /// True for "no implementation" dispatch failures.
    pub fn is_no_implementation(&self) -> bool {
        matches!(
            self,
            RuntimeError::Dispatch(DispatchError::NoImplementation { .. })
        )
    }
}

impl From<std::io::Error> for RuntimeError {
    fn from(err: std::io::Error) -> Self {
        RuntimeError::Io(err.to_string())
    }
}

impl From<serde_json::Error> for RuntimeError {
    fn from(err: serde_json::Error) -> Self {
        RuntimeError::Serialization(err.to_string())
    }
}

/// Result type alias for runtime operations
pub type RuntimeResult<T> = Result<T, RuntimeError>;
