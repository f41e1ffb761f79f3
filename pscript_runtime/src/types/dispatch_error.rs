//! Error types for method dispatch.

use super::predicate::{format_signature, Predicate};

/// Error types for method dispatch.
#[derive(Debug, Clone)]
pub enum DispatchError {
    /// No entry matches and the function has no default.
    NoImplementation {
        function: String,
        arg_types: Vec<Predicate>,
        /// Signatures of every registered entry, for diagnostics.
        candidates: Vec<Vec<Predicate>>,
    },
    /// Two or more entries tie for the smallest total distance.
    Ambiguous {
        function: String,
        arg_types: Vec<Predicate>,
        candidates: Vec<Vec<Predicate>>,
    },
}

impl DispatchError {
    pub fn function(&self) -> &str {
        match self {
            DispatchError::NoImplementation { function, .. }
            | DispatchError::Ambiguous { function, .. } => function,
        }
    }
}

impl std::fmt::Display for DispatchError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DispatchError::NoImplementation {
                function,
                arg_types,
                candidates,
            } => {
                write!(
                    f,
                    "MethodError: no implementation of {}{}",
                    function,
                    format_signature(arg_types)
                )?;
                if !candidates.is_empty() {
                    write!(f, "\nImplemented for:")?;
                    for sig in candidates {
                        write!(f, "\n  {}{}", function, format_signature(sig))?;
                    }
                }
                Ok(())
            }
            DispatchError::Ambiguous {
                function,
                arg_types,
                candidates,
            } => {
                write!(
                    f,
                    "MethodError: {}{} is ambiguous. Candidates:",
                    function,
                    format_signature(arg_types)
                )?;
                for sig in candidates {
                    write!(f, "\n  {}{}", function, format_signature(sig))?;
                }
                Ok(())
            }
        }
    }
}

impl std::error::Error for DispatchError {}
