//! Predicate handles.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::rc::Rc;

/// A type, represented as an identity-comparable handle.
///
/// Two predicates are equal iff they were produced by the same
/// `create_predicate` call; the name is only used for display, so two
/// predicates may share a name and still be distinct types.
#[derive(Clone)]
pub struct Predicate {
    id: u32,
    name: Rc<str>,
}

impl Predicate {
    pub(crate) fn new(id: u32, name: &str) -> Self {
        Self {
            id,
            name: Rc::from(name),
        }
    }

    /// Registry-unique identity of this predicate.
    pub fn id(&self) -> u32 {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl PartialEq for Predicate {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Predicate {}

impl Hash for Predicate {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl PartialOrd for Predicate {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Predicate {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.id.cmp(&other.id)
    }
}

impl fmt::Debug for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.name, self.id)
    }
}

impl fmt::Display for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// Render an argument-type tuple as `(::A, ::B)`.
pub fn format_signature(types: &[Predicate]) -> String {
    let parts: Vec<_> = types.iter().map(|t| format!("::{}", t)).collect();
    format!("({})", parts.join(", "))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_ignores_name() {
        let a = Predicate::new(0, "isThing");
        let b = Predicate::new(1, "isThing");
        assert_ne!(a, b);
        assert_eq!(a, a.clone());
        assert_eq!(format!("{:?}", b), "isThing#1");
    }

    #[test]
    fn test_format_signature() {
        let a = Predicate::new(0, "isInt");
        let b = Predicate::new(1, "isReal");
        assert_eq!(format_signature(&[a, b]), "(::isInt, ::isReal)");
        assert_eq!(format_signature(&[]), "()");
    }
}
