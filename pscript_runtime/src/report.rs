//! Serializable snapshot of a registry.
//!
//! Used by tooling that wants to inspect the loaded hierarchy and entry tables
//! without linking against the runtime types.

use serde::{Deserialize, Serialize};

use crate::config::RegistryConfig;
use crate::error::RuntimeResult;
use crate::registry::Registry;
use crate::types::Predicate;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegistryReport {
    pub config: RegistryConfig,
    pub predicates: Vec<PredicateReport>,
    pub functions: Vec<FunctionReport>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PredicateReport {
    pub id: u32,
    pub name: String,
    pub parent: Option<String>,
    /// Proper ancestors, nearest first.
    pub ancestors: Vec<String>,
    /// Name of the generic function testing membership.
    pub membership_test: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionReport {
    pub id: u32,
    pub name: String,
    pub entries: Vec<SignatureReport>,
    pub has_default: bool,
    /// Set when the function is a predicate's membership test.
    pub predicate: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignatureReport {
    pub args: Vec<String>,
    pub returns: String,
}

impl RegistryReport {
    pub fn to_json(&self) -> RuntimeResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(json: &str) -> RuntimeResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn predicate(&self, name: &str) -> Option<&PredicateReport> {
        self.predicates.iter().find(|p| p.name == name)
    }

    /// The newest function reported under `name`.
    pub fn function(&self, name: &str) -> Option<&FunctionReport> {
        self.functions.iter().rev().find(|f| f.name == name)
    }
}

fn names(preds: &[Predicate]) -> Vec<String> {
    preds.iter().map(|p| p.name().to_string()).collect()
}

impl Registry {
    pub fn report(&self) -> RegistryReport {
        let predicates = self
            .hierarchy()
            .predicates()
            .iter()
            .map(|p| {
                let mut ancestors = Vec::new();
                let mut cursor = self.parent_of(p);
                while let Some(parent) = cursor {
                    ancestors.push(parent.clone());
                    cursor = self.parent_of(parent);
                }
                PredicateReport {
                    id: p.id(),
                    name: p.name().to_string(),
                    parent: self.parent_of(p).map(|q| q.name().to_string()),
                    ancestors: names(&ancestors),
                    membership_test: self
                        .membership_test(p)
                        .and_then(|id| self.generic_function(id).ok())
                        .map(|gf| gf.name().to_string()),
                }
            })
            .collect();

        let functions = self
            .generic_functions()
            .iter()
            .map(|gf| FunctionReport {
                id: gf.id().0,
                name: gf.name().to_string(),
                entries: gf
                    .entries()
                    .iter()
                    .map(|e| SignatureReport {
                        args: names(&e.arg_types),
                        returns: e.return_type.name().to_string(),
                    })
                    .collect(),
                has_default: gf.default_entry().is_some(),
                predicate: gf.predicate().map(|p| p.name().to_string()),
            })
            .collect();

        RegistryReport {
            config: *self.config(),
            predicates,
            functions,
        }
    }
}
