//! Registry configuration.

use std::env;

use serde::{Deserialize, Serialize};

use crate::types::DistanceMetric;

/// Disable the per-function dispatch cache.
const DISABLE_CACHE_VAR: &str = "PSCRIPT_DISABLE_DISPATCH_CACHE";
/// Report the shorter of the two directed distances.
const SYMMETRIC_DISTANCE_VAR: &str = "PSCRIPT_SYMMETRIC_DISTANCE";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistryConfig {
    /// Metric behind [`crate::Registry::type_distance`]. Candidate ranking
    /// gives the same result under either metric.
    pub distance: DistanceMetric,
    /// Memoize `(actual types) -> selected entry` per generic function.
    pub dispatch_cache: bool,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            distance: DistanceMetric::Directed,
            dispatch_cache: true,
        }
    }
}

impl RegistryConfig {
    /// Defaults, overridden by `PSCRIPT_DISABLE_DISPATCH_CACHE` and
    /// `PSCRIPT_SYMMETRIC_DISTANCE` when set.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if env::var(DISABLE_CACHE_VAR).is_ok() {
            config.dispatch_cache = false;
        }
        if env::var(SYMMETRIC_DISTANCE_VAR).is_ok() {
            config.distance = DistanceMetric::Symmetric;
        }
        config
    }

    pub fn with_distance(mut self, distance: DistanceMetric) -> Self {
        self.distance = distance;
        self
    }

    pub fn with_dispatch_cache(mut self, enabled: bool) -> Self {
        self.dispatch_cache = enabled;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = RegistryConfig::default();
        assert_eq!(config.distance, DistanceMetric::Directed);
        assert!(config.dispatch_cache);
    }

    #[test]
    fn test_builder_overrides() {
        let config = RegistryConfig::default()
            .with_distance(DistanceMetric::Symmetric)
            .with_dispatch_cache(false);
        assert_eq!(config.distance, DistanceMetric::Symmetric);
        assert!(!config.dispatch_cache);
    }
}
