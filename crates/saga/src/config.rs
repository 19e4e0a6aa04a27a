//! Saga runtime configuration loaded from environment variables.

use std::time::Duration;

/// Orchestrator settings.
///
/// Reads from environment variables:
/// - `SAGA_STEP_TIMEOUT_MS` — bound on each collaborator call (default: unbounded)
/// - `SAGA_RETENTION_SECS` — how long finished sagas stay queryable (default: forever)
///
/// Zero or unparsable values fall back to the default.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SagaConfig {
    pub step_timeout: Option<Duration>,
    pub retention: Option<Duration>,
}

impl SagaConfig {
    /// Loads configuration from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Loads configuration from an arbitrary key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let positive = |key: &str| {
            lookup(key)
                .and_then(|v| v.trim().parse::<u64>().ok())
                .filter(|v| *v > 0)
        };
        Self {
            step_timeout: positive("SAGA_STEP_TIMEOUT_MS").map(Duration::from_millis),
            retention: positive("SAGA_RETENTION_SECS").map(Duration::from_secs),
        }
    }

    /// Sets the per-call timeout.
    pub fn with_step_timeout(mut self, timeout: Duration) -> Self {
        self.step_timeout = Some(timeout);
        self
    }

    /// Sets the retention window for finished sagas.
    pub fn with_retention(mut self, retention: Duration) -> Self {
        self.retention = Some(retention);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_default_values() {
        let config = SagaConfig::default();
        assert!(config.step_timeout.is_none());
        assert!(config.retention.is_none());
    }

    #[test]
    fn test_reads_both_variables() {
        let config = SagaConfig::from_lookup(lookup_from(&[
            ("SAGA_STEP_TIMEOUT_MS", "250"),
            ("SAGA_RETENTION_SECS", "3600"),
        ]));
        assert_eq!(config.step_timeout, Some(Duration::from_millis(250)));
        assert_eq!(config.retention, Some(Duration::from_secs(3600)));
    }

    #[test]
    fn test_invalid_values_fall_back() {
        let config = SagaConfig::from_lookup(lookup_from(&[
            ("SAGA_STEP_TIMEOUT_MS", "soon"),
            ("SAGA_RETENTION_SECS", "0"),
        ]));
        assert_eq!(config, SagaConfig::default());
    }

    #[test]
    fn test_builders() {
        let config = SagaConfig::default()
            .with_step_timeout(Duration::from_millis(10))
            .with_retention(Duration::from_secs(5));
        assert_eq!(config.step_timeout, Some(Duration::from_millis(10)));
        assert_eq!(config.retention, Some(Duration::from_secs(5)));
    }
}
