//! Run configuration from TOML (`[run]` section)

use assembly_application::{RetryPolicy, RunParams};
use assembly_domain::FailurePolicy;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Raw orchestrator settings from TOML
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileRunConfig {
    /// Maximum provider calls in flight (default: 4)
    pub concurrency: usize,
    /// Retries after the first attempt of a call (default: 1)
    pub max_retries: u32,
    /// First backoff delay in milliseconds (default: 500)
    pub backoff_base_ms: u64,
    /// Backoff cap in milliseconds (default: 30000)
    pub backoff_max_ms: u64,
    /// Per-call timeout in seconds (default: 60)
    pub timeout_seconds: u64,
    /// "record" (default) or "legacy_default"
    pub failure_policy: FailurePolicy,
}

impl Default for FileRunConfig {
    fn default() -> Self {
        Self {
            concurrency: 4,
            max_retries: 1,
            backoff_base_ms: 500,
            backoff_max_ms: 30_000,
            timeout_seconds: 60,
            failure_policy: FailurePolicy::Record,
        }
    }
}

impl FileRunConfig {
    pub fn to_run_params(&self) -> RunParams {
        RunParams::default()
            .with_concurrency(self.concurrency)
            .with_retry(RetryPolicy {
                max_retries: self.max_retries,
                base_delay: Duration::from_millis(self.backoff_base_ms),
                max_delay: Duration::from_millis(self.backoff_max_ms),
            })
            .with_failure_policy(self.failure_policy)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_params_conversion() {
        let config = FileRunConfig {
            concurrency: 8,
            max_retries: 3,
            backoff_base_ms: 100,
            backoff_max_ms: 1_000,
            timeout_seconds: 30,
            failure_policy: FailurePolicy::LegacyDefault,
        };
        let params = config.to_run_params();
        assert_eq!(params.concurrency, 8);
        assert_eq!(params.retry.max_retries, 3);
        assert_eq!(params.retry.base_delay, Duration::from_millis(100));
        assert_eq!(params.retry.max_delay, Duration::from_secs(1));
        assert_eq!(params.failure_policy, FailurePolicy::LegacyDefault);
        assert_eq!(config.timeout(), Duration::from_secs(30));
    }

    #[test]
    fn test_failure_policy_deserialize() {
        let toml_str = r#"
[run]
failure_policy = "legacy_default"
"#;
        let config: super::super::FileConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.run.failure_policy, FailurePolicy::LegacyDefault);
        assert_eq!(config.run.concurrency, 4);
    }
}
