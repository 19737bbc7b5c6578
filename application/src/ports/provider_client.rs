//! Provider client port
//!
//! Defines the interface for communicating with text-generation backends.

use assembly_domain::GenerationConfig;
use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

/// Errors that can occur during a provider call
///
/// Messages never carry credentials; adapters build them from status codes
/// and response bodies only.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProviderError {
    #[error("Timeout")]
    Timeout,

    #[error("Rate limited{}", retry_after.map(|d| format!(" (retry after {}s)", d.as_secs())).unwrap_or_default())]
    RateLimited { retry_after: Option<Duration> },

    #[error("Unauthenticated: {0}")]
    Unauthenticated(String),

    #[error("Network error: {0}")]
    TransientNetwork(String),

    #[error("Provider error: {0}")]
    Unknown(String),
}

impl ProviderError {
    /// Whether another attempt may succeed
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::Timeout | Self::RateLimited { .. } | Self::TransientNetwork(_)
        )
    }

    /// Provider-suggested wait before the next attempt
    pub fn retry_after(&self) -> Option<Duration> {
        match self {
            Self::RateLimited { retry_after } => *retry_after,
            _ => None,
        }
    }
}

/// Uniform capability wrapper around a text-generation backend
///
/// This port defines how the application layer asks a model for text.
/// Implementations (adapters) live in the infrastructure layer and hold no
/// orchestration logic: no retries, no caching.
#[async_trait]
pub trait ProviderClient: Send + Sync {
    /// Provider name recorded in run manifests
    fn name(&self) -> &str;

    /// Generate a completion for one system/user prompt pair
    async fn generate(
        &self,
        system: &str,
        user: &str,
        config: &GenerationConfig,
    ) -> Result<String, ProviderError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retryable_classification() {
        assert!(ProviderError::Timeout.is_retryable());
        assert!(ProviderError::RateLimited { retry_after: None }.is_retryable());
        assert!(ProviderError::TransientNetwork("reset".into()).is_retryable());
        assert!(!ProviderError::Unauthenticated("401".into()).is_retryable());
        assert!(!ProviderError::Unknown("400".into()).is_retryable());
    }

    #[test]
    fn test_rate_limited_display() {
        let err = ProviderError::RateLimited {
            retry_after: Some(Duration::from_secs(7)),
        };
        assert_eq!(err.to_string(), "Rate limited (retry after 7s)");
        assert_eq!(err.retry_after(), Some(Duration::from_secs(7)));
        assert_eq!(
            ProviderError::RateLimited { retry_after: None }.to_string(),
            "Rate limited"
        );
    }
}
