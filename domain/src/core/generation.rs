//! Generation settings value object
//!
//! [`GenerationConfig`] travels with every provider call. It is created once
//! per run and shared by all tasks of that run.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Whether the provider should be asked to enforce JSON output natively
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StructuredOutputMode {
    /// Rely on the prompt and the validator alone
    #[default]
    Off,
    /// Request a JSON object response where the backend supports it
    JsonObject,
}

/// Settings for a single model call (Value Object)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationConfig {
    /// Model identifier as understood by the selected provider
    pub model: String,
    /// Sampling temperature
    pub temperature: f32,
    /// Maximum output length in tokens
    pub max_tokens: u32,
    /// Native structured-output enforcement
    pub structured_output: StructuredOutputMode,
    /// Per-call timeout; elapsing counts as a retryable provider failure
    #[serde(with = "duration_secs")]
    pub timeout: Duration,
}

impl GenerationConfig {
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            temperature: 0.7,
            max_tokens: 500,
            structured_output: StructuredOutputMode::Off,
            timeout: Duration::from_secs(60),
        }
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    pub fn with_structured_output(mut self, mode: StructuredOutputMode) -> Self {
        self.structured_output = mode;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

mod duration_secs {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_u64(d.as_secs())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        Ok(Duration::from_secs(u64::deserialize(d)?))
    }
}
