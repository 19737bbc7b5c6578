//! Generation configuration from TOML (`[generation]` section)

use assembly_domain::{GenerationConfig, StructuredOutputMode};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Raw model call settings from TOML
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileGenerationConfig {
    /// Sampling temperature (default: 0.7)
    pub temperature: f32,
    /// Maximum output tokens (default: 500)
    pub max_tokens: u32,
    /// Ask the backend for native JSON output where supported
    pub structured_output: bool,
}

impl Default for FileGenerationConfig {
    fn default() -> Self {
        Self {
            temperature: 0.7,
            max_tokens: 500,
            structured_output: false,
        }
    }
}

impl FileGenerationConfig {
    pub fn to_generation_config(&self, model: &str, timeout: Duration) -> GenerationConfig {
        let mode = if self.structured_output {
            StructuredOutputMode::JsonObject
        } else {
            StructuredOutputMode::Off
        };
        GenerationConfig::new(model)
            .with_temperature(self.temperature)
            .with_max_tokens(self.max_tokens)
            .with_structured_output(mode)
            .with_timeout(timeout)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_generation_config() {
        let config = FileGenerationConfig {
            structured_output: true,
            ..Default::default()
        };
        let generation = config.to_generation_config("gpt-4o", Duration::from_secs(5));
        assert_eq!(generation.model, "gpt-4o");
        assert_eq!(generation.max_tokens, 500);
        assert_eq!(generation.structured_output, StructuredOutputMode::JsonObject);
        assert_eq!(generation.timeout, Duration::from_secs(5));
    }
}
