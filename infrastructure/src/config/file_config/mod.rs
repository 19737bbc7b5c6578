//! Raw TOML configuration data types
//!
//! These structs represent the exact structure of the TOML config file.
//! They are deserialized directly and use domain types where appropriate.

mod analysis;
mod generation;
mod output;
mod paths;
mod providers;
mod run;

pub use analysis::FileAnalysisConfig;
pub use generation::FileGenerationConfig;
pub use output::{FileOutputConfig, FileOutputFormat};
pub use paths::FilePathsConfig;
pub use providers::{FileAnthropicConfig, FileOllamaConfig, FileOpenAiConfig, FileProvidersConfig};
pub use run::FileRunConfig;

use assembly_domain::{DomainError, ProviderKind};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Configuration validation errors
#[derive(Debug, Error)]
pub enum ConfigValidationError {
    #[error("run.concurrency cannot be 0")]
    InvalidConcurrency,

    #[error("run.timeout_seconds cannot be 0")]
    InvalidTimeout,

    #[error("{0}: model name cannot be empty")]
    EmptyModelName(String),

    #[error("{0}: api_key_env cannot be empty")]
    EmptyApiKeyEnv(String),

    #[error("generation.max_tokens cannot be 0")]
    InvalidMaxTokens,

    #[error(transparent)]
    Domain(#[from] DomainError),
}

/// Complete file configuration (raw TOML structure)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    /// Orchestrator settings
    pub run: FileRunConfig,
    /// Model call settings for the vote pass
    pub generation: FileGenerationConfig,
    /// Impact analysis settings
    pub analysis: FileAnalysisConfig,
    /// Input and output locations
    pub paths: FilePathsConfig,
    /// Provider endpoints and credential variable names
    pub providers: FileProvidersConfig,
    /// Output settings
    pub output: FileOutputConfig,
}

impl FileConfig {
    /// Validate the entire configuration.
    ///
    /// Stops at the first problem found.
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        if self.run.concurrency == 0 {
            return Err(ConfigValidationError::InvalidConcurrency);
        }
        if self.run.timeout_seconds == 0 {
            return Err(ConfigValidationError::InvalidTimeout);
        }
        if self.generation.max_tokens == 0 || self.analysis.max_tokens == 0 {
            return Err(ConfigValidationError::InvalidMaxTokens);
        }

        let models = [
            ("providers.openai.model", Some(&self.providers.openai.model)),
            (
                "providers.anthropic.model",
                Some(&self.providers.anthropic.model),
            ),
            ("providers.ollama.model", Some(&self.providers.ollama.model)),
            ("analysis.model", self.analysis.model.as_ref()),
        ];
        for (field, model) in models {
            if model.is_some_and(|m| m.trim().is_empty()) {
                return Err(ConfigValidationError::EmptyModelName(field.to_string()));
            }
        }

        for (field, env) in [
            ("providers.openai", &self.providers.openai.api_key_env),
            ("providers.anthropic", &self.providers.anthropic.api_key_env),
        ] {
            if env.trim().is_empty() {
                return Err(ConfigValidationError::EmptyApiKeyEnv(field.to_string()));
            }
        }

        self.providers.default.parse::<ProviderKind>()?;
        self.analysis.to_analysis_params()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assembly_domain::{FailurePolicy, OutputFormat};
    use std::path::PathBuf;

    #[test]
    fn test_deserialize_full_config() {
        let toml_str = r#"
[run]
concurrency = 8
max_retries = 2
timeout_seconds = 90

[generation]
temperature = 0.2
structured_output = true

[analysis]
counterpart = "united-states"

[paths]
agents_dir = "personas"

[providers]
default = "anthropic"

[output]
format = "json"
color = false
"#;

        let config: FileConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.run.concurrency, 8);
        assert_eq!(config.run.max_retries, 2);
        assert_eq!(config.run.timeout_seconds, 90);
        assert_eq!(config.generation.temperature, 0.2);
        assert!(config.generation.structured_output);
        assert_eq!(config.analysis.counterpart, "united-states");
        assert_eq!(config.paths.agents_dir, PathBuf::from("personas"));
        assert_eq!(config.paths.motions_dir, PathBuf::from("tasks/motions"));
        assert_eq!(config.output.format, Some(OutputFormat::Json));
        assert!(!config.output.color);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_deserialize_partial_config() {
        let toml_str = r#"
[run]
max_retries = 0
"#;

        let config: FileConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.run.max_retries, 0);
        // Defaults should apply
        assert_eq!(config.run.concurrency, 4);
        assert_eq!(config.run.failure_policy, FailurePolicy::Record);
        assert_eq!(config.analysis.max_tokens, 600);
        assert!(config.output.show_progress);
    }

    #[test]
    fn test_validate_valid_config() {
        let config = FileConfig::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_zero_concurrency() {
        let mut config = FileConfig::default();
        config.run.concurrency = 0;
        assert!(matches!(
            config.validate(),
            Err(ConfigValidationError::InvalidConcurrency)
        ));
    }

    #[test]
    fn test_validate_zero_timeout() {
        let mut config = FileConfig::default();
        config.run.timeout_seconds = 0;
        assert!(matches!(
            config.validate(),
            Err(ConfigValidationError::InvalidTimeout)
        ));
    }

    #[test]
    fn test_validate_empty_model() {
        let mut config = FileConfig::default();
        config.providers.ollama.model = "  ".to_string();
        let err = config.validate().unwrap_err();
        assert_eq!(
            err.to_string(),
            "providers.ollama.model: model name cannot be empty"
        );

        let mut config = FileConfig::default();
        config.analysis.model = Some(String::new());
        assert!(matches!(
            config.validate(),
            Err(ConfigValidationError::EmptyModelName(_))
        ));
    }

    #[test]
    fn test_validate_unknown_provider() {
        let mut config = FileConfig::default();
        config.providers.default = "copilot".to_string();
        assert!(matches!(
            config.validate(),
            Err(ConfigValidationError::Domain(DomainError::UnknownProvider(_)))
        ));
    }
}
