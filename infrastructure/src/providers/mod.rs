//! Text-generation provider adapters
//!
//! Each adapter implements [`ProviderClient`] for one backend. The backend is
//! picked once, when the client is built; nothing downstream branches on it.

mod anthropic;
mod http;
mod ollama;
mod openai;

pub use anthropic::AnthropicClient;
pub use ollama::OllamaClient;
pub use openai::OpenAiClient;

use assembly_application::ProviderClient;
use assembly_domain::{ProviderConfig, ProviderKind};
use std::sync::Arc;
use thiserror::Error;
use tracing::info;

/// Errors raised while building a provider client
#[derive(Error, Debug)]
pub enum ProviderSetupError {
    #[error("Missing API key: environment variable {0} is not set")]
    MissingApiKey(String),
}

/// Read an API key from the named environment variable
///
/// The key itself never appears in errors or logs.
pub(crate) fn read_api_key(env_var: &str) -> Result<String, ProviderSetupError> {
    match std::env::var(env_var) {
        Ok(key) if !key.trim().is_empty() => Ok(key.trim().to_string()),
        _ => Err(ProviderSetupError::MissingApiKey(env_var.to_string())),
    }
}

/// Build the client for a provider kind
pub fn build_provider(
    kind: ProviderKind,
    config: &ProviderConfig,
) -> Result<Arc<dyn ProviderClient>, ProviderSetupError> {
    let client: Arc<dyn ProviderClient> = match kind {
        ProviderKind::OpenAi => Arc::new(OpenAiClient::new(&config.openai)?),
        ProviderKind::Anthropic => Arc::new(AnthropicClient::new(&config.anthropic)?),
        ProviderKind::Ollama => Arc::new(OllamaClient::new(&config.ollama)),
    };
    info!("Using provider {}", kind);
    Ok(client)
}

#[cfg(test)]
mod tests {
    use super::*;
    use assembly_domain::OpenAiProviderConfig;

    #[test]
    fn test_missing_key_names_variable_only() {
        let config = ProviderConfig {
            openai: OpenAiProviderConfig {
                api_key_env: "ASSEMBLY_TEST_SURELY_UNSET_KEY".to_string(),
                ..Default::default()
            },
            ..Default::default()
        };
        let err = match build_provider(ProviderKind::OpenAi, &config) {
            Err(e) => e,
            Ok(_) => panic!("expected missing key"),
        };
        assert_eq!(
            err.to_string(),
            "Missing API key: environment variable ASSEMBLY_TEST_SURELY_UNSET_KEY is not set"
        );
    }

    #[test]
    fn test_ollama_needs_no_key() {
        let client = build_provider(ProviderKind::Ollama, &ProviderConfig::default()).unwrap();
        assert_eq!(client.name(), "ollama");
    }
}
