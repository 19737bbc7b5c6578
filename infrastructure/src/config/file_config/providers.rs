//! Provider configuration from TOML (`[providers]` section)

use assembly_domain::{
    AnthropicProviderConfig, DomainError, OllamaProviderConfig, OpenAiProviderConfig,
    ProviderConfig, ProviderKind,
};
use serde::{Deserialize, Serialize};

/// Anthropic API provider configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileAnthropicConfig {
    /// Environment variable name for the API key (default: "ANTHROPIC_API_KEY").
    pub api_key_env: String,
    /// Base URL for the Anthropic API.
    pub base_url: String,
    /// Default model.
    pub model: String,
    /// Anthropic API version header.
    pub api_version: String,
}

impl Default for FileAnthropicConfig {
    fn default() -> Self {
        let defaults = AnthropicProviderConfig::default();
        Self {
            api_key_env: defaults.api_key_env,
            base_url: defaults.base_url,
            model: defaults.model,
            api_version: defaults.api_version,
        }
    }
}

/// OpenAI-compatible API provider configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileOpenAiConfig {
    /// Environment variable name for the API key (default: "OPENAI_API_KEY").
    pub api_key_env: String,
    /// Base URL for the API (can be pointed at any compatible server).
    pub base_url: String,
    /// Default model.
    pub model: String,
}

impl Default for FileOpenAiConfig {
    fn default() -> Self {
        let defaults = OpenAiProviderConfig::default();
        Self {
            api_key_env: defaults.api_key_env,
            base_url: defaults.base_url,
            model: defaults.model,
        }
    }
}

/// Ollama provider configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileOllamaConfig {
    /// Base URL of the Ollama server.
    pub base_url: String,
    /// Default model.
    pub model: String,
}

impl Default for FileOllamaConfig {
    fn default() -> Self {
        let defaults = OllamaProviderConfig::default();
        Self {
            base_url: defaults.base_url,
            model: defaults.model,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileProvidersConfig {
    /// Default provider: "openai" ("cloud"), "anthropic" or "ollama" ("local").
    pub default: String,
    /// OpenAI-compatible API settings.
    pub openai: FileOpenAiConfig,
    /// Anthropic API settings.
    pub anthropic: FileAnthropicConfig,
    /// Ollama settings.
    pub ollama: FileOllamaConfig,
}

impl Default for FileProvidersConfig {
    fn default() -> Self {
        Self {
            default: ProviderKind::OpenAi.as_str().to_string(),
            openai: FileOpenAiConfig::default(),
            anthropic: FileAnthropicConfig::default(),
            ollama: FileOllamaConfig::default(),
        }
    }
}

impl FileProvidersConfig {
    /// Convert to the provider-neutral domain shape
    pub fn to_provider_config(&self) -> Result<ProviderConfig, DomainError> {
        Ok(ProviderConfig {
            default: self.default.parse()?,
            openai: OpenAiProviderConfig {
                api_key_env: self.openai.api_key_env.clone(),
                base_url: self.openai.base_url.clone(),
                model: self.openai.model.clone(),
            },
            anthropic: AnthropicProviderConfig {
                api_key_env: self.anthropic.api_key_env.clone(),
                base_url: self.anthropic.base_url.clone(),
                model: self.anthropic.model.clone(),
                api_version: self.anthropic.api_version.clone(),
            },
            ollama: OllamaProviderConfig {
                base_url: self.ollama.base_url.clone(),
                model: self.ollama.model.clone(),
            },
        })
    }
}
