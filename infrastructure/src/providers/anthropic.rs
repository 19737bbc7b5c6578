//! Anthropic Messages API adapter
//!
//! The Messages API has no JSON mode; structured output relies on the
//! prompt and the validator.

use super::http::{check_status, classify_transport};
use super::{ProviderSetupError, read_api_key};
use assembly_application::{ProviderClient, ProviderError};
use assembly_domain::{AnthropicProviderConfig, GenerationConfig};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::debug;

/// Client for `/v1/messages`
pub struct AnthropicClient {
    client: Client,
    endpoint: String,
    api_key: String,
    api_version: String,
}

impl AnthropicClient {
    /// Build the client, reading the API key from the configured variable
    pub fn new(config: &AnthropicProviderConfig) -> Result<Self, ProviderSetupError> {
        let api_key = read_api_key(&config.api_key_env)?;
        Ok(Self {
            client: Client::new(),
            endpoint: format!("{}/v1/messages", config.base_url.trim_end_matches('/')),
            api_key,
            api_version: config.api_version.clone(),
        })
    }

    fn request_body(system: &str, user: &str, config: &GenerationConfig) -> Value {
        json!({
            "model": config.model,
            "max_tokens": config.max_tokens,
            "temperature": config.temperature,
            "system": system,
            "messages": [
                { "role": "user", "content": user }
            ]
        })
    }
}

#[async_trait]
impl ProviderClient for AnthropicClient {
    fn name(&self) -> &str {
        "anthropic"
    }

    async fn generate(
        &self,
        system: &str,
        user: &str,
        config: &GenerationConfig,
    ) -> Result<String, ProviderError> {
        debug!("POST {} (model {})", self.endpoint, config.model);
        let response = self
            .client
            .post(&self.endpoint)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", &self.api_version)
            .timeout(config.timeout)
            .json(&Self::request_body(system, user, config))
            .send()
            .await
            .map_err(classify_transport)?;

        let message: MessagesResponse = check_status(response)
            .await?
            .json()
            .await
            .map_err(classify_transport)?;

        let text: String = message
            .content
            .into_iter()
            .filter_map(|block| match block {
                ContentBlock::Text { text } => Some(text),
                ContentBlock::Other => None,
            })
            .collect();
        if text.is_empty() {
            return Err(ProviderError::Unknown(
                "No text content in response".to_string(),
            ));
        }
        Ok(text)
    }
}

#[derive(Debug, Deserialize)]
struct MessagesResponse {
    content: Vec<ContentBlock>,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ContentBlock {
    Text {
        text: String,
    },
    #[serde(other)]
    Other,
}
