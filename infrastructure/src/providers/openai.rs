//! OpenAI-compatible chat completions adapter

use super::http::{check_status, classify_transport};
use super::{ProviderSetupError, read_api_key};
use assembly_application::{ProviderClient, ProviderError};
use assembly_domain::{GenerationConfig, OpenAiProviderConfig, StructuredOutputMode};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::debug;

/// Client for `/v1/chat/completions`
pub struct OpenAiClient {
    client: Client,
    endpoint: String,
    api_key: String,
}

impl OpenAiClient {
    /// Build the client, reading the API key from the configured variable
    pub fn new(config: &OpenAiProviderConfig) -> Result<Self, ProviderSetupError> {
        let api_key = read_api_key(&config.api_key_env)?;
        Ok(Self::with_key(config, api_key))
    }

    fn with_key(config: &OpenAiProviderConfig, api_key: String) -> Self {
        Self {
            client: Client::new(),
            endpoint: format!(
                "{}/v1/chat/completions",
                config.base_url.trim_end_matches('/')
            ),
            api_key,
        }
    }

    fn request_body(system: &str, user: &str, config: &GenerationConfig) -> Value {
        let mut body = json!({
            "model": config.model,
            "temperature": config.temperature,
            "max_tokens": config.max_tokens,
            "messages": [
                { "role": "system", "content": system },
                { "role": "user", "content": user }
            ]
        });
        if config.structured_output == StructuredOutputMode::JsonObject {
            body["response_format"] = json!({ "type": "json_object" });
        }
        body
    }
}

#[async_trait]
impl ProviderClient for OpenAiClient {
    fn name(&self) -> &str {
        "openai"
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
            .bearer_auth(&self.api_key)
            .timeout(config.timeout)
            .json(&Self::request_body(system, user, config))
            .send()
            .await
            .map_err(classify_transport)?;

        let completion: ChatCompletion = check_status(response)
            .await?
            .json()
            .await
            .map_err(classify_transport)?;

        completion
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| ProviderError::Unknown("No message content in response".to_string()))
    }
}

#[derive(Debug, Deserialize)]
struct ChatCompletion {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: Message,
}

#[derive(Debug, Deserialize)]
struct Message {
    content: Option<String>,
}
