//! Local Ollama adapter (`/api/chat`, non-streaming)

use super::http::{check_status, classify_transport};
use assembly_application::{ProviderClient, ProviderError};
use assembly_domain::{GenerationConfig, OllamaProviderConfig, StructuredOutputMode};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::debug;

/// Client for a local Ollama server; needs no credentials
pub struct OllamaClient {
    client: Client,
    endpoint: String,
}

impl OllamaClient {
    #[must_use]
    pub fn new(config: &OllamaProviderConfig) -> Self {
        Self {
            client: Client::new(),
            endpoint: format!("{}/api/chat", config.base_url.trim_end_matches('/')),
        }
    }

    fn request_body(system: &str, user: &str, config: &GenerationConfig) -> Value {
        let mut body = json!({
            "model": config.model,
            "stream": false,
            "messages": [
                { "role": "system", "content": system },
                { "role": "user", "content": user }
            ],
            "options": {
                "temperature": config.temperature,
                "num_predict": config.max_tokens
            }
        });
        if config.structured_output == StructuredOutputMode::JsonObject {
            body["format"] = json!("json");
        }
        body
    }
}

#[async_trait]
impl ProviderClient for OllamaClient {
    fn name(&self) -> &str {
        "ollama"
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
            .timeout(config.timeout)
            .json(&Self::request_body(system, user, config))
            .send()
            .await
            .map_err(classify_transport)?;

        let chat: ChatResponse = check_status(response)
            .await?
            .json()
            .await
            .map_err(classify_transport)?;
        Ok(chat.message.content)
    }
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    message: ChatMessage,
}

#[derive(Debug, Deserialize)]
struct ChatMessage {
    content: String,
}
