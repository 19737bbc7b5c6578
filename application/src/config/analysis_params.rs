//! Impact analysis parameters.

use assembly_domain::{AgentId, GenerationConfig};

/// Settings for the bilateral impact pass
#[derive(Debug, Clone)]
pub struct AnalysisParams {
    /// Identity whose bilateral relationships are analysed; excluded from the pass.
    pub counterpart: AgentId,
    /// Model override; the vote run's model is used when absent.
    pub model: Option<String>,
    pub temperature: f32,
    pub max_tokens: u32,
}

impl AnalysisParams {
    pub fn new(counterpart: AgentId) -> Self {
        Self {
            counterpart,
            model: None,
            temperature: 0.5,
            max_tokens: 600,
        }
    }

    pub fn with_model(mut self, model: Option<String>) -> Self {
        self.model = model;
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    /// Derive the analysis generation settings from the vote run's
    pub fn generation(&self, base: &GenerationConfig) -> GenerationConfig {
        let mut config = base.clone();
        if let Some(model) = &self.model {
            config.model = model.clone();
        }
        config
            .with_temperature(self.temperature)
            .with_max_tokens(self.max_tokens)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generation_overrides() {
        let base = GenerationConfig::new("gpt-4o");
        let params = AnalysisParams::new(AgentId::new("israel").unwrap());
        let config = params.generation(&base);
        assert_eq!(config.model, "gpt-4o");
        assert_eq!(config.temperature, 0.5);
        assert_eq!(config.max_tokens, 600);
        assert_eq!(config.timeout, base.timeout);

        let config = params
            .with_model(Some("llama3".to_string()))
            .generation(&base);
        assert_eq!(config.model, "llama3");
    }
}
