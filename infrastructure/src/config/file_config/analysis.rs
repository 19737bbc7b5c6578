//! Impact analysis configuration from TOML (`[analysis]` section)

use assembly_application::AnalysisParams;
use assembly_domain::{AgentId, DomainError};
use serde::{Deserialize, Serialize};

/// Raw impact-pass settings from TOML
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileAnalysisConfig {
    /// Roster slug whose bilateral relationships are analysed
    pub counterpart: String,
    /// Model override for the analysis pass
    pub model: Option<String>,
    /// Sampling temperature (default: 0.5)
    pub temperature: f32,
    /// Maximum output tokens (default: 600)
    pub max_tokens: u32,
}

impl Default for FileAnalysisConfig {
    fn default() -> Self {
        Self {
            counterpart: "israel".to_string(),
            model: None,
            temperature: 0.5,
            max_tokens: 600,
        }
    }
}

impl FileAnalysisConfig {
    pub fn to_analysis_params(&self) -> Result<AnalysisParams, DomainError> {
        Ok(AnalysisParams::new(AgentId::new(self.counterpart.trim())?)
            .with_model(self.model.clone())
            .with_temperature(self.temperature)
            .with_max_tokens(self.max_tokens))
    }
}
