//! Bilateral impact assessment payload
//!
//! Second-pass analysis classifies how each agent's vote affects its
//! relationship with a fixed counterpart.

use super::response::{
    StructuredResponse, ValidationReason, required_enum, required_text,
};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Seven-step scale from strongly improved to strongly deteriorated relations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImpactCategory {
    StrengthenedSignificantly,
    StrengthenedModerately,
    StrengthenedSlightly,
    Neutral,
    StrainedSlightly,
    StrainedModerately,
    StrainedSignificantly,
}

impl ImpactCategory {
    pub const ALL: [ImpactCategory; 7] = [
        ImpactCategory::StrengthenedSignificantly,
        ImpactCategory::StrengthenedModerately,
        ImpactCategory::StrengthenedSlightly,
        ImpactCategory::Neutral,
        ImpactCategory::StrainedSlightly,
        ImpactCategory::StrainedModerately,
        ImpactCategory::StrainedSignificantly,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ImpactCategory::StrengthenedSignificantly => "strengthened_significantly",
            ImpactCategory::StrengthenedModerately => "strengthened_moderately",
            ImpactCategory::StrengthenedSlightly => "strengthened_slightly",
            ImpactCategory::Neutral => "neutral",
            ImpactCategory::StrainedSlightly => "strained_slightly",
            ImpactCategory::StrainedModerately => "strained_moderately",
            ImpactCategory::StrainedSignificantly => "strained_significantly",
        }
    }
}

impl std::fmt::Display for ImpactCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for ImpactCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim().to_lowercase();
        Self::ALL
            .into_iter()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| format!("invalid impact category: {}", s))
    }
}

/// Analyst confidence in an assessment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Confidence {
    High,
    Medium,
    Low,
}

impl std::str::FromStr for Confidence {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "high" => Ok(Confidence::High),
            "medium" => Ok(Confidence::Medium),
            "low" => Ok(Confidence::Low),
            other => Err(format!("invalid confidence: {}", other)),
        }
    }
}

/// A validated bilateral impact assessment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImpactAssessment {
    pub impact_category: ImpactCategory,
    pub reasoning: String,
    pub confidence: Confidence,
    pub key_factors: Vec<String>,
}

impl StructuredResponse for ImpactAssessment {
    fn categories() -> &'static [&'static str] {
        &[
            "strengthened_significantly",
            "strengthened_moderately",
            "strengthened_slightly",
            "neutral",
            "strained_slightly",
            "strained_moderately",
            "strained_significantly",
        ]
    }

    fn category(&self) -> &'static str {
        self.impact_category.as_str()
    }

    fn from_object(object: &Map<String, Value>) -> Result<Self, ValidationReason> {
        let impact_category = required_enum::<ImpactCategory>(object, "impact_category")?;
        let reasoning = required_text(object, "reasoning")?;
        let confidence = required_enum::<Confidence>(object, "confidence")?;

        let key_factors = match object.get("key_factors") {
            None | Some(Value::Null) => return Err(ValidationReason::missing("key_factors")),
            Some(Value::Array(items)) => items
                .iter()
                .map(|item| {
                    item.as_str()
                        .map(|s| s.trim().to_string())
                        .ok_or_else(|| ValidationReason::wrong_type("key_factors"))
                })
                .collect::<Result<Vec<_>, _>>()?,
            Some(_) => return Err(ValidationReason::wrong_type("key_factors")),
        };

        Ok(Self {
            impact_category,
            reasoning,
            confidence,
            key_factors,
        })
    }

    fn fallback(error: &str) -> Self {
        Self {
            impact_category: ImpactCategory::Neutral,
            reasoning: format!("[Error: {}]", error),
            confidence: Confidence::Low,
            key_factors: vec!["analysis_error".to_string()],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn parse(value: Value) -> Result<ImpactAssessment, ValidationReason> {
        ImpactAssessment::from_object(value.as_object().unwrap())
    }

    #[test]
    fn test_categories_match_enum_order() {
        let names: Vec<_> = ImpactCategory::ALL.iter().map(|c| c.as_str()).collect();
        assert_eq!(names, ImpactAssessment::categories());
    }

    #[test]
    fn test_from_object_success() {
        let assessment = parse(json!({
            "impact_category": "Strained_Moderately",
            "reasoning": "The statement was critical.",
            "confidence": "HIGH",
            "key_factors": ["tone", "security ties"]
        }))
        .unwrap();

        assert_eq!(assessment.impact_category, ImpactCategory::StrainedModerately);
        assert_eq!(assessment.confidence, Confidence::High);
        assert_eq!(assessment.key_factors, vec!["tone", "security ties"]);
        assert_eq!(assessment.category(), "strained_moderately");
    }

    #[test]
    fn test_unknown_category() {
        let result = parse(json!({
            "impact_category": "improved",
            "reasoning": "r",
            "confidence": "low",
            "key_factors": []
        }));
        assert_eq!(
            result,
            Err(ValidationReason::invalid("impact_category", "improved"))
        );
    }

    #[test]
    fn test_key_factors_type_checked() {
        let result = parse(json!({
            "impact_category": "neutral",
            "reasoning": "r",
            "confidence": "low",
            "key_factors": "tone"
        }));
        assert_eq!(result, Err(ValidationReason::wrong_type("key_factors")));

        let result = parse(json!({
            "impact_category": "neutral",
            "reasoning": "r",
            "confidence": "low",
            "key_factors": ["tone", 3]
        }));
        assert_eq!(result, Err(ValidationReason::wrong_type("key_factors")));
    }

    #[test]
    fn test_missing_confidence() {
        let result = parse(json!({
            "impact_category": "neutral",
            "reasoning": "r",
            "key_factors": []
        }));
        assert_eq!(result, Err(ValidationReason::missing("confidence")));
    }
}
