//! Prompt templates for the voting and impact passes

use crate::quorum::{ImpactAssessment, StructuredResponse, VoteChoice};

/// Templates for generating prompts at each pass
pub struct PromptTemplate;

impl PromptTemplate {
    /// User prompt asking one delegate to vote on a motion
    pub fn vote_query(display_name: &str, motion: &str) -> String {
        format!(
            r#"You are voting on the following UN General Assembly resolution:

{motion}

You must respond with a JSON object containing:
1. "vote": Your vote - must be exactly one of: "yes", "no", or "abstain"
2. "statement": A brief statement (2-4 sentences) explaining your country's position

Your response must be valid JSON in this exact format:
{{
  "vote": "yes",
  "statement": "Your explanation here."
}}

Remember to vote according to {display_name}'s national interests and foreign policy positions."#
        )
    }

    /// System prompt for the bilateral impact analyst
    pub fn impact_system(counterpart: &str) -> String {
        format!(
            r#"You are an expert international relations analyst specializing in bilateral relationships.

Your task is to analyze how a country's vote on a UN resolution affects its bilateral relationship with {counterpart}. Consider:
- Historical relationship baseline
- Vote alignment or divergence
- Diplomatic tone in statement
- Strategic, economic and security ties

Be objective and nuanced. Not all "yes" votes strengthen relations equally, and not all "no" votes strain them equally."#
        )
    }

    /// User prompt asking for the impact of one country's vote
    pub fn impact_query(
        counterpart: &str,
        motion_context: &str,
        display_name: &str,
        vote: VoteChoice,
        statement: &str,
    ) -> String {
        let categories = ImpactAssessment::categories().join(", ");
        format!(
            r#"Analyze how this country's vote affects its bilateral relationship with {counterpart}:

**Motion Context:** {motion_context}

**Country:** {display_name}
**Vote:** {vote}
**Statement:** {statement}

You must respond with a JSON object containing:
1. "impact_category": Must be exactly one of: {categories}
2. "reasoning": 2-3 sentences explaining your assessment
3. "confidence": Your confidence level (high/medium/low)
4. "key_factors": Array of 2-4 key factors driving this assessment

Your response must be valid JSON in this exact format:
{{
  "impact_category": "neutral",
  "reasoning": "Your analysis here.",
  "confidence": "high",
  "key_factors": ["factor 1", "factor 2"]
}}"#,
            vote = vote.as_str().to_uppercase(),
        )
    }
}
