//! Vote types for the voting task
//!
//! Every agent answers a motion with a [`VoteResponse`]: one of three
//! [`VoteChoice`] values plus a short statement explaining the position.

use super::response::{StructuredResponse, ValidationReason, required_enum, required_text};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A single vote value
///
/// # Example
///
/// ```
/// use assembly_domain::quorum::VoteChoice;
///
/// let vote: VoteChoice = "abstain".parse().unwrap();
/// assert_eq!(vote, VoteChoice::Abstain);
/// assert!("maybe".parse::<VoteChoice>().is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VoteChoice {
    Yes,
    No,
    Abstain,
}

impl VoteChoice {
    pub const ALL: [VoteChoice; 3] = [VoteChoice::Yes, VoteChoice::No, VoteChoice::Abstain];

    pub fn as_str(&self) -> &'static str {
        match self {
            VoteChoice::Yes => "yes",
            VoteChoice::No => "no",
            VoteChoice::Abstain => "abstain",
        }
    }
}

impl std::fmt::Display for VoteChoice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for VoteChoice {
    type Err = String;

    /// Accepts the three values case-insensitively; anything else is an error
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "yes" => Ok(VoteChoice::Yes),
            "no" => Ok(VoteChoice::No),
            "abstain" => Ok(VoteChoice::Abstain),
            other => Err(format!("invalid vote: {}", other)),
        }
    }
}

/// A validated vote with its justification
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoteResponse {
    pub vote: VoteChoice,
    /// Non-empty, trimmed statement
    pub statement: String,
}

impl VoteResponse {
    pub fn new(vote: VoteChoice, statement: impl Into<String>) -> Self {
        Self {
            vote,
            statement: statement.into(),
        }
    }
}

impl StructuredResponse for VoteResponse {
    fn categories() -> &'static [&'static str] {
        &["yes", "no", "abstain"]
    }

    fn category(&self) -> &'static str {
        self.vote.as_str()
    }

    fn from_object(object: &Map<String, Value>) -> Result<Self, ValidationReason> {
        let vote = required_enum::<VoteChoice>(object, "vote")?;
        let statement = required_text(object, "statement")?;
        Ok(Self { vote, statement })
    }

    fn fallback(error: &str) -> Self {
        Self::new(VoteChoice::Abstain, format!("[Error: {}]", error))
    }
}
