//! Per-agent outcome of a task
//!
//! Exactly one [`Outcome`] is recorded per roster entry per run. Failures are
//! first-class values here: a response that breaks the output contract or a
//! provider that never answers is counted as such, never folded into a
//! legitimate-looking payload.

use super::response::{StructuredResponse, ValidationReason};
use serde::{Deserialize, Serialize};

/// Summary key for validation failures
pub const VALIDATION_FAILURE: &str = "validation_failure";
/// Summary key for provider failures
pub const PROVIDER_FAILURE: &str = "provider_failure";

/// The single recorded result of attempting one agent's task
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Outcome<T> {
    /// The model answered and the answer satisfied the output contract
    Success(T),
    /// The model answered but the payload violated the contract
    ValidationFailure {
        raw: String,
        reason: ValidationReason,
    },
    /// No usable answer was obtained from the provider
    ProviderFailure {
        reason: String,
        /// Whether the underlying error class was transient (retries exhausted)
        retryable: bool,
    },
}

impl<T: StructuredResponse> Outcome<T> {
    pub fn validation_failure(raw: impl Into<String>, reason: ValidationReason) -> Self {
        Outcome::ValidationFailure {
            raw: raw.into(),
            reason,
        }
    }

    pub fn provider_failure(reason: impl Into<String>, retryable: bool) -> Self {
        Outcome::ProviderFailure {
            reason: reason.into(),
            retryable,
        }
    }

    /// The summary category this outcome is counted under
    pub fn category(&self) -> &'static str {
        match self {
            Outcome::Success(payload) => payload.category(),
            Outcome::ValidationFailure { .. } => VALIDATION_FAILURE,
            Outcome::ProviderFailure { .. } => PROVIDER_FAILURE,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Success(_))
    }

    pub fn success(&self) -> Option<&T> {
        match self {
            Outcome::Success(payload) => Some(payload),
            _ => None,
        }
    }

    /// Short human-readable description of a failure
    pub fn failure_description(&self) -> Option<String> {
        match self {
            Outcome::Success(_) => None,
            Outcome::ValidationFailure { reason, .. } => Some(reason.to_string()),
            Outcome::ProviderFailure { reason, .. } => Some(reason.clone()),
        }
    }
}

/// How failed tasks are recorded
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailurePolicy {
    /// Record failures as their own outcome categories
    #[default]
    Record,
    /// Replace any failure with the payload's fallback value (legacy behaviour)
    LegacyDefault,
}

impl FailurePolicy {
    /// Apply the policy to a freshly produced outcome
    pub fn apply<T: StructuredResponse>(&self, outcome: Outcome<T>) -> Outcome<T> {
        match (self, outcome.failure_description()) {
            (FailurePolicy::LegacyDefault, Some(error)) => Outcome::Success(T::fallback(&error)),
            (_, _) => outcome,
        }
    }
}

impl std::str::FromStr for FailurePolicy {
    type Err = crate::core::error::DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "record" => Ok(FailurePolicy::Record),
            "legacy_default" | "legacy-default" => Ok(FailurePolicy::LegacyDefault),
            other => Err(crate::core::error::DomainError::InvalidFailurePolicy(
                other.to_string(),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::quorum::vote::{VoteChoice, VoteResponse};
    use serde_json::json;

    #[test]
    fn test_categories() {
        let ok: Outcome<VoteResponse> = Outcome::Success(VoteResponse::new(VoteChoice::No, "No."));
        assert_eq!(ok.category(), "no");

        let invalid: Outcome<VoteResponse> =
            Outcome::validation_failure("garbage", ValidationReason::NotParseable);
        assert_eq!(invalid.category(), VALIDATION_FAILURE);

        let failed: Outcome<VoteResponse> = Outcome::provider_failure("timeout", true);
        assert_eq!(failed.category(), PROVIDER_FAILURE);
    }

    #[test]
    fn test_success_serializes_flat_with_status_tag() {
        let ok: Outcome<VoteResponse> =
            Outcome::Success(VoteResponse::new(VoteChoice::Yes, "We support this."));
        let value = serde_json::to_value(&ok).unwrap();
        assert_eq!(
            value,
            json!({"status": "success", "vote": "yes", "statement": "We support this."})
        );

        let back: Outcome<VoteResponse> = serde_json::from_value(value).unwrap();
        assert_eq!(back, ok);
    }

    #[test]
    fn test_failure_serialization() {
        let failed: Outcome<VoteResponse> = Outcome::provider_failure("unauthenticated", false);
        let value = serde_json::to_value(&failed).unwrap();
        assert_eq!(
            value,
            json!({"status": "provider_failure", "reason": "unauthenticated", "retryable": false})
        );
    }

    #[test]
    fn test_record_policy_keeps_failures() {
        let invalid: Outcome<VoteResponse> =
            Outcome::validation_failure("x", ValidationReason::NotParseable);
        assert_eq!(FailurePolicy::Record.apply(invalid.clone()), invalid);
    }

    #[test]
    fn test_legacy_policy_defaults_to_abstain() {
        let failed: Outcome<VoteResponse> = Outcome::provider_failure("timeout", true);
        let converted = FailurePolicy::LegacyDefault.apply(failed);
        let vote = converted.success().unwrap();
        assert_eq!(vote.vote, VoteChoice::Abstain);
        assert_eq!(vote.statement, "[Error: timeout]");
    }

    #[test]
    fn test_policy_from_str() {
        assert_eq!("record".parse::<FailurePolicy>().unwrap(), FailurePolicy::Record);
        assert_eq!(
            "legacy_default".parse::<FailurePolicy>().unwrap(),
            FailurePolicy::LegacyDefault
        );
        assert!("abstain".parse::<FailurePolicy>().is_err());
    }
}
