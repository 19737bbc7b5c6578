//! Run parameters for the orchestrator
//!
//! [`RunParams`] groups the static parameters that control how the
//! orchestrator schedules provider calls: how many at once, how failed calls
//! are retried, and what happens to tasks that fail.

use assembly_domain::FailurePolicy;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Exponential backoff between attempts of one provider call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetryPolicy {
    /// Retries after the first attempt; 0 disables retrying.
    pub max_retries: u32,
    /// Delay before the first retry.
    pub base_delay: Duration,
    /// Upper bound for any single delay, including provider-suggested ones.
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 1,
            base_delay: Duration::from_millis(500),
            max_delay: Duration::from_secs(30),
        }
    }
}

impl RetryPolicy {
    /// No waiting between attempts
    pub fn immediate(max_retries: u32) -> Self {
        Self {
            max_retries,
            base_delay: Duration::ZERO,
            max_delay: Duration::ZERO,
        }
    }

    /// Delay before retry number `attempt` (1-based)
    ///
    /// `base * 2^(attempt-1)`, raised to `retry_after` when the provider asked
    /// for longer, and capped at `max_delay` either way.
    pub fn delay(&self, attempt: u32, retry_after: Option<Duration>) -> Duration {
        let exponent = attempt.saturating_sub(1).min(16);
        let backoff = self.base_delay.saturating_mul(1u32 << exponent);
        let wanted = match retry_after {
            Some(hint) if hint > backoff => hint,
            _ => backoff,
        };
        wanted.min(self.max_delay)
    }
}

/// Orchestrator control parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunParams {
    /// Maximum number of provider calls in flight.
    pub concurrency: usize,
    /// Retry behavior for retryable provider failures.
    pub retry: RetryPolicy,
    /// What to record for tasks that fail.
    pub failure_policy: FailurePolicy,
    /// Keep only the first N roster entries.
    pub sample: Option<usize>,
}

impl Default for RunParams {
    fn default() -> Self {
        Self {
            concurrency: 4,
            retry: RetryPolicy::default(),
            failure_policy: FailurePolicy::default(),
            sample: None,
        }
    }
}

impl RunParams {
    // ==================== Builder Methods ====================

    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.retry.max_retries = max_retries;
        self
    }

    pub fn with_failure_policy(mut self, policy: FailurePolicy) -> Self {
        self.failure_policy = policy;
        self
    }

    pub fn with_sample(mut self, sample: Option<usize>) -> Self {
        self.sample = sample;
        self
    }
}
