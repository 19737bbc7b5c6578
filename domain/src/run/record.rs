//! Run record: the stable output of a run

use super::manifest::RunId;
use crate::quorum::{Outcome, PROVIDER_FAILURE, StructuredResponse, VALIDATION_FAILURE};
use crate::roster::AgentId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Counts per outcome category
///
/// Every payload category and both failure categories are always present,
/// zero or not.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RunSummary(BTreeMap<String, usize>);

impl RunSummary {
    /// All-zero summary for a payload type
    pub fn empty<T: StructuredResponse>() -> Self {
        let counts = T::categories()
            .iter()
            .copied()
            .chain([VALIDATION_FAILURE, PROVIDER_FAILURE])
            .map(|c| (c.to_string(), 0))
            .collect();
        Self(counts)
    }

    /// Recompute a summary from recorded outcomes
    pub fn from_outcomes<'a, T: StructuredResponse>(
        outcomes: impl IntoIterator<Item = &'a Outcome<T>>,
    ) -> Self {
        let mut summary = Self::empty::<T>();
        for outcome in outcomes {
            *summary.0.entry(outcome.category().to_string()).or_insert(0) += 1;
        }
        summary
    }

    pub fn get(&self, category: &str) -> usize {
        self.0.get(category).copied().unwrap_or(0)
    }

    /// Number of resolved entries
    pub fn sum(&self) -> usize {
        self.0.values().sum()
    }

    pub fn failures(&self) -> usize {
        self.get(VALIDATION_FAILURE) + self.get(PROVIDER_FAILURE)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, usize)> {
        self.0.iter().map(|(k, v)| (k.as_str(), *v))
    }
}

/// One (roster entry, outcome) pair of a run record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(bound(deserialize = "T: StructuredResponse"))]
pub struct RunEntry<T> {
    pub identity: AgentId,
    pub display_name: String,
    pub outcome: Outcome<T>,
}

/// Overall status of a run, as reported to the user
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStatus {
    /// Every roster entry resolved successfully
    Complete,
    /// Every roster entry resolved, some with failures
    CompletedWithFailures,
    /// Some roster entries have no recorded outcome
    Incomplete,
}

/// Aggregated result of a run, entries in roster order
///
/// Only [`RunAggregator`](super::RunAggregator) builds records, and
/// deserialization re-checks the summary, so a record whose summary
/// disagrees with its entries cannot exist.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(
    try_from = "RunRecordRepr<T>",
    bound(deserialize = "T: StructuredResponse")
)]
pub struct RunRecord<T> {
    run_id: RunId,
    task_id: String,
    timestamp: DateTime<Utc>,
    provider: String,
    model: String,
    total: usize,
    summary: RunSummary,
    entries: Vec<RunEntry<T>>,
    /// Identities without an outcome, in roster order
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pending: Vec<AgentId>,
}

impl<T: StructuredResponse> RunRecord<T> {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn assemble(
        run_id: RunId,
        task_id: String,
        timestamp: DateTime<Utc>,
        provider: String,
        model: String,
        total: usize,
        entries: Vec<RunEntry<T>>,
        pending: Vec<AgentId>,
    ) -> Self {
        let summary = RunSummary::from_outcomes(entries.iter().map(|e| &e.outcome));
        Self {
            run_id,
            task_id,
            timestamp,
            provider,
            model,
            total,
            summary,
            entries,
            pending,
        }
    }

    pub fn run_id(&self) -> &RunId {
        &self.run_id
    }

    pub fn task_id(&self) -> &str {
        &self.task_id
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    pub fn provider(&self) -> &str {
        &self.provider
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Size of the run's roster, independent of how many entries resolved
    pub fn total(&self) -> usize {
        self.total
    }

    pub fn summary(&self) -> &RunSummary {
        &self.summary
    }

    pub fn entries(&self) -> &[RunEntry<T>] {
        &self.entries
    }

    pub fn pending(&self) -> &[AgentId] {
        &self.pending
    }

    /// Number of identities with a recorded outcome
    pub fn resolved(&self) -> usize {
        self.summary.sum()
    }

    pub fn is_complete(&self) -> bool {
        self.resolved() == self.total
    }

    /// Number of recorded failures of either kind
    pub fn failures(&self) -> usize {
        self.summary.failures()
    }

    pub fn status(&self) -> RunStatus {
        if !self.is_complete() {
            RunStatus::Incomplete
        } else if self.summary.failures() > 0 {
            RunStatus::CompletedWithFailures
        } else {
            RunStatus::Complete
        }
    }
}

/// Wire shape of a record, validated on the way in
#[derive(Deserialize)]
#[serde(bound(deserialize = "T: StructuredResponse"))]
struct RunRecordRepr<T> {
    run_id: RunId,
    task_id: String,
    timestamp: DateTime<Utc>,
    provider: String,
    model: String,
    total: usize,
    summary: RunSummary,
    entries: Vec<RunEntry<T>>,
    #[serde(default)]
    pending: Vec<AgentId>,
}

impl<T: StructuredResponse> TryFrom<RunRecordRepr<T>> for RunRecord<T> {
    type Error = String;

    fn try_from(repr: RunRecordRepr<T>) -> Result<Self, Self::Error> {
        if repr.entries.len() + repr.pending.len() != repr.total {
            return Err(format!(
                "record lists {} entries and {} pending but total is {}",
                repr.entries.len(),
                repr.pending.len(),
                repr.total
            ));
        }
        let record = Self::assemble(
            repr.run_id,
            repr.task_id,
            repr.timestamp,
            repr.provider,
            repr.model,
            repr.total,
            repr.entries,
            repr.pending,
        );
        if record.summary != repr.summary {
            return Err("summary counts do not match entries".to_string());
        }
        Ok(record)
    }
}
