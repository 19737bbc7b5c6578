//! Impact report: an impact record tied back to the vote it analysed

use super::manifest::RunId;
use super::record::{RunRecord, RunSummary};
use crate::quorum::{ImpactAssessment, Outcome, VoteResponse};
use crate::roster::AgentId;
use chrono::{DateTime, Utc};
use serde::{Serialize, Serializer};
use std::collections::HashMap;

/// The agent whose bilateral relationships were assessed
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Counterpart {
    pub identity: AgentId,
    pub display_name: String,
}

/// Header of the vote run an impact pass was derived from
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SourceRun {
    pub run_id: RunId,
    pub timestamp: DateTime<Utc>,
    pub provider: String,
    pub model: String,
    pub summary: RunSummary,
}

/// One impact outcome next to the vote that was classified
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImpactEntry {
    pub identity: AgentId,
    pub display_name: String,
    /// `vote` and `statement` of the analysed vote
    #[serde(flatten)]
    pub source: Option<VoteResponse>,
    pub outcome: Outcome<ImpactAssessment>,
}

/// Impact record plus the vote context it was built from
///
/// Serializes as the impact [`RunRecord`] with `counterpart` and `source`
/// added, and with each entry carrying its analysed `vote` and `statement`.
#[derive(Debug, Clone, PartialEq)]
pub struct ImpactReport {
    record: RunRecord<ImpactAssessment>,
    counterpart: Counterpart,
    source: SourceRun,
    entries: Vec<ImpactEntry>,
}

impl ImpactReport {
    pub fn new(
        record: RunRecord<ImpactAssessment>,
        votes: &RunRecord<VoteResponse>,
        counterpart: Counterpart,
    ) -> Self {
        let cast: HashMap<&AgentId, &VoteResponse> = votes
            .entries()
            .iter()
            .filter_map(|e| e.outcome.success().map(|vote| (&e.identity, vote)))
            .collect();
        let entries = record
            .entries()
            .iter()
            .map(|e| ImpactEntry {
                identity: e.identity.clone(),
                display_name: e.display_name.clone(),
                source: cast.get(&e.identity).map(|vote| (*vote).clone()),
                outcome: e.outcome.clone(),
            })
            .collect();
        let source = SourceRun {
            run_id: votes.run_id().clone(),
            timestamp: votes.timestamp(),
            provider: votes.provider().to_string(),
            model: votes.model().to_string(),
            summary: votes.summary().clone(),
        };

        Self {
            record,
            counterpart,
            source,
            entries,
        }
    }

    pub fn record(&self) -> &RunRecord<ImpactAssessment> {
        &self.record
    }

    pub fn counterpart(&self) -> &Counterpart {
        &self.counterpart
    }

    pub fn source(&self) -> &SourceRun {
        &self.source
    }

    /// Entries in roster order
    pub fn entries(&self) -> &[ImpactEntry] {
        &self.entries
    }
}

#[derive(Serialize)]
struct ReportView<'a> {
    run_id: &'a RunId,
    task_id: &'a str,
    timestamp: DateTime<Utc>,
    provider: &'a str,
    model: &'a str,
    total: usize,
    summary: &'a RunSummary,
    counterpart: &'a Counterpart,
    source: &'a SourceRun,
    entries: &'a [ImpactEntry],
    #[serde(skip_serializing_if = "<[AgentId]>::is_empty")]
    pending: &'a [AgentId],
}

impl Serialize for ImpactReport {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let record = &self.record;
        ReportView {
            run_id: record.run_id(),
            task_id: record.task_id(),
            timestamp: record.timestamp(),
            provider: record.provider(),
            model: record.model(),
            total: record.total(),
            summary: record.summary(),
            counterpart: &self.counterpart,
            source: &self.source,
            entries: &self.entries,
            pending: record.pending(),
        }
        .serialize(serializer)
    }
}
