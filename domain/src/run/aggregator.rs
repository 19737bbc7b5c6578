//! Run aggregation
//!
//! [`RunAggregator`] folds a (possibly partial) checkpoint into a
//! [`RunRecord`]. It never mutates the checkpoint and embeds no clock of its
//! own, so identical checkpoints always aggregate to identical records.

use super::checkpoint::CheckpointState;
use super::record::{RunEntry, RunRecord};
use crate::quorum::StructuredResponse;

pub struct RunAggregator;

impl RunAggregator {
    /// Aggregate a checkpoint snapshot in roster order
    pub fn aggregate<T: StructuredResponse>(state: &CheckpointState<T>) -> RunRecord<T> {
        let manifest = state.manifest();
        let mut entries = Vec::with_capacity(state.resolved_count());
        let mut pending = Vec::new();

        for member in &manifest.roster {
            match state.outcome(&member.identity) {
                Some(outcome) => entries.push(RunEntry {
                    identity: member.identity.clone(),
                    display_name: member.display_name.clone(),
                    outcome: outcome.clone(),
                }),
                None => pending.push(member.identity.clone()),
            }
        }

        RunRecord::assemble(
            manifest.run_id.clone(),
            manifest.task_id.clone(),
            manifest.timestamp,
            manifest.provider.clone(),
            manifest.model.clone(),
            manifest.total(),
            entries,
            pending,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::quorum::{Outcome, ValidationReason, VoteChoice, VoteResponse};
    use crate::roster::{AgentId, Roster, RosterEntry};
    use crate::run::{RunId, RunManifest, RunStatus};
    use chrono::{TimeZone, Utc};

    const SLUGS: [&str; 5] = ["albania", "brazil", "chad", "denmark", "egypt"];

    fn state() -> CheckpointState<VoteResponse> {
        let roster = Roster::new(
            SLUGS
                .iter()
                .map(|s| RosterEntry::from_slug(s, "").unwrap())
                .collect(),
        )
        .unwrap();
        let manifest = RunManifest::new(
            RunId::new("01_test_motion").unwrap(),
            "01_test_motion",
            "openai",
            "gpt-4",
            &roster,
            Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap(),
        );
        CheckpointState::new(manifest)
    }

    fn id(slug: &str) -> AgentId {
        AgentId::new(slug).unwrap()
    }

    fn vote(choice: VoteChoice) -> Outcome<VoteResponse> {
        Outcome::Success(VoteResponse::new(choice, "Statement."))
    }

    #[test]
    fn test_entries_follow_roster_order_not_record_order() {
        let mut state = state();
        for slug in ["egypt", "albania", "denmark", "chad", "brazil"] {
            state.record(id(slug), vote(VoteChoice::Yes)).unwrap();
        }
        let record = RunAggregator::aggregate(&state);
        let order: Vec<_> = record.entries().iter().map(|e| e.identity.as_str()).collect();
        assert_eq!(order, SLUGS.to_vec());
        assert_eq!(record.entries()[1].display_name, "Brazil");
    }

    #[test]
    fn test_complete_run_summary_sums_to_total() {
        let mut state = state();
        state.record(id("albania"), vote(VoteChoice::Yes)).unwrap();
        state.record(id("brazil"), vote(VoteChoice::No)).unwrap();
        state.record(id("chad"), vote(VoteChoice::Abstain)).unwrap();
        state
            .record(
                id("denmark"),
                Outcome::validation_failure("??", ValidationReason::NotParseable),
            )
            .unwrap();
        state
            .record(id("egypt"), Outcome::provider_failure("timeout", true))
            .unwrap();

        let record = RunAggregator::aggregate(&state);
        let summary = record.summary();
        assert_eq!(record.total(), 5);
        assert_eq!(summary.sum(), record.total());
        assert_eq!(summary.get("yes"), 1);
        assert_eq!(summary.get("no"), 1);
        assert_eq!(summary.get("abstain"), 1);
        assert_eq!(summary.get("validation_failure"), 1);
        assert_eq!(summary.get("provider_failure"), 1);
        assert_eq!(record.status(), RunStatus::CompletedWithFailures);
        assert_eq!(record.resolved(), 5);
        assert_eq!(record.failures(), 2);
        assert!(record.is_complete());
        assert!(record.pending().is_empty());
    }

    #[test]
    fn test_partial_run_is_visibly_incomplete() {
        let mut state = state();
        state.record(id("brazil"), vote(VoteChoice::No)).unwrap();

        let record = RunAggregator::aggregate(&state);
        assert_eq!(record.total(), 5);
        assert_eq!(record.resolved(), 1);
        assert!(!record.is_complete());
        assert_eq!(record.status(), RunStatus::Incomplete);
        let pending: Vec<_> = record.pending().iter().map(|p| p.as_str()).collect();
        assert_eq!(pending, vec!["albania", "chad", "denmark", "egypt"]);
    }

    #[test]
    fn test_all_categories_present_when_zero() {
        let record = RunAggregator::aggregate(&state());
        let keys: Vec<_> = record.summary().iter().map(|(k, _)| k).collect();
        assert_eq!(
            keys,
            vec!["abstain", "no", "provider_failure", "validation_failure", "yes"]
        );
        assert_eq!(record.summary().sum(), 0);
    }

    #[test]
    fn test_aggregation_is_byte_for_byte_reproducible() {
        let mut state = state();
        state.record(id("chad"), vote(VoteChoice::Yes)).unwrap();
        state.record(id("albania"), vote(VoteChoice::No)).unwrap();

        let first = serde_json::to_string_pretty(&RunAggregator::aggregate(&state)).unwrap();
        let second = serde_json::to_string_pretty(&RunAggregator::aggregate(&state)).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_record_json_shape_and_reload() {
        let mut state = state();
        for slug in SLUGS {
            state.record(id(slug), vote(VoteChoice::Yes)).unwrap();
        }
        let record = RunAggregator::aggregate(&state);
        let value = serde_json::to_value(&record).unwrap();

        assert_eq!(value["task_id"], "01_test_motion");
        assert_eq!(value["total"], 5);
        assert_eq!(value["summary"]["yes"], 5);
        assert_eq!(value["entries"][0]["identity"], "albania");
        assert_eq!(value["entries"][0]["outcome"]["status"], "success");
        assert!(value.get("pending").is_none());

        let reloaded: crate::run::RunRecord<VoteResponse> =
            serde_json::from_value(value).unwrap();
        assert_eq!(reloaded, record);
    }

    #[test]
    fn test_tampered_summary_rejected_on_load() {
        let mut state = state();
        for slug in SLUGS {
            state.record(id(slug), vote(VoteChoice::Yes)).unwrap();
        }
        let mut value = serde_json::to_value(RunAggregator::aggregate(&state)).unwrap();
        value["summary"]["yes"] = serde_json::json!(4);
        value["summary"]["no"] = serde_json::json!(1);

        let result: Result<crate::run::RunRecord<VoteResponse>, _> =
            serde_json::from_value(value);
        assert!(result.is_err());
    }
}
