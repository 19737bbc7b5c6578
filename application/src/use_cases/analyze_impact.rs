//! Analyze Impact use case
//!
//! Second pass over a finished vote: every agent that cast a valid vote is
//! re-queried for the effect of that vote on its bilateral relationship with
//! the counterpart. Runs through the same orchestrator, so it checkpoints,
//! retries and resumes exactly like the vote itself. The result is an
//! [`ImpactReport`] that keeps each analysed vote next to its assessment.

use crate::config::{AnalysisParams, RunParams};
use crate::ports::checkpoint_store::CheckpointStore;
use crate::ports::progress::{NoProgress, RunProgress};
use crate::ports::provider_client::ProviderClient;
use crate::use_cases::orchestrator::{Orchestrator, RunError, RunRequest, TaskPrompts};
use assembly_domain::core::string::title_case_slug;
use assembly_domain::{
    AgentId, Counterpart, GenerationConfig, ImpactAssessment, ImpactReport, PromptTemplate,
    Roster, RosterEntry, RunId, RunRecord, VoteResponse,
};
use std::collections::HashMap;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::info;

/// Suffix of the default run identity of an impact pass
pub const IMPACT_SUFFIX: &str = "impact";

/// Default run identity of the impact pass over a task
pub fn impact_run_key(task_id: &str) -> String {
    format!("{task_id}.{IMPACT_SUFFIX}")
}

struct ImpactPrompts {
    system: String,
    counterpart: String,
    context: String,
    votes: HashMap<AgentId, VoteResponse>,
}

impl TaskPrompts for ImpactPrompts {
    fn system_prompt(&self, _entry: &RosterEntry) -> String {
        self.system.clone()
    }

    fn user_prompt(&self, entry: &RosterEntry) -> String {
        // Roster entries are built from the vote map, so the lookup only
        // misses if the two drift apart.
        match self.votes.get(&entry.id) {
            Some(vote) => PromptTemplate::impact_query(
                &self.counterpart,
                &self.context,
                &entry.display_name,
                vote.vote,
                &vote.statement,
            ),
            None => String::new(),
        }
    }
}

/// Input for the AnalyzeImpact use case
#[derive(Debug, Clone)]
pub struct AnalyzeImpactInput {
    /// Finished vote record to analyse
    pub votes: RunRecord<VoteResponse>,
    pub analysis: AnalysisParams,
    /// Generation settings of the vote pass; overridden by `analysis`
    pub generation: GenerationConfig,
    pub run_id: Option<String>,
    pub resume: bool,
}

impl AnalyzeImpactInput {
    pub fn new(
        votes: RunRecord<VoteResponse>,
        analysis: AnalysisParams,
        generation: GenerationConfig,
    ) -> Self {
        Self {
            votes,
            analysis,
            generation,
            run_id: None,
            resume: false,
        }
    }

    pub fn with_run_id(mut self, run_id: Option<String>) -> Self {
        self.run_id = run_id;
        self
    }

    pub fn resuming(mut self, resume: bool) -> Self {
        self.resume = resume;
        self
    }
}

/// Use case for the bilateral impact pass
pub struct AnalyzeImpactUseCase {
    orchestrator: Orchestrator<ImpactAssessment>,
}

impl AnalyzeImpactUseCase {
    pub fn new(
        provider: Arc<dyn ProviderClient>,
        store: Arc<dyn CheckpointStore<ImpactAssessment>>,
        params: RunParams,
    ) -> Self {
        Self {
            orchestrator: Orchestrator::new(provider, store, params),
        }
    }

    /// Execute the use case with default (no-op) progress
    pub async fn execute(&self, input: AnalyzeImpactInput) -> Result<ImpactReport, RunError> {
        self.execute_with_progress(input, &CancellationToken::new(), &NoProgress)
            .await
    }

    /// Execute the use case with cancellation and progress callbacks
    pub async fn execute_with_progress(
        &self,
        input: AnalyzeImpactInput,
        cancel: &CancellationToken,
        progress: &dyn RunProgress,
    ) -> Result<ImpactReport, RunError> {
        let votes = &input.votes;
        let task_id = votes.task_id().to_string();
        let run_id = match &input.run_id {
            Some(id) => RunId::new(id.clone())?,
            None => RunId::new(impact_run_key(&task_id))?,
        };

        let identity = input.analysis.counterpart.clone();
        let display_name = votes
            .entries()
            .iter()
            .find(|e| e.identity == identity)
            .map(|e| e.display_name.clone())
            .unwrap_or_else(|| title_case_slug(identity.as_str()));

        let (roster, vote_map) = analysis_roster(votes, &identity)?;
        info!(
            "Starting impact analysis of {} against {} for {} agents",
            task_id,
            display_name,
            roster.len()
        );

        let prompts = ImpactPrompts {
            system: PromptTemplate::impact_system(&display_name),
            context: motion_context(votes),
            counterpart: display_name.clone(),
            votes: vote_map,
        };
        let request = RunRequest {
            run_id,
            task_id,
            roster,
            generation: input.analysis.generation(&input.generation),
            resume: input.resume,
        };
        let record = self
            .orchestrator
            .execute(request, &prompts, cancel, progress)
            .await?;
        let counterpart = Counterpart {
            identity,
            display_name,
        };
        Ok(ImpactReport::new(record, votes, counterpart))
    }

    /// Archive the checkpoint once the finished report is stored
    pub async fn finalize(&self, run_id: &RunId) -> Result<(), RunError> {
        self.orchestrator.finalize(run_id).await
    }
}

/// Agents with a valid vote, minus the counterpart, in vote-record order
fn analysis_roster(
    votes: &RunRecord<VoteResponse>,
    counterpart: &AgentId,
) -> Result<(Roster, HashMap<AgentId, VoteResponse>), RunError> {
    let mut entries = Vec::new();
    let mut vote_map = HashMap::new();
    for entry in votes.entries() {
        if let Some(vote) = entry.outcome.success() {
            entries.push(RosterEntry::new(
                entry.identity.clone(),
                entry.display_name.clone(),
                String::new(),
            ));
            vote_map.insert(entry.identity.clone(), vote.clone());
        }
    }
    let roster = Roster::new(entries)?.without(counterpart);
    if roster.is_empty() {
        return Err(RunError::EmptyRoster);
    }
    Ok((roster, vote_map))
}

/// One-line description of the vote shared by every impact prompt
fn motion_context(votes: &RunRecord<VoteResponse>) -> String {
    let counts = votes
        .summary()
        .iter()
        .map(|(category, count)| format!("{category}={count}"))
        .collect::<Vec<_>>()
        .join(", ");
    format!("Motion {} - Vote summary: {}", votes.task_id(), counts)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::checkpoint_store::InMemoryCheckpointStore;
    use crate::use_cases::run_vote::{RunVoteInput, RunVoteUseCase};
    use crate::use_cases::test_support::{Reply, ScriptedProvider, roster};
    use assembly_domain::{ImpactCategory, Outcome, RunStatus, VoteChoice};

    const ASSESSMENT: &str = r#"{
        "impact_category": "Strained_Moderately",
        "reasoning": "The vote diverges from the counterpart's position.",
        "confidence": "medium",
        "key_factors": ["vote divergence", "trade ties"]
    }"#;

    async fn vote_record() -> RunRecord<VoteResponse> {
        let provider = Arc::new(
            ScriptedProvider::new()
                .script("Chad", vec![Reply::text("no json here")])
                .script(
                    "Israel",
                    vec![Reply::text(r#"{"vote":"no","statement":"We oppose."}"#)],
                ),
        );
        RunVoteUseCase::new(
            provider,
            Arc::new(InMemoryCheckpointStore::new()),
            RunParams::default(),
        )
        .execute(RunVoteInput::new(
            "motion-7",
            "Calls for a ceasefire.",
            roster(&["albania", "brazil", "chad", "israel"]),
            GenerationConfig::new("vote-model"),
        ))
        .await
        .unwrap()
    }

    #[tokio::test]
    async fn test_impact_pass_skips_failures_and_counterpart() {
        let votes = vote_record().await;
        assert_eq!(votes.summary().get("validation_failure"), 1);

        let provider = Arc::new(ScriptedProvider::new().with_default(Reply::text(ASSESSMENT)));
        let use_case = AnalyzeImpactUseCase::new(
            provider.clone(),
            Arc::new(InMemoryCheckpointStore::new()),
            RunParams::default(),
        );
        let input = AnalyzeImpactInput::new(
            votes,
            AnalysisParams::new(AgentId::new("israel").unwrap()),
            GenerationConfig::new("vote-model"),
        );

        let report = use_case.execute(input).await.unwrap();
        let record = report.record();

        assert_eq!(record.run_id().as_str(), "motion-7.impact");
        assert_eq!(record.task_id(), "motion-7");
        assert_eq!(record.total(), 2);
        assert_eq!(provider.total_calls(), 2);
        let ids: Vec<&str> = record.entries().iter().map(|e| e.identity.as_str()).collect();
        assert_eq!(ids, vec!["albania", "brazil"]);
        assert_eq!(record.summary().get("strained_moderately"), 2);
        assert_eq!(record.summary().get("neutral"), 0);
        assert_eq!(record.status(), RunStatus::Complete);
        match &record.entries()[0].outcome {
            Outcome::Success(assessment) => {
                assert_eq!(assessment.impact_category, ImpactCategory::StrainedModerately);
                assert_eq!(assessment.key_factors.len(), 2);
            }
            other => panic!("expected success, got {other:?}"),
        }

        // Each entry keeps the vote it classified, and the report names its source run
        assert_eq!(report.counterpart().identity.as_str(), "israel");
        assert_eq!(report.counterpart().display_name, "Israel");
        assert_eq!(report.source().run_id.as_str(), "motion-7");
        assert_eq!(report.source().model, "vote-model");
        assert_eq!(report.source().summary.get("no"), 1);
        assert_eq!(report.source().summary.get("validation_failure"), 1);
        let source = report.entries()[1].source.as_ref().unwrap();
        assert_eq!(source.vote, VoteChoice::Yes);
        assert_eq!(source.statement, "We support this.");
    }

    #[tokio::test]
    async fn test_report_checkpoint_live_until_finalized() {
        let votes = vote_record().await;
        let store = Arc::new(InMemoryCheckpointStore::<ImpactAssessment>::new());
        let use_case = AnalyzeImpactUseCase::new(
            Arc::new(ScriptedProvider::new().with_default(Reply::text(ASSESSMENT))),
            store.clone(),
            RunParams::default(),
        );

        let report = use_case
            .execute(AnalyzeImpactInput::new(
                votes,
                AnalysisParams::new(AgentId::new("israel").unwrap()),
                GenerationConfig::new("vote-model"),
            ))
            .await
            .unwrap();
        let run_id = report.record().run_id().clone();
        assert!(store.load(&run_id).await.unwrap().is_some());

        use_case.finalize(&run_id).await.unwrap();
        assert!(store.load(&run_id).await.unwrap().is_none());
        assert_eq!(store.archived_count(), 1);
    }

    #[tokio::test]
    async fn test_impact_prompts_carry_vote_and_counterpart() {
        let votes = vote_record().await;
        let (roster, vote_map) =
            analysis_roster(&votes, &AgentId::new("israel").unwrap()).unwrap();
        let prompts = ImpactPrompts {
            system: PromptTemplate::impact_system("Israel"),
            counterpart: "Israel".to_string(),
            context: motion_context(&votes),
            votes: vote_map,
        };

        let user = prompts.user_prompt(&roster.entries()[0]);
        assert!(user.contains("**Country:** Albania"));
        assert!(user.contains("**Vote:** YES"));
        assert!(user.contains("Motion motion-7 - Vote summary:"));
        assert!(user.contains("yes=2"));
        assert!(prompts.system_prompt(&roster.entries()[0]).contains("Israel"));
    }

    #[tokio::test]
    async fn test_no_valid_votes_is_rejected() {
        let provider = Arc::new(ScriptedProvider::new().with_default(Reply::text("garbage")));
        let votes = RunVoteUseCase::new(
            provider.clone(),
            Arc::new(InMemoryCheckpointStore::new()),
            RunParams::default(),
        )
        .execute(RunVoteInput::new(
            "motion-8",
            "Text.",
            roster(&["albania"]),
            GenerationConfig::new("vote-model"),
        ))
        .await
        .unwrap();

        let err = AnalyzeImpactUseCase::new(
            provider,
            Arc::new(InMemoryCheckpointStore::new()),
            RunParams::default(),
        )
        .execute(AnalyzeImpactInput::new(
            votes,
            AnalysisParams::new(AgentId::new("israel").unwrap()),
            GenerationConfig::new("vote-model"),
        ))
        .await
        .unwrap_err();

        assert!(matches!(err, RunError::EmptyRoster));
    }
}
