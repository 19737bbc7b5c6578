//! Run Vote use case
//!
//! Asks every roster entry to vote on one motion.

use crate::config::RunParams;
use crate::ports::checkpoint_store::CheckpointStore;
use crate::ports::progress::{NoProgress, RunProgress};
use crate::ports::provider_client::ProviderClient;
use crate::use_cases::orchestrator::{Orchestrator, RunError, RunRequest, TaskPrompts};
use assembly_domain::{
    DomainError, GenerationConfig, PromptTemplate, Roster, RosterEntry, RunId, RunRecord,
    VoteResponse,
};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::info;

/// Persona as system prompt, motion as user prompt
struct VotePrompts<'a> {
    motion: &'a str,
}

impl TaskPrompts for VotePrompts<'_> {
    fn system_prompt(&self, entry: &RosterEntry) -> String {
        entry.persona.clone()
    }

    fn user_prompt(&self, entry: &RosterEntry) -> String {
        PromptTemplate::vote_query(&entry.display_name, self.motion)
    }
}

/// Input for the RunVote use case
#[derive(Debug, Clone)]
pub struct RunVoteInput {
    /// Motion identifier, also the default run identity
    pub task_id: String,
    /// Motion text, passed to every agent unchanged
    pub motion: String,
    pub roster: Roster,
    pub generation: GenerationConfig,
    pub run_id: Option<String>,
    pub resume: bool,
}

impl RunVoteInput {
    pub fn new(
        task_id: impl Into<String>,
        motion: impl Into<String>,
        roster: Roster,
        generation: GenerationConfig,
    ) -> Self {
        Self {
            task_id: task_id.into(),
            motion: motion.into(),
            roster,
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

/// Use case for running a vote across the roster
pub struct RunVoteUseCase {
    orchestrator: Orchestrator<VoteResponse>,
}

impl RunVoteUseCase {
    pub fn new(
        provider: Arc<dyn ProviderClient>,
        store: Arc<dyn CheckpointStore<VoteResponse>>,
        params: RunParams,
    ) -> Self {
        Self {
            orchestrator: Orchestrator::new(provider, store, params),
        }
    }

    /// Execute the use case with default (no-op) progress
    pub async fn execute(
        &self,
        input: RunVoteInput,
    ) -> Result<RunRecord<VoteResponse>, RunError> {
        self.execute_with_progress(input, &CancellationToken::new(), &NoProgress)
            .await
    }

    /// Execute the use case with cancellation and progress callbacks
    pub async fn execute_with_progress(
        &self,
        input: RunVoteInput,
        cancel: &CancellationToken,
        progress: &dyn RunProgress,
    ) -> Result<RunRecord<VoteResponse>, RunError> {
        if input.motion.trim().is_empty() {
            return Err(DomainError::EmptyTaskContent.into());
        }
        let run_id = RunId::new(input.run_id.as_deref().unwrap_or(&input.task_id))?;

        info!(
            "Starting vote on {} with {} agents",
            input.task_id,
            input.roster.len()
        );

        let prompts = VotePrompts {
            motion: &input.motion,
        };
        let request = RunRequest {
            run_id,
            task_id: input.task_id,
            roster: input.roster,
            generation: input.generation,
            resume: input.resume,
        };
        self.orchestrator
            .execute(request, &prompts, cancel, progress)
            .await
    }

    /// Archive the checkpoint once the finished record is stored
    pub async fn finalize(&self, run_id: &RunId) -> Result<(), RunError> {
        self.orchestrator.finalize(run_id).await
    }
}
