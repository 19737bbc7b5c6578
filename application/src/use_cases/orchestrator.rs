//! Orchestrator
//!
//! Fans one request out over every pending roster entry, bounded by a
//! concurrency limit, and records exactly one outcome per entry.
//!
//! # Task lifecycle
//!
//! ```text
//! Pending ──(permit)──► Dispatched ──► text ──► Validating ──► Resolved
//!                           │
//!                           └─► provider error ──(retryable, attempts left)──► backoff ──► Dispatched
//!                                              └─(otherwise)──► Resolved(ProviderFailure)
//! ```
//!
//! Entries are dispatched in roster order. Outcomes are recorded in
//! completion order, but every record the run produces iterates in roster
//! order.

use crate::config::{RetryPolicy, RunParams};
use crate::ports::checkpoint_store::{CheckpointError, CheckpointStore};
use crate::ports::progress::RunProgress;
use crate::ports::provider_client::{ProviderClient, ProviderError};
use assembly_domain::{
    AgentId, CheckpointState, ConsistencyError, DomainError, FailurePolicy, GenerationConfig,
    Outcome, ResponseValidator, Roster, RosterEntry, RunAggregator, RunId, RunManifest,
    RunRecord, RunStatus, StructuredResponse,
};
use chrono::Utc;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

/// Errors that abort a run
///
/// Task-level failures never show up here; they are recorded as outcomes.
#[derive(Error, Debug)]
pub enum RunError {
    #[error("Roster is empty")]
    EmptyRoster,

    #[error("Invalid run input: {0}")]
    InvalidInput(#[from] DomainError),

    #[error("A checkpoint for run {0} already exists; resume it or choose another run id")]
    CheckpointExists(RunId),

    #[error("Checkpoint for run {0} was started with a different roster or task")]
    ManifestMismatch(RunId),

    #[error("Consistency error: {0}")]
    Consistency(#[from] ConsistencyError),

    #[error("Checkpoint error: {0}")]
    Checkpoint(#[from] CheckpointError),
}

impl RunError {
    /// Whether the run was refused before any task was dispatched
    pub fn is_setup(&self) -> bool {
        matches!(
            self,
            Self::EmptyRoster | Self::InvalidInput(_) | Self::CheckpointExists(_)
        )
    }

    fn from_store(error: CheckpointError) -> Self {
        match error {
            CheckpointError::Consistency(e) => Self::Consistency(e),
            other => Self::Checkpoint(other),
        }
    }
}

/// Builds the prompts of one task from its roster entry
pub trait TaskPrompts: Send + Sync {
    fn system_prompt(&self, entry: &RosterEntry) -> String;

    fn user_prompt(&self, entry: &RosterEntry) -> String;
}

/// Unit of work: one persona plus one request context
#[derive(Debug, Clone)]
pub struct AgentTask {
    pub identity: AgentId,
    pub display_name: String,
    pub system_prompt: String,
    pub user_prompt: String,
}

impl AgentTask {
    pub fn new(entry: &RosterEntry, prompts: &dyn TaskPrompts) -> Self {
        Self {
            identity: entry.id.clone(),
            display_name: entry.display_name.clone(),
            system_prompt: prompts.system_prompt(entry),
            user_prompt: prompts.user_prompt(entry),
        }
    }
}

/// Input for one orchestrated run
#[derive(Debug, Clone)]
pub struct RunRequest {
    pub run_id: RunId,
    pub task_id: String,
    /// Full roster; sampling is applied by the orchestrator
    pub roster: Roster,
    pub generation: GenerationConfig,
    /// Continue an existing checkpoint instead of refusing to start
    pub resume: bool,
}

/// Schedules agent tasks against a provider and records their outcomes
pub struct Orchestrator<T: StructuredResponse> {
    provider: Arc<dyn ProviderClient>,
    store: Arc<dyn CheckpointStore<T>>,
    params: RunParams,
}

impl<T: StructuredResponse> Orchestrator<T> {
    pub fn new(
        provider: Arc<dyn ProviderClient>,
        store: Arc<dyn CheckpointStore<T>>,
        params: RunParams,
    ) -> Self {
        Self {
            provider,
            store,
            params,
        }
    }

    pub fn params(&self) -> &RunParams {
        &self.params
    }

    /// Run every pending task and aggregate the result
    ///
    /// The checkpoint stays live either way. Once a complete run's record is
    /// stored, call [`finalize`](Self::finalize) to archive it; a cancelled
    /// run returns an incomplete snapshot to be resumed later.
    pub async fn execute(
        &self,
        request: RunRequest,
        prompts: &dyn TaskPrompts,
        cancel: &CancellationToken,
        progress: &dyn RunProgress,
    ) -> Result<RunRecord<T>, RunError> {
        let roster = match self.params.sample {
            Some(n) => request.roster.clone().sample(n),
            None => request.roster.clone(),
        };
        if roster.is_empty() {
            return Err(RunError::EmptyRoster);
        }

        let mut state = self.open_checkpoint(&request, &roster).await?;
        let run_id = state.manifest().run_id.clone();
        progress.on_run_start(state.manifest(), state.resolved_count());

        let tasks: Vec<AgentTask> = state
            .pending(&roster)
            .map(|entry| AgentTask::new(entry, prompts))
            .collect();
        info!(
            "Run {}: {} of {} tasks pending (concurrency {})",
            run_id,
            tasks.len(),
            roster.len(),
            self.params.concurrency
        );

        if let Err(e) = self
            .dispatch(tasks, &mut state, &request.generation, cancel, progress)
            .await
        {
            error!("Run {} aborted: {}", run_id, e);
            progress.on_run_complete(RunStatus::Incomplete);
            return Err(e);
        }

        if !state.is_complete() {
            warn!(
                "Run {} stopped with {} of {} tasks resolved; checkpoint kept for resume",
                run_id,
                state.resolved_count(),
                roster.len()
            );
        }
        let record = RunAggregator::aggregate(&state);

        info!("Run {} finished: {:?}", run_id, record.status());
        progress.on_run_complete(record.status());
        Ok(record)
    }

    /// Archive the checkpoint of a complete run
    ///
    /// Until this succeeds, resuming the run rebuilds the same record without
    /// calling the provider.
    pub async fn finalize(&self, run_id: &RunId) -> Result<(), RunError> {
        self.store
            .finalize(run_id)
            .await
            .map_err(RunError::from_store)?;
        info!("Run {} finalized", run_id);
        Ok(())
    }

    /// Load or create the checkpoint for a request
    async fn open_checkpoint(
        &self,
        request: &RunRequest,
        roster: &Roster,
    ) -> Result<CheckpointState<T>, RunError> {
        let existing = self
            .store
            .load(&request.run_id)
            .await
            .map_err(RunError::from_store)?;

        match existing {
            Some(_) if !request.resume => Err(RunError::CheckpointExists(request.run_id.clone())),
            Some(state) => {
                let frozen = state.manifest();
                if !frozen.matches_roster(roster) || frozen.task_id != request.task_id {
                    return Err(RunError::ManifestMismatch(request.run_id.clone()));
                }
                if frozen.model != request.generation.model || frozen.provider != self.provider.name()
                {
                    warn!(
                        "Resuming run {} started with {}/{}; now using {}/{}",
                        frozen.run_id,
                        frozen.provider,
                        frozen.model,
                        self.provider.name(),
                        request.generation.model
                    );
                }
                info!(
                    "Resuming run {} with {}/{} outcomes recorded",
                    frozen.run_id,
                    state.resolved_count(),
                    frozen.total()
                );
                Ok(state)
            }
            None => {
                if request.resume {
                    info!("No checkpoint for run {}; starting fresh", request.run_id);
                }
                let manifest = RunManifest::new(
                    request.run_id.clone(),
                    request.task_id.clone(),
                    self.provider.name(),
                    request.generation.model.clone(),
                    roster,
                    Utc::now(),
                );
                self.store
                    .create(&manifest)
                    .await
                    .map_err(RunError::from_store)
            }
        }
    }

    /// Dispatch tasks in order while permits are free and record results as they land
    async fn dispatch(
        &self,
        tasks: Vec<AgentTask>,
        state: &mut CheckpointState<T>,
        generation: &GenerationConfig,
        cancel: &CancellationToken,
        progress: &dyn RunProgress,
    ) -> Result<(), RunError> {
        // Cancelled by the caller or by a fatal error in this run
        let stop = cancel.child_token();
        let semaphore = Arc::new(Semaphore::new(self.params.concurrency));
        let mut queue = tasks.into_iter().peekable();
        let mut join_set = JoinSet::new();
        let mut fatal: Option<RunError> = None;

        loop {
            while !stop.is_cancelled() && queue.peek().is_some() {
                let Ok(permit) = Arc::clone(&semaphore).try_acquire_owned() else {
                    break;
                };
                let Some(task) = queue.next() else {
                    break;
                };

                debug!("Dispatching {}", task.identity);
                progress.on_task_dispatched(&task.identity);

                let provider = Arc::clone(&self.provider);
                let generation = generation.clone();
                let retry = self.params.retry;
                let stop = stop.clone();
                join_set.spawn(async move {
                    let outcome =
                        run_task::<T>(provider.as_ref(), &task, &generation, &retry, &stop).await;
                    drop(permit);
                    (task, outcome)
                });
            }

            let Some(joined) = join_set.join_next().await else {
                break;
            };

            match joined {
                Ok((task, Some(outcome))) => {
                    if let Err(e) = self.record(state, &task, outcome, progress).await {
                        error!("Failed to record outcome for {}: {}", task.identity, e);
                        stop.cancel();
                        fatal.get_or_insert(e);
                    }
                }
                Ok((task, None)) => {
                    debug!("{} abandoned after cancellation", task.identity);
                }
                Err(e) => {
                    warn!("Task join error: {}", e);
                }
            }
        }

        if cancel.is_cancelled() && fatal.is_none() {
            info!("Run cancelled; no further tasks dispatched");
        }

        match fatal {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    /// Persist one outcome and mirror it into the in-memory state
    async fn record(
        &self,
        state: &mut CheckpointState<T>,
        task: &AgentTask,
        outcome: Outcome<T>,
        progress: &dyn RunProgress,
    ) -> Result<(), RunError> {
        if state.is_resolved(&task.identity) {
            return Err(ConsistencyError::DuplicateRecord(task.identity.clone()).into());
        }

        if let Some(reason) = outcome.failure_description() {
            warn!("{} failed: {}", task.display_name, reason);
            if self.params.failure_policy == FailurePolicy::LegacyDefault {
                warn!(
                    "Recording fallback payload for {} (legacy failure policy)",
                    task.display_name
                );
            }
        }
        let outcome = self.params.failure_policy.apply(outcome);

        let run_id = state.manifest().run_id.clone();
        self.persist(&run_id, &task.identity, &outcome).await?;

        let category = outcome.category();
        state.record(task.identity.clone(), outcome)?;
        progress.on_task_resolved(&task.identity, &task.display_name, category);
        Ok(())
    }

    /// Write an outcome to the store, retrying a transient failure once
    async fn persist(
        &self,
        run_id: &RunId,
        identity: &AgentId,
        outcome: &Outcome<T>,
    ) -> Result<(), RunError> {
        match self.store.record(run_id, identity, outcome).await {
            Ok(()) => Ok(()),
            Err(e) if e.is_transient() => {
                warn!("Checkpoint write for {} failed ({}); retrying once", identity, e);
                self.store
                    .record(run_id, identity, outcome)
                    .await
                    .map_err(RunError::from_store)
            }
            Err(e) => Err(RunError::from_store(e)),
        }
    }
}

/// Call the provider for one task until it resolves
///
/// Returns `None` when the run was stopped during a backoff; the task then
/// stays pending.
async fn run_task<T: StructuredResponse>(
    provider: &dyn ProviderClient,
    task: &AgentTask,
    generation: &GenerationConfig,
    retry: &RetryPolicy,
    stop: &CancellationToken,
) -> Option<Outcome<T>> {
    let mut attempt: u32 = 0;
    loop {
        attempt += 1;
        let call = provider.generate(&task.system_prompt, &task.user_prompt, generation);
        let result = match tokio::time::timeout(generation.timeout, call).await {
            Ok(result) => result,
            Err(_) => Err(ProviderError::Timeout),
        };

        match result {
            Ok(raw) => return Some(ResponseValidator::validate(&raw)),
            Err(e) if e.is_retryable() && attempt <= retry.max_retries => {
                let delay = retry.delay(attempt, e.retry_after());
                debug!(
                    "{} attempt {} failed ({}); retrying in {:?}",
                    task.identity, attempt, e, delay
                );
                tokio::select! {
                    _ = tokio::time::sleep(delay) => {}
                    _ = stop.cancelled() => return None,
                }
            }
            Err(e) => {
                return Some(Outcome::provider_failure(e.to_string(), e.is_retryable()));
            }
        }
    }
}
