//! Checkpoint store port
//!
//! Persists the partial state of a run so it can resume after interruption
//! without re-querying identities that already have an outcome.

use assembly_domain::{
    AgentId, CheckpointState, ConsistencyError, Outcome, RunAggregator, RunId, RunManifest,
    RunRecord, StructuredResponse,
};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;
use thiserror::Error;

/// Errors raised by checkpoint stores
#[derive(Error, Debug)]
pub enum CheckpointError {
    #[error(transparent)]
    Consistency(#[from] ConsistencyError),

    #[error("Checkpoint for run {0} already exists")]
    AlreadyExists(RunId),

    #[error("No checkpoint for run {0}")]
    NotFound(RunId),

    #[error("Checkpoint for run {run_id} is corrupt: {message}")]
    Corrupt { run_id: RunId, message: String },

    #[error("Checkpoint storage unavailable: {0}")]
    StorageUnavailable(String),
}

impl CheckpointError {
    /// Whether retrying the same write could succeed
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::StorageUnavailable(_))
    }
}

/// Persistence of run progress
///
/// A store holds at most one live checkpoint per run identity. Records are
/// append-only: recording an identity twice is a [`ConsistencyError`].
#[async_trait]
pub trait CheckpointStore<T: StructuredResponse>: Send + Sync {
    /// Start a checkpoint for a new run
    async fn create(&self, manifest: &RunManifest) -> Result<CheckpointState<T>, CheckpointError>;

    /// Load the live checkpoint of a run, if any
    async fn load(&self, run_id: &RunId) -> Result<Option<CheckpointState<T>>, CheckpointError>;

    /// Durably append one outcome
    async fn record(
        &self,
        run_id: &RunId,
        identity: &AgentId,
        outcome: &Outcome<T>,
    ) -> Result<(), CheckpointError>;

    /// Aggregate the checkpoint and archive it
    async fn finalize(&self, run_id: &RunId) -> Result<RunRecord<T>, CheckpointError>;
}

/// Process-local checkpoint store for tests and dry runs
pub struct InMemoryCheckpointStore<T> {
    live: Mutex<HashMap<RunId, CheckpointState<T>>>,
    archived: Mutex<Vec<CheckpointState<T>>>,
}

impl<T> Default for InMemoryCheckpointStore<T> {
    fn default() -> Self {
        Self {
            live: Mutex::new(HashMap::new()),
            archived: Mutex::new(Vec::new()),
        }
    }
}

impl<T: StructuredResponse> InMemoryCheckpointStore<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of finalized checkpoints
    pub fn archived_count(&self) -> usize {
        self.archived.lock().map(|a| a.len()).unwrap_or(0)
    }

    fn poisoned() -> CheckpointError {
        CheckpointError::StorageUnavailable("checkpoint lock poisoned".to_string())
    }
}

#[async_trait]
impl<T: StructuredResponse> CheckpointStore<T> for InMemoryCheckpointStore<T> {
    async fn create(&self, manifest: &RunManifest) -> Result<CheckpointState<T>, CheckpointError> {
        let mut live = self.live.lock().map_err(|_| Self::poisoned())?;
        if live.contains_key(&manifest.run_id) {
            return Err(CheckpointError::AlreadyExists(manifest.run_id.clone()));
        }
        let state = CheckpointState::new(manifest.clone());
        live.insert(manifest.run_id.clone(), state.clone());
        Ok(state)
    }

    async fn load(&self, run_id: &RunId) -> Result<Option<CheckpointState<T>>, CheckpointError> {
        let live = self.live.lock().map_err(|_| Self::poisoned())?;
        Ok(live.get(run_id).cloned())
    }

    async fn record(
        &self,
        run_id: &RunId,
        identity: &AgentId,
        outcome: &Outcome<T>,
    ) -> Result<(), CheckpointError> {
        let mut live = self.live.lock().map_err(|_| Self::poisoned())?;
        let state = live
            .get_mut(run_id)
            .ok_or_else(|| CheckpointError::NotFound(run_id.clone()))?;
        state.record(identity.clone(), outcome.clone())?;
        Ok(())
    }

    async fn finalize(&self, run_id: &RunId) -> Result<RunRecord<T>, CheckpointError> {
        let state = self
            .live
            .lock()
            .map_err(|_| Self::poisoned())?
            .remove(run_id)
            .ok_or_else(|| CheckpointError::NotFound(run_id.clone()))?;
        let record = RunAggregator::aggregate(&state);
        self.archived
            .lock()
            .map_err(|_| Self::poisoned())?
            .push(state);
        Ok(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assembly_domain::{Roster, RosterEntry, VoteChoice, VoteResponse};
    use chrono::Utc;

    fn manifest() -> RunManifest {
        let roster = Roster::new(vec![
            RosterEntry::from_slug("chad", "").unwrap(),
            RosterEntry::from_slug("peru", "").unwrap(),
        ])
        .unwrap();
        RunManifest::new(
            RunId::new("motion-1").unwrap(),
            "motion-1",
            "ollama",
            "llama3.2",
            &roster,
            Utc::now(),
        )
    }

    fn yes() -> Outcome<VoteResponse> {
        Outcome::Success(VoteResponse::new(VoteChoice::Yes, "Agreed."))
    }

    #[tokio::test]
    async fn test_create_twice_fails() {
        let store = InMemoryCheckpointStore::<VoteResponse>::new();
        store.create(&manifest()).await.unwrap();
        let err = store.create(&manifest()).await.unwrap_err();
        assert!(matches!(err, CheckpointError::AlreadyExists(_)));
    }

    #[tokio::test]
    async fn test_duplicate_record_rejected() {
        let store = InMemoryCheckpointStore::<VoteResponse>::new();
        let manifest = manifest();
        store.create(&manifest).await.unwrap();
        let chad = AgentId::new("chad").unwrap();
        store.record(&manifest.run_id, &chad, &yes()).await.unwrap();
        let err = store
            .record(&manifest.run_id, &chad, &yes())
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            CheckpointError::Consistency(ConsistencyError::DuplicateRecord(_))
        ));
    }

    #[tokio::test]
    async fn test_finalize_archives() {
        let store = InMemoryCheckpointStore::<VoteResponse>::new();
        let manifest = manifest();
        store.create(&manifest).await.unwrap();
        for slug in ["chad", "peru"] {
            store
                .record(&manifest.run_id, &AgentId::new(slug).unwrap(), &yes())
                .await
                .unwrap();
        }
        let record = store.finalize(&manifest.run_id).await.unwrap();
        assert_eq!(record.summary().get("yes"), 2);
        assert!(store.load(&manifest.run_id).await.unwrap().is_none());
        assert_eq!(store.archived_count(), 1);
    }
}
