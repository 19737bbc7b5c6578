//! JSONL checkpoint store
//!
//! Per run, two files in the checkpoint directory:
//!
//! - `<run>.manifest.json`: the frozen [`RunManifest`], written atomically
//! - `<run>.checkpoint.jsonl`: one `{identity, outcome}` object per line,
//!   appended and flushed per outcome
//!
//! Finalizing moves both into `archive/`, tagged with the run's start time.

use super::fs::atomic_write;
use assembly_application::{CheckpointError, CheckpointStore};
use assembly_domain::{
    AgentId, CheckpointState, ConsistencyError, Outcome, RunAggregator, RunId, RunManifest,
    RunRecord, StructuredResponse,
};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::marker::PhantomData;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::{debug, info, warn};

/// One journal line
#[derive(Serialize, Deserialize)]
#[serde(bound(deserialize = "T: StructuredResponse"))]
struct JournalLine<T> {
    identity: AgentId,
    outcome: Outcome<T>,
}

/// Checkpoint store backed by a manifest file and an append-only journal
pub struct JsonlCheckpointStore<T> {
    dir: PathBuf,
    /// Identities already journaled, per run touched by this process
    recorded: Mutex<HashMap<RunId, HashSet<AgentId>>>,
    _payload: PhantomData<fn() -> T>,
}

impl<T: StructuredResponse> JsonlCheckpointStore<T> {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            recorded: Mutex::new(HashMap::new()),
            _payload: PhantomData,
        }
    }

    /// Get the checkpoint directory.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn manifest_path(&self, run_id: &RunId) -> PathBuf {
        self.dir.join(format!("{run_id}.manifest.json"))
    }

    pub fn journal_path(&self, run_id: &RunId) -> PathBuf {
        self.dir.join(format!("{run_id}.checkpoint.jsonl"))
    }

    pub fn archive_dir(&self) -> PathBuf {
        self.dir.join("archive")
    }

    fn unavailable(path: &Path, error: impl std::fmt::Display) -> CheckpointError {
        CheckpointError::StorageUnavailable(format!("{}: {}", path.display(), error))
    }

    fn corrupt(run_id: &RunId, message: impl Into<String>) -> CheckpointError {
        CheckpointError::Corrupt {
            run_id: run_id.clone(),
            message: message.into(),
        }
    }

    fn lock_recorded(
        &self,
    ) -> Result<std::sync::MutexGuard<'_, HashMap<RunId, HashSet<AgentId>>>, CheckpointError> {
        self.recorded.lock().map_err(|_| {
            CheckpointError::StorageUnavailable("checkpoint lock poisoned".to_string())
        })
    }

    /// Read a checkpoint from disk, dropping a torn final line if present
    fn read_state(&self, run_id: &RunId) -> Result<Option<CheckpointState<T>>, CheckpointError> {
        let manifest_path = self.manifest_path(run_id);
        if !manifest_path.exists() {
            return Ok(None);
        }

        let raw = fs::read_to_string(&manifest_path)
            .map_err(|e| Self::unavailable(&manifest_path, e))?;
        let manifest: RunManifest = serde_json::from_str(&raw)
            .map_err(|e| Self::corrupt(run_id, format!("manifest: {e}")))?;
        if &manifest.run_id != run_id {
            return Err(Self::corrupt(
                run_id,
                format!("manifest names run {}", manifest.run_id),
            ));
        }

        let mut state = CheckpointState::new(manifest);
        let journal_path = self.journal_path(run_id);
        let journal = match fs::read_to_string(&journal_path) {
            Ok(journal) => journal,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => String::new(),
            Err(e) => return Err(Self::unavailable(&journal_path, e)),
        };

        let mut valid_len = 0;
        let mut torn = false;
        for (index, segment) in journal.split_inclusive('\n').enumerate() {
            let complete = segment.ends_with('\n');
            let line = segment.trim();
            if line.is_empty() {
                valid_len += segment.len();
                continue;
            }
            // A final line without newline was cut off by a crash mid-append
            if !complete {
                torn = true;
                break;
            }
            let entry: JournalLine<T> = serde_json::from_str(line).map_err(|e| {
                Self::corrupt(run_id, format!("journal line {}: {e}", index + 1))
            })?;
            state.record(entry.identity, entry.outcome)?;
            valid_len += segment.len();
        }

        if torn {
            warn!(
                "Dropping torn final line of checkpoint {}",
                journal_path.display()
            );
            let file = OpenOptions::new()
                .write(true)
                .open(&journal_path)
                .map_err(|e| Self::unavailable(&journal_path, e))?;
            file.set_len(valid_len as u64)
                .map_err(|e| Self::unavailable(&journal_path, e))?;
        }

        Ok(Some(state))
    }

    fn remember(&self, state: &CheckpointState<T>) -> Result<(), CheckpointError> {
        let identities = state
            .manifest()
            .roster
            .iter()
            .filter(|m| state.is_resolved(&m.identity))
            .map(|m| m.identity.clone())
            .collect();
        self.lock_recorded()?
            .insert(state.manifest().run_id.clone(), identities);
        Ok(())
    }
}

#[async_trait]
impl<T: StructuredResponse> CheckpointStore<T> for JsonlCheckpointStore<T> {
    async fn create(&self, manifest: &RunManifest) -> Result<CheckpointState<T>, CheckpointError> {
        let run_id = &manifest.run_id;
        let manifest_path = self.manifest_path(run_id);
        if manifest_path.exists() {
            return Err(CheckpointError::AlreadyExists(run_id.clone()));
        }

        let bytes = serde_json::to_vec_pretty(manifest)
            .map_err(|e| Self::unavailable(&manifest_path, e))?;
        atomic_write(&manifest_path, &bytes).map_err(|e| Self::unavailable(&manifest_path, e))?;
        let journal_path = self.journal_path(run_id);
        File::create(&journal_path).map_err(|e| Self::unavailable(&journal_path, e))?;

        info!("Created checkpoint {}", manifest_path.display());
        let state = CheckpointState::new(manifest.clone());
        self.remember(&state)?;
        Ok(state)
    }

    async fn load(&self, run_id: &RunId) -> Result<Option<CheckpointState<T>>, CheckpointError> {
        let state = self.read_state(run_id)?;
        if let Some(state) = &state {
            self.remember(state)?;
        }
        Ok(state)
    }

    async fn record(
        &self,
        run_id: &RunId,
        identity: &AgentId,
        outcome: &Outcome<T>,
    ) -> Result<(), CheckpointError> {
        let known = self.lock_recorded()?.contains_key(run_id);
        if !known {
            let state = self
                .read_state(run_id)?
                .ok_or_else(|| CheckpointError::NotFound(run_id.clone()))?;
            self.remember(&state)?;
        }

        let mut recorded = self.lock_recorded()?;
        let identities = recorded
            .get_mut(run_id)
            .ok_or_else(|| CheckpointError::NotFound(run_id.clone()))?;
        if identities.contains(identity) {
            return Err(ConsistencyError::DuplicateRecord(identity.clone()).into());
        }

        let journal_path = self.journal_path(run_id);
        let mut line = serde_json::to_string(&JournalLine {
            identity: identity.clone(),
            outcome: outcome.clone(),
        })
        .map_err(|e| Self::unavailable(&journal_path, e))?;
        line.push('\n');

        // The lock is held across the append so lines never interleave.
        // A lost journal is recreated; the manifest alone is a valid start.
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&journal_path)
            .map_err(|e| Self::unavailable(&journal_path, e))?;
        let len = file
            .metadata()
            .map_err(|e| Self::unavailable(&journal_path, e))?
            .len();
        let written = file
            .write_all(line.as_bytes())
            .and_then(|()| file.flush())
            .and_then(|()| file.sync_data());
        if let Err(e) = written {
            // Roll back a partial line so a retry starts on a clean boundary
            if let Err(rollback) = file.set_len(len) {
                warn!(
                    "Could not roll back {}: {}",
                    journal_path.display(),
                    rollback
                );
            }
            return Err(Self::unavailable(&journal_path, e));
        }

        identities.insert(identity.clone());
        debug!("Checkpointed {} for run {}", identity, run_id);
        Ok(())
    }

    async fn finalize(&self, run_id: &RunId) -> Result<RunRecord<T>, CheckpointError> {
        let state = self
            .read_state(run_id)?
            .ok_or_else(|| CheckpointError::NotFound(run_id.clone()))?;
        let record = RunAggregator::aggregate(&state);

        let archive = self.archive_dir();
        fs::create_dir_all(&archive).map_err(|e| Self::unavailable(&archive, e))?;
        let stamp = state.manifest().timestamp.format("%Y%m%d_%H%M%S");
        for (from, suffix) in [
            (self.manifest_path(run_id), "manifest.json"),
            (self.journal_path(run_id), "checkpoint.jsonl"),
        ] {
            let to = archive.join(format!("{run_id}.{stamp}.{suffix}"));
            fs::rename(&from, &to).map_err(|e| Self::unavailable(&from, e))?;
        }

        self.lock_recorded()?.remove(run_id);
        info!("Archived checkpoint for run {}", run_id);
        Ok(record)
    }
}
