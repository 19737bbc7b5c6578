//! Checkpoint state: partial progress of a run

use super::manifest::RunManifest;
use crate::quorum::{Outcome, StructuredResponse};
use crate::roster::{AgentId, Roster, RosterEntry};
use std::collections::BTreeMap;
use thiserror::Error;

/// Violations of the one-outcome-per-identity invariant
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConsistencyError {
    #[error("identity {0} already has a recorded outcome")]
    DuplicateRecord(AgentId),

    #[error("identity {0} is not part of the run's roster")]
    UnknownIdentity(AgentId),
}

/// Resolved outcomes of a run so far
///
/// Append-only: an identity, once recorded, is never overwritten.
#[derive(Debug, Clone, PartialEq)]
pub struct CheckpointState<T> {
    manifest: RunManifest,
    outcomes: BTreeMap<AgentId, Outcome<T>>,
}

impl<T: StructuredResponse> CheckpointState<T> {
    pub fn new(manifest: RunManifest) -> Self {
        Self {
            manifest,
            outcomes: BTreeMap::new(),
        }
    }

    /// Record an outcome for an identity of this run
    pub fn record(&mut self, id: AgentId, outcome: Outcome<T>) -> Result<(), ConsistencyError> {
        if !self.manifest.contains(&id) {
            return Err(ConsistencyError::UnknownIdentity(id));
        }
        if self.outcomes.contains_key(&id) {
            return Err(ConsistencyError::DuplicateRecord(id));
        }
        self.outcomes.insert(id, outcome);
        Ok(())
    }

    pub fn manifest(&self) -> &RunManifest {
        &self.manifest
    }

    pub fn outcome(&self, id: &AgentId) -> Option<&Outcome<T>> {
        self.outcomes.get(id)
    }

    pub fn is_resolved(&self, id: &AgentId) -> bool {
        self.outcomes.contains_key(id)
    }

    pub fn resolved_count(&self) -> usize {
        self.outcomes.len()
    }

    pub fn is_complete(&self) -> bool {
        self.manifest
            .roster
            .iter()
            .all(|m| self.outcomes.contains_key(&m.identity))
    }

    /// Roster entries that still need an outcome, in roster order
    pub fn pending<'a>(&'a self, roster: &'a Roster) -> impl Iterator<Item = &'a RosterEntry> {
        roster.iter().filter(|e| !self.is_resolved(&e.id))
    }
}
