//! Run identity and manifest

use crate::core::error::DomainError;
use crate::roster::{AgentId, Roster};
use chrono::{DateTime, SubsecRound, Utc};
use serde::{Deserialize, Serialize};

/// Identity of a run; also the key of its checkpoint
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RunId(String);

impl RunId {
    /// Create a run identity; it must be usable as a file name stem
    pub fn new(id: impl Into<String>) -> Result<Self, DomainError> {
        let id = id.into();
        let valid = !id.trim().is_empty()
            && !id.starts_with('.')
            && !id.contains(['/', '\\'])
            && !id.chars().any(char::is_whitespace);
        if !valid {
            return Err(DomainError::InvalidIdentity(id));
        }
        Ok(Self(id))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for RunId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identity and display name of one roster entry, as frozen into a run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RosterMember {
    pub identity: AgentId,
    pub display_name: String,
}

/// Immutable header of a run
///
/// Persona text is deliberately absent: the manifest records who was
/// queried, not what they were told.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunManifest {
    pub run_id: RunId,
    pub task_id: String,
    /// Start of the run, truncated to whole seconds
    pub timestamp: DateTime<Utc>,
    pub provider: String,
    pub model: String,
    /// Roster members in canonical order
    pub roster: Vec<RosterMember>,
}

impl RunManifest {
    pub fn new(
        run_id: RunId,
        task_id: impl Into<String>,
        provider: impl Into<String>,
        model: impl Into<String>,
        roster: &Roster,
        started_at: DateTime<Utc>,
    ) -> Self {
        Self {
            run_id,
            task_id: task_id.into(),
            timestamp: started_at.trunc_subsecs(0),
            provider: provider.into(),
            model: model.into(),
            roster: roster
                .iter()
                .map(|e| RosterMember {
                    identity: e.id.clone(),
                    display_name: e.display_name.clone(),
                })
                .collect(),
        }
    }

    /// Number of roster entries the run covers
    pub fn total(&self) -> usize {
        self.roster.len()
    }

    pub fn contains(&self, id: &AgentId) -> bool {
        self.roster.iter().any(|m| &m.identity == id)
    }

    /// Whether `roster` lists exactly the frozen identities, in the same order
    pub fn matches_roster(&self, roster: &Roster) -> bool {
        self.roster.len() == roster.len()
            && self
                .roster
                .iter()
                .zip(roster.iter())
                .all(|(m, e)| m.identity == e.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::roster::RosterEntry;
    use chrono::TimeZone;

    fn roster(slugs: &[&str]) -> Roster {
        Roster::new(
            slugs
                .iter()
                .map(|s| RosterEntry::from_slug(s, "").unwrap())
                .collect(),
        )
        .unwrap()
    }

    #[test]
    fn test_run_id_validation() {
        assert!(RunId::new("01_gaza_ceasefire_resolution").is_ok());
        assert!(RunId::new("motion.impact").is_ok());
        assert!(RunId::new("").is_err());
        assert!(RunId::new("../escape").is_err());
        assert!(RunId::new(".hidden").is_err());
        assert!(RunId::new("a b").is_err());
    }

    #[test]
    fn test_manifest_truncates_timestamp() {
        let started = Utc.with_ymd_and_hms(2025, 1, 2, 3, 4, 5).unwrap()
            + chrono::Duration::milliseconds(750);
        let manifest = RunManifest::new(
            RunId::new("m").unwrap(),
            "m",
            "openai",
            "gpt-4",
            &roster(&["chad"]),
            started,
        );
        assert_eq!(
            manifest.timestamp,
            Utc.with_ymd_and_hms(2025, 1, 2, 3, 4, 5).unwrap()
        );
    }

    #[test]
    fn test_matches_roster_is_order_sensitive() {
        let manifest = RunManifest::new(
            RunId::new("m").unwrap(),
            "m",
            "openai",
            "gpt-4",
            &roster(&["albania", "brazil"]),
            Utc::now(),
        );
        assert!(manifest.matches_roster(&roster(&["albania", "brazil"])));
        assert!(!manifest.matches_roster(&roster(&["brazil", "albania"])));
        assert!(!manifest.matches_roster(&roster(&["albania"])));
        assert_eq!(manifest.total(), 2);
    }
}
