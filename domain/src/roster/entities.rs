//! Roster entities

use crate::core::error::DomainError;
use crate::core::string::title_case_slug;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Stable, unique identity of a roster entry (a slug such as `united-states`)
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AgentId(String);

impl AgentId {
    /// Create an identity from an existing slug
    pub fn new(slug: impl Into<String>) -> Result<Self, DomainError> {
        let slug = slug.into();
        if slug.trim().is_empty() || slug.chars().any(char::is_whitespace) {
            return Err(DomainError::InvalidIdentity(slug));
        }
        Ok(Self(slug))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for AgentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One persona queried independently per run (Entity)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RosterEntry {
    pub id: AgentId,
    pub display_name: String,
    /// Opaque persona text used as the system prompt
    pub persona: String,
}

impl RosterEntry {
    pub fn new(id: AgentId, display_name: impl Into<String>, persona: impl Into<String>) -> Self {
        Self {
            id,
            display_name: display_name.into(),
            persona: persona.into(),
        }
    }

    /// Build an entry from a directory-style slug, deriving the display name
    pub fn from_slug(slug: &str, persona: impl Into<String>) -> Result<Self, DomainError> {
        let id = AgentId::new(slug)?;
        Ok(Self::new(id, title_case_slug(slug), persona))
    }
}

/// Ordered, identity-unique list of roster entries
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Roster {
    entries: Vec<RosterEntry>,
}

impl Roster {
    /// Create a roster, rejecting duplicate identities
    pub fn new(entries: Vec<RosterEntry>) -> Result<Self, DomainError> {
        let mut seen = HashSet::with_capacity(entries.len());
        for entry in &entries {
            if !seen.insert(entry.id.clone()) {
                return Err(DomainError::DuplicateIdentity(entry.id.to_string()));
            }
        }
        Ok(Self { entries })
    }

    /// Keep only the first `n` entries in roster order
    ///
    /// Deterministic: the same roster and `n` always select the same prefix.
    pub fn sample(mut self, n: usize) -> Self {
        self.entries.truncate(n);
        self
    }

    /// Drop a single identity, if present
    pub fn without(mut self, id: &AgentId) -> Self {
        self.entries.retain(|e| &e.id != id);
        self
    }

    pub fn entries(&self) -> &[RosterEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &RosterEntry> {
        self.entries.iter()
    }
}

impl IntoIterator for Roster {
    type Item = RosterEntry;
    type IntoIter = std::vec::IntoIter<RosterEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}
