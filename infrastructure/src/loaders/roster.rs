//! Roster directory loader

use super::LoaderError;
use assembly_domain::{Roster, RosterEntry};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// File holding an agent's persona inside its directory
pub const PERSONA_FILE: &str = "system-prompt.md";

/// Loads a [`Roster`] from `<agents_dir>/<slug>/system-prompt.md`.
///
/// Entries come back sorted by slug. Directories without a persona file,
/// or with an empty one, are skipped with a warning.
#[derive(Debug, Clone)]
pub struct RosterLoader {
    dir: PathBuf,
}

impl RosterLoader {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn load(&self) -> Result<Roster, LoaderError> {
        if !self.dir.is_dir() {
            return Err(LoaderError::DirectoryNotFound(self.dir.clone()));
        }

        let mut slugs = Vec::new();
        for entry in fs::read_dir(&self.dir).map_err(|e| LoaderError::io(&self.dir, e))? {
            let entry = entry.map_err(|e| LoaderError::io(&self.dir, e))?;
            let path = entry.path();
            if !path.is_dir() {
                continue;
            }
            if let Some(slug) = path.file_name().and_then(|n| n.to_str()) {
                if slug.starts_with('.') {
                    continue;
                }
                slugs.push(slug.to_string());
            }
        }
        slugs.sort();

        let mut entries = Vec::with_capacity(slugs.len());
        for slug in slugs {
            let path = self.dir.join(&slug).join(PERSONA_FILE);
            let persona = match fs::read_to_string(&path) {
                Ok(content) => content,
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                    warn!("Skipping {}: no {}", slug, PERSONA_FILE);
                    continue;
                }
                Err(e) => return Err(LoaderError::io(path, e)),
            };
            if persona.trim().is_empty() {
                warn!("Skipping {}: empty persona", slug);
                continue;
            }
            debug!("Loaded persona {} ({} bytes)", slug, persona.len());
            entries.push(RosterEntry::from_slug(&slug, persona)?);
        }

        if entries.is_empty() {
            return Err(LoaderError::NoAgents(self.dir.clone()));
        }
        Ok(Roster::new(entries)?)
    }
}
