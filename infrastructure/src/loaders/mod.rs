//! File system loaders for run inputs
//!
//! - [`RosterLoader`]: one `<slug>/system-prompt.md` per agent
//! - [`MotionLoader`]: one `<task_id>.md` per motion

mod motion;
mod roster;

pub use motion::MotionLoader;
pub use roster::{PERSONA_FILE, RosterLoader};

use assembly_domain::DomainError;
use std::path::PathBuf;
use thiserror::Error;

/// Errors from loading rosters and motions
#[derive(Error, Debug)]
pub enum LoaderError {
    #[error("Directory not found: {0}")]
    DirectoryNotFound(PathBuf),

    #[error("Motion not found: {0}")]
    MotionNotFound(PathBuf),

    #[error("Motion file is empty: {0}")]
    EmptyMotion(PathBuf),

    #[error("Invalid task id: {0:?}")]
    InvalidTaskId(String),

    #[error("No agents found in {0}")]
    NoAgents(PathBuf),

    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Domain(#[from] DomainError),
}

impl LoaderError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
