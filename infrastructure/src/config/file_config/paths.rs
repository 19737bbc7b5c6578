//! Path configuration from TOML (`[paths]` section)

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Input and output locations, relative to the working directory
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilePathsConfig {
    /// One `<slug>/system-prompt.md` per agent
    pub agents_dir: PathBuf,
    /// One `<task_id>.md` per motion
    pub motions_dir: PathBuf,
    /// Vote records and their `latest` pointers
    pub results_dir: PathBuf,
    /// Impact records and their `latest` pointers
    pub analysis_dir: PathBuf,
    /// Live checkpoints; finalized ones move to `archive/`
    pub checkpoint_dir: PathBuf,
}

impl Default for FilePathsConfig {
    fn default() -> Self {
        Self {
            agents_dir: PathBuf::from("agents"),
            motions_dir: PathBuf::from("tasks/motions"),
            results_dir: PathBuf::from("tasks/reactions"),
            analysis_dir: PathBuf::from("tasks/analysis"),
            checkpoint_dir: PathBuf::from("tasks/checkpoints"),
        }
    }
}
