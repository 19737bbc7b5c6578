//! Motion file loader

use super::LoaderError;
use std::fs;
use std::path::{Path, PathBuf};

/// Reads motion text from `<motions_dir>/<task_id>.md`
#[derive(Debug, Clone)]
pub struct MotionLoader {
    dir: PathBuf,
}

impl MotionLoader {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of a motion file; the task id must be a plain file stem
    pub fn path(&self, task_id: &str) -> Result<PathBuf, LoaderError> {
        if task_id.trim().is_empty() || task_id.starts_with('.') || task_id.contains(['/', '\\'])
        {
            return Err(LoaderError::InvalidTaskId(task_id.to_string()));
        }
        Ok(self.dir.join(format!("{task_id}.md")))
    }

    /// Load a motion as opaque text
    pub fn load(&self, task_id: &str) -> Result<String, LoaderError> {
        let path = self.path(task_id)?;
        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(LoaderError::MotionNotFound(path));
            }
            Err(e) => return Err(LoaderError::io(path, e)),
        };
        if content.trim().is_empty() {
            return Err(LoaderError::EmptyMotion(path));
        }
        Ok(content)
    }
}
