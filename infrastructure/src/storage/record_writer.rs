//! Run record files
//!
//! Each finished run is written as `<key>_<YYYYmmdd_HHMMSS>.json`, and a
//! small `<key>_latest.json` pointer names the newest one.

use super::fs::atomic_write;
use assembly_domain::{ImpactReport, RunId, RunRecord, StructuredResponse};
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::info;

/// Errors from reading or writing record files
#[derive(Error, Debug)]
pub enum RecordStoreError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to serialize record: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("Corrupt record file {path}: {message}")]
    Corrupt { path: PathBuf, message: String },
}

/// A run's output document, filed by run start time
pub trait RecordDocument: Serialize {
    fn run_id(&self) -> &RunId;
    fn task_id(&self) -> &str;
    fn timestamp(&self) -> DateTime<Utc>;
}

impl<T: StructuredResponse> RecordDocument for RunRecord<T> {
    fn run_id(&self) -> &RunId {
        RunRecord::run_id(self)
    }

    fn task_id(&self) -> &str {
        RunRecord::task_id(self)
    }

    fn timestamp(&self) -> DateTime<Utc> {
        RunRecord::timestamp(self)
    }
}

impl RecordDocument for ImpactReport {
    fn run_id(&self) -> &RunId {
        self.record().run_id()
    }

    fn task_id(&self) -> &str {
        self.record().task_id()
    }

    fn timestamp(&self) -> DateTime<Utc> {
        self.record().timestamp()
    }
}

/// Contents of the `<key>_latest.json` pointer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct LatestPointer {
    run_id: String,
    task_id: String,
    /// File name of the record, relative to the record directory
    record: String,
}

/// Writes run records into one directory
#[derive(Debug, Clone)]
pub struct RunRecordWriter {
    dir: PathBuf,
}

impl RunRecordWriter {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn latest_path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}_latest.json"))
    }

    /// Write a record and point `<key>_latest.json` at it.
    ///
    /// Existing record files are never overwritten; a second write within
    /// the same second gets a numeric suffix.
    pub fn write<D: RecordDocument>(
        &self,
        key: &str,
        record: &D,
    ) -> Result<PathBuf, RecordStoreError> {
        let stamp = record.timestamp().format("%Y%m%d_%H%M%S");
        let mut name = format!("{key}_{stamp}.json");
        let mut counter = 1;
        while self.dir.join(&name).exists() {
            name = format!("{key}_{stamp}_{counter}.json");
            counter += 1;
        }
        let path = self.dir.join(&name);

        let mut bytes = serde_json::to_vec_pretty(record)?;
        bytes.push(b'\n');
        atomic_write(&path, &bytes).map_err(|source| RecordStoreError::Io {
            path: path.clone(),
            source,
        })?;

        let pointer = LatestPointer {
            run_id: record.run_id().to_string(),
            task_id: record.task_id().to_string(),
            record: name,
        };
        let latest = self.latest_path(key);
        atomic_write(&latest, &serde_json::to_vec_pretty(&pointer)?).map_err(|source| {
            RecordStoreError::Io {
                path: latest.clone(),
                source,
            }
        })?;

        info!("Wrote run record {}", path.display());
        Ok(path)
    }

    /// Load the record the `<key>_latest.json` pointer names, if any
    pub fn load_latest<D: DeserializeOwned>(
        &self,
        key: &str,
    ) -> Result<Option<D>, RecordStoreError> {
        let latest = self.latest_path(key);
        let pointer: LatestPointer = match std::fs::read_to_string(&latest) {
            Ok(raw) => serde_json::from_str(&raw).map_err(|e| RecordStoreError::Corrupt {
                path: latest.clone(),
                message: e.to_string(),
            })?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(source) => {
                return Err(RecordStoreError::Io {
                    path: latest,
                    source,
                });
            }
        };

        let path = self.dir.join(&pointer.record);
        let raw = std::fs::read_to_string(&path).map_err(|source| RecordStoreError::Io {
            path: path.clone(),
            source,
        })?;
        let record = serde_json::from_str(&raw).map_err(|e| RecordStoreError::Corrupt {
            path,
            message: e.to_string(),
        })?;
        Ok(Some(record))
    }
}
