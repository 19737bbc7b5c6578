//! File-backed persistence: checkpoints and run records

mod checkpoint;
mod fs;
mod record_writer;

pub use checkpoint::JsonlCheckpointStore;
pub use record_writer::{RecordDocument, RecordStoreError, RunRecordWriter};
