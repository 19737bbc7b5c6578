//! Infrastructure layer for assembly-quorum
//!
//! This crate contains adapters that implement the ports defined
//! in the application layer: HTTP provider clients, the file-backed
//! checkpoint store, run-record files, roster/motion loaders and
//! configuration file loading.

pub mod config;
pub mod loaders;
pub mod providers;
pub mod storage;

// Re-export commonly used types
pub use config::{
    ConfigLoader, ConfigValidationError, FileAnalysisConfig, FileConfig, FileGenerationConfig,
    FileOutputConfig, FileOutputFormat, FilePathsConfig, FileProvidersConfig, FileRunConfig,
};
pub use loaders::{LoaderError, MotionLoader, RosterLoader};
pub use providers::{
    AnthropicClient, OllamaClient, OpenAiClient, ProviderSetupError, build_provider,
};
pub use storage::{JsonlCheckpointStore, RecordDocument, RecordStoreError, RunRecordWriter};
