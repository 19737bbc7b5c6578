//! Application layer for assembly-quorum
//!
//! This crate contains use cases, port definitions, and application configuration.
//! It depends only on the domain layer.

pub mod config;
pub mod ports;
pub mod use_cases;

// Re-export commonly used types
pub use config::{AnalysisParams, RetryPolicy, RunParams};
pub use ports::{
    checkpoint_store::{CheckpointError, CheckpointStore, InMemoryCheckpointStore},
    progress::{NoProgress, RunProgress},
    provider_client::{ProviderClient, ProviderError},
};
pub use use_cases::analyze_impact::{
    AnalyzeImpactInput, AnalyzeImpactUseCase, IMPACT_SUFFIX, impact_run_key,
};
pub use use_cases::orchestrator::{AgentTask, Orchestrator, RunError, RunRequest, TaskPrompts};
pub use use_cases::run_vote::{RunVoteInput, RunVoteUseCase};
