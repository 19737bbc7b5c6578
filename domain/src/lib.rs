//! Domain layer for assembly-quorum
//!
//! This crate contains the core business logic, entities, and value objects.
//! It has no dependencies on infrastructure or presentation concerns.
//!
//! # Core Concepts
//!
//! ## Roster
//!
//! An ordered set of agent personas, one per delegation. Roster order is the
//! order of every record the system produces.
//!
//! ## Outcome
//!
//! Every roster entry resolves to exactly one [`Outcome`] per run: a payload
//! that satisfied its output contract, a validation failure, or a provider
//! failure. Failures are recorded, never disguised as valid answers.
//!
//! ## Run
//!
//! A [`RunManifest`] fixes who is asked. A [`CheckpointState`] accumulates
//! outcomes. [`RunAggregator`] folds them into a [`RunRecord`].

pub mod config;
pub mod core;
pub mod prompt;
pub mod providers;
pub mod quorum;
pub mod roster;
pub mod run;

// Re-export commonly used types
pub use config::OutputFormat;
pub use core::{
    error::DomainError,
    generation::{GenerationConfig, StructuredOutputMode},
};
pub use prompt::PromptTemplate;
pub use providers::{
    AnthropicProviderConfig, OllamaProviderConfig, OpenAiProviderConfig, ProviderConfig,
    ProviderKind,
};
pub use roster::{AgentId, Roster, RosterEntry};

// Re-export quorum types
pub use quorum::{
    Confidence, FailurePolicy, ImpactAssessment, ImpactCategory, Outcome, PROVIDER_FAILURE,
    ResponseValidator, StructuredResponse, VALIDATION_FAILURE, ValidationReason, VoteChoice,
    VoteResponse,
};

// Re-export run types
pub use run::{
    CheckpointState, ConsistencyError, Counterpart, ImpactEntry, ImpactReport, RosterMember,
    RunAggregator, RunEntry, RunId, RunManifest, RunRecord, RunStatus, RunSummary, SourceRun,
};
