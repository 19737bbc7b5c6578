//! Domain error types

use thiserror::Error;

/// Domain-level errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("Roster is empty")]
    EmptyRoster,

    #[error("Duplicate roster identity: {0}")]
    DuplicateIdentity(String),

    #[error("Invalid agent identity: {0:?}")]
    InvalidIdentity(String),

    #[error("Task content cannot be empty")]
    EmptyTaskContent,

    #[error("Invalid model: {0}")]
    InvalidModel(String),

    #[error("Unknown provider: {0}")]
    UnknownProvider(String),

    #[error("Invalid failure policy: {0}")]
    InvalidFailurePolicy(String),
}
