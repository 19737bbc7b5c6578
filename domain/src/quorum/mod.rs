//! Quorum response domain
//!
//! This module contains everything about what a single agent answers and
//! how that answer is judged.
//!
//! # Core Concepts
//!
//! ## Output contract
//! A [`StructuredResponse`] describes a payload the model must return as a
//! JSON object. [`ResponseValidator`] enforces it and classifies violations
//! as [`ValidationReason`]s.
//!
//! ## Outcome
//! Each agent resolves to exactly one [`Outcome`]: a validated payload, a
//! validation failure or a provider failure.
//!
//! # Payloads
//!
//! ```text
//! ┌──────────────────────────────┬───────────────────────────────────────┐
//! │ VoteResponse                 │ ImpactAssessment                      │
//! ├──────────────────────────────┼───────────────────────────────────────┤
//! │ vote: yes | no | abstain     │ impact_category: 7-step scale         │
//! │ statement: non-empty text    │ reasoning, confidence, key_factors    │
//! └──────────────────────────────┴───────────────────────────────────────┘
//! ```

pub mod impact;
pub mod outcome;
pub mod parsing;
pub mod response;
pub mod vote;

// Re-export main types
pub use impact::{Confidence, ImpactAssessment, ImpactCategory};
pub use outcome::{FailurePolicy, Outcome, PROVIDER_FAILURE, VALIDATION_FAILURE};
pub use parsing::ResponseValidator;
pub use response::{StructuredResponse, ValidationReason};
pub use vote::{VoteChoice, VoteResponse};
