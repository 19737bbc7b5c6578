//! Core domain concepts shared across all subdomains.
//!
//! - [`generation::GenerationConfig`]: per-run model call settings
//! - [`error::DomainError`]: domain-level errors
//! - [`string`]: small text helpers

pub mod error;
pub mod generation;
pub mod string;
