//! Use cases
//!
//! Application-level operations that orchestrate domain logic.

pub mod analyze_impact;
pub mod orchestrator;
pub mod run_vote;

#[cfg(test)]
pub(crate) mod test_support;
