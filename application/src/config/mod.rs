//! Application-level configuration.
//!
//! This module provides configuration types that control how use cases behave:
//!
//! - [`RunParams`]: orchestrator control (concurrency, retries, failure policy, sampling)
//! - [`AnalysisParams`]: second-pass settings (counterpart, generation overrides)

pub mod analysis_params;
pub mod run_params;

pub use analysis_params::AnalysisParams;
pub use run_params::{RetryPolicy, RunParams};
