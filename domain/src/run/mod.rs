//! Run domain
//!
//! A run is one execution of the orchestrator across some or all roster
//! entries for one task content.
//!
//! ```text
//! RunManifest ──► CheckpointState<T> ──(RunAggregator)──► RunRecord<T>
//!  (immutable)     (append-only)                          (derived, roster order)
//! ```

pub mod aggregator;
pub mod checkpoint;
pub mod impact_report;
pub mod manifest;
pub mod record;

pub use aggregator::RunAggregator;
pub use checkpoint::{CheckpointState, ConsistencyError};
pub use impact_report::{Counterpart, ImpactEntry, ImpactReport, SourceRun};
pub use manifest::{RosterMember, RunId, RunManifest};
pub use record::{RunEntry, RunRecord, RunStatus, RunSummary};
