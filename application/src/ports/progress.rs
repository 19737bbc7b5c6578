//! Progress notification port
//!
//! Defines the interface for reporting progress during a run.

use assembly_domain::{AgentId, RunManifest, RunStatus};

/// Callback for progress updates during a run
///
/// Implementations live in the presentation layer and can display
/// progress in various ways (progress bar, plain log, etc.)
pub trait RunProgress: Send + Sync {
    /// Called once the manifest is fixed, with the number of outcomes
    /// already present from a previous partial run
    fn on_run_start(&self, manifest: &RunManifest, already_resolved: usize);

    /// Called when a task is handed to the provider
    fn on_task_dispatched(&self, _identity: &AgentId) {}

    /// Called when a task's outcome has been recorded
    fn on_task_resolved(&self, identity: &AgentId, display_name: &str, category: &str);

    /// Called when the run stops, complete or not
    fn on_run_complete(&self, status: RunStatus);
}

/// No-op progress notifier for when progress reporting is not needed
pub struct NoProgress;

impl RunProgress for NoProgress {
    fn on_run_start(&self, _manifest: &RunManifest, _already_resolved: usize) {}
    fn on_task_resolved(&self, _identity: &AgentId, _display_name: &str, _category: &str) {}
    fn on_run_complete(&self, _status: RunStatus) {}
}
