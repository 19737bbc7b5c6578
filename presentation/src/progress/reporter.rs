//! Progress reporting for run execution

use assembly_application::RunProgress;
use assembly_domain::{AgentId, PROVIDER_FAILURE, RunManifest, RunStatus, VALIDATION_FAILURE};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use std::sync::Mutex;

fn is_failure(category: &str) -> bool {
    category == VALIDATION_FAILURE || category == PROVIDER_FAILURE
}

fn status_label(status: RunStatus) -> colored::ColoredString {
    match status {
        RunStatus::Complete => "complete".green(),
        RunStatus::CompletedWithFailures => "completed with failures".yellow(),
        RunStatus::Incomplete => "incomplete".red(),
    }
}

/// Reports run progress with a progress bar
pub struct ProgressReporter {
    bar: Mutex<Option<ProgressBar>>,
}

impl ProgressReporter {
    pub fn new() -> Self {
        Self {
            bar: Mutex::new(None),
        }
    }

    fn bar_style() -> ProgressStyle {
        ProgressStyle::with_template(
            "{spinner:.green} {prefix:.bold.cyan} [{bar:40.cyan/blue}] {pos}/{len} {msg}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("=>-")
    }

    fn with_bar(&self, f: impl FnOnce(&ProgressBar)) {
        if let Ok(guard) = self.bar.lock()
            && let Some(bar) = guard.as_ref()
        {
            f(bar);
        }
    }
}

impl Default for ProgressReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl RunProgress for ProgressReporter {
    fn on_run_start(&self, manifest: &RunManifest, already_resolved: usize) {
        let bar = ProgressBar::new(manifest.total() as u64);
        bar.set_style(Self::bar_style());
        bar.set_prefix(manifest.run_id.to_string());
        bar.set_position(already_resolved as u64);
        bar.set_message(if already_resolved > 0 {
            format!("resuming ({already_resolved} already recorded)")
        } else {
            "starting...".to_string()
        });
        bar.enable_steady_tick(std::time::Duration::from_millis(120));

        if let Ok(mut guard) = self.bar.lock() {
            *guard = Some(bar);
        }
    }

    fn on_task_resolved(&self, _identity: &AgentId, display_name: &str, category: &str) {
        self.with_bar(|bar| {
            let status = if is_failure(category) {
                format!("{} {} ({})", "x".red(), display_name, category)
            } else {
                format!("{} {} ({})", "v".green(), display_name, category)
            };
            bar.set_message(status);
            bar.inc(1);
        });
    }

    fn on_run_complete(&self, status: RunStatus) {
        if let Ok(mut guard) = self.bar.lock()
            && let Some(bar) = guard.take()
        {
            match status {
                RunStatus::Incomplete => bar.abandon_with_message(status_label(status).to_string()),
                _ => bar.finish_with_message(status_label(status).to_string()),
            }
        }
    }
}

/// Simple line-based progress (no progress bar)
pub struct SimpleProgress;

impl RunProgress for SimpleProgress {
    fn on_run_start(&self, manifest: &RunManifest, already_resolved: usize) {
        eprintln!(
            "{} {} ({} agents, {} already recorded)",
            "->".cyan(),
            manifest.run_id.to_string().bold(),
            manifest.total(),
            already_resolved
        );
    }

    fn on_task_resolved(&self, _identity: &AgentId, display_name: &str, category: &str) {
        if is_failure(category) {
            eprintln!("  {} {} ({})", "x".red(), display_name, category);
        } else {
            eprintln!("  {} {} ({})", "v".green(), display_name, category);
        }
    }

    fn on_run_complete(&self, status: RunStatus) {
        eprintln!("{} run {}", "->".cyan(), status_label(status));
    }
}
