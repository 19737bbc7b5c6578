//! Console output formatter for run records

use assembly_domain::{
    PROVIDER_FAILURE, RunRecord, RunStatus, StructuredResponse, VALIDATION_FAILURE,
};
use colored::Colorize;
use serde::Serialize;

/// Formats run records for console display
pub struct ConsoleFormatter;

impl ConsoleFormatter {
    /// Format a colored summary: header, counts per category, failures
    pub fn format<T: StructuredResponse>(record: &RunRecord<T>) -> String {
        let mut output = String::new();

        output.push_str(&Self::header(&format!("Run {}", record.run_id())));
        output.push('\n');

        output.push_str(&format!("{} {}\n", "Task:".cyan().bold(), record.task_id()));
        output.push_str(&format!(
            "{} {} / {}\n",
            "Model:".cyan().bold(),
            record.provider(),
            record.model()
        ));
        output.push_str(&format!(
            "{} {}\n",
            "Started:".cyan().bold(),
            record.timestamp().format("%Y-%m-%d %H:%M:%S UTC")
        ));
        output.push_str(&format!(
            "{} {}\n",
            "Status:".cyan().bold(),
            Self::status(record.status())
        ));

        output.push_str(&Self::section_header(&format!(
            "Results ({} of {} recorded)",
            record.summary().sum(),
            record.total()
        )));
        let categories = T::categories()
            .iter()
            .copied()
            .chain([VALIDATION_FAILURE, PROVIDER_FAILURE]);
        for category in categories {
            let count = record.summary().get(category);
            let line = format!(
                "  {:<28} {:>5}  {:>6}",
                category,
                count,
                Self::percentage(count, record.total())
            );
            output.push_str(&Self::colorize(category, count, line));
            output.push('\n');
        }

        let failures: Vec<_> = record
            .entries()
            .iter()
            .filter_map(|e| e.outcome.failure_description().map(|d| (e, d)))
            .collect();
        if !failures.is_empty() {
            output.push_str(&Self::section_header("Failures"));
            for (entry, description) in failures {
                output.push_str(&format!(
                    "  {} {}: {} ({})\n",
                    "x".red(),
                    entry.display_name.bold(),
                    entry.outcome.category(),
                    description
                ));
            }
        }

        if !record.pending().is_empty() {
            output.push_str(&Self::section_header("Pending"));
            let pending = record
                .pending()
                .iter()
                .map(|id| id.as_str())
                .collect::<Vec<_>>()
                .join(", ");
            output.push_str(&format!("  {}\n", Self::indent_wrapped(&pending)));
            output.push_str(&format!(
                "\n  {}\n",
                "Re-run with --resume to finish the remaining agents.".yellow()
            ));
        }

        output.push_str(&Self::footer());
        output
    }

    /// Format a run's document (record or report) as JSON
    pub fn format_json<D: Serialize>(document: &D) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(document)
    }

    /// `count` as a percentage of `total`, one decimal
    pub fn percentage(count: usize, total: usize) -> String {
        if total == 0 {
            return "-".to_string();
        }
        format!("{:.1}%", count as f64 * 100.0 / total as f64)
    }

    fn status(status: RunStatus) -> colored::ColoredString {
        match status {
            RunStatus::Complete => "complete".green().bold(),
            RunStatus::CompletedWithFailures => "completed with failures".yellow().bold(),
            RunStatus::Incomplete => "incomplete".red().bold(),
        }
    }

    fn colorize(category: &str, count: usize, line: String) -> String {
        if count == 0 {
            return line.dimmed().to_string();
        }
        if category == VALIDATION_FAILURE || category == PROVIDER_FAILURE {
            return line.red().to_string();
        }
        if category == "yes" || category.starts_with("strengthened") {
            line.green().to_string()
        } else if category == "no" || category.starts_with("strained") {
            line.red().to_string()
        } else {
            line.yellow().to_string()
        }
    }

    fn header(title: &str) -> String {
        let line = "=".repeat(60);
        format!("{}\n{:^60}\n{}", line.cyan(), title.bold(), line.cyan())
    }

    fn section_header(title: &str) -> String {
        format!("\n{}\n{}\n", title.cyan().bold(), "-".repeat(40))
    }

    fn footer() -> String {
        format!("\n{}\n", "=".repeat(60).cyan())
    }

    /// Wrap a comma-separated list at 72 columns, continuation lines indented
    fn indent_wrapped(text: &str) -> String {
        let mut lines = vec![String::new()];
        for word in text.split(' ') {
            let current = lines.last_mut().map(|l| l.len()).unwrap_or(0);
            if current > 0 && current + word.len() + 1 > 72 {
                lines.push(String::new());
            }
            if let Some(line) = lines.last_mut() {
                if !line.is_empty() {
                    line.push(' ');
                }
                line.push_str(word);
            }
        }
        lines.join("\n  ")
    }
}
