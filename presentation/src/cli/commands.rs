//! CLI command definitions

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Output format for run records
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Per-category counts, percentages and failures
    Summary,
    /// The full run record as JSON
    Json,
}

impl From<OutputFormat> for assembly_domain::OutputFormat {
    fn from(format: OutputFormat) -> Self {
        match format {
            OutputFormat::Summary => assembly_domain::OutputFormat::Summary,
            OutputFormat::Json => assembly_domain::OutputFormat::Json,
        }
    }
}

/// CLI arguments for assembly-quorum
#[derive(Parser, Debug)]
#[command(name = "assembly-quorum")]
#[command(author, version, about = "Country-agent assembly - every persona votes, every vote is counted")]
#[command(long_about = r#"
Assembly Quorum asks a roster of country personas to vote on a motion, then
optionally asks each voter how its vote affects one bilateral relationship.

Every agent gets exactly one recorded outcome per run: a valid answer, a
validation failure, or a provider failure. Runs are checkpointed as they go
and can be resumed after an interruption with --resume.

Configuration files are loaded from (in priority order):
1. ASSEMBLY_* environment variables (e.g. ASSEMBLY_RUN__CONCURRENCY=8)
2. --config <path>     Explicit config file
3. ./assembly.toml     Project-level config
4. ~/.config/assembly-quorum/config.toml   Global config

Example:
  assembly-quorum run 01_gaza_ceasefire_resolution
  assembly-quorum run 01_gaza_ceasefire_resolution --provider anthropic --sample 10
  assembly-quorum analyze 01_gaza_ceasefire_resolution --counterpart israel
"#)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Verbosity level (-v = info, -vv = debug, -vvv = trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress progress indicators
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Path to configuration file
    #[arg(long, value_name = "PATH", global = true)]
    pub config: Option<PathBuf>,

    /// Disable loading of configuration files
    #[arg(long, global = true)]
    pub no_config: bool,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Ask every agent to vote on a motion
    Run(RunArgs),
    /// Ask every voter how its vote affects relations with a counterpart
    Analyze(AnalyzeArgs),
    /// Show configuration file locations and the merged configuration
    ShowConfig,
}

/// Options shared by every run
#[derive(Args, Debug, Clone)]
pub struct RunArgs {
    /// Motion identifier (`<motions_dir>/<TASK_ID>.md`)
    pub task_id: String,

    /// Provider to use: openai, anthropic or ollama
    #[arg(short, long, value_name = "PROVIDER")]
    pub provider: Option<String>,

    /// Model name (defaults to the provider's configured model)
    #[arg(short, long, value_name = "MODEL")]
    pub model: Option<String>,

    /// Only query the first N agents of the roster
    #[arg(long, value_name = "N")]
    pub sample: Option<usize>,

    /// Continue an interrupted run from its checkpoint
    #[arg(long)]
    pub resume: bool,

    /// Maximum number of concurrent requests
    #[arg(long, value_name = "N")]
    pub concurrency: Option<usize>,

    /// Retries per agent after the first attempt
    #[arg(long, value_name = "N")]
    pub max_retries: Option<u32>,

    /// Run identity (defaults to the task id)
    #[arg(long, value_name = "ID")]
    pub run_id: Option<String>,

    /// Output format
    #[arg(short, long, value_enum)]
    pub output: Option<OutputFormat>,
}

#[derive(Args, Debug, Clone)]
pub struct AnalyzeArgs {
    #[command(flatten)]
    pub run: RunArgs,

    /// Country slug whose bilateral relations are assessed
    #[arg(long, value_name = "SLUG")]
    pub counterpart: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_run() {
        let cli = Cli::parse_from([
            "assembly-quorum",
            "-vv",
            "run",
            "motion-1",
            "--provider",
            "ollama",
            "--sample",
            "5",
            "--resume",
            "-o",
            "json",
        ]);
        assert_eq!(cli.verbose, 2);
        match cli.command {
            Command::Run(args) => {
                assert_eq!(args.task_id, "motion-1");
                assert_eq!(args.provider.as_deref(), Some("ollama"));
                assert_eq!(args.sample, Some(5));
                assert!(args.resume);
                assert_eq!(args.output, Some(OutputFormat::Json));
                assert_eq!(args.concurrency, None);
            }
            other => panic!("expected run, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_analyze() {
        let cli = Cli::parse_from([
            "assembly-quorum",
            "analyze",
            "motion-1",
            "--counterpart",
            "united-states",
            "--quiet",
        ]);
        assert!(cli.quiet);
        match cli.command {
            Command::Analyze(args) => {
                assert_eq!(args.run.task_id, "motion-1");
                assert_eq!(args.counterpart.as_deref(), Some("united-states"));
            }
            other => panic!("expected analyze, got {other:?}"),
        }
    }

    #[test]
    fn test_task_id_required() {
        assert!(Cli::try_parse_from(["assembly-quorum", "run"]).is_err());
    }
}
