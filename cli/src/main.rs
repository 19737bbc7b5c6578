//! CLI entrypoint for Assembly Quorum
//!
//! This is the main binary that wires together all layers using
//! dependency injection.

use anyhow::{Context, Result, bail};
use assembly_application::{
    AnalyzeImpactInput, AnalyzeImpactUseCase, NoProgress, ProviderClient, RunError, RunParams,
    RunProgress, RunVoteInput, RunVoteUseCase, impact_run_key,
};
use assembly_domain::{
    AgentId, GenerationConfig, ImpactAssessment, OutputFormat, ProviderKind, RunRecord,
    RunStatus, StructuredResponse, VoteResponse,
};
use assembly_infrastructure::{
    ConfigLoader, FileConfig, JsonlCheckpointStore, MotionLoader, RecordDocument, RosterLoader,
    RunRecordWriter, build_provider,
};
use assembly_presentation::{
    AnalyzeArgs, Cli, Command, ConsoleFormatter, ProgressReporter, RunArgs, SimpleProgress,
};
use clap::Parser;
use std::process::ExitCode;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

/// Every task resolved with a valid answer
const EXIT_COMPLETE: u8 = 0;
/// Bad configuration, missing input or credentials
const EXIT_SETUP: u8 = 1;
/// Every task resolved, some with failures
const EXIT_FAILURES: u8 = 2;
/// The run stopped before every task resolved
const EXIT_INCOMPLETE: u8 = 3;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Initialize logging based on verbosity level; RUST_LOG wins when set
    let level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace", // -vvv or more
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    info!("Starting Assembly Quorum");

    match run(cli).await {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::from(EXIT_SETUP)
        }
    }
}

async fn run(cli: Cli) -> Result<u8> {
    let config = if cli.no_config {
        ConfigLoader::load_defaults()
    } else {
        ConfigLoader::load(cli.config.as_deref())
    }
    .context("Failed to load configuration")?;
    config.validate().context("Invalid configuration")?;

    if !config.output.color {
        colored::control::set_override(false);
    }

    match &cli.command {
        Command::ShowConfig => {
            ConfigLoader::print_config_sources(cli.config.as_deref());
            println!();
            println!("{}", toml::to_string_pretty(&config)?);
            Ok(EXIT_COMPLETE)
        }
        Command::Run(args) => run_vote(&cli, &config, args).await,
        Command::Analyze(args) => run_analysis(&cli, &config, args).await,
    }
}

/// Provider, parameters and output settings shared by both passes
struct Session {
    provider: Arc<dyn ProviderClient>,
    params: RunParams,
    generation: GenerationConfig,
    format: OutputFormat,
    progress: Box<dyn RunProgress>,
    cancel: CancellationToken,
}

impl Session {
    fn new(cli: &Cli, config: &FileConfig, args: &RunArgs) -> Result<Self> {
        let providers = config.providers.to_provider_config()?;
        let kind = match &args.provider {
            Some(name) => name.parse::<ProviderKind>()?,
            None => providers.default,
        };
        let model = args
            .model
            .clone()
            .unwrap_or_else(|| providers.default_model(kind).to_string());
        if model.trim().is_empty() {
            bail!("Model name cannot be empty");
        }

        let mut params = config.run.to_run_params().with_sample(args.sample);
        if let Some(concurrency) = args.concurrency {
            if concurrency == 0 {
                bail!("--concurrency must be at least 1");
            }
            params = params.with_concurrency(concurrency);
        }
        if let Some(max_retries) = args.max_retries {
            params = params.with_max_retries(max_retries);
        }

        let generation = config
            .generation
            .to_generation_config(&model, config.run.timeout());
        let provider = build_provider(kind, &providers)?;
        info!("Model: {} ({})", model, kind);

        let progress: Box<dyn RunProgress> = if cli.quiet {
            Box::new(NoProgress)
        } else if config.output.show_progress {
            Box::new(ProgressReporter::new())
        } else {
            Box::new(SimpleProgress)
        };

        Ok(Self {
            provider,
            params,
            generation,
            format: args
                .output
                .map(Into::into)
                .or(config.output.format)
                .unwrap_or_default(),
            progress,
            cancel: cancel_on_interrupt(),
        })
    }
}

/// Cancel the returned token on the first Ctrl-C
fn cancel_on_interrupt() -> CancellationToken {
    let cancel = CancellationToken::new();
    let token = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupted; waiting for in-flight requests");
            eprintln!("Interrupted. Finishing in-flight requests, then stopping...");
            token.cancel();
        }
    });
    cancel
}

async fn run_vote(cli: &Cli, config: &FileConfig, args: &RunArgs) -> Result<u8> {
    let roster = RosterLoader::new(&config.paths.agents_dir).load()?;
    let motion = MotionLoader::new(&config.paths.motions_dir).load(&args.task_id)?;
    let session = Session::new(cli, config, args)?;

    let store = Arc::new(JsonlCheckpointStore::<VoteResponse>::new(
        &config.paths.checkpoint_dir,
    ));
    let use_case = RunVoteUseCase::new(session.provider.clone(), store, session.params.clone());
    let input = RunVoteInput::new(&args.task_id, motion, roster, session.generation.clone())
        .with_run_id(args.run_id.clone())
        .resuming(args.resume);

    let result = use_case
        .execute_with_progress(input, &session.cancel, session.progress.as_ref())
        .await;
    let Some(record) = settle(result)? else {
        return Ok(EXIT_INCOMPLETE);
    };

    if record.status() != RunStatus::Incomplete {
        let writer = RunRecordWriter::new(&config.paths.results_dir);
        let finalize = use_case.finalize(record.run_id());
        if !publish(&writer, &args.task_id, &record, finalize).await {
            return Ok(EXIT_INCOMPLETE);
        }
    }
    present(&record, &record, session.format)
}

async fn run_analysis(cli: &Cli, config: &FileConfig, args: &AnalyzeArgs) -> Result<u8> {
    let task_id = &args.run.task_id;
    let votes = RunRecordWriter::new(&config.paths.results_dir)
        .load_latest::<RunRecord<VoteResponse>>(task_id)?
        .with_context(|| {
            format!(
                "No vote record for {} in {}; run `assembly-quorum run {}` first",
                task_id,
                config.paths.results_dir.display(),
                task_id
            )
        })?;
    let session = Session::new(cli, config, &args.run)?;

    let mut analysis = config.analysis.to_analysis_params()?;
    if let Some(counterpart) = &args.counterpart {
        analysis.counterpart = AgentId::new(counterpart.as_str())?;
    }
    // An explicit --model applies to this pass too
    if args.run.model.is_some() {
        analysis.model = None;
    }

    let store = Arc::new(JsonlCheckpointStore::<ImpactAssessment>::new(
        &config.paths.checkpoint_dir,
    ));
    let use_case =
        AnalyzeImpactUseCase::new(session.provider.clone(), store, session.params.clone());
    let input = AnalyzeImpactInput::new(votes, analysis, session.generation.clone())
        .with_run_id(args.run.run_id.clone())
        .resuming(args.run.resume);

    let result = use_case
        .execute_with_progress(input, &session.cancel, session.progress.as_ref())
        .await;
    let Some(report) = settle(result)? else {
        return Ok(EXIT_INCOMPLETE);
    };

    let record = report.record();
    if record.status() != RunStatus::Incomplete {
        let writer = RunRecordWriter::new(&config.paths.analysis_dir);
        let finalize = use_case.finalize(record.run_id());
        if !publish(&writer, &impact_run_key(task_id), &report, finalize).await {
            return Ok(EXIT_INCOMPLETE);
        }
    }
    present(record, &report, session.format)
}

/// Unwrap a run result, or report an aborted run and return `None`
///
/// Setup errors are returned as errors (exit 1).
fn settle<R>(result: Result<R, RunError>) -> Result<Option<R>> {
    match result {
        Ok(output) => Ok(Some(output)),
        Err(e @ RunError::CheckpointExists(_)) => {
            bail!("{e}\nPass --resume to continue it; completed work is never discarded.")
        }
        Err(e) if e.is_setup() => Err(e.into()),
        Err(e) => {
            error!("Run aborted: {}", e);
            eprintln!("Run aborted: {e}");
            eprintln!("Recorded outcomes are kept in the checkpoint; fix the cause and pass --resume.");
            Ok(None)
        }
    }
}

/// Write a finished run's document, then archive its checkpoint
///
/// The checkpoint is archived only after the document is on disk, so a
/// failed write leaves the run resumable. Returns whether both steps
/// succeeded.
async fn publish<D: RecordDocument>(
    writer: &RunRecordWriter,
    key: &str,
    document: &D,
    finalize: impl Future<Output = Result<(), RunError>>,
) -> bool {
    match writer.write(key, document) {
        Ok(path) => eprintln!("Record written to {}", path.display()),
        Err(e) => {
            error!("Failed to write run record: {}", e);
            eprintln!("Failed to write run record: {e}");
            eprintln!("The checkpoint is kept; pass --resume to write the record again.");
            return false;
        }
    }
    if let Err(e) = finalize.await {
        error!("Failed to archive checkpoint: {}", e);
        eprintln!("Failed to archive checkpoint: {e}");
        return false;
    }
    true
}

/// Print a run in the chosen format and map its status to an exit code
fn present<T: StructuredResponse, D: RecordDocument>(
    record: &RunRecord<T>,
    document: &D,
    format: OutputFormat,
) -> Result<u8> {
    let output = match format {
        OutputFormat::Summary => ConsoleFormatter::format(record),
        OutputFormat::Json => ConsoleFormatter::format_json(document)?,
    };
    println!("{}", output);

    Ok(match record.status() {
        RunStatus::Complete => EXIT_COMPLETE,
        RunStatus::CompletedWithFailures => EXIT_FAILURES,
        RunStatus::Incomplete => EXIT_INCOMPLETE,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use assembly_application::CheckpointStore;
    use assembly_domain::{
        CheckpointState, Outcome, Roster, RosterEntry, RunAggregator, RunId, RunManifest,
        VoteChoice,
    };
    use chrono::{TimeZone, Utc};

    async fn finished_checkpoint(
        store: &JsonlCheckpointStore<VoteResponse>,
    ) -> RunRecord<VoteResponse> {
        let roster = Roster::new(vec![
            RosterEntry::from_slug("albania", "").unwrap(),
            RosterEntry::from_slug("brazil", "").unwrap(),
        ])
        .unwrap();
        let manifest = RunManifest::new(
            RunId::new("motion-1").unwrap(),
            "motion-1",
            "openai",
            "gpt-4o-mini",
            &roster,
            Utc.with_ymd_and_hms(2025, 9, 20, 14, 30, 0).unwrap(),
        );
        store.create(&manifest).await.unwrap();
        let mut state = CheckpointState::new(manifest.clone());
        for slug in ["albania", "brazil"] {
            let id = AgentId::new(slug).unwrap();
            let outcome = Outcome::Success(VoteResponse::new(VoteChoice::Yes, "Agreed."));
            store.record(&manifest.run_id, &id, &outcome).await.unwrap();
            state.record(id, outcome).unwrap();
        }
        RunAggregator::aggregate(&state)
    }

    async fn archive(
        store: &JsonlCheckpointStore<VoteResponse>,
        run_id: &RunId,
    ) -> Result<(), RunError> {
        store.finalize(run_id).await?;
        Ok(())
    }

    #[tokio::test]
    async fn test_failed_write_keeps_checkpoint_live() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonlCheckpointStore::<VoteResponse>::new(dir.path().join("checkpoints"));
        let record = finished_checkpoint(&store).await;
        let run_id = record.run_id().clone();
        let blocker = dir.path().join("results");
        std::fs::write(&blocker, "not a directory").unwrap();

        let broken = RunRecordWriter::new(blocker.join("nested"));
        assert!(!publish(&broken, "motion-1", &record, archive(&store, &run_id)).await);

        let state = store.load(&run_id).await.unwrap().unwrap();
        assert_eq!(state.resolved_count(), 2);
        assert!(!store.archive_dir().exists());

        let writer = RunRecordWriter::new(dir.path().join("reactions"));
        assert!(publish(&writer, "motion-1", &record, archive(&store, &run_id)).await);
        assert!(store.load(&run_id).await.unwrap().is_none());
        let latest: RunRecord<VoteResponse> = writer.load_latest("motion-1").unwrap().unwrap();
        assert_eq!(latest, record);
    }

    #[test]
    fn test_setup_errors_are_not_aborts() {
        let result: Result<u8, RunError> = Err(RunError::EmptyRoster);
        assert!(settle(result).is_err());

        let exists: Result<u8, RunError> =
            Err(RunError::CheckpointExists(RunId::new("motion-1").unwrap()));
        let message = format!("{:#}", settle(exists).unwrap_err());
        assert!(message.contains("--resume"));

        let aborted: Result<u8, RunError> = Err(RunError::ManifestMismatch(
            RunId::new("motion-1").unwrap(),
        ));
        assert!(settle(aborted).unwrap().is_none());
    }
}
