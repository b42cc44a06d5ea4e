// dataprofiler - main.rs
//
// CLI entry point. Runs a single profiling pass over one input file
// and writes the resulting profile (and, for `metrics`, the flattened
// metrics rows) plus the audit record to stdout as JSON, and best-
// effort persists both documents under the per-run workspace directory.
//
// Exit codes: 0 success, 1 unexpected error, 2 catastrophic data error,
// 3 I/O error, 4 cancelled.

pub use dataprofiler::app;
pub use dataprofiler::core;
pub use dataprofiler::platform;
pub use dataprofiler::util;

use clap::{Parser, Subcommand};
use core::model::RunProgress;
use core::pipeline::CancellationToken;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::mpsc;
use std::time::Instant;
use util::error::ProfilerError;

/// Exact streaming profiler for large delimited text files.
#[derive(Parser, Debug)]
#[command(name = "dataprofiler", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable debug logging (equivalent to RUST_LOG=debug).
    #[arg(short = 'd', long = "debug", global = true)]
    debug: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Profile an input file and print the profile artifact as JSON.
    Profile {
        /// Path to the input file (optionally gzip-compressed).
        input: PathBuf,

        /// Path to a JSON run configuration. Defaults are used if omitted.
        #[arg(short = 'c', long = "config")]
        config: Option<PathBuf>,
    },
    /// Profile an input file and print the flattened metrics row
    /// stream (one JSON array entry per column) to stdout.
    Metrics {
        /// Path to the input file (optionally gzip-compressed).
        input: PathBuf,

        /// Path to a JSON run configuration. Defaults are used if omitted.
        #[arg(short = 'c', long = "config")]
        config: Option<PathBuf>,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    util::logging::init(cli.debug, None);

    tracing::info!(
        version = util::constants::APP_VERSION,
        debug = cli.debug,
        "dataprofiler starting"
    );

    let result = match cli.command {
        Commands::Profile { input, config } => run_profile(input, config),
        Commands::Metrics { input, config } => run_metrics(input, config),
    };

    match result {
        Ok(()) => ExitCode::from(0),
        Err(code) => {
            tracing::error!(exit_code = code, "run did not complete successfully");
            ExitCode::from(code)
        }
    }
}

fn run_profile(input: PathBuf, config_path: Option<PathBuf>) -> Result<(), u8> {
    let (artifact, audit) = execute_run(&input, config_path.as_deref())?;
    let profile_json = serde_json::to_string_pretty(&artifact).expect("profile artifact is always serializable");
    let audit_json = serde_json::to_string_pretty(&audit).expect("audit record is always serializable");
    println!("{profile_json}");
    println!("{audit_json}");
    Ok(())
}

fn run_metrics(input: PathBuf, config_path: Option<PathBuf>) -> Result<(), u8> {
    let (artifact, audit) = execute_run(&input, config_path.as_deref())?;
    let rows = app::metrics::build(&artifact);
    let rows_json = serde_json::to_string_pretty(&rows).expect("metrics rows are always serializable");
    let audit_json = serde_json::to_string_pretty(&audit).expect("audit record is always serializable");
    println!("{rows_json}");
    println!("{audit_json}");
    Ok(())
}

/// Load config, run the pipeline to completion on the calling thread,
/// and map failures to the documented exit codes. Returns the profile
/// artifact alongside its audit record (spec §6: the CLI writes "the
/// profile and audit to stdout"). A missing `config_path` falls back to
/// `RunConfig::default()`.
fn execute_run(
    input: &PathBuf,
    config_path: Option<&std::path::Path>,
) -> Result<(core::model::ProfileArtifact, core::model::AuditRecord), u8> {
    let config = match config_path {
        Some(path) => app::config::load(path).map_err(|e| {
            tracing::error!(error = %e, "configuration error");
            3
        })?,
        None => core::model::RunConfig::default(),
    };

    let platform_paths = platform::workspace::PlatformPaths::resolve();
    let run_id = new_run_id();
    let distinct_db_path = platform_paths.distinct_store_path(&run_id).map_err(|e| {
        tracing::error!(error = %e, "could not prepare run workspace");
        3
    })?;

    let cancellation = CancellationToken::new();
    let (tx, rx) = mpsc::channel();

    let started = Instant::now();
    let run_result = core::pipeline::run(&run_id, input, &config, &distinct_db_path, &cancellation, &tx);
    let elapsed = started.elapsed();

    for message in rx.try_iter() {
        log_progress(&message);
    }

    match run_result {
        Ok(artifact) => {
            let audit = app::audit::build(&artifact, elapsed);
            tracing::info!(
                rows = audit.row_count,
                columns = audit.column_count,
                ms = audit.processing_time_ms,
                "run completed"
            );
            persist_artifacts(&platform_paths, &run_id, &artifact, &audit);
            Ok((artifact, audit))
        }
        Err(ProfilerError::Run(util::error::RunError::Cancelled)) => Err(4),
        Err(ProfilerError::Run(util::error::RunError::Catastrophic { code })) => {
            tracing::error!(code, "catastrophic data error");
            Err(2)
        }
        Err(e @ ProfilerError::Io { .. }) | Err(e @ ProfilerError::ByteSource(_)) => {
            tracing::error!(error = %e, "I/O error");
            Err(3)
        }
        Err(e) => {
            tracing::error!(error = %e, "unexpected error");
            Err(1)
        }
    }
}

/// Best-effort write of the profile and audit documents under the
/// per-run workspace directory (spec §6, "Persisted layout
/// (recommended, not bit-exact required)"). Failures here are logged,
/// not fatal — the documents are already on stdout.
fn persist_artifacts(
    paths: &platform::workspace::PlatformPaths,
    run_id: &str,
    artifact: &core::model::ProfileArtifact,
    audit: &core::model::AuditRecord,
) {
    match paths.profile_path(run_id) {
        Ok(path) => persist_json(&path, artifact),
        Err(e) => tracing::warn!(error = %e, "failed to resolve profile path"),
    }
    match paths.audit_path(run_id) {
        Ok(path) => persist_json(&path, audit),
        Err(e) => tracing::warn!(error = %e, "failed to resolve audit path"),
    }
}

fn persist_json(path: &std::path::Path, value: &impl serde::Serialize) {
    match serde_json::to_vec_pretty(value) {
        Ok(bytes) => {
            if let Err(e) = std::fs::write(path, bytes) {
                tracing::warn!(error = %e, path = %path.display(), "failed to persist run artifact");
            }
        }
        Err(e) => tracing::warn!(error = %e, "failed to serialize run artifact"),
    }
}

fn log_progress(message: &RunProgress) {
    match message {
        RunProgress::Started => tracing::debug!("run started"),
        RunProgress::HeaderBound { columns } => tracing::debug!(columns, "header bound"),
        RunProgress::Tick { fraction, rows_seen } => {
            tracing::trace!(fraction, rows_seen, "progress tick")
        }
        RunProgress::Completed { .. } => tracing::debug!("run completed"),
        RunProgress::Failed { reason } => tracing::warn!(reason, "run failed"),
        RunProgress::Cancelled => tracing::warn!("run cancelled"),
    }
}

fn new_run_id() -> String {
    use sha2::{Digest, Sha256};
    let mut hasher = Sha256::new();
    hasher.update(std::process::id().to_le_bytes());
    hasher.update(std::time::SystemTime::now().duration_since(std::time::UNIX_EPOCH).unwrap_or_default().as_nanos().to_le_bytes());
    hex::encode(hasher.finalize())[..16].to_string()
}
