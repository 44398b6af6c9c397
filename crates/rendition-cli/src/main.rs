//! rendition - derive thumbnails and preview clips from remote videos and publish
//! them to object storage.
//!
//! Configuration comes from the environment (a `.env` file is honored); see
//! `PipelineConfig::from_env` for the variables.

use anyhow::Context;
use clap::{Parser, Subcommand};
use rendition_cli::{init_tracing, load_sources, shutdown_signal, write_records};
use rendition_core::PipelineConfig;
use rendition_processing::{
    plan_sizes, run_batch, FfmpegTool, MediaProbe, MediaTool, PipelineOrchestrator,
};
use rendition_storage::{create_storage, ArtifactStore};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

#[derive(Parser)]
#[command(name = "rendition", about = "Media rendition pipeline")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Process a batch of sources and write the metadata records
    Run {
        /// JSON array of {url, width, height, bitrate}
        #[arg(long)]
        sources: PathBuf,
        /// Output file (overrides OUTPUT_FILE)
        #[arg(long)]
        output: Option<PathBuf>,
        /// Sources processed at once (overrides MAX_CONCURRENT_SOURCES)
        #[arg(long)]
        concurrency: Option<usize>,
    },
    /// Probe a local file and print its properties
    Probe {
        /// Path to the video file
        file: PathBuf,
    },
    /// Print thumbnail dimensions for a source resolution
    Plan {
        #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
        width: u32,
        #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
        height: u32,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();
    let mut config = PipelineConfig::from_env().context("Failed to load configuration")?;

    match cli.command {
        Commands::Run {
            sources,
            output,
            concurrency,
        } => {
            if let Some(output) = output {
                config.run.output_path = output;
            }
            if let Some(concurrency) = concurrency {
                config.run.max_concurrent_sources = concurrency;
            }
            config.validate().context("Invalid configuration")?;
            init_tracing(config.run.log_file.as_deref(), config.is_production())?;

            run(config, sources).await
        }
        Commands::Probe { file } => {
            init_tracing(None, false)?;
            let tool: Arc<dyn MediaTool> = Arc::new(FfmpegTool::new(&config.tools)?);
            let probed = MediaProbe::new(tool)
                .probe(&file)
                .await
                .with_context(|| format!("Failed to probe {}", file.display()))?;
            println!("{}", serde_json::to_string_pretty(&probed)?);
            Ok(ExitCode::SUCCESS)
        }
        Commands::Plan { width, height } => {
            let plan: serde_json::Map<String, serde_json::Value> =
                plan_sizes(width, height, &config.renditions.thumbnail_sizes)
                    .into_iter()
                    .map(|(size, (w, h))| {
                        (
                            size.to_string(),
                            serde_json::json!({ "width": w, "height": h }),
                        )
                    })
                    .collect();
            println!("{}", serde_json::to_string_pretty(&plan)?);
            Ok(ExitCode::SUCCESS)
        }
    }
}

async fn run(config: PipelineConfig, sources_path: PathBuf) -> anyhow::Result<ExitCode> {
    tracing::info!(
        environment = %config.run.environment,
        backend = %config.storage.backend,
        sources = %sources_path.display(),
        output = %config.run.output_path.display(),
        concurrency = config.run.max_concurrent_sources,
        "Starting rendition run"
    );

    let (sources, rejected) = load_sources(&sources_path)?;
    for invalid in &rejected {
        tracing::warn!(url = %invalid.url, reason = %invalid.reason, "Rejected source");
    }

    let backend = create_storage(&config.storage)
        .await
        .context("Failed to initialize storage backend")?;
    let store = ArtifactStore::new(backend)
        .with_public_base_url(config.storage.public_base_url.clone());
    let tool: Arc<dyn MediaTool> =
        Arc::new(FfmpegTool::new(&config.tools).context("Invalid tool configuration")?);

    let cancel = CancellationToken::new();
    let signal_task = tokio::spawn(shutdown_signal(cancel.clone()));

    let orchestrator = PipelineOrchestrator::new(&config, tool, store, cancel.clone());
    let outcome = run_batch(&orchestrator, &sources, config.run.max_concurrent_sources).await;

    write_records(&config.run.output_path, &outcome.records)?;
    tracing::info!(
        records = outcome.records.len(),
        path = %config.run.output_path.display(),
        "Records written"
    );

    let interrupted = cancel.is_cancelled();
    // Let the signal task finish instead of leaving it parked on a signal.
    cancel.cancel();
    let _ = signal_task.await;

    if outcome.has_failures() || !rejected.is_empty() || interrupted {
        tracing::warn!(
            failed = outcome.failures.len(),
            rejected = rejected.len(),
            interrupted = interrupted,
            "Run finished with errors"
        );
        return Ok(ExitCode::FAILURE);
    }

    Ok(ExitCode::SUCCESS)
}
