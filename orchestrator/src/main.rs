//! `summon` command line entry point
//!
//! Reads a batch file, runs it and prints the result map as JSON.

use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;

use orchestrator::{EnvApiKeySource, Orchestrator, OrchestratorConfig, ProviderCatalog};
use shared::logging;

/// Run a batch of generation tasks across providers
#[derive(Parser)]
#[command(name = "summon")]
#[command(about = "Runs a batch of labelled generation tasks concurrently and prints their results")]
pub struct Args {
    /// Batch file: {"label": {"provider": ..., "parameters": {...}}} or a list of {label, provider, parameters}
    #[arg(long)]
    pub batch: PathBuf,

    /// Maximum number of tasks in the batch (overrides SUMMON_CAPACITY)
    #[arg(long)]
    pub capacity: Option<usize>,

    /// Delay between task launches in milliseconds (overrides SUMMON_STAGGER_MS)
    #[arg(long)]
    pub stagger_ms: Option<u64>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    pub log_level: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    logging::init_tracing(Some(&args.log_level));
    logging::log_startup("summon", &format!("batch {}", args.batch.display()));

    let mut config = OrchestratorConfig::from_env()?;
    if let Some(capacity) = args.capacity {
        config = config.with_capacity(capacity);
    }
    if let Some(stagger_ms) = args.stagger_ms {
        config = config.with_stagger(Duration::from_millis(stagger_ms));
    }
    config.validate()?;

    let keys = EnvApiKeySource::for_catalog(&ProviderCatalog::builtin());
    let mut orchestrator = Orchestrator::with_api_keys(config, &keys).await?;

    if let Err(e) = orchestrator.summon_file(&args.batch) {
        logging::log_error("summon", "Batch loading", &e);
        return Err(e).with_context(|| format!("Failed to summon batch file {}", args.batch.display()));
    }

    orchestrator.run().await?;
    println!("{}", orchestrator.results_json()?);

    orchestrator.dismiss();
    logging::log_shutdown("summon", "batch complete");
    Ok(())
}
