use std::process::ExitCode;
use std::time::Duration;

use clap::Parser;
use tracing::{error, info};

use nw_core::LoadPolicy;
use nw_extract::{Extractor, DEFAULT_ENDPOINT};
use nw_pipeline::Pipeline;

/// Pull NYT business news into the raw_data table.
///
/// Executes exactly one pipeline run per invocation; cadence, retries, and
/// back-off belong to whatever schedules this binary (cron, a systemd timer,
/// an orchestrator). The exit code is the run outcome.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// News API endpoint to pull from.
    #[arg(long, default_value = DEFAULT_ENDPOINT)]
    endpoint: String,

    /// NYT API key.
    #[arg(long, env = "NYT_API_KEY", hide_env_values = true)]
    api_key: String,

    /// Storage backend to load into: postgres, sqlite, or memory.
    #[arg(long, default_value = "postgres")]
    storage: String,

    /// Connection URL for the storage backend.
    #[arg(long, env = "DATABASE_URL")]
    database_url: Option<String>,

    /// HTTP timeout for the API call, in seconds.
    #[arg(long, default_value_t = 30)]
    timeout: u64,

    /// Batch policy when a row violates a table constraint.
    #[arg(long, value_enum, default_value_t = LoadPolicy::FailFast)]
    policy: LoadPolicy,
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, transient = e.is_transient(), "pipeline run failed");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> nw_core::Result<()> {
    let store = nw_storage::create_store(&cli.storage, cli.database_url.as_deref()).await?;
    let extractor = Extractor::with_timeout(
        cli.endpoint,
        cli.api_key,
        Duration::from_secs(cli.timeout),
    )?;

    let pipeline = Pipeline::new(extractor, store, cli.policy);
    let summary = pipeline.run().await?;
    info!(
        run_id = %summary.run_id,
        started_at = %summary.started_at,
        extracted = summary.extracted,
        inserted = summary.inserted,
        "run finished"
    );
    Ok(())
}
