//! Operational entry point: trigger a single worker cycle or print token health.

use clap::{Parser, Subcommand};
use log::{error, info};
use service::{config::Config, logging::Logger};
use std::sync::Arc;
use workers::{token_refresh_worker, transcript_sync_worker, Worker};

#[derive(Parser)]
#[command(name = "sync_ctl", version, about = "Manual controls for the meeting_sync workers")]
struct Cli {
    #[command(subcommand)]
    command: Command,

    #[command(flatten)]
    config: Config,
}

#[derive(Subcommand)]
enum Command {
    /// Run one bot status polling cycle and print its report
    PollNow,
    /// Run one token refresh cycle and print its report
    RefreshNow,
    /// Print token health for both credential tables
    TokenHealth,
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    Logger::init_logger(&cli.config);

    let db = match service::init_database(&cli.config).await {
        Ok(db) => Arc::new(db),
        Err(e) => {
            error!("Failed to establish database connection: {e}");
            std::process::exit(1);
        }
    };

    let output = match cli.command {
        Command::PollNow => run_once(transcript_sync_worker(db, &cli.config)).await,
        Command::RefreshNow => run_once(token_refresh_worker(db, &cli.config)).await,
        Command::TokenHealth => domain::token_health::report(db.as_ref())
            .await
            .map_err(|e| e.to_string())
            .and_then(|report| serde_json::to_string_pretty(&report).map_err(|e| e.to_string())),
    };

    match output {
        Ok(json) => println!("{json}"),
        Err(e) => {
            error!("{e}");
            std::process::exit(1);
        }
    }
}

async fn run_once(worker: Result<Worker, domain::error::Error>) -> Result<String, String> {
    let worker = worker.map_err(|e| e.to_string())?;
    let report = worker.run_now().await.map_err(|e| e.to_string())?;
    info!("{} cycle finished: {report}", worker.name());
    serde_json::to_string_pretty(&report).map_err(|e| e.to_string())
}
