use log::{error, info, warn};
use migration::{Migrator, MigratorTrait};
use service::{config::Config, logging::Logger};
use std::sync::Arc;
use workers::{token_refresh_worker, transcript_sync_worker, WorkerHandle};

#[tokio::main]
async fn main() {
    let config = Config::new();
    Logger::init_logger(&config as &Config);

    info!("Starting meeting_sync [{}]", config.runtime_env());

    let db = match service::init_database(&config).await {
        Ok(db) => Arc::new(db),
        Err(e) => {
            error!("Failed to establish database connection: {e}");
            std::process::exit(1);
        }
    };

    if config.run_migrations {
        info!("Applying pending migrations...");
        if let Err(e) = Migrator::up(db.as_ref(), None).await {
            error!("Failed to apply migrations: {e}");
            std::process::exit(1);
        }
    }

    let mut handles: Vec<WorkerHandle> = Vec::new();

    match transcript_sync_worker(db.clone(), &config) {
        Ok(worker) => handles.push(worker.spawn()),
        Err(e) => warn!("Bot status poller not started: {e}"),
    }

    match token_refresh_worker(db.clone(), &config) {
        Ok(worker) => handles.push(worker.spawn()),
        Err(e) => warn!("Token refresher not started: {e}"),
    }

    if handles.is_empty() {
        error!("No worker is configured, set RECALL_AI_API_KEY and/or ENCRYPTION_KEY");
        std::process::exit(1);
    }

    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {e}");
    }

    info!("Shutting down {} worker(s)...", handles.len());
    for handle in handles {
        let name = handle.name();
        handle.shutdown().await;
        info!("{name} worker shut down");
    }
}
