//! Worker loop and handles.

use crate::backoff::{BackoffPolicy, CycleOutcome, RetryController};
use crate::cycle::Cycle;
use domain::error::{DomainErrorKind, Error, InternalErrorKind};
use domain::token_refresh::TokenRefresher;
use domain::transcript_sync::TranscriptSync;
use domain::CycleReport;
use log::*;
use sea_orm::DatabaseConnection;
use service::config::Config;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, Notify};
use tokio::task::{JoinError, JoinHandle};

/// State shared by a worker's loop and its manual trigger.
#[derive(Clone)]
struct Shared {
    cycle: Arc<dyn Cycle>,
    /// Held for the whole of a cycle, including backoff waits.
    running: Arc<Mutex<()>>,
}

impl Shared {
    /// Runs in its own task so a panicking cycle becomes an error.
    async fn run_now(&self) -> Result<CycleReport, Error> {
        let _running = self.running.lock().await;
        let name = self.cycle.name();
        info!("Manual {name} cycle started");

        let cycle = self.cycle.clone();
        let report = tokio::spawn(async move { cycle.run().await })
            .await
            .map_err(|join_error| crashed(name, join_error))??;

        info!("Manual {name} cycle finished: {report}");
        Ok(report)
    }
}

fn crashed(name: &str, join_error: JoinError) -> Error {
    let reason = if join_error.is_panic() {
        format!("{name} cycle panicked")
    } else {
        format!("{name} cycle was cancelled")
    };
    Error {
        source: Some(Box::new(join_error)),
        error_kind: DomainErrorKind::Internal(InternalErrorKind::Other(reason)),
    }
}

/// A cycle plus its schedule, not yet running.
pub struct Worker {
    shared: Shared,
    interval: Duration,
    policy: BackoffPolicy,
}

impl Worker {
    pub fn new(cycle: Arc<dyn Cycle>, interval: Duration, policy: BackoffPolicy) -> Self {
        Self {
            shared: Shared {
                cycle,
                running: Arc::new(Mutex::new(())),
            },
            interval,
            policy,
        }
    }

    pub fn name(&self) -> &'static str {
        self.shared.cycle.name()
    }

    /// Run one cycle immediately, without backoff.
    pub async fn run_now(&self) -> Result<CycleReport, Error> {
        self.shared.run_now().await
    }

    /// Start the periodic loop. The first cycle runs right away; the next
    /// one is scheduled only after the previous one finished or was abandoned.
    pub fn spawn(self) -> WorkerHandle {
        let shutdown = Arc::new(Notify::new());
        let task = tokio::spawn(run_loop(
            self.shared.clone(),
            self.interval,
            self.policy,
            shutdown.clone(),
        ));

        WorkerHandle {
            shared: self.shared,
            shutdown,
            task,
        }
    }
}

async fn run_loop(shared: Shared, interval: Duration, policy: BackoffPolicy, shutdown: Arc<Notify>) {
    let name = shared.cycle.name();
    let mut controller = RetryController::new(policy);
    info!("{name} worker started, running every {interval:?}");

    loop {
        {
            let _running = shared.running.lock().await;
            let cycle = shared.cycle.clone();
            let outcome = controller
                .run(name, || {
                    let cycle = cycle.clone();
                    async move { cycle.run().await }
                })
                .await;
            if let CycleOutcome::Completed(report) = outcome {
                debug!("{name} cycle completed: {report}");
            }
        }

        tokio::select! {
            _ = shutdown.notified() => break,
            _ = tokio::time::sleep(interval) => {}
        }
    }

    info!("{name} worker stopped");
}

/// Control surface of a running worker.
pub struct WorkerHandle {
    shared: Shared,
    shutdown: Arc<Notify>,
    task: JoinHandle<()>,
}

impl WorkerHandle {
    pub fn name(&self) -> &'static str {
        self.shared.cycle.name()
    }

    /// Run one cycle now. Waits for an in-flight scheduled cycle to finish
    /// first and leaves the timer untouched.
    pub async fn run_now(&self) -> Result<CycleReport, Error> {
        self.shared.run_now().await
    }

    /// Stop after the current cycle, if any, and wait for the loop to exit.
    pub async fn shutdown(self) {
        self.shutdown.notify_one();
        if let Err(e) = self.task.await {
            error!("{} worker ended abnormally: {e}", self.shared.cycle.name());
        }
    }
}

/// Bot status poller on its configured interval.
pub fn transcript_sync_worker(
    db: Arc<DatabaseConnection>,
    config: &Config,
) -> Result<Worker, Error> {
    let sync = TranscriptSync::from_config(db, config)?;
    Ok(Worker::new(
        Arc::new(sync),
        config.bot_poll_interval(),
        policy(config),
    ))
}

/// OAuth token refresher on its configured interval.
pub fn token_refresh_worker(db: Arc<DatabaseConnection>, config: &Config) -> Result<Worker, Error> {
    let refresher = TokenRefresher::from_config(db, config)?;
    Ok(Worker::new(
        Arc::new(refresher),
        config.token_refresh_interval(),
        policy(config),
    ))
}

fn policy(config: &Config) -> BackoffPolicy {
    BackoffPolicy::new(config.worker_backoff_base_delay(), config.worker_max_attempts)
}
