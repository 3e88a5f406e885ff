use async_trait::async_trait;
use domain::error::Error;
use domain::token_refresh::TokenRefresher;
use domain::transcript_sync::TranscriptSync;
use domain::CycleReport;

/// One unit of periodic work.
///
/// An `Err` means the whole cycle failed (for example storage was
/// unreachable) and is retried with backoff. Per-item failures belong in the
/// returned report instead.
#[async_trait]
pub trait Cycle: Send + Sync + 'static {
    fn name(&self) -> &'static str;

    async fn run(&self) -> Result<CycleReport, Error>;
}

#[async_trait]
impl Cycle for TranscriptSync {
    fn name(&self) -> &'static str {
        "transcript_sync"
    }

    async fn run(&self) -> Result<CycleReport, Error> {
        self.run_cycle().await
    }
}

#[async_trait]
impl Cycle for TokenRefresher {
    fn name(&self) -> &'static str {
        "token_refresh"
    }

    async fn run(&self) -> Result<CycleReport, Error> {
        self.run_cycle().await
    }
}
