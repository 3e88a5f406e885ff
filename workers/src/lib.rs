//! Periodic background workers.
//!
//! Each worker owns one [`Cycle`] and runs it on a fixed interval through a
//! [`backoff::RetryController`]. Cycles of the same worker never overlap, and
//! a manual run shares that guarantee.

pub mod backoff;
pub mod cycle;
pub mod worker;

pub use backoff::{BackoffPolicy, CycleOutcome, RetryController};
pub use cycle::Cycle;
pub use worker::{token_refresh_worker, transcript_sync_worker, Worker, WorkerHandle};
