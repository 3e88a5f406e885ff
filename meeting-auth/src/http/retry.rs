//! Retry policy for transient HTTP failures (5xx, 408, 429, connect errors).

use std::time::{Duration, SystemTime};

use reqwest_retry::{RetryDecision, RetryPolicy};

/// Doubling backoff that gives up once the next attempt could no longer
/// finish inside the caller's overall time budget.
#[derive(Debug, Clone)]
pub struct TransientRetryPolicy {
    max_retries: u32,
    base_delay: Duration,
    max_delay: Duration,
    budget: Option<Duration>,
}

impl TransientRetryPolicy {
    pub fn new(max_retries: u32) -> Self {
        Self {
            max_retries,
            base_delay: Duration::from_millis(500),
            max_delay: Duration::from_secs(10),
            budget: None,
        }
    }

    /// Stop retrying when `elapsed + next delay` would exceed `budget`.
    pub fn with_budget(mut self, budget: Duration) -> Self {
        self.budget = Some(budget);
        self
    }

    fn delay_for(&self, n_past_retries: u32) -> Duration {
        let factor = 2u32.saturating_pow(n_past_retries);
        self.base_delay
            .checked_mul(factor)
            .map_or(self.max_delay, |d| d.min(self.max_delay))
    }

    fn fits_budget(&self, started: SystemTime, now: SystemTime, delay: Duration) -> bool {
        match self.budget {
            None => true,
            Some(budget) => {
                let elapsed = now.duration_since(started).unwrap_or_default();
                elapsed + delay < budget
            }
        }
    }
}

impl RetryPolicy for TransientRetryPolicy {
    fn should_retry(&self, request_start_time: SystemTime, n_past_retries: u32) -> RetryDecision {
        if n_past_retries >= self.max_retries {
            return RetryDecision::DoNotRetry;
        }

        let now = SystemTime::now();
        let delay = self.delay_for(n_past_retries);
        if !self.fits_budget(request_start_time, now, delay) {
            return RetryDecision::DoNotRetry;
        }

        RetryDecision::Retry {
            execute_after: now + delay,
        }
    }
}
