//! Bounded retry with linear backoff around one cycle.

use log::*;
use std::fmt;
use std::future::Future;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BackoffPolicy {
    pub base_delay: Duration,
    /// Total attempts per cycle, including the first.
    pub max_attempts: u32,
}

impl Default for BackoffPolicy {
    fn default() -> Self {
        Self {
            base_delay: Duration::from_secs(5),
            max_attempts: 3,
        }
    }
}

impl BackoffPolicy {
    pub fn new(base_delay: Duration, max_attempts: u32) -> Self {
        Self {
            base_delay,
            max_attempts: max_attempts.max(1),
        }
    }

    /// Wait before the next attempt after `failed_attempts` consecutive failures.
    pub fn delay_for(&self, failed_attempts: u32) -> Duration {
        self.base_delay * failed_attempts
    }
}

#[derive(Debug, PartialEq, Eq)]
pub enum CycleOutcome<T> {
    Completed(T),
    /// Every attempt failed; the cycle is dropped until the next interval.
    Abandoned { attempts: u32 },
}

/// Runs attempts of one cycle until one succeeds or the policy is exhausted.
///
/// Each attempt runs in its own task, so a panic is caught as a failed
/// attempt instead of taking the worker down.
#[derive(Debug)]
pub struct RetryController {
    policy: BackoffPolicy,
    attempt_count: u32,
}

impl RetryController {
    pub fn new(policy: BackoffPolicy) -> Self {
        Self {
            policy,
            attempt_count: 0,
        }
    }

    /// Attempts made by the cycle currently running; zero when idle.
    pub fn attempt_count(&self) -> u32 {
        self.attempt_count
    }

    pub async fn run<F, Fut, T, E>(&mut self, label: &str, mut attempt: F) -> CycleOutcome<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>> + Send + 'static,
        T: Send + 'static,
        E: fmt::Display + Send + 'static,
    {
        self.attempt_count = 0;

        loop {
            self.attempt_count += 1;

            let failure = match tokio::spawn(attempt()).await {
                Ok(Ok(value)) => {
                    self.attempt_count = 0;
                    return CycleOutcome::Completed(value);
                }
                Ok(Err(e)) => e.to_string(),
                Err(join_error) if join_error.is_panic() => "cycle panicked".to_string(),
                Err(join_error) => join_error.to_string(),
            };

            if self.attempt_count >= self.policy.max_attempts {
                let attempts = self.attempt_count;
                self.attempt_count = 0;
                error!("{label} cycle abandoned after {attempts} attempts: {failure}");
                return CycleOutcome::Abandoned { attempts };
            }

            let delay = self.policy.delay_for(self.attempt_count);
            warn!(
                "{label} cycle attempt {}/{} failed: {failure}; retrying in {delay:?}",
                self.attempt_count, self.policy.max_attempts
            );
            tokio::time::sleep(delay).await;
        }
    }
}
