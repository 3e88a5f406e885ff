use serde::Serialize;
use std::fmt;

/// Outcome counts for one worker cycle.
///
/// `succeeded` counts every candidate handled without error, including
/// candidates that needed no change.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CycleReport {
    pub candidates: usize,
    pub succeeded: usize,
    pub failed: usize,
}

impl CycleReport {
    pub fn new(candidates: usize) -> Self {
        Self {
            candidates,
            ..Self::default()
        }
    }

    pub(crate) fn record<T, E>(&mut self, outcome: &Result<T, E>) {
        match outcome {
            Ok(_) => self.succeeded += 1,
            Err(_) => self.failed += 1,
        }
    }
}

impl fmt::Display for CycleReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "candidates={} succeeded={} failed={}",
            self.candidates, self.succeeded, self.failed
        )
    }
}
