//! Fixed-cadence retry loop shared by `configure` and `wait_for_healthy`.
//!
//! Each pause either elapses, hits the policy deadline, or is interrupted by
//! the harness cancellation token, whichever comes first.

use std::time::Duration;

use tokio::time::sleep;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::ConvergenceError;
use crate::Result;
use crate::RetryPolicy;

pub struct RetryLoop {
    operation: &'static str,
    interval: Duration,
    deadline: Option<Duration>,
    started: Instant,
    cancel: CancellationToken,
    pauses: u64,
}

impl RetryLoop {
    pub fn new(
        operation: &'static str,
        policy: &RetryPolicy,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            operation,
            interval: policy.interval(),
            deadline: policy.deadline(),
            started: Instant::now(),
            cancel,
            pauses: 0,
        }
    }

    pub fn operation(&self) -> &'static str {
        self.operation
    }

    /// Completed pauses so far
    pub fn pauses(&self) -> u64 {
        self.pauses
    }

    fn remaining(&self) -> Option<Duration> {
        self.deadline.map(|d| d.saturating_sub(self.started.elapsed()))
    }

    fn timed_out(&self) -> crate::Error {
        ConvergenceError::TimedOut {
            operation: self.operation,
            elapsed: self.started.elapsed(),
        }
        .into()
    }

    /// Waits one interval, never sleeping past the deadline.
    ///
    /// A pause that ends exactly at the deadline still succeeds, so the
    /// caller gets a last attempt; the pause after it reports `TimedOut`.
    pub async fn pause(&mut self) -> Result<()> {
        if self.cancel.is_cancelled() {
            return Err(ConvergenceError::Cancelled {
                operation: self.operation,
            }
            .into());
        }

        let wait = match self.remaining() {
            Some(left) if left.is_zero() => return Err(self.timed_out()),
            Some(left) => left.min(self.interval),
            None => self.interval,
        };

        tokio::select! {
            _ = self.cancel.cancelled() => {
                return Err(ConvergenceError::Cancelled { operation: self.operation }.into());
            }
            _ = sleep(wait) => {}
        }
        self.pauses += 1;
        Ok(())
    }
}
