use std::time::Duration;

use serde::Deserialize;
use serde::Serialize;

use crate::Error;
use crate::Result;

/// Fixed-cadence retry policy for convergence loops
#[derive(Debug, Serialize, Deserialize, Clone, Copy)]
pub struct RetryPolicy {
    /// Pause between two attempts (unit: milliseconds)
    #[serde(default = "default_interval_ms")]
    pub interval_ms: u64,

    /// Overall deadline (unit: milliseconds, 0 means wait forever)
    #[serde(default)]
    pub timeout_ms: u64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            interval_ms: default_interval_ms(),
            timeout_ms: 0,
        }
    }
}

impl RetryPolicy {
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }

    /// `None` when the policy never gives up.
    pub fn deadline(&self) -> Option<Duration> {
        (self.timeout_ms > 0).then(|| Duration::from_millis(self.timeout_ms))
    }

    fn validate(
        &self,
        name: &str,
    ) -> Result<()> {
        if self.interval_ms == 0 {
            return Err(Error::InvalidConfig(format!(
                "timing.{name}.interval_ms must be greater than 0"
            )));
        }
        if self.timeout_ms > 0 && self.timeout_ms < self.interval_ms {
            return Err(Error::InvalidConfig(format!(
                "timing.{name}.timeout_ms ({}) must be 0 or at least interval_ms ({})",
                self.timeout_ms, self.interval_ms
            )));
        }
        Ok(())
    }
}

/// Delays and retry policies, divided by orchestration step
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct TimingConfig {
    /// Pause after spawning a replica set before the first administrative command
    #[serde(default = "default_settle_delay_ms")]
    pub settle_delay_ms: u64,

    /// Replication-initiate command
    #[serde(default)]
    pub configure: RetryPolicy,

    /// Replication-status polling
    #[serde(default)]
    pub healthcheck: RetryPolicy,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            settle_delay_ms: default_settle_delay_ms(),
            configure: RetryPolicy::default(),
            healthcheck: RetryPolicy::default(),
        }
    }
}

impl TimingConfig {
    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_delay_ms)
    }

    pub fn validate(&self) -> Result<()> {
        self.configure.validate("configure")?;
        self.healthcheck.validate("healthcheck")?;
        Ok(())
    }
}

fn default_interval_ms() -> u64 {
    1000
}
fn default_settle_delay_ms() -> u64 {
    2000
}
