use std::path::PathBuf;

use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;

use crate::Result;

/// Identifier the supervisor hands back for a started process
pub type ProcessId = u32;

/// Everything needed to launch one database-server process
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchSpec {
    pub program: String,
    pub args: Vec<String>,
    /// Child's working directory
    pub working_dir: PathBuf,
}

impl LaunchSpec {
    /// Space-separated argv, for logs
    pub fn command_line(&self) -> String {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Value following `flag` in the argument list
    pub fn arg_value(
        &self,
        flag: &str,
    ) -> Option<&str> {
        self.args
            .iter()
            .position(|a| a == flag)
            .and_then(|i| self.args.get(i + 1))
            .map(String::as_str)
    }

    pub fn has_flag(
        &self,
        flag: &str,
    ) -> bool {
        self.args.iter().any(|a| a == flag)
    }
}

#[cfg_attr(test, automock)]
#[async_trait]
pub trait ProcessSupervisor: Send + Sync + 'static {
    /// Launches a process with standard streams detached from the harness.
    /// Failure is fatal.
    async fn start(
        &self,
        spec: &LaunchSpec,
    ) -> Result<ProcessId>;

    /// Delivers a forceful termination signal. Does not reap.
    async fn terminate(
        &self,
        pid: ProcessId,
    ) -> Result<()>;

    /// Blocks until the process is reaped and forgets it.
    async fn wait(
        &self,
        pid: ProcessId,
    ) -> Result<()>;
}
