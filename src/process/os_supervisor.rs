use std::io::ErrorKind;
use std::process::Stdio;

use async_trait::async_trait;
use dashmap::DashMap;
use tokio::process::Child;
use tokio::process::Command;
use tracing::debug;

use super::LaunchSpec;
use super::ProcessId;
use super::ProcessSupervisor;
use crate::FatalError;
use crate::ProcessError;
use crate::Result;

/// Supervises real OS child processes.
///
/// Children are spawned with `kill_on_drop`, so dropping the supervisor
/// never leaves database servers running behind a finished test.
#[derive(Debug, Default)]
pub struct OsProcessSupervisor {
    children: DashMap<ProcessId, Child>,
}

impl OsProcessSupervisor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of children started and not yet reaped
    pub fn tracked(&self) -> usize {
        self.children.len()
    }
}

#[async_trait]
impl ProcessSupervisor for OsProcessSupervisor {
    async fn start(
        &self,
        spec: &LaunchSpec,
    ) -> Result<ProcessId> {
        let child = Command::new(&spec.program)
            .args(&spec.args)
            .current_dir(&spec.working_dir)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| FatalError::Spawn {
                program: spec.program.clone(),
                source,
            })?;

        let pid = child.id().ok_or_else(|| FatalError::Spawn {
            program: spec.program.clone(),
            source: std::io::Error::new(ErrorKind::Other, "child exited before it could be tracked"),
        })?;

        self.children.insert(pid, child);
        Ok(pid)
    }

    async fn terminate(
        &self,
        pid: ProcessId,
    ) -> Result<()> {
        let mut child = self.children.get_mut(&pid).ok_or(ProcessError::UnknownProcess(pid))?;

        match child.start_kill() {
            Ok(()) => Ok(()),
            // already exited and reaped by tokio
            Err(e) if e.kind() == ErrorKind::InvalidInput => {
                debug!(pid, "process already exited");
                Ok(())
            }
            Err(source) => Err(ProcessError::Signal { pid, source }.into()),
        }
    }

    async fn wait(
        &self,
        pid: ProcessId,
    ) -> Result<()> {
        let (_, mut child) = self.children.remove(&pid).ok_or(ProcessError::UnknownProcess(pid))?;

        let status = child.wait().await.map_err(|source| ProcessError::Wait { pid, source })?;
        debug!(pid, %status, "process reaped");
        Ok(())
    }
}
