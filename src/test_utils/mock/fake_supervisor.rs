use std::collections::BTreeMap;
use std::collections::BTreeSet;
use std::io::ErrorKind;

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::FatalError;
use crate::LaunchSpec;
use crate::ProcessError;
use crate::ProcessId;
use crate::ProcessSupervisor;
use crate::Result;

#[derive(Default)]
struct FakeState {
    next_pid: ProcessId,
    running: BTreeMap<ProcessId, LaunchSpec>,
    launches: Vec<LaunchSpec>,
    terminated: Vec<ProcessId>,
    reaped: Vec<ProcessId>,
    fail_spawns: bool,
    fail_next_signal: BTreeSet<ProcessId>,
}

/// In-memory supervisor that records every launch.
///
/// Like a real spawn, `start` fails when the working directory is missing.
#[derive(Default)]
pub struct FakeSupervisor {
    state: Mutex<FakeState>,
}

impl FakeSupervisor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_spawns(&self) {
        self.state.lock().fail_spawns = true;
    }

    /// The next `terminate(pid)` fails with a signal error; later ones succeed
    pub fn fail_next_signal(
        &self,
        pid: ProcessId,
    ) {
        self.state.lock().fail_next_signal.insert(pid);
    }

    pub fn launches(&self) -> Vec<LaunchSpec> {
        self.state.lock().launches.clone()
    }

    pub fn running(&self) -> Vec<LaunchSpec> {
        self.state.lock().running.values().cloned().collect()
    }

    pub fn is_running(
        &self,
        pid: ProcessId,
    ) -> bool {
        self.state.lock().running.contains_key(&pid)
    }

    pub fn terminated(&self) -> Vec<ProcessId> {
        self.state.lock().terminated.clone()
    }

    pub fn reaped(&self) -> Vec<ProcessId> {
        self.state.lock().reaped.clone()
    }
}

#[async_trait]
impl ProcessSupervisor for FakeSupervisor {
    async fn start(
        &self,
        spec: &LaunchSpec,
    ) -> Result<ProcessId> {
        let mut state = self.state.lock();
        if state.fail_spawns || !spec.working_dir.is_dir() {
            return Err(FatalError::Spawn {
                program: spec.program.clone(),
                source: std::io::Error::new(ErrorKind::NotFound, "fake spawn failure"),
            }
            .into());
        }

        state.next_pid += 1;
        let pid = 1000 + state.next_pid;
        state.running.insert(pid, spec.clone());
        state.launches.push(spec.clone());
        Ok(pid)
    }

    async fn terminate(
        &self,
        pid: ProcessId,
    ) -> Result<()> {
        let mut state = self.state.lock();
        if !state.running.contains_key(&pid) {
            return Err(ProcessError::UnknownProcess(pid).into());
        }
        if state.fail_next_signal.remove(&pid) {
            return Err(ProcessError::Signal {
                pid,
                source: std::io::Error::new(ErrorKind::PermissionDenied, "fake signal failure"),
            }
            .into());
        }
        state.terminated.push(pid);
        Ok(())
    }

    async fn wait(
        &self,
        pid: ProcessId,
    ) -> Result<()> {
        let mut state = self.state.lock();
        state.running.remove(&pid).ok_or(ProcessError::UnknownProcess(pid))?;
        state.reaped.push(pid);
        Ok(())
    }
}
