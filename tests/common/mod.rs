//! In-memory stand-ins for database-server processes and their admin endpoint.
//!
//! [`FakeSupervisor`] records launches; [`SimulatedDeployment`] answers
//! administrative commands the way a real replica set would, based on which
//! ports currently have a running process.

use std::collections::BTreeMap;
use std::collections::HashMap;
use std::io::ErrorKind;
use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use ha_harness::AdminClient;
use ha_harness::ClientError;
use ha_harness::FatalError;
use ha_harness::HarnessBuilder;
use ha_harness::HarnessConfig;
use ha_harness::HarnessContext;
use ha_harness::LaunchSpec;
use ha_harness::PortAllocator;
use ha_harness::ProcessError;
use ha_harness::ProcessId;
use ha_harness::ProcessSupervisor;
use ha_harness::Result;
use parking_lot::Mutex;
use serde_json::json;
use serde_json::Value;

pub const SEED: u64 = 7;

pub const NOT_REACHABLE: &str = "(not reachable/healthy)";

pub fn config(root: &Path) -> HarnessConfig {
    let mut config = HarnessConfig::default();
    config.workspace.root_dir = root.to_path_buf();
    config.timing.settle_delay_ms = 100;
    config
}

#[derive(Default)]
struct SupervisorState {
    next_pid: ProcessId,
    running: BTreeMap<ProcessId, LaunchSpec>,
    launches: Vec<LaunchSpec>,
}

#[derive(Default)]
pub struct FakeSupervisor {
    state: Mutex<SupervisorState>,
}

impl FakeSupervisor {
    pub fn launches(&self) -> Vec<LaunchSpec> {
        self.state.lock().launches.clone()
    }

    pub fn running_ports(&self) -> Vec<u16> {
        self.state
            .lock()
            .running
            .values()
            .filter_map(|spec| spec.arg_value("--port")?.parse().ok())
            .collect()
    }

    fn is_listening(
        &self,
        port: u16,
    ) -> bool {
        self.running_ports().contains(&port)
    }
}

#[async_trait]
impl ProcessSupervisor for FakeSupervisor {
    async fn start(
        &self,
        spec: &LaunchSpec,
    ) -> Result<ProcessId> {
        if !spec.working_dir.is_dir() {
            return Err(FatalError::Spawn {
                program: spec.program.clone(),
                source: std::io::Error::new(ErrorKind::NotFound, "working directory missing"),
            }
            .into());
        }
        let mut state = self.state.lock();
        state.next_pid += 1;
        let pid = 2000 + state.next_pid;
        state.running.insert(pid, spec.clone());
        state.launches.push(spec.clone());
        Ok(pid)
    }

    async fn terminate(
        &self,
        pid: ProcessId,
    ) -> Result<()> {
        if self.state.lock().running.contains_key(&pid) {
            Ok(())
        } else {
            Err(ProcessError::UnknownProcess(pid).into())
        }
    }

    async fn wait(
        &self,
        pid: ProcessId,
    ) -> Result<()> {
        self.state.lock().running.remove(&pid).ok_or(ProcessError::UnknownProcess(pid))?;
        Ok(())
    }
}

#[derive(Debug, Clone)]
struct InitiatedMember {
    port: u16,
    arbiter: bool,
}

/// Answers `replSetInitiate` and `replSetGetStatus` for every replica set
/// running on a [`FakeSupervisor`].
pub struct SimulatedDeployment {
    supervisor: Arc<FakeSupervisor>,
    replica_sets: Mutex<HashMap<String, Vec<InitiatedMember>>>,
    commands: Mutex<Vec<(SocketAddr, Value)>>,
}

impl SimulatedDeployment {
    pub fn new(supervisor: Arc<FakeSupervisor>) -> Self {
        Self {
            supervisor,
            replica_sets: Mutex::new(HashMap::new()),
            commands: Mutex::new(Vec::new()),
        }
    }

    pub fn commands_named(
        &self,
        name: &str,
    ) -> Vec<(SocketAddr, Value)> {
        self.commands
            .lock()
            .iter()
            .filter(|(_, cmd)| cmd.get(name).is_some())
            .cloned()
            .collect()
    }

    fn initiate(
        &self,
        config: &Value,
    ) -> Value {
        let name = config["_id"].as_str().unwrap_or_default().to_string();
        let members = config["members"]
            .as_array()
            .into_iter()
            .flatten()
            .filter_map(|m| {
                let host = m["host"].as_str()?;
                let port = host.rsplit(':').next()?.parse().ok()?;
                Some(InitiatedMember {
                    port,
                    arbiter: m["arbiterOnly"].as_bool().unwrap_or(false),
                })
            })
            .collect();
        self.replica_sets.lock().insert(name, members);
        json!({ "ok": 1 })
    }

    fn status(
        &self,
        port: u16,
    ) -> Value {
        let replica_sets = self.replica_sets.lock();
        let Some((name, members)) = replica_sets.iter().find(|(_, ms)| ms.iter().any(|m| m.port == port)) else {
            return json!({ "ok": 0, "errmsg": "no replset config has been received", "code": 94 });
        };

        let primary = members.iter().find(|m| !m.arbiter && self.supervisor.is_listening(m.port)).map(|m| m.port);
        let members: Vec<Value> = members
            .iter()
            .enumerate()
            .map(|(i, m)| {
                let state = if !self.supervisor.is_listening(m.port) {
                    NOT_REACHABLE
                } else if m.arbiter {
                    "ARBITER"
                } else if Some(m.port) == primary {
                    "PRIMARY"
                } else {
                    "SECONDARY"
                };
                json!({ "_id": i, "name": format!("127.0.0.1:{}", m.port), "stateStr": state })
            })
            .collect();
        json!({ "set": name, "members": members, "ok": 1 })
    }
}

#[async_trait]
impl AdminClient for SimulatedDeployment {
    async fn run_command(
        &self,
        addr: SocketAddr,
        command: &Value,
        _secondary_ok: bool,
    ) -> Result<Value> {
        self.commands.lock().push((addr, command.clone()));

        if !self.supervisor.is_listening(addr.port()) {
            return Err(ClientError::Unreachable {
                addr: addr.to_string(),
                reason: "connection refused".to_string(),
            }
            .into());
        }

        if let Some(config) = command.get("replSetInitiate") {
            return Ok(self.initiate(config));
        }
        if command.get("replSetGetStatus").is_some() {
            return Ok(self.status(addr.port()));
        }
        Ok(json!({ "ok": 0, "errmsg": "no such command" }))
    }
}

pub struct Harness {
    pub ctx: HarnessContext,
    pub supervisor: Arc<FakeSupervisor>,
    pub deployment: Arc<SimulatedDeployment>,
}

pub fn simulated_harness(root: &Path) -> Harness {
    let supervisor = Arc::new(FakeSupervisor::default());
    let deployment = Arc::new(SimulatedDeployment::new(supervisor.clone()));
    let ctx = HarnessBuilder::new(config(root), deployment.clone())
        .supervisor(supervisor.clone())
        .port_allocator(Arc::new(PortAllocator::seeded(SEED)))
        .build()
        .expect("default config is valid");
    Harness {
        ctx,
        supervisor,
        deployment,
    }
}

pub fn states(reply: &Value) -> Vec<String> {
    reply["members"]
        .as_array()
        .into_iter()
        .flatten()
        .filter_map(|m| m["stateStr"].as_str().map(str::to_string))
        .collect()
}
