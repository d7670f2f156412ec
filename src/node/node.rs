//! One database-server process and its on-disk workspace.
//!
//! ## Lifecycle
//! - `setup()`: creates the workspace directory (fatal on failure)
//! - `restart()`: kills any running process, clears a stale lock, spawns a new one
//! - `kill()`: SIGKILL + reap; a no-op when nothing is running
//! - `destroy()`: kill, then release the node
//!
//! A node's process id is present iff its process is known to be running.

use std::net::SocketAddr;
use std::path::Path;
use std::path::PathBuf;
use std::sync::Arc;

use tracing::debug;
use tracing::info;

use crate::constants::DBPATH_IN_WORKSPACE;
use crate::constants::FLAG_BIND_IP;
use crate::constants::FLAG_CONFIG_SERVER;
use crate::constants::FLAG_DBPATH;
use crate::constants::FLAG_NO_HTTP_INTERFACE;
use crate::constants::FLAG_NO_JOURNAL;
use crate::constants::FLAG_NO_PREALLOC;
use crate::constants::FLAG_PORT;
use crate::constants::FLAG_REPL_SET;
use crate::metrics::PROCESS_KILLS;
use crate::metrics::PROCESS_SPAWNS;
use crate::utils::file_io;
use crate::Error;
use crate::HarnessConfig;
use crate::HarnessContext;
use crate::LaunchSpec;
use crate::ProcessError;
use crate::ProcessId;
use crate::ProcessSupervisor;
use crate::Result;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeRole {
    /// Data-bearing replica-set member
    Replica,
    /// Votes in elections, holds no data
    Arbiter,
    /// Stores sharded-cluster routing metadata
    ConfigServer,
}

impl NodeRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            NodeRole::Replica => "replica",
            NodeRole::Arbiter => "arbiter",
            NodeRole::ConfigServer => "config_server",
        }
    }
}

pub struct Node {
    name: String,
    replica_set: Option<String>,
    workspace: PathBuf,
    port: u16,
    role: NodeRole,
    pid: Option<ProcessId>,

    settings: Arc<HarnessConfig>,
    supervisor: Arc<dyn ProcessSupervisor>,
}

impl std::fmt::Debug for Node {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        f.debug_struct("Node")
            .field("name", &self.name)
            .field("replica_set", &self.replica_set)
            .field("port", &self.port)
            .field("role", &self.role)
            .field("pid", &self.pid)
            .finish()
    }
}

impl Node {
    /// Replica-set member (data-bearing or arbiter)
    pub(crate) fn member(
        name: &str,
        replica_set: &str,
        workspace: PathBuf,
        port: u16,
        is_arbiter: bool,
        ctx: &HarnessContext,
    ) -> Self {
        let role = if is_arbiter {
            NodeRole::Arbiter
        } else {
            NodeRole::Replica
        };
        Self::new(name, Some(replica_set.to_string()), workspace, port, role, ctx)
    }

    /// Sharded-cluster configuration server, not part of any replica set
    pub(crate) fn config_server(
        name: &str,
        workspace: PathBuf,
        port: u16,
        ctx: &HarnessContext,
    ) -> Self {
        Self::new(name, None, workspace, port, NodeRole::ConfigServer, ctx)
    }

    fn new(
        name: &str,
        replica_set: Option<String>,
        workspace: PathBuf,
        port: u16,
        role: NodeRole,
        ctx: &HarnessContext,
    ) -> Self {
        Self {
            name: name.to_string(),
            replica_set,
            workspace,
            port,
            role,
            pid: None,
            settings: ctx.settings.clone(),
            supervisor: ctx.supervisor.clone(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn replica_set(&self) -> Option<&str> {
        self.replica_set.as_deref()
    }

    pub fn workspace(&self) -> &Path {
        &self.workspace
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn role(&self) -> NodeRole {
        self.role
    }

    pub fn is_arbiter(&self) -> bool {
        self.role == NodeRole::Arbiter
    }

    pub fn is_config_server(&self) -> bool {
        self.role == NodeRole::ConfigServer
    }

    pub fn pid(&self) -> Option<ProcessId> {
        self.pid
    }

    pub fn is_running(&self) -> bool {
        self.pid.is_some()
    }

    /// Loopback endpoint the node listens on
    pub fn addr(&self) -> SocketAddr {
        SocketAddr::new(self.settings.process.bind_ip, self.port)
    }

    /// Baseline flags, then exactly one role flag
    pub fn launch_spec(&self) -> LaunchSpec {
        let process = &self.settings.process;
        let mut args = vec![
            FLAG_DBPATH.to_string(),
            DBPATH_IN_WORKSPACE.to_string(),
            FLAG_PORT.to_string(),
            self.port.to_string(),
            FLAG_NO_JOURNAL.to_string(),
            FLAG_NO_PREALLOC.to_string(),
        ];
        args.extend(process.extra_args.iter().cloned());
        args.push(FLAG_NO_HTTP_INTERFACE.to_string());
        args.push(FLAG_BIND_IP.to_string());
        args.push(process.bind_ip.to_string());

        match (&self.role, &self.replica_set) {
            (NodeRole::ConfigServer, _) | (_, None) => args.push(FLAG_CONFIG_SERVER.to_string()),
            (_, Some(replica_set)) => {
                args.push(FLAG_REPL_SET.to_string());
                args.push(replica_set.clone());
            }
        }

        LaunchSpec {
            program: process.binary.clone(),
            args,
            working_dir: self.workspace.clone(),
        }
    }

    /// Creates the workspace directory. The parent must exist and the
    /// workspace itself must not.
    pub async fn setup(&self) -> Result<()> {
        file_io::create_workspace_dir(&self.workspace, self.settings.process.workspace_mode).await
    }

    pub async fn start(&mut self) -> Result<()> {
        self.restart().await
    }

    /// (Re)launches the process. Any previous process is killed and reaped first.
    pub async fn restart(&mut self) -> Result<()> {
        self.kill().await?;

        file_io::remove_stale_lock(&self.workspace, &self.settings.process.lock_file).await?;

        let spec = self.launch_spec();
        let pid = self.supervisor.start(&spec).await?;
        PROCESS_SPAWNS.with_label_values(&[self.role.as_str()]).inc();
        info!("[{}]: {}", pid, spec.command_line());

        self.pid = Some(pid);
        Ok(())
    }

    /// Forceful termination followed by a blocking reap.
    ///
    /// If the signal cannot be delivered the id is kept: the process may
    /// still hold its port, and a later `kill` retries. An id the supervisor
    /// no longer tracks is cleared, since there is nothing left to reap.
    pub async fn kill(&mut self) -> Result<()> {
        let Some(pid) = self.pid else {
            return Ok(());
        };

        if let Err(e) = self.supervisor.terminate(pid).await {
            if matches!(e, Error::Process(ProcessError::UnknownProcess(_))) {
                self.pid = None;
            }
            return Err(e);
        }

        self.pid = None;
        self.supervisor.wait(pid).await?;
        PROCESS_KILLS.with_label_values(&[self.role.as_str()]).inc();
        debug!(node = %self.name, pid, "killed");
        Ok(())
    }

    pub async fn destroy(mut self) -> Result<()> {
        self.kill().await
    }
}
