//! Replica Set Controller
//!
//! Owns an ordered list of member [`Node`]s (insertion order is member index
//! order), starts them, issues the one-time `replSetInitiate` against the
//! primary candidate, and polls `replSetGetStatus` until every member has
//! settled.

use std::path::Path;
use std::path::PathBuf;

use serde_json::Value;
use tracing::debug;
use tracing::info;
use tracing::instrument;
use tracing::warn;

use super::kill_all;
use crate::client::commands::repl_set_get_status;
use crate::client::commands::reply_ok;
use crate::constants::CMD_REPL_SET_INITIATE;
use crate::constants::OP_CONFIGURE;
use crate::constants::OP_WAIT_FOR_HEALTHY;
use crate::metrics::CONVERGENCE_RETRIES;
use crate::utils::file_io;
use crate::utils::net;
use crate::ClientError;
use crate::FatalError;
use crate::HarnessContext;
use crate::MemberConfig;
use crate::Node;
use crate::PortCounter;
use crate::PortRange;
use crate::ReplSetConfig;
use crate::ReplSetInitiate;
use crate::ReplSetStatus;
use crate::Result;
use crate::TopologyError;

pub struct ReplicaSet {
    name: String,
    root: PathBuf,
    members: Vec<Node>,
    ports: PortCounter,
    ctx: HarnessContext,
}

impl std::fmt::Debug for ReplicaSet {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        f.debug_struct("ReplicaSet")
            .field("name", &self.name)
            .field("root", &self.root)
            .field("members", &self.members)
            .finish()
    }
}

impl ReplicaSet {
    /// Stand-alone replica set, base port drawn from `ports.replica_set`
    pub fn new(
        name: &str,
        ctx: &HarnessContext,
    ) -> Self {
        Self::with_port_range(name, ctx, ctx.settings.ports.replica_set)
    }

    /// Replica set meant to be attached to a sharded cluster,
    /// base port drawn from `ports.shard`
    pub fn new_shard(
        name: &str,
        ctx: &HarnessContext,
    ) -> Self {
        Self::with_port_range(name, ctx, ctx.settings.ports.shard)
    }

    fn with_port_range(
        name: &str,
        ctx: &HarnessContext,
        range: PortRange,
    ) -> Self {
        let ports = ctx.ports.counter(range);
        debug!(replica_set = name, base_port = ?ports.peek(), "new replica set");
        Self {
            name: name.to_string(),
            root: ctx.settings.workspace.root_dir.join(name),
            members: Vec::new(),
            ports,
            ctx: ctx.clone(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// On-disk root, wiped and recreated by every `start()`
    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn members(&self) -> &[Node] {
        &self.members
    }

    pub fn member(
        &self,
        name: &str,
    ) -> Option<&Node> {
        self.members.iter().find(|n| n.name() == name)
    }

    pub fn member_mut(
        &mut self,
        name: &str,
    ) -> Option<&mut Node> {
        self.members.iter_mut().find(|n| n.name() == name)
    }

    /// Appends a member on the next sequential port
    pub fn add_member(
        &mut self,
        name: &str,
        is_arbiter: bool,
    ) -> Result<&mut Node> {
        if self.member(name).is_some() {
            return Err(TopologyError::DuplicateMember { name: name.to_string() }.into());
        }

        let port = self.ports.next_port()?;
        let node = Node::member(name, &self.name, self.root.join(name), port, is_arbiter, &self.ctx);
        debug!(replica_set = %self.name, ?node, "added member");

        let index = self.members.len();
        self.members.push(node);
        Ok(&mut self.members[index])
    }

    pub fn add_replica(
        &mut self,
        name: &str,
    ) -> Result<&mut Node> {
        self.add_member(name, false)
    }

    pub fn add_arbiter(
        &mut self,
        name: &str,
    ) -> Result<&mut Node> {
        self.add_member(name, true)
    }

    /// Discovery string for a topology-aware client connection
    pub fn connection_string(&self) -> String {
        net::connection_string(self.members.iter().map(Node::addr), &self.name)
    }

    /// First non-arbiter member in insertion order
    pub fn primary_candidate(&self) -> Result<&Node> {
        let index = self.primary_index()?;
        Ok(&self.members[index])
    }

    fn primary_index(&self) -> Result<usize> {
        self.members.iter().position(|n| !n.is_arbiter()).ok_or_else(|| {
            FatalError::NoPrimaryCandidate {
                replica_set: self.name.clone(),
            }
            .into()
        })
    }

    /// `replSetInitiate` document: one entry per member, `_id` = member index
    pub fn initiate_command(&self) -> Result<Value> {
        let bind_ip = self.ctx.settings.process.bind_ip;
        let members = self
            .members
            .iter()
            .enumerate()
            .map(|(i, node)| MemberConfig {
                id: i,
                host: net::host_string(bind_ip, node.port()),
                arbiter_only: node.is_arbiter(),
            })
            .collect();

        ReplSetInitiate::new(ReplSetConfig {
            id: self.name.clone(),
            members,
        })
        .to_command()
    }

    /// Fresh workspace, every member set up and (re)started in insertion
    /// order, a settle pause, then the one-time replication initiate.
    #[instrument(skip(self), fields(replica_set = %self.name))]
    pub async fn start(&mut self) -> Result<()> {
        let primary = self.primary_index()?;

        file_io::recreate_root_dir(&self.root, self.ctx.settings.process.workspace_mode).await?;

        for node in self.members.iter_mut() {
            node.setup().await?;
            node.restart().await?;
        }

        tokio::time::sleep(self.ctx.settings.timing.settle_delay()).await;

        self.configure(&self.members[primary]).await
    }

    /// Sends `replSetInitiate` to `primary` until it is acknowledged.
    ///
    /// Transport failures and falsy `ok` replies are retried on the
    /// `timing.configure` cadence; the loop ends only on success, the policy
    /// deadline, or cancellation.
    pub async fn configure(
        &self,
        primary: &Node,
    ) -> Result<()> {
        let command = self.initiate_command()?;
        debug!("Config: {}", command);

        let policy = &self.ctx.settings.timing.configure;
        let mut retry = self.ctx.retry_loop(OP_CONFIGURE, policy);
        let addr = primary.addr();

        loop {
            match self.ctx.client.run_command(addr, &command, false).await {
                Ok(reply) if reply_ok(&reply) => {
                    debug!("Reply: {}", reply);
                    info!(replica_set = %self.name, %addr, "replica set initiated");
                    return Ok(());
                }
                Ok(reply) => {
                    let e = ClientError::CommandFailed {
                        command: CMD_REPL_SET_INITIATE,
                        addr: addr.to_string(),
                        reply: reply.to_string(),
                    };
                    warn!("{}: Retrying in {:?}.", e, policy.interval());
                }
                Err(e) if e.is_transient() => {
                    warn!("{}: Retrying in {:?}.", e, policy.interval());
                }
                Err(e) => return Err(e),
            }

            CONVERGENCE_RETRIES.with_label_values(&[OP_CONFIGURE]).inc();
            retry.pause().await?;
        }
    }

    /// Asks members in insertion order; the first one that answers
    /// successfully wins. A reply with a falsy `ok` counts as no answer.
    /// `None` when nobody answered this round.
    pub async fn status(&self) -> Option<Value> {
        let command = repl_set_get_status();

        for node in &self.members {
            match self.ctx.client.run_command(node.addr(), &command, true).await {
                Ok(reply) if reply_ok(&reply) => return Some(reply),
                Ok(reply) => debug!(node = node.name(), "status query rejected: {}", reply),
                Err(e) => debug!(node = node.name(), "status query failed: {}", e),
            }
        }
        None
    }

    /// Polls replication status until every reported member is PRIMARY,
    /// SECONDARY or ARBITER.
    ///
    /// With the default policy there is no deadline: a member that can never
    /// report again keeps this call waiting until the harness is cancelled.
    #[instrument(skip(self), fields(replica_set = %self.name))]
    pub async fn wait_for_healthy(&self) -> Result<()> {
        let policy = &self.ctx.settings.timing.healthcheck;
        let mut retry = self.ctx.retry_loop(OP_WAIT_FOR_HEALTHY, policy);

        loop {
            retry.pause().await?;

            let Some(reply) = self.status().await else {
                info!("Failed to get replicaSet status. Sleeping {:?}.", policy.interval());
                CONVERGENCE_RETRIES.with_label_values(&[OP_WAIT_FOR_HEALTHY]).inc();
                continue;
            };

            match ReplSetStatus::from_reply(&reply) {
                Ok(status) if status.is_healthy() => {
                    info!(states = ?status.states(), "replica set healthy");
                    return Ok(());
                }
                Ok(status) => {
                    info!(
                        unhealthy = ?status.unhealthy_members(),
                        "Found unhealthy node. Sleeping {:?}.",
                        policy.interval()
                    );
                }
                Err(e) => {
                    info!("ReplicaSet has not yet come online ({}). Sleeping {:?}.", e, policy.interval());
                }
            }
            CONVERGENCE_RETRIES.with_label_values(&[OP_WAIT_FOR_HEALTHY]).inc();
        }
    }

    /// Kills every member. Workspaces stay on disk.
    pub async fn shutdown(&mut self) -> Result<()> {
        kill_all(self.members.iter_mut()).await
    }

    pub async fn destroy(mut self) -> Result<()> {
        self.shutdown().await?;
        self.members.clear();
        Ok(())
    }
}
