//! Sharded Cluster Controller
//!
//! Composes already-built [`ReplicaSet`] shards with a pool of
//! configuration-server [`Node`]s and drives their lifecycle together.

use std::path::Path;
use std::path::PathBuf;

use tracing::debug;
use tracing::info;
use tracing::instrument;

use super::kill_all;
use crate::utils::file_io;
use crate::HarnessContext;
use crate::Node;
use crate::PortCounter;
use crate::ReplicaSet;
use crate::Result;
use crate::TopologyError;

#[derive(Debug)]
pub struct ShardedCluster {
    name: String,
    root: PathBuf,
    capacity: usize,
    shards: Vec<ReplicaSet>,
    config_servers: Vec<Node>,
    ports: PortCounter,
    ctx: HarnessContext,
}

impl ShardedCluster {
    pub fn new(
        name: &str,
        ctx: &HarnessContext,
    ) -> Self {
        let ports = ctx.ports.counter(ctx.settings.ports.config_server);
        debug!(cluster = name, base_port = ?ports.peek(), "new sharded cluster");
        Self {
            name: name.to_string(),
            root: ctx.settings.workspace.root_dir.join(name),
            capacity: ctx.settings.cluster.max_shards,
            shards: Vec::new(),
            config_servers: Vec::new(),
            ports,
            ctx: ctx.clone(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn shards(&self) -> &[ReplicaSet] {
        &self.shards
    }

    pub fn shard_mut(
        &mut self,
        name: &str,
    ) -> Option<&mut ReplicaSet> {
        self.shards.iter_mut().find(|s| s.name() == name)
    }

    /// Most recently added first
    pub fn config_servers(&self) -> &[Node] {
        &self.config_servers
    }

    /// Attaches a pre-built replica set into the next free shard slot.
    ///
    /// A full cluster rejects the shard and hands nothing back; the shard
    /// count stays at capacity.
    pub fn add_shard(
        &mut self,
        shard: ReplicaSet,
    ) -> Result<()> {
        if self.shards.len() >= self.capacity {
            return Err(TopologyError::ShardCapacityExceeded {
                capacity: self.capacity,
            }
            .into());
        }
        debug!(cluster = %self.name, shard = shard.name(), "attached shard");
        self.shards.push(shard);
        Ok(())
    }

    /// Creates a config-server node on the cluster's own port counter and
    /// prepends it to the config-server list.
    pub fn add_config_server(
        &mut self,
        name: &str,
    ) -> Result<&mut Node> {
        if self.config_servers.iter().any(|n| n.name() == name) {
            return Err(TopologyError::DuplicateMember { name: name.to_string() }.into());
        }

        let port = self.ports.next_port()?;
        let node = Node::config_server(name, self.root.join(name), port, &self.ctx);
        debug!(cluster = %self.name, ?node, "added config server");

        self.config_servers.insert(0, node);
        Ok(&mut self.config_servers[0])
    }

    /// Fresh cluster root, every shard started in order, then every config
    /// server set up and started.
    #[instrument(skip(self), fields(cluster = %self.name))]
    pub async fn start(&mut self) -> Result<()> {
        file_io::recreate_root_dir(&self.root, self.ctx.settings.process.workspace_mode).await?;

        for shard in self.shards.iter_mut() {
            shard.start().await?;
        }

        for node in self.config_servers.iter_mut() {
            node.setup().await?;
            node.restart().await?;
        }

        info!(
            shards = self.shards.len(),
            config_servers = self.config_servers.len(),
            "sharded cluster started"
        );
        Ok(())
    }

    /// Healthy when every shard is. Config servers are not polled.
    pub async fn wait_for_healthy(&self) -> Result<()> {
        for shard in &self.shards {
            shard.wait_for_healthy().await?;
        }
        info!(cluster = %self.name, "all shards healthy");
        Ok(())
    }

    /// Shuts down every shard, then kills every config server.
    /// Keeps going past failures and reports the first one.
    pub async fn shutdown(&mut self) -> Result<()> {
        let mut first_err = None;
        for shard in self.shards.iter_mut() {
            if let Err(e) = shard.shutdown().await {
                first_err.get_or_insert(e);
            }
        }
        if let Err(e) = kill_all(self.config_servers.iter_mut()).await {
            first_err.get_or_insert(e);
        }
        first_err.map_or(Ok(()), Err)
    }

    /// Shuts everything down, then destroys every shard and config server.
    /// Keeps going past failures and reports the first one.
    pub async fn destroy(mut self) -> Result<()> {
        let mut first_err = self.shutdown().await.err();
        for shard in self.shards.drain(..) {
            if let Err(e) = shard.destroy().await {
                first_err.get_or_insert(e);
            }
        }
        for node in self.config_servers.drain(..) {
            if let Err(e) = node.destroy().await {
                first_err.get_or_insert(e);
            }
        }
        first_err.map_or(Ok(()), Err)
    }
}
