//! Replica-set and sharded-cluster controllers.
//!
//! Control flows downwards (cluster -> replica set -> node -> OS process);
//! health flows back up through the admin client.

mod replica_set;
mod sharded_cluster;
pub use replica_set::*;
pub use sharded_cluster::*;


use crate::Node;
use crate::Result;

/// Kills every node even if some fail, returning the first failure.
pub(crate) async fn kill_all<'a, I>(nodes: I) -> Result<()>
where
    I: IntoIterator<Item = &'a mut Node>,
{
    let mut first_err = None;
    for node in nodes {
        if let Err(e) = node.kill().await {
            tracing::error!("failed to kill {}: {}", node.name(), e);
            first_err.get_or_insert(e);
        }
    }
    first_err.map_or(Ok(()), Err)
}
