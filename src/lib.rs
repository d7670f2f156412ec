//! Ephemeral replica sets and sharded clusters for integration tests.
//!
//! A run builds one [`HarnessContext`], declares topologies against it
//! ([`ReplicaSet`], [`ShardedCluster`]), then drives them through
//! `start` -> `wait_for_healthy` -> `shutdown`/`destroy`.
//!
//! ```ignore
//! let ctx = HarnessBuilder::new(HarnessConfig::new()?, client).build()?;
//!
//! let mut rs = ReplicaSet::new("rs0", &ctx);
//! rs.add_replica("a")?;
//! rs.add_replica("b")?;
//! rs.add_arbiter("c")?;
//!
//! rs.start().await?;
//! rs.wait_for_healthy().await?;
//! println!("{}", rs.connection_string());
//! rs.destroy().await?;
//! ```

mod allocator;
mod client;
mod config;
pub(crate) mod constants;
mod errors;
mod harness;
mod metrics;
mod node;
mod process;
mod topology;
pub mod observability;
pub mod utils;

pub use allocator::*;
pub use client::*;
pub use config::*;
pub use errors::*;
pub use harness::*;
pub use metrics::*;
pub use node::*;
pub use process::*;
pub use topology::*;

//-----------------------------------------------------------
// Test utils

#[cfg(test)]
pub mod test_utils;
