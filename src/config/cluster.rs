use serde::Deserialize;
use serde::Serialize;

use crate::Error;
use crate::Result;

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ClusterConfig {
    /// Upper bound on shards attached to one sharded cluster
    #[serde(default = "default_max_shards")]
    pub max_shards: usize,
}

impl Default for ClusterConfig {
    fn default() -> Self {
        Self {
            max_shards: default_max_shards(),
        }
    }
}

impl ClusterConfig {
    pub fn validate(&self) -> Result<()> {
        if self.max_shards == 0 {
            return Err(Error::InvalidConfig(
                "cluster.max_shards must be greater than 0".into(),
            ));
        }
        Ok(())
    }
}

fn default_max_shards() -> usize {
    12
}
