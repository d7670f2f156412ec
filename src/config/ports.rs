use std::fmt;

use serde::Deserialize;
use serde::Serialize;

use crate::Error;
use crate::Result;

/// Half-open port range `[start, end)` a topology draws its base port from.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
pub struct PortRange {
    pub start: u16,
    pub end: u16,
}

impl PortRange {
    pub const fn new(
        start: u16,
        end: u16,
    ) -> Self {
        Self { start, end }
    }

    pub fn len(&self) -> u16 {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn contains(
        &self,
        port: u16,
    ) -> bool {
        port >= self.start && port < self.end
    }

    pub fn overlaps(
        &self,
        other: &PortRange,
    ) -> bool {
        self.start < other.end && other.start < self.end
    }
}

impl fmt::Display for PortRange {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        write!(f, "{}..{}", self.start, self.end)
    }
}

/// Disjoint base-port ranges, one per topology kind.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct PortConfig {
    /// Stand-alone replica sets
    #[serde(default = "default_replica_set_range")]
    pub replica_set: PortRange,

    /// Configuration servers of a sharded cluster
    #[serde(default = "default_config_server_range")]
    pub config_server: PortRange,

    /// Replica sets built as shards of a sharded cluster
    #[serde(default = "default_shard_range")]
    pub shard: PortRange,
}

impl Default for PortConfig {
    fn default() -> Self {
        Self {
            replica_set: default_replica_set_range(),
            config_server: default_config_server_range(),
            shard: default_shard_range(),
        }
    }
}

impl PortConfig {
    pub fn validate(&self) -> Result<()> {
        let named = [
            ("replica_set", self.replica_set),
            ("config_server", self.config_server),
            ("shard", self.shard),
        ];

        for (name, range) in &named {
            if range.is_empty() {
                return Err(Error::InvalidConfig(format!(
                    "ports.{name} range {range} is empty"
                )));
            }
            if range.start == 0 {
                return Err(Error::InvalidConfig(format!(
                    "ports.{name} range {range} cannot start at port 0"
                )));
            }
        }

        for (i, (a_name, a)) in named.iter().enumerate() {
            for (b_name, b) in named.iter().skip(i + 1) {
                if a.overlaps(b) {
                    return Err(Error::InvalidConfig(format!(
                        "ports.{a_name} ({a}) overlaps ports.{b_name} ({b})"
                    )));
                }
            }
        }

        Ok(())
    }
}

fn default_replica_set_range() -> PortRange {
    PortRange::new(30000, 40000)
}
fn default_config_server_range() -> PortRange {
    PortRange::new(40000, 41000)
}
fn default_shard_range() -> PortRange {
    PortRange::new(41000, 50000)
}
