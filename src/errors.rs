//! Harness Error Hierarchy
//!
//! Two disjoint families drive every decision in the orchestrator:
//! - [`FatalError`]: the host environment is broken. Never retried.
//! - Transient failures ([`ClientError`]) that convergence loops swallow and
//!   retry until the topology settles or a deadline fires.

use std::path::PathBuf;
use std::time::Duration;

use config::ConfigError;

use crate::ProcessId;

#[doc(hidden)]
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Unrecoverable failures requiring process termination
    #[error(transparent)]
    Fatal(#[from] FatalError),

    /// Convergence loops that gave up (deadline or cancellation)
    #[error(transparent)]
    Convergence(#[from] ConvergenceError),

    /// Administrative command failures
    #[error(transparent)]
    Client(#[from] ClientError),

    /// Process supervision failures
    #[error(transparent)]
    Process(#[from] ProcessError),

    /// Topology construction failures
    #[error(transparent)]
    Topology(#[from] TopologyError),

    /// Configuration loading failures
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Configuration validation failures
    #[error("Invalid config: {0}")]
    InvalidConfig(String),
}

impl Error {
    /// `true` when the driver must stop the whole run.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Error::Fatal(_))
    }

    /// `true` for failures a convergence loop retries.
    pub fn is_transient(&self) -> bool {
        matches!(self, Error::Client(_))
    }
}

#[derive(Debug, thiserror::Error)]
pub enum FatalError {
    /// Node or topology workspace could not be prepared
    #[error("Failed to create workspace \"{}\": {source}", path.display())]
    Workspace {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Database-server binary could not be launched
    #[error("Failed to spawn process {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// Every member of the replica set is an arbiter
    #[error("Replica set {replica_set} has no non-arbiter member to initiate")]
    NoPrimaryCandidate { replica_set: String },
}

#[derive(Debug, thiserror::Error)]
pub enum ConvergenceError {
    #[error("{operation} did not converge within {elapsed:?}")]
    TimedOut {
        operation: &'static str,
        elapsed: Duration,
    },

    #[error("{operation} cancelled")]
    Cancelled { operation: &'static str },
}

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// Endpoint did not answer
    #[error("Endpoint {addr} unreachable: {reason}")]
    Unreachable { addr: String, reason: String },

    /// Endpoint answered with a falsy `ok`
    #[error("Command {command} rejected by {addr}: {reply}")]
    CommandFailed {
        command: &'static str,
        addr: String,
        reply: String,
    },

    /// Reply did not have the expected shape
    #[error("Malformed reply: {0}")]
    MalformedReply(String),

    /// Command document could not be encoded
    #[error("Failed to encode {command}: {reason}")]
    Encode {
        command: &'static str,
        reason: String,
    },
}

#[derive(Debug, thiserror::Error)]
pub enum ProcessError {
    #[error("Process {0} is not tracked by this supervisor")]
    UnknownProcess(ProcessId),

    #[error("Failed to signal process {pid}: {source}")]
    Signal {
        pid: ProcessId,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to reap process {pid}: {source}")]
    Wait {
        pid: ProcessId,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Debug, thiserror::Error)]
pub enum TopologyError {
    /// Shard slots are full
    #[error("Sharded cluster already holds {capacity} shards")]
    ShardCapacityExceeded { capacity: usize },

    /// Sequential port counter ran past the end of u16
    #[error("No ports left after {start}")]
    PortsExhausted { start: u16 },

    #[error("Member {name} already exists")]
    DuplicateMember { name: String },
}
