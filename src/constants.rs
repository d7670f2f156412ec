// -
// Launch flags

/// Flags every database-server process receives, ahead of the role flag
pub(crate) const FLAG_DBPATH: &str = "--dbpath";
pub(crate) const FLAG_PORT: &str = "--port";
pub(crate) const FLAG_NO_JOURNAL: &str = "--nojournal";
pub(crate) const FLAG_NO_PREALLOC: &str = "--noprealloc";
pub(crate) const FLAG_NO_HTTP_INTERFACE: &str = "--nohttpinterface";
pub(crate) const FLAG_BIND_IP: &str = "--bind_ip";

/// Role flags, exactly one per process
pub(crate) const FLAG_CONFIG_SERVER: &str = "--configsvr";
pub(crate) const FLAG_REPL_SET: &str = "--replSet";

/// Processes run inside their workspace, so the data directory is always `.`
pub(crate) const DBPATH_IN_WORKSPACE: &str = ".";

// -
// Administrative commands

pub(crate) const CMD_REPL_SET_INITIATE: &str = "replSetInitiate";
pub(crate) const CMD_REPL_SET_GET_STATUS: &str = "replSetGetStatus";

/// Member states that count as converged
pub(crate) const STATE_PRIMARY: &str = "PRIMARY";
pub(crate) const STATE_SECONDARY: &str = "SECONDARY";
pub(crate) const STATE_ARBITER: &str = "ARBITER";

pub(crate) const HEALTHY_MEMBER_STATES: [&str; 3] = [STATE_PRIMARY, STATE_SECONDARY, STATE_ARBITER];

// -
// Convergence operation names (logs, metrics, errors)

pub(crate) const OP_CONFIGURE: &str = "configure";
pub(crate) const OP_WAIT_FOR_HEALTHY: &str = "wait_for_healthy";
