use std::net::SocketAddr;

use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;
use serde_json::Value;

use crate::Result;

#[cfg_attr(test, automock)]
#[async_trait]
pub trait AdminClient: Send + Sync + 'static {
    /// Runs `command` against the `admin` database of the node at `addr` and
    /// returns the first reply document.
    ///
    /// `secondary_ok` permits the command on members that are not primary.
    /// Transport failures map to [`crate::ClientError::Unreachable`].
    async fn run_command(
        &self,
        addr: SocketAddr,
        command: &Value,
        secondary_ok: bool,
    ) -> Result<Value>;
}
