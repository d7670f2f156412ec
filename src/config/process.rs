use std::net::IpAddr;

use serde::Deserialize;
use serde::Serialize;

use crate::Error;
use crate::Result;

/// Launch parameters shared by every database-server process.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ProcessConfig {
    /// Executable name or path, resolved through `PATH` when bare
    #[serde(default = "default_binary")]
    pub binary: String,

    /// Loopback address every node binds to and is addressed by
    #[serde(default = "default_bind_ip")]
    pub bind_ip: IpAddr,

    /// Lock artifact left behind by an unclean shutdown
    #[serde(default = "default_lock_file")]
    pub lock_file: String,

    /// Flags appended after the baseline set
    #[serde(default = "default_extra_args")]
    pub extra_args: Vec<String>,

    /// Unix permission bits for every workspace directory
    #[serde(default = "default_workspace_mode")]
    pub workspace_mode: u32,
}

impl Default for ProcessConfig {
    fn default() -> Self {
        Self {
            binary: default_binary(),
            bind_ip: default_bind_ip(),
            lock_file: default_lock_file(),
            extra_args: default_extra_args(),
            workspace_mode: default_workspace_mode(),
        }
    }
}

impl ProcessConfig {
    pub fn validate(&self) -> Result<()> {
        if self.binary.trim().is_empty() {
            return Err(Error::InvalidConfig("process.binary cannot be empty".into()));
        }

        if !self.bind_ip.is_loopback() {
            return Err(Error::InvalidConfig(format!(
                "process.bind_ip must be a loopback address, got {}",
                self.bind_ip
            )));
        }

        if self.lock_file.is_empty() || self.lock_file.contains('/') {
            return Err(Error::InvalidConfig(format!(
                "process.lock_file must be a bare file name, got {:?}",
                self.lock_file
            )));
        }

        if self.workspace_mode > 0o777 {
            return Err(Error::InvalidConfig(format!(
                "process.workspace_mode {:o} is not a permission mask",
                self.workspace_mode
            )));
        }

        Ok(())
    }
}

fn default_binary() -> String {
    "mongod".to_string()
}
fn default_bind_ip() -> IpAddr {
    IpAddr::from([127, 0, 0, 1])
}
fn default_lock_file() -> String {
    "mongod.lock".to_string()
}
fn default_extra_args() -> Vec<String> {
    vec!["--smallfiles".to_string()]
}
fn default_workspace_mode() -> u32 {
    0o750
}
