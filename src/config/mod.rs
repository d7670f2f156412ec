//! Configuration management for the topology harness.
//!
//! Provides hierarchical configuration loading and validation with:
//! - Default values as code base
//! - Environment variable overrides
//! - Configuration file support
//! - Section-wise validation
mod cluster;
mod ports;
mod process;
mod retry;
mod workspace;
pub use cluster::*;
pub use ports::*;
pub use process::*;
pub use retry::*;
pub use workspace::*;


use std::env;
use std::fmt::Debug;

use config::Config;
use config::Environment;
use config::File;
use serde::Deserialize;
use serde::Serialize;

use crate::Result;

/// Main configuration container for the harness.
///
/// Combines all section configurations with hierarchical override support:
/// 1. Default values from code implementation
/// 2. Configuration file specified by `CONFIG_PATH`
/// 3. Environment variables (highest priority)
#[derive(Serialize, Deserialize, Clone, Default)]
pub struct HarnessConfig {
    /// How database-server processes are launched
    #[serde(default)]
    pub process: ProcessConfig,
    /// Port ranges for replica sets, shards and config servers
    #[serde(default)]
    pub ports: PortConfig,
    /// Where topology workspaces live on disk
    #[serde(default)]
    pub workspace: WorkspaceConfig,
    /// Settle delay and convergence retry policies
    #[serde(default)]
    pub timing: TimingConfig,
    /// Sharded cluster limits
    #[serde(default)]
    pub cluster: ClusterConfig,
}

impl Debug for HarnessConfig {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        f.debug_struct("HarnessConfig")
            .field("binary", &self.process.binary)
            .field("root_dir", &self.workspace.root_dir)
            .finish()
    }
}

impl HarnessConfig {
    /// Loads configuration from hierarchical sources without validation.
    ///
    /// Configuration sources are merged in the following order (later sources override earlier):
    /// 1. Type defaults (lowest priority)
    /// 2. Configuration file from `CONFIG_PATH` environment variable (if set)
    /// 3. Environment variables with `HARNESS__` prefix (highest priority)
    ///
    /// # Examples
    /// ```ignore
    /// std::env::set_var("HARNESS__PROCESS__BINARY", "/opt/mongo/bin/mongod");
    /// let cfg = HarnessConfig::new()?.validate()?;
    /// ```
    pub fn new() -> Result<Self> {
        let mut builder = Config::builder().add_source(Config::try_from(&Self::default())?);

        if let Ok(config_path) = env::var("CONFIG_PATH") {
            builder = builder.add_source(File::with_name(&config_path).required(true));
        }

        builder = builder.add_source(
            Environment::with_prefix("HARNESS")
                .separator("__")
                .ignore_empty(true)
                .try_parsing(true),
        );

        let config: Self = builder.build()?.try_deserialize()?;
        Ok(config)
    }

    /// Applies additional configuration overrides from file without validation.
    ///
    /// Merging order (later sources override earlier):
    /// 1. Current configuration values
    /// 2. New configuration file
    /// 3. Latest environment variables (highest priority)
    pub fn with_override_config(
        &self,
        path: &str,
    ) -> Result<Self> {
        let config: Self = Config::builder()
            .add_source(Config::try_from(self)?)
            .add_source(File::with_name(path))
            .add_source(
                Environment::with_prefix("HARNESS")
                    .separator("__")
                    .ignore_empty(true)
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()?;
        Ok(config)
    }

    /// Validates configuration and returns validated instance.
    pub fn validate(self) -> Result<Self> {
        self.process.validate()?;
        self.ports.validate()?;
        self.workspace.validate()?;
        self.timing.validate()?;
        self.cluster.validate()?;
        Ok(self)
    }
}
