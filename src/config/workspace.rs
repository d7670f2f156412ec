use std::path::PathBuf;

use serde::Deserialize;
use serde::Serialize;

use crate::Error;
use crate::Result;

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct WorkspaceConfig {
    /// Parent of every replica-set and cluster root directory.
    /// Those roots are wiped and recreated on each `start()`.
    #[serde(default = "default_root_dir")]
    pub root_dir: PathBuf,
}

impl Default for WorkspaceConfig {
    fn default() -> Self {
        Self {
            root_dir: default_root_dir(),
        }
    }
}

impl WorkspaceConfig {
    pub fn validate(&self) -> Result<()> {
        if self.root_dir.as_os_str().is_empty() {
            return Err(Error::InvalidConfig(
                "workspace.root_dir path cannot be empty".into(),
            ));
        }
        Ok(())
    }
}

fn default_root_dir() -> PathBuf {
    PathBuf::from(".")
}
