//! Assembles a [`HarnessContext`].
//!
//! ## Example
//! ```ignore
//! let ctx = HarnessBuilder::new(HarnessConfig::new()?, Arc::new(my_client))
//!     .port_allocator(Arc::new(PortAllocator::seeded(7)))  // Optional override
//!     .build()?;
//! let mut rs = ReplicaSet::new("rs0", &ctx);
//! ```
//!
//! Defaults: [`OsProcessSupervisor`] for processes, the process-wide
//! [`PortAllocator::shared`] for ports, and a fresh cancellation token.

use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::debug;

use super::HarnessContext;
use crate::AdminClient;
use crate::HarnessConfig;
use crate::OsProcessSupervisor;
use crate::PortAllocator;
use crate::ProcessSupervisor;
use crate::Result;

pub struct HarnessBuilder {
    config: HarnessConfig,
    client: Arc<dyn AdminClient>,
    supervisor: Option<Arc<dyn ProcessSupervisor>>,
    ports: Option<Arc<PortAllocator>>,
    cancel: Option<CancellationToken>,
}

impl HarnessBuilder {
    pub fn new(
        config: HarnessConfig,
        client: Arc<dyn AdminClient>,
    ) -> Self {
        Self {
            config,
            client,
            supervisor: None,
            ports: None,
            cancel: None,
        }
    }

    pub fn supervisor(
        mut self,
        supervisor: Arc<dyn ProcessSupervisor>,
    ) -> Self {
        self.supervisor = Some(supervisor);
        self
    }

    pub fn port_allocator(
        mut self,
        ports: Arc<PortAllocator>,
    ) -> Self {
        self.ports = Some(ports);
        self
    }

    /// Ties the harness to an outer token, e.g. a test-wide shutdown signal
    pub fn cancellation_token(
        mut self,
        cancel: CancellationToken,
    ) -> Self {
        self.cancel = Some(cancel);
        self
    }

    /// Validates the configuration and fills in defaults
    pub fn build(self) -> Result<HarnessContext> {
        let settings = self.config.validate()?;
        debug!(?settings, "harness configured");

        Ok(HarnessContext {
            settings: Arc::new(settings),
            supervisor: self.supervisor.unwrap_or_else(|| Arc::new(OsProcessSupervisor::new())),
            client: self.client,
            ports: self.ports.unwrap_or_else(PortAllocator::shared),
            cancel: self.cancel.unwrap_or_default(),
        })
    }
}
