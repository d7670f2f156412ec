use std::fmt::Debug;
use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use crate::utils::retry::RetryLoop;
use crate::AdminClient;
use crate::HarnessConfig;
use crate::PortAllocator;
use crate::ProcessSupervisor;
use crate::RetryPolicy;

/// Collaborators shared by every node, replica set and cluster of one run.
///
/// Cloning is cheap; all clones observe the same cancellation token.
#[derive(Clone)]
pub struct HarnessContext {
    pub(crate) settings: Arc<HarnessConfig>,
    pub(crate) supervisor: Arc<dyn ProcessSupervisor>,
    pub(crate) client: Arc<dyn AdminClient>,
    pub(crate) ports: Arc<PortAllocator>,
    pub(crate) cancel: CancellationToken,
}

impl Debug for HarnessContext {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        f.debug_struct("HarnessContext")
            .field("settings", &self.settings)
            .field("cancelled", &self.cancel.is_cancelled())
            .finish()
    }
}

impl HarnessContext {
    pub fn settings(&self) -> &HarnessConfig {
        &self.settings
    }

    pub fn supervisor(&self) -> &Arc<dyn ProcessSupervisor> {
        &self.supervisor
    }

    pub fn client(&self) -> &Arc<dyn AdminClient> {
        &self.client
    }

    pub fn ports(&self) -> &Arc<PortAllocator> {
        &self.ports
    }

    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Interrupts every in-flight `configure` and `wait_for_healthy`
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub(crate) fn retry_loop(
        &self,
        operation: &'static str,
        policy: &RetryPolicy,
    ) -> RetryLoop {
        RetryLoop::new(operation, policy, self.cancel.clone())
    }
}
