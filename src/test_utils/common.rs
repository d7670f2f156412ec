use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;

use serde_json::json;
use serde_json::Value;

use crate::AdminClient;
use crate::ClientError;
use crate::Error;
use crate::HarnessBuilder;
use crate::HarnessConfig;
use crate::HarnessContext;
use crate::PortAllocator;
use crate::ProcessSupervisor;

pub const TEST_SEED: u64 = 20131024;

/// Config rooted in `root` with short timings, suitable for paused-clock tests
pub fn test_config(root: &Path) -> HarnessConfig {
    let mut config = HarnessConfig::default();
    config.workspace.root_dir = root.to_path_buf();
    config.timing.settle_delay_ms = 10;
    config
}

pub fn test_context(
    config: HarnessConfig,
    supervisor: Arc<dyn ProcessSupervisor>,
    client: Arc<dyn AdminClient>,
) -> HarnessContext {
    HarnessBuilder::new(config, client)
        .supervisor(supervisor)
        .port_allocator(Arc::new(PortAllocator::seeded(TEST_SEED)))
        .build()
        .expect("test config should be valid")
}

pub fn ok_reply() -> Value {
    json!({ "ok": 1 })
}

pub fn status_reply(states: &[&str]) -> Value {
    let members: Vec<Value> = states
        .iter()
        .enumerate()
        .map(|(i, s)| json!({ "_id": i, "stateStr": s }))
        .collect();
    json!({ "members": members, "ok": 1 })
}

pub fn unreachable(addr: SocketAddr) -> Error {
    ClientError::Unreachable {
        addr: addr.to_string(),
        reason: "connection refused".to_string(),
    }
    .into()
}

pub fn command_name(command: &Value) -> Option<&str> {
    command.as_object().and_then(|o| o.keys().next()).map(String::as_str)
}
