use std::net::SocketAddr;

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::Value;

use crate::test_utils::command_name;
use crate::AdminClient;
use crate::Result;

type Responder = Box<dyn FnMut(SocketAddr, &Value) -> Result<Value> + Send>;

/// Admin client whose replies come from a test-supplied closure
pub struct ScriptedAdminClient {
    responder: Mutex<Responder>,
    calls: Mutex<Vec<(SocketAddr, Value, bool)>>,
}

impl ScriptedAdminClient {
    pub fn new<F>(responder: F) -> Self
    where
        F: FnMut(SocketAddr, &Value) -> Result<Value> + Send + 'static,
    {
        Self {
            responder: Mutex::new(Box::new(responder)),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Every call as (endpoint, command, secondary_ok)
    pub fn calls(&self) -> Vec<(SocketAddr, Value, bool)> {
        self.calls.lock().clone()
    }

    pub fn calls_named(
        &self,
        name: &str,
    ) -> Vec<(SocketAddr, Value)> {
        self.calls
            .lock()
            .iter()
            .filter(|(_, cmd, _)| command_name(cmd) == Some(name))
            .map(|(addr, cmd, _)| (*addr, cmd.clone()))
            .collect()
    }
}

#[async_trait]
impl AdminClient for ScriptedAdminClient {
    async fn run_command(
        &self,
        addr: SocketAddr,
        command: &Value,
        secondary_ok: bool,
    ) -> Result<Value> {
        self.calls.lock().push((addr, command.clone(), secondary_ok));
        let mut responder = self.responder.lock();
        (*responder)(addr, command)
    }
}
