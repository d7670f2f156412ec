use serde::Deserialize;
use serde::Serialize;
use serde_json::json;
use serde_json::Value;

use crate::constants::CMD_REPL_SET_GET_STATUS;
use crate::constants::CMD_REPL_SET_INITIATE;
use crate::constants::HEALTHY_MEMBER_STATES;
use crate::ClientError;
use crate::Result;

/// One entry of the `members` array sent with `replSetInitiate`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MemberConfig {
    #[serde(rename = "_id")]
    pub id: usize,
    pub host: String,
    #[serde(rename = "arbiterOnly")]
    pub arbiter_only: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ReplSetConfig {
    /// Replication group identifier (the replica-set name)
    #[serde(rename = "_id")]
    pub id: String,
    pub members: Vec<MemberConfig>,
}

/// `{ replSetInitiate: { _id, members: [...] } }`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ReplSetInitiate {
    #[serde(rename = "replSetInitiate")]
    pub config: ReplSetConfig,
}

impl ReplSetInitiate {
    pub fn new(config: ReplSetConfig) -> Self {
        Self { config }
    }

    pub fn to_command(&self) -> Result<Value> {
        serde_json::to_value(self).map_err(|e| {
            ClientError::Encode {
                command: CMD_REPL_SET_INITIATE,
                reason: e.to_string(),
            }
            .into()
        })
    }
}

/// `{ replSetGetStatus: 1 }`
pub fn repl_set_get_status() -> Value {
    json!({ CMD_REPL_SET_GET_STATUS: 1 })
}

/// Truthy `ok` field: `true` or any non-zero number
pub fn reply_ok(reply: &Value) -> bool {
    match reply.get("ok") {
        Some(Value::Bool(ok)) => *ok,
        Some(Value::Number(n)) => n.as_f64().map(|v| v != 0.0).unwrap_or(false),
        _ => false,
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct MemberStatus {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(rename = "stateStr", default)]
    pub state_str: Option<String>,
}

impl MemberStatus {
    pub fn is_healthy(&self) -> bool {
        self.state_str
            .as_deref()
            .map(|s| HEALTHY_MEMBER_STATES.contains(&s))
            .unwrap_or(false)
    }
}

/// The part of a `replSetGetStatus` reply the health loop looks at
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct ReplSetStatus {
    pub members: Vec<MemberStatus>,
}

impl ReplSetStatus {
    /// Fails when `members` is missing, not an array, or holds entries that
    /// are not documents.
    pub fn from_reply(reply: &Value) -> Result<Self> {
        let members = reply
            .get("members")
            .ok_or_else(|| ClientError::MalformedReply("status reply has no members".into()))?;
        if !members.is_array() {
            return Err(ClientError::MalformedReply("members is not an array".into()).into());
        }
        let members: Vec<MemberStatus> = serde_json::from_value(members.clone())
            .map_err(|e| ClientError::MalformedReply(e.to_string()))?;
        Ok(Self { members })
    }

    pub fn states(&self) -> Vec<Option<&str>> {
        self.members.iter().map(|m| m.state_str.as_deref()).collect()
    }

    /// Every reported member is PRIMARY, SECONDARY or ARBITER.
    /// An empty member list has not converged.
    pub fn is_healthy(&self) -> bool {
        !self.members.is_empty() && self.members.iter().all(MemberStatus::is_healthy)
    }

    pub fn unhealthy_members(&self) -> Vec<&MemberStatus> {
        self.members.iter().filter(|m| !m.is_healthy()).collect()
    }
}
