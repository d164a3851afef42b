use crate::debugger::error::Error;
use crate::debugger::thread::ThreadCallFrame;
use crate::debugger::utils::null_as_default;
use serde::{Deserialize, Serialize};

/// Payload emitted by a page into the `queue_debugger` channel when it stops at a breakpoint.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StopNotification {
    /// Identifier of the pending queue row.
    pub hash: String,
    pub line: i64,
    pub page: String,
    pub status: String,
    pub thread_id: String,
    pub current_stack_depth: i64,
}

impl StopNotification {
    pub fn parse(payload: &str) -> Result<Self, Error> {
        let notification: StopNotification =
            serde_json::from_str(payload).map_err(Error::MalformedNotification)?;
        if notification.hash.is_empty() {
            return Err(Error::MissingHash);
        }
        Ok(notification)
    }
}

/// Content of the `request` column of a debugger queue row.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DebuggerRequest {
    pub depth: i64,
    #[serde(rename = "states", deserialize_with = "null_as_default")]
    pub call_stack: Vec<ThreadCallFrame>,
}

impl DebuggerRequest {
    pub fn from_value(hash: &str, value: serde_json::Value) -> Result<Self, Error> {
        serde_json::from_value(value).map_err(|source| Error::MalformedRequest {
            hash: hash.to_string(),
            source,
        })
    }
}
