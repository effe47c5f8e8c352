//! In-process transport that records calls instead of sending them.

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::Value;
use sheet_relay_protocol::command_name;

use super::Transport;
use crate::error::{Result, SheetsError};

/// One call observed by a [`MockTransport`].
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedCall {
    pub operation: String,
    pub params: Value,
}

impl RecordedCall {
    /// Bare command name, e.g. `new_xlsx`.
    pub fn command(&self) -> &str {
        command_name(&self.operation).unwrap_or(&self.operation)
    }
}

/// A transport that records every call and answers from a script.
///
/// Replies are queued per bare command name. A call with nothing queued for
/// its command succeeds with `null` data.
#[derive(Debug, Default)]
pub struct MockTransport {
    calls: Mutex<Vec<RecordedCall>>,
    replies: Mutex<HashMap<String, VecDeque<std::result::Result<Value, String>>>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a successful reply for the next call to `command`.
    pub fn reply(&self, command: &str, data: Value) -> &Self {
        self.enqueue(command, Ok(data));
        self
    }

    /// Queue a backend rejection for the next call to `command`.
    pub fn fail(&self, command: &str, message: impl Into<String>) -> &Self {
        self.enqueue(command, Err(message.into()));
        self
    }

    /// Every call recorded so far, in issue order.
    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .len()
    }

    /// The most recent call, if any.
    pub fn last_call(&self) -> Option<RecordedCall> {
        self.calls
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .last()
            .cloned()
    }

    fn enqueue(&self, command: &str, reply: std::result::Result<Value, String>) {
        self.replies
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .entry(command.to_string())
            .or_default()
            .push_back(reply);
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn invoke(&self, operation: &str, params: Value) -> Result<Value> {
        let call = RecordedCall {
            operation: operation.to_string(),
            params,
        };
        let reply = self
            .replies
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .get_mut(call.command())
            .and_then(VecDeque::pop_front);
        self.calls
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(call);

        match reply {
            Some(Ok(data)) => Ok(data),
            Some(Err(message)) => Err(SheetsError::Remote(message)),
            None => Ok(Value::Null),
        }
    }
}
