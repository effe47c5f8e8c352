//! Shared protocol types for communication between the sheet-relay client
//! and a spreadsheet backend process.
//!
//! Every remote operation lives in the [`NAMESPACE`] namespace and is addressed
//! by a qualified operation name such as `plugin:spreadsheet|new_xlsx`. Each
//! operation carries a flat parameter record with camelCase keys.
//!
//! On the wire the protocol is JSON-over-stdio: one JSON object per line in
//! each direction.

mod command;
mod types;

pub use command::Command;
pub use types::{column_index, column_label, Coordinate, SheetRange, Span, Table};

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Namespace every spreadsheet operation is registered under.
pub const NAMESPACE: &str = "spreadsheet";

/// Errors raised while decoding an operation into a [`Command`].
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    #[error("operation `{0}` is not part of the `spreadsheet` namespace")]
    ForeignOperation(String),

    #[error("invalid parameters for `{operation}`: {source}")]
    InvalidParams {
        operation: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Build the qualified operation name for a bare command name.
pub fn qualify(command: &str) -> String {
    format!("plugin:{NAMESPACE}|{command}")
}

/// Split a qualified operation name, returning the bare command name when the
/// operation belongs to [`NAMESPACE`].
pub fn command_name(operation: &str) -> Option<&str> {
    operation
        .strip_prefix("plugin:")?
        .strip_prefix(NAMESPACE)?
        .strip_prefix('|')
}

/// A request sent from the client to the backend process.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Request {
    /// Monotonically increasing request ID for correlating responses.
    pub id: u64,
    /// Qualified operation name.
    pub cmd: String,
    /// Parameter record; absent for operations without parameters.
    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub params: Value,
}

impl Request {
    pub fn new(id: u64, cmd: impl Into<String>, params: Value) -> Self {
        Self {
            id,
            cmd: cmd.into(),
            params,
        }
    }

    /// Decode the operation and parameters into a typed [`Command`].
    pub fn command(&self) -> Result<Command, ProtocolError> {
        Command::decode(&self.cmd, self.params.clone())
    }
}

/// A response sent from the backend process back to the client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Response {
    /// The request ID this response corresponds to.
    pub id: u64,
    /// The result of the operation.
    #[serde(flatten)]
    pub result: ResponseResult,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status")]
pub enum ResponseResult {
    #[serde(rename = "ok")]
    Ok {
        #[serde(default, skip_serializing_if = "Value::is_null")]
        data: Value,
    },
    #[serde(rename = "error")]
    Error { message: String },
}

impl Response {
    pub fn ok(id: u64, data: Value) -> Self {
        Self {
            id,
            result: ResponseResult::Ok { data },
        }
    }

    pub fn error(id: u64, message: impl Into<String>) -> Self {
        Self {
            id,
            result: ResponseResult::Error {
                message: message.into(),
            },
        }
    }
}

impl ResponseResult {
    /// Collapse into the returned data or the backend's error message.
    pub fn into_result(self) -> Result<Value, String> {
        match self {
            ResponseResult::Ok { data } => Ok(data),
            ResponseResult::Error { message } => Err(message),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn qualified_names_round_trip() {
        assert_eq!(qualify("new_xlsx"), "plugin:spreadsheet|new_xlsx");
        assert_eq!(command_name("plugin:spreadsheet|new_xlsx"), Some("new_xlsx"));
        assert_eq!(command_name("plugin:fs|read"), None);
        assert_eq!(command_name("new_xlsx"), None);
    }

    #[test]
    fn request_omits_null_params() {
        let req = Request::new(3, qualify("list_xlsx"), Value::Null);
        let line = serde_json::to_string(&req).unwrap();
        assert_eq!(line, r#"{"id":3,"cmd":"plugin:spreadsheet|list_xlsx"}"#);

        let back: Request = serde_json::from_str(&line).unwrap();
        assert_eq!(back.params, Value::Null);
    }

    #[test]
    fn response_wire_shape() {
        let ok = serde_json::to_value(Response::ok(7, json!([3, 9]))).unwrap();
        assert_eq!(ok, json!({"id": 7, "status": "ok", "data": [3, 9]}));

        let unit = serde_json::to_value(Response::ok(8, Value::Null)).unwrap();
        assert_eq!(unit, json!({"id": 8, "status": "ok"}));

        let err = serde_json::to_value(Response::error(9, "file \"a.xlsx\" not found")).unwrap();
        assert_eq!(
            err,
            json!({"id": 9, "status": "error", "message": "file \"a.xlsx\" not found"})
        );
    }

    #[test]
    fn response_parses_missing_data_as_null() {
        let resp: Response = serde_json::from_str(r#"{"id":1,"status":"ok"}"#).unwrap();
        assert_eq!(resp.result.into_result(), Ok(Value::Null));

        let resp: Response =
            serde_json::from_str(r#"{"id":2,"status":"error","message":"boom"}"#).unwrap();
        assert_eq!(resp.result.into_result(), Err("boom".to_string()));
    }
}
