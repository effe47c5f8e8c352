//! Error types for the bridge engine.

use sheet_relay_protocol::ProtocolError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("file \"{0}\" not found")]
    NotOpen(String),

    #[error("file \"{0}\" is already open")]
    AlreadyOpen(String),

    #[error("sheet \"{sheet}\" not found in \"{path}\"")]
    SheetNotFound { path: String, sheet: String },

    #[error("cannot add sheet \"{sheet}\": {reason}")]
    SheetRejected { sheet: String, reason: String },

    #[error("failed to read \"{path}\": {reason}")]
    ReadFailed { path: String, reason: String },

    #[error("failed to write \"{path}\": {reason}")]
    WriteFailed { path: String, reason: String },

    #[error("out of range: {0}")]
    OutOfRange(String),

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("payload is not rectangular: entry {index} has {len} cells, expected {expected}")]
    RaggedPayload {
        index: usize,
        len: usize,
        expected: usize,
    },

    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    #[error("failed to encode result: {0}")]
    Encode(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, EngineError>;
