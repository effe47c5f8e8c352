//! Error types for the sheet-relay client.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SheetsError {
    /// A column argument was neither an index nor a label. Raised before any
    /// remote call is made.
    #[error("Invalid column reference: {0}")]
    InvalidColumnRef(String),

    /// The backend rejected the operation.
    #[error("Backend returned error: {0}")]
    Remote(String),

    #[error("Failed to spawn backend process: {0}")]
    SpawnFailed(#[source] std::io::Error),

    #[error("Backend executable not found at: {0}")]
    BridgeExeNotFound(String),

    #[error("Backend process not running")]
    NotRunning,

    #[error("Failed to send request to backend: {0}")]
    SendFailed(String),

    #[error("Failed to read response from backend: {0}")]
    ReadFailed(String),

    #[error("Response id {got} does not match request id {expected}")]
    MismatchedResponse { expected: u64, got: u64 },

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Unexpected response data for {operation}: {reason}")]
    UnexpectedResponse { operation: String, reason: String },
}

pub type Result<T> = std::result::Result<T, SheetsError>;
