//! Backend-wide operations and handle construction.

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde_json::Value;
use sheet_relay_protocol::Command;

use crate::error::{Result, SheetsError};
use crate::spreadsheet::Spreadsheet;
use crate::transport::{ProcessTransport, ProcessTransportConfig, Transport};

/// Entry point to a spreadsheet backend.
///
/// Owns the shared transport, hands out [`Spreadsheet`] handles, and carries
/// the operations that act on every open file at once.
#[derive(Clone)]
pub struct SheetsClient {
    transport: Arc<dyn Transport>,
}

impl SheetsClient {
    pub fn new(transport: impl Transport + 'static) -> Self {
        Self {
            transport: Arc::new(transport),
        }
    }

    /// Build a client over an already-shared transport.
    pub fn with_transport(transport: Arc<dyn Transport>) -> Self {
        Self { transport }
    }

    /// Spawn a backend process and connect to it over stdio.
    pub fn spawn(config: ProcessTransportConfig) -> Result<Self> {
        Ok(Self::new(ProcessTransport::spawn(config)?))
    }

    /// Create a handle for `path`, targeting `sheet_name`.
    ///
    /// No remote call is made; call [`Spreadsheet::create`] or
    /// [`Spreadsheet::read`] to open the file on the backend.
    pub fn spreadsheet(&self, path: impl Into<String>, sheet_name: impl Into<String>) -> Spreadsheet {
        Spreadsheet::new(self.transport.clone(), path, sheet_name)
    }

    /// Release every file open on the backend.
    pub async fn close_all(&self) -> Result<()> {
        invoke(self.transport.as_ref(), Command::CloseAllXlsx).await?;
        Ok(())
    }

    /// Paths of every file currently open on the backend.
    pub async fn list(&self) -> Result<Vec<String>> {
        let command = Command::ListXlsx;
        let operation = command.operation();
        let data = invoke(self.transport.as_ref(), command).await?;
        decode(&operation, data)
    }
}

/// Send one command over `transport`.
pub(crate) async fn invoke(transport: &dyn Transport, command: Command) -> Result<Value> {
    let operation = command.operation();
    tracing::debug!("Invoking {operation}");
    transport.invoke(&operation, command.params()).await
}

/// Interpret returned data as `T`.
pub(crate) fn decode<T: DeserializeOwned>(operation: &str, data: Value) -> Result<T> {
    serde_json::from_value(data).map_err(|e| SheetsError::UnexpectedResponse {
        operation: operation.to_string(),
        reason: e.to_string(),
    })
}
